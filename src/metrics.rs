//! Runtime counters for the interactive-state layer.
//! Owned by [`crate::core::Core`] and shared with components through `Arc`.
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    chat_captured: AtomicU64,
    chat_replaced: AtomicU64,
    chat_discarded: AtomicU64,
    delays_started: AtomicU64,
    delays_completed: AtomicU64,
    delays_cancelled: AtomicU64,
    menus_opened: AtomicU64,
    menus_closed: AtomicU64,
    menu_clicks: AtomicU64,
    menu_events_cancelled: AtomicU64,
    hooks_registered: AtomicU64,
    hooks_skipped: AtomicU64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub chat_captured: u64,
    pub chat_replaced: u64,
    pub chat_discarded: u64,
    pub delays_started: u64,
    pub delays_completed: u64,
    pub delays_cancelled: u64,
    pub menus_opened: u64,
    pub menus_closed: u64,
    pub menu_clicks: u64,
    pub menu_events_cancelled: u64,
    pub hooks_registered: u64,
    pub hooks_skipped: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_chat_captured(&self) {
        bump(&self.chat_captured);
    }
    pub fn inc_chat_replaced(&self) {
        bump(&self.chat_replaced);
    }
    pub fn inc_chat_discarded(&self) {
        bump(&self.chat_discarded);
    }
    pub fn inc_delays_started(&self) {
        bump(&self.delays_started);
    }
    pub fn inc_delays_completed(&self) {
        bump(&self.delays_completed);
    }
    pub fn inc_delays_cancelled(&self) {
        bump(&self.delays_cancelled);
    }
    pub fn inc_menus_opened(&self) {
        bump(&self.menus_opened);
    }
    pub fn inc_menus_closed(&self) {
        bump(&self.menus_closed);
    }
    pub fn inc_menu_clicks(&self) {
        bump(&self.menu_clicks);
    }
    pub fn inc_menu_events_cancelled(&self) {
        bump(&self.menu_events_cancelled);
    }
    pub fn inc_hooks_registered(&self) {
        bump(&self.hooks_registered);
    }
    pub fn inc_hooks_skipped(&self) {
        bump(&self.hooks_skipped);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            chat_captured: load(&self.chat_captured),
            chat_replaced: load(&self.chat_replaced),
            chat_discarded: load(&self.chat_discarded),
            delays_started: load(&self.delays_started),
            delays_completed: load(&self.delays_completed),
            delays_cancelled: load(&self.delays_cancelled),
            menus_opened: load(&self.menus_opened),
            menus_closed: load(&self.menus_closed),
            menu_clicks: load(&self.menu_clicks),
            menu_events_cancelled: load(&self.menu_events_cancelled),
            hooks_registered: load(&self.hooks_registered),
            hooks_skipped: load(&self.hooks_skipped),
        }
    }
}

impl std::fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "chat(captured={} replaced={} discarded={}) delays(started={} completed={} cancelled={}) menus(opened={} closed={} clicks={} cancelled_events={}) hooks(registered={} skipped={})",
            self.chat_captured,
            self.chat_replaced,
            self.chat_discarded,
            self.delays_started,
            self.delays_completed,
            self.delays_cancelled,
            self.menus_opened,
            self.menus_closed,
            self.menu_clicks,
            self.menu_events_cancelled,
            self.hooks_registered,
            self.hooks_skipped
        )
    }
}
