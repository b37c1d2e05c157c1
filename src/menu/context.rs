use dashmap::DashMap;
use serde_json::Value;
use std::sync::Mutex;

use super::item::{MenuItem, Visual};
use super::MenuServices;
use crate::cooldown::CooldownManager;
use crate::delay::DelayScheduler;
use crate::errors::guarded;
use crate::event::{ClickAction, CloseReason, ContainerId, EntityId};
use crate::input::ChatInputMultiplexer;

pub type CloseCallback = Box<dyn FnOnce(CloseReason) + Send + 'static>;

/// Per-menu state shared by all click handlers of one menu: a thread-safe
/// key/value store plus the one-shot close notification.
#[derive(Default)]
pub struct MenuContext {
    data: DashMap<String, Value>,
    on_close: Mutex<Option<CloseCallback>>,
}

impl MenuContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_close(on_close: Option<CloseCallback>) -> Self {
        Self {
            data: DashMap::new(),
            on_close: Mutex::new(on_close),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.data.get(key).map(|v| v.value().clone())
    }

    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub fn clear(&self) {
        self.data.clear();
    }

    /// Fire the close callback (at most once over the context's life) and drop stored state.
    pub(crate) fn close(&self, reason: CloseReason) {
        let callback = match self.on_close.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(cb) = callback {
            guarded("menu close callback", || cb(reason));
        }
        self.data.clear();
    }
}

#[derive(Debug)]
pub(crate) enum SlotChange {
    Replace(MenuItem),
    Visual(Visual),
    Clear,
}

/// What a button's click handler sees and may change.
pub struct ClickContext<'a> {
    entity: EntityId,
    container: ContainerId,
    slot: usize,
    action: ClickAction,
    menu: &'a MenuContext,
    services: &'a MenuServices,
    pub(crate) change: Option<SlotChange>,
    pub(crate) close_requested: bool,
}

impl<'a> ClickContext<'a> {
    pub(crate) fn new(
        entity: EntityId,
        container: ContainerId,
        slot: usize,
        action: ClickAction,
        menu: &'a MenuContext,
        services: &'a MenuServices,
    ) -> Self {
        Self {
            entity,
            container,
            slot,
            action,
            menu,
            services,
            change: None,
            close_requested: false,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn action(&self) -> ClickAction {
        self.action
    }

    pub fn context(&self) -> &MenuContext {
        self.menu
    }

    /// Replace the clicked slot's look and behaviour.
    pub fn replace(&mut self, item: MenuItem) {
        self.change = Some(SlotChange::Replace(item));
    }

    /// Change the clicked slot's look, keeping its behaviour.
    pub fn set_visual(&mut self, visual: Visual) {
        self.change = Some(SlotChange::Visual(visual));
    }

    pub fn clear(&mut self) {
        self.change = Some(SlotChange::Clear);
    }

    /// Close the menu once the handler returns.
    pub fn close_menu(&mut self) {
        self.close_requested = true;
    }

    /// Ask the clicking entity for a chat reply.
    pub fn prompt<F>(&self, on_response: F)
    where
        F: FnOnce(String) + Send + Sync + 'static,
    {
        self.services.chat.request_input(self.entity, on_response);
    }

    pub fn chat(&self) -> &ChatInputMultiplexer {
        &self.services.chat
    }

    pub fn delays(&self) -> &DelayScheduler {
        &self.services.delays
    }

    pub fn cooldowns(&self) -> &CooldownManager {
        &self.services.cooldowns
    }
}
