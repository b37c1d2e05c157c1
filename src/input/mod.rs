//! # Chat Input Multiplexer
//!
//! Turns an entity's *next* chat message into a typed reply for whoever asked
//! for it, instead of broadcasting it.
//!
//! ## Pending Requests
//!
//! - At most one pending request per entity. A second [`ChatInputMultiplexer::request_input`]
//!   replaces the first; the replaced callback is dropped without being called.
//! - The request is removed *before* its callback runs, so a callback that asks
//!   again installs a fresh request that survives.
//! - World change, death and disconnect silently discard the request.
//!
//! ## Subscriptions
//!
//! Other components that only need to *observe* the next chat message (the delay
//! scheduler's chat trigger) register a one-shot subscription. Subscriptions never
//! suppress the message and are dropped when the entity disconnects.
//!
//! Both maps are [`DashMap`]s keyed by entity: chat arrives on the chat delivery
//! thread while lifecycle events arrive on the tick thread. No lock is held while
//! a callback runs.

use dashmap::DashMap;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::errors::guarded;
use crate::event::{Disposition, EntityId, Event};
use crate::logutil::{escape_log, strip_formatting};
use crate::metrics::Metrics;

/// Receives the captured reply.
pub type ResponseCallback = Box<dyn FnOnce(String) + Send + Sync + 'static>;

/// Notified (once) with the plain text of the entity's next chat message.
pub type ChatObserver = Box<dyn FnOnce(&str) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct ChatInputMultiplexer {
    requests: DashMap<EntityId, ResponseCallback>,
    subscriptions: DashMap<EntityId, Vec<(SubscriptionId, ChatObserver)>>,
    next_subscription: AtomicU64,
    strip_formatting: bool,
    metrics: Arc<Metrics>,
}

impl ChatInputMultiplexer {
    pub fn new(strip_formatting: bool, metrics: Arc<Metrics>) -> Self {
        Self {
            requests: DashMap::new(),
            subscriptions: DashMap::new(),
            next_subscription: AtomicU64::new(1),
            strip_formatting,
            metrics,
        }
    }

    /// Install (or replace) the entity's pending request. Its next chat message
    /// is not broadcast and is handed to `on_response` instead.
    pub fn request_input<F>(&self, entity: EntityId, on_response: F)
    where
        F: FnOnce(String) + Send + Sync + 'static,
    {
        if self.requests.insert(entity, Box::new(on_response)).is_some() {
            self.metrics.inc_chat_replaced();
            debug!("chat input request for {} replaced a pending one", entity);
        }
    }

    /// Remove the pending request without calling it. Returns whether one existed.
    pub fn cancel_request(&self, entity: EntityId) -> bool {
        self.requests.remove(&entity).is_some()
    }

    pub fn has_active_request(&self, entity: EntityId) -> bool {
        self.requests.contains_key(&entity)
    }

    pub fn pending_count(&self) -> usize {
        self.requests.len()
    }

    /// Observe the entity's next chat message without suppressing it.
    pub fn subscribe<F>(&self, entity: EntityId, observer: F) -> SubscriptionId
    where
        F: FnOnce(&str) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .entry(entity)
            .or_default()
            .push((id, Box::new(observer)));
        id
    }

    /// Drop a subscription before it fires. Returns whether it was still registered.
    pub fn unsubscribe(&self, entity: EntityId, id: SubscriptionId) -> bool {
        let mut removed = false;
        let mut now_empty = false;
        if let Some(mut subs) = self.subscriptions.get_mut(&entity) {
            let before = subs.len();
            subs.retain(|(sid, _)| *sid != id);
            removed = subs.len() != before;
            now_empty = subs.is_empty();
        }
        if now_empty {
            self.subscriptions.remove_if(&entity, |_, subs| subs.is_empty());
        }
        removed
    }

    pub fn handle(&self, event: &Event) -> Disposition {
        match event {
            Event::Chat { entity, message } => self.on_chat(*entity, message),
            // Subscriptions belong to their owners and survive lifecycle events.
            Event::WorldChange { entity, .. }
            | Event::Death { entity }
            | Event::Leave { entity } => {
                self.discard(*entity);
                Disposition::Pass
            }
            _ => Disposition::Pass,
        }
    }

    fn on_chat(&self, entity: EntityId, message: &str) -> Disposition {
        let text = if self.strip_formatting {
            strip_formatting(message)
        } else {
            message.to_string()
        };

        if let Some((_, observers)) = self.subscriptions.remove(&entity) {
            for (_, observer) in observers {
                guarded("chat subscription", || observer(&text));
            }
        }

        // Take the request out of the map first: the callback may install a new one.
        let Some((_, callback)) = self.requests.remove(&entity) else {
            return Disposition::Pass;
        };
        self.metrics.inc_chat_captured();
        debug!("captured chat reply from {}: {}", entity, escape_log(&text));
        guarded("chat input callback", || callback(text));
        Disposition::Cancel
    }

    fn discard(&self, entity: EntityId) {
        if self.requests.remove(&entity).is_some() {
            self.metrics.inc_chat_discarded();
            debug!("discarded pending chat input for {}", entity);
        }
    }
}
