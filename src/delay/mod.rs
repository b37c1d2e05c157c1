//! # Delay Scheduler
//!
//! Runs a deferred action for an entity after a countdown unless one of the
//! task's cancellation [`Trigger`]s fires first.
//!
//! ## Task Lifecycle
//!
//! ```text
//!              tick (remaining hits 0)
//! Scheduled ──────────────────────────▶ Completed   (on_success fires once)
//!     │
//!     └── configured trigger / cancel() ▶ Cancelled   (on_cancel fires once)
//! ```
//!
//! The active set is a [`DashMap`] keyed by task id. Whichever thread removes a
//! task from the map owns its terminal transition, so a chat trigger arriving on
//! the chat thread can never race a completing tick into firing both callbacks.
//! Terminal tasks are dropped from the map immediately; their state stays
//! readable through the [`DelayHandle`] returned by [`DelayScheduler::start`].
//!
//! The chat trigger is a one-shot subscription on the
//! [`ChatInputMultiplexer`](crate::input::ChatInputMultiplexer); every other
//! trigger is matched against events passed to [`DelayScheduler::handle`].
//!
//! The scheduler does not deduplicate tasks per entity. Features that want a
//! single delay per entity check [`DelayScheduler::has_pending`] first.

mod builder;
mod trigger;

pub use builder::{CancelCallback, DelayBuilder, DelayDuration, DelayTask, SuccessCallback};
pub use trigger::{CancelCause, Trigger};

use dashmap::DashMap;
use log::debug;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::config::DelayConfig;
use crate::errors::guarded;
use crate::event::{Disposition, EntityId, Event, Position};
use crate::input::{ChatInputMultiplexer, SubscriptionId};
use crate::metrics::Metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "delay#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DelayState {
    Scheduled = 0,
    Completed = 1,
    Cancelled = 2,
}

impl DelayState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => DelayState::Completed,
            2 => DelayState::Cancelled,
            _ => DelayState::Scheduled,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != DelayState::Scheduled
    }
}

/// Caller's view of a started task.
#[derive(Clone)]
pub struct DelayHandle {
    id: TaskId,
    entity: EntityId,
    state: Arc<AtomicU8>,
    scheduler: Weak<Inner>,
}

impl DelayHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn state(&self) -> DelayState {
        DelayState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Cancel the task if it is still scheduled; its on-cancel callback fires.
    pub fn cancel(&self) -> bool {
        match self.scheduler.upgrade() {
            Some(inner) => inner.finish(self.id, Outcome::Cancelled(CancelCause::Manual)),
            None => false,
        }
    }
}

impl fmt::Debug for DelayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayHandle")
            .field("id", &self.id)
            .field("entity", &self.entity)
            .field("state", &self.state())
            .finish()
    }
}

struct ActiveTask {
    entity: EntityId,
    remaining: u32,
    triggers: BTreeSet<Trigger>,
    origin: Option<Position>,
    on_success: Option<SuccessCallback>,
    on_cancel: Option<CancelCallback>,
    chat_subscription: Option<SubscriptionId>,
    state: Arc<AtomicU8>,
}

#[derive(Debug, Clone, Copy)]
enum Outcome {
    Completed,
    Cancelled(CancelCause),
}

struct Inner {
    tasks: DashMap<TaskId, ActiveTask>,
    chat: Arc<ChatInputMultiplexer>,
    tick_interval: Duration,
    movement_tolerance: f64,
    default_triggers: Vec<Trigger>,
    next_id: AtomicU64,
    metrics: Arc<Metrics>,
}

impl Inner {
    /// Move a task to its terminal state. Only the caller that removes the task
    /// from the active set runs its callback.
    fn finish(&self, id: TaskId, outcome: Outcome) -> bool {
        let Some((_, task)) = self.tasks.remove(&id) else {
            debug!("{} already finished; ignoring {:?}", id, outcome);
            return false;
        };
        if let Some(sub) = task.chat_subscription {
            self.chat.unsubscribe(task.entity, sub);
        }
        let entity = task.entity;
        match outcome {
            Outcome::Completed => {
                task.state
                    .store(DelayState::Completed as u8, Ordering::Release);
                self.metrics.inc_delays_completed();
                debug!("{} completed for {}", id, entity);
                if let Some(cb) = task.on_success {
                    guarded("delay success callback", || cb(entity));
                }
            }
            Outcome::Cancelled(cause) => {
                task.state
                    .store(DelayState::Cancelled as u8, Ordering::Release);
                self.metrics.inc_delays_cancelled();
                debug!("{} cancelled for {} ({})", id, entity, cause);
                if let Some(cb) = task.on_cancel {
                    guarded("delay cancel callback", || cb(entity));
                }
            }
        }
        true
    }
}

pub struct DelayScheduler {
    inner: Arc<Inner>,
}

impl DelayScheduler {
    pub fn new(
        config: &DelayConfig,
        tick_interval: Duration,
        chat: Arc<ChatInputMultiplexer>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                tasks: DashMap::new(),
                chat,
                tick_interval,
                movement_tolerance: config.movement_tolerance,
                default_triggers: config.default_triggers.clone(),
                next_id: AtomicU64::new(1),
                metrics,
            }),
        }
    }

    /// Builder preloaded with the configured default triggers.
    pub fn builder(&self, entity: EntityId) -> DelayBuilder {
        DelayBuilder::new(entity).triggers(self.inner.default_triggers.iter().copied())
    }

    pub fn start(&self, task: DelayTask) -> DelayHandle {
        let inner = &self.inner;
        let id = TaskId(inner.next_id.fetch_add(1, Ordering::Relaxed));
        let entity = task.entity;
        let state = Arc::new(AtomicU8::new(DelayState::Scheduled as u8));
        let wants_chat = task.triggers.contains(&Trigger::Chat);
        let ticks = task.duration.to_ticks(inner.tick_interval);

        inner.tasks.insert(
            id,
            ActiveTask {
                entity,
                remaining: ticks,
                triggers: task.triggers,
                origin: task.origin,
                on_success: task.on_success,
                on_cancel: task.on_cancel,
                chat_subscription: None,
                state: state.clone(),
            },
        );
        inner.metrics.inc_delays_started();
        debug!("{} scheduled for {} ({} ticks)", id, entity, ticks);

        if wants_chat {
            let weak = Arc::downgrade(inner);
            let sub = inner.chat.subscribe(entity, move |_| {
                if let Some(inner) = weak.upgrade() {
                    inner.finish(id, Outcome::Cancelled(CancelCause::Trigger(Trigger::Chat)));
                }
            });
            match inner.tasks.get_mut(&id) {
                Some(mut active) => active.chat_subscription = Some(sub),
                // Finished by another trigger before the subscription landed.
                None => {
                    inner.chat.unsubscribe(entity, sub);
                }
            }
        }

        DelayHandle {
            id,
            entity,
            state,
            scheduler: Arc::downgrade(inner),
        }
    }

    pub fn cancel(&self, id: TaskId) -> bool {
        self.inner
            .finish(id, Outcome::Cancelled(CancelCause::Manual))
    }

    pub fn has_pending(&self, entity: EntityId) -> bool {
        self.inner.tasks.iter().any(|t| t.entity == entity)
    }

    pub fn tasks_for(&self, entity: EntityId) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self
            .inner
            .tasks
            .iter()
            .filter(|t| t.entity == entity)
            .map(|t| *t.key())
            .collect();
        ids.sort();
        ids
    }

    pub fn pending_count(&self) -> usize {
        self.inner.tasks.len()
    }

    /// Ticks left on a scheduled task.
    pub fn remaining(&self, id: TaskId) -> Option<u32> {
        self.inner.tasks.get(&id).map(|t| t.remaining)
    }

    /// Advance every scheduled task by one tick, completing those that reach zero.
    pub fn tick(&self) {
        let mut due = Vec::new();
        for mut entry in self.inner.tasks.iter_mut() {
            let task = entry.value_mut();
            task.remaining = task.remaining.saturating_sub(1);
            if task.remaining == 0 {
                due.push(*entry.key());
            }
        }
        due.sort();
        for id in due {
            self.inner.finish(id, Outcome::Completed);
        }
    }

    pub fn handle(&self, event: &Event) -> Disposition {
        match event {
            Event::Tick => self.tick(),
            Event::Damage { entity, .. } => self.fire(*entity, Trigger::Damage),
            Event::Leave { entity } => self.fire(*entity, Trigger::Disconnect),
            Event::WorldChange { entity, .. } => self.fire(*entity, Trigger::WorldChange),
            Event::Move { entity, from, to } => self.on_move(*entity, from, to),
            _ => {}
        }
        Disposition::Pass
    }

    fn fire(&self, entity: EntityId, trigger: Trigger) {
        let mut ids: Vec<TaskId> = self
            .inner
            .tasks
            .iter()
            .filter(|t| t.entity == entity && t.triggers.contains(&trigger))
            .map(|t| *t.key())
            .collect();
        ids.sort();
        for id in ids {
            self.inner
                .finish(id, Outcome::Cancelled(CancelCause::Trigger(trigger)));
        }
    }

    fn on_move(&self, entity: EntityId, from: &Position, to: &Position) {
        let tolerance = self.inner.movement_tolerance;
        let mut strayed = Vec::new();
        for mut entry in self.inner.tasks.iter_mut() {
            let id = *entry.key();
            let task = entry.value_mut();
            if task.entity != entity || !task.triggers.contains(&Trigger::Movement) {
                continue;
            }
            let origin = task.origin.get_or_insert_with(|| from.clone());
            let moved_away = match origin.distance(to) {
                Some(d) => d > tolerance,
                None => true,
            };
            if moved_away {
                strayed.push(id);
            }
        }
        strayed.sort();
        for id in strayed {
            self.inner
                .finish(id, Outcome::Cancelled(CancelCause::Trigger(Trigger::Movement)));
        }
    }
}
