use std::collections::BTreeSet;
use std::time::Duration;

use super::trigger::Trigger;
use crate::errors::{CoreError, Result};
use crate::event::{EntityId, Position};

pub type SuccessCallback = Box<dyn FnOnce(EntityId) + Send + Sync + 'static>;
pub type CancelCallback = Box<dyn FnOnce(EntityId) + Send + Sync + 'static>;

/// Length of a delay, either in host ticks or wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayDuration {
    Ticks(u32),
    Time(Duration),
}

impl DelayDuration {
    /// Ticks needed to cover this duration, rounding time up to whole ticks.
    pub fn to_ticks(self, tick_interval: Duration) -> u32 {
        match self {
            DelayDuration::Ticks(n) => n,
            DelayDuration::Time(d) => {
                let tick_ms = tick_interval.as_millis().max(1);
                let ticks = d.as_millis().div_ceil(tick_ms);
                ticks.clamp(1, u32::MAX as u128) as u32
            }
        }
    }
}

/// A validated, not yet started delay.
pub struct DelayTask {
    pub(crate) entity: EntityId,
    pub(crate) duration: DelayDuration,
    pub(crate) triggers: BTreeSet<Trigger>,
    pub(crate) origin: Option<Position>,
    pub(crate) on_success: Option<SuccessCallback>,
    pub(crate) on_cancel: Option<CancelCallback>,
}

impl DelayTask {
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn duration(&self) -> DelayDuration {
        self.duration
    }

    pub fn triggers(&self) -> &BTreeSet<Trigger> {
        &self.triggers
    }
}

impl std::fmt::Debug for DelayTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayTask")
            .field("entity", &self.entity)
            .field("duration", &self.duration)
            .field("triggers", &self.triggers)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Fluent construction of a [`DelayTask`].
///
/// ```rust
/// use realmkit::delay::{DelayBuilder, Trigger};
/// use realmkit::event::EntityId;
///
/// let task = DelayBuilder::new(EntityId::new())
///     .ticks(60)
///     .cancel_on(Trigger::Movement)
///     .cancel_on(Trigger::Damage)
///     .on_success(|entity| println!("teleporting {entity}"))
///     .build()
///     .unwrap();
/// assert_eq!(task.triggers().len(), 2);
/// ```
pub struct DelayBuilder {
    entity: EntityId,
    duration: Option<DelayDuration>,
    triggers: BTreeSet<Trigger>,
    origin: Option<Position>,
    on_success: Option<SuccessCallback>,
    on_cancel: Option<CancelCallback>,
}

impl DelayBuilder {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            duration: None,
            triggers: BTreeSet::new(),
            origin: None,
            on_success: None,
            on_cancel: None,
        }
    }

    pub fn ticks(mut self, ticks: u32) -> Self {
        self.duration = Some(DelayDuration::Ticks(ticks));
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(DelayDuration::Time(duration));
        self
    }

    pub fn cancel_on(mut self, trigger: Trigger) -> Self {
        self.triggers.insert(trigger);
        self
    }

    /// Replace the whole trigger set.
    pub fn triggers<I: IntoIterator<Item = Trigger>>(mut self, triggers: I) -> Self {
        self.triggers = triggers.into_iter().collect();
        self
    }

    /// Position movement is measured from. Defaults to where the entity was at
    /// its first movement after the task started.
    pub fn origin(mut self, origin: Position) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(EntityId) + Send + Sync + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_cancel<F>(mut self, f: F) -> Self
    where
        F: FnOnce(EntityId) + Send + Sync + 'static,
    {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<DelayTask> {
        let duration = self
            .duration
            .ok_or_else(|| CoreError::InvalidDelay("no duration set".to_string()))?;
        match duration {
            DelayDuration::Ticks(0) => {
                return Err(CoreError::InvalidDelay(
                    "delay must be at least 1 tick".to_string(),
                ))
            }
            DelayDuration::Time(d) if d.is_zero() => {
                return Err(CoreError::InvalidDelay(
                    "delay duration must be positive".to_string(),
                ))
            }
            _ => {}
        }
        Ok(DelayTask {
            entity: self.entity,
            duration,
            triggers: self.triggers,
            origin: self.origin,
            on_success: self.on_success,
            on_cancel: self.on_cancel,
        })
    }
}
