//! Per-entity, per-key expiring cooldowns.
//!
//! Expired entries are dropped lazily on lookup and swept in bulk every
//! `[cooldown] cleanup_interval_ticks` ticks. Nothing is persisted.
//! Durations past [`MAX_COOLDOWN`] are clamped to it, which is how a
//! permanent cooldown is expressed.
use dashmap::DashMap;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::event::{Disposition, EntityId, Event};

/// Longest cooldown stored (100 years).
pub const MAX_COOLDOWN: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cooldown {
    entity: EntityId,
    key: String,
    started: Instant,
    expires_at: Instant,
}

impl Cooldown {
    fn new(entity: EntityId, key: String, duration: Duration) -> Self {
        let started = Instant::now();
        let expires_at = started
            .checked_add(duration.min(MAX_COOLDOWN))
            .unwrap_or(started);
        Self {
            entity,
            key,
            started,
            expires_at,
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn total(&self) -> Duration {
        self.expires_at.saturating_duration_since(self.started)
    }

    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// 1.0 right after `set`, 0.0 once expired.
    pub fn fraction_remaining(&self) -> f64 {
        let total = self.total().as_secs_f64();
        if total <= 0.0 {
            return 0.0;
        }
        (self.remaining().as_secs_f64() / total).clamp(0.0, 1.0)
    }
}

pub struct CooldownManager {
    cooldowns: DashMap<(EntityId, String), Cooldown>,
    cleanup_interval_ticks: u64,
    ticks: AtomicU64,
}

impl CooldownManager {
    pub fn new(cleanup_interval_ticks: u64) -> Self {
        Self {
            cooldowns: DashMap::new(),
            cleanup_interval_ticks,
            ticks: AtomicU64::new(0),
        }
    }

    /// Start (or restart) a cooldown. A zero duration stores nothing.
    pub fn set(&self, entity: EntityId, key: &str, duration: Duration) -> Option<Cooldown> {
        if duration.is_zero() {
            return None;
        }
        let cooldown = Cooldown::new(entity, key.to_string(), duration);
        self.cooldowns
            .insert((entity, key.to_string()), cooldown.clone());
        Some(cooldown)
    }

    pub fn get(&self, entity: EntityId, key: &str) -> Option<Cooldown> {
        let map_key = (entity, key.to_string());
        let found = self.cooldowns.get(&map_key).map(|c| c.value().clone())?;
        if found.expired() {
            self.cooldowns.remove_if(&map_key, |_, c| c.expired());
            return None;
        }
        Some(found)
    }

    pub fn in_cooldown(&self, entity: EntityId, key: &str) -> bool {
        self.get(entity, key).is_some()
    }

    /// Time left, zero when no cooldown is active.
    pub fn remaining(&self, entity: EntityId, key: &str) -> Duration {
        self.get(entity, key)
            .map(|c| c.remaining())
            .unwrap_or(Duration::ZERO)
    }

    pub fn remove(&self, entity: EntityId, key: &str) -> bool {
        self.cooldowns.remove(&(entity, key.to_string())).is_some()
    }

    pub fn clear(&self, entity: EntityId) {
        self.cooldowns.retain(|(owner, _), _| *owner != entity);
    }

    pub fn len(&self) -> usize {
        self.cooldowns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cooldowns.is_empty()
    }

    pub fn cleanup_expired(&self) -> usize {
        let before = self.cooldowns.len();
        self.cooldowns.retain(|_, c| !c.expired());
        let removed = before.saturating_sub(self.cooldowns.len());
        if removed > 0 {
            debug!("purged {} expired cooldowns", removed);
        }
        removed
    }

    pub fn handle(&self, event: &Event) -> Disposition {
        if let Event::Tick = event {
            let n = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
            if self.cleanup_interval_ticks > 0 && n % self.cleanup_interval_ticks == 0 {
                self.cleanup_expired();
            }
        }
        Disposition::Pass
    }
}
