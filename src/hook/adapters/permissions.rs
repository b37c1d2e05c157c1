use dashmap::DashMap;
use std::any::Any;
use std::collections::HashMap;

use crate::event::EntityId;
use crate::hook::{Hook, HookKind, PluginContext};

/// Per-entity permission metadata, cached while the entity is online.
#[derive(Default)]
pub struct PermissionsHook {
    meta: DashMap<EntityId, HashMap<String, String>>,
}

impl PermissionsHook {
    pub fn new(_ctx: &PluginContext) -> anyhow::Result<Self> {
        Ok(Self::default())
    }

    pub fn set_meta(&self, entity: EntityId, key: impl Into<String>, value: impl Into<String>) {
        self.meta
            .entry(entity)
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn meta(&self, entity: EntityId, key: &str) -> Option<String> {
        self.meta.get(&entity).and_then(|m| m.get(key).cloned())
    }

    pub fn is_cached(&self, entity: EntityId) -> bool {
        self.meta.contains_key(&entity)
    }
}

impl Hook for PermissionsHook {
    fn kind(&self) -> HookKind {
        HookKind::Permissions
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_join(&self, entity: EntityId) {
        self.meta.entry(entity).or_default();
    }

    fn on_leave(&self, entity: EntityId) {
        self.meta.remove(&entity);
    }
}
