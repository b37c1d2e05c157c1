//! # Optional Integrations
//!
//! A fixed, closed set of [`HookKind`]s, each naming the external component it
//! needs. At start-up [`HookRegistry::initialize`] walks the set in order, asks
//! the injected [`DependencyProbe`] whether that component is loaded, and builds
//! the kind's adapter from the [`HookFactories`] table. A missing dependency or
//! a failing constructor leaves only that kind unregistered.
//!
//! ```rust
//! use std::collections::HashSet;
//! use std::sync::Arc;
//! use realmkit::config::HooksConfig;
//! use realmkit::hook::{HookFactories, HookKind, HookRegistry, PluginContext, PermissionsHook};
//! use realmkit::metrics::Metrics;
//!
//! let ctx = PluginContext::new("realmkit", "0.3.0", ".", HooksConfig::default());
//! let present: HashSet<String> = ["LuckPerms".to_string()].into_iter().collect();
//! let registry = HookRegistry::initialize(&ctx, &present, &HookFactories::builtin(), Arc::new(Metrics::new()));
//! assert!(registry.is_enabled(HookKind::Permissions));
//! assert!(registry.hook::<PermissionsHook>(HookKind::Permissions).is_some());
//! assert!(!registry.is_enabled(HookKind::Regions));
//! ```

pub mod adapters;
mod probe;
mod registry;

pub use adapters::{
    Marker, PermissionsHook, PlaceholderHook, Region, RegionHook, WebMapHook,
};
pub use probe::DependencyProbe;
pub use registry::{HookFactories, HookFactory, HookRegistry, SkipReason, Skipped};

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::path::PathBuf;

use crate::config::HooksConfig;
use crate::event::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    Permissions,
    Placeholders,
    Regions,
    WebMap,
}

impl HookKind {
    /// Discovery order.
    pub const ALL: [HookKind; 4] = [
        HookKind::Permissions,
        HookKind::Placeholders,
        HookKind::Regions,
        HookKind::WebMap,
    ];

    /// Name of the external component this kind integrates with.
    pub fn dependency(self) -> &'static str {
        match self {
            HookKind::Permissions => "LuckPerms",
            HookKind::Placeholders => "PlaceholderAPI",
            HookKind::Regions => "WorldGuard",
            HookKind::WebMap => "BlueMap",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// An adapter bridging to one optional integration. Every lifecycle method
/// defaults to a no-op.
pub trait Hook: Send + Sync + Any {
    fn kind(&self) -> HookKind;

    /// Downcast support for [`HookRegistry::hook`].
    fn as_any(&self) -> &dyn Any;

    fn on_enable(&self) {}

    fn on_disable(&self) {}

    fn on_join(&self, _entity: EntityId) {}

    fn on_leave(&self, _entity: EntityId) {}
}

/// What an adapter constructor gets to see of the owning plugin.
#[derive(Debug, Clone)]
pub struct PluginContext {
    pub name: String,
    pub version: String,
    pub data_dir: PathBuf,
    pub hooks: HooksConfig,
}

impl PluginContext {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        data_dir: impl Into<PathBuf>,
        hooks: HooksConfig,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            data_dir: data_dir.into(),
            hooks,
        }
    }
}
