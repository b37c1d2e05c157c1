use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use super::adapters::{PermissionsHook, PlaceholderHook, RegionHook, WebMapHook};
use super::{DependencyProbe, Hook, HookKind, PluginContext};
use crate::errors::{guarded, panic_message, CoreError};
use crate::event::{Disposition, EntityId, Event};
use crate::metrics::Metrics;

pub type HookFactory = fn(&PluginContext) -> anyhow::Result<Box<dyn Hook>>;

/// Kind → adapter constructor. Kinds without an entry are skipped.
#[derive(Clone, Default)]
pub struct HookFactories {
    table: BTreeMap<HookKind, HookFactory>,
}

impl HookFactories {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Constructors for the adapters shipped with the crate.
    pub fn builtin() -> Self {
        Self::empty()
            .with(HookKind::Permissions, build_permissions)
            .with(HookKind::Placeholders, build_placeholders)
            .with(HookKind::Regions, build_regions)
            .with(HookKind::WebMap, build_webmap)
    }

    pub fn with(mut self, kind: HookKind, factory: HookFactory) -> Self {
        self.table.insert(kind, factory);
        self
    }

    pub fn get(&self, kind: HookKind) -> Option<HookFactory> {
        self.table.get(&kind).copied()
    }
}

fn build_permissions(ctx: &PluginContext) -> anyhow::Result<Box<dyn Hook>> {
    Ok(Box::new(PermissionsHook::new(ctx)?))
}

fn build_placeholders(ctx: &PluginContext) -> anyhow::Result<Box<dyn Hook>> {
    Ok(Box::new(PlaceholderHook::new(ctx)?))
}

fn build_regions(ctx: &PluginContext) -> anyhow::Result<Box<dyn Hook>> {
    Ok(Box::new(RegionHook::new(ctx)?))
}

fn build_webmap(ctx: &PluginContext) -> anyhow::Result<Box<dyn Hook>> {
    Ok(Box::new(WebMapHook::new(ctx)?))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Disabled,
    MissingDependency(&'static str),
    NoFactory,
    ConstructionFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "disabled in config"),
            SkipReason::MissingDependency(dep) => write!(f, "dependency '{}' not found", dep),
            SkipReason::NoFactory => write!(f, "no adapter registered"),
            SkipReason::ConstructionFailed(cause) => write!(f, "construction failed: {}", cause),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub kind: HookKind,
    pub reason: SkipReason,
}

/// Registered integrations, at most one per kind, kept in registration order.
pub struct HookRegistry {
    hooks: Vec<Box<dyn Hook>>,
    skipped: Vec<Skipped>,
}

impl HookRegistry {
    pub fn initialize(
        ctx: &PluginContext,
        probe: &dyn DependencyProbe,
        factories: &HookFactories,
        metrics: Arc<Metrics>,
    ) -> Self {
        let mut hooks: Vec<Box<dyn Hook>> = Vec::new();
        let mut skipped = Vec::new();

        for kind in HookKind::ALL {
            match Self::register(kind, ctx, probe, factories) {
                Ok(hook) => {
                    info!("{} hook enabled ({})", kind, kind.dependency());
                    metrics.inc_hooks_registered();
                    hooks.push(hook);
                }
                Err(reason) => {
                    metrics.inc_hooks_skipped();
                    skipped.push(Skipped { kind, reason });
                }
            }
        }

        Self { hooks, skipped }
    }

    fn register(
        kind: HookKind,
        ctx: &PluginContext,
        probe: &dyn DependencyProbe,
        factories: &HookFactories,
    ) -> Result<Box<dyn Hook>, SkipReason> {
        if ctx.hooks.disabled.contains(&kind) {
            debug!("{} hook disabled by configuration", kind);
            return Err(SkipReason::Disabled);
        }
        let dependency = kind.dependency();
        if !probe.is_present(dependency) {
            warn!("{}", CoreError::MissingDependency { kind, dependency });
            return Err(SkipReason::MissingDependency(dependency));
        }
        let Some(factory) = factories.get(kind) else {
            warn!("{} hook has no adapter constructor; skipping", kind);
            return Err(SkipReason::NoFactory);
        };

        let built = match catch_unwind(AssertUnwindSafe(|| factory(ctx))) {
            Ok(Ok(hook)) => Ok(hook),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
        };
        match built {
            Ok(hook) if hook.kind() == kind => Ok(hook),
            Ok(hook) => {
                let cause = format!("adapter reports kind {}", hook.kind());
                warn!("{}", CoreError::AdapterConstruction { kind, cause: cause.clone() });
                Err(SkipReason::ConstructionFailed(cause))
            }
            Err(cause) => {
                warn!("{}", CoreError::AdapterConstruction { kind, cause: cause.clone() });
                Err(SkipReason::ConstructionFailed(cause))
            }
        }
    }

    /// Typed lookup; `None` when the kind is unregistered or `T` is the wrong adapter type.
    pub fn hook<T: Hook>(&self, kind: HookKind) -> Option<&T> {
        self.get(kind).and_then(|h| h.as_any().downcast_ref::<T>())
    }

    pub fn get(&self, kind: HookKind) -> Option<&dyn Hook> {
        self.hooks
            .iter()
            .find(|h| h.kind() == kind)
            .map(|h| &**h)
    }

    pub fn is_enabled(&self, kind: HookKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn registered_kinds(&self) -> Vec<HookKind> {
        self.hooks.iter().map(|h| h.kind()).collect()
    }

    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    pub fn dispatch_enable(&self) {
        for hook in &self.hooks {
            guarded(&format!("{} hook on_enable", hook.kind()), || hook.on_enable());
        }
    }

    pub fn dispatch_disable(&self) {
        for hook in &self.hooks {
            guarded(&format!("{} hook on_disable", hook.kind()), || {
                hook.on_disable()
            });
        }
    }

    pub fn dispatch_join(&self, entity: EntityId) {
        for hook in &self.hooks {
            guarded(&format!("{} hook on_join", hook.kind()), || {
                hook.on_join(entity)
            });
        }
    }

    pub fn dispatch_leave(&self, entity: EntityId) {
        for hook in &self.hooks {
            guarded(&format!("{} hook on_leave", hook.kind()), || {
                hook.on_leave(entity)
            });
        }
    }

    pub fn handle(&self, event: &Event) -> Disposition {
        match event {
            Event::Join { entity } => self.dispatch_join(*entity),
            Event::Leave { entity } => self.dispatch_leave(*entity),
            _ => {}
        }
        Disposition::Pass
    }
}
