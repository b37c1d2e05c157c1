use anyhow::bail;
use dashmap::DashMap;
use log::info;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::guarded;
use crate::event::EntityId;
use crate::hook::{Hook, HookKind, PluginContext};

pub type Resolver = Arc<dyn Fn(Option<EntityId>) -> Option<String> + Send + Sync + 'static>;

/// Expands `%prefix_name%` tokens using registered resolvers. Text passes
/// through untouched until the hook is enabled.
pub struct PlaceholderHook {
    prefix: String,
    resolvers: DashMap<String, Resolver>,
    enabled: AtomicBool,
}

impl PlaceholderHook {
    pub fn new(ctx: &PluginContext) -> anyhow::Result<Self> {
        let prefix = ctx.hooks.placeholder_prefix.clone();
        if prefix.is_empty() {
            bail!("placeholder prefix is empty");
        }
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("placeholder prefix '{}' must be alphanumeric or '_'", prefix);
        }
        let hook = Self {
            prefix,
            resolvers: DashMap::new(),
            enabled: AtomicBool::new(false),
        };
        let name = ctx.name.clone();
        let version = ctx.version.clone();
        hook.register("name", move |_| Some(name.clone()));
        hook.register("version", move |_| Some(version.clone()));
        Ok(hook)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Add or replace a resolver. Returns true when it replaced one.
    pub fn register<F>(&self, name: &str, resolver: F) -> bool
    where
        F: Fn(Option<EntityId>) -> Option<String> + Send + Sync + 'static,
    {
        self.resolvers
            .insert(name.to_string(), Arc::new(resolver))
            .is_some()
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.resolvers.remove(name).is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn expand(&self, entity: Option<EntityId>, text: &str) -> String {
        if !self.is_enabled() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('%') else {
                out.push_str(&rest[start..]);
                return out;
            };
            match self.resolve(entity, &after[..end]) {
                Some(value) => {
                    out.push_str(&value);
                    rest = &after[end + 1..];
                }
                None => {
                    // Not ours; keep the '%' and rescan from the next one.
                    out.push('%');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    fn resolve(&self, entity: Option<EntityId>, token: &str) -> Option<String> {
        let name = token
            .strip_prefix(self.prefix.as_str())
            .and_then(|t| t.strip_prefix('_'))?;
        let resolver = self.resolvers.get(name).map(|r| r.value().clone())?;
        let mut value = None;
        guarded("placeholder resolver", || value = resolver(entity));
        value
    }
}

impl Hook for PlaceholderHook {
    fn kind(&self) -> HookKind {
        HookKind::Placeholders
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_enable(&self) {
        self.enabled.store(true, Ordering::Release);
        info!("placeholders available under %{}_*%", self.prefix);
    }

    fn on_disable(&self) {
        self.enabled.store(false, Ordering::Release);
    }
}
