//! Adapters shipped with the crate, one per [`HookKind`](super::HookKind).
//! Each is built from a [`PluginContext`](super::PluginContext) by the
//! factory table in [`HookFactories::builtin`](super::HookFactories::builtin).

mod permissions;
mod placeholders;
mod regions;
mod webmap;

pub use permissions::PermissionsHook;
pub use placeholders::{PlaceholderHook, Resolver};
pub use regions::{Region, RegionHook};
pub use webmap::{Marker, WebMapHook};
