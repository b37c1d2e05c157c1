//! Hook discovery: registered iff the dependency is present and construction succeeds.

mod common;

use std::any::Any;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::core_with_surface;
use realmkit::config::HooksConfig;
use realmkit::event::{EntityId, Event};
use realmkit::hook::{
    Hook, HookFactories, HookKind, HookRegistry, PermissionsHook, PlaceholderHook,
    PluginContext, RegionHook, SkipReason, WebMapHook,
};
use realmkit::metrics::Metrics;

fn ctx(hooks: HooksConfig) -> PluginContext {
    PluginContext::new("realmkit", "test", ".", hooks)
}

fn present(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn registers_exactly_the_present_kinds() {
    let all = ["LuckPerms", "PlaceholderAPI", "WorldGuard", "BlueMap"];
    // Every subset of the four dependencies.
    for mask in 0u8..16 {
        let names: Vec<&str> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1u8 << *i) != 0)
            .map(|(_, n)| *n)
            .collect();
        let registry = HookRegistry::initialize(
            &ctx(HooksConfig::default()),
            &present(&names),
            &HookFactories::builtin(),
            Arc::new(Metrics::new()),
        );
        for kind in HookKind::ALL {
            let expected = names.contains(&kind.dependency());
            assert_eq!(registry.is_enabled(kind), expected, "{} mask={:04b}", kind, mask);
            assert_eq!(registry.get(kind).is_some(), expected);
        }
    }
}

#[test]
fn typed_lookup_returns_adapters() {
    let probe = |_: &str| true;
    let registry = HookRegistry::initialize(
        &ctx(HooksConfig::default()),
        &probe,
        &HookFactories::builtin(),
        Arc::new(Metrics::new()),
    );
    assert!(registry.hook::<PermissionsHook>(HookKind::Permissions).is_some());
    assert!(registry.hook::<PlaceholderHook>(HookKind::Placeholders).is_some());
    assert!(registry.hook::<RegionHook>(HookKind::Regions).is_some());
    assert!(registry.hook::<WebMapHook>(HookKind::WebMap).is_some());
    assert_eq!(registry.registered_kinds(), HookKind::ALL.to_vec());
}

#[test]
fn construction_failure_leaves_only_that_kind_out() {
    let mut hooks = HooksConfig::default();
    hooks.placeholder_prefix = "bad prefix!".into();
    hooks.webmap_marker_set = String::new();
    let metrics = Arc::new(Metrics::new());
    let probe = |_: &str| true;
    let registry = HookRegistry::initialize(
        &ctx(hooks),
        &probe,
        &HookFactories::builtin(),
        metrics.clone(),
    );
    assert_eq!(
        registry.registered_kinds(),
        vec![HookKind::Permissions, HookKind::Regions]
    );
    assert!(registry.hook::<PlaceholderHook>(HookKind::Placeholders).is_none());
    for skipped in registry.skipped() {
        assert!(matches!(skipped.reason, SkipReason::ConstructionFailed(_)));
    }
    assert_eq!(metrics.snapshot().hooks_registered, 2);
    assert_eq!(metrics.snapshot().hooks_skipped, 2);
}

fn panicking_factory(_: &PluginContext) -> anyhow::Result<Box<dyn Hook>> {
    panic!("adapter exploded")
}

#[test]
fn panicking_constructor_is_contained() {
    let factories = HookFactories::builtin().with(HookKind::Regions, panicking_factory);
    let probe = |_: &str| true;
    let registry = HookRegistry::initialize(
        &ctx(HooksConfig::default()),
        &probe,
        &factories,
        Arc::new(Metrics::new()),
    );
    assert!(!registry.is_enabled(HookKind::Regions));
    assert!(registry.is_enabled(HookKind::WebMap));
    let skipped = &registry.skipped()[0];
    assert_eq!(skipped.kind, HookKind::Regions);
    match &skipped.reason {
        SkipReason::ConstructionFailed(cause) => assert!(cause.contains("adapter exploded")),
        other => panic!("unexpected reason {:?}", other),
    }
}

#[test]
fn missing_dependency_reason_names_it() {
    let registry = HookRegistry::initialize(
        &ctx(HooksConfig::default()),
        &present(&["LuckPerms"]),
        &HookFactories::builtin(),
        Arc::new(Metrics::new()),
    );
    let reasons: Vec<_> = registry.skipped().iter().map(|s| s.reason.clone()).collect();
    assert_eq!(
        reasons,
        vec![
            SkipReason::MissingDependency("PlaceholderAPI"),
            SkipReason::MissingDependency("WorldGuard"),
            SkipReason::MissingDependency("BlueMap"),
        ]
    );
}

/// Counts lifecycle calls; reports itself as the permissions kind.
#[derive(Default)]
struct CountingHook {
    enabled: AtomicUsize,
    disabled: AtomicUsize,
    joins: AtomicUsize,
    leaves: AtomicUsize,
}

impl Hook for CountingHook {
    fn kind(&self) -> HookKind {
        HookKind::Permissions
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_enable(&self) {
        self.enabled.fetch_add(1, Ordering::SeqCst);
    }

    fn on_disable(&self) {
        self.disabled.fetch_add(1, Ordering::SeqCst);
    }

    fn on_join(&self, _entity: EntityId) {
        self.joins.fetch_add(1, Ordering::SeqCst);
    }

    fn on_leave(&self, _entity: EntityId) {
        self.leaves.fetch_add(1, Ordering::SeqCst);
    }
}

fn counting_factory(_: &PluginContext) -> anyhow::Result<Box<dyn Hook>> {
    Ok(Box::new(CountingHook::default()))
}

/// Panics when an entity joins.
struct FaultyHook;

impl Hook for FaultyHook {
    fn kind(&self) -> HookKind {
        HookKind::Regions
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn on_join(&self, _entity: EntityId) {
        panic!("join failed");
    }
}

fn faulty_factory(_: &PluginContext) -> anyhow::Result<Box<dyn Hook>> {
    Ok(Box::new(FaultyHook))
}

#[test]
fn lifecycle_fan_out_survives_panics() {
    let factories = HookFactories::empty()
        .with(HookKind::Permissions, counting_factory)
        .with(HookKind::Regions, faulty_factory);
    let probe = |_: &str| true;
    let registry = HookRegistry::initialize(
        &ctx(HooksConfig::default()),
        &probe,
        &factories,
        Arc::new(Metrics::new()),
    );
    let e = EntityId::new();
    registry.dispatch_enable();
    registry.handle(&Event::Join { entity: e });
    registry.handle(&Event::Leave { entity: e });
    registry.dispatch_disable();

    let counting = registry
        .hook::<CountingHook>(HookKind::Permissions)
        .expect("counting hook");
    assert_eq!(counting.enabled.load(Ordering::SeqCst), 1);
    assert_eq!(counting.joins.load(Ordering::SeqCst), 1);
    assert_eq!(counting.leaves.load(Ordering::SeqCst), 1);
    assert_eq!(counting.disabled.load(Ordering::SeqCst), 1);
}

fn mislabelled_factory(_: &PluginContext) -> anyhow::Result<Box<dyn Hook>> {
    Ok(Box::new(FaultyHook))
}

#[test]
fn adapter_for_the_wrong_kind_is_rejected() {
    let factories = HookFactories::empty().with(HookKind::WebMap, mislabelled_factory);
    let probe = |_: &str| true;
    let registry = HookRegistry::initialize(
        &ctx(HooksConfig::default()),
        &probe,
        &factories,
        Arc::new(Metrics::new()),
    );
    assert!(!registry.is_enabled(HookKind::WebMap));
    assert!(!registry.is_enabled(HookKind::Regions));
}

#[test]
fn core_forwards_join_and_leave_to_hooks() {
    let (core, _surface) = core_with_surface();
    let e = EntityId::new();
    let perms = core
        .hooks()
        .hook::<PermissionsHook>(HookKind::Permissions)
        .expect("permissions");
    core.handle(&Event::Join { entity: e });
    assert!(perms.is_cached(e));
    core.handle(&Event::Leave { entity: e });
    assert!(!perms.is_cached(e));
}
