//! # Core Context
//!
//! [`Core`] owns one instance of every component and is the single place the
//! host hands events to. There are no process-wide singletons: features get
//! their collaborators from the `Core` they were given.
//!
//! ## Routing
//!
//! [`Core::handle`] offers each event to every component in a fixed order and
//! merges their verdicts (any `Cancel` wins):
//!
//! 1. chat input (must see chat before anything could broadcast it)
//! 2. delay scheduler
//! 3. menu engine
//! 4. cooldowns
//! 5. hook registry (join/leave fan-out)
//!
//! ## Ticking
//!
//! Hosts with their own tick loop call `handle(&Event::Tick)` directly. Hosts
//! without one start [`ticker::start_ticker`], which drives ticks from a Tokio
//! interval.

pub mod ticker;

use log::{debug, info};
use std::sync::Arc;

use crate::config::Config;
use crate::cooldown::CooldownManager;
use crate::delay::DelayScheduler;
use crate::event::{Disposition, Event};
use crate::hook::{DependencyProbe, HookFactories, HookRegistry, PluginContext};
use crate::input::ChatInputMultiplexer;
use crate::menu::{MenuEngine, MenuServices, Surface};
use crate::metrics::{Metrics, MetricsSnapshot};

pub struct Core {
    config: Config,
    metrics: Arc<Metrics>,
    chat: Arc<ChatInputMultiplexer>,
    delays: Arc<DelayScheduler>,
    cooldowns: Arc<CooldownManager>,
    menus: Arc<MenuEngine>,
    hooks: HookRegistry,
}

impl Core {
    /// Wire every component from `config`. Hook discovery runs here, once.
    pub fn new(
        config: Config,
        surface: Arc<dyn Surface>,
        probe: &dyn DependencyProbe,
        factories: &HookFactories,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let chat = Arc::new(ChatInputMultiplexer::new(
            config.chat.strip_formatting,
            metrics.clone(),
        ));
        let delays = Arc::new(DelayScheduler::new(
            &config.delay,
            config.core.tick_interval(),
            chat.clone(),
            metrics.clone(),
        ));
        let cooldowns = Arc::new(CooldownManager::new(config.cooldown.cleanup_interval_ticks));
        let services = MenuServices {
            chat: chat.clone(),
            delays: delays.clone(),
            cooldowns: cooldowns.clone(),
        };
        let menus = Arc::new(MenuEngine::new(
            surface,
            services,
            config.menu.max_rows,
            metrics.clone(),
        ));
        let hooks = HookRegistry::initialize(
            &Self::plugin_context(&config),
            probe,
            factories,
            metrics.clone(),
        );
        info!(
            "{} core ready: {} hook(s) registered, {} skipped",
            config.core.name,
            hooks.registered_kinds().len(),
            hooks.skipped().len()
        );

        Self {
            config,
            metrics,
            chat,
            delays,
            cooldowns,
            menus,
            hooks,
        }
    }

    pub fn plugin_context(config: &Config) -> PluginContext {
        PluginContext::new(
            config.core.name.clone(),
            env!("CARGO_PKG_VERSION"),
            ".",
            config.hooks.clone(),
        )
    }

    pub fn handle(&self, event: &Event) -> Disposition {
        let disposition = self
            .chat
            .handle(event)
            .merge(self.delays.handle(event))
            .merge(self.menus.handle(event))
            .merge(self.cooldowns.handle(event))
            .merge(self.hooks.handle(event));
        if !matches!(event, Event::Tick) {
            debug!("{} -> {:?}", event.kind(), disposition);
        }
        disposition
    }

    pub fn enable(&self) {
        self.hooks.dispatch_enable();
    }

    pub fn disable(&self) {
        self.hooks.dispatch_disable();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn chat(&self) -> &Arc<ChatInputMultiplexer> {
        &self.chat
    }

    pub fn delays(&self) -> &Arc<DelayScheduler> {
        &self.delays
    }

    pub fn cooldowns(&self) -> &Arc<CooldownManager> {
        &self.cooldowns
    }

    pub fn menus(&self) -> &Arc<MenuEngine> {
        &self.menus
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
