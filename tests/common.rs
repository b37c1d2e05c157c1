//! Test utilities & fixtures shared by the integration tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use realmkit::config::Config;
use realmkit::core::Core;
use realmkit::event::{ClickAction, ClickEvent, ContainerId, DragEvent, EntityId, Event, Position};
use realmkit::hook::{HookFactories, HookKind};
use realmkit::menu::RecordingSurface;

/// Thread-safe call log for callbacks under test.
#[derive(Clone)]
pub struct Recorder<T>(Arc<Mutex<Vec<T>>>);

#[allow(dead_code)]
impl<T: Clone> Recorder<T> {
    pub fn new() -> Self {
        Recorder(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn push(&self, value: T) {
        self.0.lock().expect("recorder lock").push(value);
    }

    pub fn calls(&self) -> Vec<T> {
        self.0.lock().expect("recorder lock").clone()
    }

    pub fn count(&self) -> usize {
        self.0.lock().expect("recorder lock").len()
    }
}

/// A core with every hook dependency reported present.
#[allow(dead_code)]
pub fn core_with_surface() -> (Core, Arc<RecordingSurface>) {
    core_with(Config::default())
}

#[allow(dead_code)]
pub fn core_with(config: Config) -> (Core, Arc<RecordingSurface>) {
    let surface = Arc::new(RecordingSurface::new());
    let present: HashSet<String> = HookKind::ALL
        .iter()
        .map(|k| k.dependency().to_string())
        .collect();
    let core = Core::new(config, surface.clone(), &present, &HookFactories::builtin());
    (core, surface)
}

/// Deliver an event the way a host would: the surface mirrors it first.
#[allow(dead_code)]
pub fn deliver(core: &Core, surface: &RecordingSurface, event: Event) -> realmkit::event::Disposition {
    surface.observe(&event);
    core.handle(&event)
}

#[allow(dead_code)]
pub fn chat(entity: EntityId, message: &str) -> Event {
    Event::Chat {
        entity,
        message: message.to_string(),
    }
}

#[allow(dead_code)]
pub fn click(
    entity: EntityId,
    top: ContainerId,
    clicked: Option<ContainerId>,
    slot: usize,
    action: ClickAction,
) -> Event {
    Event::Click(ClickEvent {
        entity,
        top,
        clicked,
        slot,
        action,
    })
}

#[allow(dead_code)]
pub fn drag(entity: EntityId, container: ContainerId, slots: &[usize]) -> Event {
    Event::Drag(DragEvent {
        entity,
        container,
        slots: slots.to_vec(),
    })
}

#[allow(dead_code)]
pub fn step(entity: EntityId, from: (f64, f64, f64), to: (f64, f64, f64)) -> Event {
    Event::Move {
        entity,
        from: Position::new("world", from.0, from.1, from.2),
        to: Position::new("world", to.0, to.1, to.2),
    }
}
