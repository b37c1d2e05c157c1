//! The host's UI surface as seen by the menu engine. The engine never renders;
//! it tells the surface what to show and asks what is currently open.
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::item::Visual;
use crate::event::{ContainerId, EntityId, Event};

/// Snapshot of a menu handed to the surface for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuView {
    pub container: ContainerId,
    pub title: String,
    pub size: usize,
    pub slots: BTreeMap<usize, Visual>,
}

pub trait Surface: Send + Sync {
    /// Container the entity is looking at right now, menu or not.
    fn current(&self, entity: EntityId) -> Option<ContainerId>;

    fn show(&self, entity: EntityId, view: &MenuView);

    /// Redraw one slot; `None` empties it.
    fn update_slot(
        &self,
        entity: EntityId,
        container: ContainerId,
        slot: usize,
        visual: Option<&Visual>,
    );

    fn close(&self, entity: EntityId);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Show {
        entity: EntityId,
        view: MenuView,
    },
    UpdateSlot {
        entity: EntityId,
        container: ContainerId,
        slot: usize,
        visual: Option<Visual>,
    },
    Close {
        entity: EntityId,
    },
}

/// In-memory surface that remembers what each entity sees and logs every call.
/// Used by the replay CLI and by tests.
#[derive(Default)]
pub struct RecordingSurface {
    open: DashMap<EntityId, ContainerId>,
    ops: Mutex<Vec<SurfaceOp>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend the host opened a container of its own (a chest, a workbench).
    pub fn open_foreign(&self, entity: EntityId, container: ContainerId) {
        self.open.insert(entity, container);
    }

    /// Mirror host-side view changes carried by the event feed.
    pub fn observe(&self, event: &Event) {
        match event {
            Event::Close {
                entity, container, ..
            } => {
                self.open.remove_if(entity, |_, open| open == container);
            }
            Event::Leave { entity } => {
                self.open.remove(entity);
            }
            _ => {}
        }
    }

    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.ops.lock().map(|ops| ops.clone()).unwrap_or_default()
    }

    fn record(&self, op: SurfaceOp) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(op);
        }
    }
}

impl Surface for RecordingSurface {
    fn current(&self, entity: EntityId) -> Option<ContainerId> {
        self.open.get(&entity).map(|c| *c)
    }

    fn show(&self, entity: EntityId, view: &MenuView) {
        self.open.insert(entity, view.container);
        self.record(SurfaceOp::Show {
            entity,
            view: view.clone(),
        });
    }

    fn update_slot(
        &self,
        entity: EntityId,
        container: ContainerId,
        slot: usize,
        visual: Option<&Visual>,
    ) {
        self.record(SurfaceOp::UpdateSlot {
            entity,
            container,
            slot,
            visual: visual.cloned(),
        });
    }

    fn close(&self, entity: EntityId) {
        self.open.remove(&entity);
        self.record(SurfaceOp::Close { entity });
    }
}
