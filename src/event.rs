//! # Event Feed Types
//!
//! The host (transport/rendering layer) delivers one [`Event`] at a time. Every
//! component exposes a `handle(&Event) -> Disposition` entry point; a component
//! either claims the event (it recognizes the entity or container) or ignores it
//! and returns [`Disposition::Pass`].
//!
//! Events are serde-tagged so an event script can be replayed from JSON lines:
//!
//! ```json
//! {"type":"chat","entity":"6f1c1d2e-8a44-4bb6-9a55-0d7c2b4c7f10","message":"hello"}
//! {"type":"tick"}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identity of a connected participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        EntityId(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a UI container instance (a menu, a chest, a player inventory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub Uuid);

impl ContainerId {
    pub fn new() -> Self {
        ContainerId(Uuid::new_v4())
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Euclidean distance, or `None` when the positions are in different worlds.
    pub fn distance(&self, other: &Position) -> Option<f64> {
        if self.world != other.world {
            return None;
        }
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        Some((dx * dx + dy * dy + dz * dz).sqrt())
    }
}

/// What the entity did with the cursor when clicking a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickAction {
    Pickup,
    Place,
    Swap,
    Drop,
    HotbarSwap,
    Clone,
    /// Shift-click: bulk transfer into the other inventory of the view.
    MoveToOtherInventory,
    /// Double-click: gather matching items from every inventory of the view.
    CollectToCursor,
    Nothing,
}

impl ClickAction {
    /// Actions that move items across the menu/player-inventory boundary.
    pub fn crosses_inventories(self) -> bool {
        matches!(
            self,
            ClickAction::MoveToOtherInventory | ClickAction::CollectToCursor
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub entity: EntityId,
    /// Top-level container of the open view.
    pub top: ContainerId,
    /// Container that was actually clicked; `None` when the click landed outside any.
    #[serde(default)]
    pub clicked: Option<ContainerId>,
    pub slot: usize,
    pub action: ClickAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragEvent {
    pub entity: EntityId,
    pub container: ContainerId,
    #[serde(default)]
    pub slots: Vec<usize>,
}

/// Why a container view was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Player,
    Disconnect,
    Death,
    Teleport,
    OpenNew,
    /// Closed by this crate itself; echoed close events with this reason are ignored.
    Programmatic,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Join {
        entity: EntityId,
    },
    Leave {
        entity: EntityId,
    },
    WorldChange {
        entity: EntityId,
        from: String,
        to: String,
    },
    Death {
        entity: EntityId,
    },
    Damage {
        entity: EntityId,
        amount: f64,
    },
    Move {
        entity: EntityId,
        from: Position,
        to: Position,
    },
    Chat {
        entity: EntityId,
        message: String,
    },
    Click(ClickEvent),
    Drag(DragEvent),
    Close {
        entity: EntityId,
        container: ContainerId,
        reason: CloseReason,
    },
    Tick,
}

impl Event {
    /// Entity the event is about, if any.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            Event::Join { entity }
            | Event::Leave { entity }
            | Event::WorldChange { entity, .. }
            | Event::Death { entity }
            | Event::Damage { entity, .. }
            | Event::Move { entity, .. }
            | Event::Chat { entity, .. }
            | Event::Close { entity, .. } => Some(*entity),
            Event::Click(click) => Some(click.entity),
            Event::Drag(drag) => Some(drag.entity),
            Event::Tick => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::Join { .. } => "join",
            Event::Leave { .. } => "leave",
            Event::WorldChange { .. } => "world_change",
            Event::Death { .. } => "death",
            Event::Damage { .. } => "damage",
            Event::Move { .. } => "move",
            Event::Chat { .. } => "chat",
            Event::Click(_) => "click",
            Event::Drag(_) => "drag",
            Event::Close { .. } => "close",
            Event::Tick => "tick",
        }
    }
}

/// Verdict a component returns for an event. `Cancel` suppresses the host's
/// default handling (broadcast for chat, item movement for clicks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    #[default]
    Pass,
    Cancel,
}

impl Disposition {
    pub fn is_cancelled(self) -> bool {
        self == Disposition::Cancel
    }

    /// Cancellation is sticky: once any component cancels, the event stays cancelled.
    pub fn merge(self, other: Disposition) -> Disposition {
        if self.is_cancelled() || other.is_cancelled() {
            Disposition::Cancel
        } else {
            Disposition::Pass
        }
    }
}
