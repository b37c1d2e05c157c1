use serde::{Deserialize, Serialize};
use std::fmt;

/// Real-time event kinds that cancel a scheduled delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Chat,
    Movement,
    Damage,
    Disconnect,
    WorldChange,
}

impl Trigger {
    pub const ALL: [Trigger; 5] = [
        Trigger::Chat,
        Trigger::Movement,
        Trigger::Damage,
        Trigger::Disconnect,
        Trigger::WorldChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Chat => "chat",
            Trigger::Movement => "movement",
            Trigger::Damage => "damage",
            Trigger::Disconnect => "disconnect",
            Trigger::WorldChange => "world_change",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a task left the `Scheduled` state early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    Trigger(Trigger),
    /// `DelayHandle::cancel` / `DelayScheduler::cancel`.
    Manual,
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelCause::Trigger(t) => write!(f, "trigger {}", t),
            CancelCause::Manual => f.write_str("manual cancel"),
        }
    }
}
