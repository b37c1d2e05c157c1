use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

use crate::event::{ContainerId, EntityId};
use crate::hook::HookKind;

/// Errors surfaced by the interactive-state layer. All of them are local to the
/// unit that raised them; none abort event routing.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The external component an integration needs is not loaded.
    #[error("{kind} hook disabled: dependency '{dependency}' not found")]
    MissingDependency {
        kind: HookKind,
        dependency: &'static str,
    },

    /// The integration's adapter could not be built.
    #[error("could not construct {kind} hook: {cause}")]
    AdapterConstruction { kind: HookKind, cause: String },

    /// The entity is looking at a container that is not a menu.
    #[error("entity {entity} already has container {container} open")]
    AlreadyOpenElsewhere {
        entity: EntityId,
        container: ContainerId,
    },

    /// Rejected delay parameters (zero length, etc.).
    #[error("invalid delay: {0}")]
    InvalidDelay(String),

    /// Item placed outside the menu's slot range.
    #[error("slot {slot} out of range for menu of {size} slots")]
    SlotOutOfRange { slot: usize, size: usize },

    #[error("invalid menu: {0}")]
    InvalidMenu(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Run a caller-supplied callback, containing any panic so it cannot unwind into
/// the host's dispatch loop. Returns `false` when the callback panicked.
pub(crate) fn guarded<F: FnOnce()>(unit: &str, f: F) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            log::error!("{} panicked: {}", unit, panic_message(payload.as_ref()));
            false
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guarded_contains_panics() {
        assert!(guarded("ok callback", || {}));
        assert!(!guarded("bad callback", || panic!("boom")));
    }

    #[test]
    fn messages_name_the_kind() {
        let err = CoreError::MissingDependency {
            kind: HookKind::Regions,
            dependency: "WorldGuard",
        };
        assert_eq!(
            err.to_string(),
            "Regions hook disabled: dependency 'WorldGuard' not found"
        );
    }
}
