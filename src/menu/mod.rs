//! # Menu Engine
//!
//! Container-style menus rendered by the host's UI [`Surface`]. A menu is an
//! interactive surface, never storage: every click that lands in a menu is
//! cancelled, bulk transfers while a menu is the top container are cancelled,
//! and drags touching a menu are cancelled. Buttons run their click handler
//! with a [`ClickContext`] that can swap the slot, close the menu, or prompt
//! the entity for chat input.
//!
//! ```text
//! open(entity, menu) ──▶ registered ──▶ Close event / close() / Leave ──▶ retired
//!                            │                                         (on_close fires once)
//!                            └── open(entity, other) ─▶ retired with OpenNew
//! ```

pub mod context;
pub mod engine;
pub mod item;
pub mod surface;

pub use context::{ClickContext, CloseCallback, MenuContext};
pub use engine::{Menu, MenuBuilder, MenuEngine, SLOTS_PER_ROW};
pub use item::{ClickHandler, MenuItem, Visual};
pub use surface::{MenuView, RecordingSurface, Surface, SurfaceOp};

use std::sync::Arc;

use crate::cooldown::CooldownManager;
use crate::delay::DelayScheduler;
use crate::input::ChatInputMultiplexer;

/// Components a click handler may reach through its [`ClickContext`].
#[derive(Clone)]
pub struct MenuServices {
    pub chat: Arc<ChatInputMultiplexer>,
    pub delays: Arc<DelayScheduler>,
    pub cooldowns: Arc<CooldownManager>,
}
