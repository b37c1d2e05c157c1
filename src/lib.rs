//! # Realmkit - Interactive State for Multiplayer Game Servers
//!
//! Realmkit is the per-entity coordination layer that add-on features (homes,
//! shops, warps) build on. The host server feeds it one [`event::Event`] at a
//! time and gets back a [`event::Disposition`] telling it whether to suppress
//! its default handling.
//!
//! ## Features
//!
//! - **Menus**: Container-style menus with click, drag and close interception. Menus are never storage, so item duplication through them is impossible.
//! - **Chat Input**: Capture an entity's next chat message as a typed reply instead of broadcasting it.
//! - **Delays**: Countdown tasks per entity, cancelled by chat, movement, damage, disconnect or world change.
//! - **Cooldowns**: Per-entity, per-key expiring cooldowns.
//! - **Hooks**: Optional integrations discovered at start-up through an injected dependency probe.
//! - **Isolation**: Panics in caller callbacks are caught and logged; they never reach the host's dispatch loop.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashSet;
//! use std::sync::Arc;
//! use realmkit::config::Config;
//! use realmkit::core::Core;
//! use realmkit::event::{Disposition, EntityId, Event};
//! use realmkit::hook::HookFactories;
//! use realmkit::menu::RecordingSurface;
//!
//! let core = Core::new(
//!     Config::default(),
//!     Arc::new(RecordingSurface::new()),
//!     &HashSet::<String>::new(),
//!     &HookFactories::builtin(),
//! );
//! let player = EntityId::new();
//! core.chat().request_input(player, |reply| println!("got {}", reply));
//! let verdict = core.handle(&Event::Chat { entity: player, message: "north".into() });
//! assert_eq!(verdict, Disposition::Cancel);
//! ```
//!
//! ## Module Organization
//!
//! - [`core`] - The context object wiring every component, plus a Tokio ticker
//! - [`event`] - Event feed types and dispositions
//! - [`menu`] - Menu engine, items, contexts and the host surface trait
//! - [`input`] - Chat input multiplexer
//! - [`delay`] - Delay scheduler and builder
//! - [`cooldown`] - Cooldown manager
//! - [`hook`] - Hook registry and built-in adapters
//! - [`config`] - Configuration management and validation
//! - [`errors`] - Error types and the callback panic guard
//! - [`metrics`] - Runtime counters
//!
//! ## Architecture
//!
//! ```text
//!        host event feed
//!               │
//! ┌─────────────────────────┐
//! │          Core           │ ← routes each event to every component
//! └─────────────────────────┘
//!    │      │      │      │
//!  chat  delays  menus  hooks
//!    ▲      │      │
//!    └──────┘      └──▶ Surface (host rendering)
//! ```

pub mod config;
pub mod cooldown;
pub mod core;
pub mod delay;
pub mod errors;
pub mod event;
pub mod hook;
pub mod input;
pub mod logutil;
pub mod menu;
pub mod metrics;
