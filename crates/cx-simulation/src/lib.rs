//! Tick-based game simulation for Cosmic Excavator.
//!
//! Holds the complete [`state::GameState`], drives it through a fixed list of
//! systems (drilling, effects, events, combat, travel, bases, caravans and
//! quests), applies player commands between ticks and exports saves as
//! Base64-wrapped JSON. All randomness flows from one seeded RNG, so a seed
//! plus a command sequence always replays the same game.

/// Player commands and the rules that apply them.
pub mod actions;
/// Simulation clock for tracking ticks and game time.
pub mod clock;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable context passed to systems each tick.
pub mod context;
/// Mining drones.
pub mod drone;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Save export and import.
pub mod save;
/// Top-level simulation orchestrator.
pub mod simulation;
/// The complete game state.
pub mod state;
/// The trait that all simulation systems implement.
pub mod system;
/// Built-in tick systems.
pub mod systems;

/// Re-exports of [`actions::PlayerAction`] and [`actions::apply_action`].
pub use actions::{PlayerAction, apply_action};
/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-export of [`config::SimConfig`].
pub use config::SimConfig;
/// Re-export of [`context::SimContext`].
pub use context::SimContext;
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::SimEvent`], and [`event::SimEventKind`].
pub use event::{EventLog, SimEvent, SimEventKind};
/// Re-exports of the save helpers.
pub use save::{SaveGame, export_save, import_save};
/// Re-export of [`simulation::Simulation`].
pub use simulation::Simulation;
/// Re-export of [`state::GameState`].
pub use state::GameState;
/// Re-export of [`system::System`].
pub use system::System;
