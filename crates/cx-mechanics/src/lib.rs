//! Game mechanics for Cosmic Excavator.
//!
//! Provides probability helpers, the random event catalog and roller,
//! side tunnels, combat abilities, environmental hazards, and boss fights.
//! Every roll takes a caller-supplied RNG so outcomes replay from a seed.

pub mod ability;
pub mod combat;
pub mod error;
pub mod event;
pub mod hazard;
pub mod probability;
pub mod tunnel;

pub use ability::{AbilityBook, AbilityKind};
pub use combat::{Boss, BossKind, DuelContext, DuelOutcome, MinigameKind};
pub use error::{MechError, MechResult};
pub use event::{EventAction, EventContext, EventTrigger, GameEvent};
pub use hazard::{HazardContext, HazardKind, HazardOutcome};
pub use tunnel::{SideTunnel, TunnelKind};
