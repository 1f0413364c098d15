//! Core types for Cosmic Excavator: resources, the drill and its stats,
//! artifacts, regions, factions, licenses and timed effects.
//!
//! Everything here is plain data plus pure rules over it. The tick loop,
//! the economy, and the CLI build on these types without this crate
//! knowing about them.

/// Artifact catalog, rarity rolls and the inventory.
pub mod artifact;
/// Drill slots, parts and tiered part generation.
pub mod drill;
/// Timed buffs and debuffs.
pub mod effect;
/// Error types used throughout the crate.
pub mod error;
/// Faction reputation, tiers and perks.
pub mod faction;
/// Seeded UUIDs and short-id lookup.
pub mod ids;
/// Zone licenses and regional permits.
pub mod license;
/// Map regions, distances and zone colours.
pub mod region;
/// Resource kinds and the non-negative wallet.
pub mod resource;
/// Skill table and skill modifiers.
pub mod skill;
/// Derived drill stats.
pub mod stats;

/// Re-export artifact types.
pub use artifact::{ArtifactDefinition, ArtifactRarity, Inventory, InventoryItem};
/// Re-export drill types.
pub use drill::{DrillPart, DrillSlot, DrillState, PartStats};
/// Re-export effect types.
pub use effect::{ActiveEffect, EffectKind, EffectTotals};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export faction types.
pub use faction::{FactionId, FactionReputation, Perk};
/// Re-export license types.
pub use license::{LicenseState, PermitKind};
/// Re-export region types.
pub use region::{RegionId, ZoneColor};
/// Re-export resource types.
pub use resource::{Bundle, ResourceKind, Resources};
/// Re-export skill types.
pub use skill::SkillLevels;
/// Re-export stat types.
pub use stats::{StatModifiers, Stats, calculate_stats};
