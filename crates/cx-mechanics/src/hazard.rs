//! Environmental hazards that strike while drilling deep.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Depth where hazards begin.
pub const HAZARD_MIN_DEPTH: f64 = 2000.0;

/// Upper bound of the per-second hazard chance.
pub const MAX_HAZARD_CHANCE: f64 = 0.02;

/// Hazard kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardKind {
    /// Falling rock, deals integrity damage.
    CaveIn,
    /// Gas pocket, heats the drill.
    GasPocket,
    /// Magma flow, heats the drill hard.
    Magma,
}

impl HazardKind {
    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::CaveIn => "CAVE_IN",
            Self::GasPocket => "GAS_POCKET",
            Self::Magma => "MAGMA",
        }
    }
}

/// What the hazard roller needs from the game state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardContext {
    /// Current depth.
    pub depth: f64,
    /// Drill heat.
    pub heat: f64,
    /// Drill integrity.
    pub integrity: f64,
    /// Hazard resistance in percent.
    pub hazard_resist: f64,
    /// Whether the drill is running.
    pub drilling: bool,
    /// Something else already holds the player's attention: a boss, a minigame,
    /// a cooling game, or a queued event.
    pub busy: bool,
    /// QUANTUM_STABILITY halves hazard frequency.
    pub stabilized: bool,
}

/// Applied hazard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardOutcome {
    /// Kind that struck.
    pub kind: HazardKind,
    /// Integrity lost.
    pub damage: f64,
    /// Heat gained.
    pub heat_delta: f64,
}

/// Per-second hazard chance at `depth`.
pub fn hazard_chance(depth: f64, stabilized: bool) -> f64 {
    if depth < HAZARD_MIN_DEPTH {
        return 0.0;
    }
    let chance = (0.005 + (depth - HAZARD_MIN_DEPTH) / 2_000_000.0).min(MAX_HAZARD_CHANCE);
    if stabilized { chance * 0.5 } else { chance }
}

/// Roll for a hazard over `dt_secs`. Returns `None` when nothing happens or the
/// rolled hazard has no effect under current conditions.
pub fn roll_hazard(rng: &mut impl Rng, ctx: &HazardContext, dt_secs: f64) -> Option<HazardOutcome> {
    if !ctx.drilling || ctx.busy || ctx.depth < HAZARD_MIN_DEPTH {
        return None;
    }
    if rng.random::<f64>() >= hazard_chance(ctx.depth, ctx.stabilized) * dt_secs {
        return None;
    }

    let kind_roll = rng.random::<f64>();
    if kind_roll < 0.4 {
        if ctx.integrity <= 20.0 {
            return None;
        }
        let raw = (rng.random::<f64>() * 10.0 + 5.0).floor();
        let damage = (raw * (1.0 - ctx.hazard_resist / 100.0)).floor().max(0.0);
        Some(HazardOutcome { kind: HazardKind::CaveIn, damage, heat_delta: 0.0 })
    } else if kind_roll < 0.7 {
        if ctx.heat >= 80.0 {
            return None;
        }
        let heat_delta = 10.0_f64.min(100.0 - ctx.heat);
        Some(HazardOutcome { kind: HazardKind::GasPocket, damage: 0.0, heat_delta })
    } else {
        if ctx.depth <= 15_000.0 || ctx.heat >= 70.0 {
            return None;
        }
        Some(HazardOutcome { kind: HazardKind::Magma, damage: 0.0, heat_delta: 20.0 })
    }
}
