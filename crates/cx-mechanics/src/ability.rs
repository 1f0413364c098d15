//! Combat abilities with cooldowns, durations and an activation queue.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Combat ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AbilityKind {
    /// Stuns the boss. Heats the drill.
    EmpBurst,
    /// Damage from current heat. Cools the drill.
    ThermalStrike,
    /// Short invulnerability.
    Barrier,
    /// Triple damage for a few seconds.
    Overload,
}

/// Static ability parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbilityDef {
    /// Kind.
    pub kind: AbilityKind,
    /// Display name.
    pub name: &'static str,
    /// Cooldown after activation.
    pub cooldown_ms: u64,
    /// Heat added on activation; negative cools.
    pub heat_cost: f64,
    /// Player level needed.
    pub unlock_level: u32,
    /// Active window, 0 for instant abilities.
    pub duration_ms: u64,
}

impl AbilityKind {
    /// All abilities.
    pub const ALL: [AbilityKind; 4] = [
        Self::EmpBurst,
        Self::ThermalStrike,
        Self::Barrier,
        Self::Overload,
    ];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::EmpBurst => "EMP_BURST",
            Self::ThermalStrike => "THERMAL_STRIKE",
            Self::Barrier => "BARRIER",
            Self::Overload => "OVERLOAD",
        }
    }

    /// Static definition.
    pub fn def(self) -> AbilityDef {
        match self {
            Self::EmpBurst => AbilityDef {
                kind: self,
                name: "EMP Burst",
                cooldown_ms: 15_000,
                heat_cost: 20.0,
                unlock_level: 5,
                duration_ms: 0,
            },
            Self::ThermalStrike => AbilityDef {
                kind: self,
                name: "Thermal Strike",
                cooldown_ms: 8_000,
                heat_cost: -25.0,
                unlock_level: 2,
                duration_ms: 0,
            },
            Self::Barrier => AbilityDef {
                kind: self,
                name: "Void Barrier",
                cooldown_ms: 20_000,
                heat_cost: 10.0,
                unlock_level: 10,
                duration_ms: 4_000,
            },
            Self::Overload => AbilityDef {
                kind: self,
                name: "System Overload",
                cooldown_ms: 30_000,
                heat_cost: 5.0,
                unlock_level: 15,
                duration_ms: 6_000,
            },
        }
    }
}

impl fmt::Display for AbilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AbilityKind {
    type Err = MechError;

    fn from_str(s: &str) -> MechResult<Self> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|a| a.id() == upper)
            .ok_or_else(|| MechError::UnknownAbility(s.to_string()))
    }
}

/// Runtime state of one ability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityState {
    /// Milliseconds until usable.
    pub cooldown_remaining_ms: f64,
    /// Currently in its active window.
    pub active: bool,
    /// Milliseconds left in the active window.
    pub duration_remaining_ms: f64,
}

/// All ability states plus the queue of requested activations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityBook {
    states: BTreeMap<AbilityKind, AbilityState>,
    queue: Vec<AbilityKind>,
}

impl AbilityBook {
    /// Fresh book with everything ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// State of one ability.
    pub fn state(&self, kind: AbilityKind) -> AbilityState {
        self.states.get(&kind).copied().unwrap_or_default()
    }

    /// Why `kind` cannot fire, or `Ok` when it can.
    pub fn check(&self, kind: AbilityKind, heat: f64, player_level: u32) -> MechResult<()> {
        let def = kind.def();
        let state = self.state(kind);
        let refuse = |reason: &str| MechError::AbilityUnavailable {
            id: kind.id().to_string(),
            reason: reason.to_string(),
        };
        if player_level < def.unlock_level {
            return Err(refuse(&format!("requires level {}", def.unlock_level)));
        }
        if state.cooldown_remaining_ms > 0.0 {
            return Err(refuse("cooling down"));
        }
        if state.active {
            return Err(refuse("already active"));
        }
        if def.heat_cost > 0.0 && heat + def.heat_cost >= 100.0 {
            return Err(refuse("would overheat"));
        }
        Ok(())
    }

    /// Whether `kind` can fire now.
    pub fn can_activate(&self, kind: AbilityKind, heat: f64, player_level: u32) -> bool {
        self.check(kind, heat, player_level).is_ok()
    }

    /// Start the cooldown and active window. Returns the heat delta.
    pub fn activate(&mut self, kind: AbilityKind) -> f64 {
        let def = kind.def();
        let state = self.states.entry(kind).or_default();
        state.cooldown_remaining_ms = def.cooldown_ms as f64;
        if def.duration_ms > 0 {
            state.active = true;
            state.duration_remaining_ms = def.duration_ms as f64;
        }
        def.heat_cost
    }

    /// Advance timers by `dt_secs`.
    pub fn update(&mut self, dt_secs: f64) {
        let dt_ms = dt_secs * 1000.0;
        for state in self.states.values_mut() {
            if state.cooldown_remaining_ms > 0.0 {
                state.cooldown_remaining_ms = (state.cooldown_remaining_ms - dt_ms).max(0.0);
            }
            if state.active {
                state.duration_remaining_ms -= dt_ms;
                if state.duration_remaining_ms <= 0.0 {
                    state.active = false;
                    state.duration_remaining_ms = 0.0;
                }
            }
        }
    }

    /// Cut every running cooldown by `amount_ms`.
    pub fn reduce_cooldowns(&mut self, amount_ms: f64) {
        for state in self.states.values_mut() {
            state.cooldown_remaining_ms = (state.cooldown_remaining_ms - amount_ms).max(0.0);
        }
    }

    /// Request activation on the next tick.
    pub fn enqueue(&mut self, kind: AbilityKind) {
        if !self.queue.contains(&kind) {
            self.queue.push(kind);
        }
    }

    /// Take all queued requests.
    pub fn drain_queue(&mut self) -> Vec<AbilityKind> {
        std::mem::take(&mut self.queue)
    }

    /// Whether `kind` is inside its active window.
    pub fn is_active(&self, kind: AbilityKind) -> bool {
        self.state(kind).active
    }

    /// Damage multiplier from active abilities.
    pub fn damage_multiplier(&self) -> f64 {
        if self.is_active(AbilityKind::Overload) { 3.0 } else { 1.0 }
    }

    /// Whether incoming damage is blocked.
    pub fn invulnerable(&self) -> bool {
        self.is_active(AbilityKind::Barrier)
    }
}
