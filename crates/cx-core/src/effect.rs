//! Timed buffs, debuffs, and anomalies applied to the drill.

use serde::{Deserialize, Serialize};

/// Broad classification of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Beneficial.
    Buff,
    /// Harmful.
    Debuff,
    /// Informational.
    Neutral,
    /// Unpredictable.
    Anomaly,
}

/// Modifiers an effect applies while active. `None` means unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectModifiers {
    /// Multiplies heat generation.
    pub heat_gen_multiplier: Option<f64>,
    /// Stops passive cooling.
    pub cooling_disabled: bool,
    /// Multiplies drilling yield.
    pub resource_multiplier: Option<f64>,
    /// Multiplies drilling speed.
    pub drill_speed_multiplier: Option<f64>,
    /// Multiplies click power.
    pub click_power_multiplier: Option<f64>,
    /// Stops drones and auto systems.
    pub auto_click_disabled: bool,
    /// Heat jitters every tick.
    pub heat_instability: bool,
}

/// An effect currently applied to the drill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Catalog id used to create it.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub kind: EffectKind,
    /// Remaining duration in ticks.
    pub duration: u32,
    /// Applied modifiers.
    pub modifiers: EffectModifiers,
}

fn effect(id: &str, name: &str, kind: EffectKind, duration: u32, modifiers: EffectModifiers) -> ActiveEffect {
    ActiveEffect {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        duration,
        modifiers,
    }
}

/// Build an effect from its catalog id.
pub fn create_effect(id: &str) -> Option<ActiveEffect> {
    let none = EffectModifiers::default();
    let fx = match id {
        "QUANTUM_FLUCTUATION_EFFECT" => effect(id, "Quantum Instability", EffectKind::Buff, 100, EffectModifiers {
            resource_multiplier: Some(5.0),
            cooling_disabled: true,
            ..none
        }),
        "GAS_BURN" => effect(id, "Gas Burn", EffectKind::Debuff, 150, EffectModifiers {
            drill_speed_multiplier: Some(1.5),
            heat_gen_multiplier: Some(2.0),
            ..none
        }),
        "NANOMITE_DAMAGE" => effect(id, "Nanomite Damage", EffectKind::Debuff, 300, EffectModifiers {
            drill_speed_multiplier: Some(0.7),
            ..none
        }),
        "GOLD_RUSH_EFFECT" => effect(id, "Gold Rush", EffectKind::Buff, 200, EffectModifiers {
            resource_multiplier: Some(5.0),
            ..none
        }),
        "AI_OVERCLOCK" => effect(id, "AI Overclock", EffectKind::Buff, 150, EffectModifiers {
            drill_speed_multiplier: Some(3.0),
            heat_gen_multiplier: Some(2.0),
            ..none
        }),
        "MAGNETIC_INTERFERENCE" => effect(id, "Magnetic Interference", EffectKind::Debuff, 300, EffectModifiers {
            auto_click_disabled: true,
            ..none
        }),
        "GRAVITY_WARP" => effect(id, "Gravity Warp", EffectKind::Anomaly, 200, EffectModifiers {
            heat_instability: true,
            ..none
        }),
        "COAL_SEAM_BUFF" => effect(id, "Coal Seam", EffectKind::Buff, 300, EffectModifiers {
            resource_multiplier: Some(1.5),
            ..none
        }),
        "PRICE_SPIKE_EFFECT" => effect(id, "Price Spike", EffectKind::Neutral, 600, none),

        "PREMIUM_NANO_REPAIR" => effect(id, "Nano Welding", EffectKind::Buff, 6000, none),
        "PREMIUM_DIAMOND_COAT" => effect(id, "Diamond Coating", EffectKind::Buff, 3000, EffectModifiers {
            drill_speed_multiplier: Some(2.0),
            ..none
        }),
        "PREMIUM_VOID_SHIELD" => effect(id, "Void Shield", EffectKind::Buff, 1800, none),
        "PREMIUM_QUANTUM_LUCK" => effect(id, "Quantum Luck", EffectKind::Buff, 3000, none),
        "PREMIUM_ABSOLUTE_ZERO" => effect(id, "Absolute Zero", EffectKind::Buff, 1200, EffectModifiers {
            heat_gen_multiplier: Some(0.0),
            ..none
        }),
        "PREMIUM_MAGNETIC_STORM" => effect(id, "Magnetic Storm", EffectKind::Buff, 3000, EffectModifiers {
            resource_multiplier: Some(3.0),
            ..none
        }),
        "PREMIUM_OVERDRIVE" => effect(id, "Core Injection", EffectKind::Buff, 600, EffectModifiers {
            click_power_multiplier: Some(5.0),
            ..none
        }),
        "PREMIUM_CHRONOS" => effect(id, "Chronos Field", EffectKind::Buff, 3000, EffectModifiers {
            drill_speed_multiplier: Some(3.0),
            ..none
        }),

        "BAR_OIL_STOUT" => effect(id, "Oil Stout", EffectKind::Buff, 600, EffectModifiers {
            heat_gen_multiplier: Some(2.0),
            ..none
        }),
        "BAR_RUSTY_NAIL" => effect(id, "Rusty Nail", EffectKind::Buff, 600, EffectModifiers {
            click_power_multiplier: Some(3.0),
            drill_speed_multiplier: Some(0.5),
            ..none
        }),
        "BAR_NUCLEAR_WHISKEY" => effect(id, "Nuclear Whiskey", EffectKind::Anomaly, 300, EffectModifiers {
            drill_speed_multiplier: Some(5.0),
            ..none
        }),
        "BAR_VOID_COCKTAIL" => effect(id, "Void Cocktail", EffectKind::Buff, 450, EffectModifiers {
            resource_multiplier: Some(10.0),
            ..none
        }),
        _ => return None,
    };
    Some(fx)
}

/// The combined modifiers of every active effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectTotals {
    /// Product of heat multipliers.
    pub heat_gen: f64,
    /// Product of yield multipliers.
    pub resource: f64,
    /// Product of speed multipliers.
    pub drill_speed: f64,
    /// Product of click multipliers.
    pub click_power: f64,
    /// Any effect disables cooling.
    pub cooling_disabled: bool,
    /// Any effect disables drones and auto systems.
    pub auto_disabled: bool,
    /// Any effect makes heat unstable.
    pub heat_instability: bool,
}

impl Default for EffectTotals {
    fn default() -> Self {
        Self {
            heat_gen: 1.0,
            resource: 1.0,
            drill_speed: 1.0,
            click_power: 1.0,
            cooling_disabled: false,
            auto_disabled: false,
            heat_instability: false,
        }
    }
}

impl EffectTotals {
    /// Fold a list of effects into totals.
    pub fn combine(effects: &[ActiveEffect]) -> Self {
        effects.iter().fold(Self::default(), |mut acc, e| {
            let m = &e.modifiers;
            acc.heat_gen *= m.heat_gen_multiplier.unwrap_or(1.0);
            acc.resource *= m.resource_multiplier.unwrap_or(1.0);
            acc.drill_speed *= m.drill_speed_multiplier.unwrap_or(1.0);
            acc.click_power *= m.click_power_multiplier.unwrap_or(1.0);
            acc.cooling_disabled |= m.cooling_disabled;
            acc.auto_disabled |= m.auto_click_disabled;
            acc.heat_instability |= m.heat_instability;
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_effect_is_none() {
        assert!(create_effect("NOT_AN_EFFECT").is_none());
    }

    #[test]
    fn gold_rush_multiplies_resources() {
        let fx = create_effect("GOLD_RUSH_EFFECT").unwrap();
        assert_eq!(fx.duration, 200);
        assert_eq!(fx.modifiers.resource_multiplier, Some(5.0));
    }

    #[test]
    fn totals_multiply_and_or_flags() {
        let effects = vec![
            create_effect("GOLD_RUSH_EFFECT").unwrap(),
            create_effect("QUANTUM_FLUCTUATION_EFFECT").unwrap(),
            create_effect("NANOMITE_DAMAGE").unwrap(),
        ];
        let totals = EffectTotals::combine(&effects);
        assert_eq!(totals.resource, 25.0);
        assert!((totals.drill_speed - 0.7).abs() < 1e-12);
        assert!(totals.cooling_disabled);
        assert!(!totals.auto_disabled);
    }

    #[test]
    fn empty_totals_are_neutral() {
        let totals = EffectTotals::combine(&[]);
        assert_eq!(totals, EffectTotals::default());
    }
}
