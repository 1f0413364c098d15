//! Derived drill stats.
//!
//! [`calculate_stats`] is the single place where part stats, skill levels,
//! artifact bonuses and depth combine into the numbers the tick loop reads.

use serde::{Deserialize, Serialize};

use crate::drill::{DrillState, MAX_TIER};

/// Percentage modifiers contributed by skills or artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatModifiers {
    /// Damage bonus.
    pub damage_pct: f64,
    /// Drilling speed bonus.
    pub speed_pct: f64,
    /// Cooling bonus.
    pub cooling_pct: f64,
    /// Heat generation change (negative is better).
    pub heat_gen_pct: f64,
    /// Yield bonus.
    pub resource_mult_pct: f64,
    /// Click power bonus.
    pub click_power_pct: f64,
    /// Luck bonus.
    pub luck_pct: f64,
    /// Integrity bonus.
    pub integrity_pct: f64,
    /// Market discount.
    pub shop_discount_pct: f64,
}

impl StatModifiers {
    /// Field-wise sum.
    pub fn add(&mut self, other: &StatModifiers) {
        self.damage_pct += other.damage_pct;
        self.speed_pct += other.speed_pct;
        self.cooling_pct += other.cooling_pct;
        self.heat_gen_pct += other.heat_gen_pct;
        self.resource_mult_pct += other.resource_mult_pct;
        self.click_power_pct += other.click_power_pct;
        self.luck_pct += other.luck_pct;
        self.integrity_pct += other.integrity_pct;
        self.shop_discount_pct += other.shop_discount_pct;
    }
}

/// Fully derived drill stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Energy produced by the power core.
    pub energy_prod: f64,
    /// Energy drawn by all parts.
    pub energy_cons: f64,
    /// `min(1, prod / cons)`.
    pub energy_efficiency: f64,
    /// Damage per second against rock and bosses.
    pub total_damage: f64,
    /// Metres per second while drilling.
    pub total_speed: f64,
    /// Heat dissipated per second.
    pub total_cooling: f64,
    /// Gearbox torque.
    pub torque: f64,
    /// Critical hit chance.
    pub crit_chance: f64,
    /// Luck after modifiers.
    pub luck: f64,
    /// Hazard warning time in seconds.
    pub prediction_time: f64,
    /// Manual click multiplier.
    pub click_mult: f64,
    /// Manual venting speed.
    pub vent_speed: f64,
    /// Flat damage reduction.
    pub defense: f64,
    /// Chance to dodge boss attacks.
    pub evasion: f64,
    /// Hazard damage reduction in percent.
    pub hazard_resist: f64,
    /// Maximum integrity.
    pub integrity: f64,
    /// Integrity regenerated per second.
    pub regen: f64,
    /// Global-map cargo capacity.
    pub cargo_capacity: f64,
    /// Drone efficiency.
    pub drone_efficiency: f64,
    /// Yield multiplier from torque.
    pub drilling_efficiency: f64,
    /// Heat generation multiplier.
    pub heat_gen_mult: f64,
    /// Yield multiplier from modifiers.
    pub resource_mult: f64,
    /// Market discount fraction, capped at 0.5.
    pub shop_discount: f64,
    /// Heat floor at the current depth.
    pub ambient_heat: f64,
    /// Lowest part tier expected at the current depth.
    pub required_tier: u32,
}

/// Heat floor at `depth`.
pub fn ambient_heat(depth: f64) -> f64 {
    (depth.max(0.0) / 500.0).min(40.0)
}

/// Part tier expected at `depth`.
pub fn required_tier(depth: f64) -> u32 {
    let tier = 1 + (depth.max(0.0) / 5000.0).floor() as u32;
    tier.min(MAX_TIER)
}

fn pct(value: f64) -> f64 {
    1.0 + value / 100.0
}

/// Combine parts, skills, artifacts and depth into [`Stats`].
pub fn calculate_stats(
    drill: &DrillState,
    skill_mods: &StatModifiers,
    artifact_mods: &StatModifiers,
    depth: f64,
) -> Stats {
    let base = drill.base_stats();

    let energy_prod = base.energy_output;
    let energy_cons = base.energy_cost;
    let energy_efficiency = if energy_cons <= 0.0 {
        1.0
    } else {
        (energy_prod / energy_cons).min(1.0)
    };

    let scaled = |value: f64, skill: f64, artifact: f64| value * pct(skill) * pct(artifact);

    let total_damage = scaled(base.damage, skill_mods.damage_pct, artifact_mods.damage_pct) * energy_efficiency;
    let total_speed = scaled(base.speed, skill_mods.speed_pct, artifact_mods.speed_pct) * energy_efficiency;
    let total_cooling = scaled(base.cooling, skill_mods.cooling_pct, artifact_mods.cooling_pct);
    let luck = scaled(base.luck, skill_mods.luck_pct, artifact_mods.luck_pct);
    let click_mult = scaled(
        base.click_multiplier,
        skill_mods.click_power_pct,
        artifact_mods.click_power_pct,
    );
    let integrity = scaled(
        base.max_integrity,
        skill_mods.integrity_pct,
        artifact_mods.integrity_pct,
    )
    .round();
    let heat_gen_mult = (pct(skill_mods.heat_gen_pct) * pct(artifact_mods.heat_gen_pct)).max(0.0);
    let resource_mult = pct(skill_mods.resource_mult_pct) * pct(artifact_mods.resource_mult_pct);
    let shop_discount = ((skill_mods.shop_discount_pct + artifact_mods.shop_discount_pct) / 100.0).clamp(0.0, 0.5);

    Stats {
        energy_prod,
        energy_cons,
        energy_efficiency,
        total_damage,
        total_speed,
        total_cooling,
        torque: base.torque,
        crit_chance: base.crit_chance.clamp(0.0, 1.0),
        luck,
        prediction_time: base.prediction_time,
        click_mult,
        vent_speed: base.vent_speed,
        defense: base.defense,
        evasion: (base.prediction_time * 0.02).min(0.3),
        hazard_resist: base.hazard_resist.min(90.0),
        integrity,
        regen: base.regen,
        cargo_capacity: base.cargo_capacity,
        drone_efficiency: base.drone_efficiency.max(0.0),
        drilling_efficiency: 1.0 + base.torque / 100.0,
        heat_gen_mult,
        resource_mult,
        shop_discount,
        ambient_heat: ambient_heat(depth),
        required_tier: required_tier(depth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill::{DrillSlot, part_for_tier};

    #[test]
    fn starter_stats() {
        let stats = calculate_stats(
            &DrillState::starter(),
            &StatModifiers::default(),
            &StatModifiers::default(),
            0.0,
        );
        // starter power covers the 22 energy drawn by the other parts
        assert_eq!(stats.energy_efficiency, 1.0);
        assert_eq!(stats.total_damage, 10.0);
        assert_eq!(stats.integrity, 100.0);
        assert_eq!(stats.ambient_heat, 0.0);
        assert_eq!(stats.required_tier, 1);
    }

    #[test]
    fn modifiers_stack_multiplicatively() {
        let skills = StatModifiers {
            damage_pct: 10.0,
            ..StatModifiers::default()
        };
        let artifacts = StatModifiers {
            damage_pct: 20.0,
            ..StatModifiers::default()
        };
        let stats = calculate_stats(&DrillState::starter(), &skills, &artifacts, 0.0);
        assert!((stats.total_damage - 13.2).abs() < 1e-9);
    }

    #[test]
    fn low_energy_scales_damage_and_speed() {
        let mut drill = DrillState::starter();
        drill.equip(part_for_tier(DrillSlot::Bit, 10));
        drill.equip(part_for_tier(DrillSlot::Engine, 10));
        let stats = calculate_stats(&drill, &StatModifiers::default(), &StatModifiers::default(), 0.0);
        assert!(stats.energy_efficiency < 1.0);
        let raw = part_for_tier(DrillSlot::Bit, 10).stats.damage;
        assert!((stats.total_damage - raw * stats.energy_efficiency).abs() < 1e-9);
    }

    #[test]
    fn depth_drives_ambient_heat_and_tier() {
        assert_eq!(ambient_heat(10_000.0), 20.0);
        assert_eq!(ambient_heat(1_000_000.0), 40.0);
        assert_eq!(required_tier(4_999.0), 1);
        assert_eq!(required_tier(5_000.0), 2);
        assert_eq!(required_tier(500_000.0), 10);
    }

    #[test]
    fn shop_discount_is_capped() {
        let artifacts = StatModifiers {
            shop_discount_pct: 80.0,
            ..StatModifiers::default()
        };
        let stats = calculate_stats(&DrillState::starter(), &StatModifiers::default(), &artifacts, 0.0);
        assert_eq!(stats.shop_discount, 0.5);
    }
}
