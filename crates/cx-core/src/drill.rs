//! Drill slots, parts, and tiered part generation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::resource::ResourceKind;

/// Highest part tier.
pub const MAX_TIER: u32 = 10;

/// One of the nine equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillSlot {
    /// Cutting bit: damage.
    Bit,
    /// Engine: drilling speed.
    Engine,
    /// Cooler: heat dissipation.
    Cooling,
    /// Hull: integrity, regen, cargo.
    Hull,
    /// Logic core: crit and luck.
    Logic,
    /// Control unit: clicks and venting.
    Control,
    /// Gearbox: torque.
    Gearbox,
    /// Power core: energy and drones.
    Power,
    /// Armor: defense and hazard resistance.
    Armor,
}

impl DrillSlot {
    /// All slots in display order.
    pub const ALL: [DrillSlot; 9] = [
        Self::Bit,
        Self::Engine,
        Self::Cooling,
        Self::Hull,
        Self::Logic,
        Self::Control,
        Self::Gearbox,
        Self::Power,
        Self::Armor,
    ];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Bit => "bit",
            Self::Engine => "engine",
            Self::Cooling => "cooling",
            Self::Hull => "hull",
            Self::Logic => "logic",
            Self::Control => "control",
            Self::Gearbox => "gearbox",
            Self::Power => "power",
            Self::Armor => "armor",
        }
    }
}

impl fmt::Display for DrillSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DrillSlot {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|slot| slot.id() == lower)
            .ok_or_else(|| CoreError::UnknownSlot(s.to_string()))
    }
}

/// Item rarity, derived from tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemRarity {
    /// Tiers 1-2.
    Common,
    /// Tiers 3-4.
    Rare,
    /// Tiers 5-6.
    Epic,
    /// Tiers 7-8.
    Legendary,
    /// Tiers 9-10.
    Godly,
}

impl ItemRarity {
    /// Rarity for a part tier.
    pub fn for_tier(tier: u32) -> Self {
        match tier {
            0..=2 => Self::Common,
            3..=4 => Self::Rare,
            5..=6 => Self::Epic,
            7..=8 => Self::Legendary,
            _ => Self::Godly,
        }
    }
}

/// Raw stats a part contributes. Unused fields stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartStats {
    /// Bit damage per second.
    pub damage: f64,
    /// Engine descent speed in metres per second.
    pub speed: f64,
    /// Heat removed per second.
    pub cooling: f64,
    /// Energy drawn.
    pub energy_cost: f64,
    /// Hull maximum integrity.
    pub max_integrity: f64,
    /// Integrity regenerated per second.
    pub regen: f64,
    /// Heat capacity.
    pub heat_cap: f64,
    /// Cargo capacity for the global map.
    pub cargo_capacity: f64,
    /// Chance of a critical hit (0..1).
    pub crit_chance: f64,
    /// Luck rating.
    pub luck: f64,
    /// Seconds of warning before hazards.
    pub prediction_time: f64,
    /// Manual click multiplier.
    pub click_multiplier: f64,
    /// Manual venting speed.
    pub vent_speed: f64,
    /// Gearbox torque.
    pub torque: f64,
    /// Power core output.
    pub energy_output: f64,
    /// Drone efficiency multiplier.
    pub drone_efficiency: f64,
    /// Flat damage reduction.
    pub defense: f64,
    /// Hazard damage reduction in percent.
    pub hazard_resist: f64,
}

impl PartStats {
    /// Field-wise sum.
    pub fn sum(&self, other: &PartStats) -> PartStats {
        PartStats {
            damage: self.damage + other.damage,
            speed: self.speed + other.speed,
            cooling: self.cooling + other.cooling,
            energy_cost: self.energy_cost + other.energy_cost,
            max_integrity: self.max_integrity + other.max_integrity,
            regen: self.regen + other.regen,
            heat_cap: self.heat_cap + other.heat_cap,
            cargo_capacity: self.cargo_capacity + other.cargo_capacity,
            crit_chance: self.crit_chance + other.crit_chance,
            luck: self.luck + other.luck,
            prediction_time: self.prediction_time + other.prediction_time,
            click_multiplier: self.click_multiplier + other.click_multiplier,
            vent_speed: self.vent_speed + other.vent_speed,
            torque: self.torque + other.torque,
            energy_output: self.energy_output + other.energy_output,
            drone_efficiency: self.drone_efficiency + other.drone_efficiency,
            defense: self.defense + other.defense,
            hazard_resist: self.hazard_resist + other.hazard_resist,
        }
    }
}

/// An equipped or craftable part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillPart {
    /// Catalog id, `<slot>_t<tier>`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Slot the part fits.
    pub slot: DrillSlot,
    /// Tier 1..=10.
    pub tier: u32,
    /// Rarity for the tier.
    pub rarity: ItemRarity,
    /// Contributed stats.
    pub stats: PartStats,
}

const TIER_NAMES: [&str; 10] = [
    "Rusty", "Iron", "Steel", "Cobalt", "Titan", "Plasma", "Quantum", "Void", "Stellar", "Singularity",
];

/// Generate the part for `slot` at `tier` (clamped to 1..=10).
///
/// Primary stats grow by 1.5x per tier, energy costs by 1.35x.
pub fn part_for_tier(slot: DrillSlot, tier: u32) -> DrillPart {
    let tier = tier.clamp(1, MAX_TIER);
    let step = (tier - 1) as i32;
    let grow = 1.5_f64.powi(step);
    let cost = 1.35_f64.powi(step);

    let stats = match slot {
        DrillSlot::Bit => PartStats {
            damage: 10.0 * grow,
            energy_cost: 5.0 * cost,
            ..PartStats::default()
        },
        DrillSlot::Engine => PartStats {
            speed: 1.0 * grow,
            energy_cost: 5.0 * cost,
            ..PartStats::default()
        },
        DrillSlot::Cooling => PartStats {
            cooling: 2.0 * grow,
            energy_cost: 3.0 * cost,
            ..PartStats::default()
        },
        DrillSlot::Hull => PartStats {
            max_integrity: 100.0 * grow,
            regen: 0.5 * grow,
            heat_cap: 100.0,
            cargo_capacity: (500.0 * 20_f64.powf(step as f64 / 9.0)).round(),
            ..PartStats::default()
        },
        DrillSlot::Logic => PartStats {
            crit_chance: (0.05 + 0.01 * step as f64).min(0.25),
            luck: 1.0 * grow,
            prediction_time: 1.0 + 0.5 * step as f64,
            energy_cost: 2.0 * cost,
            ..PartStats::default()
        },
        DrillSlot::Control => PartStats {
            click_multiplier: 1.0 * grow,
            vent_speed: 1.0 + 0.25 * step as f64,
            energy_cost: 2.0 * cost,
            ..PartStats::default()
        },
        DrillSlot::Gearbox => PartStats {
            torque: 5.0 * grow,
            energy_cost: 3.0 * cost,
            ..PartStats::default()
        },
        DrillSlot::Power => PartStats {
            energy_output: 30.0 * 1.4_f64.powi(step),
            drone_efficiency: 1.0 + 0.1 * step as f64,
            ..PartStats::default()
        },
        DrillSlot::Armor => PartStats {
            defense: 2.0 * grow,
            hazard_resist: (5.0 * tier as f64).min(75.0),
            energy_cost: 2.0 * cost,
            ..PartStats::default()
        },
    };

    DrillPart {
        id: format!("{}_t{tier}", slot.id()),
        name: format!("{} {}", TIER_NAMES[(tier - 1) as usize], slot_title(slot)),
        slot,
        tier,
        rarity: ItemRarity::for_tier(tier),
        stats,
    }
}

fn slot_title(slot: DrillSlot) -> &'static str {
    match slot {
        DrillSlot::Bit => "Bit",
        DrillSlot::Engine => "Engine",
        DrillSlot::Cooling => "Cooler",
        DrillSlot::Hull => "Hull",
        DrillSlot::Logic => "Logic Core",
        DrillSlot::Control => "Control Unit",
        DrillSlot::Gearbox => "Gearbox",
        DrillSlot::Power => "Power Core",
        DrillSlot::Armor => "Armor",
    }
}

/// Material used to build parts of a tier.
pub fn tier_material(tier: u32) -> ResourceKind {
    match tier {
        0..=2 => ResourceKind::Stone,
        3 => ResourceKind::Copper,
        4 => ResourceKind::Iron,
        5 => ResourceKind::Silver,
        6 => ResourceKind::Gold,
        7 => ResourceKind::Titanium,
        8 => ResourceKind::Uranium,
        9 => ResourceKind::NanoSwarm,
        _ => ResourceKind::AncientTech,
    }
}

/// Cost of building the part of `tier` for `slot`.
pub fn upgrade_cost(slot: DrillSlot, tier: u32) -> Vec<(ResourceKind, f64)> {
    let tier = tier.clamp(1, MAX_TIER);
    let material = 100.0 * 2_f64.powi(tier as i32 - 1);
    let rubies = 50.0 * (tier * tier) as f64;
    // Hulls and power cores need extra clay for casting.
    let mut cost = vec![(tier_material(tier), material), (ResourceKind::Rubies, rubies)];
    if matches!(slot, DrillSlot::Hull | DrillSlot::Power) {
        cost.push((ResourceKind::Clay, material / 2.0));
    }
    cost
}

/// The nine equipped parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillState {
    parts: BTreeMap<DrillSlot, DrillPart>,
}

impl Default for DrillState {
    fn default() -> Self {
        Self::starter()
    }
}

impl DrillState {
    /// Tier-1 part in every slot.
    pub fn starter() -> Self {
        let parts = DrillSlot::ALL
            .into_iter()
            .map(|slot| (slot, part_for_tier(slot, 1)))
            .collect();
        Self { parts }
    }

    /// The part in `slot`. Falls back to the tier-1 part for a sparse state.
    pub fn part(&self, slot: DrillSlot) -> DrillPart {
        self.parts
            .get(&slot)
            .cloned()
            .unwrap_or_else(|| part_for_tier(slot, 1))
    }

    /// Replace the part in its slot, returning the old one.
    pub fn equip(&mut self, part: DrillPart) -> Option<DrillPart> {
        self.parts.insert(part.slot, part)
    }

    /// Tier of the part in `slot`.
    pub fn tier(&self, slot: DrillSlot) -> u32 {
        self.part(slot).tier
    }

    /// Next-tier part for `slot`, or an error at the cap.
    pub fn next_part(&self, slot: DrillSlot) -> CoreResult<DrillPart> {
        let tier = self.tier(slot);
        if tier >= MAX_TIER {
            return Err(CoreError::MaxTier(slot.to_string()));
        }
        Ok(part_for_tier(slot, tier + 1))
    }

    /// Sum of all equipped part stats.
    pub fn base_stats(&self) -> PartStats {
        DrillSlot::ALL
            .into_iter()
            .map(|slot| self.part(slot).stats)
            .fold(PartStats::default(), |acc, s| acc.sum(&s))
    }

    /// Lowest equipped tier, used to gate depth.
    pub fn min_tier(&self) -> u32 {
        DrillSlot::ALL
            .into_iter()
            .map(|slot| self.tier(slot))
            .min()
            .unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_fills_every_slot() {
        let drill = DrillState::starter();
        for slot in DrillSlot::ALL {
            assert_eq!(drill.tier(slot), 1);
        }
        let stats = drill.base_stats();
        assert_eq!(stats.damage, 10.0);
        assert_eq!(stats.max_integrity, 100.0);
        assert_eq!(stats.cargo_capacity, 500.0);
        assert_eq!(stats.energy_output, 30.0);
    }

    #[test]
    fn tiers_increase_primary_stats() {
        for slot in DrillSlot::ALL {
            let mut last = part_for_tier(slot, 1).stats;
            for tier in 2..=MAX_TIER {
                let next = part_for_tier(slot, tier).stats;
                assert!(next.damage >= last.damage);
                assert!(next.speed >= last.speed);
                assert!(next.max_integrity >= last.max_integrity);
                assert!(next.energy_output >= last.energy_output);
                last = next;
            }
        }
    }

    #[test]
    fn top_hull_hauls_ten_thousand() {
        assert_eq!(part_for_tier(DrillSlot::Hull, 10).stats.cargo_capacity, 10_000.0);
    }

    #[test]
    fn next_part_stops_at_max_tier() {
        let mut drill = DrillState::starter();
        drill.equip(part_for_tier(DrillSlot::Bit, MAX_TIER));
        assert!(matches!(drill.next_part(DrillSlot::Bit), Err(CoreError::MaxTier(_))));
        assert_eq!(drill.next_part(DrillSlot::Engine).unwrap().tier, 2);
    }

    #[test]
    fn rarity_by_tier() {
        assert_eq!(ItemRarity::for_tier(1), ItemRarity::Common);
        assert_eq!(ItemRarity::for_tier(6), ItemRarity::Epic);
        assert_eq!(ItemRarity::for_tier(10), ItemRarity::Godly);
    }

    #[test]
    fn upgrade_cost_scales() {
        let t2 = upgrade_cost(DrillSlot::Bit, 2);
        let t5 = upgrade_cost(DrillSlot::Bit, 5);
        assert_eq!(t2[0], (ResourceKind::Stone, 200.0));
        assert_eq!(t5[0], (ResourceKind::Silver, 1600.0));
        assert_eq!(upgrade_cost(DrillSlot::Hull, 2).len(), 3);
    }
}
