//! Purchasable skills and their stat bonuses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::stats::StatModifiers;

/// Which stat a skill improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillTarget {
    /// Damage.
    Damage,
    /// Drilling speed.
    Speed,
    /// Cooling.
    Cooling,
    /// Heat generation (bonus is negative).
    HeatGen,
    /// Resource yield.
    ResourceMult,
    /// Click power.
    ClickPower,
    /// Luck.
    Luck,
    /// Max integrity.
    Integrity,
}

/// A row of the skill table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkillDef {
    /// Identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Highest level.
    pub max_level: u32,
    /// Rubies for the first level.
    pub base_cost: f64,
    /// Growth factor per level.
    pub cost_multiplier: f64,
    /// Stat the skill improves.
    pub target: SkillTarget,
    /// Percent per level.
    pub bonus_per_level: f64,
}

/// The skill table.
pub static SKILLS: [SkillDef; 8] = [
    SkillDef {
        id: "drill_mastery",
        name: "Drill Mastery",
        max_level: 20,
        base_cost: 100.0,
        cost_multiplier: 1.5,
        target: SkillTarget::Damage,
        bonus_per_level: 5.0,
    },
    SkillDef {
        id: "engine_tuning",
        name: "Engine Tuning",
        max_level: 20,
        base_cost: 100.0,
        cost_multiplier: 1.5,
        target: SkillTarget::Speed,
        bonus_per_level: 5.0,
    },
    SkillDef {
        id: "heat_sinks",
        name: "Heat Sinks",
        max_level: 15,
        base_cost: 150.0,
        cost_multiplier: 1.6,
        target: SkillTarget::Cooling,
        bonus_per_level: 8.0,
    },
    SkillDef {
        id: "efficient_burn",
        name: "Efficient Burn",
        max_level: 10,
        base_cost: 250.0,
        cost_multiplier: 1.8,
        target: SkillTarget::HeatGen,
        bonus_per_level: -4.0,
    },
    SkillDef {
        id: "prospector",
        name: "Prospector",
        max_level: 20,
        base_cost: 200.0,
        cost_multiplier: 1.6,
        target: SkillTarget::ResourceMult,
        bonus_per_level: 5.0,
    },
    SkillDef {
        id: "click_training",
        name: "Click Training",
        max_level: 10,
        base_cost: 50.0,
        cost_multiplier: 1.4,
        target: SkillTarget::ClickPower,
        bonus_per_level: 10.0,
    },
    SkillDef {
        id: "lucky_strike",
        name: "Lucky Strike",
        max_level: 10,
        base_cost: 300.0,
        cost_multiplier: 1.7,
        target: SkillTarget::Luck,
        bonus_per_level: 10.0,
    },
    SkillDef {
        id: "reinforced_hull",
        name: "Reinforced Hull",
        max_level: 20,
        base_cost: 150.0,
        cost_multiplier: 1.5,
        target: SkillTarget::Integrity,
        bonus_per_level: 5.0,
    },
];

/// Look up a skill by id.
pub fn skill_def(id: &str) -> CoreResult<&'static SkillDef> {
    SKILLS
        .iter()
        .find(|s| s.id == id)
        .ok_or_else(|| CoreError::UnknownSkill(id.to_string()))
}

/// Rubies to buy the level after `current_level`: `base · mult^level`, rounded down.
pub fn skill_cost(skill: &SkillDef, current_level: u32) -> f64 {
    (skill.base_cost * skill.cost_multiplier.powi(current_level as i32)).floor()
}

/// Learned level per skill id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillLevels {
    levels: BTreeMap<String, u32>,
}

impl SkillLevels {
    /// Empty levels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Level of a skill, 0 when unlearned.
    pub fn level(&self, id: &str) -> u32 {
        self.levels.get(id).copied().unwrap_or(0)
    }

    /// Raise a skill by one level. Returns the new level.
    pub fn level_up(&mut self, id: &str) -> CoreResult<u32> {
        let def = skill_def(id)?;
        let current = self.level(id);
        if current >= def.max_level {
            return Err(CoreError::MaxLevel(id.to_string()));
        }
        self.levels.insert(def.id.to_string(), current + 1);
        Ok(current + 1)
    }

    /// Learned skills and their levels.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.levels.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Fold learned skills into percentage modifiers.
pub fn skill_modifiers(levels: &SkillLevels) -> StatModifiers {
    let mut mods = StatModifiers::default();
    for def in &SKILLS {
        let bonus = def.bonus_per_level * levels.level(def.id) as f64;
        if bonus == 0.0 {
            continue;
        }
        match def.target {
            SkillTarget::Damage => mods.damage_pct += bonus,
            SkillTarget::Speed => mods.speed_pct += bonus,
            SkillTarget::Cooling => mods.cooling_pct += bonus,
            SkillTarget::HeatGen => mods.heat_gen_pct += bonus,
            SkillTarget::ResourceMult => mods.resource_mult_pct += bonus,
            SkillTarget::ClickPower => mods.click_power_pct += bonus,
            SkillTarget::Luck => mods.luck_pct += bonus,
            SkillTarget::Integrity => mods.integrity_pct += bonus,
        }
    }
    mods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_grows_geometrically() {
        let def = skill_def("drill_mastery").unwrap();
        assert_eq!(skill_cost(def, 0), 100.0);
        assert_eq!(skill_cost(def, 1), 150.0);
        assert_eq!(skill_cost(def, 2), 225.0);
    }

    #[test]
    fn level_up_respects_max() {
        let mut levels = SkillLevels::new();
        for expected in 1..=10 {
            assert_eq!(levels.level_up("click_training").unwrap(), expected);
        }
        assert!(matches!(
            levels.level_up("click_training"),
            Err(CoreError::MaxLevel(_))
        ));
    }

    #[test]
    fn unknown_skill_errors() {
        let mut levels = SkillLevels::new();
        assert!(matches!(levels.level_up("telepathy"), Err(CoreError::UnknownSkill(_))));
    }

    #[test]
    fn modifiers_follow_levels() {
        let mut levels = SkillLevels::new();
        levels.level_up("drill_mastery").unwrap();
        levels.level_up("drill_mastery").unwrap();
        levels.level_up("efficient_burn").unwrap();
        let mods = skill_modifiers(&levels);
        assert_eq!(mods.damage_pct, 10.0);
        assert_eq!(mods.heat_gen_pct, -4.0);
        assert_eq!(mods.speed_pct, 0.0);
    }
}
