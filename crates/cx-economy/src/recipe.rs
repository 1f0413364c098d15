//! Refinery and workshop recipes.

use std::collections::BTreeSet;

use cx_core::resource::{ResourceKind, Resources};

use crate::base::Facility;
use crate::error::{EconError, EconResult};

/// Recipe family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeKind {
    /// Refinery conversion into fuel.
    Fuel,
    /// Workshop consumable.
    Craft,
}

/// A conversion recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recipe {
    /// Stable id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Family.
    pub kind: RecipeKind,
    /// Consumed per run.
    pub inputs: &'static [(ResourceKind, f64)],
    /// Produced per run.
    pub output: (ResourceKind, f64),
    /// Facility needed at the base.
    pub facility: Facility,
}

/// All recipes, fuel first.
pub static RECIPES: [Recipe; 6] = [
    Recipe {
        id: "clay_to_oil",
        name: "Clay to Oil",
        kind: RecipeKind::Fuel,
        inputs: &[(ResourceKind::Clay, 100.0)],
        output: (ResourceKind::Oil, 10.0),
        facility: Facility::BasicRefinery,
    },
    Recipe {
        id: "stone_to_gas",
        name: "Stone to Gas",
        kind: RecipeKind::Fuel,
        inputs: &[(ResourceKind::Stone, 50.0)],
        output: (ResourceKind::Gas, 10.0),
        facility: Facility::BasicRefinery,
    },
    Recipe {
        id: "coal_to_oil",
        name: "Coal Liquefaction",
        kind: RecipeKind::Fuel,
        inputs: &[(ResourceKind::Coal, 20.0)],
        output: (ResourceKind::Oil, 15.0),
        facility: Facility::AdvancedRefinery,
    },
    Recipe {
        id: "craft_repair_kit",
        name: "Repair Kit Assembly",
        kind: RecipeKind::Craft,
        inputs: &[(ResourceKind::Iron, 50.0), (ResourceKind::Scrap, 100.0)],
        output: (ResourceKind::RepairKit, 1.0),
        facility: Facility::WorkshopFacility,
    },
    Recipe {
        id: "craft_coolant_paste",
        name: "Coolant Synthesis",
        kind: RecipeKind::Craft,
        inputs: &[(ResourceKind::Ice, 100.0), (ResourceKind::Scrap, 200.0)],
        output: (ResourceKind::CoolantPaste, 1.0),
        facility: Facility::AdvancedWorkshop,
    },
    Recipe {
        id: "craft_advanced_coolant",
        name: "Advanced Coolant",
        kind: RecipeKind::Craft,
        inputs: &[
            (ResourceKind::Ice, 200.0),
            (ResourceKind::Titanium, 50.0),
            (ResourceKind::Scrap, 500.0),
        ],
        output: (ResourceKind::AdvancedCoolant, 1.0),
        facility: Facility::AdvancedWorkshop,
    },
];

/// Look up a recipe.
pub fn recipe(id: &str) -> EconResult<&'static Recipe> {
    RECIPES
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| EconError::UnknownRecipe(id.to_string()))
}

/// Whether `times` runs of `recipe` are possible.
pub fn can_craft(recipe: &Recipe, times: u32, wallet: &Resources, facilities: &BTreeSet<Facility>) -> bool {
    check(recipe, times, wallet, facilities).is_ok()
}

fn scaled_inputs(recipe: &Recipe, times: u32) -> Vec<(ResourceKind, f64)> {
    recipe
        .inputs
        .iter()
        .map(|&(k, a)| (k, a * times as f64))
        .collect()
}

fn check(recipe: &Recipe, times: u32, wallet: &Resources, facilities: &BTreeSet<Facility>) -> EconResult<()> {
    if times == 0 {
        return Err(EconError::InvalidAmount(0.0));
    }
    if !facilities.contains(&recipe.facility) {
        return Err(EconError::MissingFacility(recipe.facility));
    }
    wallet.check_afford(&scaled_inputs(recipe, times))?;
    Ok(())
}

/// Run `recipe` `times` times. Returns what was produced.
pub fn craft(
    recipe: &Recipe,
    times: u32,
    wallet: &mut Resources,
    facilities: &BTreeSet<Facility>,
) -> EconResult<(ResourceKind, f64)> {
    check(recipe, times, wallet, facilities)?;
    wallet.spend(&scaled_inputs(recipe, times))?;
    let (kind, amount) = recipe.output;
    let produced = amount * times as f64;
    wallet.add(kind, produced);
    Ok((kind, produced))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_table() {
        assert_eq!(RECIPES.iter().filter(|r| r.kind == RecipeKind::Fuel).count(), 3);
        assert_eq!(recipe("coal_to_oil").unwrap().output, (ResourceKind::Oil, 15.0));
        assert!(matches!(recipe("gold_to_lead"), Err(EconError::UnknownRecipe(_))));
    }

    #[test]
    fn refining_needs_the_facility() {
        let r = recipe("clay_to_oil").unwrap();
        let mut wallet = Resources::from_bundle(&[(ResourceKind::Clay, 1000.0)]);
        let none = BTreeSet::new();
        assert!(matches!(
            craft(r, 1, &mut wallet, &none),
            Err(EconError::MissingFacility(Facility::BasicRefinery))
        ));
        let refinery = BTreeSet::from([Facility::BasicRefinery]);
        assert_eq!(craft(r, 3, &mut wallet, &refinery).unwrap(), (ResourceKind::Oil, 30.0));
        assert_eq!(wallet.get(ResourceKind::Clay), 700.0);
    }

    #[test]
    fn crafting_is_all_or_nothing() {
        let r = recipe("craft_advanced_coolant").unwrap();
        let shop = BTreeSet::from([Facility::AdvancedWorkshop]);
        let mut wallet = Resources::from_bundle(&[
            (ResourceKind::Ice, 200.0),
            (ResourceKind::Titanium, 10.0),
            (ResourceKind::Scrap, 500.0),
        ]);
        let before = wallet.clone();
        assert!(!can_craft(r, 1, &wallet, &shop));
        assert!(craft(r, 1, &mut wallet, &shop).is_err());
        assert_eq!(wallet, before);
    }
}
