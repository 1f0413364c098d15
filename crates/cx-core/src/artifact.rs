//! Artifacts: catalog, rarity rolls, and the player's inventory.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::ids::{id_matches, random_uuid, short_id};
use crate::stats::StatModifiers;

/// Number of artifacts that can be equipped at once.
pub const MAX_EQUIPPED: usize = 3;

/// Artifact rarity, from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactRarity {
    /// Weight 60.
    Common,
    /// Weight 25.
    Rare,
    /// Weight 10.
    Epic,
    /// Weight 4.
    Legendary,
    /// Weight 1.
    Anomalous,
}

impl ArtifactRarity {
    /// All rarities in roll order.
    pub const ALL: [ArtifactRarity; 5] = [
        Self::Common,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
        Self::Anomalous,
    ];

    /// Base roll weight.
    pub fn weight(self) -> f64 {
        match self {
            Self::Common => 60.0,
            Self::Rare => 25.0,
            Self::Epic => 10.0,
            Self::Legendary => 4.0,
            Self::Anomalous => 1.0,
        }
    }

    /// Seconds the analyzer needs to identify an item of this rarity.
    pub fn analysis_secs(self) -> f64 {
        match self {
            Self::Common => 10.0,
            Self::Rare => 30.0,
            Self::Epic => 60.0,
            Self::Legendary => 120.0,
            Self::Anomalous => 300.0,
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtifactDefinition {
    /// Identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Rarity.
    pub rarity: ArtifactRarity,
    /// Rubies when sold in the city.
    pub base_price: f64,
    /// Bonuses while equipped.
    pub modifiers: StatModifiers,
}

const NO_MODS: StatModifiers = StatModifiers {
    damage_pct: 0.0,
    speed_pct: 0.0,
    cooling_pct: 0.0,
    heat_gen_pct: 0.0,
    resource_mult_pct: 0.0,
    click_power_pct: 0.0,
    luck_pct: 0.0,
    integrity_pct: 0.0,
    shop_discount_pct: 0.0,
};

/// The artifact catalog.
pub static ARTIFACTS: [ArtifactDefinition; 10] = [
    ArtifactDefinition {
        id: "rusted_gear",
        name: "Rusted Gear",
        rarity: ArtifactRarity::Common,
        base_price: 100.0,
        modifiers: StatModifiers {
            speed_pct: 5.0,
            ..NO_MODS
        },
    },
    ArtifactDefinition {
        id: "fossil_shell",
        name: "Fossil Shell",
        rarity: ArtifactRarity::Common,
        base_price: 120.0,
        modifiers: StatModifiers {
            luck_pct: 5.0,
            ..NO_MODS
        },
    },
    ArtifactDefinition {
        id: "frost_shard",
        name: "Frost Shard",
        rarity: ArtifactRarity::Rare,
        base_price: 500.0,
        modifiers: StatModifiers {
            heat_gen_pct: -10.0,
            ..NO_MODS
        },
    },
    ArtifactDefinition {
        id: "miners_charm",
        name: "Miner's Charm",
        rarity: ArtifactRarity::Rare,
        base_price: 600.0,
        modifiers: StatModifiers {
            resource_mult_pct: 10.0,
            ..NO_MODS
        },
    },
    ArtifactDefinition {
        id: "merchant_seal",
        name: "Merchant Seal",
        rarity: ArtifactRarity::Rare,
        base_price: 700.0,
        modifiers: StatModifiers {
            shop_discount_pct: 5.0,
            ..NO_MODS
        },
    },
    ArtifactDefinition {
        id: "plasma_coil",
        name: "Plasma Coil",
        rarity: ArtifactRarity::Epic,
        base_price: 2000.0,
        modifiers: StatModifiers {
            speed_pct: 20.0,
            heat_gen_pct: 10.0,
            ..NO_MODS
        },
    },
    ArtifactDefinition {
        id: "echo_stone",
        name: "Echo Stone",
        rarity: ArtifactRarity::Epic,
        base_price: 2500.0,
        modifiers: StatModifiers {
            click_power_pct: 50.0,
            ..NO_MODS
        },
    },
    ArtifactDefinition {
        id: "titan_heart",
        name: "Titan Heart",
        rarity: ArtifactRarity::Legendary,
        base_price: 10_000.0,
        modifiers: StatModifiers {
            damage_pct: 40.0,
            resource_mult_pct: 15.0,
            ..NO_MODS
        },
    },
    ArtifactDefinition {
        id: "star_map",
        name: "Star Map",
        rarity: ArtifactRarity::Legendary,
        base_price: 12_000.0,
        modifiers: StatModifiers {
            luck_pct: 50.0,
            shop_discount_pct: 10.0,
            ..NO_MODS
        },
    },
    ArtifactDefinition {
        id: "void_fragment",
        name: "Void Fragment",
        rarity: ArtifactRarity::Anomalous,
        base_price: 50_000.0,
        modifiers: StatModifiers {
            resource_mult_pct: 100.0,
            heat_gen_pct: 50.0,
            ..NO_MODS
        },
    },
];

/// Look up a catalog entry.
pub fn artifact_def(id: &str) -> CoreResult<&'static ArtifactDefinition> {
    ARTIFACTS
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| CoreError::UnknownArtifact(id.to_string()))
}

/// Roll a rarity, then a definition of that rarity.
///
/// Luck and depth scale every non-common weight by `1 + luck/100 + depth/20000`.
pub fn roll_artifact(rng: &mut impl Rng, depth: f64, luck: f64) -> &'static ArtifactDefinition {
    let boost = 1.0 + luck.max(0.0) / 100.0 + depth.max(0.0) / 20_000.0;
    let weights: Vec<(ArtifactRarity, f64)> = ArtifactRarity::ALL
        .into_iter()
        .map(|r| {
            let w = if r == ArtifactRarity::Common {
                r.weight()
            } else {
                r.weight() * boost
            };
            (r, w)
        })
        .collect();
    let total: f64 = weights.iter().map(|(_, w)| w).sum();

    let mut roll = rng.random::<f64>() * total;
    let mut rarity = ArtifactRarity::Anomalous;
    for (r, w) in &weights {
        if roll < *w {
            rarity = *r;
            break;
        }
        roll -= w;
    }

    let pool: Vec<&'static ArtifactDefinition> =
        ARTIFACTS.iter().filter(|a| a.rarity == rarity).collect();
    if pool.is_empty() {
        return &ARTIFACTS[0];
    }
    pool[rng.random_range(0..pool.len())]
}

/// An owned artifact instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique instance id.
    pub instance_id: Uuid,
    /// Catalog id.
    pub def_id: String,
    /// Game time of acquisition in ms.
    pub acquired_at_ms: u64,
    /// Analyzed and usable.
    pub identified: bool,
    /// Currently equipped.
    pub equipped: bool,
}

/// The player's artifacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: BTreeMap<Uuid, InventoryItem>,
}

impl Inventory {
    /// Empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unidentified instance of `def`. Returns its id.
    pub fn add(&mut self, rng: &mut impl Rng, def: &ArtifactDefinition, now_ms: u64) -> Uuid {
        let instance_id = random_uuid(rng);
        self.items.insert(
            instance_id,
            InventoryItem {
                instance_id,
                def_id: def.id.to_string(),
                acquired_at_ms: now_ms,
                identified: false,
                equipped: false,
            },
        );
        instance_id
    }

    /// Item by id.
    pub fn get(&self, id: &Uuid) -> Option<&InventoryItem> {
        self.items.get(id)
    }

    /// Mutable item by id.
    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut InventoryItem> {
        self.items.get_mut(id)
    }

    /// Resolve a full id or short prefix.
    pub fn find(&self, query: &str) -> CoreResult<Uuid> {
        self.items
            .keys()
            .find(|id| id_matches(id, query))
            .copied()
            .ok_or_else(|| CoreError::UnknownArtifact(query.to_string()))
    }

    /// Remove an item, e.g. when sold.
    pub fn remove(&mut self, id: &Uuid) -> Option<InventoryItem> {
        self.items.remove(id)
    }

    /// All items.
    pub fn iter(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the inventory is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Equipped items.
    pub fn equipped(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values().filter(|i| i.equipped)
    }

    /// Equip an identified item.
    pub fn equip(&mut self, id: &Uuid) -> CoreResult<()> {
        let in_use = self.equipped().count();
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| CoreError::UnknownArtifact(short_id(id)))?;
        if !item.identified {
            return Err(CoreError::NotIdentified(short_id(id)));
        }
        if item.equipped {
            return Ok(());
        }
        if in_use >= MAX_EQUIPPED {
            return Err(CoreError::EquipSlotsFull(MAX_EQUIPPED));
        }
        item.equipped = true;
        Ok(())
    }

    /// Unequip an item.
    pub fn unequip(&mut self, id: &Uuid) -> CoreResult<()> {
        let item = self
            .items
            .get_mut(id)
            .ok_or_else(|| CoreError::UnknownArtifact(short_id(id)))?;
        item.equipped = false;
        Ok(())
    }

    /// Sum of the modifiers of equipped, identified items.
    pub fn modifiers(&self) -> StatModifiers {
        let mut mods = StatModifiers::default();
        for item in self.equipped().filter(|i| i.identified) {
            if let Ok(def) = artifact_def(&item.def_id) {
                mods.add(&def.modifiers);
            }
        }
        mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn catalog_covers_every_rarity() {
        for rarity in ArtifactRarity::ALL {
            assert!(ARTIFACTS.iter().any(|a| a.rarity == rarity), "{rarity:?}");
        }
    }

    #[test]
    fn roll_is_deterministic() {
        let a = roll_artifact(&mut StdRng::seed_from_u64(3), 1000.0, 5.0);
        let b = roll_artifact(&mut StdRng::seed_from_u64(3), 1000.0, 5.0);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn luck_raises_rare_share() {
        let count_rare = |luck: f64| {
            let mut rng = StdRng::seed_from_u64(11);
            (0..4000)
                .filter(|_| roll_artifact(&mut rng, 0.0, luck).rarity != ArtifactRarity::Common)
                .count()
        };
        assert!(count_rare(300.0) > count_rare(0.0));
    }

    #[test]
    fn equip_requires_identification_and_free_slot() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut inv = Inventory::new();
        let def = artifact_def("miners_charm").unwrap();
        let id = inv.add(&mut rng, def, 0);
        assert!(matches!(inv.equip(&id), Err(CoreError::NotIdentified(_))));

        inv.get_mut(&id).unwrap().identified = true;
        inv.equip(&id).unwrap();
        assert_eq!(inv.modifiers().resource_mult_pct, 10.0);

        for _ in 0..MAX_EQUIPPED - 1 {
            let extra = inv.add(&mut rng, def, 0);
            inv.get_mut(&extra).unwrap().identified = true;
            inv.equip(&extra).unwrap();
        }
        let overflow = inv.add(&mut rng, def, 0);
        inv.get_mut(&overflow).unwrap().identified = true;
        assert!(matches!(inv.equip(&overflow), Err(CoreError::EquipSlotsFull(3))));

        inv.unequip(&id).unwrap();
        inv.equip(&overflow).unwrap();
    }

    #[test]
    fn find_by_short_prefix() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut inv = Inventory::new();
        let id = inv.add(&mut rng, &ARTIFACTS[0], 0);
        assert_eq!(inv.find(&short_id(&id)).unwrap(), id);
        assert!(inv.find("zzzz").is_err());
    }

    #[test]
    fn analysis_time_grows_with_rarity() {
        let times: Vec<f64> = ArtifactRarity::ALL.iter().map(|r| r.analysis_secs()).collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }
}
