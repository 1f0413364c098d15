use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Every material, gem, fuel, and consumable the player can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Surface clay.
    Clay,
    /// Common stone.
    Stone,
    /// Copper ore.
    Copper,
    /// Iron ore.
    Iron,
    /// Silver ore.
    Silver,
    /// Gold ore.
    Gold,
    /// Titanium ore.
    Titanium,
    /// Uranium ore.
    Uranium,
    /// Self-replicating nanomachines.
    NanoSwarm,
    /// Precursor technology fragments.
    AncientTech,
    /// Rubies, the main currency.
    Rubies,
    /// Emeralds.
    Emeralds,
    /// Diamonds.
    Diamonds,
    /// Coal fuel.
    Coal,
    /// Oil fuel.
    Oil,
    /// Gas fuel.
    Gas,
    /// Ice, used for coolants.
    Ice,
    /// Salvaged scrap metal.
    Scrap,
    /// Corporate credits.
    Credits,
    /// Hull repair kit.
    RepairKit,
    /// Coolant paste.
    CoolantPaste,
    /// High-grade coolant.
    AdvancedCoolant,
}

impl ResourceKind {
    /// All resource kinds in declaration order.
    pub const ALL: [ResourceKind; 22] = [
        Self::Clay,
        Self::Stone,
        Self::Copper,
        Self::Iron,
        Self::Silver,
        Self::Gold,
        Self::Titanium,
        Self::Uranium,
        Self::NanoSwarm,
        Self::AncientTech,
        Self::Rubies,
        Self::Emeralds,
        Self::Diamonds,
        Self::Coal,
        Self::Oil,
        Self::Gas,
        Self::Ice,
        Self::Scrap,
        Self::Credits,
        Self::RepairKit,
        Self::CoolantPaste,
        Self::AdvancedCoolant,
    ];

    /// Stable snake_case identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Clay => "clay",
            Self::Stone => "stone",
            Self::Copper => "copper",
            Self::Iron => "iron",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Titanium => "titanium",
            Self::Uranium => "uranium",
            Self::NanoSwarm => "nano_swarm",
            Self::AncientTech => "ancient_tech",
            Self::Rubies => "rubies",
            Self::Emeralds => "emeralds",
            Self::Diamonds => "diamonds",
            Self::Coal => "coal",
            Self::Oil => "oil",
            Self::Gas => "gas",
            Self::Ice => "ice",
            Self::Scrap => "scrap",
            Self::Credits => "credits",
            Self::RepairKit => "repair_kit",
            Self::CoolantPaste => "coolant_paste",
            Self::AdvancedCoolant => "advanced_coolant",
        }
    }

    /// Cargo weight of one unit.
    pub fn unit_weight(self) -> f64 {
        match self {
            Self::Rubies | Self::Emeralds | Self::Diamonds => 0.1,
            Self::NanoSwarm | Self::AncientTech => 0.5,
            Self::Credits => 0.0,
            _ => 1.0,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    /// Accepts snake_case ids and the camelCase spellings (`nanoSwarm`).
    fn from_str(s: &str) -> CoreResult<Self> {
        let normalized: String = s
            .chars()
            .flat_map(|c| {
                if c.is_ascii_uppercase() {
                    vec!['_', c.to_ascii_lowercase()]
                } else {
                    vec![c]
                }
            })
            .collect();
        let normalized = normalized.trim_start_matches('_').replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.id() == normalized)
            .ok_or_else(|| CoreError::UnknownResource(s.to_string()))
    }
}

/// A fixed list of `(resource, amount)` pairs, used for costs and rewards.
pub type Bundle = [(ResourceKind, f64)];

/// Non-negative resource amounts keyed by kind.
///
/// Absent keys read as zero. No operation leaves an amount below zero:
/// credits ignore non-positive input and [`Resources::spend`] is all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resources {
    amounts: BTreeMap<ResourceKind, f64>,
}

impl Resources {
    /// An empty wallet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a wallet from pairs, summing duplicates.
    pub fn from_bundle(bundle: &Bundle) -> Self {
        let mut res = Self::new();
        for &(kind, amount) in bundle {
            res.add(kind, amount);
        }
        res
    }

    /// Amount held of `kind`.
    pub fn get(&self, kind: ResourceKind) -> f64 {
        self.amounts.get(&kind).copied().unwrap_or(0.0)
    }

    /// Credit `amount`. Non-positive or non-finite amounts are ignored.
    pub fn add(&mut self, kind: ResourceKind, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            *self.amounts.entry(kind).or_insert(0.0) += amount;
        }
    }

    /// First stored amount that is negative or not finite.
    ///
    /// The mutators never produce one; only a hand-edited save can.
    pub fn first_invalid(&self) -> Option<(ResourceKind, f64)> {
        self.amounts
            .iter()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
            .map(|(k, v)| (*k, *v))
    }

    /// Overwrite the amount of `kind`, clamped at zero.
    pub fn set(&mut self, kind: ResourceKind, amount: f64) {
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        if amount == 0.0 {
            self.amounts.remove(&kind);
        } else {
            self.amounts.insert(kind, amount);
        }
    }

    /// Remove at most `amount` of `kind` and return what was actually removed.
    pub fn take_up_to(&mut self, kind: ResourceKind, amount: f64) -> f64 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let held = self.get(kind);
        let taken = held.min(amount);
        self.set(kind, held - taken);
        taken
    }

    /// Whether every pair in `cost` is covered.
    pub fn can_afford(&self, cost: &Bundle) -> bool {
        self.check_afford(cost).is_ok()
    }

    /// The first shortfall in `cost`, or `Ok` when it can be paid.
    pub fn check_afford(&self, cost: &Bundle) -> CoreResult<()> {
        let mut needed: BTreeMap<ResourceKind, f64> = BTreeMap::new();
        for &(kind, amount) in cost {
            if !amount.is_finite() || amount < 0.0 {
                return Err(CoreError::InvalidAmount {
                    resource: kind,
                    amount,
                });
            }
            *needed.entry(kind).or_insert(0.0) += amount;
        }
        for (kind, needed) in needed {
            let available = self.get(kind);
            if available < needed {
                return Err(CoreError::InsufficientResources {
                    resource: kind,
                    needed,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Deduct every pair in `cost`, or nothing at all if any is short.
    pub fn spend(&mut self, cost: &Bundle) -> CoreResult<()> {
        self.check_afford(cost)?;
        for &(kind, amount) in cost {
            let held = self.get(kind);
            self.set(kind, held - amount);
        }
        Ok(())
    }

    /// Credit every pair in `bundle`.
    pub fn add_bundle(&mut self, bundle: &Bundle) {
        for &(kind, amount) in bundle {
            self.add(kind, amount);
        }
    }

    /// Credit everything held by `other`.
    pub fn merge(&mut self, other: &Resources) {
        for (kind, amount) in other.iter() {
            self.add(kind, amount);
        }
    }

    /// Non-zero entries in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, f64)> + '_ {
        self.amounts
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|(k, v)| (*k, *v))
    }

    /// The held amounts as a bundle.
    pub fn to_bundle(&self) -> Vec<(ResourceKind, f64)> {
        self.iter().collect()
    }

    /// Total cargo weight of everything held.
    pub fn cargo_weight(&self) -> f64 {
        self.iter().map(|(k, v)| k.unit_weight() * v).sum()
    }

    /// Sum of all amounts regardless of kind.
    pub fn total(&self) -> f64 {
        self.iter().map(|(_, v)| v).sum()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Total cargo weight of a bundle.
pub fn bundle_weight(bundle: &Bundle) -> f64 {
    bundle.iter().map(|(k, v)| k.unit_weight() * v.max(0.0)).sum()
}
