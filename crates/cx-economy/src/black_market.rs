//! The rebel black market: limited stock, reputation gated.

use std::collections::BTreeMap;

use cx_core::faction::{FactionId, FactionReputation, Perk};
use cx_core::resource::{ResourceKind, Resources};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EconError, EconResult};

/// What a black market item delivers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BlackMarketReward {
    /// Resources credited to the player.
    Resource(ResourceKind, f64),
    /// A blueprint unlock.
    Blueprint(&'static str),
    /// Shield charge restored.
    Shield(f64),
    /// Heat vented to zero.
    HeatVent,
}

/// A black market listing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackMarketItem {
    /// Stable id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Price.
    pub cost: &'static [(ResourceKind, f64)],
    /// Units available per game.
    pub stock: u32,
    /// Minimum REBELS reputation.
    pub required_reputation: i64,
    /// Delivery.
    pub reward: BlackMarketReward,
}

/// Listings.
pub static BLACK_MARKET_ITEMS: [BlackMarketItem; 5] = [
    BlackMarketItem {
        id: "bm_ancient_tech_small",
        name: "Ancient Container (S)",
        cost: &[(ResourceKind::Rubies, 5000.0), (ResourceKind::Uranium, 50.0)],
        stock: 5,
        required_reputation: 300,
        reward: BlackMarketReward::Resource(ResourceKind::AncientTech, 5.0),
    },
    BlackMarketItem {
        id: "bm_blueprint_fusion",
        name: "Blueprint: Fusion Core",
        cost: &[(ResourceKind::NanoSwarm, 100.0), (ResourceKind::Diamonds, 20.0)],
        stock: 1,
        required_reputation: 600,
        reward: BlackMarketReward::Blueprint("blueprint_fusion_core"),
    },
    BlackMarketItem {
        id: "bm_shield_generator",
        name: "Field Generator (Prototype)",
        cost: &[(ResourceKind::Rubies, 2000.0)],
        stock: 10,
        required_reputation: 100,
        reward: BlackMarketReward::Shield(50.0),
    },
    BlackMarketItem {
        id: "bm_heat_sync",
        name: "Heat Synchronizer",
        cost: &[(ResourceKind::Rubies, 3000.0), (ResourceKind::Gold, 200.0)],
        stock: 5,
        required_reputation: 300,
        reward: BlackMarketReward::HeatVent,
    },
    BlackMarketItem {
        id: "bm_nano_swarm_pack",
        name: "Swarm Capsule",
        cost: &[(ResourceKind::AncientTech, 10.0)],
        stock: 3,
        required_reputation: 1000,
        reward: BlackMarketReward::Resource(ResourceKind::NanoSwarm, 1000.0),
    },
];

/// Look up a listing.
pub fn item(id: &str) -> Option<&'static BlackMarketItem> {
    BLACK_MARKET_ITEMS.iter().find(|i| i.id == id)
}

/// Units sold so far, per item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlackMarketStock {
    sold: BTreeMap<String, u32>,
}

impl BlackMarketStock {
    /// Nothing sold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Units left of `item`.
    pub fn remaining(&self, item: &BlackMarketItem) -> u32 {
        item.stock.saturating_sub(self.sold.get(item.id).copied().unwrap_or(0))
    }

    /// Buy one unit. Resource rewards are credited; the rest are returned for
    /// the caller to apply.
    pub fn purchase(
        &mut self,
        id: &str,
        reputation: &FactionReputation,
        market_unlocked: bool,
        wallet: &mut Resources,
    ) -> EconResult<BlackMarketReward> {
        let item = item(id).ok_or_else(|| EconError::UnknownItem(id.to_string()))?;
        if !market_unlocked && !reputation.has_perk(Perk::BlackMarket) {
            return Err(EconError::BlackMarketLocked);
        }
        let rep = reputation.get(FactionId::Rebels);
        if rep < item.required_reputation {
            return Err(EconError::ReputationTooLow {
                required: item.required_reputation,
                have: rep,
            });
        }
        if self.remaining(item) == 0 {
            return Err(EconError::OutOfStock(item.id.to_string()));
        }
        wallet.spend(item.cost)?;
        *self.sold.entry(item.id.to_string()).or_insert(0) += 1;
        if let BlackMarketReward::Resource(kind, amount) = item.reward {
            wallet.add(kind, amount);
        }
        info!(item = item.id, "black market purchase");
        Ok(item.reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebels(amount: i64) -> FactionReputation {
        let mut rep = FactionReputation::new();
        rep.add_reputation(FactionId::Rebels, amount);
        rep
    }

    #[test]
    fn listing_table() {
        let ids: Vec<_> = BLACK_MARKET_ITEMS.iter().map(|i| i.id).collect();
        assert_eq!(
            ids,
            [
                "bm_ancient_tech_small",
                "bm_blueprint_fusion",
                "bm_shield_generator",
                "bm_heat_sync",
                "bm_nano_swarm_pack"
            ]
        );
        assert!(item("bm_heat_sync").is_some());
        assert!(item("bm_nothing").is_none());
    }

    #[test]
    fn locked_without_perk_or_unlock() {
        let mut stock = BlackMarketStock::new();
        let mut wallet = Resources::from_bundle(&[(ResourceKind::Rubies, 10_000.0)]);
        let rep = rebels(100);
        assert!(matches!(
            stock.purchase("bm_shield_generator", &rep, false, &mut wallet),
            Err(EconError::BlackMarketLocked)
        ));
        assert_eq!(
            stock.purchase("bm_shield_generator", &rep, true, &mut wallet).unwrap(),
            BlackMarketReward::Shield(50.0)
        );
        assert_eq!(wallet.get(ResourceKind::Rubies), 8_000.0);
    }

    #[test]
    fn reputation_gate() {
        let mut stock = BlackMarketStock::new();
        let mut wallet = Resources::from_bundle(&[(ResourceKind::AncientTech, 100.0)]);
        assert!(matches!(
            stock.purchase("bm_nano_swarm_pack", &rebels(999), true, &mut wallet),
            Err(EconError::ReputationTooLow { required: 1000, .. })
        ));
        stock.purchase("bm_nano_swarm_pack", &rebels(1000), true, &mut wallet).unwrap();
        assert_eq!(wallet.get(ResourceKind::NanoSwarm), 1000.0);
        assert_eq!(wallet.get(ResourceKind::AncientTech), 90.0);
    }

    #[test]
    fn stock_runs_out() {
        let mut stock = BlackMarketStock::new();
        let mut wallet = Resources::from_bundle(&[
            (ResourceKind::NanoSwarm, 1000.0),
            (ResourceKind::Diamonds, 1000.0),
        ]);
        let rep = rebels(600);
        assert_eq!(
            stock.purchase("bm_blueprint_fusion", &rep, true, &mut wallet).unwrap(),
            BlackMarketReward::Blueprint("blueprint_fusion_core")
        );
        assert!(matches!(
            stock.purchase("bm_blueprint_fusion", &rep, true, &mut wallet),
            Err(EconError::OutOfStock(_))
        ));
        assert_eq!(wallet.get(ResourceKind::Diamonds), 980.0);
    }
}
