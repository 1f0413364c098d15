//! Surface city services: barter, repairs, buffs, the casino and the medbay.

use cx_core::drill::tier_material;
use cx_core::effect::{ActiveEffect, create_effect};
use cx_core::resource::{Bundle, ResourceKind, Resources};
use cx_core::stats::required_tier;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::base::check_amount;
use crate::error::{EconError, EconResult};

/// Chance that a gamble pays out.
pub const GAMBLE_WIN_CHANCE: f64 = 0.45;

/// Share of max integrity lost on overheating.
pub const OVERHEAT_DAMAGE: f64 = 0.2;

/// Heat, hull and overheat flags of the drill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// Heat, 0 to 100.
    pub heat: f64,
    /// Current hull integrity.
    pub integrity: f64,
    /// Cooling down after overheating.
    pub overheated: bool,
    /// The player is venting heat manually.
    pub cooling_game: bool,
}

impl Vitals {
    /// Cold drill with `integrity` hull.
    pub fn new(integrity: f64) -> Self {
        Self {
            heat: 0.0,
            integrity,
            overheated: false,
            cooling_game: false,
        }
    }

    /// Hull gone.
    pub fn is_broken(&self) -> bool {
        self.integrity <= 0.0
    }

    /// Medbay: vent all heat.
    pub fn heal(&mut self) {
        self.heat = 0.0;
    }

    /// Overheat: heat pinned at 100 and a fifth of the hull lost.
    pub fn trigger_overheat(&mut self, max_integrity: f64) {
        let damage = (max_integrity * OVERHEAT_DAMAGE).ceil();
        self.heat = 100.0;
        self.overheated = true;
        self.cooling_game = false;
        self.integrity = (self.integrity - damage).max(0.0);
        info!(damage, "drill overheated");
    }
}

/// A standing barter offer at the city exchange.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeOffer {
    /// Stable id.
    pub id: &'static str,
    /// Paid by the player.
    pub cost: &'static [(ResourceKind, f64)],
    /// Received by the player.
    pub reward: &'static [(ResourceKind, f64)],
}

/// The exchange board.
pub static TRADE_OFFERS: [TradeOffer; 5] = [
    TradeOffer {
        id: "clay_for_rubies",
        cost: &[(ResourceKind::Clay, 500.0)],
        reward: &[(ResourceKind::Rubies, 50.0)],
    },
    TradeOffer {
        id: "stone_for_rubies",
        cost: &[(ResourceKind::Stone, 300.0)],
        reward: &[(ResourceKind::Rubies, 60.0)],
    },
    TradeOffer {
        id: "scrap_for_iron",
        cost: &[(ResourceKind::Scrap, 200.0)],
        reward: &[(ResourceKind::Iron, 50.0)],
    },
    TradeOffer {
        id: "rubies_for_ice",
        cost: &[(ResourceKind::Rubies, 400.0)],
        reward: &[(ResourceKind::Ice, 100.0)],
    },
    TradeOffer {
        id: "gold_for_emeralds",
        cost: &[(ResourceKind::Gold, 100.0)],
        reward: &[(ResourceKind::Emeralds, 10.0)],
    },
];

/// Look up a barter offer.
pub fn trade_offer(id: &str) -> EconResult<&'static TradeOffer> {
    TRADE_OFFERS
        .iter()
        .find(|o| o.id == id)
        .ok_or_else(|| EconError::UnknownItem(id.to_string()))
}

/// A buff for sale in the city, priced in one resource.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuffOffer {
    /// Effect started on purchase.
    pub effect_id: &'static str,
    /// Currency.
    pub resource: ResourceKind,
    /// Price.
    pub cost: f64,
}

const fn offer(effect_id: &'static str, resource: ResourceKind, cost: f64) -> BuffOffer {
    BuffOffer {
        effect_id,
        resource,
        cost,
    }
}

/// Premium services and bar drinks.
pub static BUFF_MENU: [BuffOffer; 12] = [
    offer("PREMIUM_NANO_REPAIR", ResourceKind::Rubies, 2_000.0),
    offer("PREMIUM_DIAMOND_COAT", ResourceKind::Diamonds, 5.0),
    offer("PREMIUM_VOID_SHIELD", ResourceKind::Rubies, 5_000.0),
    offer("PREMIUM_QUANTUM_LUCK", ResourceKind::Emeralds, 20.0),
    offer("PREMIUM_ABSOLUTE_ZERO", ResourceKind::Rubies, 3_000.0),
    offer("PREMIUM_MAGNETIC_STORM", ResourceKind::Rubies, 4_000.0),
    offer("PREMIUM_OVERDRIVE", ResourceKind::Uranium, 20.0),
    offer("PREMIUM_CHRONOS", ResourceKind::AncientTech, 2.0),
    offer("BAR_OIL_STOUT", ResourceKind::Rubies, 100.0),
    offer("BAR_RUSTY_NAIL", ResourceKind::Rubies, 150.0),
    offer("BAR_NUCLEAR_WHISKEY", ResourceKind::Rubies, 500.0),
    offer("BAR_VOID_COCKTAIL", ResourceKind::Rubies, 800.0),
];

/// Look up a city buff by effect id.
pub fn buff_offer(effect_id: &str) -> EconResult<&'static BuffOffer> {
    let upper = effect_id.trim().to_ascii_uppercase();
    BUFF_MENU
        .iter()
        .find(|o| o.effect_id == upper)
        .ok_or_else(|| EconError::UnknownEffect(effect_id.to_string()))
}

/// Swap `cost` for `reward`, all or nothing.
pub fn trade(wallet: &mut Resources, cost: &Bundle, reward: &Bundle) -> EconResult<()> {
    wallet.spend(cost)?;
    wallet.add_bundle(reward);
    Ok(())
}

/// Price of a full repair: one unit of the depth's tier material per missing
/// point of integrity, times the tier.
pub fn repair_cost(depth: f64, integrity: f64, max_integrity: f64) -> (ResourceKind, f64) {
    let tier = required_tier(depth);
    let missing = (max_integrity - integrity).max(0.0).ceil();
    (tier_material(tier), missing * tier as f64)
}

/// Restore the hull to `max_integrity`.
pub fn repair(
    wallet: &mut Resources,
    vitals: &mut Vitals,
    depth: f64,
    max_integrity: f64,
) -> EconResult<(ResourceKind, f64)> {
    let (kind, cost) = repair_cost(depth, vitals.integrity, max_integrity);
    if cost <= 0.0 {
        return Err(EconError::NothingToRepair);
    }
    wallet.spend(&[(kind, cost)])?;
    vitals.integrity = max_integrity;
    Ok((kind, cost))
}

/// Pay `cost` of `resource` for a timed effect.
pub fn buy_buff(
    wallet: &mut Resources,
    cost: f64,
    resource: ResourceKind,
    effect_id: &str,
) -> EconResult<ActiveEffect> {
    let effect = create_effect(effect_id).ok_or_else(|| EconError::UnknownEffect(effect_id.to_string()))?;
    wallet.spend(&[(resource, cost)])?;
    Ok(effect)
}

/// Stake `amount`; a win returns it doubled. Reports the net change.
pub fn gamble(
    rng: &mut impl Rng,
    wallet: &mut Resources,
    resource: ResourceKind,
    amount: f64,
) -> EconResult<f64> {
    check_amount(amount)?;
    wallet.spend(&[(resource, amount)])?;
    if rng.random::<f64>() < GAMBLE_WIN_CHANCE {
        wallet.add(resource, amount * 2.0);
        Ok(amount)
    } else {
        Ok(-amount)
    }
}
