//! Regional market: base prices, regional modifiers, fees and history.
//!
//! Prices are quoted in rubies. A resource is cheaper where it is mined and
//! dearer where it is rare. Trading is only possible at an active station in
//! the player's current region.

use std::collections::VecDeque;

use cx_core::region::RegionId;
use cx_core::resource::{ResourceKind, Resources};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::base::{Bases, check_amount};
use crate::error::{EconError, EconResult};

/// Fee withheld when selling.
pub const MARKET_SELL_FEE: f64 = 0.20;

/// Largest buy discount honoured. Stays below the sell fee so a buy and a
/// resale never nets rubies.
pub const MAX_BUY_DISCOUNT: f64 = 0.15;

/// Entries kept in the transaction history.
pub const MAX_HISTORY: usize = 100;

/// Price multiplier while a spike is active.
pub const PRICE_SPIKE_MULTIPLIER: f64 = 1.5;

/// Resources a price spike can hit.
pub const SPIKE_CANDIDATES: [ResourceKind; 6] = [
    ResourceKind::Titanium,
    ResourceKind::Uranium,
    ResourceKind::NanoSwarm,
    ResourceKind::AncientTech,
    ResourceKind::Emeralds,
    ResourceKind::Diamonds,
];

/// Base price in rubies. `None` for rubies themselves.
pub fn base_price(kind: ResourceKind) -> Option<f64> {
    use ResourceKind::*;
    let price = match kind {
        Rubies => return None,
        Clay | Stone => 1.0,
        Coal | Scrap | Credits => 2.0,
        Copper => 3.0,
        Ice => 4.0,
        Iron => 5.0,
        Gas => 6.0,
        Oil => 8.0,
        Silver => 12.0,
        Gold => 25.0,
        Titanium => 40.0,
        Emeralds => 50.0,
        Uranium => 60.0,
        NanoSwarm => 100.0,
        Diamonds => 150.0,
        RepairKit => 200.0,
        AncientTech => 250.0,
        CoolantPaste => 300.0,
        AdvancedCoolant => 1000.0,
    };
    Some(price)
}

/// Regional price modifier, columns in [`RegionId::ALL`] order.
pub fn regional_modifier(kind: ResourceKind, region: RegionId) -> f64 {
    use ResourceKind::*;
    let row: [f64; 5] = match kind {
        Clay => [1.0, 0.8, 1.1, 1.3, 1.5],
        Stone => [1.0, 0.7, 0.9, 1.2, 1.5],
        Copper => [1.2, 1.0, 0.7, 1.1, 1.3],
        Iron => [1.3, 1.1, 0.6, 1.0, 1.2],
        Silver => [1.4, 1.2, 0.9, 0.8, 1.1],
        Gold => [1.4, 1.2, 1.1, 0.7, 1.0],
        Titanium => [1.5, 1.3, 1.2, 0.9, 0.8],
        Uranium => [1.5, 1.3, 1.2, 1.0, 0.8],
        NanoSwarm => [1.5, 1.4, 1.3, 1.1, 0.7],
        AncientTech => [1.5, 1.3, 1.2, 1.0, 0.8],
        Rubies => [1.3, 1.0, 1.1, 0.9, 1.2],
        Emeralds => [1.5, 0.5, 1.2, 1.3, 1.1],
        Diamonds => [1.5, 1.2, 1.3, 1.0, 0.8],
        Coal => [1.0, 1.2, 0.8, 0.7, 1.3],
        Oil => [1.2, 1.0, 0.9, 0.8, 1.1],
        Gas => [1.3, 1.1, 1.0, 0.9, 0.8],
        Ice => [1.5, 0.8, 1.1, 1.0, 0.7],
        Scrap => [0.8, 1.1, 0.9, 1.0, 1.2],
        Credits => [1.0; 5],
        RepairKit => [1.0, 1.1, 0.9, 1.2, 1.3],
        CoolantPaste => [1.2, 1.0, 1.1, 0.8, 0.9],
        AdvancedCoolant => [1.3, 1.1, 1.2, 0.9, 0.8],
    };
    row[region as usize]
}

/// Market modifiers that come from outside the market.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceModifiers {
    /// Fractional buy discount, e.g. 0.05 from CORP_EXCHANGE.
    pub discount: f64,
    /// Resource currently spiking.
    pub spike: Option<ResourceKind>,
}

/// Per-unit list price in `region`, spike included and no discount.
pub fn market_price(kind: ResourceKind, region: RegionId, spike: Option<ResourceKind>) -> EconResult<f64> {
    let base = base_price(kind).ok_or(EconError::NotTradable(kind))?;
    let spike = if spike == Some(kind) { PRICE_SPIKE_MULTIPLIER } else { 1.0 };
    Ok(base * regional_modifier(kind, region) * spike)
}

/// Per-unit buy price: list price less the player's discount, capped at
/// [`MAX_BUY_DISCOUNT`].
pub fn buy_price(kind: ResourceKind, region: RegionId, mods: PriceModifiers) -> EconResult<f64> {
    let discount = mods.discount.clamp(0.0, MAX_BUY_DISCOUNT);
    Ok(market_price(kind, region, mods.spike)? * (1.0 - discount))
}

/// Per-unit sell price: list price less the fee. Discounts only apply to buying.
pub fn sell_price(kind: ResourceKind, region: RegionId, mods: PriceModifiers) -> EconResult<f64> {
    Ok(market_price(kind, region, mods.spike)? * (1.0 - MARKET_SELL_FEE))
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    /// Player bought.
    Buy,
    /// Player sold.
    Sell,
}

/// A completed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTransaction {
    /// Direction.
    pub side: TradeSide,
    /// Goods.
    pub resource: ResourceKind,
    /// Units traded.
    pub amount: f64,
    /// Rubies per unit.
    pub price_per_unit: f64,
    /// Rubies paid or received.
    pub total: f64,
    /// Where it happened.
    pub region: RegionId,
    /// Game time.
    pub timestamp_ms: u64,
}

/// Most recent trades, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketHistory {
    entries: VecDeque<MarketTransaction>,
}

impl MarketHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append, dropping the oldest past [`MAX_HISTORY`].
    pub fn record(&mut self, tx: MarketTransaction) {
        self.entries.push_back(tx);
        while self.entries.len() > MAX_HISTORY {
            self.entries.pop_front();
        }
    }

    /// Trades, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &MarketTransaction> {
        self.entries.iter()
    }

    /// Number of trades kept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No trades kept.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The player's side of a trade.
pub struct Trader<'a> {
    /// Player resources.
    pub wallet: &'a mut Resources,
    /// Bases, to find the station.
    pub bases: &'a Bases,
    /// Current region.
    pub region: RegionId,
    /// Trade log.
    pub history: &'a mut MarketHistory,
    /// Game time.
    pub now_ms: u64,
}

impl Trader<'_> {
    fn require_station(&self) -> EconResult<()> {
        if self.bases.has_station_in(self.region) {
            Ok(())
        } else {
            Err(EconError::NoStation(self.region))
        }
    }

    /// Buy `amount` of `kind` for rubies.
    pub fn buy(&mut self, kind: ResourceKind, amount: f64, mods: PriceModifiers) -> EconResult<MarketTransaction> {
        check_amount(amount)?;
        self.require_station()?;
        let price = buy_price(kind, self.region, mods)?;
        let total = price * amount;
        self.wallet.spend(&[(ResourceKind::Rubies, total)])?;
        self.wallet.add(kind, amount);
        Ok(self.log(TradeSide::Buy, kind, amount, price, total))
    }

    /// Sell `amount` of `kind` for rubies.
    pub fn sell(&mut self, kind: ResourceKind, amount: f64, mods: PriceModifiers) -> EconResult<MarketTransaction> {
        check_amount(amount)?;
        self.require_station()?;
        let price = sell_price(kind, self.region, mods)?;
        let total = price * amount;
        self.wallet.spend(&[(kind, amount)])?;
        self.wallet.add(ResourceKind::Rubies, total);
        Ok(self.log(TradeSide::Sell, kind, amount, price, total))
    }

    fn log(&mut self, side: TradeSide, resource: ResourceKind, amount: f64, price: f64, total: f64) -> MarketTransaction {
        let tx = MarketTransaction {
            side,
            resource,
            amount,
            price_per_unit: price,
            total,
            region: self.region,
            timestamp_ms: self.now_ms,
        };
        info!(side = ?side, resource = %resource, amount, total, "market trade");
        self.history.record(tx.clone());
        tx
    }
}
