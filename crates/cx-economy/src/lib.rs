//! The Cosmic Excavator economy.
//!
//! Player bases and their facilities, caravans between them, the regional
//! market with its fee and history, the rebel black market, refinery and
//! workshop recipes, story and generated quests, city services and drone
//! expeditions.
//! All state mutation goes through all-or-nothing spends on
//! [`cx_core::Resources`].

pub mod base;
pub mod black_market;
pub mod caravan;
pub mod city;
pub mod error;
pub mod expedition;
pub mod market;
pub mod quest;
pub mod recipe;

pub use base::{BaseStatus, BaseType, Bases, Facility, PlayerBase, RaidOutcome};
pub use black_market::{BlackMarketReward, BlackMarketStock};
pub use caravan::{Caravan, CaravanCheck, CaravanStatus, CaravanTier, LogisticsPerks};
pub use city::{BuffOffer, TradeOffer, Vitals};
pub use error::{EconError, EconResult};
pub use expedition::{Expedition, ExpeditionDifficulty, ExpeditionStatus};
pub use market::{MarketHistory, MarketTransaction, PriceModifiers, TradeSide, Trader};
pub use quest::{ProgressSnapshot, Quest, QuestLog, QuestPayout, QuestReward};
pub use recipe::{Recipe, RecipeKind};
