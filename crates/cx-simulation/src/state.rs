//! The one mutable record every system and action works on.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use cx_core::artifact::{ArtifactDefinition, Inventory};
use cx_core::drill::DrillState;
use cx_core::effect::{ActiveEffect, EffectTotals};
use cx_core::faction::{FactionReputation, Perk};
use cx_core::license::LicenseState;
use cx_core::region::RegionId;
use cx_core::resource::{ResourceKind, Resources};
use cx_core::skill::{SkillLevels, skill_modifiers};
use cx_core::stats::{Stats, calculate_stats};
use cx_economy::base::PlayerBase;
use cx_economy::caravan::{Caravan, CaravanTier, LogisticsPerks};
use cx_economy::market::{MarketHistory, PriceModifiers, SPIKE_CANDIDATES};
use cx_economy::{BlackMarketStock, Bases, Expedition, ProgressSnapshot, QuestLog, Vitals};
use cx_mechanics::event::event_by_id;
use cx_mechanics::{AbilityBook, Boss, GameEvent, MinigameKind, SideTunnel};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::drone::DroneBay;

/// Effect that makes one market resource spike.
pub const PRICE_SPIKE_EFFECT: &str = "PRICE_SPIKE_EFFECT";

/// Global reputation gained per completed quest.
pub const QUEST_GLOBAL_REPUTATION: i64 = 10;

/// Level reached with `xp` experience.
pub fn level_for_xp(xp: f64) -> u32 {
    (xp.max(0.0) / 100.0).sqrt().floor() as u32 + 1
}

/// A trip between regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Travel {
    pub from: RegionId,
    pub to: RegionId,
    pub start_ms: u64,
    pub duration_ms: u64,
}

impl Travel {
    pub fn arrival_ms(&self) -> u64 {
        self.start_ms + self.duration_ms
    }

    pub fn arrived(&self, now_ms: u64) -> bool {
        now_ms >= self.arrival_ms()
    }
}

/// Artifact currently in the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub item: Uuid,
    /// Seconds of work left.
    pub time_left: f64,
}

/// The full game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    // Drill
    pub depth: f64,
    pub max_depth: f64,
    pub total_drilled: f64,
    pub resources: Resources,
    pub vitals: Vitals,
    pub shield_charge: f64,
    pub shielding: bool,
    pub drilling: bool,
    pub drill: DrillState,
    pub skills: SkillLevels,
    pub xp: f64,
    pub level: u32,
    pub effects: Vec<ActiveEffect>,
    pub abilities: AbilityBook,
    pub drones: DroneBay,

    // Artifacts
    pub inventory: Inventory,
    pub discovered_artifacts: BTreeSet<String>,
    pub analysis: Option<Analysis>,
    pub artifacts_found: u32,

    // Events
    pub event_queue: VecDeque<String>,
    pub recent_events: Vec<String>,
    pub event_cooldowns: BTreeMap<String, u64>,
    pub event_check_tick: u32,
    pub pending_tunnel: Option<SideTunnel>,

    // Combat
    pub boss: Option<Boss>,
    pub last_boss_depth: f64,
    pub minigame: Option<MinigameKind>,
    pub bosses_defeated: u32,

    // Map and economy
    pub region: RegionId,
    pub visited_regions: BTreeSet<RegionId>,
    pub travel: Option<Travel>,
    pub travel_blocked_until_ms: u64,
    pub stuck: bool,
    pub bases: Bases,
    pub caravans: Vec<Caravan>,
    pub caravan_tiers: BTreeSet<CaravanTier>,
    #[serde(default)]
    pub expeditions: Vec<Expedition>,
    pub market_history: MarketHistory,
    pub black_market: BlackMarketStock,
    pub price_spike: Option<ResourceKind>,
    pub quests: QuestLog,
    pub reputation: FactionReputation,
    pub licenses: LicenseState,
    pub unlocks: BTreeSet<String>,
    pub blueprints: BTreeSet<String>,

    pub ticks: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// A fresh game in Rust Valley with the starter drill.
    pub fn new() -> Self {
        let drill = DrillState::starter();
        let skills = SkillLevels::new();
        let inventory = Inventory::new();
        let integrity = calculate_stats(
            &drill,
            &skill_modifiers(&skills),
            &inventory.modifiers(),
            0.0,
        )
        .integrity;

        Self {
            depth: 0.0,
            max_depth: 0.0,
            total_drilled: 0.0,
            resources: Resources::new(),
            vitals: Vitals::new(integrity),
            shield_charge: 0.0,
            shielding: false,
            drilling: false,
            drill,
            skills,
            xp: 0.0,
            level: 1,
            effects: Vec::new(),
            abilities: AbilityBook::new(),
            drones: DroneBay::new(),
            inventory,
            discovered_artifacts: BTreeSet::new(),
            analysis: None,
            artifacts_found: 0,
            event_queue: VecDeque::new(),
            recent_events: Vec::new(),
            event_cooldowns: BTreeMap::new(),
            event_check_tick: 0,
            pending_tunnel: None,
            boss: None,
            last_boss_depth: 0.0,
            minigame: None,
            bosses_defeated: 0,
            region: RegionId::RustValley,
            visited_regions: BTreeSet::from([RegionId::RustValley]),
            travel: None,
            travel_blocked_until_ms: 0,
            stuck: false,
            bases: Bases::new(),
            caravans: Vec::new(),
            caravan_tiers: BTreeSet::new(),
            expeditions: Vec::new(),
            market_history: MarketHistory::new(),
            black_market: BlackMarketStock::new(),
            price_spike: None,
            quests: QuestLog::new(),
            reputation: FactionReputation::new(),
            licenses: LicenseState::new(),
            unlocks: BTreeSet::new(),
            blueprints: BTreeSet::new(),
            ticks: 0,
        }
    }

    /// Derived drill stats at the current depth.
    pub fn stats(&self) -> Stats {
        calculate_stats(
            &self.drill,
            &skill_modifiers(&self.skills),
            &self.inventory.modifiers(),
            self.depth,
        )
    }

    pub fn max_integrity(&self) -> f64 {
        self.stats().integrity
    }

    pub fn effect_totals(&self) -> EffectTotals {
        EffectTotals::combine(&self.effects)
    }

    /// Add experience. Returns the new level when it went up.
    pub fn add_xp(&mut self, amount: f64) -> Option<u32> {
        if amount <= 0.0 || !amount.is_finite() {
            return None;
        }
        self.xp += amount;
        let level = level_for_xp(self.xp);
        if level > self.level {
            self.level = level;
            info!(level, "level up");
            Some(level)
        } else {
            None
        }
    }

    /// Clamp heat, hull, shield and depth back into range.
    pub fn enforce_bounds(&mut self) {
        let max = self.max_integrity();
        self.vitals.heat = self.vitals.heat.clamp(0.0, 100.0);
        self.vitals.integrity = self.vitals.integrity.clamp(0.0, max.max(0.0));
        self.shield_charge = self.shield_charge.clamp(0.0, 100.0);
        self.depth = self.depth.max(0.0);
        self.max_depth = self.max_depth.max(self.depth);
    }

    /// Describe the first value no sequence of actions and ticks can reach.
    pub fn impossible_value(&self) -> Option<String> {
        let wallets = std::iter::once(("wallet".to_string(), &self.resources))
            .chain(self.bases.iter().map(|b| (format!("base {}", b.short_id()), &b.storage)))
            .chain(self.caravans.iter().map(|c| (format!("caravan {}", c.short_id()), &c.cargo)))
            .chain(
                self.expeditions
                    .iter()
                    .map(|e| (format!("expedition {}", e.short_id()), &e.rewards)),
            );
        for (owner, wallet) in wallets {
            if let Some((kind, amount)) = wallet.first_invalid() {
                return Some(format!("{owner} holds {amount} {kind}"));
            }
        }
        let in_range = |v: f64, max: f64| v.is_finite() && (0.0..=max).contains(&v);
        if !in_range(self.vitals.heat, 100.0) {
            return Some(format!("heat {} outside 0..=100", self.vitals.heat));
        }
        let max = self.max_integrity();
        if !in_range(self.vitals.integrity, max) {
            return Some(format!("integrity {} outside 0..={max}", self.vitals.integrity));
        }
        if !in_range(self.shield_charge, 100.0) {
            return Some(format!("shield {} outside 0..=100", self.shield_charge));
        }
        if !in_range(self.depth, self.max_depth) {
            return Some(format!("depth {} outside 0..={}", self.depth, self.max_depth));
        }
        if !self.xp.is_finite() || self.xp < 0.0 {
            return Some(format!("xp {}", self.xp));
        }
        None
    }

    /// Start `effect`, restarting it if already running.
    pub fn start_effect(&mut self, rng: &mut impl Rng, effect: ActiveEffect) {
        if effect.id == PRICE_SPIKE_EFFECT {
            let kind = SPIKE_CANDIDATES[rng.random_range(0..SPIKE_CANDIDATES.len())];
            debug!(resource = %kind, "price spike");
            self.price_spike = Some(kind);
        }
        self.effects.retain(|e| e.id != effect.id);
        self.effects.push(effect);
    }

    /// Drop `id` and undo its side state.
    pub fn end_effect(&mut self, id: &str) {
        self.effects.retain(|e| e.id != id);
        if id == PRICE_SPIKE_EFFECT {
            self.price_spike = None;
        }
    }

    /// A boss, a minigame, the cooling game or an unanswered event holds the player.
    pub fn is_busy(&self) -> bool {
        self.boss.is_some()
            || self.minigame.is_some()
            || self.vitals.cooling_game
            || !self.event_queue.is_empty()
    }

    /// The event waiting at the front of the queue.
    pub fn pending_event(&self) -> Option<&'static GameEvent> {
        self.event_queue.front().and_then(|id| event_by_id(id))
    }

    pub fn is_traveling(&self) -> bool {
        self.travel.is_some()
    }

    pub fn current_base(&self) -> Option<&PlayerBase> {
        self.bases.in_region(self.region)
    }

    pub fn has_perk(&self, perk: Perk) -> bool {
        self.reputation.has_perk(perk)
    }

    /// Facts quest objectives are measured against.
    pub fn progress_snapshot(&self) -> ProgressSnapshot<'_> {
        ProgressSnapshot {
            wallet: &self.resources,
            bases: &self.bases,
            depth: self.depth,
            artifacts_found: self.artifacts_found,
            bosses_defeated: self.bosses_defeated,
            regions_visited: self.visited_regions.len(),
        }
    }

    /// Put a fresh unidentified artifact in the inventory.
    pub fn grant_artifact(
        &mut self,
        rng: &mut impl Rng,
        def: &ArtifactDefinition,
        now_ms: u64,
    ) -> Uuid {
        self.artifacts_found += 1;
        info!(artifact = def.id, "artifact found");
        self.inventory.add(rng, def, now_ms)
    }

    /// Market modifiers from stats, perks and the running spike.
    pub fn price_modifiers(&self) -> PriceModifiers {
        let mut discount = self.stats().shop_discount;
        if self.has_perk(Perk::CorpExchange) {
            discount += Perk::CorpExchange.value();
        }
        PriceModifiers {
            discount,
            spike: self.price_spike,
        }
    }

    pub fn logistics_perks(&self) -> LogisticsPerks {
        LogisticsPerks {
            bulk_logistics: self.has_perk(Perk::BulkLogistics),
            insurance: self.has_perk(Perk::Insurance),
        }
    }

    /// Apply a quest unlock.
    pub fn apply_unlock(&mut self, target: &str, now_ms: u64) {
        match target {
            "caravan_2star" => {
                self.caravan_tiers.insert(CaravanTier::TwoStar);
            }
            "caravan_3star" => {
                self.caravan_tiers.insert(CaravanTier::ThreeStar);
            }
            "smuggler_routes" => self.licenses.grant_permit(RegionId::VoidChasm, now_ms),
            _ => {}
        }
        self.unlocks.insert(target.to_string());
    }

    /// Whether the black market has been opened by a quest.
    pub fn black_market_unlocked(&self) -> bool {
        self.unlocks.contains("black_market")
    }

    /// Caravan still on the road, first dispatched first.
    pub fn caravan_en_route(&self) -> Option<&Caravan> {
        self.caravans.iter().find(|c| c.in_transit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cx_core::artifact::artifact_def;
    use cx_core::effect::create_effect;
    use cx_core::faction::FactionId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn fresh_game() {
        let state = GameState::new();
        assert_eq!(state.region, RegionId::RustValley);
        assert_eq!(state.level, 1);
        assert_eq!(state.vitals.integrity, state.max_integrity());
        assert_eq!(state.vitals.heat, 0.0);
        assert!(state.resources.is_empty());
        assert!(!state.is_busy());
    }

    #[test]
    fn level_curve() {
        assert_eq!(level_for_xp(0.0), 1);
        assert_eq!(level_for_xp(99.0), 1);
        assert_eq!(level_for_xp(100.0), 2);
        assert_eq!(level_for_xp(400.0), 3);
        assert_eq!(level_for_xp(10_000.0), 11);
    }

    #[test]
    fn xp_levels_up_once() {
        let mut state = GameState::new();
        assert_eq!(state.add_xp(50.0), None);
        assert_eq!(state.add_xp(350.0), Some(3));
        assert_eq!(state.add_xp(-10.0), None);
        assert_eq!(state.level, 3);
    }

    #[test]
    fn bounds_are_restored() {
        let mut state = GameState::new();
        state.vitals.heat = 180.0;
        state.vitals.integrity = 1e6;
        state.shield_charge = -3.0;
        state.depth = -5.0;
        state.enforce_bounds();
        assert_eq!(state.vitals.heat, 100.0);
        assert_eq!(state.vitals.integrity, state.max_integrity());
        assert_eq!(state.shield_charge, 0.0);
        assert_eq!(state.depth, 0.0);
    }

    #[test]
    fn price_spike_comes_and_goes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = GameState::new();
        let spike = create_effect(PRICE_SPIKE_EFFECT).unwrap();
        state.start_effect(&mut rng, spike.clone());
        state.start_effect(&mut rng, spike);
        assert_eq!(state.effects.len(), 1);
        assert!(state.price_modifiers().spike.is_some());
        state.end_effect(PRICE_SPIKE_EFFECT);
        assert!(state.price_spike.is_none());
    }

    #[test]
    fn corp_exchange_discounts() {
        let mut state = GameState::new();
        let before = state.price_modifiers().discount;
        state.reputation.add_reputation(FactionId::Corporate, 300);
        assert!((state.price_modifiers().discount - before - 0.05).abs() < 1e-9);
    }

    #[test]
    fn unlocks_open_features() {
        let mut state = GameState::new();
        state.apply_unlock("caravan_2star", 0);
        state.apply_unlock("smuggler_routes", 0);
        state.apply_unlock("black_market", 0);
        assert!(state.caravan_tiers.contains(&CaravanTier::TwoStar));
        assert!(state.licenses.has_active_permit(RegionId::VoidChasm, 1));
        assert!(state.black_market_unlocked());
    }

    #[test]
    fn artifacts_are_counted() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = GameState::new();
        let def = artifact_def(cx_core::artifact::ARTIFACTS[0].id).unwrap();
        let id = state.grant_artifact(&mut rng, def, 10);
        assert_eq!(state.artifacts_found, 1);
        assert!(!state.inventory.get(&id).unwrap().identified);
        assert_eq!(state.progress_snapshot().artifacts_found, 1);
    }
}
