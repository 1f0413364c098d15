//! City expeditions: temporary drone swarms sent after one resource.
//!
//! Drones are printed from nano swarm at launch. When the timer runs out the
//! expedition either fails, losing every drone, or comes back with a haul and
//! whatever drones survived. The player collects the result at the city.

use std::fmt;
use std::str::FromStr;

use cx_core::ids::{id_matches, random_uuid, short_id};
use cx_core::resource::{ResourceKind, Resources};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EconError, EconResult};

/// Nano swarm printed into one drone.
pub const NANO_SWARM_PER_DRONE: f64 = 10.0;

/// Largest swarm per expedition.
pub const MAX_DRONES: u32 = 100;

/// Expeditions that can be out at once.
pub const MAX_ACTIVE_EXPEDITIONS: usize = 5;

/// Share of the nano swarm returned when an expedition is recalled.
pub const CANCEL_REFUND: f64 = 0.5;

/// Resources an expedition can be sent after, with units found per drone.
pub const TARGET_RESOURCES: [(ResourceKind, f64); 10] = [
    (ResourceKind::Iron, 5.0),
    (ResourceKind::Copper, 6.0),
    (ResourceKind::Silver, 3.0),
    (ResourceKind::Gold, 2.0),
    (ResourceKind::Titanium, 1.5),
    (ResourceKind::Uranium, 1.0),
    (ResourceKind::Rubies, 0.5),
    (ResourceKind::Emeralds, 0.5),
    (ResourceKind::Diamonds, 0.3),
    (ResourceKind::AncientTech, 0.2),
];

/// Units of `kind` one drone brings back at the lowest difficulty.
pub fn yield_per_drone(kind: ResourceKind) -> Option<f64> {
    TARGET_RESOURCES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, y)| *y)
}

/// How far the swarm goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpeditionDifficulty {
    /// Survey.
    Low,
    /// Operation.
    Medium,
    /// Raid.
    High,
    /// Deadly.
    Extreme,
}

impl ExpeditionDifficulty {
    pub const ALL: [ExpeditionDifficulty; 4] = [Self::Low, Self::Medium, Self::High, Self::Extreme];

    pub fn id(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Low => "Survey",
            Self::Medium => "Operation",
            Self::High => "Raid",
            Self::Extreme => "Deadly",
        }
    }

    /// Chance the whole swarm is lost.
    pub fn risk(self) -> f64 {
        match self {
            Self::Low => 0.05,
            Self::Medium => 0.20,
            Self::High => 0.40,
            Self::Extreme => 0.70,
        }
    }

    pub fn duration_ms(self) -> u64 {
        let minutes = match self {
            Self::Low => 5,
            Self::Medium => 15,
            Self::High => 30,
            Self::Extreme => 60,
        };
        minutes * 60 * 1000
    }

    /// Haul multiplier over [`yield_per_drone`].
    pub fn reward_multiplier(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 2.5,
            Self::High => 5.0,
            Self::Extreme => 10.0,
        }
    }
}

impl fmt::Display for ExpeditionDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ExpeditionDifficulty {
    type Err = EconError;

    fn from_str(s: &str) -> EconResult<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| EconError::UnknownDifficulty(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpeditionStatus {
    Active,
    Completed,
    Failed,
}

/// A swarm in the field, or back and waiting to be collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expedition {
    pub id: Uuid,
    pub difficulty: ExpeditionDifficulty,
    /// Chance of total loss, fixed at launch.
    pub risk_chance: f64,
    pub drone_count: u32,
    /// Resource the swarm looks for.
    pub resource_target: ResourceKind,
    pub start_ms: u64,
    pub duration_ms: u64,
    pub status: ExpeditionStatus,
    /// Haul plus the nano swarm of surviving drones.
    pub rewards: Resources,
    pub lost_drones: u32,
    /// What happened, oldest first.
    pub log: Vec<String>,
}

impl Expedition {
    pub fn short_id(&self) -> String {
        short_id(&self.id)
    }

    pub fn is_active(&self) -> bool {
        self.status == ExpeditionStatus::Active
    }

    pub fn return_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.return_ms().saturating_sub(now_ms)
    }

    /// Roll the outcome. Does nothing unless the expedition is still active.
    pub fn resolve(&mut self, rng: &mut impl Rng) {
        if !self.is_active() {
            return;
        }
        if rng.random::<f64>() < self.risk_chance {
            self.status = ExpeditionStatus::Failed;
            self.lost_drones = self.drone_count;
            self.log
                .push(format!("Signal lost. All {} drones are gone.", self.drone_count));
            return;
        }

        let drones = f64::from(self.drone_count);
        let lost = (drones * self.risk_chance * rng.random::<f64>()).floor() as u32;
        let survivors = self.drone_count.saturating_sub(lost);
        let per_drone = yield_per_drone(self.resource_target).unwrap_or(1.0);
        let haul = (drones
            * per_drone
            * self.difficulty.reward_multiplier()
            * rng.random_range(0.8..1.2))
        .floor()
        .max(1.0);

        self.status = ExpeditionStatus::Completed;
        self.lost_drones = lost;
        self.rewards.add(self.resource_target, haul);
        self.rewards
            .add(ResourceKind::NanoSwarm, f64::from(survivors) * NANO_SWARM_PER_DRONE);
        self.log.push(format!(
            "Back with {haul} {}; {survivors} of {} drones returned.",
            self.resource_target, self.drone_count
        ));
    }
}

/// Print `drones` from nano swarm and send them after `target`.
pub fn launch(
    rng: &mut impl Rng,
    wallet: &mut Resources,
    expeditions: &[Expedition],
    difficulty: ExpeditionDifficulty,
    drones: u32,
    target: ResourceKind,
    now_ms: u64,
) -> EconResult<Expedition> {
    if drones == 0 || drones > MAX_DRONES {
        return Err(EconError::InvalidDroneCount(drones));
    }
    if yield_per_drone(target).is_none() {
        return Err(EconError::NotExpeditionTarget(target));
    }
    if expeditions.iter().filter(|e| e.is_active()).count() >= MAX_ACTIVE_EXPEDITIONS {
        return Err(EconError::TooManyExpeditions(MAX_ACTIVE_EXPEDITIONS));
    }
    wallet.spend(&[(ResourceKind::NanoSwarm, f64::from(drones) * NANO_SWARM_PER_DRONE)])?;

    let expedition = Expedition {
        id: random_uuid(rng),
        difficulty,
        risk_chance: difficulty.risk(),
        drone_count: drones,
        resource_target: target,
        start_ms: now_ms,
        duration_ms: difficulty.duration_ms(),
        status: ExpeditionStatus::Active,
        rewards: Resources::new(),
        lost_drones: 0,
        log: vec![format!("{drones} drones launched after {target}.")],
    };
    info!(
        expedition = %expedition.short_id(),
        difficulty = %difficulty,
        drones,
        target = %target,
        "expedition launched"
    );
    Ok(expedition)
}

/// Resolve every active expedition whose timer has run out.
pub fn settle(
    rng: &mut impl Rng,
    expeditions: &mut [Expedition],
    now_ms: u64,
) -> Vec<(Uuid, ExpeditionStatus)> {
    let mut changed = Vec::new();
    for expedition in expeditions
        .iter_mut()
        .filter(|e| e.is_active() && now_ms >= e.return_ms())
    {
        expedition.resolve(rng);
        info!(expedition = %expedition.short_id(), status = ?expedition.status, "expedition returned");
        changed.push((expedition.id, expedition.status));
    }
    changed
}

fn position(expeditions: &[Expedition], query: &str) -> EconResult<usize> {
    expeditions
        .iter()
        .position(|e| id_matches(&e.id, query))
        .ok_or_else(|| EconError::UnknownExpedition(query.to_string()))
}

/// Take a returned expedition off the board and bank its rewards.
pub fn collect(
    expeditions: &mut Vec<Expedition>,
    query: &str,
    wallet: &mut Resources,
) -> EconResult<Expedition> {
    let idx = position(expeditions, query)?;
    if expeditions[idx].is_active() {
        return Err(EconError::ExpeditionUnderway(expeditions[idx].short_id()));
    }
    let expedition = expeditions.remove(idx);
    wallet.merge(&expedition.rewards);
    Ok(expedition)
}

/// Recall an active expedition. Returns the nano swarm refunded.
pub fn cancel(
    expeditions: &mut Vec<Expedition>,
    query: &str,
    wallet: &mut Resources,
) -> EconResult<f64> {
    let idx = position(expeditions, query)?;
    if !expeditions[idx].is_active() {
        return Err(EconError::ExpeditionFinished(expeditions[idx].short_id()));
    }
    let expedition = expeditions.remove(idx);
    let refund = (f64::from(expedition.drone_count) * NANO_SWARM_PER_DRONE * CANCEL_REFUND).floor();
    wallet.add(ResourceKind::NanoSwarm, refund);
    info!(expedition = %expedition.short_id(), refund, "expedition recalled");
    Ok(refund)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn funded(nano: f64) -> Resources {
        Resources::from_bundle(&[(ResourceKind::NanoSwarm, nano)])
    }

    fn launched(rng: &mut StdRng, difficulty: ExpeditionDifficulty) -> Expedition {
        launch(rng, &mut funded(1000.0), &[], difficulty, 20, ResourceKind::Gold, 0).unwrap()
    }

    #[test]
    fn difficulty_table() {
        let risks: Vec<f64> = ExpeditionDifficulty::ALL.iter().map(|d| d.risk()).collect();
        assert_eq!(risks, vec![0.05, 0.20, 0.40, 0.70]);
        assert_eq!("EXTREME".parse::<ExpeditionDifficulty>().unwrap(), ExpeditionDifficulty::Extreme);
        assert!("suicidal".parse::<ExpeditionDifficulty>().is_err());
    }

    #[test]
    fn launch_charges_ten_nano_swarm_per_drone() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut wallet = funded(250.0);
        let exp = launch(
            &mut rng,
            &mut wallet,
            &[],
            ExpeditionDifficulty::Medium,
            20,
            ResourceKind::Iron,
            1_000,
        )
        .unwrap();
        assert_eq!(wallet.get(ResourceKind::NanoSwarm), 50.0);
        assert!(exp.is_active());
        assert_eq!(exp.return_ms(), 1_000 + 15 * 60 * 1000);
        assert_eq!(exp.risk_chance, 0.20);
    }

    #[test]
    fn launch_validates_before_spending() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut wallet = funded(50.0);
        let low = ExpeditionDifficulty::Low;
        assert!(matches!(
            launch(&mut rng, &mut wallet, &[], low, 0, ResourceKind::Iron, 0),
            Err(EconError::InvalidDroneCount(0))
        ));
        assert!(matches!(
            launch(&mut rng, &mut wallet, &[], low, 1, ResourceKind::Clay, 0),
            Err(EconError::NotExpeditionTarget(ResourceKind::Clay))
        ));
        assert!(launch(&mut rng, &mut wallet, &[], low, 6, ResourceKind::Iron, 0).is_err());
        assert_eq!(wallet.get(ResourceKind::NanoSwarm), 50.0);
    }

    #[test]
    fn active_expeditions_are_capped() {
        let mut rng = StdRng::seed_from_u64(2);
        let board: Vec<Expedition> = (0..MAX_ACTIVE_EXPEDITIONS)
            .map(|_| launched(&mut rng, ExpeditionDifficulty::Low))
            .collect();
        let err = launch(
            &mut rng,
            &mut funded(1000.0),
            &board,
            ExpeditionDifficulty::Low,
            1,
            ResourceKind::Iron,
            0,
        );
        assert!(matches!(err, Err(EconError::TooManyExpeditions(_))));
    }

    #[test]
    fn settle_waits_for_the_timer() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut board = vec![launched(&mut rng, ExpeditionDifficulty::Low)];
        let back = board[0].return_ms();
        assert!(settle(&mut rng, &mut board, back - 1).is_empty());
        let changed = settle(&mut rng, &mut board, back);
        assert_eq!(changed.len(), 1);
        assert!(!board[0].is_active());
        assert!(settle(&mut rng, &mut board, back + 1).is_empty());
    }

    #[test]
    fn failure_loses_every_drone() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut exp = launched(&mut rng, ExpeditionDifficulty::Low);
        exp.risk_chance = 1.0;
        exp.resolve(&mut rng);
        assert_eq!(exp.status, ExpeditionStatus::Failed);
        assert_eq!(exp.lost_drones, 20);
        assert!(exp.rewards.is_empty());
    }

    #[test]
    fn success_brings_back_haul_and_survivors() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut exp = launched(&mut rng, ExpeditionDifficulty::High);
        exp.risk_chance = 0.0;
        exp.resolve(&mut rng);
        assert_eq!(exp.status, ExpeditionStatus::Completed);
        assert_eq!(exp.lost_drones, 0);
        // 20 drones x 2 gold x5, +-20 %
        let gold = exp.rewards.get(ResourceKind::Gold);
        assert!((160.0..=240.0).contains(&gold), "gold {gold}");
        assert_eq!(exp.rewards.get(ResourceKind::NanoSwarm), 200.0);
    }

    #[test]
    fn collect_needs_a_returned_expedition() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut wallet = Resources::new();
        let mut board = vec![launched(&mut rng, ExpeditionDifficulty::Low)];
        let id = board[0].short_id();
        assert!(matches!(
            collect(&mut board, &id, &mut wallet),
            Err(EconError::ExpeditionUnderway(_))
        ));

        board[0].risk_chance = 0.0;
        board[0].resolve(&mut rng);
        let done = collect(&mut board, &id, &mut wallet).unwrap();
        assert!(board.is_empty());
        assert_eq!(wallet, done.rewards);
        assert!(matches!(
            collect(&mut board, &id, &mut wallet),
            Err(EconError::UnknownExpedition(_))
        ));
    }

    #[test]
    fn cancel_refunds_half_and_only_while_out() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut wallet = Resources::new();
        let mut board = vec![launched(&mut rng, ExpeditionDifficulty::Extreme)];
        let id = board[0].short_id();
        assert_eq!(cancel(&mut board, &id, &mut wallet).unwrap(), 100.0);
        assert_eq!(wallet.get(ResourceKind::NanoSwarm), 100.0);
        assert!(board.is_empty());

        let mut board = vec![launched(&mut rng, ExpeditionDifficulty::Low)];
        board[0].resolve(&mut rng);
        let id = board[0].short_id();
        assert!(matches!(
            cancel(&mut board, &id, &mut wallet),
            Err(EconError::ExpeditionFinished(_))
        ));
    }

    fn difficulty() -> impl Strategy<Value = ExpeditionDifficulty> {
        (0..4usize).prop_map(|i| ExpeditionDifficulty::ALL[i])
    }

    proptest! {
        #[test]
        fn outcomes_stay_consistent(seed in any::<u64>(), d in difficulty(), drones in 1u32..=MAX_DRONES) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut wallet = funded(f64::from(MAX_DRONES) * NANO_SWARM_PER_DRONE);
            let mut exp = launch(&mut rng, &mut wallet, &[], d, drones, ResourceKind::Iron, 0).unwrap();
            exp.resolve(&mut rng);
            prop_assert!(exp.lost_drones <= drones);
            prop_assert!(exp.rewards.first_invalid().is_none());
            match exp.status {
                ExpeditionStatus::Failed => prop_assert!(exp.rewards.is_empty()),
                ExpeditionStatus::Completed => prop_assert!(exp.rewards.get(ResourceKind::Iron) >= 1.0),
                ExpeditionStatus::Active => prop_assert!(false, "still active after resolve"),
            }
        }
    }
}
