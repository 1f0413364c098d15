//! Caravans: timed cargo runs between two bases with a loss roll on arrival.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use cx_core::ids::{random_uuid, short_id};
use cx_core::region::{RegionId, ZoneColor};
use cx_core::resource::{ResourceKind, Resources};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::base::Bases;
use crate::error::{EconError, EconResult};

/// Rubies to unlock basic logistics.
pub const BASIC_LOGISTICS_UNLOCK_COST: f64 = 15_000.0;

/// Capacity bonus from BULK_LOGISTICS.
pub const BULK_LOGISTICS_BONUS: f64 = 1.2;

/// Loss multiplier from INSURANCE.
pub const INSURANCE_FACTOR: f64 = 0.5;

/// Caravan class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CaravanTier {
    /// Shuttle.
    #[serde(rename = "1star")]
    OneStar,
    /// Freighter.
    #[serde(rename = "2star")]
    TwoStar,
    /// Hauler.
    #[serde(rename = "3star")]
    ThreeStar,
}

/// Static caravan parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaravanSpec {
    /// Tier.
    pub tier: CaravanTier,
    /// Display name.
    pub name: &'static str,
    /// Cargo weight limit.
    pub capacity: f64,
    /// One-way trip in milliseconds.
    pub travel_ms: u64,
    /// Loss chance in green, yellow and red zones.
    pub risk: [f64; 3],
    /// Rubies to unlock, `None` when a quest grants it.
    pub unlock_cost: Option<f64>,
}

/// Caravan table.
pub static CARAVAN_SPECS: [CaravanSpec; 3] = [
    CaravanSpec {
        tier: CaravanTier::OneStar,
        name: "Shuttle",
        capacity: 500.0,
        travel_ms: 2 * 60 * 60 * 1000,
        risk: [0.15, 0.20, 0.30],
        unlock_cost: Some(BASIC_LOGISTICS_UNLOCK_COST),
    },
    CaravanSpec {
        tier: CaravanTier::TwoStar,
        name: "Freighter",
        capacity: 1500.0,
        travel_ms: 60 * 60 * 1000,
        risk: [0.05, 0.10, 0.20],
        unlock_cost: None,
    },
    CaravanSpec {
        tier: CaravanTier::ThreeStar,
        name: "Hauler",
        capacity: 3000.0,
        travel_ms: 30 * 60 * 1000,
        risk: [0.00, 0.02, 0.10],
        unlock_cost: None,
    },
];

impl CaravanTier {
    /// All tiers.
    pub const ALL: [CaravanTier; 3] = [Self::OneStar, Self::TwoStar, Self::ThreeStar];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::OneStar => "1star",
            Self::TwoStar => "2star",
            Self::ThreeStar => "3star",
        }
    }

    /// Static parameters.
    pub fn spec(self) -> &'static CaravanSpec {
        match self {
            Self::OneStar => &CARAVAN_SPECS[0],
            Self::TwoStar => &CARAVAN_SPECS[1],
            Self::ThreeStar => &CARAVAN_SPECS[2],
        }
    }
}

impl fmt::Display for CaravanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CaravanTier {
    type Err = EconError;

    fn from_str(s: &str) -> EconResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "1star" => Ok(Self::OneStar),
            "2" | "2star" => Ok(Self::TwoStar),
            "3" | "3star" => Ok(Self::ThreeStar),
            _ => Err(EconError::UnknownCaravanTier(s.to_string())),
        }
    }
}

/// Loss chance for a route touching `zones`, using the most dangerous one.
pub fn loss_chance(tier: CaravanTier, from: ZoneColor, to: ZoneColor, insurance: bool) -> f64 {
    let zone = from.max(to);
    let risk = tier.spec().risk[zone as usize];
    if insurance { risk * INSURANCE_FACTOR } else { risk }
}

/// Cargo limit after perks.
pub fn effective_capacity(tier: CaravanTier, bulk_logistics: bool) -> f64 {
    let capacity = tier.spec().capacity;
    if bulk_logistics { capacity * BULK_LOGISTICS_BONUS } else { capacity }
}

/// Buy a tier that is sold for rubies.
pub fn unlock_tier(
    tier: CaravanTier,
    unlocked: &mut BTreeSet<CaravanTier>,
    wallet: &mut Resources,
) -> EconResult<()> {
    if unlocked.contains(&tier) {
        return Err(EconError::TierAlreadyUnlocked(tier));
    }
    let cost = tier.spec().unlock_cost.ok_or(EconError::TierQuestOnly(tier))?;
    wallet.spend(&[(ResourceKind::Rubies, cost)])?;
    unlocked.insert(tier);
    Ok(())
}

/// Where a caravan is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaravanStatus {
    /// En route.
    InTransit,
    /// Cargo arrived.
    Delivered,
    /// Cargo gone.
    Lost,
}

/// Result of checking one caravan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaravanCheck {
    /// Still travelling.
    Pending,
    /// Arrived intact.
    Delivered,
    /// Lost on the way.
    Lost,
}

/// Time left on a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eta {
    /// Whether the arrival time has passed.
    pub arrived: bool,
    /// Milliseconds left.
    pub remaining_ms: u64,
    /// Minutes left, rounded up.
    pub remaining_minutes: u64,
}

/// A cargo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caravan {
    /// Unique id.
    pub id: Uuid,
    /// Class.
    pub tier: CaravanTier,
    /// Source base.
    pub from_base: Uuid,
    /// Destination base.
    pub to_base: Uuid,
    /// Source region.
    pub from_region: RegionId,
    /// Destination region.
    pub to_region: RegionId,
    /// Goods carried.
    pub cargo: Resources,
    /// Weight of the goods.
    pub cargo_weight: f64,
    /// Departure time.
    pub departure_ms: u64,
    /// Arrival time.
    pub arrival_ms: u64,
    /// Current status.
    pub status: CaravanStatus,
    /// Chance of loss on arrival.
    pub loss_chance: f64,
}

impl Caravan {
    /// Short display id.
    pub fn short_id(&self) -> String {
        short_id(&self.id)
    }

    /// En route.
    pub fn in_transit(&self) -> bool {
        self.status == CaravanStatus::InTransit
    }

    /// Time left at `now_ms`.
    pub fn eta(&self, now_ms: u64) -> Eta {
        let remaining_ms = self.arrival_ms.saturating_sub(now_ms);
        Eta {
            arrived: now_ms >= self.arrival_ms,
            remaining_ms,
            remaining_minutes: remaining_ms.div_ceil(60_000),
        }
    }

    /// Roll the outcome once the arrival time has passed.
    pub fn check_completion(&self, rng: &mut impl Rng, now_ms: u64) -> CaravanCheck {
        if now_ms < self.arrival_ms {
            return CaravanCheck::Pending;
        }
        if rng.random::<f64>() < self.loss_chance {
            CaravanCheck::Lost
        } else {
            CaravanCheck::Delivered
        }
    }

    /// Push the arrival back.
    pub fn delay(&mut self, ms: u64) {
        self.arrival_ms = self.arrival_ms.saturating_add(ms);
    }

    /// Mark the caravan lost with its cargo.
    pub fn lose(&mut self) {
        self.status = CaravanStatus::Lost;
    }
}

/// Perks that shape a caravan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogisticsPerks {
    /// Capacity ×1.2.
    pub bulk_logistics: bool,
    /// Loss chance ×0.5.
    pub insurance: bool,
}

/// Check whether `cargo` may leave `from` for `to`.
pub fn can_send(
    bases: &Bases,
    from: Uuid,
    to: Uuid,
    cargo: &Resources,
    tier: CaravanTier,
    unlocked: &BTreeSet<CaravanTier>,
    perks: LogisticsPerks,
) -> EconResult<()> {
    if !unlocked.contains(&tier) {
        return Err(EconError::TierLocked(tier));
    }
    if from == to {
        return Err(EconError::SameBase);
    }
    let src = bases
        .get(from)
        .ok_or_else(|| EconError::UnknownBase(short_id(&from)))?;
    let dst = bases
        .get(to)
        .ok_or_else(|| EconError::UnknownBase(short_id(&to)))?;
    if src.region == dst.region {
        return Err(EconError::SameRegion(src.region));
    }
    if !src.is_active() {
        return Err(EconError::BaseNotActive(src.region));
    }
    if !dst.is_active() {
        return Err(EconError::BaseNotActive(dst.region));
    }
    if cargo.is_empty() {
        return Err(EconError::EmptyCargo);
    }
    let weight = cargo.cargo_weight();
    let capacity = effective_capacity(tier, perks.bulk_logistics);
    if weight > capacity {
        return Err(EconError::OverCapacity { weight, capacity });
    }
    if !src.storage.can_afford(&cargo.to_bundle()) {
        return Err(EconError::CargoUnavailable(src.region));
    }
    Ok(())
}

/// Load `cargo` out of the source base and dispatch a caravan.
#[allow(clippy::too_many_arguments)]
pub fn send(
    rng: &mut impl Rng,
    bases: &mut Bases,
    from: Uuid,
    to: Uuid,
    cargo: Resources,
    tier: CaravanTier,
    unlocked: &BTreeSet<CaravanTier>,
    perks: LogisticsPerks,
    now_ms: u64,
) -> EconResult<Caravan> {
    can_send(bases, from, to, &cargo, tier, unlocked, perks)?;

    let (from_region, to_region) = match (bases.get(from), bases.get(to)) {
        (Some(a), Some(b)) => (a.region, b.region),
        _ => return Err(EconError::UnknownBase(short_id(&from))),
    };
    let src = bases
        .get_mut(from)
        .ok_or_else(|| EconError::UnknownBase(short_id(&from)))?;
    src.storage.spend(&cargo.to_bundle())?;

    let caravan = Caravan {
        id: random_uuid(rng),
        tier,
        from_base: from,
        to_base: to,
        from_region,
        to_region,
        cargo_weight: cargo.cargo_weight(),
        cargo,
        departure_ms: now_ms,
        arrival_ms: now_ms + tier.spec().travel_ms,
        status: CaravanStatus::InTransit,
        loss_chance: loss_chance(
            tier,
            from_region.info().base_zone,
            to_region.info().base_zone,
            perks.insurance,
        ),
    };
    info!(
        caravan = %caravan.short_id(),
        from = %from_region,
        to = %to_region,
        tier = %tier,
        "caravan dispatched"
    );
    Ok(caravan)
}

/// Settle every caravan whose arrival time has passed. Delivered cargo goes into
/// the destination base's storage. Returns the ids and outcomes that changed.
pub fn settle(
    rng: &mut impl Rng,
    caravans: &mut [Caravan],
    bases: &mut Bases,
    now_ms: u64,
) -> Vec<(Uuid, CaravanCheck)> {
    let mut changed = Vec::new();
    for caravan in caravans.iter_mut().filter(|c| c.in_transit()) {
        match caravan.check_completion(rng, now_ms) {
            CaravanCheck::Pending => {}
            CaravanCheck::Delivered => {
                caravan.status = CaravanStatus::Delivered;
                if let Some(dst) = bases.get_mut(caravan.to_base) {
                    dst.storage.merge(&caravan.cargo);
                }
                info!(caravan = %caravan.short_id(), to = %caravan.to_region, "caravan delivered");
                changed.push((caravan.id, CaravanCheck::Delivered));
            }
            CaravanCheck::Lost => {
                caravan.lose();
                info!(caravan = %caravan.short_id(), "caravan lost");
                changed.push((caravan.id, CaravanCheck::Lost));
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::BaseType;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn zone() -> impl Strategy<Value = ZoneColor> {
        prop_oneof![
            Just(ZoneColor::Green),
            Just(ZoneColor::Yellow),
            Just(ZoneColor::Red)
        ]
    }

    fn tier() -> impl Strategy<Value = CaravanTier> {
        prop_oneof![
            Just(CaravanTier::OneStar),
            Just(CaravanTier::TwoStar),
            Just(CaravanTier::ThreeStar)
        ]
    }

    proptest! {
        #[test]
        fn loss_is_monotonic_in_danger(t in tier(), a in zone(), b in zone(), insured in any::<bool>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(loss_chance(t, lo, lo, insured) <= loss_chance(t, hi, hi, insured));
            prop_assert!(loss_chance(t, lo, hi, insured) == loss_chance(t, hi, lo, insured));
        }

        #[test]
        fn insurance_never_raises_loss(t in tier(), a in zone(), b in zone()) {
            prop_assert!(loss_chance(t, a, b, true) <= loss_chance(t, a, b, false));
        }
    }

    #[test]
    fn route_uses_most_dangerous_zone() {
        assert_eq!(loss_chance(CaravanTier::OneStar, ZoneColor::Green, ZoneColor::Red, false), 0.30);
        assert_eq!(loss_chance(CaravanTier::OneStar, ZoneColor::Green, ZoneColor::Yellow, true), 0.10);
        assert_eq!(loss_chance(CaravanTier::ThreeStar, ZoneColor::Green, ZoneColor::Green, false), 0.0);
    }

    #[test]
    fn only_shuttle_is_for_sale() {
        let mut unlocked = BTreeSet::new();
        let mut wallet = Resources::new();
        wallet.add(ResourceKind::Rubies, 20_000.0);
        unlock_tier(CaravanTier::OneStar, &mut unlocked, &mut wallet).unwrap();
        assert_eq!(wallet.get(ResourceKind::Rubies), 5_000.0);
        assert!(matches!(
            unlock_tier(CaravanTier::OneStar, &mut unlocked, &mut wallet),
            Err(EconError::TierAlreadyUnlocked(_))
        ));
        assert!(matches!(
            unlock_tier(CaravanTier::TwoStar, &mut unlocked, &mut wallet),
            Err(EconError::TierQuestOnly(_))
        ));
    }

    fn two_bases(rng: &mut StdRng) -> (Bases, Uuid, Uuid) {
        let mut bases = Bases::new();
        let mut wallet = Resources::new();
        wallet.add(ResourceKind::Rubies, 100_000.0);
        wallet.add(ResourceKind::Stone, 10_000.0);
        let a = bases
            .build(rng, RegionId::RustValley, BaseType::Outpost, &mut wallet, 0)
            .unwrap();
        let b = bases
            .build(rng, RegionId::MagmaCore, BaseType::Outpost, &mut wallet, 0)
            .unwrap();
        bases.get_mut(a).unwrap().storage.add(ResourceKind::Iron, 400.0);
        (bases, a, b)
    }

    #[test]
    fn send_moves_cargo_out_and_delivers() {
        let mut rng = StdRng::seed_from_u64(3);
        let (mut bases, a, b) = two_bases(&mut rng);
        let unlocked = BTreeSet::from([CaravanTier::ThreeStar]);
        let cargo = Resources::from_bundle(&[(ResourceKind::Iron, 300.0)]);

        let caravan = send(
            &mut rng, &mut bases, a, b, cargo, CaravanTier::ThreeStar, &unlocked,
            LogisticsPerks::default(), 1_000,
        )
        .unwrap();
        assert_eq!(bases.get(a).unwrap().storage.get(ResourceKind::Iron), 100.0);
        assert_eq!(caravan.loss_chance, 0.10);
        assert_eq!(caravan.arrival_ms, 1_000 + 30 * 60 * 1000);

        let eta = caravan.eta(1_000);
        assert!(!eta.arrived);
        assert_eq!(eta.remaining_minutes, 30);

        let mut caravans = vec![caravan];
        assert!(settle(&mut rng, &mut caravans, &mut bases, 1_000).is_empty());
        let changed = settle(&mut rng, &mut caravans, &mut bases, u64::MAX);
        assert_eq!(changed.len(), 1);
        if changed[0].1 == CaravanCheck::Delivered {
            assert_eq!(bases.get(b).unwrap().storage.get(ResourceKind::Iron), 300.0);
        }
        assert!(!caravans[0].in_transit());
    }

    #[test]
    fn send_validation() {
        let mut rng = StdRng::seed_from_u64(3);
        let (mut bases, a, b) = two_bases(&mut rng);
        let cargo = Resources::from_bundle(&[(ResourceKind::Iron, 300.0)]);
        let none = BTreeSet::new();
        let all = BTreeSet::from(CaravanTier::ALL);
        let perks = LogisticsPerks::default();

        assert!(matches!(
            can_send(&bases, a, b, &cargo, CaravanTier::OneStar, &none, perks),
            Err(EconError::TierLocked(_))
        ));
        assert!(matches!(
            can_send(&bases, a, a, &cargo, CaravanTier::OneStar, &all, perks),
            Err(EconError::SameBase)
        ));
        let heavy = Resources::from_bundle(&[(ResourceKind::Iron, 550.0)]);
        assert!(matches!(
            can_send(&bases, a, b, &heavy, CaravanTier::OneStar, &all, perks),
            Err(EconError::OverCapacity { .. })
        ));
        let bulk = LogisticsPerks { bulk_logistics: true, ..perks };
        assert!(matches!(
            can_send(&bases, a, b, &heavy, CaravanTier::OneStar, &all, bulk),
            Err(EconError::CargoUnavailable(_))
        ));
        let before = bases.get(a).unwrap().storage.clone();
        assert!(send(&mut rng, &mut bases, b, a, cargo, CaravanTier::OneStar, &all, perks, 0).is_err());
        assert_eq!(bases.get(a).unwrap().storage, before);
    }

    #[test]
    fn delay_pushes_arrival() {
        let mut rng = StdRng::seed_from_u64(3);
        let (mut bases, a, b) = two_bases(&mut rng);
        let all = BTreeSet::from(CaravanTier::ALL);
        let cargo = Resources::from_bundle(&[(ResourceKind::Iron, 10.0)]);
        let mut caravan = send(
            &mut rng, &mut bases, a, b, cargo, CaravanTier::TwoStar, &all,
            LogisticsPerks::default(), 0,
        )
        .unwrap();
        caravan.delay(60_000);
        assert_eq!(caravan.arrival_ms, 60 * 60 * 1000 + 60_000);
        assert_eq!(caravan.check_completion(&mut rng, 60 * 60 * 1000), CaravanCheck::Pending);
    }
}
