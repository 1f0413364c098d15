//! Player bases: construction, facilities, storage and raids.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use cx_core::ids::{id_matches, random_uuid, short_id};
use cx_core::region::RegionId;
use cx_core::resource::{ResourceKind, Resources};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EconError, EconResult};

/// Size class of a base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    /// Storage only.
    Outpost,
    /// Storage and a small workshop.
    Camp,
    /// Full station with market and fuel facilities.
    Station,
}

impl BaseType {
    /// All base types, smallest first.
    pub const ALL: [BaseType; 3] = [Self::Outpost, Self::Camp, Self::Station];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::Outpost => "outpost",
            Self::Camp => "camp",
            Self::Station => "station",
        }
    }

    /// Rubies charged to build.
    pub fn ruby_cost(self) -> f64 {
        match self {
            Self::Outpost => 5_000.0,
            Self::Camp => 20_000.0,
            Self::Station => 75_000.0,
        }
    }

    /// Materials charged to build, on top of rubies.
    pub fn materials(self) -> &'static [(ResourceKind, f64)] {
        match self {
            Self::Outpost => &[(ResourceKind::Stone, 500.0)],
            Self::Camp => &[(ResourceKind::Iron, 300.0), (ResourceKind::Copper, 300.0)],
            Self::Station => &[
                (ResourceKind::Iron, 1_000.0),
                (ResourceKind::Gold, 200.0),
                (ResourceKind::Titanium, 200.0),
            ],
        }
    }

    /// Full construction cost.
    pub fn cost(self) -> Vec<(ResourceKind, f64)> {
        let mut cost = vec![(ResourceKind::Rubies, self.ruby_cost())];
        cost.extend_from_slice(self.materials());
        cost
    }

    /// Construction time in milliseconds.
    pub fn build_time_ms(self) -> u64 {
        match self {
            Self::Outpost => 0,
            Self::Camp => 30 * 60 * 1000,
            Self::Station => 2 * 60 * 60 * 1000,
        }
    }

    /// Storage capacity in weight units.
    pub fn storage_capacity(self) -> f64 {
        match self {
            Self::Outpost => 1_000.0,
            Self::Camp => 5_000.0,
            Self::Station => 20_000.0,
        }
    }

    /// Part tiers the workshop can craft, if any.
    pub fn workshop_tiers(self) -> Option<(u32, u32)> {
        match self {
            Self::Outpost => None,
            Self::Camp => Some((1, 5)),
            Self::Station => Some((1, 10)),
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BaseType {
    type Err = EconError;

    fn from_str(s: &str) -> EconResult<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.id() == lower)
            .ok_or_else(|| EconError::UnknownBaseType(s.to_string()))
    }
}

/// Buildable base module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facility {
    /// Clay and stone refining.
    BasicRefinery,
    /// Coal liquefaction.
    AdvancedRefinery,
    /// Repair kit assembly.
    WorkshopFacility,
    /// Coolant synthesis.
    AdvancedWorkshop,
    /// Doubles artifact analysis speed in the region.
    ResearchLab,
    /// Better odds against raids.
    Fortification,
    /// Better odds against raids.
    Guards,
}

impl Facility {
    /// Every facility.
    pub const ALL: [Facility; 7] = [
        Self::BasicRefinery,
        Self::AdvancedRefinery,
        Self::WorkshopFacility,
        Self::AdvancedWorkshop,
        Self::ResearchLab,
        Self::Fortification,
        Self::Guards,
    ];

    /// Stable identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::BasicRefinery => "basic_refinery",
            Self::AdvancedRefinery => "advanced_refinery",
            Self::WorkshopFacility => "workshop_facility",
            Self::AdvancedWorkshop => "advanced_workshop",
            Self::ResearchLab => "research_lab",
            Self::Fortification => "fortification",
            Self::Guards => "guards",
        }
    }

    /// Price in rubies.
    pub fn cost(self) -> f64 {
        match self {
            Self::BasicRefinery => 5_000.0,
            Self::AdvancedRefinery => 15_000.0,
            Self::WorkshopFacility => 3_000.0,
            Self::AdvancedWorkshop => 10_000.0,
            Self::ResearchLab => 12_000.0,
            Self::Fortification => 8_000.0,
            Self::Guards => 6_000.0,
        }
    }

    /// Smallest base type that can host it.
    pub fn min_base(self) -> BaseType {
        match self {
            Self::BasicRefinery | Self::AdvancedRefinery => BaseType::Station,
            Self::WorkshopFacility | Self::AdvancedWorkshop | Self::ResearchLab => BaseType::Camp,
            Self::Fortification | Self::Guards => BaseType::Outpost,
        }
    }

    /// Facility that must be built first.
    pub fn prerequisite(self) -> Option<Facility> {
        match self {
            Self::AdvancedRefinery => Some(Self::BasicRefinery),
            Self::AdvancedWorkshop => Some(Self::WorkshopFacility),
            _ => None,
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Facility {
    type Err = EconError;

    fn from_str(s: &str) -> EconResult<Self> {
        let lower = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|f| f.id() == lower)
            .ok_or_else(|| EconError::UnknownFacility(s.to_string()))
    }
}

/// Construction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseStatus {
    /// Under construction.
    Building,
    /// Operational.
    Active,
}

/// Raid defence bonus per defensive facility.
pub const DEFENSE_FACILITY_BONUS: f64 = 0.2;

/// Defence chance is never certain.
pub const MAX_DEFEND_CHANCE: f64 = 0.95;

/// Result of a raid on a base.
#[derive(Debug, Clone, PartialEq)]
pub enum RaidOutcome {
    /// Attackers were driven off.
    Defended,
    /// Part of the storage was taken.
    Looted {
        /// Fraction of each stored resource lost.
        fraction: f64,
        /// Amounts taken.
        lost: Vec<(ResourceKind, f64)>,
    },
}

/// A player-owned base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerBase {
    /// Unique id.
    pub id: Uuid,
    /// Region it stands in.
    pub region: RegionId,
    /// Size class.
    pub base_type: BaseType,
    /// Construction state.
    pub status: BaseStatus,
    /// Storage limit in weight units.
    pub storage_capacity: f64,
    /// Stored resources.
    pub storage: Resources,
    /// Built facilities.
    pub facilities: BTreeSet<Facility>,
    /// When construction began.
    pub construction_start_ms: u64,
    /// When construction ends.
    pub completion_ms: u64,
    /// Last time the player was here.
    pub last_visited_ms: u64,
}

impl PlayerBase {
    /// Operational.
    pub fn is_active(&self) -> bool {
        self.status == BaseStatus::Active
    }

    /// Operational station.
    pub fn is_active_station(&self) -> bool {
        self.is_active() && self.base_type == BaseType::Station
    }

    /// Whether `facility` is built.
    pub fn has(&self, facility: Facility) -> bool {
        self.facilities.contains(&facility)
    }

    /// Stored weight.
    pub fn stored_weight(&self) -> f64 {
        self.storage.cargo_weight()
    }

    /// Remaining storage.
    pub fn free_capacity(&self) -> f64 {
        (self.storage_capacity - self.stored_weight()).max(0.0)
    }

    /// Short display id.
    pub fn short_id(&self) -> String {
        short_id(&self.id)
    }

    /// Chance to beat off a raid. `liberation` is the perk's bonus fraction.
    pub fn defend_chance(&self, base_chance: f64, liberation: f64) -> f64 {
        let mut chance = base_chance;
        if self.has(Facility::Fortification) {
            chance += DEFENSE_FACILITY_BONUS;
        }
        if self.has(Facility::Guards) {
            chance += DEFENSE_FACILITY_BONUS;
        }
        (chance * (1.0 + liberation.max(0.0))).min(MAX_DEFEND_CHANCE)
    }

    /// Roll a raid against this base.
    pub fn raid(
        &mut self,
        rng: &mut impl Rng,
        defend_chance: f64,
        loss_min: f64,
        loss_max: f64,
    ) -> RaidOutcome {
        if rng.random::<f64>() < defend_chance {
            return RaidOutcome::Defended;
        }
        let fraction = loss_min + rng.random::<f64>() * (loss_max - loss_min).max(0.0);
        let kinds: Vec<(ResourceKind, f64)> = self.storage.iter().collect();
        let mut lost = Vec::new();
        for (kind, amount) in kinds {
            let take = (amount * fraction).floor();
            if take > 0.0 {
                lost.push((kind, self.storage.take_up_to(kind, take)));
            }
        }
        RaidOutcome::Looted { fraction, lost }
    }
}

/// All of the player's bases, at most one per region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bases {
    list: Vec<PlayerBase>,
}

impl Bases {
    /// No bases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate bases in build order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerBase> {
        self.list.iter()
    }

    /// Number of bases.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// No bases built.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Base with `id`.
    pub fn get(&self, id: Uuid) -> Option<&PlayerBase> {
        self.list.iter().find(|b| b.id == id)
    }

    /// Mutable base with `id`.
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut PlayerBase> {
        self.list.iter_mut().find(|b| b.id == id)
    }

    /// Base in `region`.
    pub fn in_region(&self, region: RegionId) -> Option<&PlayerBase> {
        self.list.iter().find(|b| b.region == region)
    }

    /// Mutable base in `region`.
    pub fn in_region_mut(&mut self, region: RegionId) -> Option<&mut PlayerBase> {
        self.list.iter_mut().find(|b| b.region == region)
    }

    /// Resolve a base by region id or id prefix.
    pub fn find(&self, query: &str) -> EconResult<&PlayerBase> {
        if let Ok(region) = query.parse::<RegionId>()
            && let Some(base) = self.in_region(region)
        {
            return Ok(base);
        }
        self.list
            .iter()
            .find(|b| id_matches(&b.id, query))
            .ok_or_else(|| EconError::UnknownBase(query.to_string()))
    }

    /// Whether the current region holds an active station.
    pub fn has_station_in(&self, region: RegionId) -> bool {
        self.in_region(region).is_some_and(PlayerBase::is_active_station)
    }

    /// Whether an active research lab stands in `region`.
    pub fn has_research_lab_in(&self, region: RegionId) -> bool {
        self.in_region(region)
            .is_some_and(|b| b.is_active() && b.has(Facility::ResearchLab))
    }

    /// Start building a base. Zero build time makes it active at once.
    pub fn build(
        &mut self,
        rng: &mut impl Rng,
        region: RegionId,
        base_type: BaseType,
        wallet: &mut Resources,
        now_ms: u64,
    ) -> EconResult<Uuid> {
        if self.in_region(region).is_some() {
            return Err(EconError::BaseExists(region));
        }
        wallet.spend(&base_type.cost())?;

        let build_time = base_type.build_time_ms();
        let base = PlayerBase {
            id: random_uuid(rng),
            region,
            base_type,
            status: if build_time == 0 { BaseStatus::Active } else { BaseStatus::Building },
            storage_capacity: base_type.storage_capacity(),
            storage: Resources::new(),
            facilities: BTreeSet::new(),
            construction_start_ms: now_ms,
            completion_ms: now_ms + build_time,
            last_visited_ms: now_ms,
        };
        let id = base.id;
        info!(region = %region, base_type = %base_type, "base construction started");
        self.list.push(base);
        Ok(id)
    }

    /// Activate every base whose construction finished. Returns their ids.
    pub fn complete_construction(&mut self, now_ms: u64) -> Vec<Uuid> {
        let mut done = Vec::new();
        for base in &mut self.list {
            if base.status == BaseStatus::Building && now_ms >= base.completion_ms {
                base.status = BaseStatus::Active;
                info!(region = %base.region, base_type = %base.base_type, "base construction complete");
                done.push(base.id);
            }
        }
        done
    }

    /// Buy a facility for the base with `id`.
    pub fn build_facility(
        &mut self,
        id: Uuid,
        facility: Facility,
        wallet: &mut Resources,
    ) -> EconResult<()> {
        let base = self
            .get_mut(id)
            .ok_or_else(|| EconError::UnknownBase(short_id(&id)))?;
        if !base.is_active() {
            return Err(EconError::BaseNotActive(base.region));
        }
        if base.has(facility) {
            return Err(EconError::FacilityExists(facility));
        }
        if base.base_type < facility.min_base() {
            return Err(EconError::FacilityNeedsBase {
                facility,
                required: facility.min_base(),
            });
        }
        if let Some(prereq) = facility.prerequisite()
            && !base.has(prereq)
        {
            return Err(EconError::MissingFacility(prereq));
        }
        wallet.spend(&[(ResourceKind::Rubies, facility.cost())])?;
        base.facilities.insert(facility);
        info!(region = %base.region, facility = %facility, "facility built");
        Ok(())
    }

    /// Move resources from the player into the base in `current_region`.
    pub fn transfer_to_base(
        &mut self,
        current_region: RegionId,
        kind: ResourceKind,
        amount: f64,
        wallet: &mut Resources,
    ) -> EconResult<()> {
        check_amount(amount)?;
        let base = self
            .in_region_mut(current_region)
            .ok_or(EconError::NoBaseInRegion(current_region))?;
        if !base.is_active() {
            return Err(EconError::BaseNotActive(current_region));
        }
        let weight = amount * kind.unit_weight();
        if weight > base.free_capacity() {
            return Err(EconError::StorageFull {
                needed: weight,
                free: base.free_capacity(),
            });
        }
        wallet.spend(&[(kind, amount)])?;
        base.storage.add(kind, amount);
        Ok(())
    }

    /// Move resources from the base in `current_region` to the player.
    pub fn transfer_from_base(
        &mut self,
        current_region: RegionId,
        kind: ResourceKind,
        amount: f64,
        wallet: &mut Resources,
    ) -> EconResult<()> {
        check_amount(amount)?;
        let base = self
            .in_region_mut(current_region)
            .ok_or(EconError::NoBaseInRegion(current_region))?;
        if !base.is_active() {
            return Err(EconError::BaseNotActive(current_region));
        }
        base.storage.spend(&[(kind, amount)])?;
        wallet.add(kind, amount);
        Ok(())
    }

    /// Record a visit to the base in `region`.
    pub fn visit(&mut self, region: RegionId, now_ms: u64) {
        if let Some(base) = self.in_region_mut(region) {
            base.last_visited_ms = now_ms;
        }
    }
}

pub(crate) fn check_amount(amount: f64) -> EconResult<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(EconError::InvalidAmount(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rich() -> Resources {
        let mut w = Resources::new();
        for kind in ResourceKind::ALL {
            w.add(kind, 1_000_000.0);
        }
        w
    }

    #[test]
    fn outpost_is_active_immediately() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bases = Bases::new();
        let mut wallet = rich();
        let id = bases
            .build(&mut rng, RegionId::RustValley, BaseType::Outpost, &mut wallet, 0)
            .unwrap();
        assert!(bases.get(id).unwrap().is_active());
        assert_eq!(wallet.get(ResourceKind::Rubies), 995_000.0);
        assert_eq!(wallet.get(ResourceKind::Stone), 999_500.0);
    }

    #[test]
    fn one_base_per_region() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bases = Bases::new();
        let mut wallet = rich();
        bases
            .build(&mut rng, RegionId::IronGates, BaseType::Camp, &mut wallet, 0)
            .unwrap();
        let before = wallet.clone();
        let err = bases
            .build(&mut rng, RegionId::IronGates, BaseType::Outpost, &mut wallet, 0)
            .unwrap_err();
        assert!(matches!(err, EconError::BaseExists(RegionId::IronGates)));
        assert_eq!(wallet, before);
    }

    #[test]
    fn unaffordable_build_leaves_wallet_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bases = Bases::new();
        let mut wallet = Resources::new();
        wallet.add(ResourceKind::Rubies, 100.0);
        assert!(bases
            .build(&mut rng, RegionId::RustValley, BaseType::Station, &mut wallet, 0)
            .is_err());
        assert!(bases.is_empty());
        assert_eq!(wallet.get(ResourceKind::Rubies), 100.0);
    }

    #[test]
    fn construction_completes_on_time() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bases = Bases::new();
        let mut wallet = rich();
        let id = bases
            .build(&mut rng, RegionId::MagmaCore, BaseType::Station, &mut wallet, 1_000)
            .unwrap();
        let done_at = 1_000 + BaseType::Station.build_time_ms();
        assert!(bases.complete_construction(done_at - 1).is_empty());
        assert_eq!(bases.complete_construction(done_at), vec![id]);
        assert!(bases.has_station_in(RegionId::MagmaCore));
    }

    #[test]
    fn facility_rules() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bases = Bases::new();
        let mut wallet = rich();
        let outpost = bases
            .build(&mut rng, RegionId::RustValley, BaseType::Outpost, &mut wallet, 0)
            .unwrap();

        let err = bases
            .build_facility(outpost, Facility::BasicRefinery, &mut wallet)
            .unwrap_err();
        assert!(matches!(err, EconError::FacilityNeedsBase { .. }));

        bases.build_facility(outpost, Facility::Guards, &mut wallet).unwrap();
        assert!(matches!(
            bases.build_facility(outpost, Facility::Guards, &mut wallet),
            Err(EconError::FacilityExists(Facility::Guards))
        ));
    }

    #[test]
    fn facility_prerequisites() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bases = Bases::new();
        let mut wallet = rich();
        let station = bases
            .build(&mut rng, RegionId::RustValley, BaseType::Station, &mut wallet, 0)
            .unwrap();
        bases.complete_construction(u64::MAX);
        assert!(matches!(
            bases.build_facility(station, Facility::AdvancedRefinery, &mut wallet),
            Err(EconError::MissingFacility(Facility::BasicRefinery))
        ));
        bases.build_facility(station, Facility::BasicRefinery, &mut wallet).unwrap();
        bases.build_facility(station, Facility::AdvancedRefinery, &mut wallet).unwrap();
    }

    #[test]
    fn transfers_respect_region_and_capacity() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bases = Bases::new();
        let mut wallet = rich();
        bases
            .build(&mut rng, RegionId::RustValley, BaseType::Outpost, &mut wallet, 0)
            .unwrap();

        assert!(matches!(
            bases.transfer_to_base(RegionId::IronGates, ResourceKind::Iron, 10.0, &mut wallet),
            Err(EconError::NoBaseInRegion(RegionId::IronGates))
        ));

        let capacity = BaseType::Outpost.storage_capacity();
        let too_much = capacity / ResourceKind::Clay.unit_weight() + 1.0;
        assert!(matches!(
            bases.transfer_to_base(RegionId::RustValley, ResourceKind::Clay, too_much, &mut wallet),
            Err(EconError::StorageFull { .. })
        ));

        bases
            .transfer_to_base(RegionId::RustValley, ResourceKind::Iron, 100.0, &mut wallet)
            .unwrap();
        bases
            .transfer_from_base(RegionId::RustValley, ResourceKind::Iron, 40.0, &mut wallet)
            .unwrap();
        let base = bases.in_region(RegionId::RustValley).unwrap();
        assert_eq!(base.storage.get(ResourceKind::Iron), 60.0);
        assert!(bases
            .transfer_from_base(RegionId::RustValley, ResourceKind::Iron, 61.0, &mut wallet)
            .is_err());
    }

    #[test]
    fn defences_raise_defend_chance() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bases = Bases::new();
        let mut wallet = rich();
        let id = bases
            .build(&mut rng, RegionId::RustValley, BaseType::Outpost, &mut wallet, 0)
            .unwrap();
        assert_eq!(bases.get(id).unwrap().defend_chance(0.5, 0.0), 0.5);
        bases.build_facility(id, Facility::Fortification, &mut wallet).unwrap();
        bases.build_facility(id, Facility::Guards, &mut wallet).unwrap();
        let base = bases.get(id).unwrap();
        assert!((base.defend_chance(0.5, 0.0) - 0.9).abs() < 1e-9);
        assert_eq!(base.defend_chance(0.5, 0.5), MAX_DEFEND_CHANCE);
    }

    #[test]
    fn raid_takes_a_fraction() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut bases = Bases::new();
        let mut wallet = rich();
        let id = bases
            .build(&mut rng, RegionId::RustValley, BaseType::Outpost, &mut wallet, 0)
            .unwrap();
        let base = bases.get_mut(id).unwrap();
        base.storage.add(ResourceKind::Gold, 100.0);
        match base.raid(&mut rng, 0.0, 0.2, 0.5) {
            RaidOutcome::Looted { fraction, lost } => {
                assert!((0.2..=0.5).contains(&fraction));
                let taken: f64 = lost.iter().map(|(_, a)| a).sum();
                assert_eq!(base.storage.get(ResourceKind::Gold), 100.0 - taken);
            }
            RaidOutcome::Defended => panic!("zero defend chance"),
        }
        assert_eq!(base.raid(&mut rng, 1.0, 0.2, 0.5), RaidOutcome::Defended);
    }

    #[test]
    fn find_by_region_or_prefix() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut bases = Bases::new();
        let mut wallet = rich();
        let id = bases
            .build(&mut rng, RegionId::CrystalWastes, BaseType::Outpost, &mut wallet, 0)
            .unwrap();
        assert_eq!(bases.find("crystal_wastes").unwrap().id, id);
        assert_eq!(bases.find(&short_id(&id)).unwrap().id, id);
        assert!(bases.find("nope").is_err());
    }
}
