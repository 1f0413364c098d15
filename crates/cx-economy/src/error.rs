//! Error types for the economy.

use cx_core::error::CoreError;
use cx_core::region::RegionId;
use cx_core::resource::ResourceKind;

use crate::base::{BaseType, Facility};
use crate::caravan::CaravanTier;

/// Errors raised by bases, caravans, markets, recipes and quests.
#[derive(Debug, thiserror::Error)]
pub enum EconError {
    /// A core rule was violated, usually an unaffordable cost.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A base type name did not match.
    #[error("unknown base type: \"{0}\"")]
    UnknownBaseType(String),

    /// A facility name did not match.
    #[error("unknown facility: \"{0}\"")]
    UnknownFacility(String),

    /// The region already has a base.
    #[error("a base already exists in {0}")]
    BaseExists(RegionId),

    /// A base id or region did not match any base.
    #[error("unknown base: \"{0}\"")]
    UnknownBase(String),

    /// The base is still under construction.
    #[error("base in {0} is still under construction")]
    BaseNotActive(RegionId),

    /// The facility is already built.
    #[error("{0} already built")]
    FacilityExists(Facility),

    /// The base is too small for the facility.
    #[error("{facility} needs at least a {required}")]
    FacilityNeedsBase {
        /// Requested facility.
        facility: Facility,
        /// Smallest base that can host it.
        required: BaseType,
    },

    /// A facility is required first.
    #[error("{0} required")]
    MissingFacility(Facility),

    /// The player has no base in the region.
    #[error("no base in {0}")]
    NoBaseInRegion(RegionId),

    /// Base storage cannot hold the transfer.
    #[error("storage full: need {needed}, free {free}")]
    StorageFull {
        /// Weight to store.
        needed: f64,
        /// Free capacity.
        free: f64,
    },

    /// An amount was zero, negative or not finite.
    #[error("invalid amount: {0}")]
    InvalidAmount(f64),

    /// A caravan tier name did not match.
    #[error("unknown caravan tier: \"{0}\"")]
    UnknownCaravanTier(String),

    /// The tier is already available.
    #[error("{0} caravans already unlocked")]
    TierAlreadyUnlocked(CaravanTier),

    /// The tier is granted by quests only.
    #[error("{0} caravans are unlocked through quests")]
    TierQuestOnly(CaravanTier),

    /// The tier has not been unlocked.
    #[error("{0} caravans are locked")]
    TierLocked(CaravanTier),

    /// Source and destination are the same base.
    #[error("source and destination are the same base")]
    SameBase,

    /// Source and destination share a region.
    #[error("both bases are in {0}")]
    SameRegion(RegionId),

    /// Nothing to ship.
    #[error("cargo is empty")]
    EmptyCargo,

    /// Cargo exceeds the caravan's capacity.
    #[error("cargo weighs {weight}, capacity is {capacity}")]
    OverCapacity {
        /// Cargo weight.
        weight: f64,
        /// Caravan capacity.
        capacity: f64,
    },

    /// The source base does not hold the cargo.
    #[error("base in {0} does not hold that cargo")]
    CargoUnavailable(RegionId),

    /// The resource has no market price.
    #[error("{0} cannot be traded")]
    NotTradable(ResourceKind),

    /// Trading needs an active station in the region.
    #[error("no active station in {0}")]
    NoStation(RegionId),

    /// A black market item id did not match.
    #[error("unknown item: \"{0}\"")]
    UnknownItem(String),

    /// The black market has not been opened.
    #[error("black market is locked")]
    BlackMarketLocked,

    /// Rebel standing is too low for the item.
    #[error("rebel reputation {required} required, have {have}")]
    ReputationTooLow {
        /// Needed reputation.
        required: i64,
        /// Current reputation.
        have: i64,
    },

    /// Stock for the item is exhausted.
    #[error("{0} is out of stock")]
    OutOfStock(String),

    /// A recipe id did not match.
    #[error("unknown recipe: \"{0}\"")]
    UnknownRecipe(String),

    /// The quest is not offered or not active.
    #[error("quest {0} is not available")]
    QuestUnavailable(String),

    /// The quest was already accepted.
    #[error("quest {0} is already active")]
    QuestActive(String),

    /// Objectives are not yet met.
    #[error("quest {0} objectives are not complete")]
    QuestIncomplete(String),

    /// The drill is at full integrity.
    #[error("nothing to repair")]
    NothingToRepair,

    /// An expedition difficulty name did not match.
    #[error("unknown expedition difficulty: \"{0}\"")]
    UnknownDifficulty(String),

    /// Drone count outside 1 to the swarm limit.
    #[error("an expedition takes 1 to 100 drones, got {0}")]
    InvalidDroneCount(u32),

    /// Expeditions are not sent after this resource.
    #[error("expeditions cannot target {0}")]
    NotExpeditionTarget(ResourceKind),

    /// Too many expeditions are out.
    #[error("at most {0} expeditions can be out at once")]
    TooManyExpeditions(usize),

    /// An expedition id did not match.
    #[error("unknown expedition: \"{0}\"")]
    UnknownExpedition(String),

    /// The expedition has not returned.
    #[error("expedition {0} is still out")]
    ExpeditionUnderway(String),

    /// The expedition already returned.
    #[error("expedition {0} has already returned")]
    ExpeditionFinished(String),

    /// A buff id did not match any effect.
    #[error("unknown effect: \"{0}\"")]
    UnknownEffect(String),
}

/// Convenience result type for economy operations.
pub type EconResult<T> = Result<T, EconError>;
