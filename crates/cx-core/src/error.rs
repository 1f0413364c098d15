use crate::faction::FactionId;
use crate::region::{RegionId, ZoneColor};
use crate::resource::ResourceKind;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the core data model.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A resource id did not match any known resource.
    #[error("unknown resource: \"{0}\"")]
    UnknownResource(String),

    /// A region id did not match any known region.
    #[error("unknown region: \"{0}\"")]
    UnknownRegion(String),

    /// A faction id did not match any known faction.
    #[error("unknown faction: \"{0}\"")]
    UnknownFaction(String),

    /// A drill slot name did not match any slot.
    #[error("unknown drill slot: \"{0}\"")]
    UnknownSlot(String),

    /// A skill id did not match any skill.
    #[error("unknown skill: \"{0}\"")]
    UnknownSkill(String),

    /// An artifact definition or inventory instance was not found.
    #[error("unknown artifact: \"{0}\"")]
    UnknownArtifact(String),

    /// The artifact has not been analyzed yet.
    #[error("artifact {0} is not identified")]
    NotIdentified(String),

    /// All artifact slots are in use.
    #[error("all {0} artifact slots are in use")]
    EquipSlotsFull(usize),

    /// An amount was negative, NaN, or infinite.
    #[error("invalid amount {amount} for {resource}")]
    InvalidAmount {
        /// The resource the amount was meant for.
        resource: ResourceKind,
        /// The rejected amount.
        amount: f64,
    },

    /// The wallet does not hold enough of a resource.
    #[error("not enough {resource}: need {needed}, have {available}")]
    InsufficientResources {
        /// The missing resource.
        resource: ResourceKind,
        /// Amount required.
        needed: f64,
        /// Amount held.
        available: f64,
    },

    /// A zone license is already owned.
    #[error("{0} license already owned")]
    LicenseOwned(ZoneColor),

    /// A zone license is required first.
    #[error("{0} license required")]
    LicenseRequired(ZoneColor),

    /// A permanent permit already covers the region.
    #[error("permanent permit for {0} already owned")]
    PermitOwned(RegionId),

    /// The region's permit can only be earned through a quest.
    #[error("permit for {0} is only granted by quests")]
    PermitQuestOnly(RegionId),

    /// A perk or level requirement is not met.
    #[error("{faction} level {required} required")]
    ReputationTooLow {
        /// The faction whose reputation is checked.
        faction: FactionId,
        /// Required level.
        required: u32,
    },

    /// A drill part is already at the highest tier.
    #[error("{0} is already at max tier")]
    MaxTier(String),

    /// A skill is already at its maximum level.
    #[error("skill {0} is already at max level")]
    MaxLevel(String),
}
