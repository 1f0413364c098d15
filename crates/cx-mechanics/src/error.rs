//! Error types for the mechanics engine.

/// Errors that can occur during mechanics operations.
#[derive(Debug, thiserror::Error)]
pub enum MechError {
    /// A weighted pick was given no items.
    #[error("weighted pick over an empty list")]
    EmptyChoice,

    /// A weight was negative or not finite.
    #[error("invalid weight: {0}")]
    InvalidWeight(f64),

    /// All weights summed to zero or less.
    #[error("total weight must be positive, got {0}")]
    NonPositiveTotal(f64),

    /// An event id did not match the catalog.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// An event option id did not match any known action.
    #[error("unknown event action: {0}")]
    UnknownAction(String),

    /// An ability id did not match any ability.
    #[error("unknown ability: {0}")]
    UnknownAbility(String),

    /// An ability cannot fire right now.
    #[error("ability {id} unavailable: {reason}")]
    AbilityUnavailable {
        /// The ability.
        id: String,
        /// Why it was refused.
        reason: String,
    },

    /// No boss fight is in progress.
    #[error("no active boss")]
    NoActiveBoss,

    /// A minigame id did not match any minigame.
    #[error("unknown minigame: {0}")]
    UnknownMinigame(String),

    /// No combat minigame is running.
    #[error("no active minigame")]
    NoActiveMinigame,
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
