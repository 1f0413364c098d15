use cx_core::error::CoreError;
use cx_economy::error::EconError;
use cx_mechanics::error::MechError;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Mechanics(#[from] MechError),

    #[error(transparent)]
    Economy(#[from] EconError),

    #[error("could not parse command \"{input}\": {reason}")]
    Parse { input: String, reason: String },

    #[error("action not allowed: {0}")]
    NotAllowed(String),

    #[error("save is not valid base64: {0}")]
    SaveEncoding(#[from] base64::DecodeError),

    #[error("save is not valid JSON: {0}")]
    SaveFormat(#[from] serde_json::Error),

    #[error("unsupported save version {found}, expected {expected}")]
    SaveVersion { found: u32, expected: u32 },

    #[error("save holds an impossible game: {0}")]
    SaveInvalid(String),

    #[error("system error: {0}")]
    SystemError(String),
}
