use thiserror::Error;

use crate::storage::StorageError;

/// Notice shown for every rejected form submission.
pub const INVALID_INPUT_NOTICE: &str = "Inputs have to be positive numbers.";

/// Notice shown when the current position cannot be determined.
pub const POSITION_UNAVAILABLE_NOTICE: &str =
    "Could not get your location. Please check your internet connection and try again.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Position error: {0}")]
    Position(#[from] PositionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a form field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    Missing,
    NotFinite,
    NotPositive,
    Negative,
    NotWhole,
}

impl ValidationReason {
    fn as_str(&self) -> &'static str {
        match self {
            ValidationReason::Missing => "is missing",
            ValidationReason::NotFinite => "is not a finite number",
            ValidationReason::NotPositive => "must be greater than zero",
            ValidationReason::Negative => "must not be negative",
            ValidationReason::NotWhole => "must be a whole number",
        }
    }
}

/// A rejected workout form. No record is built when this is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} {}", reason.as_str())]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: ValidationReason) -> Self {
        Self { field, reason }
    }

    /// Text for the blocking notice. Deliberately the same for every field.
    pub fn user_message(&self) -> &'static str {
        INVALID_INPUT_NOTICE
    }
}

/// Outcome of a failed position request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("permission to read the position was denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    Unavailable(String),

    #[error("no position source is configured")]
    NotConfigured,
}

impl PositionError {
    pub fn user_message(&self) -> &'static str {
        POSITION_UNAVAILABLE_NOTICE
    }
}
