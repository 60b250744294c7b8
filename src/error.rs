//! Error handling for the liquidation race simulator
//!
//! Simulated liquidation failures are modeled outcomes, not errors. This type
//! covers rejected operations (attempting a track twice, a track that was
//! missed, unknown positions) and configuration or IO problems.

use crate::core::types::{RiskClass, Track};
use std::fmt;
use std::io;

/// Main error type for the simulator
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    // Configuration errors
    ConfigNotFound(String),
    ConfigParse(String),
    ConfigValidation(String),

    // Rejected simulator operations
    PositionNotFound(u32),
    AlreadyAttempted(u32, Track),
    TrackMissed(u32, Track),
    ConflictingAttempt(u32),
    NotEligible(u32, RiskClass),
    InvalidParameter(String, String), // (parameter_name, reason)

    // IO errors
    FileNotFound(String),
    FileRead(String),
    FileWrite(String),
    Serialization(String),

    // General errors
    Internal(String),
}

impl SimError {
    /// Get a user-friendly error message with helpful context
    pub fn user_message(&self) -> String {
        match self {
            SimError::ConfigNotFound(path) => {
                format!(
                    "Configuration file not found: {}\n\n\
                    💡 Quick fix:\n\
                    1. Run: race-sim init\n\
                    2. Adjust failure rates and thresholds in config.toml\n\
                    3. Try again",
                    path
                )
            }
            SimError::ConfigValidation(msg) => {
                format!(
                    "Configuration validation error: {}\n\n\
                    💡 Check config.toml for:\n\
                    - Failure rates between 0.0 and 1.0\n\
                    - Ranges written as [low, high] with low < high\n\
                    - liq_threshold below aot_threshold",
                    msg
                )
            }
            SimError::TrackMissed(id, track) => {
                format!(
                    "Position #{} is gone for the {} track\n\n\
                    💡 Another execution already settled it. Reset the pool to race again.",
                    id, track
                )
            }
            SimError::NotEligible(id, class) => {
                format!(
                    "Position #{} is {} and cannot be scheduled ahead of time\n\n\
                    💡 Only AT RISK positions accept AoT scheduling",
                    id,
                    class.label()
                )
            }
            _ => self.to_string(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            SimError::ConfigNotFound(_)
            | SimError::ConfigParse(_)
            | SimError::ConfigValidation(_) => "config",

            SimError::PositionNotFound(_)
            | SimError::AlreadyAttempted(_, _)
            | SimError::TrackMissed(_, _)
            | SimError::ConflictingAttempt(_)
            | SimError::NotEligible(_, _) => "position",

            SimError::InvalidParameter(_, _) => "validation",

            SimError::FileNotFound(_)
            | SimError::FileRead(_)
            | SimError::FileWrite(_)
            | SimError::Serialization(_) => "io",

            SimError::Internal(_) => "internal",
        }
    }

    /// Rejections caused by the position's current state rather than bad input
    pub fn is_rejection(&self) -> bool {
        self.category() == "position"
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path)
            }
            SimError::ConfigParse(msg) => {
                write!(f, "Configuration parse error: {}", msg)
            }
            SimError::ConfigValidation(msg) => {
                write!(f, "Configuration validation error: {}", msg)
            }

            SimError::PositionNotFound(id) => {
                write!(f, "Position #{} is not in the current pool", id)
            }
            SimError::AlreadyAttempted(id, track) => {
                write!(f, "Position #{} was already attempted on the {} track", id, track)
            }
            SimError::TrackMissed(id, track) => {
                write!(f, "Position #{} was missed on the {} track", id, track)
            }
            SimError::ConflictingAttempt(id) => {
                write!(f, "Position #{} has a conflicting attempt in flight", id)
            }
            SimError::NotEligible(id, class) => {
                write!(f, "Position #{} is not eligible ({})", id, class.label())
            }
            SimError::InvalidParameter(param, reason) => {
                write!(f, "Invalid parameter '{}': {}", param, reason)
            }

            SimError::FileNotFound(path) => {
                write!(f, "File not found: {}", path)
            }
            SimError::FileRead(msg) => {
                write!(f, "File read error: {}", msg)
            }
            SimError::FileWrite(msg) => {
                write!(f, "File write error: {}", msg)
            }
            SimError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }

            SimError::Internal(msg) => {
                write!(f, "Internal error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SimError {}

// Conversion implementations for common error types

impl From<io::Error> for SimError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => SimError::FileNotFound(err.to_string()),
            io::ErrorKind::PermissionDenied => SimError::FileRead(err.to_string()),
            _ => SimError::Internal(format!("IO error: {}", err)),
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        SimError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for SimError {
    fn from(err: toml::de::Error) -> Self {
        SimError::ConfigParse(format!("TOML parse error: {}", err))
    }
}

impl From<crate::config::ConfigError> for SimError {
    fn from(err: crate::config::ConfigError) -> Self {
        use crate::config::ConfigError;
        match err {
            ConfigError::FileNotFound(path) => SimError::ConfigNotFound(path),
            ConfigError::FileRead(msg) => SimError::FileRead(msg),
            ConfigError::FileWrite(msg) => SimError::FileWrite(msg),
            ConfigError::Parse(msg) => SimError::ConfigParse(msg),
            ConfigError::Serialize(msg) => SimError::Serialization(msg),
            ConfigError::Validation(msg) => SimError::ConfigValidation(msg),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for SimError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        SimError::Internal(format!("simulator lock poisoned: {}", err))
    }
}

/// Result type alias using SimError
pub type SimResult<T> = Result<T, SimError>;
