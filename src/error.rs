//! ═══════════════════════════════════════════════════════════════════════════════
//! ERROR — Unified Error Type for Suitcast
//! ═══════════════════════════════════════════════════════════════════════════════
//! Centralized error handling. Nothing in this core is fatal to the process:
//! parse misses and duplicates are silent skips, outward publish failures are
//! logged and absorbed, and only admin-facing validation surfaces to a caller.
//! ═══════════════════════════════════════════════════════════════════════════════

use std::fmt;

/// The unified error type for the suitcast crate
#[derive(Debug)]
pub enum SuitcastError {
    /// I/O error (config file operations)
    Io(std::io::Error),
    /// JSON serialization/deserialization error
    Json(serde_json::Error),
    /// Admin-supplied value out of allowed range
    Config(ConfigError),
    /// Prediction registry fault
    Registry(RegistryError),
    /// Outward publish or edit failed
    Publish(PublishError),
}

impl std::error::Error for SuitcastError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SuitcastError::Io(e) => Some(e),
            SuitcastError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for SuitcastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuitcastError::Io(e) => write!(f, "I/O error: {}", e),
            SuitcastError::Json(e) => write!(f, "JSON error: {}", e),
            SuitcastError::Config(e) => write!(f, "Configuration error: {}", e),
            SuitcastError::Registry(e) => write!(f, "Registry error: {}", e),
            SuitcastError::Publish(e) => write!(f, "Publish error: {}", e),
        }
    }
}

impl From<std::io::Error> for SuitcastError {
    fn from(err: std::io::Error) -> Self {
        SuitcastError::Io(err)
    }
}

impl From<serde_json::Error> for SuitcastError {
    fn from(err: serde_json::Error) -> Self {
        SuitcastError::Json(err)
    }
}

/// Validation errors for admin-driven configuration changes.
/// A rejected command leaves the prior configuration unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Standard offset must be a positive integer
    OffsetOutOfRange(u64),
    /// Verification window width must lie in 0..=10
    WindowOutOfRange(u64),
    /// Suppression duration above the hard ceiling
    SuppressionTooLong { requested: u64, ceiling: u64 },
    /// Gap-sequence list was empty
    EmptyGapSequence,
    /// Gap-sequence entry was not a positive integer
    InvalidGapEntry(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OffsetOutOfRange(v) => {
                write!(f, "Standard offset must be >= 1, got {}", v)
            }
            ConfigError::WindowOutOfRange(v) => {
                write!(f, "Verification window must be in 0..=10, got {}", v)
            }
            ConfigError::SuppressionTooLong { requested, ceiling } => {
                write!(
                    f,
                    "Suppression of {}s exceeds ceiling of {}s",
                    requested, ceiling
                )
            }
            ConfigError::EmptyGapSequence => write!(f, "Gap sequence must not be empty"),
            ConfigError::InvalidGapEntry(entry) => {
                write!(f, "Gap entry '{}' is not a positive integer", entry)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for SuitcastError {
    fn from(err: ConfigError) -> Self {
        SuitcastError::Config(err)
    }
}

/// Prediction registry faults
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A live prediction for this target round already exists
    AlreadyExists(u64),
    /// No live prediction for this target round
    NotFound(u64),
    /// Live-entry ceiling reached
    CapacityExceeded,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AlreadyExists(t) => {
                write!(f, "Prediction for round {} already exists", t)
            }
            RegistryError::NotFound(t) => write!(f, "No prediction for round {}", t),
            RegistryError::CapacityExceeded => write!(f, "Registry capacity exceeded"),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<RegistryError> for SuitcastError {
    fn from(err: RegistryError) -> Self {
        SuitcastError::Registry(err)
    }
}

/// Failure of an outward publish or edit call.
/// Internal state stays authoritative; these are logged, never retried.
#[derive(Debug, Clone)]
pub struct PublishError {
    pub reason: String,
}

impl PublishError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Outward call failed: {}", self.reason)
    }
}

impl std::error::Error for PublishError {}

impl From<PublishError> for SuitcastError {
    fn from(err: PublishError) -> Self {
        SuitcastError::Publish(err)
    }
}

/// Type alias for Result with SuitcastError
pub type SuitcastResult<T> = Result<T, SuitcastError>;
