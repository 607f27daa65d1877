//! Error types for site compliance analysis
//!
//! Every fallible operation in the crate reports through [`ComplianceError`].
//! Analysis is pure and deterministic, so no error here is retryable: the
//! caller has to fix its input and call again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for compliance operations
pub type Result<T> = std::result::Result<T, ComplianceError>;

/// Error types for compliance analysis, configuration and I/O
#[derive(Error, Debug)]
pub enum ComplianceError {
    /// Non-finite measurement or a band whose thresholds are out of order
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    /// Series timestamps are not strictly ascending
    #[error("Unordered series: timestamp at index {index} does not follow its predecessor")]
    UnorderedSeries { index: usize },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Not found errors (sites, units)
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structured error code for machine-readable error handling
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Data errors (1400-1499)
    InvalidMeasurement,
    UnorderedSeries,
    InvalidInput,
    ParsingFailed,

    // Configuration errors (1200-1299)
    ConfigurationInvalid,

    // Lookup errors (1300-1399)
    NotFound,

    // Internal errors (1900-1999)
    InternalError,
}

impl ErrorCode {
    /// Get numeric error code
    pub fn as_number(&self) -> u32 {
        match self {
            ErrorCode::ConfigurationInvalid => 1202,
            ErrorCode::NotFound => 1301,
            ErrorCode::ParsingFailed => 1401,
            ErrorCode::InvalidInput => 1402,
            ErrorCode::InvalidMeasurement => 1405,
            ErrorCode::UnorderedSeries => 1406,
            ErrorCode::InternalError => 1901,
        }
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        match self.as_number() {
            1200..=1299 => "configuration",
            1300..=1399 => "lookup",
            1400..=1499 => "data",
            1900..=1999 => "internal",
            _ => "unknown",
        }
    }
}

impl ComplianceError {
    /// Create an invalid measurement error
    pub fn invalid_measurement<S: Into<String>>(msg: S) -> Self {
        Self::InvalidMeasurement(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Map to structured error code
    pub fn to_error_code(&self) -> ErrorCode {
        match self {
            ComplianceError::InvalidMeasurement(_) => ErrorCode::InvalidMeasurement,
            ComplianceError::UnorderedSeries { .. } => ErrorCode::UnorderedSeries,
            ComplianceError::Config(_) => ErrorCode::ConfigurationInvalid,
            ComplianceError::InvalidInput(_) => ErrorCode::InvalidInput,
            ComplianceError::NotFound(_) => ErrorCode::NotFound,
            ComplianceError::Json(_) | ComplianceError::Toml(_) => ErrorCode::ParsingFailed,
            ComplianceError::Io(_) => ErrorCode::InternalError,
        }
    }

    /// True when the caller broke an input contract (bad value, bad band, bad ordering)
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ComplianceError::InvalidMeasurement(_) | ComplianceError::UnorderedSeries { .. }
        )
    }
}
