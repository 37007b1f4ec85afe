//! Telemetry error types.

use thiserror::Error;

/// Errors from logging setup.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The level or a directive could not be parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A global subscriber was already installed.
    #[error("Initialization error: {0}")]
    InitError(String),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
