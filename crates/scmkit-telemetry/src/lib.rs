//! Logging setup for scmkit binaries.
//!
//! ```rust,no_run
//! use scmkit_telemetry::{LogConfig, LogFormat, LogTarget, setup_logging};
//!
//! # fn main() -> Result<(), scmkit_telemetry::TelemetryError> {
//! let config = LogConfig::new("debug")
//!     .with_format(LogFormat::Compact)
//!     .with_target(LogTarget::Stderr)
//!     .with_directive("scmkit_core=trace");
//! setup_logging(&config)?;
//! tracing::info!("ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_logging};
