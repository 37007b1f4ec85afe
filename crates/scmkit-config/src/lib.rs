#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Layered configuration for the `scmkit` binary.
//!
//! ```rust,no_run
//! use scmkit_config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("cloning into {}", config.checkout.clone_path);
//! ```
//!
//! # Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Explicit file** passed with `--config`
//! 2. **User** (`~/.scmkit/config.toml`)
//! 3. **Environment variables** (`SCMKIT_*`), fallback only
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! The crate has no dependency on `scmkit-core`; the binary maps these
//! values onto checkout types.

/// Environment variable fallbacks.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Merging of raw TOML trees.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::LoadOptions;
pub use types::*;

impl Config {
    /// Load with the full precedence chain.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed, the explicit
    /// file is missing, or the final configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(&LoadOptions {
            explicit: explicit.map(std::path::Path::to_path_buf),
            home_override: None,
        })
    }
}
