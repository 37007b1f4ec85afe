//! Configuration types for the `scmkit` binary.
//!
//! Every struct implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a bare `[section]` header produces a working config.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where and how checkouts run.
    pub checkout: CheckoutSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

/// Checkout defaults applied when the command line does not say otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutSection {
    /// Directory scoped temp dirs and tarballs are created in. `None` means
    /// the system temp dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    /// Directory name the clone lands in, relative to the scoped temp dir.
    pub clone_path: String,
    /// Drop VCS metadata from tarballs.
    pub ignore_checkout_files: bool,
    /// Git binary, looked up on `PATH` unless absolute.
    pub git_binary: String,
    /// Mercurial binary, looked up on `PATH` unless absolute.
    pub hg_binary: String,
    /// Per-command timeout in seconds. Zero disables it.
    pub command_timeout_secs: u64,
}

impl Default for CheckoutSection {
    fn default() -> Self {
        Self {
            base_dir: None,
            clone_path: "clone".to_owned(),
            ignore_checkout_files: false,
            git_binary: "git".to_owned(),
            hg_binary: "hg".to_owned(),
            command_timeout_secs: 0,
        }
    }
}

impl CheckoutSection {
    /// The per-command timeout, if enabled.
    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }
}

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate directives (e.g. `["scmkit_core=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_sections_use_defaults() {
        let config: Config = toml::from_str("[checkout]\n[logging]\n").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_section() {
        let config: Config = toml::from_str(
            r#"
            [checkout]
            base_dir = "/srv/checkouts"
            command_timeout_secs = 300
        "#,
        )
        .unwrap();
        assert_eq!(
            config.checkout.base_dir.as_deref(),
            Some(std::path::Path::new("/srv/checkouts"))
        );
        assert_eq!(config.checkout.clone_path, "clone");
        assert_eq!(
            config.checkout.command_timeout(),
            Some(Duration::from_secs(300))
        );
    }

    #[test]
    fn test_zero_timeout_is_disabled() {
        assert_eq!(CheckoutSection::default().command_timeout(), None);
    }

    #[test]
    fn test_serialize_skips_unset_base_dir() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("base_dir"));
        assert!(json.contains("\"clone_path\":\"clone\""));
    }
}
