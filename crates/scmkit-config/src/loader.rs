//! Config file discovery and layered loading.
//!
//! 1. Parse the embedded `defaults.toml`
//! 2. Merge `~/.scmkit/config.toml` (user)
//! 3. Merge the explicit `--config` file, which must exist
//! 4. Apply env var fallbacks for fields no file set
//! 5. Deserialize and validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{FieldSources, deep_merge_tracking};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Where to look for config files.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// File passed on the command line. Must exist.
    pub explicit: Option<PathBuf>,
    /// Directory holding the user `config.toml`, replacing `~/.scmkit`.
    pub home_override: Option<PathBuf>,
}

/// Load the configuration from the process environment.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is unreadable or malformed, the home
/// directory cannot be found, or the merged config fails validation.
pub fn load(options: &LoadOptions) -> ConfigResult<Config> {
    load_with_env(options, &collect_env_vars())
}

/// Like [`load`], with an explicit environment snapshot.
///
/// # Errors
///
/// See [`load`].
pub fn load_with_env<S: ::std::hash::BuildHasher>(
    options: &LoadOptions,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<Config> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut sources = FieldSources::new();

    let user_path = match &options.home_override {
        Some(dir) => dir.join("config.toml"),
        None => home_directory()?.join(".scmkit").join("config.toml"),
    };
    if let Some(overlay) = try_load_file(&user_path)? {
        deep_merge_tracking(&mut merged, &overlay, &mut sources);
        info!(path = %user_path.display(), "loaded user config");
    }

    if let Some(path) = &options.explicit {
        let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        })?;
        deep_merge_tracking(&mut merged, &overlay, &mut sources);
        info!(path = %path.display(), "loaded config");
    }

    let env_count = apply_env_fallbacks(&mut merged, &sources, env_vars)?;
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    let config: Config = merged
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: "<merged config>".to_owned(),
            source: e,
        })?;

    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if it doesn't exist.
///
/// A single read avoids racing a separate existence check.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match read_capped(path) {
        Ok(c) => c,
        Err(ConfigError::ReadError { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => return Err(e),
    };

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

fn read_capped(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    // Checked after reading so the size and the content agree.
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len(),
            ),
        });
    }

    Ok(content)
}

fn home_directory() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    fn options_in(home: &Path) -> LoadOptions {
        LoadOptions {
            explicit: None,
            home_override: Some(home.to_path_buf()),
        }
    }

    #[test]
    fn test_defaults_deserialize_to_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_without_files() {
        let home = tempfile::tempdir().unwrap();
        let config = load_with_env(&options_in(home.path()), &no_env()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_explicit_file_overrides_user_file() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(
            home.path().join("config.toml"),
            "[checkout]\nclone_path = \"user\"\ngit_binary = \"/opt/git\"\n",
        )
        .unwrap();
        let explicit = home.path().join("explicit.toml");
        std::fs::write(&explicit, "[checkout]\nclone_path = \"explicit\"\n").unwrap();

        let options = LoadOptions {
            explicit: Some(explicit),
            home_override: Some(home.path().to_path_buf()),
        };
        let config = load_with_env(&options, &no_env()).unwrap();

        assert_eq!(config.checkout.clone_path, "explicit");
        assert_eq!(config.checkout.git_binary, "/opt/git");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let home = tempfile::tempdir().unwrap();
        let options = LoadOptions {
            explicit: Some(home.path().join("nope.toml")),
            home_override: Some(home.path().to_path_buf()),
        };
        assert!(matches!(
            load_with_env(&options, &no_env()),
            Err(ConfigError::ReadError { .. })
        ));
    }

    #[test]
    fn test_env_fills_only_unset_fields() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join("config.toml"), "[logging]\nlevel = \"warn\"\n").unwrap();
        let env: HashMap<String, String> = [
            ("SCMKIT_LOG_LEVEL", "trace"),
            ("SCMKIT_HG_BINARY", "/opt/hg"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        let config = load_with_env(&options_in(home.path()), &env).unwrap();

        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.checkout.hg_binary, "/opt/hg");
    }

    #[test]
    fn test_invalid_merged_config_rejected() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(
            home.path().join("config.toml"),
            "[checkout]\nclone_path = \"../escape\"\n",
        )
        .unwrap();
        assert!(matches!(
            load_with_env(&options_in(home.path()), &no_env()),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(home.path().join("config.toml"), "[checkout\n").unwrap();
        assert!(matches!(
            load_with_env(&options_in(home.path()), &no_env()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_try_load_file_missing() {
        let result = try_load_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_oversized_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("huge.toml");
        let data = "x = \"".to_owned() + &"a".repeat(1_100_000) + "\"";
        std::fs::write(&file_path, data).unwrap();

        let result = try_load_file(&file_path);
        assert!(
            matches!(result, Err(ConfigError::ValidationError { .. })),
            "Expected ValidationError for oversized config, got: {result:?}"
        );
    }
}
