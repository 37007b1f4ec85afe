//! Post-merge configuration validation.

use std::path::{Component, Path};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_checkout(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_checkout(config: &Config) -> ConfigResult<()> {
    let c = &config.checkout;

    let mut components = Path::new(&c.clone_path).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => {},
        _ => {
            return Err(invalid(
                "checkout.clone_path",
                format!(
                    "'{}' must be a single relative directory name",
                    c.clone_path
                ),
            ));
        },
    }

    if let Some(base) = &c.base_dir
        && base.as_os_str().is_empty()
    {
        return Err(invalid("checkout.base_dir", "must not be empty when set"));
    }

    if c.git_binary.trim().is_empty() {
        return Err(invalid("checkout.git_binary", "must not be empty"));
    }
    if c.hg_binary.trim().is_empty() {
        return Err(invalid("checkout.hg_binary", "must not be empty"));
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if l.level.trim().is_empty() {
        return Err(invalid("logging.level", "must not be empty"));
    }

    if !LOG_FORMATS.contains(&l.format.to_ascii_lowercase().as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported format '{}'; expected one of: {}",
                l.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_clone_path_must_be_one_component() {
        for bad in ["", "a/b", "../clone", "/abs", "."] {
            let mut config = Config::default();
            config.checkout.clone_path = bad.to_owned();
            assert_eq!(field_of(validate(&config)), "checkout.clone_path", "{bad:?}");
        }

        let mut config = Config::default();
        config.checkout.clone_path = "src".to_owned();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_binaries_rejected() {
        let mut config = Config::default();
        config.checkout.hg_binary = "  ".to_owned();
        assert_eq!(field_of(validate(&config)), "checkout.hg_binary");
    }

    #[test]
    fn test_log_format_checked() {
        let mut config = Config::default();
        config.logging.format = "JSON".to_owned();
        assert!(validate(&config).is_ok());

        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }

    #[test]
    fn test_empty_level_rejected() {
        let mut config = Config::default();
        config.logging.level = String::new();
        assert_eq!(field_of(validate(&config)), "logging.level");
    }
}
