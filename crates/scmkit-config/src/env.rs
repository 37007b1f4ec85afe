//! Environment variable fallbacks.
//!
//! Env vars are a fallback, not an override: they only fill fields that no
//! config file set.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::FieldSources;

#[derive(Clone, Copy)]
enum FieldType {
    String,
    Seconds,
}

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    field_type: FieldType,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "SCMKIT_BASE_DIR",
        field_path: "checkout.base_dir",
        field_type: FieldType::String,
    },
    EnvMapping {
        var_name: "SCMKIT_GIT_BINARY",
        field_path: "checkout.git_binary",
        field_type: FieldType::String,
    },
    EnvMapping {
        var_name: "SCMKIT_HG_BINARY",
        field_path: "checkout.hg_binary",
        field_type: FieldType::String,
    },
    EnvMapping {
        var_name: "SCMKIT_COMMAND_TIMEOUT_SECS",
        field_path: "checkout.command_timeout_secs",
        field_type: FieldType::Seconds,
    },
    EnvMapping {
        var_name: "SCMKIT_LOG_LEVEL",
        field_path: "logging.level",
        field_type: FieldType::String,
    },
    EnvMapping {
        var_name: "SCMKIT_LOG_FORMAT",
        field_path: "logging.format",
        field_type: FieldType::String,
    },
];

/// Snapshot of the `SCMKIT_*` variables in the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("SCMKIT_"))
        .collect()
}

/// Apply env fallbacks to fields not in `sources`. Returns how many applied.
///
/// # Errors
///
/// Returns [`ConfigError::ValidationError`] naming the variable when a
/// numeric variable does not hold a non-negative integer.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<usize> {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources.contains(mapping.field_path) {
            continue;
        }
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        let value = coerce(mapping, raw)?;
        set_field(merged, mapping.field_path, value);
        count = count.saturating_add(1);
    }

    Ok(count)
}

fn coerce(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    match mapping.field_type {
        FieldType::String => Ok(toml::Value::String(raw.to_owned())),
        FieldType::Seconds => match raw.trim().parse::<i64>() {
            Ok(n) if n >= 0 => Ok(toml::Value::Integer(n)),
            _ => Err(ConfigError::ValidationError {
                field: mapping.var_name.to_owned(),
                message: format!("expected a non-negative number of seconds, got '{raw}'"),
            }),
        },
    }
}

/// Set a dotted-path field, creating intermediate tables.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut current = root;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        if segments.peek().is_none() {
            table.insert(segment.to_owned(), value);
            return;
        }
        current = table
            .entry(segment.to_owned())
            .or_insert(toml::Value::Table(toml::map::Map::new()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_fallback_fills_unset_fields() {
        let mut merged: toml::Value = toml::from_str("[checkout]\ngit_binary = \"git\"\n").unwrap();
        let vars = env(&[
            ("SCMKIT_BASE_DIR", "/srv/scm"),
            ("SCMKIT_COMMAND_TIMEOUT_SECS", "120"),
        ]);

        let count = apply_env_fallbacks(&mut merged, &FieldSources::new(), &vars).unwrap();

        assert_eq!(count, 2);
        let checkout = merged.get("checkout").unwrap();
        assert_eq!(checkout.get("base_dir").unwrap().as_str(), Some("/srv/scm"));
        assert_eq!(
            checkout.get("command_timeout_secs").unwrap().as_integer(),
            Some(120)
        );
    }

    #[test]
    fn test_file_values_win() {
        let mut merged: toml::Value =
            toml::from_str("[logging]\nlevel = \"warn\"\n").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("logging.level".to_owned());

        let count = apply_env_fallbacks(
            &mut merged,
            &sources,
            &env(&[("SCMKIT_LOG_LEVEL", "trace")]),
        )
        .unwrap();

        assert_eq!(count, 0);
        assert_eq!(
            merged.get("logging").unwrap().get("level").unwrap().as_str(),
            Some("warn")
        );
    }

    #[test]
    fn test_creates_missing_tables() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        apply_env_fallbacks(
            &mut merged,
            &FieldSources::new(),
            &env(&[("SCMKIT_LOG_FORMAT", "json")]),
        )
        .unwrap();
        assert_eq!(
            merged.get("logging").unwrap().get("format").unwrap().as_str(),
            Some("json")
        );
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        for bad in ["soon", "-5"] {
            let err = apply_env_fallbacks(
                &mut merged,
                &FieldSources::new(),
                &env(&[("SCMKIT_COMMAND_TIMEOUT_SECS", bad)]),
            )
            .unwrap_err();
            assert!(
                matches!(&err, ConfigError::ValidationError { field, .. } if field == "SCMKIT_COMMAND_TIMEOUT_SECS")
            );
        }
    }
}
