//! Merging of raw TOML trees.

use std::collections::BTreeSet;

/// Dotted paths of the leaf fields some config file set.
pub type FieldSources = BTreeSet<String>;

/// Recursively deep-merge `overlay` into `base`.
///
/// - Tables merge recursively per-field.
/// - Scalars and arrays from the overlay **replace** the base value.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

/// Deep-merge like [`deep_merge`] and record every leaf the overlay set.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    sources: &mut FieldSources,
) {
    deep_merge(base, overlay);
    record_leaves(overlay, "", sources);
}

fn record_leaves(val: &toml::Value, prefix: &str, sources: &mut FieldSources) {
    match val {
        toml::Value::Table(table) => {
            for (key, child) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                record_leaves(child, &path, sources);
            }
        },
        _ if !prefix.is_empty() => {
            sources.insert(prefix.to_owned());
        },
        _ => {},
    }
}
