//! Field-by-field merge of YAML settings tiers.
//!
//! Mappings merge recursively, everything else (scalars, sequences) is
//! replaced by the higher tier. A null in the higher tier means "not set" and
//! keeps the lower tier's value.

use serde_yaml::Value;

/// Merge `overlay` into `base` in place.
pub fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_into(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Merge tiers in order; later tiers win.
pub fn merge_tiers(tiers: impl IntoIterator<Item = Value>) -> Value {
    let mut merged = Value::Null;
    for tier in tiers {
        merge_into(&mut merged, tier);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_nested_fields_merge() {
        let merged = merge_tiers([
            yaml("user: odoo\nremote: {timeout_ms: 2000, url: null}"),
            yaml("remote: {url: 'redis://cache'}"),
        ]);
        assert_eq!(
            merged,
            yaml("user: odoo\nremote: {timeout_ms: 2000, url: 'redis://cache'}")
        );
    }

    #[test]
    fn test_sequences_replaced() {
        let merged = merge_tiers([
            yaml("handoff: {args: ['-c', '/etc/supervisor/supervisord.conf']}"),
            yaml("handoff: {args: ['-n']}"),
        ]);
        assert_eq!(merged, yaml("handoff: {args: ['-n']}"));
    }

    #[test]
    fn test_null_keeps_lower_tier() {
        let merged = merge_tiers([yaml("user: odoo"), yaml("user: null")]);
        assert_eq!(merged, yaml("user: odoo"));
    }

    #[test]
    fn test_empty_file_tier_is_noop() {
        let merged = merge_tiers([yaml("user: odoo"), Value::Null]);
        assert_eq!(merged, yaml("user: odoo"));
    }
}
