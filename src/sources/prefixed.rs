//! Prefix-filtered environment variables.
//!
//! `ODOORC_DB_HOST=postgres` becomes the pending override `db_host = postgres`.
//! The whole mapping is computed up front: the overlay consumes entries as it
//! matches lines, and whatever is left gets appended to the file.

use super::ValueSource;
use crate::env::Environment;
use serde::Serialize;
use std::collections::BTreeMap;

/// Default prefix for configuration variables.
pub const DEFAULT_PREFIX: &str = "ODOORC_";

/// Pending overrides keyed by lower-cased, prefix-stripped name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PendingVars {
    vars: BTreeMap<String, String>,
}

impl PendingVars {
    /// Collect every variable carrying `prefix` (matched case-insensitively).
    ///
    /// Keys are lower-cased with the prefix stripped; values are trimmed.
    /// A variable named exactly as the prefix is ignored.
    pub fn from_env(env: &Environment, prefix: &str) -> Self {
        let prefix = prefix.to_lowercase();
        let vars = env
            .iter()
            .filter_map(|(key, value)| {
                let key = key.to_lowercase();
                let name = key.strip_prefix(&prefix)?;
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(&normalize(key)).map(String::as_str)
    }

    /// Insert or replace an override.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.vars.insert(normalize(key), value.into());
    }

    /// Remove and return the override for `key`.
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.vars.remove(&normalize(key))
    }

    /// Overrides not consumed yet, in ascending key order.
    pub fn remaining(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Resolving a key consumes it, so a matched key is never appended.
impl ValueSource for PendingVars {
    fn resolve(&mut self, key: &str) -> Option<String> {
        self.take(key)
    }

    fn name(&self) -> &'static str {
        "prefixed-env"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_filters_and_strips_prefix() {
        let env = Environment::from_pairs([
            ("ODOORC_DB_HOST", " postgres "),
            ("odoorc_workers", "4"),
            ("DB_HOST", "ignored"),
            ("MY_ODOORC_X", "ignored"),
            ("ODOORC_", "ignored"),
        ]);
        let vars = PendingVars::from_env(&env, DEFAULT_PREFIX);
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get("db_host"), Some("postgres"));
        assert_eq!(vars.get("WORKERS"), Some("4"));
    }

    #[test]
    fn test_prefix_stripped_only_once() {
        let env = Environment::from_pairs([("ODOORC_ODOORC_NESTED", "1")]);
        let vars = PendingVars::from_env(&env, DEFAULT_PREFIX);
        assert_eq!(vars.get("odoorc_nested"), Some("1"));
    }

    #[test]
    fn test_resolve_consumes() {
        let env = Environment::from_pairs([("ODOORC_FOO", "1"), ("ODOORC_BAR", "2")]);
        let mut vars = PendingVars::from_env(&env, DEFAULT_PREFIX);
        assert_eq!(vars.resolve("FOO"), Some("1".to_string()));
        assert_eq!(vars.resolve("foo"), None);
        let left: Vec<_> = vars.remaining().collect();
        assert_eq!(left, vec![("bar", "2")]);
    }

    #[test]
    fn test_empty_value_is_kept() {
        let env = Environment::from_pairs([("ODOORC_DBFILTER", "")]);
        let mut vars = PendingVars::from_env(&env, DEFAULT_PREFIX);
        assert_eq!(vars.resolve("dbfilter"), Some(String::new()));
    }
}
