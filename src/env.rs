//! Snapshot of the process environment.
//!
//! The entry point reads the environment once at start-up. Role shaping and
//! every override provider then work against this snapshot, so nothing in the
//! crate mutates the real process environment.

use std::collections::BTreeMap;

/// An owned, ordered copy of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Build an environment from explicit pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Exact lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Exact lookup first, then a case-insensitive scan.
    pub fn get_ignore_case(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| {
            self.vars
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str())
        })
    }

    /// Lookup with a fallback used when the variable is unset or empty.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.get(key) {
            Some(v) if !v.is_empty() => v,
            _ => default,
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Return a copy with `overrides` applied on top.
    pub fn with_overrides<K, V>(&self, overrides: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut env = self.clone();
        for (k, v) in overrides {
            env.set(k, v);
        }
        env
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_ignore_case_prefers_exact() {
        let env = Environment::from_pairs([("WORKERS", "4"), ("workers", "9")]);
        assert_eq!(env.get_ignore_case("WORKERS"), Some("4"));
        assert_eq!(env.get_ignore_case("Workers"), Some("4"));
    }

    #[test]
    fn test_get_or_treats_empty_as_unset() {
        let env = Environment::from_pairs([("ODOO_USER", "")]);
        assert_eq!(env.get_or("ODOO_USER", "odoo"), "odoo");
        assert_eq!(env.get_or("MISSING", "odoo"), "odoo");
    }

    #[test]
    fn test_with_overrides_leaves_original_untouched() {
        let base = Environment::from_pairs([("A", "1")]);
        let shaped = base.with_overrides([("A", "2"), ("B", "3")]);
        assert_eq!(base.get("A"), Some("1"));
        assert_eq!(shaped.get("A"), Some("2"));
        assert_eq!(shaped.get("B"), Some("3"));
        assert_eq!(shaped.len(), 2);
    }
}
