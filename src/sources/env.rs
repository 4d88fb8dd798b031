//! Direct environment lookup.

use super::ValueSource;
use crate::env::Environment;

/// Resolves keys against an environment snapshot.
///
/// The key is upper-cased before lookup. Empty values count as unset.
#[derive(Debug, Clone)]
pub struct EnvSource<'a> {
    env: &'a Environment,
}

impl<'a> EnvSource<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Self { env }
    }
}

impl ValueSource for EnvSource<'_> {
    fn resolve(&mut self, key: &str) -> Option<String> {
        self.env
            .get_ignore_case(&key.trim().to_uppercase())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn name(&self) -> &'static str {
        "env"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_upper_cases_key() {
        let env = Environment::from_pairs([("DB_HOST", "postgres")]);
        let mut source = EnvSource::new(&env);
        assert_eq!(source.resolve("db_host"), Some("postgres".to_string()));
        assert_eq!(source.resolve(" Db_Host "), Some("postgres".to_string()));
    }

    #[test]
    fn test_resolve_empty_is_none() {
        let env = Environment::from_pairs([("DB_HOST", "")]);
        let mut source = EnvSource::new(&env);
        assert_eq!(source.resolve("DB_HOST"), None);
        assert_eq!(source.resolve("DB_PORT"), None);
    }
}
