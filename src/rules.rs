//! Post-processing rules applied around the overlay.
//!
//! - The admin password rule keeps the stock `admin` master password from
//!   surviving into a running container.
//! - The sentry rule derives the sentry fields from `sentry_enabled` before the
//!   prefixed pass runs.

use crate::env::Environment;
use crate::sources::PendingVars;
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::{debug, info};

/// Key of the master password entry, as looked up in the legacy pass.
pub const ADMIN_PASSWD_KEY: &str = "ADMIN_PASSWD";

/// The stock master password shipped with the server template.
pub const DEFAULT_ADMIN_PASSWD: &str = "admin";

/// Length of generated master passwords.
pub const GENERATED_PASSWORD_LEN: usize = 12;

/// Flag that turns on sentry field synthesis.
pub const SENTRY_ENABLED_KEY: &str = "sentry_enabled";
pub const SENTRY_ODOO_DIR_KEY: &str = "sentry_odoo_dir";
pub const SENTRY_ENVIRONMENT_KEY: &str = "sentry_environment";

/// Fallback for `sentry_environment` when `INSTANCE_TYPE` is unset.
pub const DEFAULT_INSTANCE_TYPE: &str = "develop";

/// Generate a random password from `A-Z`, `a-z` and `0-9`.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Admin password safety rule.
///
/// Returns a freshly generated password when `key` is the master password
/// entry and either the override is empty or the stock default, or there is no
/// override and the file still holds an empty or stock value. Returns `None`
/// when the rule does not apply and the caller should use `resolved` as-is.
pub fn admin_password(key: &str, resolved: Option<&str>, current: &str) -> Option<String> {
    if !key.trim().eq_ignore_ascii_case(ADMIN_PASSWD_KEY) {
        return None;
    }

    let unsafe_value = |v: &str| v.is_empty() || v == DEFAULT_ADMIN_PASSWD;
    let must_generate = match resolved {
        Some(value) => unsafe_value(value.trim()),
        None => unsafe_value(current.trim()),
    };

    if must_generate {
        info!("Replacing default admin password with a generated one");
        Some(generate_password())
    } else {
        None
    }
}

/// Loose truthiness for flag values coming from the environment.
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && !["0", "false", "no", "off"]
            .iter()
            .any(|f| value.eq_ignore_ascii_case(f))
}

/// Synthesize the sentry fields when `sentry_enabled` is set.
///
/// Returns whether the fields were added.
pub fn apply_sentry(vars: &mut PendingVars, env: &Environment, odoo_dir: &str) -> bool {
    let enabled = vars.get(SENTRY_ENABLED_KEY).is_some_and(is_truthy);
    if !enabled {
        debug!("Sentry disabled, no sentry fields synthesized");
        return false;
    }

    let environment = env.get_or("INSTANCE_TYPE", DEFAULT_INSTANCE_TYPE).to_string();
    debug!(odoo_dir = %odoo_dir, environment = %environment, "Synthesizing sentry fields");
    vars.insert(SENTRY_ODOO_DIR_KEY, odoo_dir);
    vars.insert(SENTRY_ENVIRONMENT_KEY, environment);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_generated(value: &str) -> bool {
        value.len() == GENERATED_PASSWORD_LEN && value.chars().all(|c| c.is_ascii_alphanumeric())
    }

    #[test]
    fn test_generate_password_shape() {
        let a = generate_password();
        let b = generate_password();
        assert!(is_generated(&a));
        assert!(is_generated(&b));
        assert_ne!(a, b);
        assert_ne!(a, DEFAULT_ADMIN_PASSWD);
    }

    #[test]
    fn test_admin_rule_ignores_other_keys() {
        assert_eq!(admin_password("DB_PASSWORD", None, "admin"), None);
    }

    #[test]
    fn test_admin_rule_generates_for_default_override() {
        let value = admin_password("ADMIN_PASSWD", Some("admin"), "whatever").unwrap();
        assert!(is_generated(&value));
    }

    #[test]
    fn test_admin_rule_generates_for_stock_file_value() {
        assert!(admin_password("admin_passwd", None, " admin").is_some());
        assert!(admin_password("admin_passwd", None, "").is_some());
        assert!(admin_password("admin_passwd", Some("  "), "").is_some());
    }

    #[test]
    fn test_admin_rule_generates_for_empty_override() {
        let value = admin_password("ADMIN_PASSWD", Some(""), "Xk29adPq01Zz").unwrap();
        assert!(is_generated(&value));
    }

    #[test]
    fn test_admin_rule_keeps_explicit_override() {
        assert_eq!(admin_password("ADMIN_PASSWD", Some("s3cret"), "admin"), None);
    }

    #[test]
    fn test_admin_rule_keeps_already_rotated_value() {
        assert_eq!(admin_password("ADMIN_PASSWD", None, "Xk29adPq01Zz"), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(is_truthy("True"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("False"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(" "));
    }

    #[test]
    fn test_apply_sentry_when_enabled() {
        let env = Environment::from_pairs([
            ("ODOORC_SENTRY_ENABLED", "True"),
            ("INSTANCE_TYPE", "production"),
        ]);
        let mut vars = PendingVars::from_env(&env, "ODOORC_");
        assert!(apply_sentry(&mut vars, &env, "/home/odoo/instance/odoo"));
        assert_eq!(vars.get(SENTRY_ODOO_DIR_KEY), Some("/home/odoo/instance/odoo"));
        assert_eq!(vars.get(SENTRY_ENVIRONMENT_KEY), Some("production"));
    }

    #[test]
    fn test_apply_sentry_defaults_environment() {
        let env = Environment::from_pairs([("ODOORC_SENTRY_ENABLED", "1")]);
        let mut vars = PendingVars::from_env(&env, "ODOORC_");
        apply_sentry(&mut vars, &env, "/srv/odoo");
        assert_eq!(vars.get(SENTRY_ENVIRONMENT_KEY), Some(DEFAULT_INSTANCE_TYPE));
    }

    #[test]
    fn test_apply_sentry_skipped_when_disabled() {
        let env = Environment::from_pairs([("ODOORC_SENTRY_ENABLED", "false")]);
        let mut vars = PendingVars::from_env(&env, "ODOORC_");
        assert!(!apply_sentry(&mut vars, &env, "/srv/odoo"));
        assert_eq!(vars.get(SENTRY_ODOO_DIR_KEY), None);
        assert_eq!(vars.len(), 1);
    }
}
