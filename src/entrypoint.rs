//! Container start-up sequence.
//!
//! seed config -> role shaping -> legacy pass -> sentry rule ->
//! prefixed pass -> filestore -> permissions. The handoff is left to the
//! caller so the sequence can run without replacing the process.

use crate::config::Settings;
use crate::env::Environment;
use crate::error::Result;
use crate::overlay::{self, OverlayReport};
use crate::provision::{self, Owner, PermissionReport};
use crate::roles::ContainerRole;
use crate::rules::apply_sentry;
use crate::sources::{EnvSource, PendingVars, RedisStore, RemoteSource, ValueSource, hash_key};
use clap::ValueEnum;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Leave ownership and permissions alone (e.g. when not running as root).
    pub skip_permissions: bool,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub seeded: bool,
    pub role: ContainerRole,
    pub legacy: Option<OverlayReport>,
    pub prefixed: OverlayReport,
    pub filestore_created: bool,
    pub permissions: Option<PermissionReport>,
}

/// Which overlay passes to run on a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OverlayMode {
    /// Un-prefixed lookup of every key (environment or remote store)
    Legacy,
    /// `ODOORC_` variables, appending unmatched keys
    Prefixed,
    /// Legacy pass, then prefixed pass
    #[default]
    Both,
}

/// Prepare the container: everything short of the handoff.
pub fn run(settings: &Settings, env: &Environment, options: &RunOptions) -> Result<RunReport> {
    info!("Entering entry point");
    let config_file = settings.config_file();
    let seeded = provision::seed_config(&config_file, &settings.paths.template)?;

    let role = ContainerRole::from_env(env);
    let env = role.shape(env, &settings.overlay.prefix);

    let (legacy, prefixed) = overlay_passes(settings, &env, &config_file, OverlayMode::Both)?;
    let prefixed = prefixed.unwrap_or_default();

    let filestore_created = provision::ensure_dir(&settings.filestore())?;

    let permissions = if options.skip_permissions {
        info!("Skipping permissions");
        None
    } else {
        Some(apply_permissions(settings)?)
    };

    info!("All changes made");
    Ok(RunReport {
        seeded,
        role,
        legacy,
        prefixed,
        filestore_created,
        permissions,
    })
}

/// Run the selected passes over `path`, with role shaping applied first.
pub fn overlay_file(
    settings: &Settings,
    env: &Environment,
    path: &Path,
    mode: OverlayMode,
) -> Result<(Option<OverlayReport>, Option<OverlayReport>)> {
    let env = ContainerRole::from_env(env).shape(env, &settings.overlay.prefix);
    overlay_passes(settings, &env, path, mode)
}

fn overlay_passes(
    settings: &Settings,
    shaped: &Environment,
    path: &Path,
    mode: OverlayMode,
) -> Result<(Option<OverlayReport>, Option<OverlayReport>)> {
    let run_legacy = match mode {
        OverlayMode::Legacy => true,
        OverlayMode::Prefixed => false,
        OverlayMode::Both => settings.overlay.legacy_pass,
    };

    let legacy = if run_legacy {
        warn!(
            prefix = %settings.overlay.prefix,
            "Deprecation warning: use prefixed variables to change the server configuration"
        );
        let mut source = legacy_source(settings, shaped);
        Some(overlay::rewrite(path, source.as_mut())?)
    } else {
        None
    };

    let prefixed = if mode == OverlayMode::Legacy {
        None
    } else {
        let vars = prefixed_vars(settings, shaped);
        Some(overlay::rewrite_and_append(path, vars)?)
    };

    Ok((legacy, prefixed))
}

/// The provider for the legacy pass: the remote store when configured,
/// the environment otherwise.
pub fn legacy_source<'a>(settings: &Settings, env: &'a Environment) -> Box<dyn ValueSource + 'a> {
    let remote = &settings.remote;
    match (remote.url.as_deref(), remote.stage.as_deref()) {
        (Some(url), Some(stage)) if remote.is_enabled() => {
            let hash = hash_key(remote.client.as_deref(), stage);
            info!(hash = %hash, "Using remote store");
            let store = RedisStore::new(url, Duration::from_millis(remote.timeout_ms));
            Box::new(RemoteSource::new(store, hash))
        }
        _ => {
            info!("Using env vars");
            Box::new(EnvSource::new(env))
        }
    }
}

/// Prefixed overrides after role shaping and the sentry rule.
pub fn resolve_vars(settings: &Settings, env: &Environment) -> PendingVars {
    let shaped = ContainerRole::from_env(env).shape(env, &settings.overlay.prefix);
    prefixed_vars(settings, &shaped)
}

fn prefixed_vars(settings: &Settings, shaped: &Environment) -> PendingVars {
    let mut vars = PendingVars::from_env(shaped, &settings.overlay.prefix);
    apply_sentry(&mut vars, shaped, &settings.sentry_odoo_dir());
    vars
}

/// Resolve the owner only when a rule needs it, then apply every rule.
pub fn apply_permissions(settings: &Settings) -> Result<PermissionReport> {
    info!("Setting permissions");
    let targets = provision::permission_targets(settings)?;
    let owner = if targets.iter().any(|t| t.chown) {
        Some(Owner::lookup(&settings.user)?)
    } else {
        None
    };
    Ok(provision::fix_permissions(&targets, owner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_source_defaults_to_env() {
        let env = Environment::default();
        let source = legacy_source(&Settings::default(), &env);
        assert_eq!(source.name(), "env");
    }

    #[test]
    fn test_legacy_source_remote_when_url_set() {
        let mut settings = Settings::default();
        settings.remote.url = Some("redis://127.0.0.1:1/".to_string());
        settings.remote.stage = Some("production".to_string());
        let env = Environment::default();
        let source = legacy_source(&settings, &env);
        assert_eq!(source.name(), "remote");
    }

    #[test]
    fn test_resolve_vars_applies_role_and_sentry() {
        let env = Environment::from_pairs([
            ("CONTAINER_TYPE", "cron"),
            ("ODOORC_WORKERS", "8"),
            ("ODOORC_SENTRY_ENABLED", "True"),
            ("INSTANCE_TYPE", "staging"),
        ]);
        let vars = resolve_vars(&Settings::default(), &env);
        assert_eq!(vars.get("workers"), Some("0"));
        assert_eq!(vars.get("max_cron_threads"), Some("1"));
        assert_eq!(vars.get("http_enable"), Some("False"));
        assert_eq!(vars.get("sentry_environment"), Some("staging"));
        assert_eq!(vars.get("sentry_odoo_dir"), Some("/home/odoo/instance/odoo"));
    }

    #[test]
    fn test_apply_permissions_without_chown_needs_no_user() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut settings = Settings::default();
        settings.user = "no-such-user-for-entrypoint-tests".to_string();
        settings.permissions = vec![crate::config::PermissionRule {
            path: temp.path().display().to_string(),
            mode: Some("700".to_string()),
            chown: false,
            recursive: false,
        }];
        let report = apply_permissions(&settings).unwrap();
        assert_eq!(report.applied, 1);
    }
}
