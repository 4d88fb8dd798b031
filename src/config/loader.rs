//! Settings loader with tier-based merging.

use super::merge::merge_tiers;
use super::types::Settings;
use crate::env::Environment;
use crate::error::{EntrypointError, Result};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings file used when nothing else is given and it exists.
pub const SYSTEM_SETTINGS_PATH: &str = "/etc/odoo-entrypoint.yaml";

/// Environment variable naming an explicit settings file.
pub const SETTINGS_PATH_VAR: &str = "ODOO_ENTRYPOINT_SETTINGS";

/// Settings tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Compiled-in defaults
    Defaults = 0,
    /// YAML settings file
    File = 1,
    /// `ODOO_*` environment variables
    Environment = 2,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::File => write!(f, "file"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Where to look for a settings file.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Given on the command line or via `ODOO_ENTRYPOINT_SETTINGS`; must exist.
    pub explicit: Option<PathBuf>,
    /// Optional system-wide file; skipped when absent.
    pub system: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover paths: CLI flag, then environment, then the system file.
    pub fn discover(cli_path: Option<&Path>, env: &Environment) -> Self {
        let explicit = cli_path.map(Path::to_path_buf).or_else(|| {
            env.get(SETTINGS_PATH_VAR)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
        });
        Self {
            explicit,
            system: Some(PathBuf::from(SYSTEM_SETTINGS_PATH)),
        }
    }

    /// Use exactly one settings file.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            explicit: Some(path.into()),
            system: None,
        }
    }

    /// The file to read, if any.
    pub fn effective_file(&self) -> Option<&Path> {
        if let Some(ref path) = self.explicit {
            return Some(path);
        }
        self.system.as_deref().filter(|p| p.is_file())
    }
}

/// Loads [`Settings`] from defaults, a settings file and the environment.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: Settings,
    settings_path: Option<PathBuf>,
    tiers: Vec<ConfigTier>,
}

impl ConfigLoader {
    pub fn load(paths: &ConfigPaths, env: &Environment) -> Result<Self> {
        let mut tiers = vec![ConfigTier::Defaults];
        let mut values = vec![serde_yaml::to_value(Settings::default()).map_err(EntrypointError::settings)?];

        let settings_path = paths.effective_file().map(Path::to_path_buf);
        if let Some(ref path) = settings_path {
            let content =
                std::fs::read_to_string(path).map_err(|e| EntrypointError::io(path, e))?;
            let value: Value = serde_yaml::from_str(&content).map_err(|e| {
                EntrypointError::settings(format!("{}: {}", path.display(), e))
            })?;
            debug!(path = %path.display(), "Loaded settings file");
            values.push(value);
            tiers.push(ConfigTier::File);
        }

        let mut settings: Settings =
            serde_yaml::from_value(merge_tiers(values)).map_err(EntrypointError::settings)?;

        if Self::apply_env_overrides(&mut settings, env)? {
            tiers.push(ConfigTier::Environment);
        }
        settings.validate()?;

        Ok(Self {
            settings,
            settings_path,
            tiers,
        })
    }

    /// Apply `ODOO_*` variables. Empty values count as unset.
    ///
    /// Returns whether any variable applied.
    fn apply_env_overrides(settings: &mut Settings, env: &Environment) -> Result<bool> {
        let var = |name: &str| env.get(name).filter(|v| !v.is_empty()).map(str::to_string);
        let mut applied = false;

        if let Some(user) = var("ODOO_USER") {
            settings.user = user;
            applied = true;
        }
        if let Some(path) = var("ODOO_CONFIG_FILE") {
            settings.paths.config_file = Some(PathBuf::from(path));
            applied = true;
        }
        if let Some(path) = var("ODOO_FILESTORE_PATH") {
            settings.paths.filestore = Some(PathBuf::from(path));
            applied = true;
        }
        if let Some(path) = var("ODOO_CONFIG_TEMPLATE") {
            settings.paths.template = PathBuf::from(path);
            applied = true;
        }
        if let Some(prefix) = var("ODOO_ENV_PREFIX") {
            settings.overlay.prefix = prefix;
            applied = true;
        }
        if let Some(url) = var("ODOO_REDIS_URL") {
            settings.remote.url = Some(url);
            applied = true;
        }
        if let Some(client) = var("ODOO_REDIS_CLIENT") {
            settings.remote.client = Some(client);
            applied = true;
        }
        if let Some(stage) = var("ODOO_STAGE") {
            settings.remote.stage = Some(stage);
            applied = true;
        }
        if let Some(timeout) = var("ODOO_REDIS_TIMEOUT_MS") {
            settings.remote.timeout_ms = timeout.parse().map_err(|_| {
                EntrypointError::settings(format!(
                    "ODOO_REDIS_TIMEOUT_MS must be a number of milliseconds, got {:?}",
                    timeout
                ))
            })?;
            applied = true;
        }

        Ok(applied)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// The settings file that was read, if any.
    pub fn settings_path(&self) -> Option<&Path> {
        self.settings_path.as_deref()
    }

    /// Tiers that contributed, lowest first.
    pub fn tiers(&self) -> &[ConfigTier] {
        &self.tiers
    }
}
