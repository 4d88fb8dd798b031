//! Container role shaping.
//!
//! A multi-container deployment runs the same image as HTTP workers, a cron
//! runner and a long-polling process. The role, read from `CONTAINER_TYPE`,
//! expands into a preset of prefixed overrides that then flow through the
//! regular prefixed overlay, whatever prefix it is configured with.

use crate::env::Environment;
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Environment variable holding the role.
pub const CONTAINER_TYPE_VAR: &str = "CONTAINER_TYPE";

/// Worker count used by long-polling containers when `WORKERS` is unset.
pub const DEFAULT_LONGPOLL_WORKERS: &str = "2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerRole {
    /// Single-container deployment; no presets.
    #[default]
    Normal,
    /// HTTP worker: serves requests, runs no cron jobs.
    Worker,
    /// Runs scheduled jobs only.
    Cron,
    /// Serves the long-polling endpoint.
    Longpoll,
}

impl FromStr for ContainerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "normal" => Ok(ContainerRole::Normal),
            "worker" => Ok(ContainerRole::Worker),
            "cron" => Ok(ContainerRole::Cron),
            "longpoll" => Ok(ContainerRole::Longpoll),
            other => Err(format!("unknown container type: {}", other)),
        }
    }
}

impl fmt::Display for ContainerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRole::Normal => write!(f, "normal"),
            ContainerRole::Worker => write!(f, "worker"),
            ContainerRole::Cron => write!(f, "cron"),
            ContainerRole::Longpoll => write!(f, "longpoll"),
        }
    }
}

impl ContainerRole {
    /// Read the role from the environment. Unknown roles fall back to
    /// [`ContainerRole::Normal`].
    pub fn from_env(env: &Environment) -> Self {
        let raw = env.get(CONTAINER_TYPE_VAR).unwrap_or("normal");
        match raw.parse() {
            Ok(role) => role,
            Err(e) => {
                warn!(error = %e, "Falling back to normal container");
                ContainerRole::Normal
            }
        }
    }

    /// Environment overrides implied by this role, keyed with `prefix`.
    pub fn overrides(&self, env: &Environment, prefix: &str) -> Vec<(String, String)> {
        let pairs: Vec<(&str, String)> = match self {
            ContainerRole::Normal => Vec::new(),
            ContainerRole::Worker => vec![
                ("HTTP_ENABLE", "True".to_string()),
                ("MAX_CRON_THREADS", "0".to_string()),
                ("WORKERS", "0".to_string()),
                ("XMLRPCS", "False".to_string()),
            ],
            ContainerRole::Cron => vec![
                ("HTTP_ENABLE", "False".to_string()),
                ("MAX_CRON_THREADS", "1".to_string()),
                ("WORKERS", "0".to_string()),
                ("XMLRPC", "False".to_string()),
                ("XMLRPCS", "False".to_string()),
            ],
            ContainerRole::Longpoll => vec![
                ("HTTP_ENABLE", "False".to_string()),
                ("MAX_CRON_THREADS", "0".to_string()),
                (
                    "WORKERS",
                    env.get_or("WORKERS", DEFAULT_LONGPOLL_WORKERS).to_string(),
                ),
                ("XMLRPCS", "False".to_string()),
            ],
        };
        pairs
            .into_iter()
            .map(|(name, v)| (format!("{}{}", prefix, name), v))
            .collect()
    }

    /// Return `env` with this role's overrides applied under `prefix`.
    pub fn shape(&self, env: &Environment, prefix: &str) -> Environment {
        let overrides = self.overrides(env, prefix);
        info!(role = %self, prefix = %prefix, overrides = overrides.len(), "Container type");
        env.with_overrides(overrides)
    }
}
