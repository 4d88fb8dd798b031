//! Entry point settings.
//!
//! Every field has a default matching the stock container image, so an empty
//! settings file (or none at all) yields a working configuration.

use crate::error::{EntrypointError, Result};
use crate::sources::DEFAULT_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default system user owning the server files.
pub const DEFAULT_USER: &str = "odoo";

/// Template copied when the server configuration file does not exist.
pub const DEFAULT_TEMPLATE: &str = "/external_files/openerp_serverrc";

/// Default supervisor invocation.
pub const DEFAULT_SUPERVISOR: &str = "supervisord";
pub const DEFAULT_SUPERVISOR_CONF: &str = "/etc/supervisor/supervisord.conf";

/// Default connect/read timeout for the remote store.
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 2_000;

/// Placeholder in permission paths replaced by the user's home directory.
pub const HOME_PLACEHOLDER: &str = "{home}";
/// Placeholder in permission paths replaced by the filestore directory.
pub const FILESTORE_PLACEHOLDER: &str = "{filestore}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// System user that owns the server's files.
    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub paths: PathsSettings,

    #[serde(default)]
    pub overlay: OverlaySettings,

    #[serde(default)]
    pub remote: RemoteSettings,

    /// Ownership and permission fixes applied before the handoff.
    #[serde(default = "default_permissions")]
    pub permissions: Vec<PermissionRule>,

    #[serde(default)]
    pub handoff: HandoffSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user: default_user(),
            paths: PathsSettings::default(),
            overlay: OverlaySettings::default(),
            remote: RemoteSettings::default(),
            permissions: default_permissions(),
            handoff: HandoffSettings::default(),
        }
    }
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

/// File locations. Unset paths derive from the user's home directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsSettings {
    /// Server configuration file (default: `/home/<user>/.openerp_serverrc`).
    #[serde(default)]
    pub config_file: Option<PathBuf>,

    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Filestore directory (default: `/home/<user>/.local/share/Odoo/filestore`).
    #[serde(default)]
    pub filestore: Option<PathBuf>,

    /// Reported as `sentry_odoo_dir` (default: `/home/<user>/instance/odoo`).
    #[serde(default)]
    pub sentry_odoo_dir: Option<String>,
}

impl Default for PathsSettings {
    fn default() -> Self {
        Self {
            config_file: None,
            template: default_template(),
            filestore: None,
            sentry_odoo_dir: None,
        }
    }
}

fn default_template() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATE)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Prefix selecting the variables of the prefixed pass.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Run the deprecated un-prefixed pass before the prefixed one.
    #[serde(default = "default_true")]
    pub legacy_pass: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            legacy_pass: true,
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

/// Remote store used by the legacy pass instead of the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Store address, e.g. `redis://cache:6379/0`. Unset disables the provider.
    #[serde(default)]
    pub url: Option<String>,

    /// Tenant part of the hash name.
    #[serde(default)]
    pub client: Option<String>,

    /// Deployment stage; required when `url` is set.
    #[serde(default)]
    pub stage: Option<String>,

    #[serde(default = "default_remote_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            url: None,
            client: None,
            stage: None,
            timeout_ms: default_remote_timeout_ms(),
        }
    }
}

fn default_remote_timeout_ms() -> u64 {
    DEFAULT_REMOTE_TIMEOUT_MS
}

impl RemoteSettings {
    pub fn is_enabled(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}

/// One ownership/permission fix.
///
/// `path` may contain `{home}` and `{filestore}`. `mode` holds octal bits that
/// are added to the current mode, like `chmod ugo+...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    pub path: String,

    #[serde(default)]
    pub mode: Option<String>,

    /// Change owner and group to the configured user.
    #[serde(default)]
    pub chown: bool,

    #[serde(default)]
    pub recursive: bool,
}

impl PermissionRule {
    /// Parse `mode` as octal bits.
    pub fn mode_bits(&self) -> Result<Option<u32>> {
        self.mode
            .as_deref()
            .map(|m| {
                u32::from_str_radix(m.trim(), 8).map_err(|_| {
                    EntrypointError::settings(format!(
                        "invalid mode {:?} for {}: expected octal digits",
                        m, self.path
                    ))
                })
            })
            .transpose()
    }
}

fn default_permissions() -> Vec<PermissionRule> {
    let rule = |path: &str, mode: Option<&str>, chown: bool, recursive: bool| PermissionRule {
        path: path.to_string(),
        mode: mode.map(str::to_string),
        chown,
        recursive,
    };
    vec![
        rule("/tmp", Some("1777"), false, false),
        rule("/var/log/supervisor", Some("666"), false, false),
        rule("{home}/.local/share/Odoo", None, true, false),
        rule("{filestore}", None, true, false),
        rule("{home}/.ssh", None, true, true),
    ]
}

/// Process that takes over once the container is prepared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffSettings {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,
}

impl Default for HandoffSettings {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
        }
    }
}

fn default_program() -> String {
    DEFAULT_SUPERVISOR.to_string()
}

fn default_args() -> Vec<String> {
    vec!["-c".to_string(), DEFAULT_SUPERVISOR_CONF.to_string()]
}

impl Settings {
    pub fn home(&self) -> PathBuf {
        PathBuf::from("/home").join(&self.user)
    }

    pub fn config_file(&self) -> PathBuf {
        self.paths
            .config_file
            .clone()
            .unwrap_or_else(|| self.home().join(".openerp_serverrc"))
    }

    pub fn filestore(&self) -> PathBuf {
        self.paths
            .filestore
            .clone()
            .unwrap_or_else(|| self.home().join(".local/share/Odoo/filestore"))
    }

    pub fn sentry_odoo_dir(&self) -> String {
        self.paths
            .sentry_odoo_dir
            .clone()
            .unwrap_or_else(|| self.home().join("instance/odoo").display().to_string())
    }

    /// Expand `{home}` and `{filestore}` in a permission path.
    pub fn expand_path(&self, path: &str) -> PathBuf {
        PathBuf::from(
            path.replace(HOME_PLACEHOLDER, &self.home().display().to_string())
                .replace(FILESTORE_PLACEHOLDER, &self.filestore().display().to_string()),
        )
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(EntrypointError::settings("user must not be empty"));
        }
        if self.overlay.prefix.trim().is_empty() {
            return Err(EntrypointError::settings("overlay.prefix must not be empty"));
        }
        if self.remote.is_enabled()
            && self.remote.stage.as_deref().is_none_or(|s| s.trim().is_empty())
        {
            return Err(EntrypointError::settings(
                "remote.stage is required when remote.url is set",
            ));
        }
        if self.handoff.program.trim().is_empty() {
            return Err(EntrypointError::settings("handoff.program must not be empty"));
        }
        for rule in &self.permissions {
            rule.mode_bits()?;
        }
        Ok(())
    }
}
