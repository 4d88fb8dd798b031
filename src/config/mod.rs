//! Entry point settings.
//!
//! Settings come from three tiers, merged field by field:
//! 1. **Defaults** - compiled in, matching the stock image layout
//! 2. **File** - YAML settings file (`--settings`, `ODOO_ENTRYPOINT_SETTINGS`,
//!    or `/etc/odoo-entrypoint.yaml` when present)
//! 3. **Environment** - `ODOO_*` variables
//!
//! ## Environment Variables
//! - `ODOO_USER` - System user owning the server files (default: `odoo`)
//! - `ODOO_CONFIG_FILE` - Server configuration file
//! - `ODOO_FILESTORE_PATH` - Filestore directory
//! - `ODOO_CONFIG_TEMPLATE` - Template copied when the configuration file is missing
//! - `ODOO_ENV_PREFIX` - Prefix of the override variables (default: `ODOORC_`)
//! - `ODOO_REDIS_URL`, `ODOO_REDIS_CLIENT`, `ODOO_STAGE`, `ODOO_REDIS_TIMEOUT_MS` - Remote store

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier, SETTINGS_PATH_VAR, SYSTEM_SETTINGS_PATH};
pub use merge::{merge_into, merge_tiers};
pub use types::*;
