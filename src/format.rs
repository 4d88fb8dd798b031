//! Output formatting for resolved overrides.

use crate::overlay::render_entry;
use crate::sources::PendingVars;
use anyhow::Result;
use clap::ValueEnum;

/// Output format for the `vars` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `key = value` lines, as they would be written to the file
    #[default]
    Conf,
    Json,
    Yaml,
}

/// Render pending overrides.
///
/// Values are printed as-is; callers decide whether secrets may be shown.
pub fn format_vars(vars: &PendingVars, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Conf => {
            let mut out = String::new();
            for (key, value) in vars.remaining() {
                out.push_str(&render_entry(key, value));
                out.push('\n');
            }
            out
        }
        OutputFormat::Json => serde_json::to_string_pretty(vars)?,
        OutputFormat::Yaml => serde_yaml::to_string(vars)?,
    })
}

/// Replace values of secret-looking keys with `***`.
pub fn redact(vars: &PendingVars) -> PendingVars {
    let mut redacted = vars.clone();
    for (key, _) in vars.remaining() {
        if is_secret(key) {
            redacted.insert(key, "***");
        }
    }
    redacted
}

fn is_secret(key: &str) -> bool {
    ["passw", "secret", "token", "dsn", "key"]
        .iter()
        .any(|marker| key.contains(marker))
}
