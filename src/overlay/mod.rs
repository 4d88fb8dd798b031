//! Configuration overlay engine.
//!
//! Merges override values into a flat `key = value` configuration file.
//! Two modes share one line loop:
//!
//! - [`rewrite`] replaces recognized lines whose key resolves in a
//!   [`ValueSource`] and leaves everything else alone.
//! - [`rewrite_and_append`] does the same against a [`PendingVars`] mapping,
//!   then appends every override no line consumed.
//!
//! The file is rewritten through a temporary file and a rename, so a failure
//! leaves either the old or the new content on disk, never a mix.

mod line;
mod writer;

pub use line::{Line, parse_line, render_entry};
pub use writer::{read_config, write_atomic};

use crate::error::Result;
use crate::rules::admin_password;
use crate::sources::{PendingVars, ValueSource};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// What an overlay pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverlayReport {
    /// Lines read from the original file.
    pub lines: usize,
    /// Lines rewritten as `key = value`.
    pub replaced: usize,
    /// Keys appended at the end of the file, in order.
    pub appended: Vec<String>,
    /// Master passwords generated by the safety rule.
    pub passwords_generated: usize,
}

/// Apply `source` to every line of `content`.
///
/// Returns the output lines (without terminators) and the pass counters.
pub fn overlay_lines(content: &str, source: &mut dyn ValueSource) -> (Vec<String>, OverlayReport) {
    let mut report = OverlayReport::default();
    let mut out = Vec::new();

    for raw in content.lines() {
        report.lines += 1;
        debug!(line = %raw.trim(), "Line read");

        let Line::Entry { key, value: current } = parse_line(raw) else {
            out.push(raw.to_string());
            continue;
        };

        let lookup = key.to_uppercase();
        let resolved = source.resolve(&lookup);
        debug!(key = %lookup, found = resolved.is_some(), source = source.name(), "Lookup");

        let value = match admin_password(&lookup, resolved.as_deref(), current) {
            Some(generated) => {
                report.passwords_generated += 1;
                Some(generated)
            }
            None => resolved,
        };

        match value {
            Some(value) => {
                out.push(render_entry(key, &value));
                report.replaced += 1;
            }
            None => out.push(raw.to_string()),
        }
    }

    (out, report)
}

/// Rewrite `path` in place with values from `source`.
pub fn rewrite(path: &Path, source: &mut dyn ValueSource) -> Result<OverlayReport> {
    let content = read_config(path)?;
    let (lines, report) = overlay_lines(&content, source);
    write_atomic(path, &lines)?;

    info!(
        path = %path.display(),
        source = source.name(),
        lines = report.lines,
        replaced = report.replaced,
        "Configuration rewritten"
    );
    Ok(report)
}

/// Rewrite `path` in place from `vars`, then append the unmatched overrides.
///
/// A key matched by an existing line is consumed, so it is never appended as
/// well. Appended entries follow the mapping's key order.
pub fn rewrite_and_append(path: &Path, mut vars: PendingVars) -> Result<OverlayReport> {
    let content = read_config(path)?;
    let (mut lines, mut report) = overlay_lines(&content, &mut vars);

    for (key, value) in vars.remaining() {
        let entry = match admin_password(key, Some(value), "") {
            Some(generated) => {
                report.passwords_generated += 1;
                render_entry(key, &generated)
            }
            None => render_entry(key, value),
        };
        debug!(key = %key, "Appending");
        lines.push(entry);
        report.appended.push(key.to_string());
    }
    write_atomic(path, &lines)?;

    info!(
        path = %path.display(),
        lines = report.lines,
        replaced = report.replaced,
        appended = report.appended.len(),
        "Configuration rewritten with prefixed overrides"
    );
    Ok(report)
}
