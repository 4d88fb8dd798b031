//! Replace-on-write for the configuration file.
//!
//! The new content goes to a temporary file next to the target, which is then
//! renamed over it. Readers see either the old file or the new one.

use crate::error::{EntrypointError, Result};
use nix::unistd::{Gid, Uid, chown};
use std::fs;
use std::io::{BufWriter, Write};
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use tracing::debug;

/// Read the whole file, mapping a missing file to [`EntrypointError::ConfigFileMissing`].
pub fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => EntrypointError::ConfigFileMissing(path.to_path_buf()),
        _ => EntrypointError::io(path, e),
    })
}

/// Atomically replace `path` with `lines`, one `\n`-terminated line each.
///
/// Permissions of the original file are kept. Ownership is kept when the
/// process is allowed to change it.
pub fn write_atomic(path: &Path, lines: &[String]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let original = fs::metadata(path).map_err(|e| EntrypointError::io(path, e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".overlay-")
        .tempfile_in(dir)
        .map_err(|e| EntrypointError::io(dir, e))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        for line in lines {
            writer
                .write_all(line.as_bytes())
                .and_then(|_| writer.write_all(b"\n"))
                .map_err(|e| EntrypointError::io(path, e))?;
        }
        writer.flush().map_err(|e| EntrypointError::io(path, e))?;
    }

    fs::set_permissions(tmp.path(), original.permissions())
        .map_err(|e| EntrypointError::io(tmp.path(), e))?;
    if let Err(e) = chown(
        tmp.path(),
        Some(Uid::from_raw(original.uid())),
        Some(Gid::from_raw(original.gid())),
    ) {
        debug!(path = %path.display(), error = %e, "Could not preserve ownership");
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| EntrypointError::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|e| EntrypointError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
