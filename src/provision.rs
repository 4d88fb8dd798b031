//! Filesystem preparation around the overlay.
//!
//! Seeds the server configuration file from its template, creates the
//! filestore and fixes ownership and permissions on the paths the server
//! writes to.

use crate::config::Settings;
use crate::error::{EntrypointError, Result};
use nix::unistd::{Gid, Group, Uid, User, chown};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Copy `template` to `config_path` unless the file already exists.
///
/// Returns whether a copy was made.
pub fn seed_config(config_path: &Path, template: &Path) -> Result<bool> {
    if config_path.is_file() {
        debug!(path = %config_path.display(), "Configuration file present");
        return Ok(false);
    }
    if !template.is_file() {
        return Err(EntrypointError::TemplateMissing(template.to_path_buf()));
    }
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| EntrypointError::io(parent, e))?;
    }
    fs::copy(template, config_path).map_err(|e| EntrypointError::io(config_path, e))?;
    info!(
        template = %template.display(),
        path = %config_path.display(),
        "Seeded configuration file from template"
    );
    Ok(true)
}

/// Create `path` and its parents if missing. Returns whether it was created.
pub fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path).map_err(|e| EntrypointError::io(path, e))?;
    info!(path = %path.display(), "Created directory");
    Ok(true)
}

/// Numeric owner resolved from a user name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub uid: Uid,
    pub gid: Gid,
}

impl Owner {
    /// Look up `name` in the system user database. The group is the group of
    /// the same name when it exists, the user's primary group otherwise.
    pub fn lookup(name: &str) -> Result<Self> {
        let user = User::from_name(name)
            .map_err(|e| EntrypointError::UnknownUser(format!("{}: {}", name, e)))?
            .ok_or_else(|| EntrypointError::UnknownUser(name.to_string()))?;
        let gid = match Group::from_name(name) {
            Ok(Some(group)) => group.gid,
            _ => user.gid,
        };
        Ok(Self { uid: user.uid, gid })
    }
}

/// A permission rule with its path expanded and mode parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionTarget {
    pub path: PathBuf,
    pub add_mode: Option<u32>,
    pub chown: bool,
    pub recursive: bool,
}

/// Expand the settings' permission rules into concrete targets.
pub fn permission_targets(settings: &Settings) -> Result<Vec<PermissionTarget>> {
    settings
        .permissions
        .iter()
        .map(|rule| {
            Ok(PermissionTarget {
                path: settings.expand_path(&rule.path),
                add_mode: rule.mode_bits()?,
                chown: rule.chown,
                recursive: rule.recursive,
            })
        })
        .collect()
}

/// Outcome of [`fix_permissions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionReport {
    pub applied: usize,
    pub skipped: Vec<PathBuf>,
}

/// Apply every target. Missing paths and per-path failures are logged and
/// skipped; they never abort start-up.
///
/// `owner` is only needed when some target asks for a chown.
pub fn fix_permissions(targets: &[PermissionTarget], owner: Option<Owner>) -> PermissionReport {
    let mut report = PermissionReport::default();

    for target in targets {
        if !target.path.exists() {
            warn!(path = %target.path.display(), "Path missing, skipping permissions");
            report.skipped.push(target.path.clone());
            continue;
        }
        match apply_target(target, owner) {
            Ok(()) => report.applied += 1,
            Err(e) => {
                warn!(path = %target.path.display(), error = %e, "Failed to fix permissions");
                report.skipped.push(target.path.clone());
            }
        }
    }

    info!(applied = report.applied, skipped = report.skipped.len(), "Permissions set");
    report
}

fn apply_target(target: &PermissionTarget, owner: Option<Owner>) -> Result<()> {
    let paths: Vec<PathBuf> = if target.recursive {
        WalkDir::new(&target.path)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .collect()
    } else {
        vec![target.path.clone()]
    };

    for path in &paths {
        if let Some(bits) = target.add_mode {
            add_mode(path, bits)?;
        }
        if target.chown {
            let owner = owner.ok_or_else(|| EntrypointError::UnknownUser("no owner resolved".to_string()))?;
            chown(path.as_path(), Some(owner.uid), Some(owner.gid))
                .map_err(|e| EntrypointError::io(path, std::io::Error::from(e)))?;
        }
    }
    debug!(path = %target.path.display(), entries = paths.len(), "Permissions applied");
    Ok(())
}

/// OR `bits` into the mode of `path`, like `chmod ugo+...`.
pub fn add_mode(path: &Path, bits: u32) -> Result<()> {
    let mut perms = fs::symlink_metadata(path)
        .map_err(|e| EntrypointError::io(path, e))?
        .permissions();
    let mode = perms.mode() | bits;
    perms.set_mode(mode);
    fs::set_permissions(path, perms).map_err(|e| EntrypointError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_seed_copies_template_once() {
        let temp = TempDir::new().unwrap();
        let template = temp.path().join("openerp_serverrc");
        let target = temp.path().join("home/odoo/.openerp_serverrc");
        fs::write(&template, "[options]\n").unwrap();

        assert!(seed_config(&target, &template).unwrap());
        assert_eq!(fs::read_to_string(&target).unwrap(), "[options]\n");

        fs::write(&target, "[options]\nworkers = 4\n").unwrap();
        assert!(!seed_config(&target, &template).unwrap());
        assert_eq!(fs::read_to_string(&target).unwrap(), "[options]\nworkers = 4\n");
    }

    #[test]
    fn test_seed_without_template_fails() {
        let temp = TempDir::new().unwrap();
        let result = seed_config(&temp.path().join("odoo.conf"), &temp.path().join("absent"));
        assert!(matches!(result, Err(EntrypointError::TemplateMissing(_))));
    }

    #[test]
    fn test_ensure_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("a/b/filestore");
        assert!(ensure_dir(&dir).unwrap());
        assert!(dir.is_dir());
        assert!(!ensure_dir(&dir).unwrap());
    }

    #[test]
    fn test_add_mode_ors_bits() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("log");
        fs::write(&file, "").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o600)).unwrap();

        add_mode(&file, 0o066).unwrap();
        assert_eq!(fs::metadata(&file).unwrap().permissions().mode() & 0o777, 0o666);
    }

    #[test]
    fn test_fix_permissions_recursive_and_missing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("ssh");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("id_rsa"), "").unwrap();
        fs::set_permissions(dir.join("id_rsa"), fs::Permissions::from_mode(0o600)).unwrap();

        let targets = vec![
            PermissionTarget {
                path: dir.clone(),
                add_mode: Some(0o040),
                chown: false,
                recursive: true,
            },
            PermissionTarget {
                path: temp.path().join("absent"),
                add_mode: Some(0o777),
                chown: false,
                recursive: false,
            },
        ];
        let report = fix_permissions(&targets, None);

        assert_eq!(report.applied, 1);
        assert_eq!(report.skipped, vec![temp.path().join("absent")]);
        let mode = fs::metadata(dir.join("id_rsa")).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_chown_without_owner_is_skipped() {
        let temp = TempDir::new().unwrap();
        let targets = vec![PermissionTarget {
            path: temp.path().to_path_buf(),
            add_mode: None,
            chown: true,
            recursive: false,
        }];
        let report = fix_permissions(&targets, None);
        assert_eq!(report.applied, 0);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_permission_targets_expand_placeholders() {
        let settings = Settings::default();
        let targets = permission_targets(&settings).unwrap();
        assert_eq!(targets[0].add_mode, Some(0o1777));
        assert_eq!(
            targets[3].path,
            PathBuf::from("/home/odoo/.local/share/Odoo/filestore")
        );
    }

    #[test]
    fn test_lookup_unknown_user() {
        assert!(matches!(
            Owner::lookup("no-such-user-for-entrypoint-tests"),
            Err(EntrypointError::UnknownUser(_))
        ));
    }
}
