//! Workspace ownership validation
//!
//! Containers in this stack run as the host uid/gid, so files created by a
//! different user (usually root, from a previous run without uid mapping)
//! break bind mounts in confusing ways. Before anything touches the
//! orchestrator, scan the working tree for foreign-owned files and fail
//! with remediation text, unless the check was explicitly suppressed, in
//! which case the finding degrades to a warning.

use crate::errors::{ConfigError, DevupError, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Validate workspace ownership under `path`.
///
/// `strict` is the `exit_if_other_owners_found` configuration bit: when
/// false, foreign-owned files only warn.
pub fn check(path: &Path, strict: bool) -> Result<()> {
    match scan_for_foreign_owner(path) {
        Some(offender) => {
            if strict {
                Err(DevupError::Config(ConfigError::ForeignOwnership {
                    path: path.display().to_string(),
                }))
            } else {
                warn!(
                    "Files owned by another user found (e.g. {}); continuing because ignore_ownership was given",
                    offender
                );
                Ok(())
            }
        }
        None => Ok(()),
    }
}

/// Find one file under `path` not owned by the current user, if any.
///
/// Spawns `find -not -user` with `-quit` so the scan short-circuits on the
/// first hit. A scan that cannot run at all is treated as clean; the check
/// is a guard rail, not a gate on exotic hosts.
#[cfg(unix)]
fn scan_for_foreign_owner(path: &Path) -> Option<String> {
    use std::process::Command;

    let uid = match crate::env::host_user_info() {
        Ok((uid, _)) => uid,
        Err(e) => {
            warn!("Skipping ownership check, could not determine uid: {}", e);
            return None;
        }
    };

    let output = Command::new("find")
        .arg(path)
        .arg("-not")
        .arg("-user")
        .arg(uid.to_string())
        .arg("-print")
        .arg("-quit")
        .output();

    match output {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let first = stdout.lines().next().map(|l| l.to_string());
            if let Some(ref offender) = first {
                debug!("Foreign-owned file: {}", offender);
            }
            first
        }
        Err(e) => {
            warn!("Skipping ownership check, could not run find: {}", e);
            None
        }
    }
}

#[cfg(not(unix))]
fn scan_for_foreign_owner(_path: &Path) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_own_files_pass() {
        // A directory we just created is owned by us.
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("file"), "x").unwrap();
        assert!(check(dir.path(), true).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_path_is_not_fatal() {
        // find prints an error and nothing on stdout; the check stays clean.
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("does-not-exist");
        assert!(check(&gone, true).is_ok());
    }

    #[test]
    fn test_non_strict_never_errors() {
        let dir = std::env::temp_dir();
        assert!(check(&dir, false).is_ok());
    }
}
