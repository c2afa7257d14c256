//! Filesystem permission widening for the settings artifacts.
//!
//! The hook runtime reads the settings file from inside the host process,
//! under a different identity, and the key/value storage itself is private
//! to the owning process. The actual cross-process contract is therefore the
//! permission bits on the backing artifacts: after every mutation the root
//! directory, the settings subdirectory, and the settings file must all
//! carry read+execute for all principals.
//!
//! The platform storage layer may re-assert restrictive permissions
//! asynchronously after a write lands, so callers re-run this after fixed
//! delays (see the `resync` module) and on every lifecycle re-entry.
//! Widening is idempotent: the widened mode is a fixpoint of
//! `mode | WORLD_RX`, so redundant runs are harmless.

use std::path::{Path, PathBuf};

use crate::storage::StorageConfig;

/// Read+execute for owner, group, and other.
pub const WORLD_RX: u32 = 0o555;

#[derive(Debug, thiserror::Error)]
#[error("Cannot widen permissions on {path}: {source}")]
pub struct WidenError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidenOutcome {
    /// All three artifacts now carry world read+execute.
    Widened,
    /// The settings file has never been written; nothing to widen yet.
    NothingToWiden,
}

/// Re-asserts world read+execute on the three storage artifacts.
///
/// A missing settings file is a no-op, not an error: widening before the
/// first write has nothing to publish. A chmod failure names the artifact
/// that refused; callers degrade (the value stays saved, only downstream
/// visibility is affected).
pub fn widen_artifacts(config: &StorageConfig) -> Result<WidenOutcome, WidenError> {
    if !config.settings_file().exists() {
        return Ok(WidenOutcome::NothingToWiden);
    }
    for path in config.artifacts() {
        widen_one(&path)?;
    }
    Ok(WidenOutcome::Widened)
}

#[cfg(unix)]
fn widen_one(path: &Path) -> Result<(), WidenError> {
    use fs_err as fs;
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| WidenError {
        path: path.to_path_buf(),
        source,
    })?;
    let mut permissions = metadata.permissions();
    let mode = permissions.mode();
    if mode & WORLD_RX == WORLD_RX {
        return Ok(());
    }
    permissions.set_mode(mode | WORLD_RX);
    fs::set_permissions(path, permissions).map_err(|source| WidenError {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(not(unix))]
fn widen_one(_path: &Path) -> Result<(), WidenError> {
    // Permission bits are a unix contract; elsewhere there is nothing to do.
    Ok(())
}
