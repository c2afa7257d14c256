//! End-to-end visibility scenarios for the config store.
//!
//! These cover the race the deferred re-checks exist for: the platform
//! resetting artifact permissions after a write has already widened them.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::{Duration, Instant};

use fs_err as fs;
use tempfile::TempDir;

use hookdash_core::{ConfigStore, SettingKey, StorageConfig, WriteStatus, RECHECK_DELAYS_MS};

const WORLD_RX: u32 = 0o555;

fn mode_of(path: &Path) -> u32 {
    fs::metadata(path).unwrap().permissions().mode() & 0o777
}

fn assert_widened(config: &StorageConfig) {
    for path in config.artifacts() {
        let mode = mode_of(&path);
        assert_eq!(
            mode & WORLD_RX,
            WORLD_RX,
            "expected world r+x on {}, got {:o}",
            path.display(),
            mode
        );
    }
}

/// Simulates the platform re-asserting private permissions after a write.
fn reset_permissions(config: &StorageConfig) {
    let private_file = std::fs::Permissions::from_mode(0o600);
    let private_dir = std::fs::Permissions::from_mode(0o700);
    fs::set_permissions(config.settings_file(), private_file).unwrap();
    fs::set_permissions(config.settings_dir(), private_dir.clone()).unwrap();
    fs::set_permissions(config.root(), private_dir).unwrap();
}

#[test]
fn write_widens_artifacts_immediately() {
    let temp = TempDir::new().unwrap();
    let mut store = ConfigStore::new(StorageConfig::with_root(temp.path().join("data")));

    let status = store.write(SettingKey::ProtectMode, true).unwrap();
    assert_eq!(status, WriteStatus::Saved);
    assert_widened(store.storage());
}

#[test]
fn recheck_burst_heals_platform_permission_reset() {
    let temp = TempDir::new().unwrap();
    let mut store = ConfigStore::new(StorageConfig::with_root(temp.path().join("data")));

    let before = Instant::now();
    store.write(SettingKey::HideIcon, true).unwrap();
    reset_permissions(store.storage());

    // Elapse the whole burst without sleeping.
    let after_burst = before + Duration::from_millis(RECHECK_DELAYS_MS[2] + 100);
    let ran = store.pump(after_burst);
    assert_eq!(ran, RECHECK_DELAYS_MS.len());
    assert_eq!(store.pending_rechecks(), 0);

    assert_widened(store.storage());
    assert!(store.read(SettingKey::HideIcon), "value survives the reset");
}

#[test]
fn interleaved_write_bursts_leave_everything_widened() {
    let temp = TempDir::new().unwrap();
    let mut store = ConfigStore::new(StorageConfig::with_root(temp.path().join("data")));

    let start = Instant::now();
    store.write(SettingKey::ProtectMode, true).unwrap();
    // Second write lands mid-burst of the first; both bursts stay pending.
    store.write(SettingKey::NotifyInfo, true).unwrap();
    assert_eq!(store.pending_rechecks(), 2 * RECHECK_DELAYS_MS.len());

    reset_permissions(store.storage());

    // Pump partway: only the earliest deadlines are due, yet permissions
    // are already healed because each re-check is a full re-assertion.
    let partway = start + Duration::from_millis(RECHECK_DELAYS_MS[0] + 100);
    assert!(store.pump(partway) >= 1);
    assert_widened(store.storage());

    reset_permissions(store.storage());

    let done = start + Duration::from_secs(5);
    store.pump(done);
    assert_eq!(store.pending_rechecks(), 0);
    assert_widened(store.storage());

    assert!(store.read(SettingKey::ProtectMode));
    assert!(store.read(SettingKey::NotifyInfo));
}

#[test]
fn lifecycle_reentry_heals_external_reset() {
    let temp = TempDir::new().unwrap();
    let mut store = ConfigStore::new(StorageConfig::with_root(temp.path().join("data")));

    store.write(SettingKey::ProtectMode, true).unwrap();
    reset_permissions(store.storage());

    store.reassert_visibility(hookdash_core::LifecycleEvent::Resume);
    assert_widened(store.storage());
}
