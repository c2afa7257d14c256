//! Storage configuration and path management for Hookdash.
//!
//! This module provides a centralized `StorageConfig` struct that manages all
//! file paths for Hookdash data, plus the conventional location of the
//! external provider's socket. This abstraction enables:
//!
//! - Easy path changes without hunting through code
//! - Testability via dependency injection (inject mock/temp paths)
//!
//! The three paths returned by [`StorageConfig::artifacts`] are the
//! cross-process contract: the hook runtime reads the settings file directly
//! at this conventional location, so the root directory, the settings
//! subdirectory, and the settings file must all stay traversable and
//! readable by other principals (see the `widen` module).

use std::path::{Path, PathBuf};

use fs_err as fs;

/// Central configuration for all Hookdash storage paths.
///
/// Production code uses `StorageConfig::default()` which points to
/// `~/.hookdash/`. Tests use `StorageConfig::with_root(temp_dir)` for
/// isolation.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for all Hookdash data (default: ~/.hookdash)
    root: PathBuf,
    /// Root directory for the hookd provider (default: ~/.hookd)
    /// Used for locating the provider socket; we never write here.
    provider_root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let home = dirs::home_dir().expect("Could not find home directory");
        Self {
            root: home.join(".hookdash"),
            provider_root: home.join(".hookd"),
        }
    }
}

impl StorageConfig {
    /// Creates a StorageConfig with a custom root directory.
    /// Used for testing with temp directories.
    pub fn with_root(root: PathBuf) -> Self {
        let provider_root = root
            .parent()
            .map(|p| p.join(".hookd"))
            .unwrap_or_else(|| PathBuf::from("/tmp/.hookd"));
        Self {
            root,
            provider_root,
        }
    }

    /// Creates a StorageConfig with both custom root and provider_root.
    /// Used for tests that also need to mock the provider side.
    pub fn with_roots(root: PathBuf, provider_root: PathBuf) -> Self {
        Self {
            root,
            provider_root,
        }
    }

    /// Returns the root directory for Hookdash data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the root directory of the hookd provider.
    pub fn provider_root(&self) -> &Path {
        &self.provider_root
    }

    /// Path to the settings/ subdirectory.
    pub fn settings_dir(&self) -> PathBuf {
        self.root.join("settings")
    }

    /// Path to the settings data file the hook runtime reads directly.
    pub fn settings_file(&self) -> PathBuf {
        self.settings_dir().join("settings.json")
    }

    /// Path to the logs/ directory used by the CLI file appender.
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Conventional path of the provider's query socket.
    pub fn provider_socket(&self) -> PathBuf {
        self.provider_root.join("provider.sock")
    }

    /// The storage artifacts whose permission bits form the cross-process
    /// contract, ordered outermost first.
    pub fn artifacts(&self) -> [PathBuf; 3] {
        [self.root.clone(), self.settings_dir(), self.settings_file()]
    }

    /// Ensures the root directory and settings subdirectory exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(self.settings_dir())?;
        Ok(())
    }
}
