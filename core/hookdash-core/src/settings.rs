//! Cross-process configuration store.
//!
//! Persists the user-facing toggles in a JSON file under the Hookdash root
//! and keeps the backing artifacts world-readable so the hook code inside
//! the host process can read them directly (see the `widen` module).
//!
//! Reads never fail: a missing or malformed settings file degrades to
//! defaults. Writes persist synchronously; only the downstream
//! visibility-to-other-process step is allowed to fail, and that failure is
//! reported as a [`WriteStatus`] rather than an error so the caller can show
//! a warning without rolling anything back.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use chrono::Utc;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DashError, Result};
use crate::resync::ResyncQueue;
use crate::storage::StorageConfig;
use crate::widen::widen_artifacts;

pub const SETTINGS_VERSION: u32 = 1;

/// The closed set of user-facing toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    /// Keep the hook passive in the host process (no behavior changes).
    ProtectMode,
    /// Hide the control surface entry point from the launcher.
    HideIcon,
    /// Post a notice inside the host process when the hook engages.
    NotifyInfo,
}

impl SettingKey {
    pub const ALL: [SettingKey; 3] = [
        SettingKey::ProtectMode,
        SettingKey::HideIcon,
        SettingKey::NotifyInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ProtectMode => "protect_mode",
            SettingKey::HideIcon => "hide_icon",
            SettingKey::NotifyInfo => "notify_info",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "protect_mode" => Ok(SettingKey::ProtectMode),
            "hide_icon" => Ok(SettingKey::HideIcon),
            "notify_info" => Ok(SettingKey::NotifyInfo),
            other => Err(DashError::UnknownSettingKey(other.to_string())),
        }
    }
}

/// UI lifecycle re-entry points that trigger a visibility resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Resume,
    Restart,
    Pause,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEvent::Resume => "resume",
            LifecycleEvent::Restart => "restart",
            LifecycleEvent::Pause => "pause",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "resume" => Ok(LifecycleEvent::Resume),
            "restart" => Ok(LifecycleEvent::Restart),
            "pause" => Ok(LifecycleEvent::Pause),
            other => Err(DashError::UnknownLifecycleEvent(other.to_string())),
        }
    }
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

/// The persisted record.
///
/// Field names are the wire contract: the hook runtime parses this file
/// directly from inside the host process, so renames break external readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub entries: Entries,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            entries: Entries::default(),
            updated_at: None,
        }
    }
}

/// The toggle values themselves. Absent fields read as `false`; entries are
/// never deleted once written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entries {
    #[serde(default)]
    pub protect_mode: bool,
    #[serde(default)]
    pub hide_icon: bool,
    #[serde(default)]
    pub notify_info: bool,
}

impl Entries {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::ProtectMode => self.protect_mode,
            SettingKey::HideIcon => self.hide_icon,
            SettingKey::NotifyInfo => self.notify_info,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: bool) {
        match key {
            SettingKey::ProtectMode => self.protect_mode = value,
            SettingKey::HideIcon => self.hide_icon = value,
            SettingKey::NotifyInfo => self.notify_info = value,
        }
    }
}

/// Outcome of a toggle write.
///
/// The value is durably saved in both cases; `SavedNotVisible` means the
/// external reader may still observe stale permissions until a deferred
/// re-check or lifecycle resync succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStatus {
    Saved,
    SavedNotVisible(String),
}

/// File-backed store for the toggles, owning its paths and its re-check
/// queue. Inject one into the UI layer; nothing here touches ambient
/// globals.
#[derive(Debug)]
pub struct ConfigStore {
    config: StorageConfig,
    resync: ResyncQueue,
}

impl ConfigStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            resync: ResyncQueue::new(),
        }
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.config
    }

    /// Reads one toggle. Absent key, absent file, or malformed file all
    /// read as the default (`false`); this is a status read, not a command.
    pub fn read(&self, key: SettingKey) -> bool {
        self.load().entries.get(key)
    }

    /// A point-in-time copy of all toggles, for rendering.
    pub fn snapshot(&self) -> Settings {
        self.load()
    }

    /// Persists one toggle, then widens artifact permissions and schedules
    /// the deferred re-check burst.
    ///
    /// Persistence failure is the only `Err`. A widening failure yields
    /// `Ok(SavedNotVisible)`: the value is saved, only the cross-process
    /// visibility step is degraded, and the caller should surface a warning
    /// rather than abort.
    pub fn write(&mut self, key: SettingKey, value: bool) -> Result<WriteStatus> {
        let mut settings = self.load();
        settings.version = SETTINGS_VERSION;
        settings.entries.set(key, value);
        settings.updated_at = Some(Utc::now().to_rfc3339());
        self.persist(&settings)?;

        self.resync.schedule_burst(Instant::now());

        match widen_artifacts(&self.config) {
            Ok(outcome) => {
                debug!(key = %key, value, ?outcome, "Setting saved");
                Ok(WriteStatus::Saved)
            }
            Err(err) => {
                warn!(
                    key = %key,
                    error = %err,
                    "Setting saved, but not yet visible to the hook runtime"
                );
                Ok(WriteStatus::SavedNotVisible(err.to_string()))
            }
        }
    }

    /// Re-asserts artifact permissions on a UI lifecycle re-entry. Failures
    /// are logged, never raised: the next re-entry will try again.
    pub fn reassert_visibility(&self, event: LifecycleEvent) {
        match widen_artifacts(&self.config) {
            Ok(outcome) => {
                debug!(event = %event, ?outcome, "Reasserted settings visibility")
            }
            Err(err) => {
                warn!(event = %event, error = %err, "Settings cannot be propagated - check permissions")
            }
        }
    }

    /// Runs deferred re-checks that are due at `now`. Returns how many ran.
    pub fn pump(&mut self, now: Instant) -> usize {
        self.resync.run_due(now, &self.config)
    }

    /// Number of deferred re-checks still pending.
    pub fn pending_rechecks(&self) -> usize {
        self.resync.pending()
    }

    /// Earliest pending re-check deadline, for the pumping loop.
    pub fn next_recheck(&self) -> Option<Instant> {
        self.resync.next_deadline()
    }

    fn load(&self) -> Settings {
        let path = self.config.settings_file();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Settings::default()
            }
            Err(err) => {
                warn!(error = %err, "Settings file unreadable; using defaults");
                return Settings::default();
            }
        };

        serde_json::from_slice(&data).unwrap_or_else(|err| {
            warn!(error = %err, "Settings file malformed; using defaults");
            Settings::default()
        })
    }

    fn persist(&self, settings: &Settings) -> Result<()> {
        self.config
            .ensure_dirs()
            .map_err(|source| DashError::Io {
                context: "create settings directories".to_string(),
                source,
            })?;

        let path = self.config.settings_file();
        let payload = serde_json::to_vec_pretty(settings)
            .map_err(|source| DashError::SettingsSerializeFailed { source })?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, payload).map_err(|source| DashError::SettingsWriteFailed {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| DashError::SettingsWriteFailed {
            path: path.clone(),
            source,
        })?;
        Ok(())
    }
}
