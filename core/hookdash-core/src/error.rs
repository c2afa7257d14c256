//! Error types for hookdash-core operations.
//!
//! Best-effort boundaries (activation probing, deferred permission
//! re-checks) never surface these to callers; they degrade and log instead.
//! The variants here cover the operations that *are* allowed to fail the
//! caller, which is settings persistence and input parsing.

use std::path::PathBuf;

/// All errors that can occur in hookdash-core operations.
#[derive(Debug, thiserror::Error)]
pub enum DashError {
    #[error("Settings write failed: {path}: {source}")]
    SettingsWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings serialization failed: {source}")]
    SettingsSerializeFailed {
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown setting key: {0}")]
    UnknownSettingKey(String),

    #[error("Unknown lifecycle event: {0}")]
    UnknownLifecycleEvent(String),

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using DashError.
pub type Result<T> = std::result::Result<T, DashError>;
