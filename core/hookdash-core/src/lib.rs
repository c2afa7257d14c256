//! # hookdash-core
//!
//! Core library for Hookdash, the companion control surface for the hookd
//! runtime hook framework. The hook code runs inside a separate host process
//! under a different identity; this crate owns the two contracts that make
//! the pairing work:
//!
//! - **Activation probing** ([`probe`]): best-effort discovery of whether the
//!   hook framework has taken effect, via the external activation provider.
//! - **Cross-process settings** ([`settings`], [`widen`], [`resync`]):
//!   file-backed toggles whose backing artifacts are kept world-readable so
//!   the hook code can read them without going through our process.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Clients can wrap with
//!   async if needed.
//! - **Not thread-safe**: Clients provide their own synchronization.
//! - **Graceful degradation**: A missing provider probes as `Inactive`;
//!   missing or malformed settings read as defaults, not errors.
//! - **No ambient state**: Paths live in an injected [`StorageConfig`];
//!   nothing reaches into global singletons.

// Public modules
pub mod error;
pub mod probe;
pub mod resync;
pub mod settings;
pub mod storage;
pub mod widen;

// Re-export commonly used items at crate root
pub use error::{DashError, Result};
pub use probe::{ActivationProber, ActivationState};
pub use resync::{ResyncQueue, RECHECK_DELAYS_MS};
pub use settings::{ConfigStore, LifecycleEvent, SettingKey, Settings, WriteStatus};
pub use storage::StorageConfig;
pub use widen::{widen_artifacts, WidenError, WidenOutcome};
