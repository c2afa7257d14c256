//! File-backed tracing setup for the CLI.
//!
//! Logs land under the Hookdash root rather than stderr so hook users can
//! attach them to reports without shell redirection. Returns the appender's
//! worker guard; dropping it flushes buffered log lines, so `main` holds it
//! for the lifetime of the process.

use fs_err as fs;
use hookdash_core::StorageConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "HOOKDASH_LOG";

pub fn init(config: &StorageConfig) -> Option<WorkerGuard> {
    let log_dir = config.logs_dir();
    fs::create_dir_all(&log_dir).ok()?;

    let appender = tracing_appender::rolling::daily(log_dir, "hookdash.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Some(guard)
}
