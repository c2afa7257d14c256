//! hookdash: CLI control surface for the hookd runtime hook framework.
//!
//! The core contracts (activation probing, cross-process settings) live in
//! hookdash-core; this binary only renders status text, reads and writes
//! toggle booleans, and triggers lifecycle resyncs.
//!
//! ## Subcommands
//!
//! - `status`: probe the activation provider once and render the result
//! - `get` / `set`: read or write one toggle
//! - `resync`: re-assert settings visibility on a lifecycle transition

mod logging;

use std::thread;
use std::time::Instant;

use clap::{Parser, Subcommand};
use hookdash_core::{
    ActivationProber, ActivationState, ConfigStore, LifecycleEvent, SettingKey, StorageConfig,
    WriteStatus,
};

#[derive(Parser)]
#[command(name = "hookdash")]
#[command(about = "Control surface for the hookd runtime hook framework")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the activation provider and render module status
    Status,

    /// Print a toggle value
    Get {
        /// One of: protect_mode, hide_icon, notify_info
        #[arg(value_name = "KEY")]
        key: SettingKey,
    },

    /// Set a toggle and propagate it to the hook runtime
    Set {
        /// One of: protect_mode, hide_icon, notify_info
        #[arg(value_name = "KEY")]
        key: SettingKey,

        /// true or false
        #[arg(value_name = "VALUE")]
        value: bool,
    },

    /// Re-assert settings visibility on a lifecycle transition
    Resync {
        /// One of: resume, restart, pause
        #[arg(long, default_value = "resume")]
        event: LifecycleEvent,
    },
}

fn main() {
    let config = StorageConfig::default();
    let _logging_guard = logging::init(&config);
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => {
            let prober = ActivationProber::new(&config);
            render_status(prober.probe());

            let store = ConfigStore::new(config);
            let snapshot = store.snapshot();
            println!();
            for key in SettingKey::ALL {
                println!("{:<13} {}", key, snapshot.entries.get(key));
            }
        }
        Commands::Get { key } => {
            let store = ConfigStore::new(config);
            println!("{}", store.read(key));
        }
        Commands::Set { key, value } => {
            let mut store = ConfigStore::new(config);
            match store.write(key, value) {
                Ok(WriteStatus::Saved) => println!("{} = {}", key, value),
                Ok(WriteStatus::SavedNotVisible(reason)) => {
                    println!("{} = {}", key, value);
                    eprintln!("warning: settings cannot be propagated - check permissions ({reason})");
                }
                Err(err) => {
                    tracing::error!(error = %err, "hookdash set failed");
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
            drain_rechecks(&mut store);
        }
        Commands::Resync { event } => {
            let store = ConfigStore::new(config);
            store.reassert_visibility(event);
        }
    }
}

fn render_status(state: ActivationState) {
    match state {
        ActivationState::Active => println!("Module active"),
        ActivationState::Inactive => {
            println!("Module inactive");
            println!("The hook framework has not taken effect in this environment.");
        }
        ActivationState::Unknown => println!("Module status unknown"),
    }
}

/// Pumps the store's deferred permission re-checks to completion.
///
/// The re-check queue is cooperative; in a long-lived UI the event loop
/// pumps it, in this one-shot CLI we sleep through the burst so the
/// re-assertions actually run before the process exits.
fn drain_rechecks(store: &mut ConfigStore) {
    while store.pending_rechecks() > 0 {
        if let Some(deadline) = store.next_recheck() {
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }
        }
        store.pump(Instant::now());
    }
}
