//! Deferred permission re-assertion queue.
//!
//! Immediately after a settings write the platform storage layer may still
//! re-assert private permissions on the backing file, racing with the
//! widening attempt that followed the write. Each write therefore schedules
//! a short burst of delayed re-checks.
//!
//! The queue is cooperative and single-threaded: deadlines accumulate here
//! and the owning control surface pumps them from its own loop. No threads,
//! no locks. Each re-check is an idempotent overwrite of the same permission
//! state, so bursts from overlapping writes interleave freely and redundant
//! runs are harmless.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::storage::StorageConfig;
use crate::widen::widen_artifacts;

/// Re-check offsets after each write, in milliseconds.
pub const RECHECK_DELAYS_MS: [u64; 3] = [500, 1_000, 1_500];

/// Pending re-assertion deadlines, pumped by the owning event loop.
#[derive(Debug, Default)]
pub struct ResyncQueue {
    deadlines: Vec<Instant>,
}

impl ResyncQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the standard burst of re-checks relative to `now`.
    pub fn schedule_burst(&mut self, now: Instant) {
        for delay in RECHECK_DELAYS_MS {
            self.deadlines.push(now + Duration::from_millis(delay));
        }
    }

    /// Number of re-checks still waiting for their deadline.
    pub fn pending(&self) -> usize {
        self.deadlines.len()
    }

    /// The earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.iter().min().copied()
    }

    /// Runs every re-check whose deadline has passed, one re-assertion per
    /// due deadline. Returns how many ran. Failures are logged, never
    /// raised; a later deadline or lifecycle re-entry will try again.
    pub fn run_due(&mut self, now: Instant, config: &StorageConfig) -> usize {
        let mut due = 0;
        self.deadlines.retain(|deadline| {
            if *deadline <= now {
                due += 1;
                false
            } else {
                true
            }
        });

        for _ in 0..due {
            match widen_artifacts(config) {
                Ok(outcome) => debug!(?outcome, "Deferred permission re-check ran"),
                Err(err) => warn!(error = %err, "Deferred permission re-check failed"),
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageConfig;
    use std::path::PathBuf;

    fn config() -> StorageConfig {
        // Points at a root that never exists: run_due hits the
        // NothingToWiden path, which is all these tests need.
        StorageConfig::with_root(PathBuf::from("/nonexistent/hookdash-resync-test"))
    }

    #[test]
    fn burst_schedules_three_deadlines() {
        let mut queue = ResyncQueue::new();
        queue.schedule_burst(Instant::now());
        assert_eq!(queue.pending(), RECHECK_DELAYS_MS.len());
    }

    #[test]
    fn nothing_runs_before_deadlines() {
        let mut queue = ResyncQueue::new();
        let now = Instant::now();
        queue.schedule_burst(now);

        assert_eq!(queue.run_due(now, &config()), 0);
        assert_eq!(queue.pending(), 3);
    }

    #[test]
    fn due_deadlines_drain_in_order() {
        let mut queue = ResyncQueue::new();
        let now = Instant::now();
        queue.schedule_burst(now);

        let mid = now + Duration::from_millis(1_100);
        assert_eq!(queue.run_due(mid, &config()), 2);
        assert_eq!(queue.pending(), 1);

        let end = now + Duration::from_millis(2_000);
        assert_eq!(queue.run_due(end, &config()), 1);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn overlapping_bursts_coexist() {
        let mut queue = ResyncQueue::new();
        let now = Instant::now();
        queue.schedule_burst(now);
        queue.schedule_burst(now + Duration::from_millis(200));

        assert_eq!(queue.pending(), 6);
        let end = now + Duration::from_millis(2_000);
        assert_eq!(queue.run_due(end, &config()), 6);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn next_deadline_is_earliest() {
        let mut queue = ResyncQueue::new();
        let now = Instant::now();
        queue.schedule_burst(now);

        assert_eq!(
            queue.next_deadline(),
            Some(now + Duration::from_millis(RECHECK_DELAYS_MS[0]))
        );
    }
}
