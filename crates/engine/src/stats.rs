use std::sync::{Mutex, MutexGuard};

use brief_protocol::StatsSnapshot;

/// Run-level counters shared by every item of a batch.
///
/// One mutex guards all counters so a snapshot is always internally consistent.
#[derive(Debug, Default)]
pub struct RunStats {
    inner: Mutex<StatsSnapshot>,
}

impl RunStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the plain counters half-written.
    fn lock(&self) -> MutexGuard<'_, StatsSnapshot> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Start of a batch run.
    pub fn reset(&self) {
        *self.lock() = StatsSnapshot::default();
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        *self.lock()
    }

    pub(crate) fn record_payload(&self, has_anchor: bool, primary_chars: usize, citation_present: bool) {
        let mut stats = self.lock();
        stats.total_processed += 1;
        if has_anchor {
            stats.eligible += 1;
            stats.anchor_chars_sum += primary_chars as u64;
        } else {
            stats.ineligible += 1;
        }
        if citation_present {
            stats.proof_present += 1;
        } else {
            stats.proof_missing += 1;
        }
    }

    pub(crate) fn record_density_rejection(&self) {
        self.lock().rejected_density += 1;
    }

    pub(crate) fn record_relevance_rejection(&self) {
        self.lock().rejected_relevance += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn records_and_resets() {
        let stats = RunStats::new();
        stats.record_payload(true, 5, true);
        stats.record_payload(false, 0, false);
        stats.record_density_rejection();
        stats.record_relevance_rejection();
        let snap = stats.snapshot();
        assert_eq!(
            snap,
            StatsSnapshot {
                total_processed: 2,
                eligible: 1,
                ineligible: 1,
                proof_present: 1,
                proof_missing: 1,
                anchor_chars_sum: 5,
                rejected_density: 1,
                rejected_relevance: 1,
            }
        );
        assert_eq!(snap.mean_anchor_chars(), 5.0);
        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let stats = Arc::new(RunStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                thread::spawn(move || {
                    for _ in 0..100 {
                        stats.record_payload(true, 3, false);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker");
        }
        let snap = stats.snapshot();
        assert_eq!(snap.total_processed, 800);
        assert_eq!(snap.anchor_chars_sum, 2400);
        assert_eq!(snap.proof_missing, 800);
    }
}
