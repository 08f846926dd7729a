use serde::{Deserialize, Serialize};

/// Read-only copy of the run-level counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_processed: u64,
    /// Payloads built with at least one anchor.
    pub eligible: u64,
    pub ineligible: u64,
    /// Proof lines carrying a verbatim citation token.
    pub proof_present: u64,
    pub proof_missing: u64,
    pub anchor_chars_sum: u64,
    pub rejected_density: u64,
    pub rejected_relevance: u64,
}

impl StatsSnapshot {
    #[must_use]
    pub fn mean_anchor_chars(&self) -> f64 {
        if self.eligible == 0 {
            return 0.0;
        }
        self.anchor_chars_sum as f64 / self.eligible as f64
    }
}
