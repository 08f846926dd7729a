use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const ACTION_SLOTS: usize = 3;
pub const RISK_SLOTS: usize = 2;

/// The fixed five-field narrative every renderer consumes.
///
/// Built once per item and immutable afterwards. Every string field has passed the
/// fragment guard, `proof_line` always carries an ISO `YYYY-MM-DD` date, and `actions`
/// / `risks` are fixed-size so they can never be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalPayload {
    /// Two sentences.
    pub lead: String,
    /// Two sentences.
    pub impact: String,
    pub actions: [String; ACTION_SLOTS],
    pub risks: [String; RISK_SLOTS],
    pub proof_line: String,
    pub title_clean: String,
    pub bucket: String,
    /// Share of CJK characters in lead + impact.
    pub zh_ratio: f64,
    /// Share of source sentence units dropped as near duplicates.
    pub dedup_ratio: f64,
}

impl CanonicalPayload {
    /// Every string field, in declaration order.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        [
            self.lead.as_str(),
            self.impact.as_str(),
            self.proof_line.as_str(),
            self.title_clean.as_str(),
            self.bucket.as_str(),
        ]
        .into_iter()
        .chain(self.actions.iter().map(String::as_str))
        .chain(self.risks.iter().map(String::as_str))
    }
}
