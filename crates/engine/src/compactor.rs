//! Sentence splitting, near-duplicate removal and role selection.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::matcher::KeywordMatcher;
use crate::similarity::Similarity;
use crate::text::{char_len, split_sentences};

/// Narrative roles a sentence may play. A sentence can carry several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Roles {
    pub event: bool,
    pub impact: bool,
    pub next_step: bool,
    pub risk: bool,
}

/// The sentences picked for the lead, the impact statement and the first action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub event: Option<String>,
    pub impact: Option<String>,
    pub next_step: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Compaction {
    /// Units long enough to consider, before deduplication.
    pub units_total: usize,
    /// Survivors in original order.
    pub kept: Vec<String>,
    pub removed: usize,
    pub selection: Selection,
}

impl Compaction {
    #[must_use]
    pub fn dedup_ratio(&self) -> f64 {
        if self.units_total == 0 {
            return 0.0;
        }
        self.removed as f64 / self.units_total as f64
    }
}

pub struct NarrativeCompactor {
    similarity: Arc<dyn Similarity>,
    threshold: f64,
    min_sentence_chars: usize,
    event: KeywordMatcher,
    impact: KeywordMatcher,
    next_step: KeywordMatcher,
    risk: KeywordMatcher,
}

impl fmt::Debug for NarrativeCompactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NarrativeCompactor")
            .field("similarity", &self.similarity.name())
            .field("threshold", &self.threshold)
            .field("min_sentence_chars", &self.min_sentence_chars)
            .finish_non_exhaustive()
    }
}

impl NarrativeCompactor {
    pub fn new(config: &EngineConfig, similarity: Arc<dyn Similarity>) -> Result<Self> {
        let compaction = &config.compaction;
        let roles = &compaction.roles;
        Ok(Self {
            similarity,
            threshold: compaction.dedup_threshold,
            min_sentence_chars: compaction.min_sentence_chars,
            event: KeywordMatcher::compile("compaction.roles.event", &roles.event)?,
            impact: KeywordMatcher::compile("compaction.roles.impact", &roles.impact)?,
            next_step: KeywordMatcher::compile("compaction.roles.next_step", &roles.next_step)?,
            risk: KeywordMatcher::compile("compaction.roles.risk", &roles.risk)?,
        })
    }

    #[must_use]
    pub fn similarity(&self) -> &dyn Similarity {
        self.similarity.as_ref()
    }

    /// True when `a` and `b` count as near duplicates.
    #[must_use]
    pub fn is_duplicate(&self, a: &str, b: &str) -> bool {
        self.similarity.ratio(a, b) >= self.threshold
    }

    /// Sentence units of every source, in order, without the ones too short to use.
    #[must_use]
    pub fn split_units(&self, sources: &[&str]) -> Vec<String> {
        sources
            .iter()
            .flat_map(|source| split_sentences(source))
            .filter(|unit| char_len(unit) >= self.min_sentence_chars)
            .collect()
    }

    /// Greedy near-duplicate removal: a unit survives when it is below the threshold
    /// against every unit kept so far, so the first occurrence always wins.
    #[must_use]
    pub fn dedup(&self, units: Vec<String>) -> Vec<String> {
        let mut kept: Vec<String> = Vec::with_capacity(units.len());
        for unit in units {
            if !kept.iter().any(|existing| self.is_duplicate(existing, &unit)) {
                kept.push(unit);
            }
        }
        kept
    }

    #[must_use]
    pub fn roles(&self, sentence: &str) -> Roles {
        Roles {
            event: self.event.is_match(sentence),
            impact: self.impact.is_match(sentence),
            next_step: self.next_step.is_match(sentence),
            risk: self.risk.is_match(sentence),
        }
    }

    /// One event and one impact sentence, filled from the rest of the pool in original
    /// order when no sentence carries the role, plus at most one next-step sentence.
    #[must_use]
    pub fn select(&self, kept: &[String]) -> Selection {
        let roles: Vec<Roles> = kept.iter().map(|s| self.roles(s)).collect();
        let mut used = vec![false; kept.len()];
        let take = |pred: &dyn Fn(&Roles) -> bool, used: &mut [bool]| -> Option<String> {
            let idx = (0..kept.len()).find(|idx| !used[*idx] && pred(&roles[*idx]))?;
            used[idx] = true;
            Some(kept[idx].clone())
        };

        let event = take(&|r| r.event, &mut used);
        let impact = take(&|r| r.impact, &mut used);
        let next_step = take(&|r| r.next_step, &mut used);
        let event = event.or_else(|| take(&|_| true, &mut used));
        let impact = impact.or_else(|| take(&|_| true, &mut used));

        Selection {
            event,
            impact,
            next_step,
        }
    }

    /// Kept sentences carrying `role`, in original order.
    pub fn with_role<'a>(
        &'a self,
        kept: &'a [String],
        role: impl Fn(&Roles) -> bool + 'a,
    ) -> impl Iterator<Item = &'a str> + 'a {
        kept.iter()
            .filter(move |sentence| role(&self.roles(sentence)))
            .map(String::as_str)
    }

    #[must_use]
    pub fn compact(&self, sources: &[&str]) -> Compaction {
        let units = self.split_units(sources);
        let units_total = units.len();
        let kept = self.dedup(units);
        let removed = units_total - kept.len();
        let selection = self.select(&kept);
        Compaction {
            units_total,
            kept,
            removed,
            selection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::{SequenceRatio, TokenJaccard};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn compactor() -> NarrativeCompactor {
        NarrativeCompactor::new(&EngineConfig::default(), Arc::new(SequenceRatio)).expect("compactor")
    }

    #[test]
    fn first_duplicate_wins() {
        let c = compactor();
        let kept = c.dedup(vec![
            "OpenAI released GPT-5 to all users today.".to_string(),
            "Pricing starts at $0.003 per 1K tokens.".to_string(),
            "OpenAI released GPT-5 to all users today!".to_string(),
        ]);
        assert_eq!(
            kept,
            vec![
                "OpenAI released GPT-5 to all users today.".to_string(),
                "Pricing starts at $0.003 per 1K tokens.".to_string(),
            ]
        );
    }

    #[test]
    fn short_units_are_dropped() {
        let c = compactor();
        let units = c.split_units(&["Short one. This sentence is long enough to keep."]);
        assert_eq!(units, vec!["This sentence is long enough to keep.".to_string()]);
    }

    #[test]
    fn selects_by_role_then_fills_in_order() {
        let c = compactor();
        let kept = vec![
            "The weather in the valley was mild all week.".to_string(),
            "The startup announced a new coding assistant.".to_string(),
            "It plans to open the beta to everyone soon.".to_string(),
        ];
        let selection = c.select(&kept);
        assert_eq!(selection.event.as_deref(), Some(kept[1].as_str()));
        assert_eq!(selection.next_step.as_deref(), Some(kept[2].as_str()));
        assert_eq!(selection.impact.as_deref(), Some(kept[0].as_str()));
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let c = compactor();
        let compaction = c.compact(&["", "   "]);
        assert_eq!(compaction.units_total, 0);
        assert_eq!(compaction.selection, Selection::default());
        assert_eq!(compaction.dedup_ratio(), 0.0);
    }

    #[test]
    fn dedup_ratio_counts_removed_units() {
        let c = compactor();
        let compaction = c.compact(&[
            "阿里云发布了通义千问的新版本。",
            "阿里云发布了通义千问的新版本！",
        ]);
        assert_eq!(compaction.units_total, 2);
        assert_eq!(compaction.removed, 1);
        assert!((compaction.dedup_ratio() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn similarity_is_swappable() {
        let c = NarrativeCompactor::new(&EngineConfig::default(), Arc::new(TokenJaccard)).unwrap();
        assert_eq!(c.similarity().name(), "token_jaccard");
        assert!(c.is_duplicate("alpha beta gamma delta", "delta gamma beta alpha"));
    }

    proptest! {
        #[test]
        fn proptest_kept_set_has_no_near_duplicates(
            sentences in proptest::collection::vec("[a-e]{2,6}( [a-e]{2,6}){2,5}", 0..8),
        ) {
            let c = compactor();
            let kept = c.dedup(sentences.clone());
            for (i, a) in kept.iter().enumerate() {
                for b in kept.iter().skip(i + 1) {
                    prop_assert!(!c.is_duplicate(a, b));
                }
            }
            // Every dropped sentence duplicates an earlier kept one.
            let mut cursor = 0;
            for sentence in &sentences {
                if kept.get(cursor) == Some(sentence) {
                    cursor += 1;
                } else {
                    prop_assert!(kept[..cursor].iter().any(|k| c.is_duplicate(k, sentence)));
                }
            }
        }
    }
}
