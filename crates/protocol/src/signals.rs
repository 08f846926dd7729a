use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Information-density breakdown for one text. Recomputed on every call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityBreakdown {
    pub entity_hits: u32,
    pub numeric_hits: u32,
    pub sentence_count: u32,
    pub boilerplate_hits: u32,
    pub fragment_penalty: u32,
    /// 0..=100
    pub score: u32,
}

/// Why the density gate rejected a text. Declaration order is the check order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateReason {
    #[default]
    None,
    Fragment,
    Boilerplate,
    LowScore,
    MissingEntities,
    MissingNumbers,
    FewSentences,
}

impl GateReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GateReason::None => "none",
            GateReason::Fragment => "fragment",
            GateReason::Boilerplate => "boilerplate",
            GateReason::LowScore => "low_score",
            GateReason::MissingEntities => "missing_entities",
            GateReason::MissingNumbers => "missing_numbers",
            GateReason::FewSentences => "few_sentences",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    pub passed: bool,
    pub reason: GateReason,
}

impl GateDecision {
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            reason: GateReason::None,
        }
    }

    #[must_use]
    pub const fn reject(reason: GateReason) -> Self {
        Self {
            passed: false,
            reason,
        }
    }
}

/// Business-relevance bucket. Declaration order is the default tiebreak order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Product,
    Tech,
    Business,
    Dev,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Product,
        Channel::Tech,
        Channel::Business,
        Channel::Dev,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Product => "product",
            Channel::Tech => "tech",
            Channel::Business => "business",
            Channel::Dev => "dev",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelScores {
    pub product: u32,
    pub tech: u32,
    pub business: u32,
    pub dev: u32,
    pub best_channel: Channel,
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl ChannelScores {
    #[must_use]
    pub fn score(&self, channel: Channel) -> u32 {
        match channel {
            Channel::Product => self.product,
            Channel::Tech => self.tech,
            Channel::Business => self.business,
            Channel::Dev => self.dev,
        }
    }

    #[must_use]
    pub fn max_score(&self) -> u32 {
        Channel::ALL
            .iter()
            .map(|channel| self.score(*channel))
            .max()
            .unwrap_or(0)
    }
}

/// Outcome of the relevance gate. `reasons[0]` is the deciding code
/// (`hard_neg`, `no_ai_core`, `whitelist`, `score`, `ai_core_weak`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    pub relevant: bool,
    pub reasons: Vec<String>,
}

impl RelevanceVerdict {
    #[must_use]
    pub fn code(&self) -> &str {
        self.reasons.first().map(String::as_str).unwrap_or("")
    }
}

/// Kind of verifiable fact token. Declaration order is the default priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnchorType {
    Product,
    Benchmark,
    Money,
    Params,
    Version,
    Metric,
}

impl AnchorType {
    pub const ALL: [AnchorType; 6] = [
        AnchorType::Product,
        AnchorType::Benchmark,
        AnchorType::Money,
        AnchorType::Params,
        AnchorType::Version,
        AnchorType::Metric,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnchorType::Product => "product",
            AnchorType::Benchmark => "benchmark",
            AnchorType::Money => "money",
            AnchorType::Params => "params",
            AnchorType::Version => "version",
            AnchorType::Metric => "metric",
        }
    }
}

/// A literal token copied verbatim from the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    pub text: String,
    pub kind: AnchorType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSet {
    /// Priority-ordered, at most the configured maximum (5 by default).
    pub anchors: Vec<Anchor>,
    pub anchor_types: BTreeMap<AnchorType, usize>,
    pub has_anchor: bool,
}

impl AnchorSet {
    #[must_use]
    pub fn from_anchors(anchors: Vec<Anchor>) -> Self {
        let mut anchor_types = BTreeMap::new();
        for anchor in &anchors {
            *anchor_types.entry(anchor.kind).or_insert(0) += 1;
        }
        let has_anchor = !anchors.is_empty();
        Self {
            anchors,
            anchor_types,
            has_anchor,
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.anchors.iter().map(|anchor| anchor.text.as_str())
    }

    #[must_use]
    pub fn contains_text(&self, text: &str) -> bool {
        self.texts().any(|anchor| anchor == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn anchor_set_counts_types() {
        let set = AnchorSet::from_anchors(vec![
            Anchor {
                text: "GPT-5".to_string(),
                kind: AnchorType::Product,
            },
            Anchor {
                text: "94.5%".to_string(),
                kind: AnchorType::Metric,
            },
            Anchor {
                text: "2x faster".to_string(),
                kind: AnchorType::Metric,
            },
        ]);
        assert!(set.has_anchor);
        assert_eq!(set.anchor_types.get(&AnchorType::Metric), Some(&2));
        assert_eq!(set.anchor_types.get(&AnchorType::Money), None);
        assert!(set.contains_text("GPT-5"));
        assert!(!AnchorSet::default().has_anchor);
    }

    #[test]
    fn gate_reason_serializes_snake_case() {
        let raw = serde_json::to_string(&GateDecision::reject(GateReason::LowScore)).unwrap();
        assert_eq!(raw, r#"{"passed":false,"reason":"low_score"}"#);
    }

    #[test]
    fn max_score_picks_highest_channel() {
        let scores = ChannelScores {
            product: 20,
            tech: 70,
            business: 0,
            dev: 45,
            best_channel: Channel::Tech,
            reasons: Vec::new(),
        };
        assert_eq!(scores.max_score(), 70);
        assert_eq!(scores.score(Channel::Dev), 45);
    }
}
