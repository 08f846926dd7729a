use std::collections::HashSet;
use std::path::Path;

use brief_protocol::{AnchorType, Channel, ContentKind};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::templates::FIXED_PHRASES;
use crate::vocab;

/// Shortest action or risk bullet a payload may carry.
pub const MIN_BULLET_CHARS: usize = 12;

/// A keyword vocabulary split by script.
///
/// Latin entries match case-insensitively on ASCII word boundaries; CJK entries match
/// anywhere since those scripts do not separate words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordTable {
    pub latin: Vec<String>,
    pub cjk: Vec<String>,
}

impl KeywordTable {
    #[must_use]
    pub fn from_static(latin: &[&str], cjk: &[&str]) -> Self {
        Self {
            latin: to_strings(latin),
            cjk: to_strings(cjk),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.latin.is_empty() && self.cjk.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.latin.iter().chain(self.cjk.iter()).map(String::as_str)
    }
}

/// Acceptance thresholds for one [`ContentKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateThresholds {
    pub min_score: u32,
    pub min_entities: u32,
    pub min_numeric: u32,
    pub min_sentences: u32,
    /// Highest tolerated fragment penalty.
    pub max_fragment_penalty: u32,
    /// Highest tolerated boilerplate hit count.
    pub max_boilerplate_hits: u32,
}

impl GateThresholds {
    /// True when every dimension of `self` is at least as strict as `other`.
    #[must_use]
    pub fn at_least_as_strict_as(&self, other: &GateThresholds) -> bool {
        self.min_score >= other.min_score
            && self.min_entities >= other.min_entities
            && self.min_numeric >= other.min_numeric
            && self.min_sentences >= other.min_sentences
            && self.max_fragment_penalty <= other.max_fragment_penalty
            && self.max_boilerplate_hits <= other.max_boilerplate_hits
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateProfiles {
    pub event: GateThresholds,
    pub signal: GateThresholds,
    pub corp: GateThresholds,
}

impl Default for GateProfiles {
    fn default() -> Self {
        Self {
            event: GateThresholds {
                min_score: 55,
                min_entities: 2,
                min_numeric: 1,
                min_sentences: 3,
                max_fragment_penalty: 0,
                max_boilerplate_hits: 0,
            },
            corp: GateThresholds {
                min_score: 45,
                min_entities: 1,
                min_numeric: 1,
                min_sentences: 2,
                max_fragment_penalty: 1,
                max_boilerplate_hits: 0,
            },
            signal: GateThresholds {
                min_score: 30,
                min_entities: 1,
                min_numeric: 0,
                min_sentences: 1,
                max_fragment_penalty: 1,
                max_boilerplate_hits: 1,
            },
        }
    }
}

impl GateProfiles {
    #[must_use]
    pub fn for_kind(&self, kind: ContentKind) -> &GateThresholds {
        match kind {
            ContentKind::Event => &self.event,
            ContentKind::Signal => &self.signal,
            ContentKind::Corp => &self.corp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensityConfig {
    /// Sentence units shorter than this (in chars) count as short fragments.
    pub short_unit_chars: usize,
    /// Share of short units above which the text is penalised.
    pub short_unit_share: f64,
    pub entity_stopwords: Vec<String>,
    pub domain_keywords: KeywordTable,
    pub boilerplate: KeywordTable,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            short_unit_chars: 32,
            short_unit_share: 0.6,
            entity_stopwords: to_strings(vocab::ENTITY_STOPWORDS),
            domain_keywords: KeywordTable::from_static(
                vocab::DOMAIN_KEYWORDS_LATIN,
                vocab::DOMAIN_KEYWORDS_CJK,
            ),
            boilerplate: KeywordTable::from_static(
                vocab::BOILERPLATE_LATIN,
                vocab::BOILERPLATE_CJK,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentConfig {
    /// Below this many chars a string needs a digit, URL or entity to stand alone.
    pub short_chars: usize,
    /// Below this many chars an unterminated string ending on a connector is a fragment.
    pub dangling_max_chars: usize,
    pub banned_templates: Vec<String>,
    /// Trailing connectors / particles, one table per script.
    pub dangling: KeywordTable,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            short_chars: 12,
            dangling_max_chars: 40,
            banned_templates: to_strings(vocab::BANNED_TEMPLATES),
            dangling: KeywordTable::from_static(vocab::DANGLING_LATIN, vocab::DANGLING_CJK),
        }
    }
}

/// Extra raw hits granted to a channel when the item URL lives on `domain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlBoost {
    pub domain: String,
    pub channel: Channel,
    pub hits: u32,
}

impl UrlBoost {
    fn new(domain: &str, channel: Channel, hits: u32) -> Self {
        Self {
            domain: domain.to_string(),
            channel,
            hits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub hit_weight: u32,
    pub numeric_boost: u32,
    /// Tiebreak order for equal raw hit counts.
    pub tiebreak: Vec<Channel>,
    pub url_boosts: Vec<UrlBoost>,
    pub product: KeywordTable,
    pub tech: KeywordTable,
    pub business: KeywordTable,
    pub dev: KeywordTable,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            hit_weight: 25,
            numeric_boost: 20,
            tiebreak: Channel::ALL.to_vec(),
            url_boosts: vec![
                UrlBoost::new("arxiv.org", Channel::Tech, 2),
                UrlBoost::new("openreview.net", Channel::Tech, 2),
                UrlBoost::new("paperswithcode.com", Channel::Tech, 2),
                UrlBoost::new("huggingface.co", Channel::Tech, 1),
                UrlBoost::new("github.com", Channel::Dev, 2),
                UrlBoost::new("gitlab.com", Channel::Dev, 2),
                UrlBoost::new("pypi.org", Channel::Dev, 1),
                UrlBoost::new("npmjs.com", Channel::Dev, 1),
                UrlBoost::new("producthunt.com", Channel::Product, 2),
                UrlBoost::new("apps.apple.com", Channel::Product, 1),
                UrlBoost::new("crunchbase.com", Channel::Business, 2),
            ],
            product: KeywordTable::from_static(vocab::PRODUCT_LATIN, vocab::PRODUCT_CJK),
            tech: KeywordTable::from_static(vocab::TECH_LATIN, vocab::TECH_CJK),
            business: KeywordTable::from_static(vocab::BUSINESS_LATIN, vocab::BUSINESS_CJK),
            dev: KeywordTable::from_static(vocab::DEV_LATIN, vocab::DEV_CJK),
        }
    }
}

impl ChannelConfig {
    #[must_use]
    pub fn table(&self, channel: Channel) -> &KeywordTable {
        match channel {
            Channel::Product => &self.product,
            Channel::Tech => &self.tech,
            Channel::Business => &self.business,
            Channel::Dev => &self.dev,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    pub min_channel_score: u32,
    pub hard_negative: KeywordTable,
    pub core_domain: KeywordTable,
    pub entity_whitelist: KeywordTable,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            min_channel_score: 35,
            hard_negative: KeywordTable::from_static(
                vocab::HARD_NEGATIVE_LATIN,
                vocab::HARD_NEGATIVE_CJK,
            ),
            core_domain: KeywordTable::from_static(
                vocab::CORE_DOMAIN_LATIN,
                vocab::CORE_DOMAIN_CJK,
            ),
            entity_whitelist: KeywordTable::from_static(
                vocab::ENTITY_WHITELIST_LATIN,
                vocab::ENTITY_WHITELIST_CJK,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    pub max_anchors: usize,
    pub priority: Vec<AnchorType>,
    pub model_roster: Vec<String>,
    pub model_roster_cjk: Vec<String>,
    pub model_variants: Vec<String>,
    pub benchmarks: Vec<String>,
    pub name_stopwords: Vec<String>,
    pub counted_nouns: Vec<String>,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            max_anchors: 5,
            priority: AnchorType::ALL.to_vec(),
            model_roster: to_strings(vocab::MODEL_ROSTER),
            model_roster_cjk: to_strings(vocab::MODEL_ROSTER_CJK),
            model_variants: to_strings(vocab::MODEL_VARIANTS),
            benchmarks: to_strings(vocab::BENCHMARKS),
            name_stopwords: to_strings(vocab::NAME_STOPWORDS),
            counted_nouns: to_strings(vocab::COUNTED_NOUNS),
        }
    }
}

impl AnchorConfig {
    /// Position of `kind` in the priority list; lower ranks first.
    #[must_use]
    pub fn rank(&self, kind: AnchorType) -> usize {
        self.priority
            .iter()
            .position(|candidate| *candidate == kind)
            .unwrap_or(self.priority.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleTables {
    pub event: KeywordTable,
    pub impact: KeywordTable,
    pub next_step: KeywordTable,
    pub risk: KeywordTable,
}

impl Default for RoleTables {
    fn default() -> Self {
        Self {
            event: KeywordTable::from_static(vocab::ROLE_EVENT_LATIN, vocab::ROLE_EVENT_CJK),
            impact: KeywordTable::from_static(vocab::ROLE_IMPACT_LATIN, vocab::ROLE_IMPACT_CJK),
            next_step: KeywordTable::from_static(vocab::ROLE_NEXT_LATIN, vocab::ROLE_NEXT_CJK),
            risk: KeywordTable::from_static(vocab::ROLE_RISK_LATIN, vocab::ROLE_RISK_CJK),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactionConfig {
    /// Sentences at or above this similarity are near duplicates.
    pub dedup_threshold: f64,
    pub min_sentence_chars: usize,
    /// At least [`MIN_BULLET_CHARS`].
    pub min_bullet_chars: usize,
    /// Minimum CJK share of the selected lead/impact text before a skeleton rebuild.
    pub lead_script_floor: f64,
    /// Minimum CJK share of a bullet before it gets a framing prefix.
    pub bullet_script_floor: f64,
    pub max_subject_chars: usize,
    pub roles: RoleTables,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self {
            dedup_threshold: 0.86,
            min_sentence_chars: 12,
            min_bullet_chars: MIN_BULLET_CHARS,
            lead_script_floor: 0.35,
            bullet_script_floor: 0.25,
            max_subject_chars: 80,
            roles: RoleTables::default(),
        }
    }
}

/// The single configuration value every component is built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gates: GateProfiles,
    pub density: DensityConfig,
    pub fragment: FragmentConfig,
    pub channels: ChannelConfig,
    pub relevance: RelevanceConfig,
    pub anchors: AnchorConfig,
    pub compaction: CompactionConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) TOML document; missing sections keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let gates = &self.gates;
        if !gates.event.at_least_as_strict_as(&gates.corp) {
            return Err(EngineError::invalid_config(
                "gates.event must be at least as strict as gates.corp",
            ));
        }
        if !gates.corp.at_least_as_strict_as(&gates.signal) {
            return Err(EngineError::invalid_config(
                "gates.corp must be at least as strict as gates.signal",
            ));
        }
        for kind in ContentKind::ALL {
            let min_score = gates.for_kind(kind).min_score;
            if min_score > 100 {
                return Err(EngineError::invalid_config(format!(
                    "gates.{}.min_score ({min_score}) must be <= 100",
                    kind.as_str()
                )));
            }
        }

        let density = &self.density;
        if !(0.0..=1.0).contains(&density.short_unit_share) {
            return Err(EngineError::invalid_config(
                "density.short_unit_share must be within 0..=1",
            ));
        }

        if self.fragment.banned_templates.iter().any(|b| b.trim().is_empty()) {
            return Err(EngineError::invalid_config(
                "fragment.banned_templates must not contain empty entries",
            ));
        }
        for banned in &self.fragment.banned_templates {
            let banned_lc = banned.to_lowercase();
            if let Some(phrase) = FIXED_PHRASES
                .iter()
                .find(|phrase| phrase.to_lowercase().contains(&banned_lc))
            {
                return Err(EngineError::invalid_config(format!(
                    "banned template {banned:?} would ban the built-in phrase {phrase:?}"
                )));
            }
        }

        if !is_permutation(&self.channels.tiebreak, &Channel::ALL) {
            return Err(EngineError::invalid_config(
                "channels.tiebreak must list every channel exactly once",
            ));
        }
        let mut seen: HashSet<String> = HashSet::new();
        for channel in Channel::ALL {
            for entry in self.channels.table(channel).entries() {
                if !seen.insert(entry.to_lowercase()) {
                    return Err(EngineError::invalid_config(format!(
                        "channel keyword {entry:?} appears in more than one channel table"
                    )));
                }
            }
        }

        if self.relevance.min_channel_score > 100 {
            return Err(EngineError::invalid_config(
                "relevance.min_channel_score must be <= 100",
            ));
        }

        let anchors = &self.anchors;
        if anchors.max_anchors == 0 {
            return Err(EngineError::invalid_config("anchors.max_anchors must be > 0"));
        }
        if !is_permutation(&anchors.priority, &AnchorType::ALL) {
            return Err(EngineError::invalid_config(
                "anchors.priority must list every anchor type exactly once",
            ));
        }
        let stopwords: HashSet<String> = anchors
            .name_stopwords
            .iter()
            .map(|w| w.to_lowercase())
            .collect();
        if let Some(name) = anchors
            .model_roster
            .iter()
            .find(|name| stopwords.contains(&name.to_lowercase()))
        {
            return Err(EngineError::invalid_config(format!(
                "model roster entry {name:?} is also a name stopword"
            )));
        }

        let compaction = &self.compaction;
        if !(compaction.dedup_threshold > 0.0 && compaction.dedup_threshold <= 1.0) {
            return Err(EngineError::invalid_config(
                "compaction.dedup_threshold must be within (0, 1]",
            ));
        }
        for (name, floor) in [
            ("lead_script_floor", compaction.lead_script_floor),
            ("bullet_script_floor", compaction.bullet_script_floor),
        ] {
            if !(0.0..=1.0).contains(&floor) {
                return Err(EngineError::invalid_config(format!(
                    "compaction.{name} must be within 0..=1"
                )));
            }
        }
        if compaction.min_bullet_chars < MIN_BULLET_CHARS {
            return Err(EngineError::invalid_config(format!(
                "compaction.min_bullet_chars ({}) must be >= {MIN_BULLET_CHARS}",
                compaction.min_bullet_chars
            )));
        }
        if compaction.max_subject_chars < 8 {
            return Err(EngineError::invalid_config(
                "compaction.max_subject_chars must be >= 8",
            ));
        }

        Ok(())
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn is_permutation<T: PartialEq + Copy>(list: &[T], all: &[T]) -> bool {
    list.len() == all.len() && all.iter().all(|item| list.contains(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_config_is_valid() {
        EngineConfig::default().validate().expect("default config");
    }

    #[test]
    fn default_gates_are_monotone() {
        let gates = GateProfiles::default();
        assert!(gates.event.at_least_as_strict_as(&gates.corp));
        assert!(gates.corp.at_least_as_strict_as(&gates.signal));
        assert_eq!(gates.event.min_score, 55);
        assert_eq!(gates.event.min_sentences, 3);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let raw = r#"
[compaction]
dedup_threshold = 0.9

[gates.signal]
min_score = 20
min_entities = 0
min_numeric = 0
min_sentences = 1
max_fragment_penalty = 2
max_boilerplate_hits = 2
"#;
        let config = EngineConfig::from_toml_str(raw).expect("config");
        assert_eq!(config.compaction.dedup_threshold, 0.9);
        assert_eq!(config.compaction.min_sentence_chars, 12);
        assert_eq!(config.gates.signal.min_score, 20);
        assert_eq!(config.gates.event, GateProfiles::default().event);
        assert_eq!(config.anchors.max_anchors, 5);
    }

    #[test]
    fn rejects_signal_stricter_than_event() {
        let mut config = EngineConfig::default();
        config.gates.signal.min_score = 90;
        let err = config.validate().expect_err("non-monotone gates");
        assert!(err.to_string().contains("gates.corp"), "{err}");
    }

    #[test]
    fn rejects_banned_template_matching_builtin_phrase() {
        let mut config = EngineConfig::default();
        config.fragment.banned_templates.push("持续跟踪".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_overlapping_channel_tables() {
        let mut config = EngineConfig::default();
        config.channels.dev.latin.push("Launch".to_string());
        let err = config.validate().expect_err("overlap");
        assert!(err.to_string().contains("more than one channel"), "{err}");
    }

    #[test]
    fn rejects_roster_name_that_is_a_stopword() {
        let mut config = EngineConfig::default();
        config.anchors.model_roster.push("Version".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_short_bullets() {
        let err = EngineConfig::from_toml_str("[compaction]\nmin_bullet_chars = 4\n")
            .expect_err("short bullets");
        assert!(err.to_string().contains("min_bullet_chars"), "{err}");

        let config = EngineConfig::from_toml_str("[compaction]\nmin_bullet_chars = 20\n")
            .expect("longer bullets");
        assert_eq!(config.compaction.min_bullet_chars, 20);
    }

    #[test]
    fn rejects_incomplete_priority() {
        let mut config = EngineConfig::default();
        config.anchors.priority.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_round_trips_defaults() {
        let config = EngineConfig::default();
        let raw = config.to_toml_string().expect("render");
        let parsed = EngineConfig::from_toml_str(&raw).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("brief.toml");
        std::fs::write(&path, "[anchors]\nmax_anchors = 3\n").expect("write");
        let config = EngineConfig::load(&path).expect("load");
        assert_eq!(config.anchors.max_anchors, 3);
    }
}
