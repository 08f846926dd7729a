use std::collections::HashSet;

use brief_protocol::{ContentKind, DensityBreakdown, GateDecision, GateReason};
use regex::Regex;

use crate::config::{EngineConfig, GateProfiles};
use crate::error::Result;
use crate::fragment::TrailingWords;
use crate::matcher::{compile_pattern, KeywordMatcher};
use crate::text::{ascii_bounded, char_len, ends_with_ellipsis, is_cjk, terminator_units};

const ENTITY_WEIGHT: u32 = 20;
const ENTITY_CAP: u32 = 3;
const NUMERIC_WEIGHT: u32 = 15;
const NUMERIC_CAP: u32 = 3;
const SENTENCE_WEIGHT: u32 = 10;
const SENTENCE_CAP: u32 = 5;
const BOILERPLATE_WEIGHT: u32 = 25;
const BOILERPLATE_CAP: u32 = 2;
const FRAGMENT_WEIGHT: u32 = 20;
const FRAGMENT_CAP: u32 = 2;

/// Money, percentages, versions and unit-suffixed numbers.
const NUMERIC_PATTERN: &str = r"(?:US|HK|A|C)?[$€£¥][ ]?[0-9][0-9,]*(?:\.[0-9]+)?|[0-9]+(?:\.[0-9]+)?[ ]?[%％]|[vV]?[0-9]+(?:\.[0-9]+){1,3}|[0-9]+(?:\.[0-9]+)?[ ]?(?:billion|million|trillion|thousand|bn|[KMBT]|ms|GB|TB|MB|GHz|万亿|亿|万|倍|美元|元)";

/// Latin or mixed alphanumeric tokens (`OpenAI`, `H100`, `GPT-5`).
const TOKEN_PATTERN: &str = r"[A-Za-z0-9][A-Za-z0-9._+\-]*[A-Za-z0-9]";

/// Scores raw text for information density and applies per-kind gates.
#[derive(Debug, Clone)]
pub struct DensityScorer {
    gates: GateProfiles,
    short_unit_chars: usize,
    short_unit_share: f64,
    entity_stopwords: HashSet<String>,
    domain: KeywordMatcher,
    boilerplate: KeywordMatcher,
    trailing: TrailingWords,
    numeric: Regex,
    token: Regex,
}

impl DensityScorer {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            gates: config.gates,
            short_unit_chars: config.density.short_unit_chars,
            short_unit_share: config.density.short_unit_share,
            entity_stopwords: config
                .density
                .entity_stopwords
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            domain: KeywordMatcher::compile("density.domain_keywords", &config.density.domain_keywords)?,
            boilerplate: KeywordMatcher::compile("density.boilerplate", &config.density.boilerplate)?,
            trailing: TrailingWords::new(&config.fragment.dangling),
            numeric: compile_pattern("density.numeric", NUMERIC_PATTERN)?,
            token: compile_pattern("density.token", TOKEN_PATTERN)?,
        })
    }

    #[must_use]
    pub fn score(&self, text: &str) -> DensityBreakdown {
        let text = text.trim();
        if text.is_empty() {
            return DensityBreakdown {
                fragment_penalty: FRAGMENT_CAP,
                boilerplate_hits: 1,
                ..DensityBreakdown::default()
            };
        }

        let entity_hits = self.entity_hits(text);
        let numeric_hits = self.numeric_hits(text);
        let units = terminator_units(text);
        let sentence_count = units.len() as u32;
        let boilerplate_hits = self.boilerplate.count(text) as u32;
        let fragment_penalty = self.fragment_penalty(text, &units);

        let positive = ENTITY_WEIGHT * entity_hits.min(ENTITY_CAP)
            + NUMERIC_WEIGHT * numeric_hits.min(NUMERIC_CAP)
            + SENTENCE_WEIGHT * sentence_count.saturating_sub(1).min(SENTENCE_CAP);
        let negative = BOILERPLATE_WEIGHT * boilerplate_hits.min(BOILERPLATE_CAP)
            + FRAGMENT_WEIGHT * fragment_penalty.min(FRAGMENT_CAP);
        let score = positive.saturating_sub(negative).min(100);

        DensityBreakdown {
            entity_hits,
            numeric_hits,
            sentence_count,
            boilerplate_hits,
            fragment_penalty,
            score,
        }
    }

    /// First failing check wins, in the fixed order of [`GateReason`].
    #[must_use]
    pub fn gate(&self, breakdown: &DensityBreakdown, kind: ContentKind) -> GateDecision {
        let t = self.gates.for_kind(kind);
        if breakdown.fragment_penalty > t.max_fragment_penalty {
            return GateDecision::reject(GateReason::Fragment);
        }
        if breakdown.boilerplate_hits > t.max_boilerplate_hits {
            return GateDecision::reject(GateReason::Boilerplate);
        }
        if breakdown.score < t.min_score {
            return GateDecision::reject(GateReason::LowScore);
        }
        if breakdown.entity_hits < t.min_entities {
            return GateDecision::reject(GateReason::MissingEntities);
        }
        if breakdown.numeric_hits < t.min_numeric {
            return GateDecision::reject(GateReason::MissingNumbers);
        }
        if breakdown.sentence_count < t.min_sentences {
            return GateDecision::reject(GateReason::FewSentences);
        }
        GateDecision::pass()
    }

    fn entity_hits(&self, text: &str) -> u32 {
        let keyword_hits = self.domain.count(text);

        let mut tokens: HashSet<&str> = HashSet::new();
        for m in self.token.find_iter(text) {
            let token = m.as_str();
            if token.len() < 3 || !ascii_bounded(text, m.start(), m.end()) {
                continue;
            }
            let has_alpha = token.chars().any(|c| c.is_ascii_alphabetic());
            let distinctive = token.chars().any(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
            if has_alpha && distinctive && !self.entity_stopwords.contains(&token.to_lowercase()) {
                tokens.insert(token);
            }
        }

        (keyword_hits + tokens.len() + mixed_script_tokens(text)) as u32
    }

    fn numeric_hits(&self, text: &str) -> u32 {
        self.numeric
            .find_iter(text)
            .filter(|m| ascii_bounded(text, m.start(), m.end()))
            .count() as u32
    }

    fn fragment_penalty(&self, text: &str, units: &[&str]) -> u32 {
        let mut penalty = 0;
        if ends_with_ellipsis(text) {
            penalty += 1;
        }
        if self.trailing.ends_dangling(text) {
            penalty += 1;
        }
        if !units.is_empty() {
            let short = units
                .iter()
                .filter(|unit| char_len(unit) < self.short_unit_chars)
                .count();
            if short as f64 / units.len() as f64 > self.short_unit_share {
                penalty += 1;
            }
        }
        penalty.min(FRAGMENT_CAP)
    }
}

/// Distinct whitespace-delimited tokens mixing CJK with ASCII letters or digits
/// (`英伟达H100`, `GPT-5模型`).
fn mixed_script_tokens(text: &str) -> usize {
    let mut seen: HashSet<&str> = HashSet::new();
    for token in text.split(|c: char| c.is_whitespace() || is_break_punct(c)) {
        let has_cjk = token.chars().any(is_cjk);
        let has_ascii = token.chars().any(|c| c.is_ascii_alphanumeric());
        if has_cjk && has_ascii {
            seen.insert(token);
        }
    }
    seen.len()
}

fn is_break_punct(c: char) -> bool {
    matches!(
        c,
        '，' | '。' | '、' | '；' | '：' | '！' | '？' | ',' | ';' | '(' | ')' | '（' | '）' | '「' | '」'
    )
}
