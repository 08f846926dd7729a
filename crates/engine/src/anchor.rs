//! Extraction of verifiable anchor tokens.
//!
//! Six independent passes each contribute typed candidates. Every pass runs over the
//! title and the body separately and keeps the matched slice as is, so an anchor is
//! always a verbatim substring of the item text.

use std::collections::HashSet;

use brief_protocol::{Anchor, AnchorSet, AnchorType};
use regex::{Captures, Regex};

use crate::config::{AnchorConfig, EngineConfig};
use crate::error::Result;
use crate::matcher::{alternation, compile_pattern, CaseMode, KeywordMatcher};
use crate::text::{ascii_bounded, char_len};

const VERSION_TAIL: &str = r"[- ]?[vV]?[0-9]+(?:\.[0-9]+)*[a-z]?";

const GENERIC_PRODUCT: &str =
    r"[A-Z][A-Za-z]{2,}(?:-[vV]?([0-9]+(?:\.[0-9]+)*)|[ ]?[vV]([0-9]+(?:\.[0-9]+)*)|[ ]([0-9]+(?:\.[0-9]+)+))";

const MONEY: &str = concat!(
    r"(?:US|HK|NT|A|C)?[$€£¥][ ]?[0-9](?:[0-9,]*[0-9])?(?:\.[0-9]+)?(?:[KMBT]|[ ]?(?i:billion|million|trillion|thousand|bn))?",
    r"|(?:USD|EUR|RMB|CNY|GBP|JPY)[ ]?[0-9](?:[0-9,]*[0-9])?(?:\.[0-9]+)?(?:[ ]?(?i:billion|million|trillion|bn))?",
    r"|[0-9](?:[0-9,]*[0-9])?(?:\.[0-9]+)?[ ]?(?i:billion|million|trillion)[ ](?i:dollars|usd|euros|yuan)",
    r"|[0-9](?:[0-9,]*[0-9])?(?:\.[0-9]+)?[ ]?(?:万亿|千亿|亿|千万|百万|万)?(?:美元|美金|人民币|欧元|英镑|日元|元)",
    r"|[零一二三四五六七八九十百千两]+(?:万亿|千亿|亿|千万|百万|万)?(?:美元|美金|人民币|欧元|元)",
);

const PARAMS_BARE: &str = r"([0-9]+(?:\.[0-9]+)?)[ ]?([BT])";

const PARAMS_QUALIFIED: &str = concat!(
    r"([0-9]+(?:\.[0-9]+)?[ ]?(?:[KMBT]|(?i:billion|million|trillion|thousand)|万亿|千亿|亿|万))[ -]?(?i:parameters|parameter|params)",
    r"|([0-9]+(?:\.[0-9]+)?[ ]?(?:万亿|千亿|亿|万|[BT]))[ ]?个?参数",
    r"|参数(?:规模|量)?(?:达到|达|为|约|超过)?[ ]?([0-9]+(?:\.[0-9]+)?[ ]?(?:万亿|千亿|亿|[BT]))",
);

const VERSION: &str = concat!(
    r"[vV][0-9]+(?:\.[0-9]+)*",
    r"|[0-9]+\.[0-9]+\.[0-9]+(?:\.[0-9]+)?",
    r"|(?i:version|ver\.?)[ ]?([0-9]+(?:\.[0-9]+)*)",
    r"|版本[ ]?([0-9]+(?:\.[0-9]+)*)",
);

const METRIC: &str = concat!(
    r"[0-9]+(?:\.[0-9]+)?[ ]?[%％]",
    r"|[0-9]+(?:\.[0-9]+)?[ ]?[xX×][ ](?i:faster|slower|cheaper|more|less|higher|lower|speedup|improvement|throughput)",
    r"|[0-9]+(?:\.[0-9]+)?×",
    r"|[0-9]+(?:\.[0-9]+)?倍",
    r"|[0-9]+(?:\.[0-9]+)?[ ]?(?:-|–|~|to)[ ]?[0-9]+(?:\.[0-9]+)?[ ]?(?:seconds|minutes|hours|days|weeks|sec|min|ms|h|s|毫秒|分钟|小时|秒|天|周)",
    r"|(?:PR|Issue|issue|pull request)[ ]?#[0-9]+",
    r"|#[0-9]{3,}",
);

/// Words after a number that make it a quantity rather than a version.
const UNIT_WORDS: &[&str] = &["billion", "million", "trillion", "thousand", "percent", "times"];

/// Pulls typed, verbatim fact tokens out of an item's title and body.
#[derive(Debug, Clone)]
pub struct AnchorExtractor {
    config: AnchorConfig,
    roster: Option<Regex>,
    roster_cjk: Option<Regex>,
    generic_product: Regex,
    name_stopwords: HashSet<String>,
    benchmarks: KeywordMatcher,
    money: Regex,
    params_bare: Regex,
    params_qualified: Regex,
    counted_nouns: Vec<String>,
    version: Regex,
    metric: Regex,
}

struct Candidate {
    anchor: Anchor,
    order: usize,
}

impl AnchorExtractor {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let anchors = &config.anchors;
        let variants = alternation(&anchors.model_variants)
            .map(|alt| format!("(?:[- ]{alt})"))
            .unwrap_or_default();
        let roster = alternation(&anchors.model_roster)
            .map(|names| {
                let optional_variant = if variants.is_empty() {
                    String::new()
                } else {
                    format!("{variants}?")
                };
                let trailing_variants = if variants.is_empty() {
                    String::new()
                } else {
                    format!("{variants}*")
                };
                compile_pattern(
                    "anchors.model_roster",
                    &format!("{names}{optional_variant}{VERSION_TAIL}{trailing_variants}"),
                )
            })
            .transpose()?;
        let roster_cjk = alternation(&anchors.model_roster_cjk)
            .map(|names| {
                compile_pattern(
                    "anchors.model_roster_cjk",
                    &format!("{names}[ ]?[vV]?[0-9]+(?:\\.[0-9]+)*"),
                )
            })
            .transpose()?;

        Ok(Self {
            config: anchors.clone(),
            roster,
            roster_cjk,
            generic_product: compile_pattern("anchors.generic_product", GENERIC_PRODUCT)?,
            name_stopwords: anchors
                .name_stopwords
                .iter()
                .map(|w| w.to_lowercase())
                .collect(),
            benchmarks: KeywordMatcher::from_words(
                "anchors.benchmarks",
                &anchors.benchmarks,
                CaseMode::Sensitive,
            )?,
            money: compile_pattern("anchors.money", MONEY)?,
            params_bare: compile_pattern("anchors.params", PARAMS_BARE)?,
            params_qualified: compile_pattern("anchors.params_qualified", PARAMS_QUALIFIED)?,
            counted_nouns: anchors
                .counted_nouns
                .iter()
                .map(|w| w.to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
            version: compile_pattern("anchors.version", VERSION)?,
            metric: compile_pattern("anchors.metric", METRIC)?,
        })
    }

    /// Ranked, deduplicated anchors for one item (at most `max_anchors`).
    #[must_use]
    pub fn extract(&self, title: &str, body: &str) -> AnchorSet {
        let fields = [title, body];
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut push = |kind: AnchorType, text: &str| {
            let text = text.trim();
            if !text.is_empty() {
                let order = candidates.len();
                candidates.push(Candidate {
                    anchor: Anchor {
                        text: text.to_string(),
                        kind,
                    },
                    order,
                });
            }
        };

        let mut found_product = false;
        for field in fields {
            for text in self.products(field) {
                found_product = true;
                push(AnchorType::Product, text);
            }
        }
        for field in fields {
            for text in self.benchmarks.find_all(field) {
                push(AnchorType::Benchmark, text);
            }
        }
        for field in fields {
            for text in self.money(field) {
                push(AnchorType::Money, text);
            }
        }
        for field in fields {
            for text in self.params(field) {
                push(AnchorType::Params, text);
            }
        }
        if !found_product {
            for field in fields {
                for text in self.versions(field) {
                    push(AnchorType::Version, text);
                }
            }
        }
        for field in fields {
            for text in self.metrics(field) {
                push(AnchorType::Metric, text);
            }
        }

        AnchorSet::from_anchors(self.rank(candidates))
    }

    /// First anchor in priority order.
    #[must_use]
    pub fn pick_primary<'a>(&self, set: &'a AnchorSet) -> Option<&'a Anchor> {
        self.config
            .priority
            .iter()
            .find_map(|kind| set.anchors.iter().find(|anchor| anchor.kind == *kind))
    }

    /// Natural citation token for the proof line: a version string, a `$` amount or a
    /// benchmark name, in that order.
    #[must_use]
    pub fn citation_token<'a>(&self, set: &'a AnchorSet) -> Option<&'a str> {
        let of_kind = |pred: &dyn Fn(&Anchor) -> bool| {
            set.anchors
                .iter()
                .find(|anchor| pred(anchor))
                .map(|anchor| anchor.text.as_str())
        };
        of_kind(&|a| matches!(a.kind, AnchorType::Product | AnchorType::Version))
            .or_else(|| of_kind(&|a| a.kind == AnchorType::Money && a.text.contains('$')))
            .or_else(|| of_kind(&|a| a.kind == AnchorType::Benchmark))
    }

    fn rank(&self, mut candidates: Vec<Candidate>) -> Vec<Anchor> {
        candidates.sort_by(|a, b| {
            self.config
                .rank(a.anchor.kind)
                .cmp(&self.config.rank(b.anchor.kind))
                .then(char_len(&b.anchor.text).cmp(&char_len(&a.anchor.text)))
                .then(a.order.cmp(&b.order))
        });
        let mut kept: Vec<Anchor> = Vec::new();
        let mut kept_lower: Vec<String> = Vec::new();
        for candidate in candidates {
            let lower = candidate.anchor.text.to_lowercase();
            let overlaps = kept_lower
                .iter()
                .any(|existing| existing.contains(&lower) || lower.contains(existing.as_str()));
            if overlaps {
                continue;
            }
            kept_lower.push(lower);
            kept.push(candidate.anchor);
            if kept.len() == self.config.max_anchors {
                break;
            }
        }
        kept
    }

    fn products<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut out = Vec::new();
        if let Some(re) = &self.roster {
            out.extend(
                re.find_iter(text)
                    .filter(|m| ascii_bounded(text, m.start(), m.end()))
                    .filter(|m| !followed_by_unit(text, m.end()))
                    .map(|m| m.as_str()),
            );
        }
        if let Some(re) = &self.roster_cjk {
            out.extend(
                re.find_iter(text)
                    .filter(|m| ascii_bounded(text, m.start(), m.end()))
                    .filter(|m| !followed_by_unit(text, m.end()))
                    .map(|m| m.as_str()),
            );
        }
        for caps in self.generic_product.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if !ascii_bounded(text, whole.start(), whole.end()) || followed_by_unit(text, whole.end()) {
                continue;
            }
            let name: String = whole
                .as_str()
                .chars()
                .take_while(|ch| ch.is_ascii_alphabetic())
                .collect();
            if self.name_stopwords.contains(&name.to_lowercase()) {
                continue;
            }
            if first_group(&caps).is_some_and(is_year) {
                continue;
            }
            out.push(whole.as_str());
        }
        out
    }

    fn money<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.money
            .find_iter(text)
            .filter(|m| ascii_bounded(text, m.start(), m.end()))
            .map(|m| m.as_str())
            .collect()
    }

    /// Parameter counts at AI scale: a bare `B`/`T` suffix of at least one billion that
    /// does not count users or tokens, or any magnitude with an explicit qualifier.
    fn params<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut out = Vec::new();
        for caps in self.params_bare.captures_iter(text) {
            let (Some(whole), Some(number), Some(suffix)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };
            if !ascii_bounded(text, whole.start(), whole.end()) || preceded_by_currency(text, whole.start()) {
                continue;
            }
            let value: f64 = number.as_str().parse().unwrap_or(0.0);
            let billions = if suffix.as_str() == "T" { value * 1000.0 } else { value };
            if billions < 1.0 || self.counts_something(text, whole.end()) {
                continue;
            }
            out.push(whole.as_str());
        }
        for caps in self.params_qualified.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if !ascii_bounded(text, whole.start(), whole.end()) || preceded_by_currency(text, whole.start()) {
                continue;
            }
            if let Some(group) = first_group_match(&caps) {
                out.push(group.as_str().trim());
            }
        }
        out
    }

    fn counts_something(&self, text: &str, end: usize) -> bool {
        let rest = text[end..].trim_start();
        let rest_lower = rest.to_lowercase();
        let next_word: String = rest_lower
            .chars()
            .take_while(|ch| ch.is_ascii_alphanumeric())
            .collect();
        self.counted_nouns.iter().any(|noun| {
            if noun.is_ascii() {
                next_word == *noun
            } else {
                rest_lower.starts_with(noun.as_str())
            }
        })
    }

    fn versions<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut out = Vec::new();
        for caps in self.version.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if !ascii_bounded(text, whole.start(), whole.end()) || followed_by_percent(text, whole.end()) {
                continue;
            }
            match first_group_match(&caps) {
                Some(number) => out.push(number.as_str()),
                None => out.push(whole.as_str()),
            }
        }
        out
    }

    fn metrics<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.metric
            .find_iter(text)
            .filter(|m| ascii_bounded(text, m.start(), m.end()))
            .map(|m| m.as_str())
            .collect()
    }
}

fn first_group_match<'t>(caps: &Captures<'t>) -> Option<regex::Match<'t>> {
    caps.iter().skip(1).flatten().next()
}

fn first_group<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    first_group_match(caps).map(|m| m.as_str())
}

fn is_year(number: &str) -> bool {
    number.len() == 4
        && number
            .parse::<u32>()
            .is_ok_and(|year| (1900..=2100).contains(&year))
}

fn preceded_by_currency(text: &str, start: usize) -> bool {
    text[..start]
        .trim_end()
        .chars()
        .last()
        .is_some_and(|ch| matches!(ch, '$' | '€' | '£' | '¥'))
}

fn followed_by_percent(text: &str, end: usize) -> bool {
    text[end..]
        .trim_start()
        .starts_with(['%', '％'])
}

/// A number followed by `%`, `×`, `倍` or a magnitude word is a quantity, not a name.
fn followed_by_unit(text: &str, end: usize) -> bool {
    let rest = text[end..].trim_start();
    if rest.starts_with(['%', '％', '×', '倍', '亿', '万']) {
        return true;
    }
    let word: String = rest
        .chars()
        .take_while(|ch| ch.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();
    UNIT_WORDS.contains(&word.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    const LAUNCH: &str = "OpenAI launched GPT-5 with 70B parameters achieving 94.5% on MMLU. \
                          The model is now generally available at $0.003 per 1K tokens.";

    fn extractor() -> AnchorExtractor {
        AnchorExtractor::new(&EngineConfig::default()).expect("extractor")
    }

    fn texts(set: &AnchorSet) -> Vec<&str> {
        set.texts().collect()
    }

    #[test]
    fn launch_scenario_anchors() {
        let set = extractor().extract("", LAUNCH);
        assert_eq!(texts(&set), vec!["GPT-5", "MMLU", "$0.003", "70B", "94.5%"]);
        assert!(set.has_anchor);
        assert_eq!(set.anchor_types.get(&AnchorType::Product), Some(&1));
    }

    #[test]
    fn primary_and_citation() {
        let e = extractor();
        let set = e.extract("", LAUNCH);
        let primary = e.pick_primary(&set).expect("primary");
        assert_eq!(primary.text, "GPT-5");
        assert_eq!(primary.kind, AnchorType::Product);
        assert_eq!(e.citation_token(&set), Some("GPT-5"));
    }

    #[test]
    fn model_names_with_variants() {
        let set = extractor().extract("Anthropic ships Claude 3.5 Sonnet and GPT-4o mini pricing drops", "");
        let found = texts(&set);
        assert!(found.contains(&"Claude 3.5 Sonnet"), "{found:?}");
        assert!(found.contains(&"GPT-4o mini"), "{found:?}");
    }

    #[test]
    fn user_counts_are_not_parameters() {
        let set = extractor().extract("", "The assistant now has 1B users and a 405B parameter model.");
        let found = texts(&set);
        assert!(!found.contains(&"1B"), "{found:?}");
        assert!(found.contains(&"405B"), "{found:?}");
    }

    #[test]
    fn small_bare_counts_are_not_parameters() {
        let set = extractor().extract("", "A compact 0.5B checkpoint.");
        assert!(set.anchors.iter().all(|a| a.kind != AnchorType::Params), "{set:?}");
    }

    #[test]
    fn money_beats_embedded_params() {
        let set = extractor().extract("Startup raises $6.6B at a $157B valuation", "");
        let found = texts(&set);
        assert!(found.contains(&"$6.6B"), "{found:?}");
        assert!(found.contains(&"$157B"), "{found:?}");
        assert!(set.anchors.iter().all(|a| a.kind == AnchorType::Money), "{set:?}");
    }

    #[test]
    fn chinese_amounts_and_params() {
        let set = extractor().extract(
            "智谱完成5亿元融资",
            "阿里云发布通义千问3.0大模型，参数规模达到2350亿，推理速度提升3倍。",
        );
        let found = texts(&set);
        assert!(found.contains(&"5亿元"), "{found:?}");
        assert!(found.contains(&"通义千问3.0"), "{found:?}");
        assert!(found.contains(&"2350亿"), "{found:?}");
        assert!(found.contains(&"3倍"), "{found:?}");
    }

    #[test]
    fn versions_only_without_product() {
        let e = extractor();
        let set = e.extract("Release notes: v2.3 is out", "Fixes land in 1.4.2 for all users.");
        let found = texts(&set);
        assert!(found.contains(&"v2.3"), "{found:?}");
        assert!(found.contains(&"1.4.2"), "{found:?}");

        let set = e.extract("GPT-5 arrives", "Client library v2.3 supports it.");
        assert!(set.anchors.iter().all(|a| a.kind != AnchorType::Version), "{set:?}");
    }

    #[test]
    fn stopwords_and_years_are_not_products() {
        let set = extractor().extract("Version 2.0 notes", "Expo-2025 opens. Over 2.5 billion views.");
        assert!(set.anchors.iter().all(|a| a.kind != AnchorType::Product), "{set:?}");
    }

    #[test]
    fn metrics_cover_speedups_ranges_and_issues() {
        let set = extractor().extract(
            "",
            "Inference is 3x faster, latency drops to 20-40 ms, see PR #1234.",
        );
        let found = texts(&set);
        assert!(found.contains(&"3x faster"), "{found:?}");
        assert!(found.contains(&"20-40 ms"), "{found:?}");
        assert!(found.contains(&"PR #1234"), "{found:?}");
    }

    #[test]
    fn keeps_at_most_max_anchors() {
        let set = extractor().extract(
            "GPT-5, Claude 4, Gemini 2.5 Pro and Llama 4 compared",
            "MMLU, GPQA, HumanEval and MATH results: 90%, 80%, 70%.",
        );
        assert_eq!(set.anchors.len(), 5);
        assert_eq!(set.anchors[0].kind, AnchorType::Product);
    }

    #[test]
    fn no_anchor_for_plain_prose() {
        let set = extractor().extract("A quiet week", "Nothing measurable happened.");
        assert!(!set.has_anchor);
        assert!(extractor().pick_primary(&set).is_none());
        assert!(extractor().citation_token(&set).is_none());
    }

    proptest! {
        #[test]
        fn proptest_anchors_are_verbatim(
            title in "[A-Za-z0-9$%.,\\- ]{0,60}",
            body in "(GPT|Claude|MMLU|\\$|[0-9]|B|T|%|x faster| |\\.|亿|元|参数){0,40}",
        ) {
            let set = extractor().extract(&title, &body);
            prop_assert!(set.anchors.len() <= 5);
            for anchor in &set.anchors {
                prop_assert!(
                    title.contains(&anchor.text) || body.contains(&anchor.text),
                    "{:?} not in {:?} / {:?}", anchor.text, title, body
                );
            }
        }
    }
}
