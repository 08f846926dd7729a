//! Channel classification and the relevance gate.

use brief_protocol::{Channel, ChannelScores, RelevanceVerdict};
use regex::Regex;

use crate::config::{EngineConfig, UrlBoost};
use crate::error::Result;
use crate::matcher::{compile_pattern, KeywordMatcher};
use crate::text::{ascii_bounded, url_host};

/// Money, percentages and version numbers: the facts that earn the numeric boost.
const BOOST_PATTERN: &str = r"[$€£¥][ ]?[0-9]|[0-9]+(?:\.[0-9]+)?[ ]?[%％]|[vV]?[0-9]+(?:\.[0-9]+){1,3}|[0-9]+(?:\.[0-9]+)?[ ]?(?:亿|万)?(?:美元|元)|[0-9]+(?:\.[0-9]+)?[ ]?(?:billion|million)[ ](?:dollars|USD)";

const MAX_REASON_HITS: usize = 3;

pub const REASON_HARD_NEGATIVE: &str = "hard_neg";
pub const REASON_NO_CORE: &str = "no_ai_core";
pub const REASON_WHITELIST: &str = "whitelist";
pub const REASON_SCORE: &str = "score";
pub const REASON_WEAK_CORE: &str = "ai_core_weak";

/// Scores text against the four channels and decides whether it is in-domain at all.
#[derive(Debug, Clone)]
pub struct ChannelClassifier {
    hit_weight: u32,
    numeric_boost: u32,
    tiebreak: Vec<Channel>,
    url_boosts: Vec<UrlBoost>,
    tables: Vec<(Channel, KeywordMatcher)>,
    numeric: Regex,
    min_channel_score: u32,
    hard_negative: KeywordMatcher,
    core_domain: KeywordMatcher,
    whitelist: KeywordMatcher,
}

impl ChannelClassifier {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let channels = &config.channels;
        let tables = Channel::ALL
            .iter()
            .map(|channel| {
                let name = format!("channels.{}", channel.as_str());
                KeywordMatcher::compile(&name, channels.table(*channel)).map(|m| (*channel, m))
            })
            .collect::<Result<Vec<_>>>()?;
        let relevance = &config.relevance;
        Ok(Self {
            hit_weight: channels.hit_weight,
            numeric_boost: channels.numeric_boost,
            tiebreak: channels.tiebreak.clone(),
            url_boosts: channels.url_boosts.clone(),
            tables,
            numeric: compile_pattern("channels.numeric", BOOST_PATTERN)?,
            min_channel_score: relevance.min_channel_score,
            hard_negative: KeywordMatcher::compile("relevance.hard_negative", &relevance.hard_negative)?,
            core_domain: KeywordMatcher::compile("relevance.core_domain", &relevance.core_domain)?,
            whitelist: KeywordMatcher::compile("relevance.entity_whitelist", &relevance.entity_whitelist)?,
        })
    }

    /// Per-channel scores plus the best channel.
    ///
    /// The best channel is the argmax of raw hit counts (keyword hits plus URL boosts),
    /// never of the capped scores, so two saturated channels are still told apart.
    #[must_use]
    pub fn classify(&self, text: &str, url: &str) -> ChannelScores {
        let mut raw = [0u32; 4];
        let mut reasons = Vec::new();

        for (channel, matcher) in &self.tables {
            let hits = matcher.find_all(text);
            raw[channel_index(*channel)] += hits.len() as u32;
            if !hits.is_empty() {
                let mut shown: Vec<String> = Vec::new();
                for hit in hits {
                    let hit = hit.to_lowercase();
                    if !shown.contains(&hit) && shown.len() < MAX_REASON_HITS {
                        shown.push(hit);
                    }
                }
                reasons.push(format!("{}:{}", channel.as_str(), shown.join(",")));
            }
        }

        if let Some(host) = url_host(url) {
            for boost in &self.url_boosts {
                if host_matches(&host, &boost.domain) {
                    raw[channel_index(boost.channel)] += boost.hits;
                    reasons.push(format!("url:{}->{}", boost.domain, boost.channel.as_str()));
                }
            }
        }

        let numeric = self
            .numeric
            .find_iter(text)
            .any(|m| ascii_bounded(text, m.start(), m.end()));
        let bonus = if numeric {
            reasons.push("numeric_boost".to_string());
            self.numeric_boost
        } else {
            0
        };
        let capped = |channel: Channel| -> u32 {
            raw[channel_index(channel)]
                .saturating_mul(self.hit_weight)
                .saturating_add(bonus)
                .min(100)
        };

        let mut best_channel = self.tiebreak.first().copied().unwrap_or(Channel::Product);
        let mut best_raw = raw[channel_index(best_channel)];
        for channel in &self.tiebreak {
            let hits = raw[channel_index(*channel)];
            if hits > best_raw {
                best_channel = *channel;
                best_raw = hits;
            }
        }

        ChannelScores {
            product: capped(Channel::Product),
            tech: capped(Channel::Tech),
            business: capped(Channel::Business),
            dev: capped(Channel::Dev),
            best_channel,
            reasons,
        }
    }

    #[must_use]
    pub fn is_relevant(&self, text: &str, url: &str) -> RelevanceVerdict {
        let scores = self.classify(text, url);
        self.relevance_with(text, &scores)
    }

    /// Relevance decision for already computed channel scores.
    ///
    /// A hard negative rejects only when no core-domain term is present, and that check
    /// runs before the whitelist and score checks.
    #[must_use]
    pub fn relevance_with(&self, text: &str, scores: &ChannelScores) -> RelevanceVerdict {
        let core = self.core_domain.first(text);

        if core.is_none() {
            if let Some(negative) = self.hard_negative.first(text) {
                return verdict(false, REASON_HARD_NEGATIVE, format!("hard_neg:{negative}"));
            }
        }
        if let Some(entity) = self.whitelist.first(text) {
            return verdict(true, REASON_WHITELIST, format!("entity:{entity}"));
        }
        match core {
            Some(core) if scores.max_score() >= self.min_channel_score => verdict(
                true,
                REASON_SCORE,
                format!("max_score:{} core:{core}", scores.max_score()),
            ),
            Some(core) => verdict(true, REASON_WEAK_CORE, format!("core:{core}")),
            None => RelevanceVerdict {
                relevant: false,
                reasons: vec![REASON_NO_CORE.to_string()],
            },
        }
    }
}

fn verdict(relevant: bool, code: &str, detail: String) -> RelevanceVerdict {
    RelevanceVerdict {
        relevant,
        reasons: vec![code.to_string(), detail],
    }
}

fn channel_index(channel: Channel) -> usize {
    match channel {
        Channel::Product => 0,
        Channel::Tech => 1,
        Channel::Business => 2,
        Channel::Dev => 3,
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim().trim_start_matches("www.").to_ascii_lowercase();
    !domain.is_empty()
        && (host == domain
            || host
                .strip_suffix(domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.')))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LAUNCH: &str = "OpenAI launched GPT-5 with 70B parameters achieving 94.5% on MMLU. \
                          The model is now generally available at $0.003 per 1K tokens.";

    fn classifier() -> ChannelClassifier {
        ChannelClassifier::new(&EngineConfig::default()).expect("classifier")
    }

    #[test]
    fn launch_text_is_product_or_tech() {
        let scores = classifier().classify(LAUNCH, "");
        assert!(
            matches!(scores.best_channel, Channel::Product | Channel::Tech),
            "{scores:?}"
        );
        assert!(scores.reasons.iter().any(|r| r == "numeric_boost"), "{scores:?}");
        assert!(scores.tech >= 45, "{scores:?}");
    }

    #[test]
    fn url_boost_adds_raw_hits() {
        let c = classifier();
        let plain = c.classify("A new inference library", "");
        let boosted = c.classify("A new inference library", "https://github.com/acme/infer");
        assert!(boosted.dev > plain.dev);
        assert_eq!(boosted.best_channel, Channel::Dev);
    }

    #[test]
    fn raw_hits_decide_between_saturated_channels() {
        let c = classifier();
        let text = "The paper describes the model architecture, training dataset, \
                    inference benchmark and reasoning research. Funding and revenue grew.";
        let scores = c.classify(text, "https://github.com/acme/repo");
        assert_eq!(scores.tech, 100);
        assert_eq!(scores.best_channel, Channel::Tech, "{scores:?}");
    }

    #[test]
    fn ties_follow_configured_order() {
        let mut config = EngineConfig::default();
        let c = ChannelClassifier::new(&config).unwrap();
        assert_eq!(c.classify("nothing here", "").best_channel, Channel::Product);

        config.channels.tiebreak = vec![Channel::Dev, Channel::Business, Channel::Tech, Channel::Product];
        let c = ChannelClassifier::new(&config).unwrap();
        assert_eq!(c.classify("nothing here", "").best_channel, Channel::Dev);
    }

    #[test]
    fn subdomains_receive_url_boosts() {
        assert!(host_matches("docs.github.com", "github.com"));
        assert!(host_matches("github.com", "github.com"));
        assert!(!host_matches("notgithub.com", "github.com"));
    }

    #[test]
    fn relevance_codes() {
        let c = classifier();
        assert_eq!(c.is_relevant(LAUNCH, "").code(), REASON_WHITELIST);
        assert_eq!(
            c.is_relevant("Weekly roundup. Subscribe and sign in to see top links for this week.", "")
                .code(),
            REASON_NO_CORE
        );
        assert_eq!(
            c.is_relevant("City approves new apartment construction near the river.", "").code(),
            REASON_HARD_NEGATIVE
        );
    }

    #[test]
    fn core_domain_rescues_mixed_content() {
        let c = classifier();
        let verdict = c.is_relevant("Work starts on AI data-center construction in Texas.", "");
        assert!(verdict.relevant, "{verdict:?}");
        assert_eq!(verdict.code(), REASON_WEAK_CORE);
    }

    #[test]
    fn score_path_needs_core_vocabulary() {
        let c = classifier();
        let verdict = c.is_relevant(
            "A new machine learning model tops the benchmark with 12% better accuracy.",
            "",
        );
        assert_eq!(verdict.code(), REASON_SCORE, "{verdict:?}");
    }
}
