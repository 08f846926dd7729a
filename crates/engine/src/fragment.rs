//! Fragment and placeholder guard.
//!
//! Every string that leaves the engine passes through [`FragmentGuard::sanitize_or_fallback`]
//! (or [`FragmentGuard::sanitize_label`] for short labels) as the last step before it is
//! placed into a payload.

use std::collections::HashSet;

use log::debug;
use regex::Regex;

use crate::config::{EngineConfig, KeywordTable};
use crate::error::Result;
use crate::matcher::{substring_pattern, KeywordMatcher};
use crate::text::{
    char_len, collapse_whitespace, ends_with_ellipsis, ends_with_terminal, is_cjk, last_boundary,
    truncate_chars,
};

/// Trailing connector / particle tables, one per script.
#[derive(Debug, Clone, Default)]
pub(crate) struct TrailingWords {
    latin: HashSet<String>,
    latin_phrases: Vec<Vec<String>>,
    cjk: Vec<String>,
}

impl TrailingWords {
    pub(crate) fn new(table: &KeywordTable) -> Self {
        let mut latin = HashSet::new();
        let mut latin_phrases = Vec::new();
        for entry in &table.latin {
            let words: Vec<String> = entry.split_whitespace().map(str::to_lowercase).collect();
            match words.len() {
                0 => {}
                1 => {
                    latin.extend(words);
                }
                _ => latin_phrases.push(words),
            }
        }
        let mut cjk: Vec<String> = table
            .cjk
            .iter()
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect();
        cjk.sort_by_key(|entry| std::cmp::Reverse(char_len(entry)));
        Self {
            latin,
            latin_phrases,
            cjk,
        }
    }

    /// True when `text` is unterminated and its last word is a connector.
    ///
    /// A trailing ellipsis is looked through (`"ships with..."` dangles). Latin connectors
    /// only count in lower case, so `"Series A"` is a name rather than an article.
    pub(crate) fn ends_dangling(&self, text: &str) -> bool {
        if ends_with_terminal(text) {
            return false;
        }
        let stripped = text.trim_end_matches(|ch: char| {
            ch.is_whitespace()
                || matches!(
                    ch,
                    '.' | '…' | '。' | '．' | ',' | '，' | '、' | ':' | '：' | '-' | '—' | '"' | '”'
                        | '\'' | '’' | ')' | '）'
                )
        });
        let Some(last) = stripped.chars().last() else {
            return false;
        };
        if is_cjk(last) {
            return self.cjk.iter().any(|particle| stripped.ends_with(particle.as_str()));
        }

        let words: Vec<&str> = stripped
            .split(|ch: char| !(ch.is_alphanumeric() || ch == '\'' || ch == '-'))
            .filter(|word| !word.is_empty())
            .collect();
        let Some(last_word) = words.last() else {
            return false;
        };
        if last_word.chars().any(char::is_uppercase) {
            return false;
        }
        if self.latin.contains(*last_word) {
            return true;
        }
        self.latin_phrases.iter().any(|phrase| {
            words.len() >= phrase.len()
                && words[words.len() - phrase.len()..]
                    .iter()
                    .zip(phrase)
                    .all(|(word, expected)| word.to_lowercase() == *expected)
        })
    }
}

/// Detects truncated, dangling or templated text and trims or replaces it.
#[derive(Debug, Clone)]
pub struct FragmentGuard {
    short_chars: usize,
    dangling_max_chars: usize,
    trailing: TrailingWords,
    banned: Option<Regex>,
    entities: KeywordMatcher,
}

impl FragmentGuard {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let fragment = &config.fragment;
        Ok(Self {
            short_chars: fragment.short_chars,
            dangling_max_chars: fragment.dangling_max_chars,
            trailing: TrailingWords::new(&fragment.dangling),
            banned: substring_pattern("fragment.banned_templates", &fragment.banned_templates)?,
            entities: KeywordMatcher::compile("fragment.entities", &entity_table(config))?,
        })
    }

    /// Empty, too short to stand alone, or a short unterminated string ending on a connector.
    ///
    /// Short text still stands alone when it carries a digit, a URL or an entity: an
    /// ASCII name token, or a known entity, model family or domain term in either script
    /// (`阿里云发布通义千问`).
    #[must_use]
    pub fn is_fragment(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return true;
        }
        let len = char_len(text);
        if len < self.short_chars
            && !text.chars().any(|ch| ch.is_ascii_digit())
            && !has_url(text)
            && !has_entity_token(text)
            && !self.entities.is_match(text)
        {
            return true;
        }
        self.is_dangling(text)
    }

    fn is_dangling(&self, text: &str) -> bool {
        char_len(text) < self.dangling_max_chars
            && last_boundary(text).is_none()
            && self.trailing.ends_dangling(text)
    }

    /// Cut a truncated tail back to the last sentence boundary.
    ///
    /// Terminated text and text whose unterminated tail stands on its own are returned
    /// unchanged. Without any boundary the input comes back as is, unless the whole input
    /// is itself a dangling fragment, in which case the result is empty.
    #[must_use]
    pub fn trim_trailing_fragment(&self, text: &str) -> String {
        let text = text.trim();
        if text.is_empty() || ends_with_terminal(text) {
            return text.to_string();
        }
        let truncated = ends_with_ellipsis(text) || self.trailing.ends_dangling(text);
        match last_boundary(text) {
            Some(end) => {
                let tail = text[end..].trim();
                if truncated || self.is_fragment(tail) {
                    text[..end].trim_end().to_string()
                } else {
                    text.to_string()
                }
            }
            None if self.is_dangling(text) => String::new(),
            None => text.to_string(),
        }
    }

    /// First banned template string found in `text`, as it appears there.
    #[must_use]
    pub fn banned_hit(&self, text: &str) -> Option<String> {
        self.banned
            .as_ref()
            .and_then(|re| re.find(text))
            .map(|m| m.as_str().to_string())
    }

    #[must_use]
    pub fn is_clean(&self, text: &str) -> bool {
        !self.is_fragment(text) && self.banned_hit(text).is_none()
    }

    /// Remove every banned string, repeating until none is left.
    ///
    /// A single pass can splice a new occurrence together from the text around a removed
    /// one; every pass shrinks the string, so the loop ends.
    #[must_use]
    pub fn scrub_banned(&self, text: &str) -> String {
        let mut current = collapse_whitespace(text);
        let Some(re) = &self.banned else {
            return current;
        };
        while re.is_match(&current) {
            current = collapse_whitespace(&re.replace_all(&current, " "));
        }
        current
    }

    /// Trim `text`; when the result is still a fragment or carries a banned string, use
    /// the caller's fallback instead.
    ///
    /// The fallback is built from the same item's trustworthy fields, so it may carry item
    /// text too and is scrubbed before it is returned.
    pub fn sanitize_or_fallback(&self, text: &str, fallback: impl FnOnce() -> String) -> String {
        let candidate = self.trim_trailing_fragment(&collapse_whitespace(text));
        if self.is_clean(&candidate) {
            return candidate;
        }
        debug!(
            "fragment guard replaced {:?}",
            truncate_chars(&candidate, 40)
        );
        self.scrub_banned(&fallback())
    }

    /// Short labels (bucket names) skip the length rules and only lose banned strings.
    #[must_use]
    pub fn sanitize_label(&self, label: &str, default: &str) -> String {
        let scrubbed = self.scrub_banned(label);
        if scrubbed.is_empty() {
            return self.scrub_banned(default);
        }
        scrubbed
    }
}

/// Entity whitelist, CJK model families and CJK domain terms. Latin domain words are left
/// out: lowercase `model` or `ai` alone does not make a phrase stand on its own.
fn entity_table(config: &EngineConfig) -> KeywordTable {
    let whitelist = &config.relevance.entity_whitelist;
    let mut cjk = whitelist.cjk.clone();
    cjk.extend(config.anchors.model_roster_cjk.iter().cloned());
    cjk.extend(config.density.domain_keywords.cjk.iter().cloned());
    KeywordTable {
        latin: whitelist.latin.clone(),
        cjk,
    }
}

fn has_url(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("http://") || lower.contains("https://") || lower.contains("www.")
}

/// `GPT`, `OpenAI`, `H100`, or a capitalised word that does not open the text.
fn has_entity_token(text: &str) -> bool {
    text.split(|ch: char| !ch.is_ascii_alphanumeric())
        .enumerate()
        .filter(|(_, token)| token.len() >= 2)
        .any(|(idx, token)| {
            let upper = token.chars().filter(char::is_ascii_uppercase).count();
            let digits = token.chars().any(|ch| ch.is_ascii_digit());
            let alpha = token.chars().any(|ch| ch.is_ascii_alphabetic());
            upper >= 2
                || (digits && alpha)
                || (idx > 0 && token.len() >= 3 && token.starts_with(|ch: char| ch.is_ascii_uppercase()))
        })
}
