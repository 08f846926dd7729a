use regex::{Regex, RegexBuilder};

use crate::config::KeywordTable;
use crate::error::{EngineError, Result};
use crate::text::ascii_bounded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaseMode {
    Insensitive,
    Sensitive,
}

/// Compiled form of a [`KeywordTable`].
///
/// Latin keywords are matched on ASCII word boundaries (checked after matching, so a
/// keyword glued to CJK text still counts); CJK keywords match anywhere. Alternations are
/// ordered longest-first so multi-word phrases win over their prefixes.
#[derive(Debug, Clone)]
pub(crate) struct KeywordMatcher {
    latin: Option<Regex>,
    cjk: Option<Regex>,
}

impl KeywordMatcher {
    pub(crate) fn compile(table_name: &str, table: &KeywordTable) -> Result<Self> {
        Self::compile_with(table_name, table, CaseMode::Insensitive)
    }

    pub(crate) fn compile_with(table_name: &str, table: &KeywordTable, case: CaseMode) -> Result<Self> {
        let latin = alternation(&table.latin)
            .map(|alt| build(table_name, &alt, case))
            .transpose()?;
        let cjk = alternation(&table.cjk)
            .map(|alt| build(table_name, &alt, CaseMode::Sensitive))
            .transpose()?;
        Ok(Self { latin, cjk })
    }

    pub(crate) fn from_words(table_name: &str, words: &[String], case: CaseMode) -> Result<Self> {
        let table = KeywordTable {
            latin: words.to_vec(),
            cjk: Vec::new(),
        };
        Self::compile_with(table_name, &table, case)
    }

    /// Every match as a verbatim slice of `text`, Latin matches first.
    pub(crate) fn find_all<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut out = Vec::new();
        if let Some(re) = &self.latin {
            out.extend(
                re.find_iter(text)
                    .filter(|m| ascii_bounded(text, m.start(), m.end()))
                    .map(|m| m.as_str()),
            );
        }
        if let Some(re) = &self.cjk {
            out.extend(re.find_iter(text).map(|m| m.as_str()));
        }
        out
    }

    pub(crate) fn count(&self, text: &str) -> usize {
        self.find_all(text).len()
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        if let Some(re) = &self.latin {
            if re
                .find_iter(text)
                .any(|m| ascii_bounded(text, m.start(), m.end()))
            {
                return true;
            }
        }
        self.cjk.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// First match, for operator-facing reasons.
    pub(crate) fn first(&self, text: &str) -> Option<String> {
        self.find_all(text).first().map(|m| (*m).to_string())
    }
}

pub(crate) fn alternation(words: &[String]) -> Option<String> {
    let mut words: Vec<&str> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    words.dedup();
    let escaped: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    Some(format!("(?:{})", escaped.join("|")))
}

fn build(table_name: &str, pattern: &str, case: CaseMode) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case == CaseMode::Insensitive)
        .build()
        .map_err(|err| EngineError::pattern(table_name, err))
}

/// Case-insensitive plain-substring matcher over `words`; `None` for an empty list.
pub(crate) fn substring_pattern(table_name: &str, words: &[String]) -> Result<Option<Regex>> {
    alternation(words)
        .map(|alt| build(table_name, &alt, CaseMode::Insensitive))
        .transpose()
}

/// Compile a fixed pattern owned by a component.
pub(crate) fn compile_pattern(table_name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| EngineError::pattern(table_name, err))
}
