//! Dates, source labels and the dated proof line.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;

use crate::error::Result;
use crate::matcher::compile_pattern;
use crate::templates::UNNAMED_SOURCE;
use crate::text::{collapse_whitespace, url_host};

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of "today" for items with no usable timestamp.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Current UTC date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Always the same date. Used by tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parses the many timestamp shapes crawlers emit.
#[derive(Debug, Clone)]
pub struct DateParser {
    numeric: Regex,
    cjk: Regex,
}

impl DateParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            numeric: compile_pattern(
                "proof.numeric_date",
                r"([0-9]{4})[-/.]([0-9]{1,2})[-/.]([0-9]{1,2})",
            )?,
            cjk: compile_pattern(
                "proof.cjk_date",
                r"([0-9]{4})\s*年\s*([0-9]{1,2})\s*月\s*([0-9]{1,2})\s*日",
            )?,
        })
    }

    /// RFC 3339, RFC 2822, Unix seconds or milliseconds, `YYYY-MM-DD`, `YYYY/MM/DD`,
    /// `YYYY年M月D日`, or any of those embedded in longer text.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.date_naive());
        }
        if let Ok(parsed) = DateTime::parse_from_rfc2822(raw) {
            return Some(parsed.date_naive());
        }
        if raw.len() >= 9 && raw.chars().all(|ch| ch.is_ascii_digit()) {
            let value: i64 = raw.parse().ok()?;
            let seconds = if raw.len() >= 13 { value / 1000 } else { value };
            return DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive());
        }
        [&self.numeric, &self.cjk].into_iter().find_map(|re| {
            re.captures_iter(raw).find_map(|caps| {
                let year = caps.get(1)?.as_str().parse().ok()?;
                let month = caps.get(2)?.as_str().parse().ok()?;
                let day = caps.get(3)?.as_str().parse().ok()?;
                NaiveDate::from_ymd_opt(year, month, day)
            })
        })
    }

    /// `published` first, then `collected`, then the clock: a date always comes back.
    #[must_use]
    pub fn resolve(&self, published: &str, collected: Option<&str>, clock: &dyn Clock) -> NaiveDate {
        self.parse(published)
            .or_else(|| collected.and_then(|raw| self.parse(raw)))
            .unwrap_or_else(|| clock.today())
    }
}

/// Source name, else the URL host, else the unnamed-source label.
#[must_use]
pub fn source_label(source_name: &str, url: &str) -> String {
    let name = collapse_whitespace(source_name);
    if !name.is_empty() {
        return name;
    }
    url_host(url).unwrap_or_else(|| UNNAMED_SOURCE.to_string())
}

/// `"{token}｜{source}（{date}）"`, or without the token when none was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofLine<'a> {
    pub token: Option<&'a str>,
    pub source: &'a str,
    pub date: NaiveDate,
}

impl fmt::Display for ProofLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.date.format(ISO_DATE_FORMAT);
        match self.token {
            Some(token) => write!(f, "{token}｜{}（{date}）", self.source),
            None => write!(f, "{}（{date}）", self.source),
        }
    }
}
