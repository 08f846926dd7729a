//! Script-aware string helpers shared by every component.

use unicode_segmentation::UnicodeSegmentation;

const TERMINALS: &[char] = &['.', '!', '?', '。', '！', '？', '．'];
const CLOSERS: &[char] = &['"', '\'', '”', '’', '」', '』', ')', '）', ']', '】'];
const ELLIPSES: &[&str] = &["...", "…", "。。。", "．．．"];

/// CJK ideographs, kana and hangul: scripts matched without word boundaries.
#[must_use]
pub fn is_cjk(ch: char) -> bool {
    matches!(
        ch as u32,
        0x3040..=0x30FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xAC00..=0xD7AF
            | 0xF900..=0xFAFF
            | 0x20000..=0x2A6DF
    )
}

#[must_use]
pub fn is_han(ch: char) -> bool {
    matches!(
        ch as u32,
        0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0x20000..=0x2A6DF
    )
}

#[must_use]
pub fn is_cjk_punct(ch: char) -> bool {
    matches!(
        ch,
        '。' | '，' | '、' | '；' | '：' | '！' | '？' | '」' | '』' | '）' | '】' | '”'
    )
}

/// Share of Han characters among Han plus other alphabetic characters.
///
/// Digits, punctuation and whitespace are neutral so numeric facts never drag a
/// Chinese sentence below a script floor.
#[must_use]
pub fn cjk_ratio(text: &str) -> f64 {
    let mut han = 0usize;
    let mut other = 0usize;
    for ch in text.chars() {
        if is_han(ch) {
            han += 1;
        } else if ch.is_alphabetic() {
            other += 1;
        }
    }
    if han + other == 0 {
        return 0.0;
    }
    han as f64 / (han + other) as f64
}

#[must_use]
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_closers(text: &str) -> &str {
    text.trim_end().trim_end_matches(CLOSERS).trim_end()
}

#[must_use]
pub fn ends_with_ellipsis(text: &str) -> bool {
    let text = strip_closers(text);
    ELLIPSES.iter().any(|ellipsis| text.ends_with(ellipsis))
}

/// Ends on sentence-terminating punctuation (an ellipsis does not count).
#[must_use]
pub fn ends_with_terminal(text: &str) -> bool {
    let text = strip_closers(text);
    if ends_with_ellipsis(text) {
        return false;
    }
    text.chars().last().is_some_and(|ch| TERMINALS.contains(&ch))
}

/// Byte offset just past the last sentence boundary, ignoring ellipses and decimal points.
#[must_use]
pub fn last_boundary(text: &str) -> Option<usize> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut idx = chars.len();
    while idx > 0 {
        idx -= 1;
        let (offset, ch) = chars[idx];
        if !TERMINALS.contains(&ch) {
            continue;
        }
        let prev = idx.checked_sub(1).map(|i| chars[i].1);
        let next = chars.get(idx + 1).map(|(_, c)| *c);
        if ch == '.' {
            let decimal = prev.is_some_and(|c| c.is_ascii_digit())
                && next.is_some_and(|c| c.is_ascii_digit());
            let dotted_run = prev == Some('.') || next == Some('.');
            if decimal || dotted_run {
                continue;
            }
            // Latin full stops only close a sentence before whitespace or the end.
            if next.is_some_and(|c| !c.is_whitespace() && !CLOSERS.contains(&c)) {
                continue;
            }
        }
        if ch == '。' && (prev == Some('。') || next == Some('。')) {
            continue;
        }
        let mut end = offset + ch.len_utf8();
        let mut follow = idx + 1;
        while let Some((off, c)) = chars.get(follow) {
            if !CLOSERS.contains(c) {
                break;
            }
            end = off + c.len_utf8();
            follow += 1;
        }
        return Some(end);
    }
    None
}

/// Split prose into sentence-like units (UAX #29 sentence boundaries).
///
/// When the text has no terminator at all, falls back to newline and semicolon
/// splitting. Units are trimmed; empty ones are dropped.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let has_terminal = text.chars().any(|ch| TERMINALS.contains(&ch));
    if !has_terminal {
        return text
            .split(['\n', ';', '；'])
            .map(|unit| collapse_whitespace(unit))
            .filter(|unit| !unit.is_empty())
            .collect();
    }
    text.split_sentence_bounds()
        .flat_map(|unit| unit.split('\n'))
        .map(collapse_whitespace)
        .filter(|unit| !unit.is_empty())
        .collect()
}

/// Raw terminator-delimited units, as counted by the density scorer.
///
/// Every terminator character splits, decimal points included; this is the coarse unit
/// the density thresholds were tuned on.
#[must_use]
pub fn terminator_units(text: &str) -> Vec<&str> {
    text.split(|ch: char| TERMINALS.contains(&ch) || matches!(ch, ';' | '；' | '\n'))
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .collect()
}

/// True when the match at `start..end` is not glued to ASCII letters or digits.
///
/// Only edges that are themselves ASCII alphanumeric are checked, so a CJK match may
/// sit directly next to Latin text.
#[must_use]
pub fn ascii_bounded(text: &str, start: usize, end: usize) -> bool {
    let slice = &text[start..end];
    let first = slice.chars().next();
    let last = slice.chars().last();
    let before = text[..start].chars().last();
    let after = text[end..].chars().next();
    let glued = |edge: Option<char>, neighbour: Option<char>| {
        edge.is_some_and(|c| c.is_ascii_alphanumeric())
            && neighbour.is_some_and(|c| c.is_ascii_alphanumeric())
    };
    !glued(first, before) && !glued(last, after)
}

/// Truncate to at most `max` chars, preferring a whitespace or punctuation cut.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    let text = text.trim();
    if char_len(text) <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    let floor = max / 2;
    let soft = cut
        .char_indices()
        .filter(|(idx, ch)| {
            *idx > 0 && (ch.is_whitespace() || matches!(*ch, ',' | '，' | '、' | ':' | '：'))
        })
        .map(|(idx, _)| idx)
        .filter(|idx| cut[..*idx].chars().count() >= floor)
        .last();
    match soft {
        Some(idx) => cut[..idx].trim_end().to_string(),
        None => cut.trim_end().to_string(),
    }
}

/// Host part of a URL, lowercased, without `www.`.
#[must_use]
pub fn url_host(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("")
        .rsplit('@')
        .next()
        .unwrap_or("")
        .split(':')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.is_empty() || !host.contains('.') {
        return None;
    }
    Some(host)
}
