//! Pluggable sentence similarity used by near-duplicate removal.

use std::collections::{HashMap, HashSet};

use unicode_segmentation::UnicodeSegmentation;

/// Longest input (in normalised chars) compared with the quadratic LCS. Longer pairs are
/// scored with bigram Dice over their whole length, so no tail is ever ignored.
const MAX_LCS_CHARS: usize = 2000;

/// Symmetric similarity in `0.0..=1.0`.
pub trait Similarity: Send + Sync {
    fn ratio(&self, a: &str, b: &str) -> f64;

    fn name(&self) -> &'static str;
}

fn normalized_chars(text: &str) -> Vec<char> {
    text.chars()
        .filter(|ch| ch.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Dice coefficient over the character `n`-gram multisets of two normalised strings.
fn ngram_dice(a: &[char], b: &[char], n: usize) -> f64 {
    let a = ngrams(a, n);
    let b = ngrams(b, n);
    let total: usize = a.values().sum::<usize>() + b.values().sum::<usize>();
    if total == 0 {
        return 1.0;
    }
    let shared: usize = a
        .iter()
        .map(|(gram, count)| (*count).min(b.get(gram).copied().unwrap_or(0)))
        .sum();
    (2 * shared) as f64 / total as f64
}

fn ngrams(chars: &[char], n: usize) -> HashMap<&[char], usize> {
    let mut grams = HashMap::new();
    if chars.len() < n {
        if !chars.is_empty() {
            grams.insert(chars, 1);
        }
        return grams;
    }
    for window in chars.windows(n) {
        *grams.entry(window).or_insert(0) += 1;
    }
    grams
}

/// `2·LCS / (|a| + |b|)` over lowercased alphanumeric characters.
///
/// Close to an edit-distance ratio, works for unspaced scripts, and ignores punctuation
/// differences between otherwise identical sentences.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl Similarity for SequenceRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        let a = normalized_chars(a);
        let b = normalized_chars(b);
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        if a.len().max(b.len()) > MAX_LCS_CHARS {
            return ngram_dice(&a, &b, 2);
        }
        let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
        let mut prev = vec![0usize; short.len() + 1];
        let mut curr = vec![0usize; short.len() + 1];
        for lc in long.iter() {
            for (j, sc) in short.iter().enumerate() {
                curr[j + 1] = if lc == sc {
                    prev[j] + 1
                } else {
                    prev[j + 1].max(curr[j])
                };
            }
            std::mem::swap(&mut prev, &mut curr);
        }
        let lcs = prev[short.len()];
        (2 * lcs) as f64 / total as f64
    }

    fn name(&self) -> &'static str {
        "sequence_ratio"
    }
}

/// Jaccard overlap of lowercased UAX #29 words.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenJaccard;

impl Similarity for TokenJaccard {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        let words = |text: &str| -> HashSet<String> {
            text.unicode_words().map(str::to_lowercase).collect()
        };
        let a = words(a);
        let b = words(b);
        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        let shared = a.intersection(&b).count();
        let union = a.union(&b).count();
        shared as f64 / union as f64
    }

    fn name(&self) -> &'static str {
        "token_jaccard"
    }
}

/// Sørensen–Dice coefficient over character n-gram multisets.
#[derive(Debug, Clone, Copy)]
pub struct CharNgramDice {
    n: usize,
}

impl CharNgramDice {
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self { n: n.max(1) }
    }
}

impl Default for CharNgramDice {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Similarity for CharNgramDice {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        ngram_dice(&normalized_chars(a), &normalized_chars(b), self.n)
    }

    fn name(&self) -> &'static str {
        "char_ngram_dice"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sequence_ratio_ignores_punctuation_and_case() {
        let r = SequenceRatio.ratio("OpenAI released GPT-5 today.", "openai released gpt5 today!");
        assert!((r - 1.0).abs() < f64::EPSILON, "{r}");
    }

    #[test]
    fn sequence_ratio_separates_different_sentences() {
        let r = SequenceRatio.ratio(
            "OpenAI released GPT-5 today.",
            "Pricing starts at $0.003 per 1K tokens.",
        );
        assert!(r < 0.6, "{r}");
    }

    #[test]
    fn sequence_ratio_handles_cjk() {
        let r = SequenceRatio.ratio("阿里发布通义千问新版本。", "阿里发布通义千问的新版本");
        assert!(r > 0.86, "{r}");
    }

    #[test]
    fn sequence_ratio_reads_past_a_long_shared_opening() {
        let opening = "The review board examined every clause of the merger filing in detail, ".repeat(8);
        let approved = format!("{opening}and the regulators approved the deal without conditions.");
        let blocked = format!("{opening}but the regulators blocked the deal over competition concerns.");
        let r = SequenceRatio.ratio(&approved, &blocked);
        assert!(r < 1.0, "{r}");
        assert!(SequenceRatio.ratio(&approved, &approved) == 1.0);
    }

    #[test]
    fn very_long_inputs_still_compare_their_tails() {
        let opening = "Benchmark results were published for every model size today. ".repeat(50);
        let a = format!("{opening}The largest model wins.");
        let b = format!("{opening}The smallest model loses badly on reasoning.");
        let r = SequenceRatio.ratio(&a, &b);
        assert!(r < 1.0, "{r}");
        assert!((SequenceRatio.ratio(&a, &b) - SequenceRatio.ratio(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn token_jaccard_counts_shared_words() {
        let r = TokenJaccard.ratio("a b c d", "a b c e");
        assert!((r - 0.6).abs() < 1e-9, "{r}");
    }

    #[test]
    fn ngram_dice_identical_is_one() {
        let dice = CharNgramDice::default();
        assert!((dice.ratio("hello world", "Hello, world") - 1.0).abs() < 1e-9);
        assert!(dice.ratio("abc", "xyz") < 1e-9);
    }

    proptest! {
        #[test]
        fn proptest_ratios_are_symmetric_and_bounded(a in "[a-z ]{0,40}", b in "[a-z ]{0,40}") {
            for sim in [&SequenceRatio as &dyn Similarity, &TokenJaccard, &CharNgramDice::default()] {
                let ab = sim.ratio(&a, &b);
                let ba = sim.ratio(&b, &a);
                prop_assert!((0.0..=1.0).contains(&ab));
                prop_assert!((ab - ba).abs() < 1e-9, "{} not symmetric", sim.name());
            }
        }
    }
}
