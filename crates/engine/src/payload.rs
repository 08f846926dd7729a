//! Assembly of the canonical five-field payload.

use brief_protocol::{
    Anchor, AnchorSet, CanonicalPayload, ChannelScores, ContentKind, NewsItem, ACTION_SLOTS,
    RISK_SLOTS,
};
use log::debug;

use crate::anchor::AnchorExtractor;
use crate::compactor::{Compaction, NarrativeCompactor};
use crate::config::CompactionConfig;
use crate::density::DensityScorer;
use crate::fragment::FragmentGuard;
use crate::proof::{source_label, Clock, DateParser, ProofLine, ISO_DATE_FORMAT};
use crate::templates::{
    anchor_lead, channel_impact, fallback_action, fallback_risk, fallback_title, framed_action,
    framed_risk, impact_detail, join_sentences, lead_detail, terminate, TemplateContext,
    UNNAMED_SOURCE,
};
use crate::text::{
    char_len, cjk_ratio, collapse_whitespace, split_sentences, truncate_chars,
};

/// Most anchors listed in the "verifiable data" impact sentence.
const MAX_LISTED_ANCHORS: usize = 3;
/// Leading tags stripped from titles (`【快讯】`, `[Update]`).
const TITLE_TAGS: &[(char, char)] = &[('【', '】'), ('[', ']'), ('〔', '〕')];
const TITLE_SEPARATORS: &[&str] = &[" | ", " - ", " – ", " — ", "｜", " _ "];
const MAX_SITE_SUFFIX_CHARS: usize = 30;

/// A payload plus the facts the run statistics need about it.
#[derive(Debug, Clone)]
pub(crate) struct Composed {
    pub payload: CanonicalPayload,
    pub has_anchor: bool,
    pub primary_chars: usize,
    pub citation_present: bool,
}

/// Builds [`CanonicalPayload`]s from an item and its analysis.
pub(crate) struct PayloadComposer<'e> {
    pub guard: &'e FragmentGuard,
    pub extractor: &'e AnchorExtractor,
    pub compactor: &'e NarrativeCompactor,
    pub density: &'e DensityScorer,
    pub dates: &'e DateParser,
    pub clock: &'e dyn Clock,
    pub config: &'e CompactionConfig,
}

impl PayloadComposer<'_> {
    pub fn compose(
        &self,
        id: &str,
        item: &NewsItem,
        channels: &ChannelScores,
        anchors: &AnchorSet,
    ) -> Composed {
        let text = &item.text;
        let date = self
            .dates
            .resolve(&text.published_date, text.collected_at.as_deref(), self.clock);
        let date_str = date.format(ISO_DATE_FORMAT).to_string();
        let source = source_label(&text.source_name, &text.url);
        let title_clean = self.title(&text.title, &text.body, &source, &date_str);
        let subject = subject_of(&title_clean, self.config.max_subject_chars);
        let ctx = TemplateContext {
            subject: &subject,
            source: &source,
            date: &date_str,
            channel: channels.best_channel,
        };

        let drafts: Vec<&str> = item
            .drafts
            .iter()
            .map(String::as_str)
            .filter(|draft| self.draft_is_trusted(draft))
            .collect();
        if drafts.len() < item.drafts.len() {
            debug!(
                "{id}: {} of {} drafts rejected",
                item.drafts.len() - drafts.len(),
                item.drafts.len()
            );
        }
        let mut pool: Vec<&str> = vec![item.summary.as_str()];
        pool.extend(drafts);
        pool.push(text.body.as_str());
        pool.extend(item.facts.iter().map(String::as_str));
        let compaction = self.compactor.compact(&pool);

        let primary = self.extractor.pick_primary(anchors);
        let citation = self.extractor.citation_token(anchors);

        let (lead, impact) = self.narrative(id, item, &ctx, &compaction, primary, anchors);
        let taken = [lead.as_str(), impact.as_str()];
        let actions = self.actions(item, &ctx, &compaction, taken);
        let risks = self.risks(item, &ctx, &compaction, taken);

        let proof = ProofLine {
            token: citation,
            source: &source,
            date,
        }
        .to_string();
        let proof_line = self.guard.sanitize_or_fallback(&proof, || {
            ProofLine {
                token: None,
                source: UNNAMED_SOURCE,
                date,
            }
            .to_string()
        });

        let channel_name = channels.best_channel.as_str();
        let bucket = self
            .guard
            .sanitize_label(item.bucket.as_deref().unwrap_or(channel_name), channel_name);

        let zh_ratio = cjk_ratio(&format!("{lead}{impact}"));
        let payload = CanonicalPayload {
            lead,
            impact,
            actions,
            risks,
            proof_line,
            title_clean,
            bucket,
            zh_ratio,
            dedup_ratio: compaction.dedup_ratio(),
        };
        Composed {
            payload,
            has_anchor: anchors.has_anchor,
            primary_chars: primary.map(|anchor| char_len(&anchor.text)).unwrap_or(0),
            citation_present: citation.is_some(),
        }
    }

    /// Drafts from the LLM collaborator are trusted only when they stand alone as text
    /// and pass the most permissive density gate on their own.
    fn draft_is_trusted(&self, draft: &str) -> bool {
        self.guard.is_clean(draft)
            && self
                .density
                .gate(&self.density.score(draft), ContentKind::Signal)
                .passed
    }

    fn title(&self, raw: &str, body: &str, source: &str, date: &str) -> String {
        let cleaned = clean_title(raw);
        self.guard.sanitize_or_fallback(&cleaned, || {
            split_sentences(body)
                .into_iter()
                .map(|sentence| {
                    self.guard
                        .trim_trailing_fragment(&truncate_chars(&sentence, self.config.max_subject_chars))
                })
                .find(|sentence| self.guard.is_clean(sentence))
                .unwrap_or_else(|| fallback_title(source, date))
        })
    }

    fn narrative(
        &self,
        id: &str,
        item: &NewsItem,
        ctx: &TemplateContext<'_>,
        compaction: &Compaction,
        primary: Option<&Anchor>,
        anchors: &AnchorSet,
    ) -> (String, String) {
        let selection = &compaction.selection;
        let selected = [selection.event.as_deref(), selection.impact.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let ratio = cjk_ratio(&selected);
        let use_selection = selection.event.is_some() && ratio >= self.config.lead_script_floor;
        if !use_selection {
            debug!("{id}: skeleton rebuild (script ratio {ratio:.2})");
        }
        let skeleton = self.skeleton_facts(item);

        let lead_first = self.guard.sanitize_or_fallback(
            &anchor_lead(ctx, primary.map(|anchor| (anchor.kind, anchor.text.as_str()))),
            || anchor_lead(ctx, None),
        );
        let lead_second = match (&selection.event, use_selection) {
            (Some(event), true) => event.clone(),
            _ => lead_detail(ctx, skeleton.first().map(String::as_str)),
        };
        let lead_second = self
            .guard
            .sanitize_or_fallback(&lead_second, || lead_detail(ctx, None));

        let impact_first = self
            .guard
            .sanitize_or_fallback(&channel_impact(ctx), || impact_detail(ctx, None, &[]));
        let impact_second = match (&selection.impact, use_selection) {
            (Some(impact), true) => impact.clone(),
            _ => {
                let listed: Vec<&str> = anchors.texts().take(MAX_LISTED_ANCHORS).collect();
                impact_detail(ctx, skeleton.get(1).map(String::as_str), &listed)
            }
        };
        let impact_second = self
            .guard
            .sanitize_or_fallback(&impact_second, || impact_detail(ctx, None, &[]));

        let lead = join_sentences(&lead_first, &lead_second);
        let impact = join_sentences(&impact_first, &impact_second);
        (
            self.guard.sanitize_or_fallback(&lead, || lead.clone()),
            self.guard.sanitize_or_fallback(&impact, || impact.clone()),
        )
    }

    /// Structured fields a skeleton rebuild may quote: facts, then summary sentences.
    fn skeleton_facts(&self, item: &NewsItem) -> Vec<String> {
        item.facts
            .iter()
            .map(|fact| collapse_whitespace(fact))
            .chain(split_sentences(&item.summary))
            .filter(|fact| {
                char_len(fact) >= self.config.min_sentence_chars && self.guard.is_clean(fact)
            })
            .collect()
    }

    fn actions(
        &self,
        item: &NewsItem,
        ctx: &TemplateContext<'_>,
        compaction: &Compaction,
        taken: [&str; 2],
    ) -> [String; ACTION_SLOTS] {
        let sources = item
            .observations
            .iter()
            .map(String::as_str)
            .chain(compaction.selection.next_step.as_deref())
            .chain(self.compactor.with_role(&compaction.kept, |roles| roles.next_step));
        let picked = self.pick_bullets(sources, &taken, ACTION_SLOTS, framed_action);
        std::array::from_fn(|slot| {
            let candidate = picked
                .get(slot)
                .cloned()
                .unwrap_or_else(|| fallback_action(ctx, slot));
            self.guard
                .sanitize_or_fallback(&candidate, || fallback_action(ctx, slot))
        })
    }

    fn risks(
        &self,
        item: &NewsItem,
        ctx: &TemplateContext<'_>,
        compaction: &Compaction,
        taken: [&str; 2],
    ) -> [String; RISK_SLOTS] {
        let sources = item
            .effects
            .iter()
            .map(String::as_str)
            .chain(self.compactor.with_role(&compaction.kept, |roles| roles.risk));
        let picked = self.pick_bullets(sources, &taken, RISK_SLOTS, framed_risk);
        std::array::from_fn(|slot| {
            let candidate = picked
                .get(slot)
                .cloned()
                .unwrap_or_else(|| fallback_risk(ctx, slot));
            self.guard
                .sanitize_or_fallback(&candidate, || fallback_risk(ctx, slot))
        })
    }

    /// Up to `slots` usable, mutually distinct bullets. Text below the bullet script floor
    /// gets a framing prefix in the target script.
    fn pick_bullets<'s>(
        &self,
        sources: impl Iterator<Item = &'s str>,
        taken: &[&str],
        slots: usize,
        frame: fn(&str) -> String,
    ) -> Vec<String> {
        let mut raw_picked: Vec<String> = Vec::new();
        let mut out = Vec::new();
        for source in sources {
            if out.len() == slots {
                break;
            }
            let text = self.guard.trim_trailing_fragment(&collapse_whitespace(source));
            if char_len(&text) < self.config.min_bullet_chars || !self.guard.is_clean(&text) {
                continue;
            }
            let seen = taken
                .iter()
                .any(|existing| existing.contains(text.as_str()))
                || raw_picked
                    .iter()
                    .any(|existing| self.compactor.is_duplicate(existing, &text));
            if seen {
                continue;
            }
            let bullet = if cjk_ratio(&text) < self.config.bullet_script_floor {
                frame(&text)
            } else {
                terminate(&text)
            };
            raw_picked.push(text);
            out.push(bullet);
        }
        out
    }
}

/// Strip leading bracket tags and a trailing site-name suffix; collapse whitespace.
#[must_use]
pub fn clean_title(raw: &str) -> String {
    let mut title = collapse_whitespace(raw);
    loop {
        let Some(&(_, close)) = TITLE_TAGS
            .iter()
            .find(|(open, _)| title.starts_with(*open))
        else {
            break;
        };
        match title.find(close) {
            Some(end) if !title[end + close.len_utf8()..].trim().is_empty() => {
                title = title[end + close.len_utf8()..].trim().to_string();
            }
            _ => break,
        }
    }
    for separator in TITLE_SEPARATORS {
        if let Some(idx) = title.rfind(separator) {
            let head = title[..idx].trim();
            let tail = title[idx + separator.len()..].trim();
            if !head.is_empty() && char_len(tail) <= MAX_SITE_SUFFIX_CHARS && char_len(head) > char_len(tail) {
                title = head.to_string();
                break;
            }
        }
    }
    title
}

/// Title text as it sits inside a template sentence: bounded and without a terminator.
fn subject_of(title: &str, max_chars: usize) -> String {
    truncate_chars(title, max_chars)
        .trim_end_matches(['.', '。', '!', '！', '?', '？', ',', '，', ';', '；', ':', '：', ' '])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_title_strips_tags_and_site_suffix() {
        assert_eq!(clean_title("【快讯】 阿里云发布通义千问3.0"), "阿里云发布通义千问3.0");
        assert_eq!(
            clean_title("[Update] OpenAI launches GPT-5 - The Verge"),
            "OpenAI launches GPT-5"
        );
        assert_eq!(clean_title("  Acme   raises $20M | TechCrunch "), "Acme raises $20M");
        assert_eq!(clean_title("[Update]"), "[Update]");
    }

    #[test]
    fn clean_title_keeps_meaningful_dashes() {
        assert_eq!(
            clean_title("GPT-5 - a long explanation of why this launch matters for everyone"),
            "GPT-5 - a long explanation of why this launch matters for everyone"
        );
    }

    #[test]
    fn subject_drops_terminator() {
        assert_eq!(subject_of("OpenAI launches GPT-5.", 80), "OpenAI launches GPT-5");
        assert_eq!(subject_of("阿里云发布新模型。", 80), "阿里云发布新模型");
    }
}
