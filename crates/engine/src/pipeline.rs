//! Per-item pipeline: gates, analysis and the memoised payload.

use std::fmt;
use std::sync::Arc;

use brief_protocol::{
    Anchor, AnchorSet, CanonicalPayload, Channel, ChannelScores, ContentKind, DensityBreakdown,
    GateDecision, NewsItem, RelevanceVerdict,
};
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::anchor::AnchorExtractor;
use crate::channel::ChannelClassifier;
use crate::compactor::NarrativeCompactor;
use crate::config::EngineConfig;
use crate::density::DensityScorer;
use crate::error::Result;
use crate::fragment::FragmentGuard;
use crate::payload::PayloadComposer;
use crate::proof::{Clock, DateParser, SystemClock};
use crate::similarity::{SequenceRatio, Similarity};
use crate::stats::RunStats;

const DERIVED_ID_HEX_CHARS: usize = 16;

/// Stable identity of one item: the collaborator's id, else a digest of its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    #[must_use]
    pub fn of(item: &NewsItem) -> Self {
        if let Some(id) = item.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            return Self(id.to_string());
        }
        let text = &item.text;
        let mut hasher = Sha256::new();
        for part in [&text.url, &text.title, &text.published_date] {
            hasher.update(part.trim().as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();
        let hex: String = digest
            .iter()
            .take(DERIVED_ID_HEX_CHARS / 2)
            .map(|byte| format!("{byte:02x}"))
            .collect();
        Self(hex)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An item plus its payload slot. The slot is filled at most once per card;
/// [`Card::evict`] is the only way to force a rebuild.
#[derive(Debug, Clone)]
pub struct Card {
    id: ItemId,
    item: NewsItem,
    payload: OnceCell<Arc<CanonicalPayload>>,
}

impl Card {
    #[must_use]
    pub fn new(item: NewsItem) -> Self {
        Self {
            id: ItemId::of(&item),
            item,
            payload: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn item(&self) -> &NewsItem {
        &self.item
    }

    #[must_use]
    pub fn cached(&self) -> Option<Arc<CanonicalPayload>> {
        self.payload.get().cloned()
    }

    pub fn evict(&mut self) -> Option<Arc<CanonicalPayload>> {
        self.payload.take()
    }
}

/// Where an item stands in the pipeline. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStage {
    Unprocessed,
    Densified,
    Classified,
    Anchored,
    Compacted,
    Terminal,
}

/// Everything [`Engine::evaluate`] learned about one item.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub id: ItemId,
    pub stages: Vec<ItemStage>,
    pub density: DensityBreakdown,
    pub gate: GateDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<ChannelScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<RelevanceVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchors: Option<AnchorSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Arc<CanonicalPayload>>,
    /// `density:<reason>` or `relevance:<reason>` for rejected items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
}

impl Evaluation {
    fn start(id: ItemId) -> Self {
        Self {
            id,
            stages: vec![ItemStage::Unprocessed],
            density: DensityBreakdown::default(),
            gate: GateDecision::default(),
            channels: None,
            relevance: None,
            anchors: None,
            payload: None,
            rejection: None,
        }
    }

    fn advance(&mut self, stage: ItemStage) {
        debug_assert!(self.stage() < stage, "pipeline stages only move forward");
        debug!("{}: {:?}", self.id, stage);
        self.stages.push(stage);
    }

    fn reject(mut self, rejection: String) -> Self {
        info!("{}: rejected ({rejection})", self.id);
        self.rejection = Some(rejection);
        self.advance(ItemStage::Terminal);
        self
    }

    #[must_use]
    pub fn stage(&self) -> ItemStage {
        self.stages.last().copied().unwrap_or(ItemStage::Unprocessed)
    }

    #[must_use]
    pub fn accepted(&self) -> bool {
        self.payload.is_some()
    }
}

/// All five components built from one [`EngineConfig`], plus the run statistics.
///
/// `Engine` is `Sync`: share one instance across worker threads, give each item its
/// own [`Card`].
pub struct Engine {
    config: EngineConfig,
    density: DensityScorer,
    guard: FragmentGuard,
    channels: ChannelClassifier,
    anchors: AnchorExtractor,
    compactor: NarrativeCompactor,
    dates: DateParser,
    clock: Arc<dyn Clock>,
    stats: RunStats,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("compactor", &self.compactor)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_similarity(config, Arc::new(SequenceRatio))
    }

    pub fn with_similarity(config: EngineConfig, similarity: Arc<dyn Similarity>) -> Result<Self> {
        config.validate()?;
        warn_suspicious(&config);
        Ok(Self {
            density: DensityScorer::new(&config)?,
            guard: FragmentGuard::new(&config)?,
            channels: ChannelClassifier::new(&config)?,
            anchors: AnchorExtractor::new(&config)?,
            compactor: NarrativeCompactor::new(&config, similarity)?,
            dates: DateParser::new()?,
            clock: Arc::new(SystemClock),
            stats: RunStats::new(),
            config,
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    #[must_use]
    pub fn compactor(&self) -> &NarrativeCompactor {
        &self.compactor
    }

    #[must_use]
    pub fn score_density(&self, text: &str) -> DensityBreakdown {
        self.density.score(text)
    }

    #[must_use]
    pub fn gate(&self, breakdown: &DensityBreakdown, kind: ContentKind) -> GateDecision {
        self.density.gate(breakdown, kind)
    }

    #[must_use]
    pub fn classify_channels(&self, text: &str, url: &str) -> ChannelScores {
        self.channels.classify(text, url)
    }

    #[must_use]
    pub fn is_relevant(&self, text: &str, url: &str) -> RelevanceVerdict {
        self.channels.is_relevant(text, url)
    }

    #[must_use]
    pub fn extract_anchors(&self, title: &str, body: &str) -> AnchorSet {
        self.anchors.extract(title, body)
    }

    #[must_use]
    pub fn pick_primary<'a>(&self, anchors: &'a AnchorSet) -> Option<&'a Anchor> {
        self.anchors.pick_primary(anchors)
    }

    #[must_use]
    pub fn is_fragment(&self, text: &str) -> bool {
        self.guard.is_fragment(text)
    }

    #[must_use]
    pub fn trim_trailing_fragment(&self, text: &str) -> String {
        self.guard.trim_trailing_fragment(text)
    }

    #[must_use]
    pub fn sanitize_or_fallback(&self, text: &str, fallback: impl FnOnce() -> String) -> String {
        self.guard.sanitize_or_fallback(text, fallback)
    }

    /// The item's payload, built on first use and returned from the card afterwards.
    ///
    /// Always succeeds; gates are not consulted. Statistics count the build once.
    pub fn build_payload(&self, card: &Card) -> Arc<CanonicalPayload> {
        Arc::clone(card.payload.get_or_init(|| {
            let text = &card.item.text;
            let channels = self.channels.classify(&text.combined(), &text.url);
            let anchors = self.anchors.extract(&text.title, &text.body);
            self.compose(card, &channels, &anchors)
        }))
    }

    /// Run the gates in order and build the payload only for items that pass both.
    pub fn evaluate(&self, card: &Card) -> Evaluation {
        let mut eval = Evaluation::start(card.id.clone());
        let text = &card.item.text;
        let combined = text.combined();

        eval.density = self.density.score(&combined);
        eval.gate = self.density.gate(&eval.density, card.item.kind);
        eval.advance(ItemStage::Densified);
        if !eval.gate.passed {
            self.stats.record_density_rejection();
            let reason = format!("density:{}", eval.gate.reason.as_str());
            return eval.reject(reason);
        }

        let channels = self.channels.classify(&combined, &text.url);
        let relevance = self.channels.relevance_with(&combined, &channels);
        eval.advance(ItemStage::Classified);
        if !relevance.relevant {
            self.stats.record_relevance_rejection();
            let reason = format!("relevance:{}", relevance.code());
            eval.channels = Some(channels);
            eval.relevance = Some(relevance);
            return eval.reject(reason);
        }

        let anchors = self.anchors.extract(&text.title, &text.body);
        eval.advance(ItemStage::Anchored);

        let payload = Arc::clone(
            card.payload
                .get_or_init(|| self.compose(card, &channels, &anchors)),
        );
        eval.channels = Some(channels);
        eval.relevance = Some(relevance);
        eval.anchors = Some(anchors);
        eval.payload = Some(payload);
        eval.advance(ItemStage::Compacted);
        eval.advance(ItemStage::Terminal);
        eval
    }

    fn compose(&self, card: &Card, channels: &ChannelScores, anchors: &AnchorSet) -> Arc<CanonicalPayload> {
        let composer = PayloadComposer {
            guard: &self.guard,
            extractor: &self.anchors,
            compactor: &self.compactor,
            density: &self.density,
            dates: &self.dates,
            clock: self.clock.as_ref(),
            config: &self.config.compaction,
        };
        let composed = composer.compose(card.id.as_str(), &card.item, channels, anchors);
        self.stats.record_payload(
            composed.has_anchor,
            composed.primary_chars,
            composed.citation_present,
        );
        debug!(
            "{}: payload built (channel={}, anchors={}, citation={})",
            card.id,
            channels.best_channel.as_str(),
            anchors.anchors.len(),
            composed.citation_present
        );
        Arc::new(composed.payload)
    }
}

fn warn_suspicious(config: &EngineConfig) {
    for channel in Channel::ALL {
        if config.channels.table(channel).is_empty() {
            warn!(
                "channel table {:?} is empty; it can only win through URL boosts",
                channel.as_str()
            );
        }
    }
    if config.relevance.core_domain.is_empty() {
        warn!("relevance.core_domain is empty; only whitelisted items will pass relevance");
    }
    if config.fragment.banned_templates.is_empty() {
        warn!("fragment.banned_templates is empty; no template leakage will be caught");
    }
}
