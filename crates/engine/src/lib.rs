//! Content quality gates and narrative compaction for executive news briefs.
//!
//! ```text
//! NewsItem ─► density gate ─► channel + relevance ─► anchors ─► compactor ─► fragment guard
//!                 │                    │                                          │
//!                 └── density:<r>      └── relevance:<r>            CanonicalPayload (cached on the Card)
//! ```
//!
//! Everything is built once from an [`EngineConfig`]. After [`Engine::new`] succeeds no
//! operation returns an error: rejections and fallbacks come back as data.

mod anchor;
mod channel;
mod compactor;
mod config;
mod density;
mod error;
mod fragment;
mod matcher;
mod payload;
mod pipeline;
mod proof;
mod similarity;
mod stats;
mod templates;
pub mod text;
mod vocab;

pub use anchor::AnchorExtractor;
pub use channel::ChannelClassifier;
pub use compactor::{Compaction, NarrativeCompactor, Roles, Selection};
pub use config::{
    AnchorConfig, ChannelConfig, CompactionConfig, DensityConfig, EngineConfig, FragmentConfig,
    GateProfiles, GateThresholds, KeywordTable, RelevanceConfig, RoleTables, UrlBoost,
    MIN_BULLET_CHARS,
};
pub use density::DensityScorer;
pub use error::{EngineError, Result};
pub use fragment::FragmentGuard;
pub use payload::clean_title;
pub use pipeline::{Card, Engine, Evaluation, ItemId, ItemStage};
pub use proof::{source_label, Clock, DateParser, FixedClock, ProofLine, SystemClock, ISO_DATE_FORMAT};
pub use similarity::{CharNgramDice, SequenceRatio, Similarity, TokenJaccard};
pub use stats::RunStats;
