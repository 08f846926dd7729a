//! Shared data model for the brief engine.
//!
//! Every type here crosses a process or crate boundary: the ingestion collaborator
//! produces [`NewsItem`] records, the engine derives the diagnostic types, and renderers
//! consume [`CanonicalPayload`]. All of them serialize as snake_case JSON.

mod item;
mod payload;
mod signals;
mod stats;

pub use item::{CandidateText, ContentKind, NewsItem};
pub use payload::{CanonicalPayload, ACTION_SLOTS, RISK_SLOTS};
pub use signals::{
    Anchor, AnchorSet, AnchorType, Channel, ChannelScores, DensityBreakdown, GateDecision,
    GateReason, RelevanceVerdict,
};
pub use stats::StatsSnapshot;

/// Schema version of [`CanonicalPayload`]; bump on any field change renderers can observe.
pub const PAYLOAD_SCHEMA_VERSION: u32 = 1;
