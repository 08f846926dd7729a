use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context as AnyhowContext, Result};
use brief_engine::Engine;
use brief_protocol::{
    Anchor, AnchorSet, ChannelScores, ContentKind, DensityBreakdown, GateDecision,
    RelevanceVerdict,
};
use clap::Args;
use serde::Serialize;

use crate::{load_config, read_stdin};

#[derive(Args)]
pub(crate) struct ScoreArgs {
    /// Body text to score (reads stdin when omitted)
    text: Option<String>,

    /// Title, scored together with the body
    #[arg(long, default_value = "")]
    title: String,

    /// Source URL (drives URL-domain channel boosts)
    #[arg(long, default_value = "")]
    url: String,

    /// Engine configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Every per-text signal the engine derives, for operators tuning tables.
#[derive(Debug, Serialize)]
struct Diagnosis {
    density: DensityBreakdown,
    gates: BTreeMap<&'static str, GateDecision>,
    channels: ChannelScores,
    relevance: RelevanceVerdict,
    anchors: AnchorSet,
    primary: Option<Anchor>,
    fragment: bool,
}

pub(crate) fn run(args: ScoreArgs) -> Result<()> {
    let engine = Engine::new(load_config(args.config.as_deref())?)
        .context("Invalid engine configuration")?;
    let body = match args.text {
        Some(text) => text,
        None => read_stdin()?,
    };
    if body.trim().is_empty() && args.title.trim().is_empty() {
        bail!("Nothing to score: pass a text argument or pipe it on stdin");
    }
    let diagnosis = diagnose(&engine, &args.title, &body, &args.url);
    println!("{}", serde_json::to_string_pretty(&diagnosis)?);
    Ok(())
}

fn diagnose(engine: &Engine, title: &str, body: &str, url: &str) -> Diagnosis {
    let combined = brief_protocol::CandidateText::new(title, body).combined();
    let density = engine.score_density(&combined);
    let gates = ContentKind::ALL
        .into_iter()
        .map(|kind| (kind.as_str(), engine.gate(&density, kind)))
        .collect();
    let anchors = engine.extract_anchors(title, body);
    let primary = engine.pick_primary(&anchors).cloned();
    Diagnosis {
        density,
        gates,
        channels: engine.classify_channels(&combined, url),
        relevance: engine.is_relevant(&combined, url),
        fragment: engine.is_fragment(&combined),
        anchors,
        primary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_engine::EngineConfig;

    #[test]
    fn diagnosis_covers_every_kind() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let diagnosis = diagnose(
            &engine,
            "OpenAI launches GPT-5",
            "OpenAI launched GPT-5 with 70B parameters.",
            "https://github.com/openai",
        );
        assert_eq!(diagnosis.gates.len(), ContentKind::ALL.len());
        assert!(diagnosis.anchors.has_anchor);
        assert!(diagnosis.primary.is_some());
        assert!(diagnosis
            .channels
            .reasons
            .iter()
            .any(|reason| reason.starts_with("url:github.com")));
        assert!(!diagnosis.fragment);
    }
}
