use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use brief_engine::{Card, Engine, Evaluation};
use brief_protocol::{NewsItem, StatsSnapshot, PAYLOAD_SCHEMA_VERSION};
use clap::Args;
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::{load_config, read_stdin};

#[derive(Args)]
pub(crate) struct RunArgs {
    /// JSONL file with one news item per line ("-" or omitted reads stdin)
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Write JSONL records here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Write the run summary (JSON) to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Engine configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long, short)]
    jobs: Option<usize>,

    /// Only emit records for items that produced a payload
    #[arg(long)]
    accepted_only: bool,
}

/// Run-level report written at the end of a batch.
#[derive(Debug, Serialize)]
pub(crate) struct RunSummary {
    pub schema_version: u32,
    pub lines: usize,
    pub malformed: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub stats: StatsSnapshot,
    pub mean_anchor_chars: f64,
}

pub(crate) fn run(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let engine = Engine::new(config).context("Invalid engine configuration")?;

    let raw = match args.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => read_stdin()?,
    };
    let (cards, lines, malformed) = parse_items(&raw);

    let mut pool = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        pool = pool.num_threads(jobs.max(1));
    }
    let pool = pool.build().context("Failed to start worker pool")?;

    engine.stats().reset();
    let evaluations: Vec<Evaluation> = pool.install(|| {
        cards
            .par_iter()
            .map(|card| engine.evaluate(card))
            .collect()
    });

    write_records(&evaluations, args.output.as_deref(), args.accepted_only)?;

    let accepted = evaluations.iter().filter(|eval| eval.accepted()).count();
    let stats = engine.stats().snapshot();
    let summary = RunSummary {
        schema_version: PAYLOAD_SCHEMA_VERSION,
        lines,
        malformed,
        accepted,
        rejected: evaluations.len() - accepted,
        stats,
        mean_anchor_chars: stats.mean_anchor_chars(),
    };
    info!(
        "processed {} items: {} accepted, {} rejected (density {}, relevance {}), {} malformed",
        evaluations.len(),
        summary.accepted,
        summary.rejected,
        stats.rejected_density,
        stats.rejected_relevance,
        summary.malformed
    );
    if let Some(path) = &args.summary {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Cards for every line that parses; blank lines are skipped, broken ones counted.
fn parse_items(raw: &str) -> (Vec<Card>, usize, usize) {
    let mut cards = Vec::new();
    let mut lines = 0;
    let mut malformed = 0;
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        lines += 1;
        match serde_json::from_str::<NewsItem>(line) {
            Ok(item) => cards.push(Card::new(item)),
            Err(err) => {
                malformed += 1;
                warn!("line {}: skipping malformed item: {err}", idx + 1);
            }
        }
    }
    (cards, lines, malformed)
}

fn write_records(
    evaluations: &[Evaluation],
    output: Option<&Path>,
    accepted_only: bool,
) -> Result<()> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = BufWriter::new(sink);
    for eval in evaluations {
        if accepted_only && !eval.accepted() {
            continue;
        }
        serde_json::to_writer(&mut sink, eval)?;
        sink.write_all(b"\n")?;
    }
    sink.flush().context("Failed to flush records")?;
    Ok(())
}
