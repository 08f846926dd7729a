use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use brief_engine::EngineConfig;
use clap::{Args, Parser, Subcommand};

mod batch;
mod diagnose;

#[derive(Parser)]
#[command(name = "brief")]
#[command(about = "Quality gates and narrative compaction for news briefs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a JSONL file of news items and write one JSON record per item
    Run(batch::RunArgs),

    /// Show density, gates, channels, relevance and anchors for one text
    Score(diagnose::ScoreArgs),

    /// Print the JSON Schema of the canonical payload
    Schema,

    /// Print the effective engine configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// Engine configuration file (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Run(args) => batch::run(args)?,
        Commands::Score(args) => diagnose::run(args)?,
        Commands::Schema => print_schema()?,
        Commands::Config(args) => {
            let config = load_config(args.config.as_deref())?;
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}

/// The file at `path`, or the built-in defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Whole stdin as a string; used when no input file or text argument is given.
pub(crate) fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read stdin")?;
    Ok(buf)
}

fn print_schema() -> Result<()> {
    let schema = schemars::schema_for!(brief_protocol::CanonicalPayload);
    let mut value = serde_json::to_value(&schema)?;
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "x-schema-version".to_string(),
            serde_json::json!(brief_protocol::PAYLOAD_SCHEMA_VERSION),
        );
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
