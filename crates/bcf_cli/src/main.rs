//! `bcf` command-line front end over `bcf_core`.
//!
//! # Responsibility
//! - Inspect BCF archives (`list`) and rewrite them through the codec (`repack`).
//! - Keep output deterministic: topics print in archive order.

use anyhow::{Context, Result};
use bcf_core::{
    BcfArchive, BcfRegistry, CodecOptions, CodecWarning, LogConfig, LogLevel, MarkupDocument,
    VisualizationInfoDocument,
};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

type Codec = BcfArchive<MarkupDocument, VisualizationInfoDocument>;

/// Read, inspect and rewrite BCF collaboration archives.
#[derive(Debug, Parser)]
#[command(name = "bcf", version, about, long_about = None)]
struct Cli {
    /// JSON file with codec options.
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    /// Absolute directory for rotating log files. Logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every topic of an archive and what it contains.
    List {
        archive: PathBuf,
        /// Print a JSON document instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Load an archive and save it again through the codec.
    Repack { input: PathBuf, output: PathBuf },
}

#[derive(Debug, Serialize)]
struct TopicSummary<'a> {
    group_id: &'a str,
    markup: bool,
    viewpoint: bool,
    snapshot_bytes: Option<usize>,
    sidecars: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct ListReport<'a> {
    topics: Vec<TopicSummary<'a>>,
    warnings: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    let codec = Codec::new(load_options(cli.options.as_deref())?);

    match &cli.command {
        Command::List { archive, json } => list(&codec, archive, *json),
        Command::Repack { input, output } => repack(&codec, input, output),
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let Some(log_dir) = &cli.log_dir else {
        return Ok(());
    };
    let level = match cli.log_level.as_deref() {
        Some(value) => LogLevel::parse(value)?,
        None => LogLevel::default_for_build(),
    };
    bcf_core::init_logging(&LogConfig::new(level, log_dir)?)?;
    Ok(())
}

fn load_options(path: Option<&Path>) -> Result<CodecOptions> {
    let Some(path) = path else {
        return Ok(CodecOptions::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read options file `{}`", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid options file `{}`", path.display()))
}

fn list(codec: &Codec, archive: &Path, json: bool) -> Result<()> {
    let outcome = codec.load(archive)?;
    let report = ListReport {
        topics: summarize(&outcome.registry),
        warnings: outcome.warnings.iter().map(CodecWarning::to_string).collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for topic in &report.topics {
        println!(
            "{} markup={} viewpoint={} snapshot={} sidecars={}",
            topic.group_id,
            yes_no(topic.markup),
            yes_no(topic.viewpoint),
            topic
                .snapshot_bytes
                .map_or_else(|| "no".to_string(), |bytes| format!("{bytes}B")),
            topic.sidecars.len()
        );
    }
    print_warnings(&report.warnings);
    Ok(())
}

fn repack(codec: &Codec, input: &Path, output: &Path) -> Result<()> {
    let loaded = codec.load(input)?;
    let saved = codec.save(&loaded.registry, output)?;
    info!(
        "event=repack module=cli status=ok topics={} entries={}",
        loaded.registry.len(),
        saved.entries_written.len()
    );

    println!(
        "wrote {} topics ({} entries) to {}",
        loaded.registry.len(),
        saved.entries_written.len(),
        output.display()
    );
    let warnings = loaded
        .warnings
        .iter()
        .chain(saved.warnings.iter())
        .map(CodecWarning::to_string)
        .collect::<Vec<_>>();
    print_warnings(&warnings);
    Ok(())
}

fn summarize(registry: &BcfRegistry) -> Vec<TopicSummary<'_>> {
    registry
        .iter()
        .map(|record| TopicSummary {
            group_id: record.group_id(),
            markup: record.markup.is_some(),
            viewpoint: record.viewpoint.is_some(),
            snapshot_bytes: record.snapshot.as_ref().map(Vec::len),
            sidecars: record.sidecars.keys().map(String::as_str).collect(),
        })
        .collect()
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
