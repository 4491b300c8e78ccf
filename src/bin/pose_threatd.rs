//! pose_threatd - pose record threat classifier
//!
//! This daemon:
//! 1. Reads JSON Lines pose records from a local file or stdin
//! 2. Routes each record to its stream's detector (history is per stream)
//! 3. Optionally applies the post-validation policy
//! 4. Writes one JSON result per line to stdout

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use pose_threat_kernel::ingest::{FileConfig, JsonlSource};
use pose_threat_kernel::{
    ClassificationResult, DetectorConfig, PassThrough, PostValidation, ResultPolicy,
    StreamRegistry,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSONL pose records to read, or '-' for stdin.
    #[arg(long, default_value = "-")]
    input: String,
    /// Detector config file (JSON, or TOML with a .toml extension).
    #[arg(long, env = "POSE_THREAT_CONFIG")]
    config: Option<PathBuf>,
    /// Apply the post-validation policy to every result.
    #[arg(long)]
    post_validate: bool,
    /// Override the crime threshold (0-100).
    #[arg(long)]
    threshold: Option<f32>,
    /// Pretty-print results instead of one per line.
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct StreamResult<'a> {
    stream: &'a str,
    #[serde(flatten)]
    result: &'a ClassificationResult,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = DetectorConfig::load_from(args.config.as_deref())?;
    if let Some(threshold) = args.threshold {
        config.crime_threshold = threshold;
        config.validate().context("invalid --threshold")?;
    }
    let policy: Box<dyn ResultPolicy> = if args.post_validate || config.post_validation {
        Box::new(PostValidation::default())
    } else {
        Box::new(PassThrough)
    };

    log::info!(
        "pose_threatd {} running: threshold={}, history={}, policy={}",
        env!("CARGO_PKG_VERSION"),
        config.crime_threshold,
        config.history_capacity,
        policy.name()
    );

    let mut source = JsonlSource::open(FileConfig {
        path: args.input.clone(),
    })?;
    let mut registry = StreamRegistry::new(config);
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut frames = 0u64;
    let mut crimes = 0u64;
    let mut skipped = 0u64;

    while let Some(next) = source.next_record() {
        let record = match next {
            Ok(record) => record,
            Err(e) => {
                log::warn!("skipping record: {}", e);
                skipped += 1;
                continue;
            }
        };
        let stream = record.stream_id().to_string();
        let frame = match record.into_observation() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("skipping record at line {}: {:#}", source.line_number(), e);
                skipped += 1;
                continue;
            }
        };

        let result = policy.apply(registry.analyze(&stream, &frame));
        frames += 1;
        if result.crime_detected {
            crimes += 1;
            log::info!(
                "[{}] {} ({}) score={:.1}",
                stream,
                result.crime_type,
                result.threat_level,
                result.threat_score
            );
        }

        let line = StreamResult {
            stream: &stream,
            result: &result,
        };
        if args.pretty {
            serde_json::to_writer_pretty(&mut out, &line)?;
        } else {
            serde_json::to_writer(&mut out, &line)?;
        }
        writeln!(out).context("failed to write result")?;
    }
    out.flush().context("failed to flush results")?;

    log::info!(
        "done: {} frame(s) across {} stream(s), {} crime(s) detected, {} record(s) skipped",
        frames,
        registry.len(),
        crimes,
        skipped
    );
    Ok(())
}
