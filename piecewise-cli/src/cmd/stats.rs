//! `piecewise stats`

use super::{CodecArgs, EpsilonArgs};
use crate::csv;
use anyhow::Context;
use clap::Args;
use piecewise_core::CompressionStats;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Input CSV file
    pub input: PathBuf,
    #[command(flatten)]
    pub epsilon: EpsilonArgs,
    #[command(flatten)]
    pub codec: CodecArgs,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub epsilon: f64,
    #[serde(flatten)]
    pub stats: CompressionStats,
}

impl StatsReport {
    fn render_text(&self) -> String {
        let s = &self.stats;
        format!(
            "epsilon:           {}\n\
             points:            {}\n\
             segments:          {}\n\
             perB / perA / rest: {} / {} / {}\n\
             encoded bytes:     {}\n\
             compression ratio: {:.2}\n\
             max error:         {}",
            self.epsilon,
            s.points,
            s.segments,
            s.per_b_segments,
            s.per_a_segments,
            s.rest_segments,
            s.encoded_bytes,
            s.compression_ratio,
            s.max_error
        )
    }
}

pub fn report(args: &StatsArgs) -> anyhow::Result<StatsReport> {
    let points = csv::read_points(&args.input)?;
    let epsilon = args.epsilon.resolve(&points)?;
    let stats = args
        .codec
        .codec()
        .analyze(&points, epsilon)
        .with_context(|| format!("failed to analyze {}", args.input.display()))?;
    Ok(StatsReport { epsilon, stats })
}

pub fn run(args: StatsArgs) -> anyhow::Result<()> {
    let report = report(&args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render_text());
    }
    Ok(())
}
