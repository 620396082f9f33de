//! `piecewise compress`

use super::{CodecArgs, EpsilonArgs};
use crate::csv;
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct CompressArgs {
    /// Input CSV file
    pub input: PathBuf,
    /// Compressed output file
    #[arg(short, long)]
    pub output: PathBuf,
    #[command(flatten)]
    pub epsilon: EpsilonArgs,
    #[command(flatten)]
    pub codec: CodecArgs,
}

pub fn run(args: CompressArgs) -> anyhow::Result<()> {
    let points = csv::read_points(&args.input)?;
    let epsilon = args.epsilon.resolve(&points)?;

    let codec = args.codec.codec();
    let bytes = codec
        .compress(&points, epsilon)
        .with_context(|| format!("failed to compress {}", args.input.display()))?;
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        "Compressed {} points into {} bytes ({:?}, epsilon {}) -> {}",
        points.len(),
        bytes.len(),
        codec.config().variant,
        epsilon,
        args.output.display()
    );
    Ok(())
}
