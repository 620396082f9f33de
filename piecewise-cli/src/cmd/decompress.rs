//! `piecewise decompress`

use super::CodecArgs;
use crate::csv;
use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct DecompressArgs {
    /// Compressed input file
    pub input: PathBuf,
    /// Output CSV file, stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub codec: CodecArgs,
}

pub fn run(args: DecompressArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let points = args
        .codec
        .codec()
        .decompress(&bytes)
        .with_context(|| format!("failed to decompress {}", args.input.display()))?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            csv::write_points(BufWriter::new(file), &points)?;
            info!("Restored {} points -> {}", points.len(), path.display());
        }
        None => csv::write_points(BufWriter::new(io::stdout().lock()), &points)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::VariantArg;

    #[test]
    fn test_corrupt_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("garbage.pw");
        std::fs::write(&input, [0x01, 0x02, 0x03]).unwrap();

        let err = run(DecompressArgs {
            input,
            output: Some(dir.path().join("out.csv")),
            codec: CodecArgs {
                variant: VariantArg::Multi,
                raw_timestamps: false,
                no_lz4: false,
            },
        })
        .unwrap_err();
        assert!(err.to_string().contains("failed to decompress"));
    }
}
