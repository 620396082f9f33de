//! Subcommands and the options they share

pub mod compress;
pub mod decompress;
pub mod stats;

use anyhow::{bail, ensure};
use clap::{Args, ValueEnum};
use piecewise_core::{ByteCompression, CodecConfig, PiecewiseCodec, Point, TimestampEncoding};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VariantArg {
    /// Sim-Piece: one intercept-grouped tier
    Single,
    /// Mix-Piece: intercept, slope and individual tiers
    Multi,
}

/// Layout options; decompression must use the same ones as compression
#[derive(Debug, Clone, Args)]
pub struct CodecArgs {
    /// Storage layout
    #[arg(long, value_enum, default_value_t = VariantArg::Multi)]
    pub variant: VariantArg,
    /// Write timestamps as fixed 4-byte integers instead of varint deltas
    #[arg(long)]
    pub raw_timestamps: bool,
    /// Skip the LZ4 pass over the output
    #[arg(long)]
    pub no_lz4: bool,
}

impl CodecArgs {
    pub fn config(&self) -> CodecConfig {
        let mut config = match self.variant {
            VariantArg::Single => CodecConfig::single_tier(),
            VariantArg::Multi => CodecConfig::multi_tier(),
        };
        if self.raw_timestamps {
            config = config.with_timestamps(TimestampEncoding::Raw);
        }
        if self.no_lz4 {
            config = config.with_byte_compression(ByteCompression::None);
        }
        config
    }

    pub fn codec(&self) -> PiecewiseCodec {
        PiecewiseCodec::new(self.config())
    }
}

/// Error bound options
#[derive(Debug, Clone, Args)]
pub struct EpsilonArgs {
    /// Maximum absolute error per value
    #[arg(short, long)]
    pub epsilon: f64,
    /// Treat --epsilon as a fraction of the series value range
    #[arg(long)]
    pub relative: bool,
}

impl EpsilonArgs {
    /// Absolute error bound for `points`
    pub fn resolve(&self, points: &[Point]) -> anyhow::Result<f64> {
        ensure!(
            self.epsilon.is_finite() && self.epsilon > 0.0,
            "epsilon must be positive, got {}",
            self.epsilon
        );
        if !self.relative {
            return Ok(self.epsilon);
        }

        let (min, max) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), p| {
                (min.min(p.value), max.max(p.value))
            });
        let range = max - min;
        if !(range.is_finite() && range > 0.0) {
            bail!("relative epsilon needs a series with a non-zero value range");
        }
        Ok(self.epsilon * range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use piecewise_core::{AnchorStrategy, Variant};

    fn epsilon(epsilon: f64, relative: bool) -> EpsilonArgs {
        EpsilonArgs { epsilon, relative }
    }

    #[test]
    fn test_codec_args() {
        let args = CodecArgs {
            variant: VariantArg::Single,
            raw_timestamps: true,
            no_lz4: true,
        };
        let config = args.config();
        assert_eq!(config.variant, Variant::SingleTier);
        assert_eq!(config.anchor, AnchorStrategy::Nearest);
        assert_eq!(config.timestamps, TimestampEncoding::Raw);
        assert_eq!(config.byte_compression, ByteCompression::None);

        let args = CodecArgs {
            variant: VariantArg::Multi,
            raw_timestamps: false,
            no_lz4: false,
        };
        assert_eq!(args.config(), CodecConfig::default());
    }

    #[test]
    fn test_relative_epsilon() {
        let points = vec![Point::new(0, -5.0), Point::new(1, 15.0), Point::new(2, 0.0)];
        assert_eq!(epsilon(0.5, false).resolve(&points).unwrap(), 0.5);
        assert_eq!(epsilon(0.25, true).resolve(&points).unwrap(), 5.0);
    }

    #[test]
    fn test_relative_epsilon_flat_series() {
        let points = vec![Point::new(0, 3.0), Point::new(1, 3.0)];
        assert!(epsilon(0.01, true).resolve(&points).is_err());
        assert!(epsilon(0.0, false).resolve(&points).is_err());
    }
}
