//! Configured compressor / decompressor
//!
//! [`PiecewiseCodec`] holds only immutable configuration. Every call builds
//! its own segmentation, tiers and buffers, so one codec can serve
//! concurrent callers.

use crate::config::MAX_GRID_INDEX;
use crate::reconstruct::Reconstructor;
use crate::segment::{self, grid_step, AnchorStrategy, SegmentBuilder, Segmentation};
use crate::store::{EncodedSeries, StoreReader, StoreWriter, TieredSegments};
use crate::{PiecewiseError, Point, Result, Segment};
use serde::Serialize;
use tracing::debug;

/// Storage layout family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Sim-Piece: one perB tier, no intercept bias
    SingleTier,
    /// Mix-Piece: perB, perA and rest tiers with a `globalMinB` bias
    MultiTier,
}

/// How segment timestamps are written in the perB tier and trailer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampEncoding {
    /// Variable-byte deltas between ascending timestamps
    Delta,
    /// Fixed 4-byte unsigned values
    Raw,
}

/// Optional general-purpose pass over the store buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteCompression {
    /// Store buffer as is
    None,
    /// LZ4 block with the uncompressed size prepended
    Lz4,
}

/// Codec configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Layout family
    pub variant: Variant,
    /// Intercept anchoring used by the segment builder
    pub anchor: AnchorStrategy,
    /// Timestamp encoding
    pub timestamps: TimestampEncoding,
    /// Outer byte compression
    pub byte_compression: ByteCompression,
}

impl CodecConfig {
    /// Sim-Piece defaults: nearest-grid anchors, single tier
    pub fn single_tier() -> Self {
        Self {
            variant: Variant::SingleTier,
            anchor: AnchorStrategy::Nearest,
            timestamps: TimestampEncoding::Delta,
            byte_compression: ByteCompression::Lz4,
        }
    }

    /// Mix-Piece defaults: ceiling/floor anchors, three tiers
    pub fn multi_tier() -> Self {
        Self {
            variant: Variant::MultiTier,
            anchor: AnchorStrategy::CeilingOrFloor,
            timestamps: TimestampEncoding::Delta,
            byte_compression: ByteCompression::Lz4,
        }
    }

    /// Set the timestamp encoding
    pub fn with_timestamps(mut self, timestamps: TimestampEncoding) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Set the outer byte compression
    pub fn with_byte_compression(mut self, byte_compression: ByteCompression) -> Self {
        self.byte_compression = byte_compression;
        self
    }

    /// Set the anchor strategy
    pub fn with_anchor(mut self, anchor: AnchorStrategy) -> Self {
        self.anchor = anchor;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::multi_tier()
    }
}

/// Size and accuracy figures for one compressed series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionStats {
    /// Input points
    pub points: usize,
    /// Segments before merging
    pub segments: usize,
    /// Segments in the perB tier
    pub per_b_segments: usize,
    /// Segments in the perA tier
    pub per_a_segments: usize,
    /// Segments in the rest tier
    pub rest_segments: usize,
    /// Size of the final buffer
    pub encoded_bytes: usize,
    /// Raw size (`points * 8`, a 4-byte timestamp and a 4-byte value each)
    /// over encoded size
    pub compression_ratio: f64,
    /// Largest absolute error at an input timestamp
    pub max_error: f64,
}

/// Error-bounded piecewise linear codec
#[derive(Debug, Clone, Default)]
pub struct PiecewiseCodec {
    config: CodecConfig,
}

impl PiecewiseCodec {
    /// Create a codec with the given configuration
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Codec configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Cut `points` into error-bounded segments
    pub fn segment(&self, points: &[Point], epsilon: f64) -> Result<Segmentation> {
        validate(points, epsilon)?;
        Ok(SegmentBuilder::new(epsilon, self.config.anchor).segment_all(points))
    }

    /// Merge a flat segment list into the storage tiers of this layout
    pub fn partition(&self, segments: Vec<Segment>) -> TieredSegments {
        segment::partition(segments, self.config.variant)
    }

    /// Compress `points` so every value is reproduced within `epsilon`
    pub fn compress(&self, points: &[Point], epsilon: f64) -> Result<Vec<u8>> {
        self.compress_series(points, epsilon).map(|(bytes, _)| bytes)
    }

    /// Decompress a buffer produced by [`PiecewiseCodec::compress`] with the
    /// same configuration into one point per integer tick
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<Point>> {
        let series = self.decode_series(data)?;
        let points = Reconstructor::new(series.tiers, series.last_timestamp).replay()?;

        debug!(
            input_bytes = data.len(),
            points = points.len(),
            "decompressed series"
        );
        Ok(points)
    }

    /// Decode a buffer into its tiers without replaying it
    pub fn decode_series(&self, data: &[u8]) -> Result<EncodedSeries> {
        match self.config.byte_compression {
            ByteCompression::None => StoreReader::new(self.config, data).read(),
            ByteCompression::Lz4 => {
                let raw = lz4_flex::decompress_size_prepended(data)
                    .map_err(|e| PiecewiseError::Compression(e.to_string()))?;
                StoreReader::new(self.config, &raw).read()
            }
        }
    }

    /// Compress, decompress and measure
    pub fn analyze(&self, points: &[Point], epsilon: f64) -> Result<CompressionStats> {
        let (bytes, series) = self.compress_series(points, epsilon)?;
        let restored = self.decompress(&bytes)?;

        let origin = restored.first().map_or(0, |p| p.timestamp);
        let mut max_error = 0.0f64;
        for point in points {
            let index = usize::try_from(point.timestamp - origin).map_err(|_| {
                PiecewiseError::Decode(format!("timestamp {} not reconstructed", point.timestamp))
            })?;
            let value = restored
                .get(index)
                .map(|p| p.value)
                .ok_or_else(|| {
                    PiecewiseError::Decode(format!(
                        "timestamp {} not reconstructed",
                        point.timestamp
                    ))
                })?;
            max_error = max_error.max((value - point.value).abs());
        }

        Ok(CompressionStats {
            points: points.len(),
            segments: series.segments,
            per_b_segments: series.per_b,
            per_a_segments: series.per_a,
            rest_segments: series.rest,
            encoded_bytes: bytes.len(),
            compression_ratio: (points.len() * 8) as f64 / bytes.len() as f64,
            max_error,
        })
    }

    fn compress_series(&self, points: &[Point], epsilon: f64) -> Result<(Vec<u8>, TierCounts)> {
        let segmentation = self.segment(points, epsilon)?;
        let segments = segmentation.len();
        let global_min_b = segmentation.global_min_b.unwrap_or(0);
        let tiers = self.partition(segmentation.segments);

        let counts = TierCounts {
            segments,
            per_b: tiers.per_b.len(),
            per_a: tiers.per_a.len(),
            rest: tiers.rest.len(),
        };

        let series = EncodedSeries {
            epsilon,
            global_min_b,
            tiers,
            last_timestamp: points[points.len() - 1].timestamp,
        };
        let raw = StoreWriter::new(self.config).write(&series)?;

        let bytes = match self.config.byte_compression {
            ByteCompression::None => raw.to_vec(),
            ByteCompression::Lz4 => lz4_flex::compress_prepend_size(&raw),
        };

        debug!(
            points = points.len(),
            segments,
            per_b = counts.per_b,
            per_a = counts.per_a,
            rest = counts.rest,
            store_bytes = raw.len(),
            output_bytes = bytes.len(),
            "compressed series"
        );

        Ok((bytes, counts))
    }
}

struct TierCounts {
    segments: usize,
    per_b: usize,
    per_a: usize,
    rest: usize,
}

/// Reject inputs the segment builder or the layout cannot represent
fn validate(points: &[Point], epsilon: f64) -> Result<()> {
    if points.is_empty() {
        return Err(PiecewiseError::InvalidInput("empty series".into()));
    }
    let stored = grid_step(epsilon);
    if !(epsilon.is_finite() && epsilon > 0.0 && stored.is_finite() && stored > 0.0) {
        return Err(PiecewiseError::InvalidInput(format!(
            "epsilon must be positive and finite, got {}",
            epsilon
        )));
    }
    let grid = f64::from(stored);

    let mut previous: Option<i64> = None;
    for point in points {
        if !point.value.is_finite() {
            return Err(PiecewiseError::InvalidInput(format!(
                "non-finite value at timestamp {}",
                point.timestamp
            )));
        }
        if u32::try_from(point.timestamp).is_err() {
            return Err(PiecewiseError::InvalidInput(format!(
                "timestamp {} is outside 0..={}",
                point.timestamp,
                u32::MAX
            )));
        }
        if previous.is_some_and(|p| p >= point.timestamp) {
            return Err(PiecewiseError::InvalidInput(format!(
                "timestamps must be strictly increasing, {} follows {}",
                point.timestamp,
                previous.unwrap_or_default()
            )));
        }
        if (point.value / grid).abs() + 1.0 >= MAX_GRID_INDEX as f64 {
            return Err(PiecewiseError::InvalidInput(format!(
                "value {} is too large for epsilon {}",
                point.value, epsilon
            )));
        }
        previous = Some(point.timestamp);
    }

    Ok(())
}
