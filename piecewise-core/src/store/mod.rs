//! Segment store - the binary layout of a compressed series
//!
//! ```text
//! epsilon        f32 (big-endian bits), the intercept grid step
//! globalMinB     varint                  multi-tier only
//! perB tier      count, first bias, then per intercept:
//!                  delta, slope count, per slope: f32, timestamp count, timestamps
//! perA tier      multi-tier only; count, then per slope:
//!                  f32, member count, first bias, per member: delta, u32 timestamp
//! rest tier      multi-tier only; count, first bias, per segment:
//!                  delta, f32 slope, u32 timestamp
//! lastTimestamp  varint (u32 in the raw timestamp layout)
//! ```
//!
//! Intercepts are written as grid indices minus `globalMinB`, sorted
//! ascending and delta-encoded. Every grouping level is emitted in ascending
//! key order so the same input always yields the same bytes.

mod reader;
mod writer;

pub use reader::StoreReader;
pub use writer::StoreWriter;

use crate::{Segment, Timestamp};

/// Segments routed into the three storage tiers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TieredSegments {
    /// Segments sharing intercept and slope with at least one other segment.
    /// In the single-tier layout this holds every segment.
    pub per_b: Vec<Segment>,
    /// Segments sharing only a slope with at least one other segment
    pub per_a: Vec<Segment>,
    /// Segments stored individually
    pub rest: Vec<Segment>,
}

impl TieredSegments {
    /// Total number of segments across tiers
    pub fn len(&self) -> usize {
        self.per_b.len() + self.per_a.len() + self.rest.len()
    }

    /// Check if every tier is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate all tiers into one list
    pub fn into_flat(self) -> Vec<Segment> {
        let mut segments = self.per_b;
        segments.extend(self.per_a);
        segments.extend(self.rest);
        segments
    }
}

/// Everything the binary layout carries for one series
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedSeries {
    /// Error bound the series was compressed with
    pub epsilon: f64,
    /// Bias subtracted from every intercept grid index
    pub global_min_b: i64,
    /// Merged segments
    pub tiers: TieredSegments,
    /// Timestamp of the final input point
    pub last_timestamp: Timestamp,
}
