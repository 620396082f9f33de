//! Segmentation and interval merging
//!
//! The [`SegmentBuilder`] walks a point sequence once and cuts it into the
//! longest runs that a single line can follow within the epsilon corridor.
//! The merger then collapses segments that can share parameters:
//!
//! - **Layer 1** groups segments with the same intercept and overlapping slope
//!   intervals (the perB tier)
//! - **Layer 2** groups the leftovers by slope overlap alone (the perA tier);
//!   whatever is still alone ends up in the rest tier

mod builder;
mod merge;

pub use builder::{QuantizationMode, SegmentBuilder};
pub use merge::{merge_all, merge_per_b, partition, MergeOutput};

use crate::Segment;

/// How the intercept of each run is snapped to the epsilon grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStrategy {
    /// Snap to the nearest grid point
    Nearest,
    /// Try both the ceiling and the floor grid point, keep the longer run
    CeilingOrFloor,
}

/// Epsilon as written to the store header: the largest `f32` not above
/// `epsilon`.
///
/// Intercepts are snapped to multiples of this step, so the decoder rebuilds
/// them bit for bit from the header and the quantization error stays within
/// `epsilon`.
pub fn grid_step(epsilon: f64) -> f32 {
    let step = epsilon as f32;
    if step > 0.0 && f64::from(step) > epsilon {
        f32::from_bits(step.to_bits() - 1)
    } else {
        step
    }
}

/// Flat segment list produced from one point sequence
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    /// Segments in ascending timestamp order
    pub segments: Vec<Segment>,
    /// Minimum intercept grid index over all segments
    pub global_min_b: Option<i64>,
}

impl Segmentation {
    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if no segment was produced
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
