//! Dense replay of stored segments

use crate::store::TieredSegments;
use crate::{PiecewiseError, Point, Result, Segment, Timestamp};

/// Upper bound on the up-front output allocation
const MAX_PREALLOCATED_POINTS: usize = 1 << 20;

/// Replays segments into one point per integer tick.
///
/// Each segment covers `[init_timestamp, next.init_timestamp)`; the last one
/// runs through `last_timestamp` inclusive. Series whose samples were not
/// unit-spaced come back densified.
pub struct Reconstructor {
    segments: Vec<Segment>,
    last_timestamp: Timestamp,
}

impl Reconstructor {
    /// Merge all tiers into one timeline
    pub fn new(tiers: TieredSegments, last_timestamp: Timestamp) -> Self {
        let mut segments = tiers.into_flat();
        segments.sort_by_key(|s| s.init_timestamp);
        Self {
            segments,
            last_timestamp,
        }
    }

    /// Number of points [`Reconstructor::replay`] will produce
    pub fn output_len(&self) -> Result<usize> {
        let (first, last) = match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(PiecewiseError::Decode("no segments to replay".into())),
        };
        if self.last_timestamp < last.init_timestamp {
            return Err(PiecewiseError::Decode(format!(
                "last timestamp {} precedes final segment at {}",
                self.last_timestamp, last.init_timestamp
            )));
        }

        let span = self
            .last_timestamp
            .checked_sub(first.init_timestamp)
            .and_then(|d| d.checked_add(1))
            .ok_or_else(|| PiecewiseError::Decode("timestamp span overflows".into()))?;
        usize::try_from(span)
            .map_err(|_| PiecewiseError::Decode(format!("timestamp span {} too large", span)))
    }

    /// Emit the dense point sequence
    pub fn replay(self) -> Result<Vec<Point>> {
        let total = self.output_len()?;
        let mut points = Vec::with_capacity(total.min(MAX_PREALLOCATED_POINTS));

        for pair in self.segments.windows(2) {
            let (segment, next) = (&pair[0], &pair[1]);
            points.extend(
                (segment.init_timestamp..next.init_timestamp)
                    .map(|t| Point::new(t, segment.value_at(t))),
            );
        }

        if let Some(last) = self.segments.last() {
            points.extend(
                (last.init_timestamp..=self.last_timestamp)
                    .map(|t| Point::new(t, last.value_at(t))),
            );
        }

        Ok(points)
    }
}
