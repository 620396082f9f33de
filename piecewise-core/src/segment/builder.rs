//! Greedy error-bounded segment construction

use super::{grid_step, AnchorStrategy, Segmentation};
use crate::{Point, Segment};
use std::cmp::Ordering;

/// Grid rounding applied to the first value of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizationMode {
    /// Round up to the next multiple of epsilon
    Ceiling,
    /// Round down to the previous multiple of epsilon
    Floor,
    /// Round half up to the nearest multiple of epsilon
    Nearest,
}

/// Rounds half up, so `-2.5` becomes `-2.0`
#[inline]
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Segment builder for one point sequence and one error bound
#[derive(Debug, Clone, Copy)]
pub struct SegmentBuilder {
    epsilon: f64,
    /// Intercept grid spacing, never above `epsilon`
    grid: f64,
    anchor: AnchorStrategy,
}

impl SegmentBuilder {
    /// Create a new builder. `epsilon` must be positive and finite.
    pub fn new(epsilon: f64, anchor: AnchorStrategy) -> Self {
        debug_assert!(epsilon > 0.0 && epsilon.is_finite());
        Self {
            epsilon,
            grid: f64::from(grid_step(epsilon)),
            anchor,
        }
    }

    /// Snap `value` to the epsilon grid
    pub fn quantize(&self, value: f64, mode: QuantizationMode) -> f64 {
        let scaled = value / self.grid;
        let index = match mode {
            QuantizationMode::Ceiling => scaled.ceil(),
            QuantizationMode::Floor => scaled.floor(),
            QuantizationMode::Nearest => round_half_up(scaled),
        };
        index * self.grid
    }

    /// Build the longest segment starting at `start` with the intercept
    /// anchored by `mode`.
    ///
    /// Returns the segment and the exclusive end index of the run it covers.
    pub fn build_segment(
        &self,
        start: usize,
        points: &[Point],
        mode: QuantizationMode,
    ) -> (Segment, usize) {
        let epsilon = self.epsilon;
        let first = points[start];
        let init = first.timestamp;
        let b = self.quantize(first.value, mode);

        if start + 1 == points.len() {
            return (Segment::unconstrained(init, b), start + 1);
        }

        let next = points[start + 1];
        let span = (next.timestamp - init) as f64;
        let mut a_max = (next.value + epsilon - b) / span;
        let mut a_min = (next.value - epsilon - b) / span;

        if start + 2 == points.len() {
            return (Segment::new(init, a_min, a_max, b), start + 2);
        }

        for (idx, point) in points.iter().enumerate().skip(start + 2) {
            let span = (point.timestamp - init) as f64;
            let up_value = point.value + epsilon;
            let down_value = point.value - epsilon;

            let up_lim = a_max * span + b;
            let down_lim = a_min * span + b;
            if down_value > up_lim || up_value < down_lim {
                return (Segment::new(init, a_min, a_max, b), idx);
            }

            if up_value < up_lim {
                a_max = ((up_value - b) / span).max(a_min);
            }
            if down_value > down_lim {
                a_min = ((down_value - b) / span).min(a_max);
            }
        }

        (Segment::new(init, a_min, a_max, b), points.len())
    }

    /// Cut the whole sequence into segments.
    ///
    /// With [`AnchorStrategy::CeilingOrFloor`] each run is built twice and the
    /// one reaching further wins. On a tie the floor-anchored run is kept when
    /// the first value rounds up to its ceiling, the ceiling-anchored one
    /// otherwise.
    pub fn segment_all(&self, points: &[Point]) -> Segmentation {
        let mut segments = Vec::new();
        let mut global_min_b: Option<i64> = None;
        let mut start = 0;

        while start < points.len() {
            let (segment, end) = match self.anchor {
                AnchorStrategy::Nearest => {
                    self.build_segment(start, points, QuantizationMode::Nearest)
                }
                AnchorStrategy::CeilingOrFloor => self.build_best(start, points),
            };

            let index = segment.grid_index(self.grid);
            global_min_b = Some(global_min_b.map_or(index, |min| min.min(index)));

            segments.push(segment);
            start = end;
        }

        Segmentation {
            segments,
            global_min_b,
        }
    }

    fn build_best(&self, start: usize, points: &[Point]) -> (Segment, usize) {
        let ceiling = self.build_segment(start, points, QuantizationMode::Ceiling);
        let floor = self.build_segment(start, points, QuantizationMode::Floor);

        match ceiling.1.cmp(&floor.1) {
            Ordering::Greater => ceiling,
            Ordering::Less => floor,
            Ordering::Equal => {
                let scaled = points[start].value / self.grid;
                if round_half_up(scaled) == scaled.ceil() {
                    floor
                } else {
                    ceiling
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[(i64, f64)]) -> Vec<Point> {
        values.iter().copied().map(Point::from).collect()
    }

    fn assert_within(segment: &Segment, points: &[Point], epsilon: f64) {
        for p in points {
            let err = (segment.value_at(p.timestamp) - p.value).abs();
            assert!(err <= epsilon + 1e-9, "error {} at t={}", err, p.timestamp);
        }
    }

    #[test]
    fn test_quantize_modes() {
        let builder = SegmentBuilder::new(0.5, AnchorStrategy::CeilingOrFloor);
        assert_eq!(builder.quantize(1.2, QuantizationMode::Ceiling), 1.5);
        assert_eq!(builder.quantize(1.2, QuantizationMode::Floor), 1.0);
        assert_eq!(builder.quantize(1.2, QuantizationMode::Nearest), 1.0);
        assert_eq!(builder.quantize(1.3, QuantizationMode::Nearest), 1.5);
        assert_eq!(builder.quantize(-1.2, QuantizationMode::Ceiling), -1.0);
        assert_eq!(builder.quantize(-1.2, QuantizationMode::Floor), -1.5);
        // half rounds up, also below zero
        assert_eq!(builder.quantize(-1.25, QuantizationMode::Nearest), -1.0);
    }

    #[test]
    fn test_last_point_is_unconstrained() {
        let builder = SegmentBuilder::new(0.1, AnchorStrategy::Nearest);
        let pts = points(&[(5, 3.14)]);
        let (segment, end) = builder.build_segment(0, &pts, QuantizationMode::Nearest);

        assert_eq!(end, 1);
        assert_eq!(segment.init_timestamp, 5);
        assert_eq!(segment.a_min, -f64::MAX);
        assert_eq!(segment.a_max, f64::MAX);
        assert_eq!(segment.a(), 0.0);
        assert!((segment.b - 3.1).abs() < 1e-6);
    }

    #[test]
    fn test_two_points_bounds() {
        let builder = SegmentBuilder::new(0.5, AnchorStrategy::Nearest);
        let pts = points(&[(0, 1.0), (2, 3.0)]);
        let (segment, end) = builder.build_segment(0, &pts, QuantizationMode::Floor);

        assert_eq!(end, 2);
        assert_eq!(segment.b, 1.0);
        assert_eq!(segment.a_max, 1.25);
        assert_eq!(segment.a_min, 0.75);
        assert_within(&segment, &pts, 0.5);
    }

    #[test]
    fn test_corridor_violation_stops_run() {
        let builder = SegmentBuilder::new(0.1, AnchorStrategy::Nearest);
        let pts = points(&[(0, 0.0), (1, 1.0), (2, 2.0), (3, 10.0), (4, 11.0)]);
        let (segment, end) = builder.build_segment(0, &pts, QuantizationMode::Nearest);

        assert_eq!(end, 3);
        assert_within(&segment, &pts[..3], 0.1);
    }

    #[test]
    fn test_single_segment_for_flat_noise() {
        let builder = SegmentBuilder::new(0.1, AnchorStrategy::CeilingOrFloor);
        let pts = points(&[(0, 1.0), (1, 1.05), (2, 0.95), (3, 1.0)]);
        let segmentation = builder.segment_all(&pts);

        assert_eq!(segmentation.len(), 1);
        assert_eq!(segmentation.segments[0].init_timestamp, 0);
        assert_within(&segmentation.segments[0], &pts, 0.1);
    }

    #[test]
    fn test_segments_cover_every_point() {
        let builder = SegmentBuilder::new(0.2, AnchorStrategy::CeilingOrFloor);
        let pts: Vec<Point> = (0..200)
            .map(|i| Point::new(i, (i as f64 * 0.3).sin() * 5.0))
            .collect();
        let segmentation = builder.segment_all(&pts);

        assert!(segmentation.len() > 1);
        let starts: Vec<i64> = segmentation.segments.iter().map(|s| s.init_timestamp).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
        assert_eq!(starts[0], 0);

        for (i, segment) in segmentation.segments.iter().enumerate() {
            let end = segmentation
                .segments
                .get(i + 1)
                .map_or(i64::MAX, |next| next.init_timestamp);
            let covered: Vec<Point> = pts
                .iter()
                .copied()
                .filter(|p| p.timestamp >= segment.init_timestamp && p.timestamp < end)
                .collect();
            assert_within(segment, &covered, 0.2);
        }
    }

    #[test]
    fn test_global_min_b_is_lower_bound() {
        let builder = SegmentBuilder::new(0.5, AnchorStrategy::CeilingOrFloor);
        let pts: Vec<Point> = (0..100)
            .map(|i| Point::new(i, ((i * 7919) % 23) as f64 - 11.0))
            .collect();
        let segmentation = builder.segment_all(&pts);
        let min = segmentation.global_min_b.unwrap();

        for segment in &segmentation.segments {
            assert!(min <= segment.grid_index(0.5));
        }
        assert!(segmentation
            .segments
            .iter()
            .any(|s| s.grid_index(0.5) == min));
    }

    #[test]
    fn test_tie_prefers_floor_when_value_rounds_up() {
        // 1.4 / 0.5 = 2.8 rounds to 3 == ceil, so the floor anchor (1.0) is kept
        let builder = SegmentBuilder::new(0.5, AnchorStrategy::CeilingOrFloor);
        let segmentation = builder.segment_all(&points(&[(0, 1.4)]));
        assert_eq!(segmentation.segments[0].b, 1.0);

        // 1.1 / 0.5 = 2.2 rounds to 2 != ceil, so the ceiling anchor (1.5) is kept
        let segmentation = builder.segment_all(&points(&[(0, 1.1)]));
        assert_eq!(segmentation.segments[0].b, 1.5);
    }

    #[test]
    fn test_longer_floor_run_wins() {
        // The ceiling anchor (1.0) leaves the corridor at t=2, the floor
        // anchor (0.0) covers all three points.
        let builder = SegmentBuilder::new(1.0, AnchorStrategy::CeilingOrFloor);
        let pts = points(&[(0, 0.5), (1, 0.5), (2, 3.4)]);

        let (_, ceil_end) = builder.build_segment(0, &pts, QuantizationMode::Ceiling);
        let (_, floor_end) = builder.build_segment(0, &pts, QuantizationMode::Floor);
        assert_eq!(ceil_end, 2);
        assert_eq!(floor_end, 3);

        let segmentation = builder.segment_all(&pts);
        assert_eq!(segmentation.len(), 1);
        assert_eq!(segmentation.segments[0].b, 0.0);
    }

    #[test]
    fn test_longer_ceiling_run_wins() {
        let builder = SegmentBuilder::new(1.0, AnchorStrategy::CeilingOrFloor);
        let pts = points(&[(0, -0.5), (1, -0.5), (2, -3.4)]);

        let segmentation = builder.segment_all(&pts);
        assert_eq!(segmentation.len(), 1);
        assert_eq!(segmentation.segments[0].b, 0.0);
        assert_within(&segmentation.segments[0], &pts, 1.0);
    }

    #[test]
    fn test_wide_epsilon_collapses_series() {
        let builder = SegmentBuilder::new(100.0, AnchorStrategy::CeilingOrFloor);
        let pts: Vec<Point> = (0..500)
            .map(|i| Point::new(i * 3, (i as f64 * 0.05).cos() * 10.0))
            .collect();
        assert_eq!(builder.segment_all(&pts).len(), 1);
    }

    #[test]
    fn test_grid_step_never_exceeds_epsilon() {
        assert_eq!(grid_step(0.5), 0.5);
        for epsilon in [0.1, 0.2, 0.3, 1e-3, 0.07, 123.456] {
            let step = grid_step(epsilon);
            assert!(f64::from(step) <= epsilon, "{}", epsilon);
            assert!(epsilon - f64::from(step) < epsilon * 1e-6);
            assert_eq!(grid_step(f64::from(step)), step);
        }
    }

    #[test]
    fn test_large_values_snap_to_stored_grid() {
        let builder = SegmentBuilder::new(0.1, AnchorStrategy::CeilingOrFloor);
        let stored = f64::from(grid_step(0.1));
        assert_eq!(builder.grid, stored);

        let pts = points(&[(0, 999_999.901)]);
        let segment = builder.segment_all(&pts).segments[0];
        let index = segment.grid_index(stored);

        assert_eq!(segment.b, index as f64 * stored);
        assert!((segment.b - 999_999.901).abs() <= 0.1);
    }
}
