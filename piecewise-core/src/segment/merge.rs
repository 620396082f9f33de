//! Slope / intercept interval merging

use crate::codec::Variant;
use crate::store::TieredSegments;
use crate::Segment;

/// Result of one merge layer
#[derive(Debug, Clone, Default)]
pub struct MergeOutput {
    /// Segments that joined a group of two or more, with the group slope
    pub merged: Vec<Segment>,
    /// Segments that stayed alone, unchanged
    pub unmerged: Vec<Segment>,
}

/// Running group of segments with intersecting slope intervals
struct SlopeGroup {
    a_min: f64,
    a_max: f64,
    members: Vec<Segment>,
}

impl SlopeGroup {
    fn new() -> Self {
        Self {
            a_min: -f64::MAX,
            a_max: f64::MAX,
            members: Vec::new(),
        }
    }

    fn start(&mut self, segment: &Segment) {
        self.members.clear();
        self.members.push(*segment);
        self.a_min = segment.a_min;
        self.a_max = segment.a_max;
    }

    /// Add `segment` if its slope interval intersects the group's
    fn try_absorb(&mut self, segment: &Segment) -> bool {
        if !segment.overlaps(self.a_min, self.a_max) {
            return false;
        }
        self.members.push(*segment);
        self.a_min = self.a_min.max(segment.a_min);
        self.a_max = self.a_max.min(segment.a_max);
        true
    }

    fn flush(&mut self, out: &mut MergeOutput) {
        match self.members.len() {
            0 => {}
            1 => out.unmerged.push(self.members[0]),
            _ => {
                let a = (self.a_min + self.a_max) / 2.0;
                out.merged.extend(
                    self.members
                        .iter()
                        .map(|m| Segment::fixed(m.init_timestamp, a, m.b)),
                );
            }
        }
        self.members.clear();
    }
}

/// Layer 1: group segments sharing an intercept whose slope intervals overlap
pub fn merge_per_b(mut segments: Vec<Segment>) -> MergeOutput {
    segments.sort_by(|l, r| l.b.total_cmp(&r.b).then_with(|| l.a().total_cmp(&r.a())));

    let mut out = MergeOutput::default();
    let mut group = SlopeGroup::new();
    let mut current_b: Option<f64> = None;

    for segment in &segments {
        if current_b != Some(segment.b) {
            group.flush(&mut out);
            group.start(segment);
            current_b = Some(segment.b);
            continue;
        }
        if !group.try_absorb(segment) {
            group.flush(&mut out);
            group.start(segment);
        }
    }
    group.flush(&mut out);

    out
}

/// Layer 2: group segments by slope overlap alone, each keeping its intercept
pub fn merge_all(mut segments: Vec<Segment>) -> MergeOutput {
    segments.sort_by(|l, r| l.a_min.total_cmp(&r.a_min));

    let mut out = MergeOutput::default();
    let mut group = SlopeGroup::new();

    for segment in &segments {
        if !group.try_absorb(segment) {
            group.flush(&mut out);
            group.start(segment);
        }
    }
    group.flush(&mut out);

    out
}

/// Route a flat segment list into storage tiers
pub fn partition(segments: Vec<Segment>, variant: Variant) -> TieredSegments {
    let per_b = merge_per_b(segments);

    match variant {
        Variant::SingleTier => {
            let mut all = per_b.merged;
            all.extend(per_b.unmerged);
            TieredSegments {
                per_b: all,
                ..Default::default()
            }
        }
        Variant::MultiTier => {
            let per_a = if per_b.unmerged.is_empty() {
                MergeOutput::default()
            } else {
                merge_all(per_b.unmerged)
            };
            TieredSegments {
                per_b: per_b.merged,
                per_a: per_a.merged,
                rest: per_a.unmerged,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_b_overlapping_slopes_merge() {
        let segments = vec![
            Segment::new(0, 0.0, 1.0, 2.0),
            Segment::new(10, 0.5, 2.0, 2.0),
            Segment::new(20, 0.8, 0.9, 2.0),
        ];
        let out = merge_per_b(segments);

        assert!(out.unmerged.is_empty());
        assert_eq!(out.merged.len(), 3);
        for seg in &out.merged {
            assert_eq!(seg.a_min, seg.a_max);
            assert!((seg.a() - 0.85).abs() < 1e-12);
            assert_eq!(seg.b, 2.0);
        }
        let mut ts: Vec<i64> = out.merged.iter().map(|s| s.init_timestamp).collect();
        ts.sort_unstable();
        assert_eq!(ts, vec![0, 10, 20]);
    }

    #[test]
    fn test_different_b_never_merge() {
        let segments = vec![
            Segment::new(0, 0.0, 1.0, 1.0),
            Segment::new(10, 0.0, 1.0, 2.0),
        ];
        let out = merge_per_b(segments);

        assert!(out.merged.is_empty());
        assert_eq!(out.unmerged.len(), 2);
        // singletons keep their original interval
        assert_eq!(out.unmerged[0].a_min, 0.0);
        assert_eq!(out.unmerged[0].a_max, 1.0);
    }

    #[test]
    fn test_disjoint_slopes_split_group() {
        let segments = vec![
            Segment::new(0, 0.0, 0.1, 1.0),
            Segment::new(5, 0.05, 0.2, 1.0),
            Segment::new(9, 5.0, 6.0, 1.0),
        ];
        let out = merge_per_b(segments);

        assert_eq!(out.merged.len(), 2);
        assert_eq!(out.unmerged.len(), 1);
        assert_eq!(out.unmerged[0].init_timestamp, 9);
    }

    #[test]
    fn test_merge_all_ignores_b() {
        let segments = vec![
            Segment::new(0, 0.0, 1.0, 1.0),
            Segment::new(10, 0.5, 1.5, 3.0),
            Segment::new(20, 4.0, 5.0, 7.0),
        ];
        let out = merge_all(segments);

        assert_eq!(out.merged.len(), 2);
        assert_eq!(out.unmerged.len(), 1);
        let bs: Vec<f64> = out.merged.iter().map(|s| s.b).collect();
        assert!(bs.contains(&1.0) && bs.contains(&3.0));
        for seg in &out.merged {
            assert_eq!(seg.a(), 0.75);
        }
    }

    #[test]
    fn test_unconstrained_segment_joins_group() {
        let segments = vec![
            Segment::new(0, 0.2, 0.4, 1.0),
            Segment::unconstrained(9, 1.0),
        ];
        let out = merge_per_b(segments);

        assert_eq!(out.merged.len(), 2);
        for seg in &out.merged {
            assert!((seg.a() - 0.3).abs() < 1e-12);
        }
    }

    #[test]
    fn test_partition_multi_tier_is_complete() {
        let segments = vec![
            Segment::new(0, 0.0, 1.0, 1.0),
            Segment::new(10, 0.5, 1.5, 1.0),
            Segment::new(20, 0.6, 0.7, 2.0),
            Segment::new(30, 0.65, 0.9, 3.0),
            Segment::new(40, 9.0, 10.0, 4.0),
        ];
        let tiers = partition(segments, Variant::MultiTier);

        assert_eq!(tiers.per_b.len(), 2);
        assert_eq!(tiers.per_a.len(), 2);
        assert_eq!(tiers.rest.len(), 1);
        assert_eq!(tiers.len(), 5);
    }

    #[test]
    fn test_partition_single_tier_keeps_everything_in_per_b() {
        let segments = vec![
            Segment::new(0, 0.0, 1.0, 1.0),
            Segment::new(10, 0.5, 1.5, 1.0),
            Segment::new(40, 9.0, 10.0, 4.0),
        ];
        let tiers = partition(segments, Variant::SingleTier);

        assert_eq!(tiers.per_b.len(), 3);
        assert!(tiers.per_a.is_empty());
        assert!(tiers.rest.is_empty());
    }
}
