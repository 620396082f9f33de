//! Core types for Piecewise

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Timestamp in integer ticks
pub type Timestamp = i64;

/// A single sample of a time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Sample timestamp
    pub timestamp: Timestamp,
    /// Sample value
    pub value: f64,
}

impl Point {
    /// Create a new point
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl From<(Timestamp, f64)> for Point {
    fn from((timestamp, value): (Timestamp, f64)) -> Self {
        Self::new(timestamp, value)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.timestamp, self.value)
    }
}

/// A linear segment `value(t) = a * (t - init_timestamp) + b`.
///
/// The slope `a` is never stored: it is always the midpoint of the feasible
/// slope interval `[a_min, a_max]`. Decoded segments carry a degenerate
/// interval where `a_min == a_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Timestamp of the first point the segment covers
    pub init_timestamp: Timestamp,
    /// Lowest slope compatible with the covered points
    pub a_min: f64,
    /// Highest slope compatible with the covered points
    pub a_max: f64,
    /// Intercept, a multiple of epsilon
    pub b: f64,
}

impl Segment {
    /// Create a segment from a slope interval
    pub fn new(init_timestamp: Timestamp, a_min: f64, a_max: f64, b: f64) -> Self {
        Self {
            init_timestamp,
            a_min,
            a_max,
            b,
        }
    }

    /// Create a segment with a fixed slope
    pub fn fixed(init_timestamp: Timestamp, a: f64, b: f64) -> Self {
        Self::new(init_timestamp, a, a, b)
    }

    /// Create a segment that accepts any slope. Used for a trailing single point.
    ///
    /// The interval is bounded by `f64::MAX` so its midpoint is exactly zero.
    pub fn unconstrained(init_timestamp: Timestamp, b: f64) -> Self {
        Self::new(init_timestamp, -f64::MAX, f64::MAX, b)
    }

    /// Slope of the segment line
    #[inline]
    pub fn a(&self) -> f64 {
        (self.a_min + self.a_max) / 2.0
    }

    /// Check whether the slope interval intersects `[a_min, a_max]`
    #[inline]
    pub fn overlaps(&self, a_min: f64, a_max: f64) -> bool {
        self.a_min <= a_max && self.a_max >= a_min
    }

    /// Evaluate the segment line at `timestamp`
    #[inline]
    pub fn value_at(&self, timestamp: Timestamp) -> f64 {
        self.a() * (timestamp - self.init_timestamp) as f64 + self.b
    }

    /// Index of the intercept on the epsilon grid
    #[inline]
    pub fn grid_index(&self, epsilon: f64) -> i64 {
        (self.b / epsilon).round() as i64
    }
}

/// Total ordering wrapper for slopes, so they can key ordered maps.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OrderedSlope(pub f64);

impl PartialEq for OrderedSlope {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OrderedSlope {}

impl PartialOrd for OrderedSlope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedSlope {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
