//! Piecewise Core - Error-Bounded Time-Series Compression
//!
//! Lossy compression of `(timestamp, value)` series with a hard guarantee:
//! every reconstructed value lies within `epsilon` of the original.
//!
//! # Architecture
//!
//! A series flows through four stages:
//!
//! - **Segmentation**: cut the points into runs a single line can follow
//!   within the epsilon corridor, with the intercept snapped to a grid
//! - **Merging**: collapse runs that can share an intercept and a slope
//!   (perB tier) or only a slope (perA tier)
//! - **Store**: write the tiers as a compact variable-byte layout,
//!   optionally wrapped in LZ4
//! - **Reconstruction**: replay the segments into one point per tick
//!
//! Two layouts are supported: a single-tier one (Sim-Piece) and a
//! three-tier one (Mix-Piece, the default).
//!
//! ```
//! use piecewise_core::{compress, decompress, Point};
//!
//! let points: Vec<Point> = (0..100).map(|t| Point::new(t, (t as f64).sqrt())).collect();
//! let bytes = compress(&points, 0.05).unwrap();
//! let restored = decompress(&bytes).unwrap();
//!
//! assert_eq!(restored.len(), points.len());
//! for (orig, rest) in points.iter().zip(&restored) {
//!     assert!((orig.value - rest.value).abs() <= 0.05 * 1.1);
//! }
//! ```

pub mod codec;
pub mod encoding;
pub mod reconstruct;
pub mod segment;
pub mod store;

mod error;
mod types;

pub use codec::{
    ByteCompression, CodecConfig, CompressionStats, PiecewiseCodec, TimestampEncoding, Variant,
};
pub use error::{PiecewiseError, Result};
pub use reconstruct::Reconstructor;
pub use segment::AnchorStrategy;
pub use types::*;

/// Piecewise version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format limits
pub mod config {
    /// Longest varint encoding of a 32-bit value
    pub const MAX_VARINT_LEN: usize = 5;

    /// Bound on intercept grid index magnitudes accepted at compression time.
    /// Keeps biased indices and their deltas inside 32 bits.
    pub const MAX_GRID_INDEX: i64 = 1 << 30;
}

/// Compress `points` with the default three-tier configuration
pub fn compress(points: &[Point], epsilon: f64) -> Result<Vec<u8>> {
    PiecewiseCodec::default().compress(points, epsilon)
}

/// Decompress a buffer produced by [`compress`]
pub fn decompress(data: &[u8]) -> Result<Vec<Point>> {
    PiecewiseCodec::default().decompress(data)
}
