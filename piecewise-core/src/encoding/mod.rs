//! Wire primitives for the segment store
//!
//! Two integer codecs are used by the binary layout:
//! - variable-byte integers with an end-of-value high bit ([`varint`])
//! - fixed-width 4-byte big-endian integers and single-precision floats
//!
//! [`ByteWriter`] and [`ByteReader`] wrap both over a growable / borrowed buffer.

pub mod varint;
mod buffer;

pub use buffer::{ByteReader, ByteWriter};
