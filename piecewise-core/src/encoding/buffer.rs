//! Byte-level I/O for the segment store

use super::varint;
use crate::{PiecewiseError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Byte writer for encoding segment tiers
#[derive(Debug)]
pub struct ByteWriter {
    buffer: BytesMut,
}

impl ByteWriter {
    /// Create a new ByteWriter
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Create with capacity hint
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Write an unsigned variable-byte integer
    #[inline]
    pub fn write_varint(&mut self, value: u32) {
        varint::put_varint(&mut self.buffer, value);
    }

    /// Write a signed variable-byte integer by its bit pattern
    #[inline]
    pub fn write_varint_signed(&mut self, value: i32) {
        varint::put_varint_signed(&mut self.buffer, value);
    }

    /// Write a 4-byte big-endian integer
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buffer.put_u32(value);
    }

    /// Write a single-precision float as its 4-byte big-endian bit pattern
    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buffer.put_u32(value.to_bits());
    }

    /// Finish writing and return the buffer
    pub fn finish(self) -> Bytes {
        self.buffer.freeze()
    }

    /// Get current size in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for ByteWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte reader for decoding segment tiers
///
/// Every read is bounds-checked and reports truncation as a decode error.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    /// Create a new ByteReader
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Read an unsigned variable-byte integer
    #[inline]
    pub fn read_varint(&mut self) -> Result<u32> {
        varint::get_varint(&mut self.data)
    }

    /// Read a signed variable-byte integer
    #[inline]
    pub fn read_varint_signed(&mut self) -> Result<i32> {
        varint::get_varint_signed(&mut self.data)
    }

    /// Read a 4-byte big-endian integer
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        if self.data.remaining() < 4 {
            return Err(PiecewiseError::truncated("fixed-width integer"));
        }
        Ok(self.data.get_u32())
    }

    /// Read a single-precision float
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_u32().map(f32::from_bits)
    }

    /// Read a group count, rejecting counts that cannot fit in the remaining
    /// input when every element takes at least `min_element_len` bytes.
    pub fn read_count(&mut self, what: &str, min_element_len: usize) -> Result<usize> {
        let count = self.read_varint()? as usize;
        let needed = count.checked_mul(min_element_len).ok_or_else(|| {
            PiecewiseError::Decode(format!("{} count {} overflows", what, count))
        })?;
        if needed > self.remaining() {
            return Err(PiecewiseError::Decode(format!(
                "{} count {} exceeds remaining {} bytes",
                what,
                count,
                self.remaining()
            )));
        }
        Ok(count)
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    /// Check if there are more bytes to read
    pub fn has_more(&self) -> bool {
        !self.data.is_empty()
    }
}
