//! Variable-byte integers with an end-of-value marker
//!
//! Each byte carries seven payload bits, least significant group first.
//! The high bit is set on the final byte of a value and clear on every byte
//! before it, which is the inverse of LEB128.

use crate::config::MAX_VARINT_LEN;
use crate::{PiecewiseError, Result};
use bytes::{Buf, BufMut};

/// High bit marking the last byte of a value
pub const END_MARKER: u8 = 0x80;

const PAYLOAD_MASK: u8 = 0x7F;

/// Append `value` to `buf`
#[inline]
pub fn put_varint<B: BufMut>(buf: &mut B, value: u32) {
    let mut rest = value;
    loop {
        let group = (rest as u8) & PAYLOAD_MASK;
        rest >>= 7;
        if rest == 0 {
            buf.put_u8(group | END_MARKER);
            return;
        }
        buf.put_u8(group);
    }
}

/// Append a signed value by its 32-bit pattern
#[inline]
pub fn put_varint_signed<B: BufMut>(buf: &mut B, value: i32) {
    put_varint(buf, value as u32);
}

/// Read one value from `buf`
pub fn get_varint<B: Buf>(buf: &mut B) -> Result<u32> {
    let mut value = 0u32;
    for group in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(PiecewiseError::truncated("varint"));
        }
        let byte = buf.get_u8();
        value |= u32::from(byte & PAYLOAD_MASK) << (7 * group);
        if byte & END_MARKER != 0 {
            return Ok(value);
        }
    }
    Err(PiecewiseError::Decode(format!(
        "varint has no end marker within {} bytes",
        MAX_VARINT_LEN
    )))
}

/// Read one value from `buf` and reinterpret its bits as signed
#[inline]
pub fn get_varint_signed<B: Buf>(buf: &mut B) -> Result<i32> {
    get_varint(buf).map(|v| v as i32)
}
