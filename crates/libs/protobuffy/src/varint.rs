//! Base-128 varints and zig-zag transforms.
//!
//! Two separate paths: [`write_varint32`] runs on 32-bit arithmetic and emits
//! at most 5 bytes, [`write_varint64`] runs on 64-bit arithmetic and emits at
//! most 10. Callers pick the 32-bit path whenever the value fits, which is the
//! common case for tags and lengths. Both emit the minimal encoding.

use crate::buffer::DynamicBuffer;
use crate::error::BufferError;

pub const MAX_VARINT32_LEN: usize = 5;
pub const MAX_VARINT64_LEN: usize = 10;

#[inline]
pub fn zigzag32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[inline]
pub fn zigzag64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
pub fn unzigzag32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

#[inline]
pub fn unzigzag64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Encoded length of `value` on the 32-bit path.
#[inline]
pub fn varint32_len(value: u32) -> usize {
    let bits = 32 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Encoded length of `value` on the 64-bit path.
#[inline]
pub fn varint64_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// 32-bit path: up to 5 bytes.
pub fn write_varint32(buf: &mut DynamicBuffer, mut value: u32) -> Result<(), BufferError> {
    let mut scratch = [0u8; MAX_VARINT32_LEN];
    let mut len = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            scratch[len] = byte;
            len += 1;
            break;
        }
        scratch[len] = byte | 0x80;
        len += 1;
    }
    buf.write_bytes(&scratch[..len])
}

/// 64-bit path: up to 10 bytes.
pub fn write_varint64(buf: &mut DynamicBuffer, mut value: u64) -> Result<(), BufferError> {
    let mut scratch = [0u8; MAX_VARINT64_LEN];
    let mut len = 0;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            scratch[len] = byte;
            len += 1;
            break;
        }
        scratch[len] = byte | 0x80;
        len += 1;
    }
    buf.write_bytes(&scratch[..len])
}

/// `int32`/`int64`/`enum` payload. Negative values are sign-extended to
/// 64 bits, so they always take ten bytes.
#[inline]
pub fn write_int_varint(buf: &mut DynamicBuffer, value: i64) -> Result<(), BufferError> {
    match u32::try_from(value) {
        Ok(small) if value <= i64::from(i32::MAX) => write_varint32(buf, small),
        _ => write_varint64(buf, value as u64),
    }
}

/// `uint32`/`uint64` payload.
#[inline]
pub fn write_uint_varint(buf: &mut DynamicBuffer, value: u64) -> Result<(), BufferError> {
    match u32::try_from(value) {
        Ok(small) => write_varint32(buf, small),
        Err(_) => write_varint64(buf, value),
    }
}

/// `sint32`/`sint64` payload: zig-zag first, then the narrowest path.
#[inline]
pub fn write_sint_varint(buf: &mut DynamicBuffer, value: i64) -> Result<(), BufferError> {
    match i32::try_from(value) {
        Ok(small) => write_varint32(buf, zigzag32(small)),
        Err(_) => write_varint64(buf, zigzag64(value)),
    }
}
