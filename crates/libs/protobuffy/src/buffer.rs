//! Growable byte buffer with a write cursor.
//!
//! Every encoder write goes through [`DynamicBuffer`]. Capacity grows
//! geometrically (factor 2) so repeated small writes cost amortized O(1).
//! Writers never validate values; they only guarantee capacity.

use crate::error::BufferError;

/// Capacity used by [`DynamicBuffer::new`].
pub const DEFAULT_CAPACITY: usize = 1024;

macro_rules! fixed_writers {
    ($($(#[$meta:meta])* $name:ident($ty:ty) => $conv:ident;)*) => {
        $(
            $(#[$meta])*
            #[inline]
            pub fn $name(&mut self, value: $ty) -> Result<(), BufferError> {
                self.write_bytes(&value.$conv())
            }
        )*
    };
}

macro_rules! fixed_readers {
    ($($name:ident -> $ty:ty => $conv:ident;)*) => {
        $(
            #[inline]
            pub fn $name(&self, offset: usize) -> Option<$ty> {
                const WIDTH: usize = core::mem::size_of::<$ty>();
                let end = offset.checked_add(WIDTH)?;
                let bytes = self.as_slice().get(offset..end)?;
                Some(<$ty>::$conv(<[u8; WIDTH]>::try_from(bytes).ok()?))
            }
        )*
    };
}

/// Owned byte region plus the number of bytes written so far.
///
/// `position <= capacity()` holds at all times.
#[derive(Debug, Clone)]
pub struct DynamicBuffer {
    storage: Box<[u8]>,
    position: usize,
}

impl Default for DynamicBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicBuffer {
    /// Empty buffer with [`DEFAULT_CAPACITY`] bytes of storage.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Infallible constructor for sizes known to be small. Panics if the
    /// allocation fails; use [`try_with_capacity`](Self::try_with_capacity)
    /// for sizes that come from configuration.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { storage: vec![0u8; capacity].into_boxed_slice(), position: 0 }
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, BufferError> {
        Ok(Self { storage: zeroed(capacity)?.into_boxed_slice(), position: 0 })
    }

    /// Adopt caller-supplied bytes as storage. The cursor starts at 0, so
    /// existing contents are overwritten by subsequent writes.
    pub fn from_storage(storage: Vec<u8>) -> Self {
        Self { storage: storage.into_boxed_slice(), position: 0 }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Bytes written so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// The finished region `0..position`.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.position]
    }

    /// Consume the buffer, truncated to the written region.
    pub fn into_vec(self) -> Vec<u8> {
        let mut bytes = self.storage.into_vec();
        bytes.truncate(self.position);
        bytes
    }

    /// Rewind the cursor for reuse. Storage is kept.
    #[inline]
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Guarantee that `additional` more bytes fit after the cursor.
    #[inline]
    pub fn ensure_capacity(&mut self, additional: usize) -> Result<(), BufferError> {
        let needed = self
            .position
            .checked_add(additional)
            .ok_or(BufferError::AllocationFailed { requested: usize::MAX })?;
        if needed > self.storage.len() {
            self.grow(needed)?;
        }
        Ok(())
    }

    /// Double capacity until it reaches `target`, keeping `0..position`.
    pub fn grow(&mut self, target: usize) -> Result<(), BufferError> {
        let mut new_len = self.storage.len().max(1);
        while new_len < target {
            new_len = new_len
                .checked_mul(2)
                .ok_or(BufferError::AllocationFailed { requested: target })?;
        }
        if new_len == self.storage.len() {
            return Ok(());
        }

        let mut grown = zeroed(new_len)?;
        grown[..self.position].copy_from_slice(&self.storage[..self.position]);

        log::trace!("buffer: grow {} -> {} bytes", self.storage.len(), new_len);
        self.storage = grown.into_boxed_slice();
        Ok(())
    }

    /// Copy raw bytes at the cursor.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BufferError> {
        self.ensure_capacity(bytes.len())?;
        let end = self.position + bytes.len();
        self.storage[self.position..end].copy_from_slice(bytes);
        self.position = end;
        Ok(())
    }

    /// Write the UTF-8 bytes of `s`. Advances by the encoded byte count.
    pub fn write_str(&mut self, s: &str) -> Result<(), BufferError> {
        self.write_bytes(s.as_bytes())
    }

    fixed_writers! {
        write_u8(u8) => to_le_bytes;
        write_i8(i8) => to_le_bytes;
        write_u16_le(u16) => to_le_bytes;
        write_u16_be(u16) => to_be_bytes;
        write_i16_le(i16) => to_le_bytes;
        write_i16_be(i16) => to_be_bytes;
        write_u32_le(u32) => to_le_bytes;
        write_u32_be(u32) => to_be_bytes;
        write_i32_le(i32) => to_le_bytes;
        write_i32_be(i32) => to_be_bytes;
        write_f32_le(f32) => to_le_bytes;
        write_f32_be(f32) => to_be_bytes;
        write_f64_le(f64) => to_le_bytes;
        write_f64_be(f64) => to_be_bytes;
        /// Full 64-bit little-endian word.
        write_u64_le(u64) => to_le_bytes;
    }

    fixed_readers! {
        read_u8 -> u8 => from_le_bytes;
        read_i8 -> i8 => from_le_bytes;
        read_u16_le -> u16 => from_le_bytes;
        read_u16_be -> u16 => from_be_bytes;
        read_i16_le -> i16 => from_le_bytes;
        read_i16_be -> i16 => from_be_bytes;
        read_u32_le -> u32 => from_le_bytes;
        read_u32_be -> u32 => from_be_bytes;
        read_i32_le -> i32 => from_le_bytes;
        read_i32_be -> i32 => from_be_bytes;
        read_f32_le -> f32 => from_le_bytes;
        read_f32_be -> f32 => from_be_bytes;
        read_f64_le -> f64 => from_le_bytes;
        read_f64_be -> f64 => from_be_bytes;
    }
}

fn zeroed(len: usize) -> Result<Vec<u8>, BufferError> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| BufferError::AllocationFailed { requested: len })?;
    bytes.resize(len, 0);
    Ok(bytes)
}

impl AsRef<[u8]> for DynamicBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fixed_writers_advance_by_width() {
        let mut buf = DynamicBuffer::with_capacity(64);
        buf.write_u8(0xAB).unwrap();
        buf.write_u16_be(0x0102).unwrap();
        buf.write_u32_le(0x0304_0506).unwrap();
        buf.write_f64_le(1.5).unwrap();
        assert_eq!(buf.position(), 1 + 2 + 4 + 8);
        assert_eq!(&buf.as_slice()[..7], &[0xAB, 0x01, 0x02, 0x06, 0x05, 0x04, 0x03]);
        assert_eq!(buf.read_f64_le(7), Some(1.5));
    }

    #[test]
    fn byte_order_matches_writer() {
        let mut buf = DynamicBuffer::with_capacity(8);
        buf.write_i32_be(-2).unwrap();
        buf.write_i16_le(-300).unwrap();
        assert_eq!(buf.read_i32_be(0), Some(-2));
        assert_eq!(buf.read_i16_le(4), Some(-300));
        assert_eq!(buf.as_slice()[..4], [0xFF, 0xFF, 0xFF, 0xFE]);
    }

    #[test]
    fn readers_stay_inside_written_region() {
        let mut buf = DynamicBuffer::with_capacity(16);
        buf.write_u16_le(7).unwrap();
        assert_eq!(buf.read_u16_le(0), Some(7));
        assert_eq!(buf.read_u32_le(0), None);
        assert_eq!(buf.read_u8(2), None);
        assert_eq!(buf.read_u8(usize::MAX), None);
    }

    #[test]
    fn write_str_counts_encoded_bytes() {
        let mut buf = DynamicBuffer::with_capacity(2);
        buf.write_str("héllo €").unwrap();
        assert_eq!(buf.position(), "héllo €".len());
        assert_eq!(buf.as_slice(), "héllo €".as_bytes());
    }

    #[test]
    fn zero_capacity_buffer_grows() {
        let mut buf = DynamicBuffer::with_capacity(0);
        buf.write_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(buf.capacity(), 4);
        assert_eq!(buf.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn caller_storage_is_reused_from_the_start() {
        let mut buf = DynamicBuffer::from_storage(vec![9u8; 4]);
        assert!(buf.is_empty());
        buf.write_u8(1).unwrap();
        assert_eq!(buf.capacity(), 4);
        assert_eq!(buf.into_vec(), vec![1]);
    }

    #[test]
    fn reset_keeps_storage() {
        let mut buf = DynamicBuffer::with_capacity(4);
        buf.write_bytes(&[0; 10]).unwrap();
        let grown = buf.capacity();
        buf.reset();
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.capacity(), grown);
    }

    #[test]
    fn oversized_request_reports_allocation_failure() {
        let mut buf = DynamicBuffer::with_capacity(8);
        buf.write_u8(1).unwrap();
        assert_eq!(
            buf.ensure_capacity(usize::MAX),
            Err(BufferError::AllocationFailed { requested: usize::MAX })
        );
        assert_eq!(buf.as_slice(), &[1]);
    }

    #[test]
    fn fallible_constructor_reports_exhaustion() {
        let buf = DynamicBuffer::try_with_capacity(8).unwrap();
        assert_eq!(buf.capacity(), 8);
        assert!(buf.is_empty());
        assert_eq!(
            DynamicBuffer::try_with_capacity(usize::MAX).unwrap_err(),
            BufferError::AllocationFailed { requested: usize::MAX }
        );
    }

    proptest! {
        #[test]
        fn growth_doubles_and_preserves_prefix(
            initial in 1usize..64,
            chunks in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..96), 1..24),
        ) {
            let mut buf = DynamicBuffer::with_capacity(initial);
            let mut expected = Vec::new();
            for chunk in &chunks {
                buf.write_bytes(chunk).unwrap();
                expected.extend_from_slice(chunk);
                prop_assert_eq!(buf.as_slice(), expected.as_slice());
            }

            let mut smallest = initial;
            while smallest < expected.len() {
                smallest *= 2;
            }
            prop_assert_eq!(buf.capacity(), smallest);
        }
    }
}
