//! Fixed-capacity, zero-initialized byte buffer
//!
//! [`ByteBuffer`] owns one contiguous block of memory whose capacity is fixed at creation.
//! All access goes through bounds-checked accessors; a failing write leaves the buffer
//! untouched because the range is validated before any byte is copied.
//!
//! Views returned by [`ByteBuffer::as_slice`] borrow the buffer, so the borrow checker
//! guarantees they never outlive it. The only place a raw pointer leaves this type is
//! [`ByteBuffer::as_ptr`]/[`ByteBuffer::as_mut_ptr`], the pointer/length hand-off to
//! OS-interop callers.
//!
//! ```rust
//! use structpack::ByteBuffer;
//!
//! let mut buffer = ByteBuffer::new(8)?;
//! buffer.write_at(4, &[0x20, 0x03])?;
//! assert_eq!(buffer.read_at(4, 4)?, &[0x20, 0x03, 0x00, 0x00]);
//! assert!(buffer.write_at(7, &[1, 2]).is_err());
//! # Ok::<(), structpack::MarshalError>(())
//! ```

use std::fmt;
use std::ops::Range;

use tracing::{debug, trace};

use crate::{BufferConfig, MarshalError, Result};

/// Exclusively owned, zero-filled block of bytes with a fixed capacity.
#[derive(Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    data: Box<[u8]>,
}

impl ByteBuffer {
    /// Allocate `size` zeroed bytes under the default [`BufferConfig`].
    pub fn new(size: usize) -> Result<Self> {
        Self::with_config(size, &BufferConfig::default())
    }

    /// Allocate `size` zeroed bytes, refusing sizes above `config.max_capacity`.
    ///
    /// A zero-sized buffer is valid and has no addressable bytes.
    pub fn with_config(size: usize, config: &BufferConfig) -> Result<Self> {
        if size > config.max_capacity {
            return Err(MarshalError::allocation(
                size,
                config.max_capacity,
                "requested size exceeds the configured maximum",
            ));
        }

        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|e| MarshalError::allocation(size, config.max_capacity, e.to_string()))?;
        data.resize(size, 0);

        debug!(capacity = size, "Allocated byte buffer");
        Ok(Self { data: data.into_boxed_slice() })
    }

    /// Take ownership of bytes produced elsewhere (e.g. read from a file).
    ///
    /// The capacity is the vector's length.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { data: bytes.into_boxed_slice() }
    }

    /// Number of addressable bytes. Never changes after creation.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Validate `[offset, offset + width)` against the capacity.
    fn range(&self, offset: usize, width: usize) -> Result<Range<usize>> {
        let capacity = self.capacity();
        match offset.checked_add(width) {
            Some(end) if end <= capacity => Ok(offset..end),
            _ => Err(MarshalError::out_of_bounds(offset, width, capacity)),
        }
    }

    /// Read `width` bytes starting at `offset`.
    pub fn read_at(&self, offset: usize, width: usize) -> Result<&[u8]> {
        let range = self.range(offset, width)?;
        Ok(&self.data[range])
    }

    /// Copy `bytes` into the buffer at `offset`.
    ///
    /// The whole range is checked first; on error nothing is written.
    pub fn write_at(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let range = self.range(offset, bytes.len())?;
        trace!(offset, width = bytes.len(), "Writing bytes");
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    /// Borrowed view of `[start, start + length)`.
    pub fn as_slice(&self, start: usize, length: usize) -> Result<&[u8]> {
        self.read_at(start, length)
    }

    /// Mutable borrowed view of `[start, start + length)`.
    pub fn as_mut_slice(&mut self, start: usize, length: usize) -> Result<&mut [u8]> {
        let range = self.range(start, length)?;
        Ok(&mut self.data[range])
    }

    /// The whole buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reset every byte to zero.
    pub fn fill_zero(&mut self) {
        self.data.fill(0);
    }

    /// Pointer to the first byte, for handing `(as_ptr(), capacity())` to native code.
    ///
    /// The pointer is valid only while `self` is alive and not moved.
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// Mutable pointer to the first byte, for native calls that fill the buffer.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }

    /// Release the buffer as an owned vector.
    pub fn into_vec(self) -> Vec<u8> {
        self.data.into_vec()
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 16;
        let shown = &self.data[..self.data.len().min(PREVIEW)];
        f.debug_struct("ByteBuffer")
            .field("capacity", &self.capacity())
            .field("head", &format_args!("{:02x?}", shown))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_new_buffers_are_zero_filled(size in 0usize..4096) {
            let buffer = ByteBuffer::new(size).unwrap();
            prop_assert_eq!(buffer.capacity(), size);
            for offset in 0..size {
                prop_assert_eq!(buffer.read_at(offset, 1).unwrap(), &[0u8][..]);
            }
        }

        #[test]
        fn prop_bounds_are_enforced(
            capacity in 0usize..256,
            offset in 0usize..512,
            width in 0usize..64
        ) {
            let mut buffer = ByteBuffer::new(capacity).unwrap();
            let fits = offset + width <= capacity;

            prop_assert_eq!(buffer.read_at(offset, width).is_ok(), fits);
            prop_assert_eq!(buffer.as_slice(offset, width).is_ok(), fits);

            let payload = vec![0xAB; width];
            let result = buffer.write_at(offset, &payload);
            prop_assert_eq!(result.is_ok(), fits);

            if fits {
                prop_assert_eq!(buffer.read_at(offset, width).unwrap(), &payload[..]);
            } else {
                // Failed writes must not touch the buffer
                prop_assert!(buffer.as_bytes().iter().all(|&b| b == 0));
                let is_out_of_bounds = matches!(result, Err(MarshalError::OutOfBounds { .. }));
                prop_assert!(is_out_of_bounds);
            }
        }
    }

    #[test]
    fn zero_sized_buffer_has_no_addressable_bytes() {
        let buffer = ByteBuffer::new(0).unwrap();
        assert!(buffer.is_empty());
        assert!(buffer.read_at(0, 0).is_ok());
        assert!(buffer.read_at(0, 1).is_err());
    }

    #[test]
    fn offset_overflow_is_out_of_bounds() {
        let buffer = ByteBuffer::new(16).unwrap();
        let err = buffer.read_at(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, MarshalError::OutOfBounds { offset: usize::MAX, width: 2, .. }));
    }

    #[test]
    fn oversized_request_is_allocation_error() {
        let config = BufferConfig::default().with_max_capacity(64);
        let err = ByteBuffer::with_config(65, &config).unwrap_err();
        assert!(matches!(err, MarshalError::Allocation { requested: 65, limit: 64, .. }));
        assert!(ByteBuffer::with_config(64, &config).is_ok());
    }

    #[test]
    fn mutable_view_writes_through() {
        let mut buffer = ByteBuffer::new(8).unwrap();
        buffer.as_mut_slice(2, 3).unwrap().copy_from_slice(&[1, 2, 3]);
        assert_eq!(buffer.as_bytes(), &[0, 0, 1, 2, 3, 0, 0, 0]);

        buffer.fill_zero();
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn pointer_handoff_matches_contents() {
        let mut buffer = ByteBuffer::new(4).unwrap();
        buffer.write_at(0, &[9, 8, 7, 6]).unwrap();
        let ptr = buffer.as_ptr();
        let len = buffer.capacity();
        // SAFETY: ptr/len describe the live buffer, which is not mutated while the slice exists
        let view = unsafe { std::slice::from_raw_parts(ptr, len) };
        assert_eq!(view, &[9, 8, 7, 6]);
    }

    #[test]
    fn debug_output_is_bounded() {
        let buffer = ByteBuffer::new(4096).unwrap();
        let rendered = format!("{:?}", buffer);
        assert!(rendered.contains("capacity: 4096"));
        assert!(rendered.len() < 200);
    }
}
