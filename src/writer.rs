//! Append-only writer over a growing [`ByteBuffer`]
//!
//! [`GrowableWriter`] appends encoded fields at its write position. When a write does not
//! fit, the internal buffer is replaced by one of capacity `max(capacity * 2, needed)`
//! and the bytes written so far are copied over. Every write is atomic: the value is
//! encoded and the new buffer allocated before any state changes, so a failing call
//! leaves position, capacity and contents as they were.
//!
//! ```rust
//! use structpack::{ByteOrder, FieldKind, GrowableWriter, TextEncoding, Value};
//!
//! let mut writer = GrowableWriter::new(4)?;
//! writer.write_field(&FieldKind::UInt32, ByteOrder::LittleEndian, &Value::UInt32(7))?;
//! writer.write_length_prefixed_text("hello", TextEncoding::Utf8)?;
//!
//! let bytes = writer.finalize()?;
//! assert_eq!(bytes.len(), 4 + 4 + 5);
//! assert!(writer.write_bytes(&[0]).is_err());
//! # Ok::<(), structpack::MarshalError>(())
//! ```

use std::borrow::Borrow;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use crate::codec::{self, Scalar};
use crate::{
    BufferConfig, ByteBuffer, ByteOrder, FieldKind, MarshalError, Result, StructLayout, TextEncoding,
    Value,
};

/// Lifecycle of a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Accepting writes
    Open,
    /// Result extracted; terminal
    Finalized,
}

/// Snapshot of a writer's memory use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageStats {
    pub used_bytes: usize,
    pub capacity_bytes: usize,
    /// `used_bytes / capacity_bytes * 100`, 0.0 for an empty buffer
    pub utilization_percent: f64,
    /// Number of reallocations since creation
    pub grow_count: usize,
}

/// Incremental builder for variable-length binary payloads.
#[derive(Debug)]
pub struct GrowableWriter {
    buffer: ByteBuffer,
    position: usize,
    config: BufferConfig,
    grow_count: usize,
    state: WriterState,
}

impl GrowableWriter {
    /// Create a writer with `initial_capacity` zeroed bytes.
    pub fn new(initial_capacity: usize) -> Result<Self> {
        Self::with_config(initial_capacity, BufferConfig::default())
    }

    /// Create a writer using `config.default_writer_capacity`.
    pub fn from_config(config: BufferConfig) -> Result<Self> {
        Self::with_config(config.default_writer_capacity, config)
    }

    /// Create a writer whose growth is capped by `config.max_capacity`.
    pub fn with_config(initial_capacity: usize, config: BufferConfig) -> Result<Self> {
        let buffer = ByteBuffer::with_config(initial_capacity, &config)?;
        Ok(Self { buffer, position: 0, config, grow_count: 0, state: WriterState::Open })
    }

    /// Bytes written so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Current capacity of the internal buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Bytes written so far, without finalizing.
    pub fn written(&self) -> &[u8] {
        &self.buffer.as_bytes()[..self.position]
    }

    fn ensure_open(&self, operation: &'static str) -> Result<()> {
        match self.state {
            WriterState::Open => Ok(()),
            WriterState::Finalized => Err(MarshalError::FinalizedWriter { operation }),
        }
    }

    /// Make room for `additional` bytes after the write position.
    fn reserve(&mut self, additional: usize) -> Result<()> {
        let capacity = self.buffer.capacity();
        let needed = self.position.checked_add(additional).ok_or_else(|| {
            MarshalError::allocation(usize::MAX, self.config.max_capacity, "write size overflows")
        })?;
        if needed <= capacity {
            return Ok(());
        }

        // Doubling stops at the ceiling; only `needed` itself may exceed it (and fail)
        let doubled = capacity.saturating_mul(2).min(self.config.max_capacity);
        let new_capacity = doubled.max(needed);

        let mut grown = ByteBuffer::with_config(new_capacity, &self.config)?;
        grown.write_at(0, self.written())?;

        debug!(
            from = capacity,
            to = new_capacity,
            used = self.position,
            "Growing writer buffer"
        );
        self.buffer = grown;
        self.grow_count += 1;
        Ok(())
    }

    /// Append `bytes` verbatim.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_open("write_bytes")?;
        self.append(bytes)
    }

    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?;
        self.buffer.write_at(self.position, bytes)?;
        trace!(offset = self.position, width = bytes.len(), "Appended bytes");
        self.position += bytes.len();
        Ok(())
    }

    /// Encode one field and append it.
    pub fn write_field(&mut self, kind: &FieldKind, order: ByteOrder, value: &Value) -> Result<()> {
        self.ensure_open("write_field")?;
        let encoded = codec::encode(kind, order, value)?;
        self.append(&encoded)
    }

    /// Append a Rust primitive using its natural kind.
    pub fn write_scalar<T: Scalar>(&mut self, order: ByteOrder, value: T) -> Result<()> {
        self.write_field(&T::KIND, order, &value.into())
    }

    /// Append one record of `layout`. Omitted fields are zero.
    pub fn write_record<I, K, V>(&mut self, layout: &StructLayout, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<Value>,
    {
        self.ensure_open("write_record")?;
        let mut record = vec![0u8; layout.record_size()];
        layout.encode_bytes(&mut record, values)?;
        self.append(&record)
    }

    /// Append a little-endian `u32` byte length followed by the encoded text, unpadded.
    pub fn write_length_prefixed_text(&mut self, text: &str, encoding: TextEncoding) -> Result<()> {
        self.ensure_open("write_length_prefixed_text")?;
        let encoded = codec::encode_text(text, encoding)?;
        let length = u32::try_from(encoded.len()).map_err(|_| {
            MarshalError::value_range(
                "UInt32 length prefix",
                format!("{} encoded bytes exceed u32::MAX", encoded.len()),
            )
        })?;

        let mut framed = Vec::with_capacity(4 + encoded.len());
        framed.extend_from_slice(&length.to_le_bytes());
        framed.extend_from_slice(&encoded);
        self.append(&framed)
    }

    /// Rewind to position 0 and zero the contents, keeping the capacity.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_open("reset")?;
        self.buffer.fill_zero();
        self.position = 0;
        Ok(())
    }

    /// Extract exactly the written bytes. The writer rejects every later write.
    pub fn finalize(&mut self) -> Result<Arc<[u8]>> {
        self.ensure_open("finalize")?;
        let bytes: Arc<[u8]> = Arc::from(self.written());
        self.state = WriterState::Finalized;
        debug!(
            used = self.position,
            capacity = self.buffer.capacity(),
            grow_count = self.grow_count,
            "Finalized writer"
        );
        Ok(bytes)
    }

    pub fn usage_stats(&self) -> UsageStats {
        let capacity_bytes = self.buffer.capacity();
        let utilization_percent = if capacity_bytes == 0 {
            0.0
        } else {
            self.position as f64 / capacity_bytes as f64 * 100.0
        };
        UsageStats {
            used_bytes: self.position,
            capacity_bytes,
            utilization_percent,
            grow_count: self.grow_count,
        }
    }
}
