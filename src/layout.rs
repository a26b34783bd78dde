//! Declarative fixed-layout records
//!
//! A [`StructLayout`] is an ordered list of [`FieldDescriptor`]s plus a total record size.
//! It is validated once at definition time (no overlaps, every field inside the record,
//! unique names) and then reused read-only for every encode/decode call.
//!
//! # Reserved and padding bytes
//!
//! Padding between fields is whatever the target ABI dictates; layouts declare explicit
//! offsets and never infer alignment. Bytes not covered by a field, and fields omitted
//! from an encode call, keep their current contents. On a freshly created
//! [`ByteBuffer`] that is zero, which is what OS structures expect of reserved members.
//!
//! ```rust
//! use structpack::{ByteBuffer, FieldDescriptor, FieldKind, StructLayout, Value};
//!
//! let layout = StructLayout::define(
//!     [
//!         FieldDescriptor::le("type", FieldKind::UInt32, 0),
//!         FieldDescriptor::le("wVk", FieldKind::UInt16, 8),
//!     ],
//!     16,
//! )?;
//!
//! let mut buffer = ByteBuffer::new(layout.record_size())?;
//! layout.encode_record(&mut buffer, 0, [("type", Value::from(1u32)), ("wVk", 0x41u16.into())])?;
//! assert_eq!(buffer.read_at(8, 2)?, &[0x41, 0x00]);
//! # Ok::<(), structpack::MarshalError>(())
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use crate::{ByteBuffer, FieldDescriptor, MarshalError, Record, Result, Value, codec};

/// Immutable description of a fixed-size binary record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructLayout {
    fields: Vec<FieldDescriptor>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    record_size: usize,
}

impl StructLayout {
    /// Validate `fields` against `record_size` and build the layout.
    ///
    /// Fails with [`MarshalError::Layout`] when a field has zero width, extends past
    /// `record_size`, reuses a name, or overlaps another field. UTF-16 text fields must
    /// have an even width.
    pub fn define(
        fields: impl IntoIterator<Item = FieldDescriptor>,
        record_size: usize,
    ) -> Result<Self> {
        let fields: Vec<FieldDescriptor> = fields.into_iter().collect();
        let mut index = HashMap::with_capacity(fields.len());

        for (i, field) in fields.iter().enumerate() {
            if field.width() == 0 {
                return Err(MarshalError::layout(format!("field '{}' has zero width", field.name)));
            }

            if let Some(details) = codec::misaligned_text(&field.kind) {
                return Err(MarshalError::layout(format!("field '{}': {}", field.name, details)));
            }

            match field.end() {
                Some(end) if end <= record_size => {}
                _ => {
                    return Err(MarshalError::layout(format!(
                        "field '{}' ({} bytes at offset {}) exceeds record size {}",
                        field.name,
                        field.width(),
                        field.offset,
                        record_size
                    )));
                }
            }

            if index.insert(field.name.clone(), i).is_some() {
                return Err(MarshalError::layout(format!(
                    "field name '{}' is declared twice",
                    field.name
                )));
            }
        }

        // Adjacent pairs in offset order are enough to find any overlap
        let mut by_offset: Vec<&FieldDescriptor> = fields.iter().collect();
        by_offset.sort_by_key(|field| field.offset);
        for pair in by_offset.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            if second.offset < first.offset + first.width() {
                return Err(MarshalError::layout(format!(
                    "fields '{}' [{}..{}) and '{}' [{}..{}) overlap",
                    first.name,
                    first.offset,
                    first.offset + first.width(),
                    second.name,
                    second.offset,
                    second.offset + second.width()
                )));
            }
        }

        debug!(fields = fields.len(), record_size, "Defined struct layout");
        Ok(Self { fields, index, record_size })
    }

    /// Size of one record in bytes.
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn require(&self, name: &str) -> Result<&FieldDescriptor> {
        self.field(name).ok_or_else(|| MarshalError::unknown_field(name))
    }

    /// Encode the supplied fields into `record`, which must hold at least one record.
    ///
    /// All values are encoded into a staging copy first, so an error leaves `record`
    /// unchanged. Omitted fields keep their current bytes.
    pub fn encode_bytes<I, K, V>(&self, record: &mut [u8], values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<Value>,
    {
        let available = record.len();
        let target = record
            .get_mut(..self.record_size)
            .ok_or(MarshalError::out_of_bounds(0, self.record_size, available))?;

        let mut staged = target.to_vec();
        for (name, value) in values {
            let field = self.require(name.as_ref())?;
            trace!(field = %field.name, offset = field.offset, "Encoding record field");
            codec::encode_into(&field.kind, field.byte_order, value.borrow(), &mut staged[field.offset..])?;
        }

        target.copy_from_slice(&staged);
        Ok(())
    }

    /// Decode every declared field from the first `record_size` bytes of `bytes`.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Record> {
        if bytes.len() < self.record_size {
            return Err(MarshalError::truncated("record", self.record_size, bytes.len()));
        }

        let mut record = Record::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = codec::decode(&field.kind, field.byte_order, &bytes[field.offset..])?;
            record.insert(field.name.clone(), value);
        }
        Ok(record)
    }

    /// Decode a single named field from the first `record_size` bytes of `bytes`.
    pub fn decode_field(&self, bytes: &[u8], name: &str) -> Result<Value> {
        let field = self.require(name)?;
        if bytes.len() < self.record_size {
            return Err(MarshalError::truncated("record", self.record_size, bytes.len()));
        }
        codec::decode(&field.kind, field.byte_order, &bytes[field.offset..])
    }

    /// Write the supplied fields of one record at `record_offset` in `buffer`.
    pub fn encode_record<I, K, V>(
        &self,
        buffer: &mut ByteBuffer,
        record_offset: usize,
        values: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<Value>,
    {
        let record = buffer.as_mut_slice(record_offset, self.record_size)?;
        self.encode_bytes(record, values)
    }

    /// Read every field of the record at `record_offset`.
    pub fn decode_record(&self, buffer: &ByteBuffer, record_offset: usize) -> Result<Record> {
        let record = buffer.as_slice(record_offset, self.record_size)?;
        self.decode_bytes(record)
    }

    /// Write consecutive records starting at `start_offset`, record `i` landing at
    /// `start_offset + i * record_size`. Returns the number of records written.
    ///
    /// The whole span is bounds checked before the first record is written.
    pub fn encode_record_array<R, I, K, V>(
        &self,
        buffer: &mut ByteBuffer,
        start_offset: usize,
        records: R,
    ) -> Result<usize>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Borrow<Value>,
    {
        let records: Vec<I> = records.into_iter().collect();
        let span = self.array_span(records.len(), start_offset, buffer.capacity())?;
        debug!(count = records.len(), start_offset, span, "Encoding record array");

        let mut written = 0;
        for (i, values) in records.into_iter().enumerate() {
            self.encode_record(buffer, start_offset + i * self.record_size, values)?;
            written += 1;
        }
        Ok(written)
    }

    /// Read `count` consecutive records starting at `start_offset`.
    pub fn decode_record_array(
        &self,
        buffer: &ByteBuffer,
        start_offset: usize,
        count: usize,
    ) -> Result<Vec<Record>> {
        self.array_span(count, start_offset, buffer.capacity())?;
        (0..count)
            .map(|i| self.decode_record(buffer, start_offset + i * self.record_size))
            .collect()
    }

    fn array_span(&self, count: usize, start_offset: usize, capacity: usize) -> Result<usize> {
        let span = count.checked_mul(self.record_size);
        match span.and_then(|span| start_offset.checked_add(span).map(|end| (span, end))) {
            Some((span, end)) if end <= capacity => Ok(span),
            _ => Err(MarshalError::out_of_bounds(
                start_offset,
                span.unwrap_or(usize::MAX),
                capacity,
            )),
        }
    }
}
