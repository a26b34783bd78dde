//! Magic-gated header parsing

use tracing::{debug, warn};

use super::ParsedHeader;
use crate::{FieldDescriptor, MarshalError, Result, StructLayout, Value, codec};

/// Applies a [`StructLayout`] to externally supplied bytes after checking a magic field.
///
/// The expected magic value is encoded once, with the magic field's own kind and byte
/// order, so the check is a byte comparison: an 8-byte signature and a little-endian
/// `u32` tag are both handled by whatever the layout declares.
///
/// Values that compare equal but encode differently are not interchangeable here. A
/// float magic of `0.0` rejects a header holding `-0.0`, and a NaN magic only matches
/// the exact NaN payload it encodes to.
#[derive(Debug, Clone)]
pub struct HeaderParser<'a> {
    layout: &'a StructLayout,
    magic: &'a FieldDescriptor,
    expected: Vec<u8>,
}

impl<'a> HeaderParser<'a> {
    /// Fails with [`MarshalError::UnknownField`] when `magic_field` is not declared, and
    /// with [`MarshalError::ValueRange`] when `expected` does not fit the field.
    pub fn new(layout: &'a StructLayout, magic_field: &str, expected: &Value) -> Result<Self> {
        let magic = layout.field(magic_field).ok_or_else(|| MarshalError::unknown_field(magic_field))?;
        let expected = codec::encode(&magic.kind, magic.byte_order, expected)?;
        Ok(Self { layout, magic, expected })
    }

    pub fn layout(&self) -> &'a StructLayout {
        self.layout
    }

    /// Parse a header starting at byte 0 of `bytes`.
    pub fn parse(&self, bytes: &[u8]) -> Result<ParsedHeader> {
        if bytes.len() < self.layout.record_size() {
            return Err(MarshalError::truncated(
                "header",
                self.layout.record_size(),
                bytes.len(),
            ));
        }

        let found = &bytes[self.magic.offset..self.magic.offset + self.magic.width()];
        if found != self.expected.as_slice() {
            warn!(
                field = %self.magic.name,
                expected = ?self.expected,
                found = ?found,
                "Magic number mismatch"
            );
            return Ok(ParsedHeader::invalid());
        }

        let fields = self.layout.decode_bytes(bytes)?;
        debug!(fields = fields.len(), "Parsed header");
        Ok(ParsedHeader { is_valid: true, fields })
    }

    /// Parse a header starting at `offset` inside `bytes`.
    pub fn parse_at(&self, bytes: &[u8], offset: usize) -> Result<ParsedHeader> {
        let tail = bytes.get(offset..).ok_or_else(|| {
            MarshalError::truncated(
                "header",
                offset.saturating_add(self.layout.record_size()),
                bytes.len(),
            )
        })?;
        self.parse(tail)
    }
}

/// One-shot form of [`HeaderParser::parse`].
pub fn parse(
    layout: &StructLayout,
    bytes: &[u8],
    magic_field: &str,
    expected: &Value,
) -> Result<ParsedHeader> {
    HeaderParser::new(layout, magic_field, expected)?.parse(bytes)
}

/// One-shot form of [`HeaderParser::parse_at`].
pub fn parse_at(
    layout: &StructLayout,
    bytes: &[u8],
    offset: usize,
    magic_field: &str,
    expected: &Value,
) -> Result<ParsedHeader> {
    HeaderParser::new(layout, magic_field, expected)?.parse_at(bytes, offset)
}
