//! Read-only cursor for ad hoc header reads

use crate::codec::{self, Scalar};
use crate::{ByteOrder, FieldKind, MarshalError, Record, Result, StructLayout, TextEncoding, Value};

/// A cursor over an immutable byte slice.
///
/// Reads advance the position on success and leave it unchanged on failure. Nothing is
/// ever read past the end of the slice.
#[derive(Clone, Copy, Debug)]
pub struct HeaderCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Start at `pos`. `pos == bytes.len()` (end of input) is allowed.
    pub fn with_pos(bytes: &'a [u8], pos: usize) -> Result<Self> {
        let mut cursor = Self::new(bytes);
        cursor.seek(pos)?;
        Ok(cursor)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the current position.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.bytes.len() {
            return Err(MarshalError::truncated("seek target", pos, self.bytes.len()));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n, "skipped bytes").map(|_| ())
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let out = self
            .pos
            .checked_add(len)
            .and_then(|end| self.bytes.get(self.pos..end))
            .ok_or_else(|| MarshalError::truncated(what, len, self.remaining()))?;
        self.pos += len;
        Ok(out)
    }

    /// Decode one field of `kind` at the current position.
    pub fn read(&mut self, kind: &FieldKind, order: ByteOrder) -> Result<Value> {
        let bytes = self.peek(kind.width(), &kind.to_string())?;
        let value = codec::decode(kind, order, bytes)?;
        self.pos += kind.width();
        Ok(value)
    }

    pub fn read_scalar<T: Scalar>(&mut self, order: ByteOrder) -> Result<T> {
        let bytes = self.peek(T::KIND.width(), &T::KIND.to_string())?;
        let value = codec::decode_scalar(order, bytes)?;
        self.pos += T::KIND.width();
        Ok(value)
    }

    /// Decode one record of `layout` and advance past it.
    pub fn read_record(&mut self, layout: &StructLayout) -> Result<Record> {
        let bytes = self.peek(layout.record_size(), "record")?;
        let record = layout.decode_bytes(bytes)?;
        self.pos += layout.record_size();
        Ok(record)
    }

    /// Read a little-endian `u32` byte length followed by that many bytes of text, the
    /// framing written by [`GrowableWriter::write_length_prefixed_text`](crate::GrowableWriter::write_length_prefixed_text).
    pub fn read_length_prefixed_text(&mut self, encoding: TextEncoding) -> Result<String> {
        let start = self.pos;
        let len = self.read_scalar::<u32>(ByteOrder::LittleEndian)? as usize;
        let text = self
            .take(len, "length-prefixed text")
            .and_then(|bytes| codec::decode_text(bytes, encoding));
        if text.is_err() {
            self.pos = start;
        }
        text
    }

    /// Consume `magic.len()` bytes and report whether they equal `magic`.
    pub fn expect_magic(&mut self, magic: &[u8]) -> Result<bool> {
        let found = self.take(magic.len(), "magic")?;
        Ok(found == magic)
    }

    fn peek(&self, len: usize, what: &str) -> Result<&'a [u8]> {
        self.pos
            .checked_add(len)
            .and_then(|end| self.bytes.get(self.pos..end))
            .ok_or_else(|| MarshalError::truncated(what, len, self.remaining()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldDescriptor;

    #[test]
    fn sequential_reads_advance() {
        let bytes = [0x42, 0x4D, 0x10, 0x00, 0x00, 0x00, 0xFF];
        let mut cursor = HeaderCursor::new(&bytes);

        assert!(cursor.expect_magic(b"BM").unwrap());
        assert_eq!(cursor.read_scalar::<u32>(ByteOrder::LittleEndian).unwrap(), 16);
        assert_eq!(cursor.read(&FieldKind::Int8, ByteOrder::BigEndian).unwrap(), Value::Int8(-1));
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn short_read_is_truncated_and_keeps_position() {
        let bytes = [1, 2, 3];
        let mut cursor = HeaderCursor::with_pos(&bytes, 1).unwrap();

        let err = cursor.read(&FieldKind::UInt32, ByteOrder::LittleEndian).unwrap_err();
        assert_eq!(err, MarshalError::truncated("UInt32", 4, 2));
        assert_eq!(cursor.position(), 1);
        assert!(cursor.skip(3).is_err());
        assert!(cursor.skip(2).is_ok());
    }

    #[test]
    fn seek_allows_end_of_input_only() {
        let bytes = [0u8; 4];
        let mut cursor = HeaderCursor::new(&bytes);
        assert!(cursor.seek(4).is_ok());
        assert!(matches!(cursor.seek(5), Err(MarshalError::TruncatedInput { .. })));
        assert!(HeaderCursor::with_pos(&bytes, 9).is_err());
    }

    #[test]
    fn records_are_read_in_sequence() {
        let layout = StructLayout::define(
            [
                FieldDescriptor::be("length", FieldKind::UInt32, 0),
                FieldDescriptor::le("kind", FieldKind::bytes(4), 4),
            ],
            8,
        )
        .unwrap();
        let bytes = [0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0, 0, 0, b'I', b'E', b'N', b'D'];
        let mut cursor = HeaderCursor::new(&bytes);

        let first = cursor.read_record(&layout).unwrap();
        let second = cursor.read_record(&layout).unwrap();
        assert_eq!(first["length"], Value::UInt32(13));
        assert_eq!(second["kind"], Value::Bytes(b"IEND".to_vec()));
        assert!(cursor.read_record(&layout).is_err());
    }

    #[test]
    fn length_prefixed_text_matches_writer_framing() {
        let mut writer = crate::GrowableWriter::new(4).unwrap();
        writer.write_length_prefixed_text("entry.bin", TextEncoding::Utf8).unwrap();
        writer.write_length_prefixed_text("", TextEncoding::Utf8).unwrap();
        let bytes = writer.finalize().unwrap();

        let mut cursor = HeaderCursor::new(&bytes);
        assert_eq!(cursor.read_length_prefixed_text(TextEncoding::Utf8).unwrap(), "entry.bin");
        assert_eq!(cursor.read_length_prefixed_text(TextEncoding::Utf8).unwrap(), "");
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn overlong_length_prefix_restores_position() {
        let bytes = [10, 0, 0, 0, b'a', b'b'];
        let mut cursor = HeaderCursor::new(&bytes);
        assert!(cursor.read_length_prefixed_text(TextEncoding::Ascii).is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn mismatched_magic_still_advances() {
        let bytes = *b"GIF89a";
        let mut cursor = HeaderCursor::new(&bytes);
        assert!(!cursor.expect_magic(b"\x89PNG").unwrap());
        assert_eq!(cursor.position(), 4);
    }
}
