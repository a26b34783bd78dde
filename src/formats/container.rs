//! `SBPK` container files
//!
//! A 32-byte little-endian header followed by a stream of entries. Each entry is a
//! length-prefixed UTF-8 name and a length-prefixed payload, both with `u32` LE lengths.
//!
//! ```text
//! offset  size  field
//!      0     4  magic          0x4B504253 ("SBPK" on disk)
//!      4     2  version
//!      6     2  flags
//!      8     4  entry_count
//!     12     4  header_size    always 32
//!     16     8  payload_size   bytes after the header
//!     24     8  label          ASCII, zero padded
//! ```

use std::sync::{Arc, LazyLock};

use serde::Serialize;
use tracing::{debug, trace};

use crate::header::{HeaderCursor, HeaderParser, ParsedHeader};
use crate::{
    BufferConfig, ByteOrder, FieldDescriptor, FieldKind, GrowableWriter, MarshalError, Result,
    StructLayout, TextEncoding, Value, codec,
};

/// `"SBPK"` read as a little-endian `u32`.
pub const CONTAINER_MAGIC: u32 = 0x4B50_4253;
pub const CONTAINER_VERSION: u16 = 1;
pub const CONTAINER_HEADER_SIZE: usize = 32;
pub const CONTAINER_LABEL_WIDTH: usize = 8;

static CONTAINER_HEADER: LazyLock<Result<StructLayout>> = LazyLock::new(|| {
    StructLayout::define(
        [
            FieldDescriptor::le("magic", FieldKind::UInt32, 0),
            FieldDescriptor::le("version", FieldKind::UInt16, 4),
            FieldDescriptor::le("flags", FieldKind::UInt16, 6),
            FieldDescriptor::le("entry_count", FieldKind::UInt32, 8),
            FieldDescriptor::le("header_size", FieldKind::UInt32, 12),
            FieldDescriptor::le("payload_size", FieldKind::UInt64, 16),
            FieldDescriptor::le(
                "label",
                FieldKind::text(CONTAINER_LABEL_WIDTH, TextEncoding::Ascii),
                24,
            ),
        ],
        CONTAINER_HEADER_SIZE,
    )
});

pub fn container_header_layout() -> Result<&'static StructLayout> {
    CONTAINER_HEADER.as_ref().map_err(|e| e.clone())
}

pub fn parse_container_header(bytes: &[u8]) -> Result<ParsedHeader> {
    let layout = container_header_layout()?;
    HeaderParser::new(layout, "magic", &Value::from(CONTAINER_MAGIC))?.parse(bytes)
}

/// One named payload inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerEntry {
    pub name: String,
    pub payload: Vec<u8>,
}

/// Streams entries into a container body, then prepends the header.
#[derive(Debug)]
pub struct ContainerBuilder {
    label: String,
    flags: u16,
    entries: u32,
    body: GrowableWriter,
}

impl ContainerBuilder {
    /// `label` must be ASCII and at most eight bytes; it is checked when the header is written.
    pub fn new(label: impl Into<String>) -> Result<Self> {
        Self::with_config(label, BufferConfig::default())
    }

    pub fn with_config(label: impl Into<String>, config: BufferConfig) -> Result<Self> {
        Ok(Self {
            label: label.into(),
            flags: 0,
            entries: 0,
            body: GrowableWriter::from_config(config)?,
        })
    }

    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn entry_count(&self) -> u32 {
        self.entries
    }

    /// Append one entry. On error the container is left as it was before the call.
    pub fn add_entry(&mut self, name: &str, payload: &[u8]) -> Result<&mut Self> {
        let entries = self.entries.checked_add(1).ok_or_else(|| {
            MarshalError::value_range("UInt32 entry_count", "container already holds u32::MAX entries")
        })?;
        let payload_len = u32::try_from(payload.len()).map_err(|_| {
            MarshalError::value_range(
                "UInt32 payload length",
                format!("{} byte payload for entry '{name}'", payload.len()),
            )
        })?;

        let name_bytes = codec::encode_text(name, TextEncoding::Utf8)?;
        let name_len = u32::try_from(name_bytes.len()).map_err(|_| {
            MarshalError::value_range("UInt32 name length", format!("{} byte entry name", name_bytes.len()))
        })?;

        // One append keeps the body unchanged if growth fails
        let mut frame = Vec::with_capacity(8 + name_bytes.len() + payload.len());
        frame.extend_from_slice(&name_len.to_le_bytes());
        frame.extend_from_slice(&name_bytes);
        frame.extend_from_slice(&payload_len.to_le_bytes());
        frame.extend_from_slice(payload);
        self.body.write_bytes(&frame)?;

        trace!(entry = name, bytes = payload.len(), "Added container entry");
        self.entries = entries;
        Ok(self)
    }

    /// Produce the finished container: header followed by every entry.
    pub fn finish(mut self) -> Result<Arc<[u8]>> {
        let layout = container_header_layout()?;
        let body = self.body.finalize()?;

        let mut out = GrowableWriter::new(CONTAINER_HEADER_SIZE + body.len())?;
        out.write_record(
            layout,
            [
                ("magic", Value::from(CONTAINER_MAGIC)),
                ("version", CONTAINER_VERSION.into()),
                ("flags", self.flags.into()),
                ("entry_count", self.entries.into()),
                ("header_size", (CONTAINER_HEADER_SIZE as u32).into()),
                ("payload_size", (body.len() as u64).into()),
                ("label", self.label.as_str().into()),
            ],
        )?;
        out.write_bytes(&body)?;

        debug!(entries = self.entries, bytes = out.position(), "Finished container");
        out.finalize()
    }
}

/// Read every entry of a container. `None` when the magic does not match.
pub fn read_container(bytes: &[u8]) -> Result<Option<(ParsedHeader, Vec<ContainerEntry>)>> {
    let header = parse_container_header(bytes)?;
    if !header.is_valid {
        return Ok(None);
    }

    let count = header.get("entry_count").and_then(Value::as_u64).unwrap_or(0);
    let header_size = header
        .get("header_size")
        .and_then(Value::as_u64)
        .and_then(|size| usize::try_from(size).ok())
        .unwrap_or(CONTAINER_HEADER_SIZE);
    if header_size < CONTAINER_HEADER_SIZE {
        return Err(MarshalError::value_range(
            "container header_size",
            format!("{} is smaller than the {}-byte header", header_size, CONTAINER_HEADER_SIZE),
        ));
    }

    let mut cursor = HeaderCursor::with_pos(bytes, header_size)?;
    let mut entries = Vec::new();
    for _ in 0..count {
        let name = cursor.read_length_prefixed_text(TextEncoding::Utf8)?;
        let len = cursor.read_scalar::<u32>(ByteOrder::LittleEndian)? as usize;
        let payload = cursor.take(len, "entry payload")?.to_vec();
        entries.push(ContainerEntry { name, payload });
    }

    debug!(entries = entries.len(), trailing = cursor.remaining(), "Read container");
    Ok(Some((header, entries)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_is_sbpk_on_disk() {
        assert_eq!(CONTAINER_MAGIC.to_le_bytes(), *b"SBPK");
    }

    #[test]
    fn built_container_reads_back() {
        let mut builder = ContainerBuilder::new("assets").unwrap().flags(0x1);
        builder.add_entry("a.txt", b"hello").unwrap().add_entry("empty", &[]).unwrap();
        assert_eq!(builder.entry_count(), 2);
        let bytes = builder.finish().unwrap();

        assert_eq!(&bytes[..4], b"SBPK");
        let (header, entries) = read_container(&bytes).unwrap().unwrap();
        assert_eq!(header.get("flags"), Some(&Value::UInt16(1)));
        assert_eq!(header.get("label"), Some(&Value::Text("assets".into())));
        assert_eq!(
            header.get("payload_size"),
            Some(&Value::UInt64((bytes.len() - CONTAINER_HEADER_SIZE) as u64))
        );
        assert_eq!(
            entries,
            vec![
                ContainerEntry { name: "a.txt".into(), payload: b"hello".to_vec() },
                ContainerEntry { name: "empty".into(), payload: vec![] },
            ]
        );
    }

    #[test]
    fn overlong_label_fails_on_finish() {
        let builder = ContainerBuilder::new("much-too-long").unwrap();
        assert!(matches!(builder.finish(), Err(MarshalError::ValueRange { .. })));
    }

    #[test]
    fn failed_entry_leaves_body_unchanged() {
        let config = BufferConfig::default().with_max_capacity(32).with_default_writer_capacity(16);
        let mut builder = ContainerBuilder::with_config("x", config).unwrap();
        builder.add_entry("a", &[1, 2, 3]).unwrap();
        let before = builder.body.written().to_vec();

        assert!(builder.add_entry("big", &[0; 64]).is_err());
        assert_eq!(builder.entry_count(), 1);
        assert_eq!(builder.body.written(), &before[..]);
    }

    #[test]
    fn truncated_entry_stream_is_reported() {
        let mut builder = ContainerBuilder::new("t").unwrap();
        builder.add_entry("payload", &[7; 10]).unwrap();
        let bytes = builder.finish().unwrap();

        let cut = &bytes[..bytes.len() - 3];
        assert!(matches!(read_container(cut), Err(MarshalError::TruncatedInput { .. })));
    }

    #[test]
    fn header_size_inside_the_header_is_rejected() {
        let mut builder = ContainerBuilder::new("t").unwrap();
        builder.add_entry("a", &[1]).unwrap();
        let mut bytes = builder.finish().unwrap().to_vec();

        bytes[12..16].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(read_container(&bytes), Err(MarshalError::ValueRange { .. })));

        bytes[12..16].copy_from_slice(&31u32.to_le_bytes());
        assert!(read_container(&bytes).is_err());
    }

    #[test]
    fn foreign_bytes_are_not_a_container() {
        assert!(read_container(&[0u8; 40]).unwrap().is_none());
    }
}
