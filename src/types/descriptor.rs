//! Field descriptor types

use serde::{Deserialize, Serialize};

use super::{ByteOrder, FieldKind};

/// Placement of a single named field inside a fixed-layout record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, used for lookup and diagnostics
    pub name: String,
    /// Encoded kind (determines width)
    pub kind: FieldKind,
    /// Byte order for multi-byte numeric kinds
    pub byte_order: ByteOrder,
    /// Byte offset from the start of the record
    pub offset: usize,
}

impl FieldDescriptor {
    /// Create a descriptor with an explicit byte order.
    pub fn new(
        name: impl Into<String>,
        kind: FieldKind,
        byte_order: ByteOrder,
        offset: usize,
    ) -> Self {
        Self { name: name.into(), kind, byte_order, offset }
    }

    /// Little-endian field.
    pub fn le(name: impl Into<String>, kind: FieldKind, offset: usize) -> Self {
        Self::new(name, kind, ByteOrder::LittleEndian, offset)
    }

    /// Big-endian field.
    pub fn be(name: impl Into<String>, kind: FieldKind, offset: usize) -> Self {
        Self::new(name, kind, ByteOrder::BigEndian, offset)
    }

    /// Bytes occupied by this field.
    pub fn width(&self) -> usize {
        self.kind.width()
    }

    /// One past the last byte of this field, `None` on overflow.
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.width())
    }
}
