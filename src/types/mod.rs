//! Core types for describing fixed-layout binary data.
//!
//! ## Architecture
//!
//! - [`FieldKind`] is the closed set of encodable kinds, each with a known width
//! - [`ByteOrder`] selects little- or big-endian encoding for multi-byte numbers
//! - [`TextEncoding`] selects the character encoding of text fields
//! - [`Value`] holds one decoded or to-be-encoded field value
//! - [`FieldDescriptor`] places a named kind at a byte offset inside a record
//! - [`Record`] maps field names to values in declaration order
//!
//! ## Usage Example
//!
//! ```rust
//! use structpack::types::{FieldDescriptor, FieldKind, TextEncoding, Value};
//!
//! let magic = FieldDescriptor::le("magic", FieldKind::UInt32, 0);
//! let name = FieldDescriptor::le("name", FieldKind::text(16, TextEncoding::Utf8), 4);
//!
//! assert_eq!(magic.width(), 4);
//! assert_eq!(name.end(), Some(20));
//! assert_eq!(Value::from(800u32).as_u64(), Some(800));
//! ```

mod descriptor;
mod field_kind;

pub use descriptor::FieldDescriptor;
pub use field_kind::{ByteOrder, FieldKind, TextEncoding, Value};

/// Field values keyed by name, iterated in insertion order.
pub type Record = indexmap::IndexMap<String, Value>;
