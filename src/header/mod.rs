//! Header parsing for externally supplied bytes
//!
//! [`HeaderParser`] checks a magic field before trusting anything else in the input: a
//! mismatch yields [`ParsedHeader::invalid`] with no fields decoded. Input shorter than
//! the layout is [`TruncatedInput`](crate::MarshalError::TruncatedInput), reported
//! before any field is looked at.
//!
//! [`HeaderCursor`] covers formats that are easier to walk field by field than to
//! describe as one layout.
//!
//! ```rust
//! use structpack::{FieldDescriptor, FieldKind, StructLayout, Value, header};
//!
//! let layout = StructLayout::define(
//!     [
//!         FieldDescriptor::le("magic", FieldKind::UInt16, 0),
//!         FieldDescriptor::le("size", FieldKind::UInt32, 2),
//!     ],
//!     6,
//! )?;
//!
//! let parsed = header::parse(&layout, b"BM\x36\0\0\0", "magic", &Value::UInt16(0x4D42))?;
//! assert!(parsed.is_valid);
//! assert_eq!(parsed.get("size"), Some(&Value::UInt32(54)));
//! # Ok::<(), structpack::MarshalError>(())
//! ```

mod cursor;
mod parser;

pub use cursor::HeaderCursor;
pub use parser::{HeaderParser, parse, parse_at};

use serde::Serialize;

use crate::{Record, Value};

/// Outcome of a header parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedHeader {
    /// Whether the magic field matched
    pub is_valid: bool,
    /// Decoded fields in declaration order; empty when `is_valid` is false
    pub fields: Record,
}

impl ParsedHeader {
    /// Result for input whose magic did not match.
    pub fn invalid() -> Self {
        Self { is_valid: false, fields: Record::new() }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_header_serializes_empty_fields() {
        let json = serde_json::to_value(ParsedHeader::invalid()).unwrap();
        assert_eq!(json, serde_json::json!({ "is_valid": false, "fields": {} }));
    }
}
