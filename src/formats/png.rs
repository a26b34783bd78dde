//! PNG signature and `IHDR` chunk
//!
//! The first 29 bytes of every PNG file: the 8-byte signature followed by the `IHDR`
//! chunk's length, type and 13-byte body, all big-endian. The chunk CRC that follows is
//! not part of the layout and is not checked.

use std::sync::LazyLock;

use crate::header::{HeaderParser, ParsedHeader};
use crate::{FieldDescriptor, FieldKind, Result, StructLayout, Value};

/// `\x89PNG\r\n\x1a\n`
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Signature plus the `IHDR` chunk up to (not including) its CRC.
pub const PNG_HEADER_SIZE: usize = 29;

static PNG_HEADER: LazyLock<Result<StructLayout>> = LazyLock::new(|| {
    StructLayout::define(
        [
            FieldDescriptor::be("signature", FieldKind::bytes(8), 0),
            FieldDescriptor::be("ihdr_length", FieldKind::UInt32, 8),
            FieldDescriptor::be("ihdr_type", FieldKind::bytes(4), 12),
            FieldDescriptor::be("width", FieldKind::UInt32, 16),
            FieldDescriptor::be("height", FieldKind::UInt32, 20),
            FieldDescriptor::be("bit_depth", FieldKind::UInt8, 24),
            FieldDescriptor::be("color_type", FieldKind::UInt8, 25),
            FieldDescriptor::be("compression", FieldKind::UInt8, 26),
            FieldDescriptor::be("filter", FieldKind::UInt8, 27),
            FieldDescriptor::be("interlace", FieldKind::UInt8, 28),
        ],
        PNG_HEADER_SIZE,
    )
});

pub fn png_header_layout() -> Result<&'static StructLayout> {
    PNG_HEADER.as_ref().map_err(|e| e.clone())
}

/// Parse the signature and `IHDR` of a PNG file.
///
/// `is_valid` is false when the signature does not match; nothing else is decoded then.
pub fn parse_png_header(bytes: &[u8]) -> Result<ParsedHeader> {
    let layout = png_header_layout()?;
    HeaderParser::new(layout, "signature", &Value::from(PNG_SIGNATURE))?.parse(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarshalError;
    use crate::test_utils::sample_png;

    #[test]
    fn sample_png_parses() {
        let header = parse_png_header(&sample_png(640, 480)).unwrap();
        assert!(header.is_valid);
        assert_eq!(header.get("width"), Some(&Value::UInt32(640)));
        assert_eq!(header.get("height"), Some(&Value::UInt32(480)));
        assert_eq!(header.get("ihdr_length"), Some(&Value::UInt32(13)));
        assert_eq!(header.get("ihdr_type"), Some(&Value::Bytes(b"IHDR".to_vec())));
        assert_eq!(header.get("bit_depth"), Some(&Value::UInt8(8)));
    }

    #[test]
    fn signature_alone_is_truncated() {
        let err = parse_png_header(&PNG_SIGNATURE).unwrap_err();
        assert_eq!(err, MarshalError::truncated("header", PNG_HEADER_SIZE, 8));
    }
}
