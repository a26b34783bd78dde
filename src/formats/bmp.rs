//! `BITMAPFILEHEADER` + `BITMAPINFOHEADER`
//!
//! 54 little-endian bytes at the start of an uncompressed Windows bitmap. The file
//! header's `bfType` is the magic, `"BM"` read as a little-endian `u16`.

use std::sync::LazyLock;

use tracing::debug;

use crate::header::{HeaderParser, ParsedHeader};
use crate::{ByteBuffer, FieldDescriptor, FieldKind, MarshalError, Result, StructLayout, Value};

/// `"BM"` as a little-endian `u16`.
pub const BMP_MAGIC: u16 = 0x4D42;

pub const BMP_FILE_HEADER_SIZE: usize = 14;
pub const BMP_INFO_HEADER_SIZE: usize = 40;
pub const BMP_HEADER_SIZE: usize = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE;

/// `BI_RGB`
pub const BI_RGB: u32 = 0;

static BMP_HEADER: LazyLock<Result<StructLayout>> = LazyLock::new(|| {
    StructLayout::define(
        [
            FieldDescriptor::le("bfType", FieldKind::UInt16, 0),
            FieldDescriptor::le("bfSize", FieldKind::UInt32, 2),
            FieldDescriptor::le("bfReserved1", FieldKind::UInt16, 6),
            FieldDescriptor::le("bfReserved2", FieldKind::UInt16, 8),
            FieldDescriptor::le("bfOffBits", FieldKind::UInt32, 10),
            FieldDescriptor::le("biSize", FieldKind::UInt32, 14),
            FieldDescriptor::le("biWidth", FieldKind::Int32, 18),
            FieldDescriptor::le("biHeight", FieldKind::Int32, 22),
            FieldDescriptor::le("biPlanes", FieldKind::UInt16, 26),
            FieldDescriptor::le("biBitCount", FieldKind::UInt16, 28),
            FieldDescriptor::le("biCompression", FieldKind::UInt32, 30),
            FieldDescriptor::le("biSizeImage", FieldKind::UInt32, 34),
            FieldDescriptor::le("biXPelsPerMeter", FieldKind::Int32, 38),
            FieldDescriptor::le("biYPelsPerMeter", FieldKind::Int32, 42),
            FieldDescriptor::le("biClrUsed", FieldKind::UInt32, 46),
            FieldDescriptor::le("biClrImportant", FieldKind::UInt32, 50),
        ],
        BMP_HEADER_SIZE,
    )
});

pub fn bmp_header_layout() -> Result<&'static StructLayout> {
    BMP_HEADER.as_ref().map_err(|e| e.clone())
}

/// Parse the file and info headers of a bitmap.
pub fn parse_bmp_header(bytes: &[u8]) -> Result<ParsedHeader> {
    let layout = bmp_header_layout()?;
    HeaderParser::new(layout, "bfType", &Value::from(BMP_MAGIC))?.parse(bytes)
}

/// Bytes per pixel row, padded to a multiple of four.
pub fn row_stride(width: u32, bits_per_pixel: u16) -> Option<u32> {
    let bits = width.checked_mul(u32::from(bits_per_pixel))?;
    Some(bits.div_ceil(32) * 4)
}

/// Headers for an uncompressed `BI_RGB` bitmap whose pixel data follows immediately.
///
/// A negative `height` describes a top-down bitmap, as in `BITMAPINFOHEADER`.
pub fn encode_bmp_header(width: i32, height: i32, bits_per_pixel: u16) -> Result<ByteBuffer> {
    let layout = bmp_header_layout()?;

    let image_size = u32::try_from(width)
        .ok()
        .and_then(|w| row_stride(w, bits_per_pixel))
        .and_then(|stride| stride.checked_mul(height.unsigned_abs()))
        .ok_or_else(|| {
            MarshalError::value_range(
                "UInt32 biSizeImage",
                format!("{width}x{height} at {bits_per_pixel} bpp does not fit"),
            )
        })?;
    let file_size = image_size.checked_add(BMP_HEADER_SIZE as u32).ok_or_else(|| {
        MarshalError::value_range("UInt32 bfSize", format!("{image_size} pixel bytes plus headers"))
    })?;

    let mut buffer = ByteBuffer::new(BMP_HEADER_SIZE)?;
    layout.encode_record(
        &mut buffer,
        0,
        [
            ("bfType", Value::from(BMP_MAGIC)),
            ("bfSize", file_size.into()),
            ("bfOffBits", (BMP_HEADER_SIZE as u32).into()),
            ("biSize", (BMP_INFO_HEADER_SIZE as u32).into()),
            ("biWidth", width.into()),
            ("biHeight", height.into()),
            ("biPlanes", 1u16.into()),
            ("biBitCount", bits_per_pixel.into()),
            ("biCompression", BI_RGB.into()),
            ("biSizeImage", image_size.into()),
        ],
    )?;

    debug!(width, height, bits_per_pixel, file_size, "Encoded BMP header");
    Ok(buffer)
}
