//! Sample byte builders for tests and benchmarks
//!
//! Every builder writes its bytes by hand, without going through the crate's layouts, so
//! tests compare the layouts against an independent rendition of each format.

#![cfg(any(test, feature = "benchmark"))]

use crate::formats::png::PNG_SIGNATURE;

/// A minimal PNG: signature, `IHDR` (8-bit RGB), a zeroed CRC and an empty `IEND` chunk.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend(13u32.to_be_bytes());
    bytes.extend(b"IHDR");
    bytes.extend(width.to_be_bytes());
    bytes.extend(height.to_be_bytes());
    // bit depth, color type (RGB), compression, filter, interlace
    bytes.extend([8, 2, 0, 0, 0]);
    bytes.extend([0; 4]);
    bytes.extend(0u32.to_be_bytes());
    bytes.extend(b"IEND");
    bytes.extend([0xAE, 0x42, 0x60, 0x82]);
    bytes
}

/// A 24-bit bottom-up bitmap with zeroed pixel rows.
pub fn sample_bmp(width: u32, height: u32) -> Vec<u8> {
    let stride = (width * 3).div_ceil(4) * 4;
    let image_size = stride * height;

    let mut bytes: Vec<u8> = Vec::with_capacity(54 + image_size as usize);
    bytes.extend(b"BM");
    bytes.extend((54 + image_size).to_le_bytes());
    bytes.extend([0; 4]);
    bytes.extend(54u32.to_le_bytes());
    bytes.extend(40u32.to_le_bytes());
    bytes.extend((width as i32).to_le_bytes());
    bytes.extend((height as i32).to_le_bytes());
    bytes.extend(1u16.to_le_bytes());
    bytes.extend(24u16.to_le_bytes());
    bytes.extend(0u32.to_le_bytes());
    bytes.extend(image_size.to_le_bytes());
    bytes.extend(2835i32.to_le_bytes());
    bytes.extend(2835i32.to_le_bytes());
    bytes.extend([0; 8]);
    bytes.resize(54 + image_size as usize, 0);
    bytes
}

/// An `SBPK` container holding `entries`, labelled `label` (at most eight ASCII bytes).
pub fn sample_container(label: &str, entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body: Vec<u8> = Vec::new();
    for (name, payload) in entries {
        body.extend((name.len() as u32).to_le_bytes());
        body.extend(name.as_bytes());
        body.extend((payload.len() as u32).to_le_bytes());
        body.extend(*payload);
    }

    let mut label_bytes = [0u8; 8];
    label_bytes[..label.len()].copy_from_slice(label.as_bytes());

    let mut bytes: Vec<u8> = Vec::with_capacity(32 + body.len());
    bytes.extend(b"SBPK");
    bytes.extend(1u16.to_le_bytes());
    bytes.extend(0u16.to_le_bytes());
    bytes.extend((entries.len() as u32).to_le_bytes());
    bytes.extend(32u32.to_le_bytes());
    bytes.extend((body.len() as u64).to_le_bytes());
    bytes.extend(label_bytes);
    bytes.extend(body);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_sizes() {
        assert_eq!(sample_png(1, 1).len(), 8 + 8 + 13 + 4 + 12);
        assert_eq!(sample_bmp(2, 2).len(), 54 + 16);
        assert_eq!(sample_container("x", &[("a", &b"bc"[..])]).len(), 32 + 4 + 1 + 4 + 2);
    }
}
