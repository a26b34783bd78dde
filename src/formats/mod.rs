//! Ready-made layouts for common binary records
//!
//! Each layout is defined once, on first use, and shared read-only afterwards.
//!
//! - [`win32`]: `INPUT` records (keyboard and mouse) for x64 and x86 processes
//! - [`png`]: PNG signature and `IHDR` chunk
//! - [`bmp`]: `BITMAPFILEHEADER` and `BITMAPINFOHEADER`
//! - [`container`]: the `SBPK` container header and its entry stream

pub mod bmp;
pub mod container;
pub mod png;
pub mod win32;

pub use bmp::parse_bmp_header;
pub use container::{ContainerBuilder, ContainerEntry, parse_container_header, read_container};
pub use png::parse_png_header;
pub use win32::{Abi, MouseEvent, key_tap_batch, mouse_batch, unicode_text_batch};
