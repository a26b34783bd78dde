//! Fixed-layout binary record marshaling.
//!
//! structpack builds and reads the exact byte layouts that operating system APIs and
//! file formats expect: Win32 `INPUT` arrays, PNG and BMP headers, custom container
//! headers. Every access is bounds checked and every value range checked, so nothing is
//! ever silently truncated.
//!
//! # Components
//!
//! - [`ByteBuffer`]: fixed-capacity, zero-initialized bytes with checked access
//! - [`codec`]: encode/decode of one typed field in either byte order
//! - [`StructLayout`]: named fields at fixed offsets, validated once and reused
//! - [`GrowableWriter`]: append-only writer that grows by doubling
//! - [`HeaderParser`]: magic-gated parsing of externally supplied bytes
//! - [`formats`]: ready-made layouts built from the above
//!
//! # Quick Start
//!
//! ```rust
//! use structpack::{ByteBuffer, FieldDescriptor, FieldKind, StructLayout, Value};
//!
//! let layout = StructLayout::define(
//!     [
//!         FieldDescriptor::le("type", FieldKind::UInt32, 0),
//!         FieldDescriptor::le("wVk", FieldKind::UInt16, 8),
//!         FieldDescriptor::le("dwFlags", FieldKind::UInt32, 12),
//!     ],
//!     28,
//! )?;
//!
//! let mut buffer = ByteBuffer::new(2 * layout.record_size())?;
//! layout.encode_record_array(
//!     &mut buffer,
//!     0,
//!     [
//!         vec![("type", Value::from(1u32)), ("wVk", 0x41u16.into())],
//!         vec![("type", Value::from(1u32)), ("wVk", 0x41u16.into()), ("dwFlags", 2u32.into())],
//!     ],
//! )?;
//!
//! // `buffer.as_ptr()` and `buffer.capacity()` are what a native call receives
//! assert_eq!(buffer.read_at(28 + 12, 4)?, &[2, 0, 0, 0]);
//! # Ok::<(), structpack::MarshalError>(())
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events (`debug` for allocations, growth and parse outcomes,
//! `trace` per field, `warn` for rejected magic numbers) and never installs a subscriber.

mod buffer;
pub mod codec;
mod config;
mod error;
pub mod formats;
pub mod header;
mod layout;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;
mod writer;

pub use buffer::ByteBuffer;
pub use config::{BufferConfig, DEFAULT_MAX_CAPACITY, DEFAULT_WRITER_CAPACITY};
pub use error::*;
pub use header::{HeaderCursor, HeaderParser, ParsedHeader};
pub use layout::StructLayout;
pub use types::*;
pub use writer::{GrowableWriter, UsageStats, WriterState};
