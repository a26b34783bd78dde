//! Field kind, byte order and text encoding definitions

use std::fmt;

use serde::{Deserialize, Serialize};

/// Byte order of a multi-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Least significant byte first (x86, Win32 structures, BMP)
    #[default]
    LittleEndian,
    /// Most significant byte first (network order, PNG)
    BigEndian,
}

/// Text encodings supported by fixed-width and length-prefixed text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// UTF-16, little-endian code units (Win32 `W` APIs)
    Utf16Le,
    /// UTF-16, big-endian code units
    Utf16Be,
    /// 7-bit ASCII
    Ascii,
    /// Windows-1252, the "ANSI" code page of Win32 `A` APIs
    Windows1252,
}

/// Closed set of field kinds.
///
/// Every kind knows its encoded width, so a descriptor never carries a width that can
/// disagree with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    /// IEEE 754 single precision
    Float32,
    /// IEEE 754 double precision
    Float64,
    /// Text right-padded with zero bytes to exactly `width` bytes
    FixedText { width: usize, encoding: TextEncoding },
    /// Raw bytes copied verbatim (signatures, reserved blocks)
    FixedBytes { width: usize },
}

impl FieldKind {
    /// Returns the encoded size in bytes of this kind.
    pub const fn width(&self) -> usize {
        match self {
            FieldKind::UInt8 | FieldKind::Int8 => 1,
            FieldKind::UInt16 | FieldKind::Int16 => 2,
            FieldKind::UInt32 | FieldKind::Int32 | FieldKind::Float32 => 4,
            FieldKind::UInt64 | FieldKind::Int64 | FieldKind::Float64 => 8,
            FieldKind::FixedText { width, .. } | FieldKind::FixedBytes { width } => *width,
        }
    }

    /// Shorthand for a fixed-width text kind.
    pub const fn text(width: usize, encoding: TextEncoding) -> Self {
        FieldKind::FixedText { width, encoding }
    }

    /// Shorthand for a fixed-width raw byte kind.
    pub const fn bytes(width: usize) -> Self {
        FieldKind::FixedBytes { width }
    }

    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            FieldKind::UInt8
                | FieldKind::Int8
                | FieldKind::UInt16
                | FieldKind::Int16
                | FieldKind::UInt32
                | FieldKind::Int32
                | FieldKind::UInt64
                | FieldKind::Int64
        )
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, FieldKind::Float32 | FieldKind::Float64)
    }

    /// Byte order only matters for multi-byte numeric kinds.
    pub const fn is_order_sensitive(&self) -> bool {
        (self.is_integer() || self.is_float()) && self.width() > 1
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::FixedText { width, encoding } => write!(f, "FixedText[{width}, {encoding:?}]"),
            FieldKind::FixedBytes { width } => write!(f, "FixedBytes[{width}]"),
            scalar => fmt::Debug::fmt(scalar, f),
        }
    }
}

/// A decoded (or to-be-encoded) field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    UInt8(u8),
    Int8(i8),
    UInt16(u16),
    Int16(i16),
    UInt32(u32),
    Int32(i32),
    UInt64(u64),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    /// Widened integer view, used for range checks against the target kind.
    pub(crate) fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::UInt8(v) => Some(v.into()),
            Value::Int8(v) => Some(v.into()),
            Value::UInt16(v) => Some(v.into()),
            Value::Int16(v) => Some(v.into()),
            Value::UInt32(v) => Some(v.into()),
            Value::Int32(v) => Some(v.into()),
            Value::UInt64(v) => Some(v.into()),
            Value::Int64(v) => Some(v.into()),
            _ => None,
        }
    }

    /// Integer value as `u64` when it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i128().and_then(|v| u64::try_from(v).ok())
    }

    /// Integer value as `i64` when it fits.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Numeric value as `f64`. Integers beyond 2^53 lose precision.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float32(v) => Some(v.into()),
            Value::Float64(v) => Some(v),
            _ => self.as_i128().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::UInt8(_) => "UInt8",
            Value::Int8(_) => "Int8",
            Value::UInt16(_) => "UInt16",
            Value::Int16(_) => "Int16",
            Value::UInt32(_) => "UInt32",
            Value::Int32(_) => "Int32",
            Value::UInt64(_) => "UInt64",
            Value::Int64(_) => "Int64",
            Value::Float32(_) => "Float32",
            Value::Float64(_) => "Float64",
            Value::Text(_) => "Text",
            Value::Bytes(_) => "Bytes",
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_value_from! {
    u8 => UInt8,
    i8 => Int8,
    u16 => UInt16,
    i16 => Int16,
    u32 => UInt32,
    i32 => Int32,
    u64 => UInt64,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => Text,
    Vec<u8> => Bytes,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(v: [u8; N]) -> Self {
        Value::Bytes(v.to_vec())
    }
}
