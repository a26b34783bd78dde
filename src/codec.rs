//! Single-field encode/decode
//!
//! Stateless functions that turn one [`Value`] into the exact bytes of a [`FieldKind`] and
//! back. Nothing here touches a [`ByteBuffer`](crate::ByteBuffer); layouts and parsers
//! compose these calls with buffer offsets.
//!
//! Rules:
//! - Integers are range checked against the target kind, never truncated.
//! - Floats must round-trip exactly into the target precision.
//! - `FixedText` is zero padded on the right to its width and stripped of trailing zero
//!   code units on decode. Text longer than the width is rejected.
//! - `FixedBytes` must be given exactly `width` bytes.
//!
//! ```rust
//! use structpack::{ByteOrder, FieldKind, Value, codec};
//!
//! let le = codec::encode(&FieldKind::UInt32, ByteOrder::LittleEndian, &Value::UInt32(800))?;
//! assert_eq!(le, [0x20, 0x03, 0x00, 0x00]);
//!
//! let be = codec::decode(&FieldKind::UInt32, ByteOrder::BigEndian, &le)?;
//! assert_eq!(be, Value::UInt32(537_067_520));
//! assert_ne!(be, Value::UInt32(800));
//! # Ok::<(), structpack::MarshalError>(())
//! ```

use byteorder::{BigEndian, ByteOrder as Order, LittleEndian};
use encoding::all::{ASCII, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252};
use encoding::{DecoderTrap, EncoderTrap, EncodingRef};
use tracing::trace;

use crate::{ByteOrder, FieldKind, MarshalError, Result, TextEncoding, Value};

/// Encode `value` as a freshly allocated `kind.width()`-byte vector.
pub fn encode(kind: &FieldKind, order: ByteOrder, value: &Value) -> Result<Vec<u8>> {
    let mut out = vec![0u8; kind.width()];
    encode_into(kind, order, value, &mut out)?;
    Ok(out)
}

/// Encode `value` into the first `kind.width()` bytes of `out`.
///
/// `out` is only modified when encoding succeeds.
pub fn encode_into(kind: &FieldKind, order: ByteOrder, value: &Value, out: &mut [u8]) -> Result<()> {
    let width = kind.width();
    let available = out.len();
    let out = out.get_mut(..width).ok_or(MarshalError::out_of_bounds(0, width, available))?;
    trace!(%kind, ?order, value = value.type_name(), "Encoding field");

    match order {
        ByteOrder::LittleEndian => encode_with::<LittleEndian>(kind, value, out),
        ByteOrder::BigEndian => encode_with::<BigEndian>(kind, value, out),
    }
}

/// Decode the first `kind.width()` bytes of `bytes`.
pub fn decode(kind: &FieldKind, order: ByteOrder, bytes: &[u8]) -> Result<Value> {
    let width = kind.width();
    let bytes = bytes
        .get(..width)
        .ok_or_else(|| MarshalError::truncated(kind.to_string(), width, bytes.len()))?;

    match order {
        ByteOrder::LittleEndian => decode_with::<LittleEndian>(kind, bytes),
        ByteOrder::BigEndian => decode_with::<BigEndian>(kind, bytes),
    }
}

fn encode_with<O: Order>(kind: &FieldKind, value: &Value, out: &mut [u8]) -> Result<()> {
    match *kind {
        FieldKind::UInt8 => out[0] = integer::<u8>(kind, value)?,
        FieldKind::Int8 => out[0] = integer::<i8>(kind, value)? as u8,
        FieldKind::UInt16 => O::write_u16(out, integer(kind, value)?),
        FieldKind::Int16 => O::write_i16(out, integer(kind, value)?),
        FieldKind::UInt32 => O::write_u32(out, integer(kind, value)?),
        FieldKind::Int32 => O::write_i32(out, integer(kind, value)?),
        FieldKind::UInt64 => O::write_u64(out, integer(kind, value)?),
        FieldKind::Int64 => O::write_i64(out, integer(kind, value)?),
        FieldKind::Float32 => O::write_f32(out, float32(kind, value)?),
        FieldKind::Float64 => O::write_f64(out, float64(kind, value)?),
        FieldKind::FixedText { width, encoding } => {
            if let Some(details) = misaligned_text(kind) {
                return Err(MarshalError::value_range(kind.to_string(), details));
            }
            let text = value.as_str().ok_or_else(|| mismatch(kind, value))?;
            let encoded = encode_text(text, encoding)?;
            if encoded.len() > width {
                return Err(MarshalError::value_range(
                    kind.to_string(),
                    format!("text encodes to {} bytes, field holds {}", encoded.len(), width),
                ));
            }
            out[..encoded.len()].copy_from_slice(&encoded);
            out[encoded.len()..].fill(0);
        }
        FieldKind::FixedBytes { width } => {
            let bytes = value.as_bytes().ok_or_else(|| mismatch(kind, value))?;
            if bytes.len() != width {
                return Err(MarshalError::value_range(
                    kind.to_string(),
                    format!("expected exactly {} bytes, got {}", width, bytes.len()),
                ));
            }
            out.copy_from_slice(bytes);
        }
    }
    Ok(())
}

fn decode_with<O: Order>(kind: &FieldKind, bytes: &[u8]) -> Result<Value> {
    let value = match *kind {
        FieldKind::UInt8 => Value::UInt8(bytes[0]),
        FieldKind::Int8 => Value::Int8(bytes[0] as i8),
        FieldKind::UInt16 => Value::UInt16(O::read_u16(bytes)),
        FieldKind::Int16 => Value::Int16(O::read_i16(bytes)),
        FieldKind::UInt32 => Value::UInt32(O::read_u32(bytes)),
        FieldKind::Int32 => Value::Int32(O::read_i32(bytes)),
        FieldKind::UInt64 => Value::UInt64(O::read_u64(bytes)),
        FieldKind::Int64 => Value::Int64(O::read_i64(bytes)),
        FieldKind::Float32 => Value::Float32(O::read_f32(bytes)),
        FieldKind::Float64 => Value::Float64(O::read_f64(bytes)),
        FieldKind::FixedText { encoding, .. } => Value::Text(decode_text(bytes, encoding)?),
        FieldKind::FixedBytes { .. } => Value::Bytes(bytes.to_vec()),
    };
    Ok(value)
}

fn mismatch(kind: &FieldKind, value: &Value) -> MarshalError {
    MarshalError::value_range(
        kind.to_string(),
        format!("{} value cannot be stored in this field", value.type_name()),
    )
}

fn integer<T: TryFrom<i128>>(kind: &FieldKind, value: &Value) -> Result<T> {
    let wide = value.as_i128().ok_or_else(|| mismatch(kind, value))?;
    T::try_from(wide).map_err(|_| {
        MarshalError::value_range(kind.to_string(), format!("{} does not fit", wide))
    })
}

fn float32(kind: &FieldKind, value: &Value) -> Result<f32> {
    let inexact = || {
        MarshalError::value_range(kind.to_string(), format!("{:?} is not exact in f32", value))
    };
    match *value {
        Value::Float32(v) => Ok(v),
        Value::Float64(v) => {
            let narrowed = v as f32;
            if v.is_nan() || f64::from(narrowed) == v { Ok(narrowed) } else { Err(inexact()) }
        }
        _ => {
            let wide = value.as_i128().ok_or_else(|| mismatch(kind, value))?;
            let f = wide as f32;
            if f.is_finite() && f as i128 == wide { Ok(f) } else { Err(inexact()) }
        }
    }
}

fn float64(kind: &FieldKind, value: &Value) -> Result<f64> {
    match *value {
        Value::Float32(v) => Ok(v.into()),
        Value::Float64(v) => Ok(v),
        _ => {
            let wide = value.as_i128().ok_or_else(|| mismatch(kind, value))?;
            let f = wide as f64;
            if f as i128 == wide {
                Ok(f)
            } else {
                Err(MarshalError::value_range(
                    kind.to_string(),
                    format!("{} is not exact in f64", wide),
                ))
            }
        }
    }
}

fn codec_for(encoding: TextEncoding) -> EncodingRef {
    match encoding {
        TextEncoding::Utf8 => UTF_8,
        TextEncoding::Utf16Le => UTF_16LE,
        TextEncoding::Utf16Be => UTF_16BE,
        TextEncoding::Ascii => ASCII,
        TextEncoding::Windows1252 => WINDOWS_1252,
    }
}

/// Size of one code unit; padding is stripped in whole units.
fn code_unit(encoding: TextEncoding) -> usize {
    match encoding {
        TextEncoding::Utf16Le | TextEncoding::Utf16Be => 2,
        _ => 1,
    }
}

/// Describes why a `FixedText` width cannot hold whole code units, if it cannot.
pub(crate) fn misaligned_text(kind: &FieldKind) -> Option<String> {
    match *kind {
        FieldKind::FixedText { width, encoding } if width % code_unit(encoding) != 0 => Some(
            format!("{:?} text needs an even width, got {}", encoding, width),
        ),
        _ => None,
    }
}

/// Encode text without padding. Characters the encoding cannot represent are errors.
pub fn encode_text(text: &str, encoding: TextEncoding) -> Result<Vec<u8>> {
    codec_for(encoding).encode(text, EncoderTrap::Strict).map_err(|cause| {
        MarshalError::value_range(format!("{:?} text", encoding), cause.into_owned())
    })
}

/// Decode text after removing trailing zero code units.
pub fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Result<String> {
    let unit = code_unit(encoding);
    let mut end = bytes.len();
    while end >= unit && bytes[end - unit..end].iter().all(|&b| b == 0) {
        end -= unit;
    }

    codec_for(encoding).decode(&bytes[..end], DecoderTrap::Strict).map_err(|cause| {
        MarshalError::value_range(format!("{:?} text", encoding), cause.into_owned())
    })
}

/// Rust primitives with a matching scalar [`FieldKind`].
pub trait Scalar: Copy + Into<Value> {
    const KIND: FieldKind;

    /// Extract `Self` from a value of exactly the matching variant.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: FieldKind = FieldKind::$variant;

                fn from_value(value: &Value) -> Option<Self> {
                    match *value {
                        Value::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_scalar! {
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
}

/// Typed decode of a scalar.
pub fn decode_scalar<T: Scalar>(order: ByteOrder, bytes: &[u8]) -> Result<T> {
    let value = decode(&T::KIND, order, bytes)?;
    T::from_value(&value).ok_or_else(|| mismatch(&T::KIND, &value))
}
