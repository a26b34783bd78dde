//! End-to-end behavior of buffers, codecs, layouts, writers and header parsing.

use anyhow::{Context, Result, ensure};
use structpack::{
    ByteBuffer, ByteOrder, FieldDescriptor, FieldKind, GrowableWriter, MarshalError, StructLayout,
    TextEncoding, Value, codec, formats, header,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn byte_order_reinterpretation() -> Result<()> {
    init_logging();

    let mut buffer = ByteBuffer::new(4)?;
    let le = codec::encode(&FieldKind::UInt32, ByteOrder::LittleEndian, &Value::UInt32(800))?;
    buffer.write_at(0, &le)?;
    assert_eq!(buffer.as_bytes(), &[0x20, 0x03, 0x00, 0x00]);

    let as_le = codec::decode(&FieldKind::UInt32, ByteOrder::LittleEndian, buffer.as_bytes())?;
    let as_be = codec::decode(&FieldKind::UInt32, ByteOrder::BigEndian, buffer.as_bytes())?;
    assert_eq!(as_le, Value::UInt32(800));
    assert_eq!(as_be, Value::UInt32(537_067_520));
    assert_ne!(as_be, as_le);

    let err = codec::encode(&FieldKind::UInt8, ByteOrder::LittleEndian, &Value::UInt32(300))
        .expect_err("300 does not fit in a byte");
    assert!(matches!(err, MarshalError::ValueRange { .. }));
    Ok(())
}

#[test]
fn batched_keyboard_records() -> Result<()> {
    init_logging();

    let layout = StructLayout::define(
        [
            FieldDescriptor::le("type", FieldKind::UInt32, 0),
            FieldDescriptor::le("wVk", FieldKind::UInt16, 8),
            FieldDescriptor::le("wScan", FieldKind::UInt16, 10),
            FieldDescriptor::le("dwFlags", FieldKind::UInt32, 12),
        ],
        28,
    )?;

    let key_down = vec![("type", Value::from(1u32)), ("wVk", Value::from(0x41u16))];
    let key_up = vec![
        ("type", Value::from(1u32)),
        ("wVk", Value::from(0x41u16)),
        ("dwFlags", Value::from(0x0002u32)),
    ];

    let mut batched = ByteBuffer::new(56)?;
    let written = layout.encode_record_array(&mut batched, 0, [key_down.clone(), key_up.clone()])?;
    ensure!(written == 2, "expected two records, wrote {written}");

    let mut one_by_one = ByteBuffer::new(56)?;
    layout.encode_record(&mut one_by_one, 0, key_down)?;
    layout.encode_record(&mut one_by_one, 28, key_up)?;
    assert_eq!(batched.as_bytes(), one_by_one.as_bytes());

    // wScan and the padding between type and the union stay zero
    assert_eq!(batched.read_at(4, 4)?, &[0; 4]);
    assert_eq!(batched.read_at(10, 2)?, &[0; 2]);
    assert_eq!(batched.read_at(28 + 12, 4)?, &[0x02, 0, 0, 0]);
    Ok(())
}

#[test]
fn png_signature_gating() -> Result<()> {
    init_logging();

    let mut png: Vec<u8> = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    png.extend(13u32.to_be_bytes());
    png.extend(b"IHDR");
    png.extend(1920u32.to_be_bytes());
    png.extend(1080u32.to_be_bytes());
    png.extend([8, 6, 0, 0, 0]);

    let parsed = formats::parse_png_header(&png)?;
    ensure!(parsed.is_valid, "genuine signature rejected");
    assert_eq!(parsed.get("width"), Some(&Value::UInt32(1920)));
    assert_eq!(parsed.get("color_type"), Some(&Value::UInt8(6)));

    let mut corrupted = png.clone();
    corrupted[0] = 0x88;
    let parsed = formats::parse_png_header(&corrupted)?;
    assert!(!parsed.is_valid);
    assert!(parsed.fields.is_empty());
    Ok(())
}

#[test]
fn writer_growth_from_tiny_capacity() -> Result<()> {
    init_logging();

    let mut writer = GrowableWriter::new(4)?;
    writer.write_field(&FieldKind::UInt32, ByteOrder::LittleEndian, &Value::UInt32(0xDEAD_BEEF))?;
    writer.write_field(&FieldKind::UInt32, ByteOrder::BigEndian, &Value::UInt32(1))?;
    writer.write_field(
        &FieldKind::text(8, TextEncoding::Utf8),
        ByteOrder::LittleEndian,
        &Value::from("payload"),
    )?;

    let stats = writer.usage_stats();
    assert_eq!(stats.used_bytes, 16);
    assert!(stats.capacity_bytes >= 16);
    assert!(stats.grow_count >= 1);

    let bytes = writer.finalize().context("finalizing writer")?;
    assert_eq!(&bytes[..4], &[0xEF, 0xBE, 0xAD, 0xDE]);
    assert_eq!(&bytes[4..8], &[0, 0, 0, 1]);
    assert_eq!(&bytes[8..], b"payload\0");
    Ok(())
}

#[test]
fn growth_matches_single_large_buffer() -> Result<()> {
    let fields: Vec<(FieldKind, Value)> = (0..200u32)
        .map(|i| match i % 3 {
            0 => (FieldKind::UInt16, Value::from((i * 7) as u16)),
            1 => (FieldKind::Float64, Value::from(f64::from(i) / 4.0)),
            _ => (FieldKind::text(5, TextEncoding::Ascii), Value::from(format!("n{i}"))),
        })
        .collect();

    let mut growing = GrowableWriter::new(1)?;
    let mut roomy = GrowableWriter::new(4096)?;
    for (kind, value) in &fields {
        growing.write_field(kind, ByteOrder::BigEndian, value)?;
        roomy.write_field(kind, ByteOrder::BigEndian, value)?;
    }

    assert_eq!(roomy.usage_stats().grow_count, 0);
    assert!(growing.usage_stats().grow_count > 5);
    assert_eq!(growing.finalize()?, roomy.finalize()?);
    Ok(())
}

#[test]
fn truncated_header_input_is_an_error() -> Result<()> {
    let layout = StructLayout::define(
        [
            FieldDescriptor::le("magic", FieldKind::UInt32, 0),
            FieldDescriptor::le("size", FieldKind::UInt64, 8),
        ],
        16,
    )?;

    let err = header::parse(&layout, &[0x53, 0x42, 0x50, 0x4B], "magic", &Value::UInt32(0x4B50_4253))
        .expect_err("four bytes cannot hold a 16 byte header");
    assert_eq!(err, MarshalError::truncated("header", 16, 4));
    assert!(err.is_input_error());
    Ok(())
}

#[test]
fn errors_carry_recovery_hints() {
    let err = ByteBuffer::new(8).and_then(|mut b| b.write_at(6, &[0; 4])).unwrap_err();
    assert!(err.to_string().contains("offset 0x6"));
    assert!(err.recovery_suggestions().contains(&"Retry with a larger buffer"));
    assert!(!err.is_input_error());
}
