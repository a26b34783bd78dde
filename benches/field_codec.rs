//! Benchmarks for single-field encode/decode and record layouts
//!
//! Tests per-call cost of:
//! - Scalar encode/decode in both byte orders
//! - Fixed text encoding with zero padding
//! - Encoding a batch of keyboard INPUT records through a layout

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use structpack::formats::{Abi, key_tap_batch};
use structpack::{ByteOrder, FieldKind, TextEncoding, Value, codec};

fn bench_scalars(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar_codec");

    for order in [ByteOrder::LittleEndian, ByteOrder::BigEndian] {
        let value = Value::UInt32(0xDEAD_BEEF);
        let bytes = codec::encode(&FieldKind::UInt32, order, &value).unwrap();

        group.bench_with_input(BenchmarkId::new("encode_u32", format!("{order:?}")), &value, |b, v| {
            let mut out = [0u8; 4];
            b.iter(|| codec::encode_into(&FieldKind::UInt32, order, black_box(v), &mut out).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("decode_u32", format!("{order:?}")), &bytes, |b, bytes| {
            b.iter(|| black_box(codec::decode(&FieldKind::UInt32, order, black_box(bytes)).unwrap()))
        });
    }

    group.bench_function("decode_scalar_f64", |b| {
        let bytes = 1234.5f64.to_le_bytes();
        b.iter(|| black_box(codec::decode_scalar::<f64>(ByteOrder::LittleEndian, black_box(&bytes)).unwrap()))
    });

    group.finish();
}

fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_text");
    let value = Value::from("header label");

    for encoding in [TextEncoding::Utf8, TextEncoding::Utf16Le, TextEncoding::Windows1252] {
        let kind = FieldKind::text(32, encoding);
        group.bench_with_input(BenchmarkId::new("encode", format!("{encoding:?}")), &kind, |b, kind| {
            b.iter(|| black_box(codec::encode(kind, ByteOrder::LittleEndian, black_box(&value)).unwrap()))
        });
    }

    group.finish();
}

fn bench_input_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_tap_batch");

    for keys in [1usize, 16, 256] {
        let virtual_keys: Vec<u16> = (0..keys).map(|i| 0x41 + (i % 26) as u16).collect();
        group.throughput(Throughput::Elements(keys as u64 * 2));
        group.bench_with_input(BenchmarkId::from_parameter(keys), &virtual_keys, |b, vks| {
            b.iter(|| black_box(key_tap_batch(black_box(vks), Abi::X64).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scalars, bench_text, bench_input_batches);
criterion_main!(benches);
