//! Benchmarks for magic-gated header parsing
//!
//! Tests the cost of:
//! - Accepting a valid header and decoding every field
//! - Rejecting input at the magic check (no field decoding)

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use structpack::formats::{parse_bmp_header, parse_container_header, parse_png_header};
use structpack::test_utils::{sample_bmp, sample_container, sample_png};

fn bench_valid_headers(c: &mut Criterion) {
    let png = sample_png(1920, 1080);
    let bmp = sample_bmp(64, 64);
    let container = sample_container("bench", &[("a", &b"payload"[..])]);

    let mut group = c.benchmark_group("valid_headers");
    group.bench_function("png", |b| b.iter(|| black_box(parse_png_header(black_box(&png)).unwrap())));
    group.bench_function("bmp", |b| b.iter(|| black_box(parse_bmp_header(black_box(&bmp)).unwrap())));
    group.bench_function("container", |b| {
        b.iter(|| black_box(parse_container_header(black_box(&container)).unwrap()))
    });
    group.finish();
}

fn bench_rejected_headers(c: &mut Criterion) {
    let mut not_png = sample_png(1920, 1080);
    not_png[0] = 0x88;
    let mut not_bmp = sample_bmp(64, 64);
    not_bmp[0] = b'X';

    let mut group = c.benchmark_group("rejected_headers");
    group.bench_function("png", |b| b.iter(|| black_box(parse_png_header(black_box(&not_png)).unwrap())));
    group.bench_function("bmp", |b| b.iter(|| black_box(parse_bmp_header(black_box(&not_bmp)).unwrap())));
    group.finish();
}

criterion_group!(benches, bench_valid_headers, bench_rejected_headers);
criterion_main!(benches);
