//! Protocol encoding/decoding benchmarks.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use taskq_protocol::{Decoder, Value};

fn request_with_payload(size: usize) -> Value {
    Value::Array(vec![
        Value::bulk(&b"ENQUEUE"[..]),
        Value::bulk(&b"jobs"[..]),
        Value::Bulk(Bytes::from("x".repeat(size))),
    ])
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_encode");

    for size in [100, 1000, 10000] {
        let value = request_with_payload(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &value, |b, value| {
            b.iter(|| black_box(value.encode().unwrap()));
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_decode");

    for size in [100, 1000, 10000] {
        let encoded = request_with_payload(size).encode().unwrap();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &encoded, |b, encoded| {
            b.iter(|| {
                let mut decoder = Decoder::new();
                decoder.extend(encoded);
                black_box(decoder.decode_value().unwrap().unwrap())
            });
        });
    }

    group.finish();
}

fn bench_decode_pipelined(c: &mut Criterion) {
    let mut input = Vec::new();
    for _ in 0..100 {
        input.extend_from_slice(&request_with_payload(64).encode().unwrap());
    }

    c.bench_function("value_decode_pipelined_100", |b| {
        b.iter(|| {
            let mut decoder = Decoder::new();
            decoder.extend(&input);
            let mut count = 0;
            while let Some(value) = decoder.decode_value().unwrap() {
                black_box(value);
                count += 1;
            }
            assert_eq!(count, 100);
        });
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_decode_pipelined
);
criterion_main!(benches);
