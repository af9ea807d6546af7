use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ebcloud_entropy::{decode, encode, IntegerPacker, PlainPacker, ZstdPacker};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Skewed byte stream, roughly what EB-HC-3D offsets look like.
fn skewed_bytes(n: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let spread: i32 = rng.gen_range(-3..=3) * rng.gen_range(0..=2);
            (128 + spread) as u8
        })
        .collect()
}

fn bench_huffman(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman");
    for size in [10_000, 1_000_000] {
        let symbols = skewed_bytes(size, 7);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("encode", size), &symbols, |b, s| {
            b.iter(|| encode(s))
        });
        let encoded = encode(&symbols).unwrap();
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, e| {
            b.iter(|| decode(e))
        });
    }
    group.finish();
}

fn bench_packers(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let values: Vec<i32> = (0..300_000).map(|_| rng.gen_range(-20_000..20_000)).collect();
    let mut group = c.benchmark_group("packer");
    group.throughput(Throughput::Bytes(values.len() as u64 * 4));
    group.bench_function("plain", |b| b.iter(|| PlainPacker.pack(&values)));
    group.bench_function("zstd", |b| b.iter(|| ZstdPacker::default().pack(&values)));
    group.finish();
}

criterion_group!(benches, bench_huffman, bench_packers);
criterion_main!(benches);
