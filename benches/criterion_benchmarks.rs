use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use postpack::codec::{MINI_BLOCK_SIZE, bitpack, width};
use postpack::engine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;

/// Sorted values with gaps drawn from `0..max_gap`.
fn gen_sorted(size: usize, max_gap: u32, seed: u64) -> Vec<u32> {
    let mut s = seed;
    let mut last = 0u32;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        last = last.wrapping_add((s >> 33) as u32 % max_gap);
        out.push(last);
    }
    out
}

fn gen_random(size: usize, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| rng.random()).collect()
}

fn write_ratio_snapshot() {
    let mut csv = String::from("max_gap,values,words,words_per_value\n");
    for max_gap in [2u32, 8, 64, 1000, 1 << 16, 1 << 24] {
        let input = gen_sorted(1 << 20, max_gap, 123);
        let words = engine::compress_to_vec(&input).unwrap();
        let ratio = words.len() as f64 / input.len() as f64;
        csv.push_str(&format!(
            "{max_gap},{},{},{}\n",
            input.len(),
            words.len(),
            ratio
        ));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_compress_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("compress_speed");
    for size in [4 * 1024usize, 256 * 1024, 4 * 1024 * 1024] {
        let input = gen_sorted(size, 1000, 1);
        let mut out = vec![0u32; engine::max_compressed_len(size)];
        g.throughput(Throughput::Elements(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let n = engine::compress(black_box(&input), &mut out).unwrap();
                black_box(n);
            });
        });
    }
    g.finish();
}

fn bench_decompress_speed(c: &mut Criterion) {
    let mut g = c.benchmark_group("decompress_speed");
    for size in [4 * 1024usize, 256 * 1024, 4 * 1024 * 1024] {
        let input = gen_sorted(size, 1000, 2);
        let words = engine::compress_to_vec(&input).unwrap();
        let mut out = vec![0u32; size];
        g.throughput(Throughput::Elements(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let n = engine::decompress(black_box(&words), &mut out).unwrap();
                black_box(n);
            });
        });
    }
    g.finish();
}

fn bench_ratio_vs_gap(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("compress_vs_gap");
    for max_gap in [2u32, 64, 1 << 16] {
        let input = gen_sorted(1 << 18, max_gap, 3);
        let mut out = vec![0u32; engine::max_compressed_len(input.len())];
        g.throughput(Throughput::Elements(input.len() as u64));
        g.bench_with_input(BenchmarkId::from_parameter(max_gap), &max_gap, |b, _| {
            b.iter(|| {
                let n = engine::compress(black_box(&input), &mut out).unwrap();
                black_box(n);
            });
        });
    }
    g.finish();
}

fn bench_pack_kernels(c: &mut Criterion) {
    let mut g = c.benchmark_group("pack_unpack_by_width");
    let mut rng = StdRng::seed_from_u64(4);
    for w in [1u32, 4, 8, 13, 20, 32] {
        let mask = u32::MAX >> (32 - w);
        let mut group = [0u32; MINI_BLOCK_SIZE];
        let mut last = 0u32;
        for v in group.iter_mut() {
            last = last.wrapping_add(rng.random::<u32>() & mask);
            *v = last;
        }
        let w = width::max_bits(0, &group);
        let mut packed = [0u32; 32];
        let mut unpacked = [0u32; MINI_BLOCK_SIZE];
        g.throughput(Throughput::Elements(MINI_BLOCK_SIZE as u64));
        g.bench_with_input(BenchmarkId::new("pack", w), &w, |b, &w| {
            b.iter(|| bitpack::pack(0, black_box(&group), w, &mut packed).unwrap());
        });
        let n = bitpack::pack(0, &group, w, &mut packed).unwrap();
        g.bench_with_input(BenchmarkId::new("unpack", w), &w, |b, &w| {
            b.iter(|| bitpack::unpack(0, black_box(&packed[..n]), w, &mut unpacked).unwrap());
        });
    }
    g.finish();
}

fn bench_unsorted_input(c: &mut Criterion) {
    let mut g = c.benchmark_group("unsorted_roundtrip");
    let input = gen_random(1 << 18, 5);
    g.throughput(Throughput::Elements(input.len() as u64));
    g.bench_function("random_u32", |b| {
        b.iter(|| {
            let words = engine::compress_to_vec(black_box(&input)).unwrap();
            let out = engine::decompress_to_vec(&words).unwrap();
            black_box(out);
        });
    });
    g.finish();
}

#[cfg(feature = "parallel")]
fn bench_parallel_compress(c: &mut Criterion) {
    let mut g = c.benchmark_group("parallel_compress");
    let input = gen_sorted(16 * 1024 * 1024, 1000, 6);
    let mut out = vec![0u32; engine::max_compressed_len(input.len())];
    g.throughput(Throughput::Elements(input.len() as u64));
    g.bench_function("sequential", |b| {
        b.iter(|| engine::compress(black_box(&input), &mut out).unwrap());
    });
    g.bench_function("parallel", |b| {
        b.iter(|| engine::compress_parallel(black_box(&input), &mut out).unwrap());
    });
    g.finish();
}

#[cfg(not(feature = "parallel"))]
fn bench_parallel_compress(_c: &mut Criterion) {}

criterion_group!(
    benches,
    bench_compress_speed,
    bench_decompress_speed,
    bench_ratio_vs_gap,
    bench_pack_kernels,
    bench_unsorted_input,
    bench_parallel_compress
);
criterion_main!(benches);
