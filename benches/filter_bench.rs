// Filter performance benchmarks for bloomkit

use bloomkit::{BloomFilter, HashFamily, MemoryListStore, Options};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use tempfile::TempDir;

fn benchmark_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hashing");

    for len in [16, 256, 4096].iter() {
        let data = vec![0xabu8; *len];
        group.throughput(Throughput::Bytes(*len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &data, |b, data| {
            b.iter(|| {
                let family = HashFamily::new(black_box(data));
                for index in family.indices(5, 64 << 20) {
                    black_box(index);
                }
            });
        });
    }

    group.finish();
}

fn benchmark_memory_put(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_put");

    for rounds in [3u32, 5, 8].iter() {
        let mut filter = BloomFilter::in_memory(64 << 20, *rounds).unwrap();
        let mut i = 0u64;

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(rounds), rounds, |b, _| {
            b.iter(|| {
                let record = format!("url:{:012}", i);
                filter.put_str(black_box(&record)).unwrap();
                i += 1;
            });
        });
    }

    group.finish();
}

fn benchmark_memory_has(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_has");

    for size in [1000u64, 100000].iter() {
        let mut filter = BloomFilter::in_memory(64 << 20, 5).unwrap();
        for i in 0..*size {
            filter.put_str(&format!("url:{:012}", i)).unwrap();
        }

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            use rand::Rng;
            let mut rng = rand::rng();

            b.iter(|| {
                // Half of the probes miss
                let n: u64 = rng.random_range(0..size * 2);
                let record = format!("url:{:012}", n);
                black_box(filter.has_str(&record).unwrap());
            });
        });
    }

    group.finish();
}

fn benchmark_remote_put(c: &mut Criterion) {
    let store = MemoryListStore::new();
    let mut filter = BloomFilter::remote(&store, 1 << 20, 5).unwrap();
    let mut i = 0u64;

    c.bench_function("remote_put_memory_store", |b| {
        b.iter(|| {
            let record = format!("url:{:012}", i);
            filter.put_str(black_box(&record)).unwrap();
            i += 1;
        });
    });
}

fn benchmark_snapshot_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_save");
    group.sample_size(20);

    for capacity in [1u64 << 20, 16 << 20].iter() {
        let temp_dir = TempDir::new().unwrap();
        let options = Options::new()
            .capacity(*capacity)
            .rounds(5)
            .sync_on_close(false);
        let mut filter =
            BloomFilter::open_file_with_options(temp_dir.path().join("bench.snap"), &options)
                .unwrap();
        for i in 0..10000 {
            filter.put_str(&format!("url:{:012}", i)).unwrap();
        }

        group.throughput(Throughput::Bytes(capacity / 8));
        group.bench_with_input(BenchmarkId::from_parameter(capacity), capacity, |b, _| {
            b.iter(|| filter.save().unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_hashing,
    benchmark_memory_put,
    benchmark_memory_has,
    benchmark_remote_put,
    benchmark_snapshot_save
);
criterion_main!(benches);
