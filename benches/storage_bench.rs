//! Benchmarks for hashdbm storage operations

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use hashdbm::{Dbm, OpenMode, StoreMode};
use tempfile::TempDir;

fn key(i: u64) -> Vec<u8> {
    format!("bench-key-{:010}", i).into_bytes()
}

fn storage_benchmarks(c: &mut Criterion) {
    // Sequential insert into a fresh store (includes splits)
    c.bench_function("store_1000_fresh", |b| {
        b.iter_batched(
            || {
                let temp = TempDir::new().unwrap();
                let db = Dbm::open_path(temp.path().join("bench"), OpenMode::Create).unwrap();
                (temp, db)
            },
            |(_temp, mut db)| {
                for i in 0..1000 {
                    db.store(&key(i), b"some-value", StoreMode::Insert).unwrap();
                }
            },
            BatchSize::PerIteration,
        );
    });

    // Point lookups against a populated store
    let temp = TempDir::new().unwrap();
    let mut db = Dbm::open_path(temp.path().join("bench"), OpenMode::Create).unwrap();
    for i in 0..10_000 {
        db.store(&key(i), b"some-value", StoreMode::Insert).unwrap();
    }

    let mut i = 0u64;
    c.bench_function("fetch_random", |b| {
        b.iter(|| {
            i = (i + 7919) % 10_000;
            db.fetch(&key(i)).unwrap().map(<[u8]>::len)
        });
    });

    c.bench_function("replace_existing", |b| {
        b.iter(|| {
            i = (i + 7919) % 10_000;
            db.store(&key(i), b"other-value", StoreMode::Replace).unwrap()
        });
    });

    c.bench_function("scan_all_keys", |b| {
        b.iter(|| db.keys().count());
    });
}

criterion_group!(benches, storage_benchmarks);
criterion_main!(benches);
