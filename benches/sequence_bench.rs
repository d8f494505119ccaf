//! Benchmarks for the sequence backings and the dictionary
//!
//! Compares the four backings on end operations, indexed reads and bulk
//! discard, and the dictionary against `std::HashMap` on text keys.

use criterion::{
    black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput,
};
use std::collections::HashMap;
use std::time::Duration;

use polyseq::{Dictionary, Sequence, SequenceKind};

// =============================================================================
// BENCHMARK CONFIGURATION
// =============================================================================

const SIZES: &[usize] = &[100, 1_000, 10_000];

fn filled(kind: SequenceKind, size: usize) -> Sequence<u64> {
    Sequence::from_elements(kind, 0..size as u64).unwrap()
}

// =============================================================================
// SEQUENCE BENCHMARKS
// =============================================================================

fn bench_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_pop");
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        for kind in SequenceKind::ALL {
            group.bench_with_input(BenchmarkId::new(kind.to_string(), size), &size, |b, &size| {
                b.iter(|| {
                    let mut seq = Sequence::with_kind(kind);
                    for i in 0..size as u64 {
                        seq.push(black_box(i)).unwrap();
                    }
                    while let Ok(v) = seq.pop() {
                        black_box(v);
                    }
                });
            });
        }
    }

    group.finish();
}

fn bench_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("push_shift");

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        for kind in SequenceKind::ALL {
            // shift on an array list is linear, skip the quadratic case
            if kind == SequenceKind::ArrayList && size > 1_000 {
                continue;
            }
            group.bench_with_input(BenchmarkId::new(kind.to_string(), size), &size, |b, &size| {
                b.iter(|| {
                    let mut seq = Sequence::with_kind(kind);
                    for i in 0..size as u64 {
                        seq.push(black_box(i)).unwrap();
                    }
                    while let Ok(v) = seq.shift() {
                        black_box(v);
                    }
                });
            });
        }
    }

    group.finish();
}

fn bench_indexed_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexed_read");

    for kind in SequenceKind::ALL {
        let size = 1_000;
        let seq = filled(kind, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new(kind.to_string(), size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for i in 0..size as isize {
                    sum += *seq.get(black_box(i)).unwrap();
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn bench_discard_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("discard_all");

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));
        for kind in SequenceKind::ALL {
            group.bench_with_input(BenchmarkId::new(kind.to_string(), size), &size, |b, &size| {
                b.iter(|| {
                    let mut seq = filled(kind, size);
                    black_box(seq.discard_all(|v| v % 3 == 0))
                });
            });
        }
    }

    group.finish();
}

fn bench_shuffle(c: &mut Criterion) {
    let mut group = c.benchmark_group("shuffle");

    for kind in SequenceKind::ALL {
        let size = 10_000;
        let mut seq = filled(kind, size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::new(kind.to_string(), size), |b| {
            b.iter(|| {
                seq.shuffle();
                black_box(seq.len())
            });
        });
    }

    group.finish();
}

// =============================================================================
// DICTIONARY BENCHMARKS
// =============================================================================

fn bench_dictionary_text_keys(c: &mut Criterion) {
    let mut group = c.benchmark_group("dictionary_text_keys");

    for &size in SIZES {
        let keys: Vec<String> = (0..size).map(|i| format!("key_{:08}", i)).collect();
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("std::HashMap", size), &keys, |b, keys| {
            b.iter(|| {
                let mut map = HashMap::new();
                for (i, key) in keys.iter().enumerate() {
                    map.insert(key.clone(), black_box(i));
                }
                black_box(map.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("Dictionary", size), &keys, |b, keys| {
            b.iter(|| {
                let mut dict = Dictionary::new(16).unwrap();
                for (i, key) in keys.iter().enumerate() {
                    dict.set(key, black_box(i)).unwrap();
                }
                black_box(dict.len())
            });
        });

        let mut dict = Dictionary::new(size.next_power_of_two()).unwrap();
        for (i, key) in keys.iter().enumerate() {
            dict.set(key, i).unwrap();
        }
        group.bench_with_input(BenchmarkId::new("Dictionary::get", size), &keys, |b, keys| {
            b.iter(|| {
                let mut found = 0usize;
                for key in keys {
                    if dict.get(black_box(key)).is_some() {
                        found += 1;
                    }
                }
                black_box(found)
            });
        });
    }

    group.finish();
}

// =============================================================================
// BENCHMARK GROUPS
// =============================================================================

criterion_group!(
    sequence_benches,
    bench_push_pop,
    bench_queue,
    bench_indexed_read,
    bench_discard_all,
    bench_shuffle,
    bench_dictionary_text_keys
);

criterion_main!(sequence_benches);
