// benches/hash_bench.rs -- CPU reference hash benchmarks.
//
//   cargo bench
//
// The reference chain is 20 rounds of normalize/fract/sqrt/sin; these
// numbers put the fake-device cost in test runs into perspective and catch
// accidental slowdowns in the reference implementation itself.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mathprint::hash::{reference_hash_f32, reference_hash_f64};

fn bench_reference_hash(c: &mut Criterion) {
    c.bench_function("reference_hash_f64 zero seed", |b| {
        b.iter(|| reference_hash_f64(black_box(0.0)))
    });

    c.bench_function("reference_hash_f32 zero seed", |b| {
        b.iter(|| reference_hash_f32(black_box(0.0)))
    });

    c.bench_function("reference_hash_f64 seed sweep", |b| {
        let seeds: Vec<f64> = (0..64).map(|i| i as f64 * 0.37 - 12.0).collect();
        b.iter(|| {
            for &s in &seeds {
                black_box(reference_hash_f64(black_box(s)));
            }
        })
    });
}

criterion_group!(benches, bench_reference_hash);
criterion_main!(benches);
