//! Lane-wise slice operators: scalar loop vs vector vs parallel vector, and
//! native vs generic kernels for single vectors.

use std::hint::black_box;
use std::sync::Arc;
use std::time::Instant;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lanewise::slice::{
    lanewise_slices, par_lanewise_slices, reduce_slice, scalar_lanewise_slices,
};
use lanewise::{BinaryOp, GenericOnly, LaneElement, NativeResolver, ReductionOp, Shape, Species};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const VECTOR_SIZES: &[usize] = &[1_024, 16_384, 131_072, 262_144, 1_048_576, 4_194_304];

fn generate_test_data(len: usize, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-1_000..1_000)).collect()
}

fn benchmark_slice_strategies(c: &mut Criterion) {
    for &size in VECTOR_SIZES {
        let mut group = c.benchmark_group(format!("i32 add {}", format_size(size)));
        group.throughput(Throughput::Bytes((size * std::mem::size_of::<i32>()) as u64));

        let a_vec = generate_test_data(size, 42);
        let b_vec = generate_test_data(size, 43);
        let (a, b) = (a_vec.as_slice(), b_vec.as_slice());

        group.bench_function(BenchmarkId::new("Scalar", size), |bench| {
            bench.iter(|| black_box(scalar_lanewise_slices(BinaryOp::Add, a, b)))
        });
        group.bench_function(BenchmarkId::new("Vector", size), |bench| {
            bench.iter(|| black_box(lanewise_slices(BinaryOp::Add, a, b)))
        });
        group.bench_function(BenchmarkId::new("Parallel Vector", size), |bench| {
            bench.iter(|| black_box(par_lanewise_slices(BinaryOp::Add, black_box(a), b)))
        });
        group.bench_with_input(BenchmarkId::new("Reduce", size), a, |bench, input| {
            bench.iter(|| black_box(reduce_slice(ReductionOp::Add, input)))
        });

        group.finish();
    }
}

fn benchmark_resolvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("i8 S512 vector ops");
    let species = Species::<i8>::of(Shape::S512);
    let mut rng = StdRng::seed_from_u64(7);
    let a = species.from_fn(|_| rng.random());
    let b = species.from_fn(|_| rng.random());

    for (name, native) in [("Native", true), ("Generic", false)] {
        if native {
            i8::dispatcher().install_resolver(Arc::new(NativeResolver));
        } else {
            i8::dispatcher().install_resolver(Arc::new(GenericOnly));
        }
        group.bench_function(BenchmarkId::new("SADD", name), |bench| {
            bench.iter(|| black_box(black_box(&a).lanewise(BinaryOp::Sadd, &b)))
        });
        group.bench_function(BenchmarkId::new("MAX reduce", name), |bench| {
            bench.iter(|| black_box(black_box(&a).reduce_lanes(ReductionOp::Max)))
        });
    }
    i8::dispatcher().install_resolver(Arc::new(NativeResolver));
    group.finish();
}

fn format_size(elements: usize) -> String {
    let bytes = elements * std::mem::size_of::<i32>();
    if bytes >= 1_048_576 {
        format!("{:.1} MiB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

fn all_benchmarks(c: &mut Criterion) {
    let _ = env_logger::builder().is_test(true).try_init();
    let start_time = Instant::now();
    benchmark_slice_strategies(c);
    benchmark_resolvers(c);
    println!(
        "Benchmark suite completed in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );
}

criterion_group!(benches, all_benchmarks);
criterion_main!(benches);
