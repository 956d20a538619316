use criterion::{black_box, criterion_group, criterion_main, Criterion};
use memedit::memory::mem_compare;
use memedit::{OpType, ScanType};

fn benchmark_page_window_sweep(c: &mut Criterion) {
    let page = vec![0xAAu8; 4096];
    let target = 42i32.to_ne_bytes();

    c.bench_function("int32_equal_page_sweep", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for k in 0..=page.len() - 4 {
                if mem_compare(
                    black_box(&page[k..k + 4]),
                    black_box(&target),
                    ScanType::Int32,
                    OpType::Equal,
                ) {
                    hits += 1;
                }
            }
            black_box(hits)
        });
    });
}

fn benchmark_float_compare(c: &mut Criterion) {
    let lhs = 10.5f64.to_ne_bytes();
    let rhs = 2.0f64.to_ne_bytes();

    c.bench_function("float64_greater_than", |b| {
        b.iter(|| {
            mem_compare(
                black_box(&lhs),
                black_box(&rhs),
                ScanType::Float64,
                OpType::GreaterThan,
            )
        });
    });
}

criterion_group!(benches, benchmark_page_window_sweep, benchmark_float_compare);
criterion_main!(benches);
