//! Benchmarks one full `run_text` turn per route (spec.md §4.8), covering
//! the fast preseed routes and the full Φ-loop TEXT route so scheduler
//! regressions are visible per-route rather than only in aggregate.

use criterion::{criterion_group, criterion_main, Criterion};

use meta_runtime::run_text;

fn bench_routes(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_text");

    group.bench_function("math", |b| b.iter(|| run_text("12 + 34 * 2", None)));
    group.bench_function("logic", |b| b.iter(|| run_text("FACT chuva", None)));
    group.bench_function("code", |b| b.iter(|| run_text("def soma(x, y):\n    return x + y\n", None)));
    group.bench_function("instinct", |b| b.iter(|| run_text("Oi Metanúcleo!", None)));
    group.bench_function("text", |b| b.iter(|| run_text("Quanto é 10 + 5?", None)));

    group.finish();
}

criterion_group!(benches, bench_routes);
criterion_main!(benches);
