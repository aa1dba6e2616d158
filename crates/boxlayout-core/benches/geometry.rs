//! Benchmarks for transform chains used in pointer hit-testing

use boxlayout_core::geometry::{Matrix, Point, TransformChain};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn build_chain(depth: usize) -> TransformChain {
    let mut chain = TransformChain::new();
    for i in 0..depth {
        let transform = if i % 3 == 0 {
            Matrix::scaling(1.01, 0.99)
        } else {
            Matrix::IDENTITY
        };
        chain
            .push_element(Point::new(i as f32, 2.0 * i as f32), transform)
            .push_scroll(Point::new(0.0, (i % 2) as f32));
    }
    chain
}

fn bench_global_to_local(c: &mut Criterion) {
    let mut group = c.benchmark_group("global_to_local");

    for depth in [1, 8, 32] {
        let chain = build_chain(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &chain, |b, chain| {
            b.iter(|| chain.global_to_local(black_box(Point::new(400.0, 300.0))));
        });
    }

    group.finish();
}

fn bench_parse_css(c: &mut Criterion) {
    c.bench_function("parse_css_transform", |b| {
        b.iter(|| {
            Matrix::parse_css_transform(black_box(
                "translate(10px, 4px) rotate(15deg) scale(1.5, 2) matrix(1, 0, 0, 1, 3, 3)",
            ))
        });
    });
}

criterion_group!(benches, bench_global_to_local, bench_parse_css);
criterion_main!(benches);
