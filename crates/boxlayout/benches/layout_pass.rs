//! Benchmarks for split-tree layout and docking operations

use boxlayout::{BoxLayout, LayoutConfig, Point, Position, Rectangle, TabPanel, shared};
use boxlayout_core::profiling::{ProfilingBackend, init_profiling, new_frame};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

struct BenchPanel(String);

impl TabPanel for BenchPanel {
    fn id(&self) -> &str {
        &self.0
    }

    fn title(&self) -> &str {
        &self.0
    }
}

/// Layout with `groups` tool groups docked around the document, alternating
/// sides so the tree grows in both directions.
fn build_layout(groups: usize) -> BoxLayout {
    let mut layout = BoxLayout::new();
    layout
        .init(
            Rectangle::new(0.0, 0.0, 3840.0, 2160.0),
            LayoutConfig::default().with_gap(2.0),
        )
        .unwrap();

    let mut target = layout.document_element().unwrap();
    for i in 0..groups {
        let id = format!("panel-{}", i);
        layout.regist_panel(shared(BenchPanel(id.clone())));
        let group = layout.create_tab_group().unwrap();
        layout
            .add_box_element(target, group, Position::ALL[i % 4])
            .unwrap();
        layout.add_panel_to_group(group, &id).unwrap();
        if i % 3 == 0 {
            target = group;
        }
    }
    layout
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize");

    for count in [4, 16, 64] {
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut layout = build_layout(count);
            let mut grow = false;
            b.iter(|| {
                grow = !grow;
                let width = if grow { 3840.0 } else { 2560.0 };
                layout
                    .resize(black_box(Rectangle::new(0.0, 0.0, width, 1440.0)))
                    .unwrap();
            });
        });
    }

    group.finish();
}

/// Same pass with puffin scopes recording, to keep their overhead visible.
fn bench_resize_profiled(c: &mut Criterion) {
    init_profiling(ProfilingBackend::InProcess);
    let mut layout = build_layout(16);
    c.bench_function("resize_profiled", |b| {
        b.iter(|| {
            new_frame();
            layout
                .resize(black_box(Rectangle::new(0.0, 0.0, 3000.0, 1600.0)))
                .unwrap();
        });
    });
    puffin::set_scopes_on(false);
}

fn bench_open_close(c: &mut Criterion) {
    let mut group = c.benchmark_group("open_close");

    for count in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut layout = build_layout(count);
            layout.regist_panel(shared(BenchPanel("transient".to_owned())));
            b.iter(|| {
                layout.open_panel_by_id("transient", true).unwrap();
                layout.close_panel_by_id("transient").unwrap();
            });
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    let mut layout = build_layout(32);
    let json = layout.get_layout_config_json().unwrap();

    group.bench_function("capture_json", |b| {
        b.iter(|| black_box(layout.get_layout_config_json().unwrap()));
    });
    group.bench_function("apply_json", |b| {
        b.iter(|| layout.apply_layout_config_json(black_box(&json)).unwrap());
    });

    group.finish();
}

fn bench_hit_test(c: &mut Criterion) {
    let layout = build_layout(64);
    c.bench_function("tab_at", |b| {
        b.iter(|| layout.tab_at(black_box(Point::new(1900.0, 1000.0))));
    });
}

criterion_group!(
    benches,
    bench_resize,
    bench_resize_profiled,
    bench_open_close,
    bench_snapshot,
    bench_hit_test
);
criterion_main!(benches);
