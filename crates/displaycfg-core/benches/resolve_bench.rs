//! Criterion benchmarks for layout resolution.
//!
//! Run with:
//! ```bash
//! cargo bench --package displaycfg-core --bench resolve_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use displaycfg_core::domain::device::{CatalogSnapshot, DeviceId};
use displaycfg_core::domain::frame::{Frame, FrameSet};
use displaycfg_core::domain::intent::LayoutIntent;
use displaycfg_core::domain::resolver::{resolve_explicit, resolve_grid};
use displaycfg_core::mock::test_device;

fn snapshot_with(n: u32) -> CatalogSnapshot {
    CatalogSnapshot::from_devices((1..=n).map(|id| test_device(id, 1920, 1080)))
}

fn bench_resolve_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_grid");
    for n in [1u32, 4, 16, 64] {
        let snapshot = snapshot_with(n);
        let side = (n as f64).sqrt().ceil() as u32;
        let mut intent = LayoutIntent::new();
        intent.set_columns(side);
        intent.set_rows(side);
        intent.set_resolution(1920, 1080);

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| resolve_grid(black_box(&intent), black_box(&snapshot)))
        });
    }
    group.finish();
}

fn bench_resolve_explicit(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_explicit");
    for n in [1u32, 4, 16, 64] {
        let snapshot = snapshot_with(n);
        let requested: FrameSet = (1..=n)
            .map(|id| Frame::new(DeviceId(id), (id as i32 - 1) * 1920, 0, 1920, 1080))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| resolve_explicit(black_box(&requested), black_box(&snapshot)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve_grid, bench_resolve_explicit);
criterion_main!(benches);
