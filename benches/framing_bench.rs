//! Benchmarks for camera framing, bounds and normal generation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use vitrine::camera::framing::{frame_bounds, frame_size, FramingParams};
use vitrine::model::bounds::Aabb;
use vitrine::model::mesh::compute_normals;

fn framing_benchmark(c: &mut Criterion) {
    let params = FramingParams::default();
    let _ = c.bench_function("frame_size", |b| {
        b.iter(|| black_box(frame_size(black_box(Vec3::new(3.0, 10.0, 2.5)), &params)))
    });
}

fn bounds_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounds_and_frame");

    for count in [1_000, 10_000, 100_000].iter() {
        let points: Vec<Vec3> = (0..*count)
            .map(|i| {
                let t = i as f32 * 0.01;
                Vec3::new(t.sin() * 4.0, t.cos() * 2.0, t * 0.001)
            })
            .collect();
        let params = FramingParams::default();

        let _ = group.bench_function(format!("{}_vertices", count), |b| {
            b.iter(|| {
                let bounds = Aabb::from_points(points.iter().copied());
                black_box(frame_bounds(&bounds, &params))
            })
        });
    }
    group.finish();
}

fn normals_benchmark(c: &mut Criterion) {
    // 100x100 grid of quads
    let n = 101u32;
    let positions: Vec<[f32; 3]> = (0..n * n)
        .map(|i| [(i % n) as f32, ((i % n) as f32 * 0.1).sin(), (i / n) as f32])
        .collect();
    let mut indices = Vec::new();
    for z in 0..n - 1 {
        for x in 0..n - 1 {
            let i = z * n + x;
            indices.extend_from_slice(&[i, i + n, i + 1, i + 1, i + n, i + n + 1]);
        }
    }

    let _ = c.bench_function("compute_normals_20k_triangles", |b| {
        b.iter(|| black_box(compute_normals(black_box(&positions), black_box(&indices))))
    });
}

criterion_group!(benches, framing_benchmark, bounds_benchmark, normals_benchmark);
criterion_main!(benches);
