use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use flow_corners::{convolve, good_features_to_track, CornerConfig, Kernel};

/// Checkerboard benchmark image with known corner density.
fn benchmark_image(width: usize, height: usize, cell: usize) -> Vec<f32> {
    let mut image = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                image[y * width + x] = 255.0;
            }
        }
    }
    image
}

fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolve");
    for size in [128usize, 256, 512] {
        let image = benchmark_image(size, size, 16);
        let kernel = Kernel::sobel_x();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| convolve(black_box(&image), size, size, &kernel));
        });
    }
    group.finish();
}

fn bench_feature_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("good_features_to_track");
    let cfg = CornerConfig::default();
    for size in [128usize, 256, 512] {
        let image = benchmark_image(size, size, 16);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| good_features_to_track(black_box(&image), size, size, &cfg).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_convolution, bench_feature_selection);
criterion_main!(benches);
