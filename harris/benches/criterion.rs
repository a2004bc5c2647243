use criterion::{criterion_group, criterion_main, Criterion};
use harris::image::{gaussian_kernel, horizontal_filter, maximum_filter, vertical_filter};
use harris::{BorderMode, GrayFloatImage, Harris, PatchMatcher};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn load_image() -> GrayFloatImage {
    let mut rng = Pcg64::seed_from_u64(0);
    // Blocky noise so there are plenty of corners.
    let blocks: Vec<f32> = (0..80 * 60).map(|_| rng.gen()).collect();
    GrayFloatImage::from_fn(640, 480, |x, y| blocks[(y / 8) * 80 + x / 8])
}

fn detect(c: &mut Criterion) {
    let image = load_image();
    let harris = Harris::default();
    c.bench_function("detect", |b| b.iter(|| harris.detect(&image)));
}

fn match_features(c: &mut Criterion) {
    let image = load_image();
    let keypoints = Harris::with_max_features(200).unwrap().detect(&image);
    for (name, matcher) in [
        ("match_ssd", PatchMatcher::ssd(11).unwrap()),
        ("match_ncc", PatchMatcher::ncc(11).unwrap()),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| matcher.match_features(&image, &keypoints, &image, &keypoints))
        });
    }
}

criterion_group!(
    name = harris;
    config = Criterion::default().sample_size(10);
    targets = detect, match_features
);

fn bench_horizontal_filter(c: &mut Criterion) {
    let image = load_image();
    let small_kernel = gaussian_kernel(1.0, 7);
    c.bench_function("horizontal_filter_small_kernel", |b| {
        b.iter(|| horizontal_filter(&image.0, &small_kernel, BorderMode::Reflect))
    });
    let large_kernel = gaussian_kernel(10.0, 71);
    c.bench_function("horizontal_filter_large_kernel", |b| {
        b.iter(|| horizontal_filter(&image.0, &large_kernel, BorderMode::Reflect))
    });
}

fn bench_vertical_filter(c: &mut Criterion) {
    let image = load_image();
    let small_kernel = gaussian_kernel(1.0, 7);
    c.bench_function("vertical_filter_small_kernel", |b| {
        b.iter(|| vertical_filter(&image.0, &small_kernel, BorderMode::Reflect))
    });
    let large_kernel = gaussian_kernel(10.0, 71);
    c.bench_function("vertical_filter_large_kernel", |b| {
        b.iter(|| vertical_filter(&image.0, &large_kernel, BorderMode::Reflect))
    });
}

fn bench_maximum_filter(c: &mut Criterion) {
    let image = load_image();
    c.bench_function("maximum_filter", |b| {
        b.iter(|| maximum_filter(&image, 5, BorderMode::Reflect))
    });
}

criterion_group!(
    name = harris_image;
    config = Criterion::default().sample_size(10);
    targets = bench_horizontal_filter, bench_vertical_filter, bench_maximum_filter
);

criterion_main!(harris, harris_image);
