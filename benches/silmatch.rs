use criterion::{criterion_group, criterion_main, Criterion};
use image::{DynamicImage, GrayImage, Luma};
use silmatch::{score, Classifier, Config, CornerExtractor, CornerSet, Point, TrainingIndex};
use std::hint::black_box;

fn make_set(seed: usize, len: usize) -> CornerSet {
    (0..len)
        .map(|i| {
            let v = (i * 37 + seed * 11) % 200;
            let w = (i * 91 + seed * 7) % 200;
            Point::new(v as f32, w as f32)
        })
        .collect()
}

fn bench_score(c: &mut Criterion) {
    let test = make_set(1, 40);
    let candidate = make_set(2, 40);
    c.bench_function("score_40x40", |b| {
        b.iter(|| black_box(score(&test, &candidate, 10.0)));
    });
}

fn bench_classify(c: &mut Criterion) {
    let mut index = TrainingIndex::new();
    for category in 0..10 {
        for example in 0..20 {
            index.insert(
                format!("cat{category}"),
                format!("{example}.png"),
                make_set(category * 20 + example, 30),
            );
        }
    }
    let cfg = Config {
        work_dir: std::env::temp_dir().join("silmatch-bench"),
        ..Config::default()
    };
    let classifier = Classifier::from_parts(CornerExtractor::new(cfg).unwrap(), index);
    let candidate = make_set(5, 30);
    c.bench_function("classify_corners_200_examples", |b| {
        b.iter(|| black_box(classifier.classify_corners(&candidate)));
    });
}

fn bench_extract(c: &mut Criterion) {
    let img = GrayImage::from_fn(640, 480, |x, y| {
        let inside = (120..520).contains(&x) && (80..400).contains(&y) && x + y < 800;
        Luma([if inside { 20 } else { 235 }])
    });
    let img = DynamicImage::ImageLuma8(img);
    let extractor = CornerExtractor::new(Config::default()).unwrap();
    c.bench_function("extract_image_640x480", |b| {
        b.iter(|| black_box(extractor.extract_image(&img).unwrap()));
    });
}

criterion_group!(benches, bench_score, bench_classify, bench_extract);
criterion_main!(benches);
