use image::{Luma, Rgba, RgbaImage};
use silmatch::{
    Classifier, Config, CornerExtractor, CornerSet, DebugLevel, Point, SilMatchError,
    TrainingIndex,
};
use std::fs;
use std::path::{Path, PathBuf};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("silmatch-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn set(points: &[(f32, f32)]) -> CornerSet {
    points.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn config(work_dir: &Path) -> Config {
    Config {
        match_radius: Some(10.0),
        work_dir: work_dir.to_path_buf(),
        ..Config::default()
    }
}

/// Dark shape on a white background; `inside` decides which pixels belong to
/// the shape.
fn write_shape(path: &Path, w: u32, h: u32, inside: impl Fn(u32, u32) -> bool) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::GrayImage::from_fn(w, h, |x, y| Luma([if inside(x, y) { 20 } else { 250 }]));
    img.save(path).unwrap();
}

fn write_square(path: &Path, w: u32, h: u32, x0: u32, y0: u32, side: u32) {
    write_shape(path, w, h, |x, y| {
        x >= x0 && x < x0 + side && y >= y0 && y < y0 + side
    });
}

fn write_triangle(path: &Path, side: u32) {
    // Right triangle with the right angle at the bottom-left.
    write_shape(path, side + 20, side + 20, |x, y| {
        x >= 10 && y < side + 10 && y >= 10 && (x - 10) <= (y - 10)
    });
}

#[test]
fn square_candidate_beats_triangle() {
    let index = TrainingIndex::from_examples([
        (
            "square",
            "square.png",
            set(&[(20.0, 20.0), (180.0, 20.0), (180.0, 180.0), (20.0, 180.0)]),
        ),
        (
            "triangle",
            "triangle.png",
            set(&[(100.0, 20.0), (20.0, 180.0), (180.0, 180.0)]),
        ),
    ]);
    let work = scratch_dir("scenario");
    let classifier = Classifier::from_parts(CornerExtractor::new(config(&work)).unwrap(), index);
    let candidate = set(&[(22.0, 18.0), (178.0, 22.0), (182.0, 178.0), (18.0, 182.0)]);

    let best = classifier.classify_corners(&candidate).unwrap();
    assert_eq!(best.category, "square");
    assert_eq!(best.example, "square.png");
    assert!((best.score - 0.92).abs() < 1e-5);

    let ranked = classifier.rank_corners(&candidate, 5);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[1].category, "triangle");
    assert!(best.score > ranked[1].score);
    assert!((ranked[1].score - 0.46).abs() < 1e-5);
    fs::remove_dir_all(&work).unwrap();
}

#[test]
fn ties_resolve_to_first_category_then_first_file() {
    let shape = set(&[(10.0, 10.0), (50.0, 50.0)]);
    let index = TrainingIndex::from_examples([
        ("beta", "a.png", shape.clone()),
        ("alpha", "b.png", shape.clone()),
        ("alpha", "c.png", shape.clone()),
    ]);
    let work = scratch_dir("ties");
    let classifier = Classifier::from_parts(CornerExtractor::new(config(&work)).unwrap(), index);
    let best = classifier.classify_corners(&shape).unwrap();
    assert_eq!(best.category, "alpha");
    assert_eq!(best.example, "b.png");
    assert_eq!(best.score, 1.0);
    fs::remove_dir_all(&work).unwrap();
}

#[test]
fn trains_from_directory_and_classifies_images() {
    let root = scratch_dir("e2e");
    let training = root.join("training");
    let work = root.join("work");
    write_square(&training.join("square/big.png"), 140, 140, 20, 20, 100);
    write_square(&training.join("square/small.png"), 90, 120, 30, 40, 30);
    write_triangle(&training.join("triangle/right.png"), 100);
    fs::write(training.join("README.txt.hidden"), b"ignored").unwrap();
    fs::write(training.join(".notes"), b"ignored").unwrap();

    let classifier = Classifier::train(config(&work), &training).unwrap();
    let names: Vec<_> = classifier.index().categories().map(|(n, _)| n).collect();
    assert_eq!(names, ["square", "triangle"]);
    let ids: Vec<_> = classifier
        .index()
        .get("square")
        .unwrap()
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(ids, ["big.png", "small.png"]);
    assert!(work.join("square/big.png-corners.corners").is_file());
    assert!(work.join("triangle/right.png-corners.corners").is_file());

    let candidate = root.join("query.png");
    write_square(&candidate, 300, 200, 90, 40, 120);
    let best = classifier.classify(&candidate).unwrap().unwrap();
    assert_eq!(best.category, "square");
    assert!(best.score > 0.5, "weak square match: {}", best.score);

    // One-off queries never leave a cache entry behind.
    assert!(!work.join("query.png-corners.corners").exists());

    let again = classifier.classify(&candidate).unwrap().unwrap();
    assert_eq!(again, best);

    // A second classifier over the same tree reads the cache and agrees.
    let cached = Classifier::train(config(&work), &training).unwrap();
    assert_eq!(cached.index(), classifier.index());
    assert_eq!(cached.classify(&candidate).unwrap().unwrap(), best);
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn equal_file_names_across_categories_stay_apart() {
    let root = scratch_dir("same-name");
    let training = root.join("training");
    let work = root.join("work");
    write_square(&training.join("square/a.png"), 120, 120, 10, 10, 100);
    write_triangle(&training.join("triangle/a.png"), 100);

    let classifier = Classifier::train(config(&work), &training).unwrap();
    assert!(work.join("square/a.png-corners.corners").is_file());
    assert!(work.join("triangle/a.png-corners.corners").is_file());
    assert!(!work.join("a.png-corners.corners").exists());

    let square = &classifier.index().get("square").unwrap()[0].corners;
    let triangle = &classifier.index().get("triangle").unwrap()[0].corners;
    assert_ne!(square, triangle);

    // A direct scan with an unrooted extractor reads the same entries.
    let extractor = CornerExtractor::new(config(&work)).unwrap();
    let index = TrainingIndex::build(&training, &extractor).unwrap();
    assert_eq!(&index, classifier.index());
    assert_eq!(
        index.get("square").unwrap()[0].corners,
        extractor.extract(&training.join("square/a.png"), false).unwrap()
    );
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn debug_levels_write_cumulative_artifacts() {
    let root = scratch_dir("debug");
    let training = root.join("training");
    let work = root.join("work");
    write_square(&training.join("square/a.png"), 80, 80, 10, 10, 60);

    let cfg = Config {
        debug: DebugLevel::CompositeStagesAndClip,
        ..config(&work)
    };
    Classifier::train(cfg, &training).unwrap();
    for stage in ["composite", "silhouette", "edges", "clip"] {
        let path = work.join(format!("square/a.png-{stage}.png"));
        assert!(path.is_file(), "missing {}", path.display());
    }

    let work_composite = root.join("work-composite");
    let cfg = Config {
        debug: DebugLevel::Composite,
        force_refresh: true,
        ..config(&work_composite)
    };
    Classifier::train(cfg, &training).unwrap();
    assert!(work_composite.join("square/a.png-composite.png").is_file());
    assert!(!work_composite.join("square/a.png-silhouette.png").exists());
    assert!(!work_composite.join("square/a.png-clip.png").exists());
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn blank_candidate_is_unclassified() {
    let root = scratch_dir("blank");
    let training = root.join("training");
    write_square(&training.join("square/a.png"), 80, 80, 10, 10, 60);
    let classifier = Classifier::train(config(&root.join("work")), &training).unwrap();

    let candidate = root.join("blank.png");
    RgbaImage::from_pixel(50, 50, Rgba([255, 255, 255, 255]))
        .save(&candidate)
        .unwrap();
    assert!(classifier.classify(&candidate).unwrap().is_none());
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn missing_paths_are_configuration_errors() {
    let root = scratch_dir("missing");
    let err = Classifier::train(config(&root.join("work")), &root.join("nope"))
        .err()
        .unwrap();
    assert!(matches!(err, SilMatchError::Configuration(_)));

    let training = root.join("training");
    write_square(&training.join("square/a.png"), 80, 80, 10, 10, 60);
    let classifier = Classifier::train(config(&root.join("work")), &training).unwrap();
    let err = classifier.classify(&root.join("absent.png")).err().unwrap();
    assert!(matches!(err, SilMatchError::Configuration(_)));
    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn undecodable_training_file_aborts_the_scan() {
    let root = scratch_dir("undecodable");
    let training = root.join("training");
    write_square(&training.join("square/a.png"), 80, 80, 10, 10, 60);
    fs::write(training.join("square/b.png"), b"not an image").unwrap();
    let err = Classifier::train(config(&root.join("work")), &training)
        .err()
        .unwrap();
    assert!(matches!(err, SilMatchError::ImageDecode { .. }));
    fs::remove_dir_all(&root).unwrap();
}
