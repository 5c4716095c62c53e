//! End-to-end scenarios: pixels → spectrum → record → spectrum → pixels, and
//! the same path through a working directory on disk.

use image::{Rgba, RgbaImage};
use image_fft::corrupt::corrupt;
use image_fft::workspace::{self, Source, Workspace};
use image_fft::{Config, CorruptionConfig, Error, TransformOptions, record, spectrum, visualize};
use rand::SeedableRng;
use rand::rngs::StdRng;
use utils::{Channel, Channels, Grid};

fn assert_within_one(expected: &Channels<Grid<u8>>, actual: &Channels<Grid<u8>>) {
    for c in Channel::ALL {
        assert_eq!(expected[c].dims(), actual[c].dims());
        for (a, b) in expected[c].as_slice().iter().zip(actual[c].as_slice()) {
            assert!(a.abs_diff(*b) <= 1, "{c:?}: {a} vs {b}");
        }
    }
}

fn test_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 29 + y * 7) as u8,
            (255 - x * 11) as u8,
            ((x ^ y) * 40) as u8,
            255,
        ])
    })
}

#[test]
fn two_by_two_survives_persistence() {
    // R = [[0, 255], [128, 64]] with x as the outer index.
    let red = Grid::from_fn(2, 2, |x, y| [[0u8, 255], [128, 64]][x][y]);
    let pixels = Channels::new(red, Grid::filled(2, 2, 17), Grid::filled(2, 2, 200));

    let options = TransformOptions::default();
    let set = spectrum::forward(&pixels, &options).unwrap();
    let bytes = record::serialize(&set).unwrap();
    assert_eq!(bytes.len(), 8 + 6 * 2 * 2 * 8);

    let loaded = record::deserialize(&bytes).unwrap();
    assert_eq!(loaded, set);

    let rebuilt = spectrum::reconstruct(&loaded, &options).unwrap();
    assert_within_one(&pixels, &rebuilt);
}

#[test]
fn sequential_and_parallel_agree_end_to_end() {
    let pixels = image_fft::image_io::split_channels(&test_image(6, 5));
    let sequential = TransformOptions {
        parallel: false,
        ..Default::default()
    };
    let a = spectrum::forward(&pixels, &TransformOptions::default()).unwrap();
    let b = spectrum::forward(&pixels, &sequential).unwrap();
    assert_eq!(record::serialize(&a).unwrap(), record::serialize(&b).unwrap());
}

#[test]
fn power_of_two_policy_fails_before_transforming() {
    let pixels = image_fft::image_io::split_channels(&test_image(6, 4));
    let strict = TransformOptions {
        require_power_of_two: true,
        ..Default::default()
    };
    assert!(matches!(
        spectrum::forward(&pixels, &strict),
        Err(Error::UnsupportedDimensions {
            width: 6,
            height: 4,
            ..
        })
    ));
}

#[test]
fn single_pixel_record_has_no_log_domain() {
    let pixels = Channels::new(
        Grid::filled(1, 1, 10u8),
        Grid::filled(1, 1, 20),
        Grid::filled(1, 1, 30),
    );
    let set = spectrum::forward(&pixels, &TransformOptions::default()).unwrap();
    let loaded = record::deserialize(&record::serialize(&set).unwrap()).unwrap();
    assert!(matches!(
        visualize::render(&loaded, &Default::default()),
        Err(Error::DegenerateLogDomain { .. })
    ));
}

#[test]
fn corrupted_record_still_decodes() {
    let pixels = image_fft::image_io::split_channels(&test_image(8, 8));
    let set = spectrum::forward(&pixels, &TransformOptions::default()).unwrap();
    let mut bytes = record::serialize(&set).unwrap();
    let original = bytes.clone();

    let config = CorruptionConfig {
        strength_pct: 100.0,
        intensity: 5000,
        ..Default::default()
    };
    let report = corrupt(&mut bytes, &config).unwrap();
    assert_eq!(report.rounds, 13);
    assert_ne!(bytes, original);

    let damaged = record::deserialize(&bytes).unwrap();
    let rebuilt = spectrum::reconstruct(&damaged, &TransformOptions::default()).unwrap();
    assert_eq!(rebuilt[Channel::Red].dims(), (8, 8));

    let analysis = visualize::render(&damaged, &Default::default()).unwrap();
    assert_eq!(analysis.magnitude.dimensions(), (8, 8));
}

#[test]
fn working_directory_round_trip() {
    let root = tempfile::tempdir().unwrap();
    let source = test_image(8, 4);
    source.save(root.path().join("sample.png")).unwrap();

    let ws = Workspace::new(root.path(), "sample");
    let config = Config::default();

    workspace::encode(&ws, &config).unwrap();
    let record_len = std::fs::metadata(ws.record_path()).unwrap().len();
    assert_eq!(record_len, 8 + 6 * 8 * 4 * 8);

    assert_eq!(workspace::decode(&ws, &config).unwrap(), None);
    let output = image::open(ws.output_path()).unwrap().to_rgba8();
    assert_eq!(output.dimensions(), (8, 4));
    for (a, b) in source.pixels().zip(output.pixels()) {
        for i in 0..3 {
            assert!(a.0[i].abs_diff(b.0[i]) <= 1, "{a:?} vs {b:?}");
        }
        assert_eq!(b.0[3], 255);
    }

    let analysis = workspace::analyze(&ws, Source::Record, &config).unwrap();
    assert_eq!(analysis.phase.dimensions(), (8, 4));
    assert!(ws.magnitude_analysis_path().is_file());
    assert!(ws.phase_analysis_path().is_file());
}

#[test]
fn seeded_decode_corrupts_reproducibly() {
    let root = tempfile::tempdir().unwrap();
    test_image(8, 8).save(root.path().join("noisy.png")).unwrap();
    let ws = Workspace::new(root.path(), "noisy");

    let mut config = Config::default();
    workspace::encode(&ws, &config).unwrap();

    config.corruption.strength_pct = 50.0;
    let mut outputs = Vec::new();
    for _ in 0..2 {
        let report = workspace::decode_with_rng(&ws, &config, &mut StdRng::seed_from_u64(42))
            .unwrap()
            .expect("corruption enabled");
        assert_eq!(report.rounds, 6);
        outputs.push(std::fs::read(ws.output_path()).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);

    // the record on disk is never modified by decoding
    let record = std::fs::read(ws.record_path()).unwrap();
    let set = record::deserialize(&record).unwrap();
    assert_eq!(set.width(), 8);
}

#[test]
fn preview_writes_forward_real_parts() {
    let root = tempfile::tempdir().unwrap();
    RgbaImage::from_pixel(2, 2, Rgba([10, 10, 10, 255]))
        .save(root.path().join("flat.png"))
        .unwrap();
    let ws = Workspace::new(root.path(), "flat");

    workspace::preview(&ws, &Config::default()).unwrap();
    let output = image::open(ws.output_path()).unwrap().to_rgba8();
    assert_eq!(output.get_pixel(0, 0).0, [40, 40, 40, 255]);
    for (x, y) in [(1, 0), (0, 1), (1, 1)] {
        assert_eq!(output.get_pixel(x, y).0, [0, 0, 0, 255]);
    }
    assert!(!ws.record_path().exists());
}
