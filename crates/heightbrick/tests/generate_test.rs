//! # End-to-End Generation Tests
//!
//! Writes real images, a palette and a brick catalog to disk, then runs the
//! whole generation and inspects the save file.

use std::fs;
use std::path::{Path, PathBuf};

use heightbrick::{run, AppError, GenerationConfig};
use heightbrick_core::CoreError;
use image::{Rgba, RgbaImage};

const COLORSET: &str = "\
DIV:Earth
0.2 0.6 0.2 1
0.5 0.4 0.3 1

DIV:Water
0 0 255 255
";

const BRICKS: &str = r#"{
    "bricks": [
        { "shape": [1, 1, 1], "ui_name": "1x1f" },
        { "shape": [2, 2, 1], "ui_name": "2x2f", "offset": [0.25, 0.25] }
    ]
}"#;

/// Helper to create a unique temp directory for each test.
fn test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "heightbrick_generate_test_{name}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 4]) {
    RgbaImage::from_fn(width, height, |x, y| Rgba(f(x, y)))
        .save(path)
        .unwrap();
}

/// Writes a 4x4 map: a flat grass plateau on the left, a water trench on the
/// right that is 6 plates lower.
fn scene(dir: &Path) -> GenerationConfig {
    let heightmap = dir.join("height.png");
    let colormap = dir.join("color.png");
    let colorset = dir.join("colorSet.txt");
    let bricks = dir.join("bricks.json");

    write_png(&heightmap, 4, 4, |x, _| [if x < 2 { 8 } else { 2 }, 0, 0, 255]);
    write_png(&colormap, 4, 4, |x, _| {
        if x < 2 {
            [51, 153, 51, 255]
        } else {
            [0, 0, 250, 255]
        }
    });
    fs::write(&colorset, COLORSET).unwrap();
    fs::write(&bricks, BRICKS).unwrap();

    GenerationConfig {
        heightmap,
        colormap,
        colorset,
        bricks,
        output: dir.join("out").join("map.bls"),
        ..GenerationConfig::default()
    }
}

fn body_lines(text: &str) -> Vec<&str> {
    text.lines()
        .skip_while(|l| !l.starts_with("Linecount "))
        .skip(1)
        .collect()
}

/// Test: One brick per pixel, each with an owner line.
#[test]
fn test_plain_generation() {
    let dir = test_dir("plain");
    let config = scene(&dir);

    let summary = run(&config).unwrap();
    let text = fs::read_to_string(&config.output).unwrap();

    assert_eq!((summary.rows, summary.cols), (4, 4));
    assert_eq!(summary.save.records, 16);
    assert_eq!(summary.stacked_cells, 0);
    assert!(text.contains("\nLinecount 16\n"));

    let body = body_lines(&text);
    assert_eq!(body.len(), 32);
    assert_eq!(body[0], "1x1f\" 0.00 0.00 1.7 0 0 0  0 0 1 1 1");
    assert_eq!(body[1], "+-OWNER 999999");
    // Row 0, column 2 is water (palette index 2) at 2 plates
    assert_eq!(body[4], "1x1f\" 0.00 1.00 0.5 0 0 2  0 0 1 1 1");

    let _ = fs::remove_dir_all(&dir);
}

/// Test: Gap filling and merging together on the same map.
#[test]
fn test_gap_fill_and_optimize() {
    let dir = test_dir("optimized");
    let config = GenerationConfig {
        gap_fill: true,
        optimize: true,
        blid: -1,
        ..scene(&dir)
    };

    let summary = run(&config).unwrap();
    let text = fs::read_to_string(&config.output).unwrap();

    // The two plateau cells facing the trench drop 6 plates each
    assert_eq!(summary.stacked_cells, 4);
    // Four 2x2 blocks: two plateau blocks and two trench blocks
    assert_eq!(summary.merge.blocks_merged, 4);
    // Plateau blocks inherit a stack of 6, trench blocks stay at 1
    assert_eq!(summary.save.records, 6 + 6 + 1 + 1);
    assert!(!text.contains("+-OWNER"));
    assert!(body_lines(&text).iter().all(|l| l.starts_with("2x2f\" ")));

    let _ = fs::remove_dir_all(&dir);
}

/// Test: Height transforms run before cells are built.
#[test]
fn test_height_transforms() {
    let dir = test_dir("transforms");
    let config = GenerationConfig {
        z: Some(30),
        step: 3,
        ground: true,
        ..scene(&dir)
    };

    run(&config).unwrap();
    let text = fs::read_to_string(&config.output).unwrap();
    let body = body_lines(&text);

    // 8 -> 2 + 30 = 32 -> snapped to 33 -> grounded to 30; (0.5 + 30) / 5 = 6.1
    assert_eq!(body[0], "1x1f\" 0.00 0.00 6.1 0 0 0  0 0 1 1 1");
    // 2 -> 2 -> snapped to 3 -> grounded to 0
    assert_eq!(body[4], "1x1f\" 0.00 1.00 0.1 0 0 2  0 0 1 1 1");

    let _ = fs::remove_dir_all(&dir);
}

/// Test: Requested dimensions resample both maps.
#[test]
fn test_resampled_generation() {
    let dir = test_dir("resampled");
    let config = GenerationConfig {
        width: Some(8),
        height: Some(2),
        ..scene(&dir)
    };

    let summary = run(&config).unwrap();
    assert_eq!((summary.rows, summary.cols), (2, 8));
    assert_eq!(summary.save.records, 16);

    let _ = fs::remove_dir_all(&dir);
}

/// Test: A failing run never touches the previous output.
#[test]
fn test_failure_keeps_previous_output() {
    let dir = test_dir("failure");
    let config = scene(&dir);
    fs::create_dir_all(dir.join("out")).unwrap();
    fs::write(&config.output, "old save").unwrap();

    let broken = GenerationConfig {
        colorset: dir.join("missing.txt"),
        ..config.clone()
    };
    let err = run(&broken).unwrap_err();

    assert!(matches!(err, AppError::Core(CoreError::NotFound { .. })));
    assert_eq!(fs::read_to_string(&config.output).unwrap(), "old save");

    let _ = fs::remove_dir_all(&dir);
}

/// Test: A missing catalog is reported before any image is decoded.
#[test]
fn test_missing_catalog_reported_before_images() {
    let dir = test_dir("catalog_first");
    let scene = scene(&dir);
    fs::write(&scene.heightmap, "not a png, just some text long enough to fail").unwrap();
    let missing = dir.join("no_bricks.json");

    let broken = GenerationConfig {
        bricks: missing.clone(),
        ..scene
    };
    let err = run(&broken).unwrap_err();

    assert_eq!(
        err,
        AppError::Core(CoreError::NotFound {
            path: missing.display().to_string()
        })
    );
    assert!(!broken.output.exists());

    let _ = fs::remove_dir_all(&dir);
}

/// Test: A config file drives the same run as the equivalent struct.
#[test]
fn test_toml_config_run() {
    let dir = test_dir("toml");
    let scene = scene(&dir);
    let toml = format!(
        "heightmap = {:?}\ncolormap = {:?}\ncolorset = {:?}\nbricks = {:?}\noutput = {:?}\noptimize = true\n",
        scene.heightmap, scene.colormap, scene.colorset, scene.bricks, scene.output
    );
    let path = dir.join("gen.toml");
    fs::write(&path, toml).unwrap();

    let config = GenerationConfig::load(&path).unwrap();
    assert_eq!(config, GenerationConfig { optimize: true, ..scene });

    let summary = run(&config).unwrap();
    assert_eq!(summary.merge.blocks_merged, 4);
    assert_eq!(summary.save.records, 4);

    let _ = fs::remove_dir_all(&dir);
}

/// Test: The bundled default resources load and drive a run.
#[test]
fn test_bundled_defaults() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../res/default");
    let palette = heightbrick_core::Palette::load(root.join("colorSet.txt")).unwrap();
    let catalog = heightbrick_core::BrickCatalog::load(root.join("defaultBricks.json")).unwrap();
    assert_eq!(palette.len(), 35);
    assert_eq!(palette.columns().len(), 4);
    assert_eq!(catalog.base_height(), 1);

    let dir = test_dir("bundled");
    let heightmap = dir.join("height.png");
    write_png(&heightmap, 3, 3, |x, y| [(x * y) as u8, 0, 0, 255]);
    let config = GenerationConfig {
        heightmap,
        colormap: root.join("colorMap.png"),
        colorset: root.join("colorSet.txt"),
        bricks: root.join("defaultBricks.json"),
        output: dir.join("map.bls"),
        ..GenerationConfig::default()
    };

    let summary = run(&config).unwrap();
    assert_eq!(summary.save.records, 9);

    let _ = fs::remove_dir_all(&dir);
}
