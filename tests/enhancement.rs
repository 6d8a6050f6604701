//! Enhancement pipeline against real files.

use image::{Rgb, RgbImage};
use imagesmith::config::{AppConfig, parse_config};
use imagesmith::imaging::{EnhanceOptions, Enhancer, RasterIo, RustBackend};
use std::path::Path;
use tempfile::TempDir;

fn sample(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 100])
    })
}

fn write_png(path: &Path, image: &RgbImage) {
    image.save(path).unwrap();
}

#[test]
fn enhance_file_writes_upscaled_output() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.png");
    let output = tmp.path().join("out/enhanced.png");
    write_png(&input, &sample(40, 30));

    let enhancer = Enhancer::new(&AppConfig::default());
    let result = enhancer
        .enhance(input.as_path(), &EnhanceOptions::default(), Some(&output))
        .unwrap();

    assert_eq!(result.dimensions(), (80, 60));
    let saved = RustBackend::new().load(&output).unwrap();
    assert_eq!((saved.width(), saved.height()), (80, 60));
}

#[test]
fn config_upscale_factor_flows_into_pipeline() {
    let config = parse_config("[enhancement]\nupscale_factor = 3\n").unwrap();
    let result = Enhancer::new(&config)
        .enhance(sample(10, 10), &EnhanceOptions::default(), None)
        .unwrap();
    assert_eq!(result.dimensions(), (30, 30));
}

#[test]
fn super_resolution_ignores_config() {
    let config = parse_config("[enhancement]\nupscale_factor = 4\n").unwrap();
    let result = Enhancer::new(&config)
        .super_resolution(sample(100, 100), 3, None)
        .unwrap();
    assert_eq!(result.dimensions(), (300, 300));
}

#[test]
fn lossless_output_of_disabled_pipeline_matches_input() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.png");
    let output = tmp.path().join("out.png");
    write_png(&input, &sample(16, 16));

    Enhancer::new(&AppConfig::default())
        .enhance(input.as_path(), &EnhanceOptions::disabled(), Some(&output))
        .unwrap();
    let saved = RustBackend::new().load(&output).unwrap().to_rgb8();
    assert_eq!(saved, sample(16, 16));
}

#[test]
fn batch_processes_images_and_reports_failures() {
    let tmp = TempDir::new().unwrap();
    let input_dir = tmp.path().join("in");
    let output_dir = tmp.path().join("out");
    std::fs::create_dir_all(&input_dir).unwrap();
    write_png(&input_dir.join("a.png"), &sample(8, 8));
    write_png(&input_dir.join("b.png"), &sample(12, 6));
    std::fs::write(input_dir.join("broken.jpg"), b"not an image").unwrap();
    std::fs::write(input_dir.join("readme.txt"), b"skip me").unwrap();

    let options = EnhanceOptions {
        upscale_factor: Some(1),
        ..EnhanceOptions::default()
    };
    let report = Enhancer::new(&AppConfig::default())
        .enhance_batch(&input_dir, &output_dir, &options)
        .unwrap();

    assert_eq!(
        report.processed,
        vec![output_dir.join("a.png"), output_dir.join("b.png")]
    );
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, input_dir.join("broken.jpg"));
    assert!(output_dir.join("b.png").exists());
    assert!(!output_dir.join("readme.txt").exists());
}

#[test]
fn missing_input_is_an_error() {
    let result = Enhancer::new(&AppConfig::default()).auto_enhance(
        Path::new("/definitely/not/here.png"),
        None,
    );
    assert!(result.is_err());
}
