//! Pure Rust raster I/O using the `image` crate.
//!
//! ## Format mapping
//!
//! | Extension | Decode | Encode |
//! |---|---|---|
//! | jpg, jpeg | yes | `JpegEncoder` at the configured quality |
//! | avif | no | `AvifEncoder` (rav1e, speed 6) at the configured quality |
//! | png, webp, tif, tiff, bmp, gif | yes | lossless, quality ignored |
//!
//! AVIF is write-only: the `image` crate's `"avif"` feature only enables the
//! encoder.

use super::backend::{ImagingError, Raster, RasterIo};
use super::params::Quality;
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Extensions that can be decoded.
const INPUT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "tif", "tiff", "bmp", "gif"];

/// Whether `path` has a decodable image extension (case-insensitive).
pub fn is_supported_input(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| INPUT_EXTENSIONS.contains(&ext.as_str()))
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Pure Rust backend. See the [module docs](self) for the format mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

fn encode_error(path: &Path, e: impl std::fmt::Display) -> ImagingError {
    ImagingError::Encode {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

impl RasterIo for RustBackend {
    fn load(&self, path: &Path) -> Result<DynamicImage, ImagingError> {
        ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| ImagingError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    fn save(&self, raster: &Raster, path: &Path, quality: Quality) -> Result<(), ImagingError> {
        let ext = extension_of(path).unwrap_or_default();
        let format = match ext.as_str() {
            "jpg" | "jpeg" => None,
            "avif" => None,
            "png" => Some(ImageFormat::Png),
            "webp" => Some(ImageFormat::WebP),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            "gif" => Some(ImageFormat::Gif),
            other => return Err(ImagingError::UnsupportedFormat(other.to_string())),
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        match format {
            Some(format) => raster
                .save_with_format(path, format)
                .map_err(|e| encode_error(path, e)),
            None => {
                let writer = BufWriter::new(File::create(path)?);
                let quality = quality.value() as u8;
                if ext == "avif" {
                    let encoder = AvifEncoder::new_with_speed_quality(writer, 6, quality);
                    raster
                        .write_with_encoder(encoder)
                        .map_err(|e| encode_error(path, e))
                } else {
                    let encoder = JpegEncoder::new_with_quality(writer, quality);
                    raster
                        .write_with_encoder(encoder)
                        .map_err(|e| encode_error(path, e))
                }
            }
        }
    }
}
