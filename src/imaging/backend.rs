//! Raster I/O boundary and shared imaging types.
//!
//! Everything in the enhancement pipeline operates on an in-memory
//! [`Raster`]. Getting pixels in and out is the job of a [`RasterIo`]
//! implementation: decode a file into a raster, encode a raster to a file.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use a recording
//! mock so pipeline logic can be checked without touching the filesystem.
//!
//! Callers describe an input with [`RasterSource`]: either a path or an image
//! already in memory. It is resolved to a canonical RGB raster exactly once,
//! before any transform runs.

use super::params::Quality;
use image::{DynamicImage, RgbImage};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Canonical in-memory raster: 8-bit RGB.
pub type Raster = RgbImage;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("No images provided")]
    EmptyInput,
}

/// Where an input raster comes from.
#[derive(Debug, Clone)]
pub enum RasterSource {
    Path(PathBuf),
    Raster(DynamicImage),
}

impl From<PathBuf> for RasterSource {
    fn from(path: PathBuf) -> Self {
        RasterSource::Path(path)
    }
}

impl From<&Path> for RasterSource {
    fn from(path: &Path) -> Self {
        RasterSource::Path(path.to_path_buf())
    }
}

impl From<DynamicImage> for RasterSource {
    fn from(image: DynamicImage) -> Self {
        RasterSource::Raster(image)
    }
}

impl From<RgbImage> for RasterSource {
    fn from(image: RgbImage) -> Self {
        RasterSource::Raster(DynamicImage::ImageRgb8(image))
    }
}

impl RasterSource {
    /// Resolve to a canonical RGB raster, decoding through `io` if needed.
    pub fn resolve(self, io: &impl RasterIo) -> Result<Raster, ImagingError> {
        match self {
            RasterSource::Path(path) => Ok(io.load(&path)?.to_rgb8()),
            RasterSource::Raster(image) => Ok(image.to_rgb8()),
        }
    }
}

/// Load/persist primitives.
///
/// `Sync` so a single backend can serve a parallel batch.
pub trait RasterIo: Sync {
    /// Decode an image file.
    fn load(&self, path: &Path) -> Result<DynamicImage, ImagingError>;

    /// Encode `raster` to `path`, format chosen by extension. Parent
    /// directories are created as needed.
    fn save(&self, raster: &Raster, path: &Path, quality: Quality) -> Result<(), ImagingError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock I/O that records operations without touching disk.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockIo {
        pub images: Mutex<Vec<DynamicImage>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Load(String),
        Save {
            path: String,
            width: u32,
            height: u32,
            quality: u32,
        },
    }

    impl MockIo {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue images returned by successive `load` calls (last in, first out).
        pub fn with_images(images: Vec<DynamicImage>) -> Self {
            Self {
                images: Mutex::new(images),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn saves(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Save { .. }))
                .count()
        }
    }

    impl RasterIo for MockIo {
        fn load(&self, path: &Path) -> Result<DynamicImage, ImagingError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Load(path.to_string_lossy().to_string()));

            self.images
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ImagingError::Decode {
                    path: path.to_path_buf(),
                    message: "No mock image".to_string(),
                })
        }

        fn save(&self, raster: &Raster, path: &Path, quality: Quality) -> Result<(), ImagingError> {
            self.operations.lock().unwrap().push(RecordedOp::Save {
                path: path.to_string_lossy().to_string(),
                width: raster.width(),
                height: raster.height(),
                quality: quality.value(),
            });
            Ok(())
        }
    }

    #[test]
    fn mock_records_load() {
        let io = MockIo::with_images(vec![DynamicImage::new_rgb8(8, 6)]);
        let image = io.load(Path::new("/in.png")).unwrap();
        assert_eq!((image.width(), image.height()), (8, 6));
        assert_eq!(io.get_operations(), vec![RecordedOp::Load("/in.png".into())]);
    }

    #[test]
    fn mock_load_without_image_errors() {
        let io = MockIo::new();
        assert!(matches!(
            io.load(Path::new("/in.png")),
            Err(ImagingError::Decode { .. })
        ));
    }

    #[test]
    fn resolve_in_memory_converts_to_rgb() {
        let rgba = DynamicImage::new_rgba8(4, 3);
        let raster = RasterSource::from(rgba).resolve(&MockIo::new()).unwrap();
        assert_eq!(raster.dimensions(), (4, 3));
    }

    #[test]
    fn resolve_path_goes_through_io() {
        let io = MockIo::with_images(vec![DynamicImage::new_luma8(5, 5)]);
        let raster = RasterSource::from(Path::new("/gray.png"))
            .resolve(&io)
            .unwrap();
        assert_eq!(raster.dimensions(), (5, 5));
        assert_eq!(io.get_operations().len(), 1);
    }
}
