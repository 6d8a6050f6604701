//! Layout helpers around the pipeline: fitting, cropping, contact sheets and
//! before/after comparisons.
//!
//! Canvases are white. All resampling is Lanczos3, the same filter the
//! upscale step uses.

use super::backend::{ImagingError, Raster};
use super::calculations::{center_offset, fit_to_max_edge, grid_shape};
use image::imageops::{self, FilterType};
use image::{ImageReader, Rgb};
use serde::Serialize;
use std::path::Path;

const CANVAS: Rgb<u8> = Rgb([255, 255, 255]);

/// Horizontal gap between the two halves of a comparison.
pub const COMPARE_GAP: u32 = 10;

/// Resize so the longer edge equals `max_edge`, keeping aspect ratio.
pub fn resize_to_max_edge(image: &Raster, max_edge: u32) -> Result<Raster, ImagingError> {
    let (width, height) = fit_to_max_edge(image.dimensions(), max_edge)?;
    Ok(imageops::resize(image, width, height, FilterType::Lanczos3))
}

/// Cut a `width`×`height` region out of the middle of `image`.
///
/// A crop larger than the image is clamped to the image bounds.
pub fn crop_center(image: &Raster, width: u32, height: u32) -> Raster {
    let (x, y) = center_offset(image.dimensions(), (width, height));
    imageops::crop_imm(image, x, y, width, height).to_image()
}

/// Lay images out on a grid of equal cells, `padding` pixels apart and from
/// the border.
///
/// Cells are the size of the largest image; smaller images are stretched to
/// fill them. `grid` is `(rows, cols)`; without it the grid is near-square.
/// Images beyond `rows × cols` are dropped.
pub fn create_grid(
    images: &[Raster],
    grid: Option<(usize, usize)>,
    padding: u32,
) -> Result<Raster, ImagingError> {
    if images.is_empty() {
        return Err(ImagingError::EmptyInput);
    }
    let (rows, cols) = grid.unwrap_or_else(|| grid_shape(images.len()));
    let cell_w = images.iter().map(|i| i.width()).max().unwrap_or(0);
    let cell_h = images.iter().map(|i| i.height()).max().unwrap_or(0);
    if rows == 0 || cols == 0 || cell_w == 0 || cell_h == 0 {
        return Err(ImagingError::InvalidDimensions {
            width: cell_w,
            height: cell_h,
        });
    }

    let (rows, cols) = (rows as u32, cols as u32);
    let canvas_w = cols * cell_w + (cols + 1) * padding;
    let canvas_h = rows * cell_h + (rows + 1) * padding;
    let mut canvas = Raster::from_pixel(canvas_w, canvas_h, CANVAS);

    for (idx, image) in images.iter().take((rows * cols) as usize).enumerate() {
        let idx = idx as u32;
        let x = (idx % cols) * (cell_w + padding) + padding;
        let y = (idx / cols) * (cell_h + padding) + padding;
        if image.dimensions() == (cell_w, cell_h) {
            imageops::replace(&mut canvas, image, x as i64, y as i64);
        } else {
            let cell = imageops::resize(image, cell_w, cell_h, FilterType::Lanczos3);
            imageops::replace(&mut canvas, &cell, x as i64, y as i64);
        }
    }
    Ok(canvas)
}

/// Place two images side by side at the smaller of their heights.
pub fn compare_side_by_side(left: &Raster, right: &Raster) -> Result<Raster, ImagingError> {
    let height = left.height().min(right.height());
    if height == 0 || left.width() == 0 || right.width() == 0 {
        return Err(ImagingError::InvalidDimensions {
            width: left.width().min(right.width()),
            height,
        });
    }
    let fit = |image: &Raster| {
        let width = (image.width() as u64 * height as u64 / image.height() as u64).max(1) as u32;
        imageops::resize(image, width, height, FilterType::Lanczos3)
    };
    let (a, b) = (fit(left), fit(right));

    let mut canvas = Raster::from_pixel(a.width() + b.width() + COMPARE_GAP, height, CANVAS);
    imageops::replace(&mut canvas, &a, 0, 0);
    imageops::replace(&mut canvas, &b, (a.width() + COMPARE_GAP) as i64, 0);
    Ok(canvas)
}

/// Basic facts about an image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Detected container format, when read from a file.
    pub format: Option<String>,
    /// Size on disk, when read from a file.
    pub file_size: Option<u64>,
    /// `width / height`, or `0.0` for zero height.
    pub aspect_ratio: f64,
}

impl ImageInfo {
    pub fn of(image: &Raster) -> Self {
        Self::new(image.width(), image.height(), None, None)
    }

    /// Read dimensions and format from the file header without decoding.
    pub fn from_path(path: &Path) -> Result<Self, ImagingError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        let format = reader.format().map(|f| format!("{f:?}").to_uppercase());
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ImagingError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let file_size = std::fs::metadata(path)?.len();
        Ok(Self::new(width, height, format, Some(file_size)))
    }

    fn new(width: u32, height: u32, format: Option<String>, file_size: Option<u64>) -> Self {
        let aspect_ratio = if height > 0 {
            width as f64 / height as f64
        } else {
            0.0
        };
        Self {
            width,
            height,
            format,
            file_size,
            aspect_ratio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::RasterIo;
    use crate::imaging::{Quality, RustBackend};
    use crate::test_helpers::{gradient, solid};
    use tempfile::TempDir;

    #[test]
    fn resize_to_max_edge_keeps_ratio() {
        let out = resize_to_max_edge(&gradient(400, 200), 100).unwrap();
        assert_eq!(out.dimensions(), (100, 50));
    }

    #[test]
    fn resize_to_max_edge_zero_fails() {
        assert!(matches!(
            resize_to_max_edge(&Raster::new(0, 0), 100),
            Err(ImagingError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn crop_center_takes_middle() {
        let image = Raster::from_fn(10, 10, |x, y| {
            if (3..7).contains(&x) && (3..7).contains(&y) {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let out = crop_center(&image, 4, 4);
        assert_eq!(out.dimensions(), (4, 4));
        assert!(out.pixels().all(|p| p.0 == [255, 0, 0]));
    }

    #[test]
    fn crop_center_clamps_to_bounds() {
        let out = crop_center(&gradient(8, 6), 20, 20);
        assert_eq!(out.dimensions(), (8, 6));
    }

    #[test]
    fn grid_of_five_is_two_by_three() {
        let images = vec![solid(10, 10, [0, 0, 0]); 5];
        let out = create_grid(&images, None, 5).unwrap();
        assert_eq!(out.dimensions(), (3 * 10 + 4 * 5, 2 * 10 + 3 * 5));
        // Padding and the empty sixth cell stay white
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(5, 5).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(2 * 15 + 5, 15 + 5).0, [255, 255, 255]);
    }

    #[test]
    fn grid_stretches_small_images_to_cell() {
        let images = vec![solid(20, 10, [0, 0, 0]), solid(4, 4, [0, 0, 255])];
        let out = create_grid(&images, Some((1, 2)), 0).unwrap();
        assert_eq!(out.dimensions(), (40, 10));
        assert_eq!(out.get_pixel(30, 5).0, [0, 0, 255]);
    }

    #[test]
    fn grid_drops_images_beyond_cells() {
        let images = vec![solid(4, 4, [0, 0, 0]); 3];
        let out = create_grid(&images, Some((1, 1)), 0).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
    }

    #[test]
    fn grid_empty_input_errors() {
        assert!(matches!(
            create_grid(&[], None, 5),
            Err(ImagingError::EmptyInput)
        ));
    }

    #[test]
    fn compare_matches_smaller_height() {
        let out = compare_side_by_side(&gradient(100, 100), &gradient(100, 50)).unwrap();
        assert_eq!(out.dimensions(), (50 + 100 + COMPARE_GAP, 50));
        assert_eq!(out.get_pixel(50 + COMPARE_GAP / 2, 10).0, [255, 255, 255]);
    }

    #[test]
    fn info_of_raster() {
        let info = ImageInfo::of(&gradient(300, 200));
        assert_eq!((info.width, info.height), (300, 200));
        assert_eq!(info.format, None);
        assert!((info.aspect_ratio - 1.5).abs() < 1e-9);
    }

    #[test]
    fn info_from_png_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("x.png");
        RustBackend::new()
            .save(&gradient(30, 20), &path, Quality::default())
            .unwrap();

        let info = ImageInfo::from_path(&path).unwrap();
        assert_eq!((info.width, info.height), (30, 20));
        assert_eq!(info.format.as_deref(), Some("PNG"));
        assert!(info.file_size.unwrap() > 0);
    }
}
