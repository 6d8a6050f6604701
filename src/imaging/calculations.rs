//! Pure calculation functions for dimensions and filter parameters.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::ImagingError;
use super::params::{DENOISE_H_SCALE, UNSHARP_PERCENT_SCALE, UNSHARP_RADIUS, UNSHARP_THRESHOLD, UnsharpMask};

/// Dimensions after scaling both edges by an integer factor.
///
/// Zero-sized sources have no meaningful ratio and are rejected, as are
/// results that overflow `u32`.
///
/// # Examples
/// ```
/// # use imagesmith::imaging::calculations::scaled_dimensions;
/// assert_eq!(scaled_dimensions((400, 300), 2).unwrap(), (800, 600));
/// assert!(scaled_dimensions((0, 300), 2).is_err());
/// ```
pub fn scaled_dimensions(source: (u32, u32), factor: u32) -> Result<(u32, u32), ImagingError> {
    let (width, height) = source;
    let invalid = ImagingError::InvalidDimensions { width, height };
    if width == 0 || height == 0 {
        return Err(invalid);
    }
    match (width.checked_mul(factor), height.checked_mul(factor)) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(invalid),
    }
}

/// Dimensions that fit the longer edge to `max_edge`, keeping aspect ratio.
///
/// The shorter edge is truncated, never rounded up past the ratio.
pub fn fit_to_max_edge(source: (u32, u32), max_edge: u32) -> Result<(u32, u32), ImagingError> {
    let (width, height) = source;
    let longest = width.max(height);
    if width == 0 || height == 0 {
        return Err(ImagingError::InvalidDimensions { width, height });
    }
    let ratio = max_edge as f64 / longest as f64;
    let w = ((width as f64 * ratio) as u32).max(1);
    let h = ((height as f64 * ratio) as u32).max(1);
    Ok((w, h))
}

/// Map a normalized denoise strength (0.0–1.0) to the non-local means `h`.
///
/// `h` is a whole number, so strengths below `1 / DENOISE_H_SCALE` give 0
/// and skip filtering.
pub fn denoise_h(strength: f32) -> f32 {
    (strength.max(0.0) * DENOISE_H_SCALE).trunc()
}

/// Map a normalized sharpen amount to an unsharp mask.
///
/// Returns `None` for `amount <= 0`: no sharpening at all.
pub fn unsharp_mask(amount: f32) -> Option<UnsharpMask> {
    if amount <= 0.0 || amount.is_nan() {
        return None;
    }
    Some(UnsharpMask {
        radius: UNSHARP_RADIUS,
        percent: (amount * UNSHARP_PERCENT_SCALE) as i32,
        threshold: UNSHARP_THRESHOLD,
    })
}

/// ITU-R 601-2 luma of an RGB triple.
pub fn luma(rgb: [u8; 3]) -> f32 {
    rgb[0] as f32 * 0.299 + rgb[1] as f32 * 0.587 + rgb[2] as f32 * 0.114
}

/// `(rows, cols)` of a near-square grid holding `count` cells.
///
/// Columns are `ceil(sqrt(count))`, rows are whatever is needed after that.
pub fn grid_shape(count: usize) -> (usize, usize) {
    if count == 0 {
        return (0, 0);
    }
    let cols = (count as f64).sqrt().ceil() as usize;
    let rows = count.div_ceil(cols);
    (rows, cols)
}

/// Top-left offset of a centered `crop` inside `source`, per axis.
///
/// Crops larger than the source yield a zero offset on that axis.
pub fn center_offset(source: (u32, u32), crop: (u32, u32)) -> (u32, u32) {
    (
        source.0.saturating_sub(crop.0) / 2,
        source.1.saturating_sub(crop.1) / 2,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_dimensions_doubles() {
        assert_eq!(scaled_dimensions((400, 300), 2).unwrap(), (800, 600));
        assert_eq!(scaled_dimensions((100, 100), 3).unwrap(), (300, 300));
    }

    #[test]
    fn scaled_dimensions_rejects_zero_edges() {
        assert!(matches!(
            scaled_dimensions((0, 10), 2),
            Err(ImagingError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(scaled_dimensions((10, 0), 2).is_err());
    }

    #[test]
    fn scaled_dimensions_rejects_zero_factor_and_overflow() {
        assert!(scaled_dimensions((10, 10), 0).is_err());
        assert!(scaled_dimensions((u32::MAX, 10), 2).is_err());
    }

    #[test]
    fn fit_to_max_edge_landscape() {
        assert_eq!(fit_to_max_edge((1000, 500), 200).unwrap(), (200, 100));
    }

    #[test]
    fn fit_to_max_edge_portrait() {
        assert_eq!(fit_to_max_edge((300, 600), 100).unwrap(), (50, 100));
    }

    #[test]
    fn fit_to_max_edge_rejects_zero() {
        assert!(fit_to_max_edge((0, 0), 100).is_err());
    }

    #[test]
    fn denoise_h_linear_scale() {
        assert_eq!(denoise_h(0.0), 0.0);
        assert_eq!(denoise_h(0.5), 15.0);
        assert_eq!(denoise_h(1.0), 30.0);
    }

    #[test]
    fn denoise_h_truncates() {
        assert_eq!(denoise_h(0.02), 0.0);
        assert_eq!(denoise_h(0.55), 16.0);
        assert_eq!(denoise_h(-0.5), 0.0);
    }

    #[test]
    fn unsharp_mask_zero_amount_is_none() {
        assert_eq!(unsharp_mask(0.0), None);
        assert_eq!(unsharp_mask(-0.2), None);
    }

    #[test]
    fn unsharp_mask_percent_scale() {
        let mask = unsharp_mask(0.5).unwrap();
        assert_eq!(mask.percent, 75);
        assert_eq!(mask.radius, 2.0);
        assert_eq!(mask.threshold, 3);
        assert_eq!(unsharp_mask(1.0).unwrap().percent, 150);
    }

    #[test]
    fn luma_of_primaries() {
        assert_eq!(luma([0, 0, 0]), 0.0);
        assert!((luma([255, 255, 255]) - 255.0).abs() < 0.01);
        assert!(luma([0, 255, 0]) > luma([255, 0, 0]));
    }

    #[test]
    fn grid_shape_near_square() {
        assert_eq!(grid_shape(0), (0, 0));
        assert_eq!(grid_shape(1), (1, 1));
        assert_eq!(grid_shape(4), (2, 2));
        assert_eq!(grid_shape(5), (2, 3));
        assert_eq!(grid_shape(10), (3, 4));
    }

    #[test]
    fn center_offset_centers_crop() {
        assert_eq!(center_offset((100, 80), (50, 40)), (25, 20));
        assert_eq!(center_offset((10, 10), (20, 20)), (0, 0));
    }
}
