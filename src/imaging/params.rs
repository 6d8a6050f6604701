//! Parameter types and constants for image transforms.
//!
//! These describe *what* a transform should do. The pixel work lives in
//! [`transforms`](super::transforms); the mapping from normalized user values
//! (0.0–1.0) to these native parameters lives in
//! [`calculations`](super::calculations).
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`UnsharpMask`]: Gaussian radius, percent strength and threshold for sharpening.

/// Non-local means filter strength at `denoise_strength = 1.0`.
pub const DENOISE_H_SCALE: f32 = 30.0;

/// Half-size of the patch compared between pixels (3×3 patches).
pub const DENOISE_PATCH_RADIUS: i64 = 1;

/// Half-size of the neighborhood searched for similar patches (7×7 window).
pub const DENOISE_SEARCH_RADIUS: i64 = 3;

/// Gaussian radius of the unsharp mask.
pub const UNSHARP_RADIUS: f32 = 2.0;

/// Unsharp percent at `sharpen_amount = 1.0`.
pub const UNSHARP_PERCENT_SCALE: f32 = 150.0;

/// Minimum per-channel difference (0–255) that gets sharpened.
pub const UNSHARP_THRESHOLD: i32 = 3;

/// Saturation factor of the color-enhance step.
pub const COLOR_ENHANCE_FACTOR: f32 = 1.3;

/// Contrast factor of the contrast-enhance step.
pub const CONTRAST_ENHANCE_FACTOR: f32 = 1.2;

/// Sharpen amount of the fixed pass after super-resolution upscaling.
pub const SUPER_RESOLUTION_SHARPEN: f32 = 0.3;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Unsharp-mask configuration.
///
/// - `radius`: standard deviation of the Gaussian blur used as the mask
/// - `percent`: how much of the difference is added back (100 = 1×)
/// - `threshold`: minimum difference to sharpen (0 = sharpen every pixel)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnsharpMask {
    pub radius: f32,
    pub percent: i32,
    pub threshold: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_95() {
        assert_eq!(Quality::default().value(), 95);
    }
}
