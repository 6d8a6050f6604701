//! Shared test utilities: small deterministic rasters.
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let smooth = gradient(40, 30);
//! let grainy = noisy(24, 24);
//! let flat = solid(8, 8, [90, 120, 200]);
//! ```

use crate::imaging::Raster;
use image::Rgb;

/// Mid-range diagonal gradient. Channels stay within 64..=192 so tonal
/// transforms have room to move in both directions without clipping.
pub fn gradient(width: u32, height: u32) -> Raster {
    Raster::from_fn(width, height, |x, y| {
        let r = 64 + x * 128 / width.max(1);
        let g = 64 + y * 128 / height.max(1);
        Rgb([r as u8, g as u8, 128])
    })
}

/// Gray with hashed per-pixel noise in 96..160. Same output every call.
pub fn noisy(width: u32, height: u32) -> Raster {
    Raster::from_fn(width, height, |x, y| {
        let n = (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663)) % 64;
        let v = 96 + n as u8;
        Rgb([v, v, v])
    })
}

pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Raster {
    Raster::from_pixel(width, height, Rgb(rgb))
}
