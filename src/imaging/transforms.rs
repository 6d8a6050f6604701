//! Transform primitives.
//!
//! Every function takes a raster by reference and returns a new one; inputs
//! are never mutated. The tonal transforms follow the same model: blend the
//! image against a *degenerate* version of itself,
//!
//! ```text
//! out = degenerate + factor × (image − degenerate)
//! ```
//!
//! | Transform | Degenerate image | Neutral factor |
//! |---|---|---|
//! | [`saturate`] | per-pixel luma (grayscale) | 1.0 |
//! | [`contrast`] | flat gray at the mean luma | 1.0 |
//! | [`brightness`] | black | 1.0 (adjustment 0.0) |
//!
//! [`denoise`] is a non-local means filter over RGB patches, parallelized
//! across rows with rayon. [`sharpen`] is an unsharp mask on a Gaussian blur.

use super::backend::{ImagingError, Raster};
use super::calculations::{denoise_h, luma, scaled_dimensions, unsharp_mask};
use super::params::{DENOISE_PATCH_RADIUS, DENOISE_SEARCH_RADIUS, UnsharpMask};
use image::Rgb;
use image::imageops::{self, FilterType};
use rayon::prelude::*;

/// Upscale both edges by `factor` with Lanczos3 resampling.
pub fn upscale(image: &Raster, factor: u32) -> Result<Raster, ImagingError> {
    let (width, height) = scaled_dimensions(image.dimensions(), factor)?;
    Ok(imageops::resize(image, width, height, FilterType::Lanczos3))
}

/// Non-local means denoising at a normalized `strength` (0.0–1.0).
///
/// Zero strength returns an unfiltered copy.
pub fn denoise(image: &Raster, strength: f32) -> Raster {
    let h = denoise_h(strength);
    let (width, height) = image.dimensions();
    if h <= 0.0 || width == 0 || height == 0 {
        return image.clone();
    }
    let h2 = h * h;

    let mut out = Raster::new(width, height);
    let buffer: &mut [u8] = &mut out;
    buffer
        .par_chunks_mut(width as usize * 3)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i64;
            for x in 0..width as i64 {
                let mut acc = [0f32; 3];
                let mut total = 0f32;
                for sy in -DENOISE_SEARCH_RADIUS..=DENOISE_SEARCH_RADIUS {
                    for sx in -DENOISE_SEARCH_RADIUS..=DENOISE_SEARCH_RADIUS {
                        let (cx, cy) = (x + sx, y + sy);
                        let weight = (-patch_distance(image, (x, y), (cx, cy)) / h2).exp();
                        let p = clamped_pixel(image, cx, cy);
                        for c in 0..3 {
                            acc[c] += weight * p[c] as f32;
                        }
                        total += weight;
                    }
                }
                let idx = x as usize * 3;
                for c in 0..3 {
                    row[idx + c] = to_channel(acc[c] / total);
                }
            }
        });
    out
}

/// Mean squared difference between the patches around `a` and `b`.
fn patch_distance(image: &Raster, a: (i64, i64), b: (i64, i64)) -> f32 {
    let mut sum = 0f32;
    let mut count = 0u32;
    for dy in -DENOISE_PATCH_RADIUS..=DENOISE_PATCH_RADIUS {
        for dx in -DENOISE_PATCH_RADIUS..=DENOISE_PATCH_RADIUS {
            let pa = clamped_pixel(image, a.0 + dx, a.1 + dy);
            let pb = clamped_pixel(image, b.0 + dx, b.1 + dy);
            for c in 0..3 {
                let d = pa[c] as f32 - pb[c] as f32;
                sum += d * d;
            }
            count += 3;
        }
    }
    sum / count as f32
}

/// Pixel lookup with edge replication.
fn clamped_pixel(image: &Raster, x: i64, y: i64) -> &Rgb<u8> {
    let x = x.clamp(0, image.width() as i64 - 1) as u32;
    let y = y.clamp(0, image.height() as i64 - 1) as u32;
    image.get_pixel(x, y)
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Blend every channel of every pixel against a degenerate value.
fn blend(image: &Raster, factor: f32, degenerate: impl Fn(&Rgb<u8>) -> [f32; 3]) -> Raster {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let base = degenerate(pixel);
        for c in 0..3 {
            let v = pixel[c] as f32;
            pixel[c] = to_channel(base[c] + factor * (v - base[c]));
        }
    }
    out
}

/// Scale color saturation. `1.0` keeps the image, `0.0` yields grayscale.
pub fn saturate(image: &Raster, factor: f32) -> Raster {
    blend(image, factor, |p| {
        let l = luma(p.0).round();
        [l, l, l]
    })
}

/// Scale contrast around the image's mean luma. `1.0` keeps the image.
pub fn contrast(image: &Raster, factor: f32) -> Raster {
    let mean = mean_luma(image).round();
    blend(image, factor, |_| [mean, mean, mean])
}

/// Shift brightness by `adjustment` (-1.0 to 1.0). `0.0` keeps the image.
pub fn brightness(image: &Raster, adjustment: f32) -> Raster {
    blend(image, 1.0 + adjustment, |_| [0.0, 0.0, 0.0])
}

fn mean_luma(image: &Raster) -> f32 {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = image.pixels().map(|p| luma(p.0).round() as f64).sum();
    (sum / count as f64) as f32
}

/// Sharpen at a normalized `amount` (0.0–1.0).
///
/// `amount <= 0` returns an unfiltered copy without running the mask.
pub fn sharpen(image: &Raster, amount: f32) -> Raster {
    match unsharp_mask(amount) {
        Some(mask) => apply_unsharp_mask(image, mask),
        None => image.clone(),
    }
}

/// Add back `percent`% of (image − blurred) wherever it reaches `threshold`.
///
/// A raster with a zero edge has nothing to blur and comes back as is.
pub fn apply_unsharp_mask(image: &Raster, mask: UnsharpMask) -> Raster {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let blurred = imageops::blur(image, mask.radius);
    let mut out = image.clone();
    for (pixel, soft) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let diff = pixel[c] as i32 - soft[c] as i32;
            if diff.abs() >= mask.threshold {
                let v = pixel[c] as i32 + diff * mask.percent / 100;
                pixel[c] = v.clamp(0, 255) as u8;
            }
        }
    }
    out
}
