//! Image enhancement: pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` (`ImageReader`, `JpegEncoder`, `AvifEncoder`) |
//! | **Upscale** | `imageops::resize`, Lanczos3 |
//! | **Denoise** | non-local means, rows in parallel with `rayon` |
//! | **Color / contrast / brightness** | blend against a degenerate image |
//! | **Sharpen** | unsharp mask over `imageops::blur` |
//!
//! The module is split into:
//! - **Calculations**: pure functions for dimension and filter-parameter math
//! - **Parameters**: constants and data structures describing transforms
//! - **Backend**: [`RasterIo`] trait + [`RustBackend`]
//! - **Transforms**: the pixel primitives
//! - **Pipeline**: [`Enhancer`], which orders and runs transforms
//! - **Compose**: grids, crops and comparisons

pub mod backend;
pub mod calculations;
pub mod compose;
mod params;
pub mod pipeline;
pub mod rust_backend;
pub mod transforms;

pub use backend::{ImagingError, Raster, RasterIo, RasterSource};
pub use compose::ImageInfo;
pub use params::{Quality, UnsharpMask};
pub use pipeline::{BatchReport, EnhanceOptions, EnhancementRequest, Enhancer, Step};
pub use rust_backend::RustBackend;
