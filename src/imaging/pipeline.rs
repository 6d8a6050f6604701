//! The enhancement pipeline.
//!
//! # Step Order
//!
//! Enabled steps always run in this order, whatever the caller asks for:
//!
//! ```text
//! upscale → denoise → color → contrast → brightness → sharpen
//! ```
//!
//! Upscaling first means every later filter works at the final resolution.
//! Denoising before sharpening keeps noise from being amplified, and tonal
//! adjustments come before sharpening so edges are sharpened on the final
//! tonal range.
//!
//! # Resolution
//!
//! [`EnhanceOptions`] may leave numeric values unset. They are filled from
//! the `[enhancement]` config section once, when the options are turned into
//! an [`EnhancementRequest`]. A disabled step is left out of the request
//! entirely; it is never run with a neutral parameter.
//!
//! # Derived Operations
//!
//! | Operation | Steps |
//! |---|---|
//! | [`Enhancer::auto_enhance`] | general pipeline with denoise, color, contrast and sharpen on |
//! | [`Enhancer::super_resolution`] | upscale, then sharpen at 0.3 (config not consulted) |
//! | [`Enhancer::remove_noise`] | denoise only |
//! | [`Enhancer::adjust_lighting`] | brightness then contrast, each skipped at its neutral value |
//!
//! When an output path is given the final raster is persisted once, after
//! the last step.

use super::backend::{ImagingError, Raster, RasterIo, RasterSource};
use super::params::{COLOR_ENHANCE_FACTOR, CONTRAST_ENHANCE_FACTOR, Quality, SUPER_RESOLUTION_SHARPEN};
use super::rust_backend::{RustBackend, is_supported_input};
use super::transforms;
use crate::config::{AppConfig, EnhancementConfig};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Switches for [`Enhancer::enhance`].
///
/// `None` numeric values are resolved from config. The defaults enable
/// denoise, sharpen and contrast, and take upscaling, strengths and the
/// color switch from config.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceOptions {
    /// Integer scale factor; `<= 1` skips upscaling.
    pub upscale_factor: Option<u32>,
    pub denoise: bool,
    /// Normalized 0.0–1.0.
    pub denoise_strength: Option<f32>,
    pub sharpen: bool,
    /// Normalized 0.0–1.0.
    pub sharpen_amount: Option<f32>,
    pub color_enhance: Option<bool>,
    pub contrast_enhance: bool,
    /// -1.0 to 1.0. `None` or `0.0` skips the step.
    pub brightness_adjust: Option<f32>,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            upscale_factor: None,
            denoise: true,
            denoise_strength: None,
            sharpen: true,
            sharpen_amount: None,
            color_enhance: None,
            contrast_enhance: true,
            brightness_adjust: None,
        }
    }
}

impl EnhanceOptions {
    /// Every step switched off. Start here to enable steps one by one.
    pub fn disabled() -> Self {
        Self {
            upscale_factor: Some(1),
            denoise: false,
            denoise_strength: None,
            sharpen: false,
            sharpen_amount: None,
            color_enhance: Some(false),
            contrast_enhance: false,
            brightness_adjust: None,
        }
    }

    /// Fill unset values from config and lay out the enabled steps in
    /// pipeline order.
    pub fn resolve(&self, config: &EnhancementConfig) -> Vec<Step> {
        let mut steps = Vec::new();

        let factor = self.upscale_factor.unwrap_or(config.upscale_factor);
        if factor > 1 {
            steps.push(Step::Upscale { factor });
        }
        if self.denoise {
            steps.push(Step::Denoise {
                strength: self.denoise_strength.unwrap_or(config.denoise_strength),
            });
        }
        if self.color_enhance.unwrap_or(config.color_enhance) {
            steps.push(Step::Color {
                factor: COLOR_ENHANCE_FACTOR,
            });
        }
        if self.contrast_enhance {
            steps.push(Step::Contrast {
                factor: CONTRAST_ENHANCE_FACTOR,
            });
        }
        if let Some(adjustment) = self.brightness_adjust
            && adjustment != 0.0
        {
            steps.push(Step::Brightness { adjustment });
        }
        if self.sharpen {
            steps.push(Step::Sharpen {
                amount: self.sharpen_amount.unwrap_or(config.sharpen_amount),
            });
        }
        steps
    }
}

/// One resolved transform with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Upscale { factor: u32 },
    Denoise { strength: f32 },
    Color { factor: f32 },
    Contrast { factor: f32 },
    Brightness { adjustment: f32 },
    Sharpen { amount: f32 },
}

impl Step {
    pub fn apply(&self, raster: &Raster) -> Result<Raster, ImagingError> {
        Ok(match *self {
            Step::Upscale { factor } => transforms::upscale(raster, factor)?,
            Step::Denoise { strength } => transforms::denoise(raster, strength),
            Step::Color { factor } => transforms::saturate(raster, factor),
            Step::Contrast { factor } => transforms::contrast(raster, factor),
            Step::Brightness { adjustment } => transforms::brightness(raster, adjustment),
            Step::Sharpen { amount } => transforms::sharpen(raster, amount),
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Upscale { factor } => write!(f, "upscale x{factor}"),
            Step::Denoise { strength } => write!(f, "denoise {strength}"),
            Step::Color { factor } => write!(f, "color x{factor}"),
            Step::Contrast { factor } => write!(f, "contrast x{factor}"),
            Step::Brightness { adjustment } => write!(f, "brightness {adjustment:+}"),
            Step::Sharpen { amount } => write!(f, "sharpen {amount}"),
        }
    }
}

/// A fully resolved pipeline run. Lives for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementRequest {
    pub steps: Vec<Step>,
    pub output: Option<PathBuf>,
}

/// Outcome of [`Enhancer::enhance_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Written output paths, in input file-name order.
    pub processed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, ImagingError)>,
}

/// Runs enhancement requests against a [`RasterIo`] backend.
pub struct Enhancer<B: RasterIo = RustBackend> {
    backend: B,
    config: EnhancementConfig,
    quality: Quality,
}

impl Enhancer<RustBackend> {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_backend(RustBackend::new(), config)
    }
}

impl<B: RasterIo> Enhancer<B> {
    pub fn with_backend(backend: B, config: &AppConfig) -> Self {
        Self {
            backend,
            config: config.enhancement.clone(),
            quality: Quality::new(config.output.quality),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Resolve options into a request without running it.
    pub fn plan(&self, options: &EnhanceOptions, output: Option<&Path>) -> EnhancementRequest {
        EnhancementRequest {
            steps: options.resolve(&self.config),
            output: output.map(Path::to_path_buf),
        }
    }

    /// Run the general pipeline.
    pub fn enhance(
        &self,
        source: impl Into<RasterSource>,
        options: &EnhanceOptions,
        output: Option<&Path>,
    ) -> Result<Raster, ImagingError> {
        let request = self.plan(options, output);
        self.run(source.into(), &request)
    }

    /// Denoise, color, contrast and sharpen with config strengths.
    pub fn auto_enhance(
        &self,
        source: impl Into<RasterSource>,
        output: Option<&Path>,
    ) -> Result<Raster, ImagingError> {
        let options = EnhanceOptions {
            denoise: true,
            sharpen: true,
            color_enhance: Some(true),
            contrast_enhance: true,
            ..EnhanceOptions::default()
        };
        self.enhance(source, &options, output)
    }

    /// Upscale by `scale`, then a fixed light sharpen.
    pub fn super_resolution(
        &self,
        source: impl Into<RasterSource>,
        scale: u32,
        output: Option<&Path>,
    ) -> Result<Raster, ImagingError> {
        let request = EnhancementRequest {
            steps: vec![
                Step::Upscale { factor: scale },
                Step::Sharpen {
                    amount: SUPER_RESOLUTION_SHARPEN,
                },
            ],
            output: output.map(Path::to_path_buf),
        };
        self.run(source.into(), &request)
    }

    /// Denoise only.
    pub fn remove_noise(
        &self,
        source: impl Into<RasterSource>,
        strength: f32,
        output: Option<&Path>,
    ) -> Result<Raster, ImagingError> {
        let request = EnhancementRequest {
            steps: vec![Step::Denoise { strength }],
            output: output.map(Path::to_path_buf),
        };
        self.run(source.into(), &request)
    }

    /// Brightness then contrast. A value at its neutral point (brightness
    /// `0.0`, contrast `1.0`) skips that step.
    pub fn adjust_lighting(
        &self,
        source: impl Into<RasterSource>,
        brightness: f32,
        contrast: f32,
        output: Option<&Path>,
    ) -> Result<Raster, ImagingError> {
        let mut steps = Vec::new();
        if brightness != 0.0 {
            steps.push(Step::Brightness {
                adjustment: brightness,
            });
        }
        if contrast != 1.0 {
            steps.push(Step::Contrast { factor: contrast });
        }
        let request = EnhancementRequest {
            steps,
            output: output.map(Path::to_path_buf),
        };
        self.run(source.into(), &request)
    }

    /// Resolve the source, apply every step in order, persist once.
    pub fn run(
        &self,
        source: RasterSource,
        request: &EnhancementRequest,
    ) -> Result<Raster, ImagingError> {
        let mut raster = source.resolve(&self.backend)?;
        tracing::debug!(
            width = raster.width(),
            height = raster.height(),
            steps = request.steps.len(),
            "enhancing image"
        );

        for step in &request.steps {
            raster = step.apply(&raster)?;
            tracing::debug!(%step, width = raster.width(), height = raster.height(), "applied step");
        }

        if let Some(path) = &request.output {
            self.backend.save(&raster, path, self.quality)?;
            tracing::info!(path = %path.display(), "saved enhanced image");
        }
        Ok(raster)
    }

    /// Enhance every image directly inside `input_dir` into `output_dir`,
    /// keeping file names. Files run in parallel; a failing file is logged
    /// and reported, the rest still run.
    pub fn enhance_batch(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        options: &EnhanceOptions,
    ) -> Result<BatchReport, ImagingError> {
        std::fs::create_dir_all(output_dir)?;

        let mut inputs = Vec::new();
        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => ImagingError::Io(io),
                None => ImagingError::Io(std::io::Error::other("directory walk failed")),
            })?;
            if entry.file_type().is_file() && is_supported_input(entry.path()) {
                inputs.push(entry.into_path());
            }
        }

        let steps = options.resolve(&self.config);
        let results: Vec<(PathBuf, Result<PathBuf, ImagingError>)> = inputs
            .into_par_iter()
            .map(|input| {
                let output = output_dir.join(input.file_name().unwrap_or_default());
                let request = EnhancementRequest {
                    steps: steps.clone(),
                    output: Some(output.clone()),
                };
                let result = self
                    .run(RasterSource::Path(input.clone()), &request)
                    .map(|_| output);
                (input, result)
            })
            .collect();

        let mut report = BatchReport::default();
        for (input, result) in results {
            match result {
                Ok(output) => report.processed.push(output),
                Err(e) => {
                    tracing::warn!(path = %input.display(), error = %e, "failed to enhance image");
                    report.failed.push((input, e));
                }
            }
        }
        Ok(report)
    }
}
