//! Template-driven image generation.
//!
//! The model itself is an injected [`ModelBackend`]: this crate never loads,
//! selects or runs one. What lives here is the boundary logic around it.
//!
//! 1. **Prompt resolution** ([`prepare_from_template`]): look up a template,
//!    fill its placeholders, merge its parameters with caller overrides.
//! 2. **Parameter resolution** ([`Generator::resolve`]): fill anything still
//!    unset from the `[generation]` config section.
//! 3. **Output naming**: one image goes to the exact output path, several go
//!    to `stem_0.ext`, `stem_1.ext`, … next to it.
//!
//! ## Parameter Precedence
//!
//! ```text
//! caller overrides  >  template parameters  >  [generation] config
//! ```
//!
//! The negative prompt follows the same chain: a caller-supplied
//! `negative_prompt` override wins, otherwise the template's own negative
//! prompt is used (even when empty), and config only applies to prompts
//! that did not come from a template.

use crate::config::{AppConfig, GenerationConfig};
use crate::imaging::{ImagingError, Quality, Raster, RasterIo, RustBackend};
use crate::templates::{ParamValue, Parameters, TemplateError, TemplateStore};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Parameter key that carries a negative prompt inside overrides.
pub const NEGATIVE_PROMPT_KEY: &str = "negative_prompt";

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("Invalid value for '{name}': {value}")]
    InvalidParameter { name: String, value: String },
    #[error("Model backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

/// A resolved prompt plus merged parameters, ready to hand to a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptRequest {
    pub template: String,
    pub prompt: String,
    pub negative_prompt: String,
    pub parameters: Parameters,
}

/// Resolve a template into a [`PromptRequest`].
///
/// Overrides win over template parameters on key conflict. A
/// `negative_prompt` override replaces the template's negative prompt and is
/// not kept among the parameters.
pub fn prepare_from_template(
    store: &TemplateStore,
    name: &str,
    variables: &HashMap<String, String>,
    overrides: &Parameters,
) -> Result<PromptRequest, GenerationError> {
    let template = store
        .get(name)
        .ok_or_else(|| GenerationError::TemplateNotFound(name.to_string()))?;
    let prompt = template.format_prompt(variables)?;

    let mut parameters = template.parameters.clone();
    parameters.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));

    let negative_prompt = match parameters.remove(NEGATIVE_PROMPT_KEY) {
        Some(value) => value.to_string(),
        None => template.negative_prompt.clone(),
    };

    Ok(PromptRequest {
        template: template.name.clone(),
        prompt,
        negative_prompt,
        parameters,
    })
}

/// Caller-side generation settings. `None` falls back to config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub negative_prompt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub num_inference_steps: Option<u32>,
    pub guidance_scale: Option<f64>,
    pub seed: Option<u64>,
    pub num_images: Option<u32>,
    /// Keys the generator does not interpret, forwarded to the model as is.
    pub extra: Parameters,
}

impl GenerationOptions {
    /// Split a parameter map into known settings and pass-through extras.
    pub fn from_parameters(parameters: &Parameters) -> Result<Self, GenerationError> {
        let mut options = Self::default();
        for (key, value) in parameters {
            match key.as_str() {
                NEGATIVE_PROMPT_KEY => options.negative_prompt = Some(value.to_string()),
                "width" => options.width = Some(whole(key, value)?),
                "height" => options.height = Some(whole(key, value)?),
                "num_inference_steps" => options.num_inference_steps = Some(whole(key, value)?),
                "num_images" => options.num_images = Some(whole(key, value)?),
                "seed" => options.seed = Some(whole(key, value)?),
                "guidance_scale" => {
                    options.guidance_scale = Some(value.as_f64().ok_or_else(|| invalid(key, value))?)
                }
                _ => {
                    options.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(options)
    }

    /// Options for a resolved template request.
    pub fn from_request(request: &PromptRequest) -> Result<Self, GenerationError> {
        let mut options = Self::from_parameters(&request.parameters)?;
        options.negative_prompt = Some(request.negative_prompt.clone());
        Ok(options)
    }
}

fn invalid(name: &str, value: &ParamValue) -> GenerationError {
    GenerationError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}

/// A non-negative whole number that fits the target type.
fn whole<T: TryFrom<i64>>(name: &str, value: &ParamValue) -> Result<T, GenerationError> {
    match value {
        ParamValue::Integer(i) if *i >= 0 => T::try_from(*i).map_err(|_| invalid(name, value)),
        ParamValue::Float(f) if f.fract() == 0.0 && *f >= 0.0 => {
            T::try_from(*f as i64).map_err(|_| invalid(name, value))
        }
        _ => Err(invalid(name, value)),
    }
}

/// Fully resolved settings handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub negative_prompt: String,
    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub guidance_scale: f64,
    pub seed: Option<u64>,
    pub num_images: u32,
    pub extra: Parameters,
}

/// The opaque text-to-image capability.
pub trait ModelBackend {
    /// Produce `params.num_images` rasters for `prompt`.
    fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Vec<Raster>, GenerationError>;
}

/// Where generated images are written for a given output path.
///
/// ```
/// # use imagesmith::generation::output_paths;
/// # use std::path::{Path, PathBuf};
/// assert_eq!(output_paths(Path::new("out/cat.png"), 1), vec![PathBuf::from("out/cat.png")]);
/// assert_eq!(
///     output_paths(Path::new("out/cat.png"), 2),
///     vec![PathBuf::from("out/cat_0.png"), PathBuf::from("out/cat_1.png")]
/// );
/// ```
pub fn output_paths(path: &Path, count: usize) -> Vec<PathBuf> {
    if count == 1 {
        return vec![path.to_path_buf()];
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (0..count)
        .map(|i| path.with_file_name(format!("{stem}_{i}{suffix}")))
        .collect()
}

/// File name of the `index`-th prompt in a batch.
pub fn batch_file_name(index: usize) -> String {
    format!("image_{index:03}.png")
}

/// Runs prompts through a [`ModelBackend`] and persists the results.
pub struct Generator<M: ModelBackend, B: RasterIo = RustBackend> {
    model: M,
    io: B,
    config: GenerationConfig,
    quality: Quality,
}

impl<M: ModelBackend> Generator<M, RustBackend> {
    pub fn new(model: M, config: &AppConfig) -> Self {
        Self::with_io(model, RustBackend::new(), config)
    }
}

impl<M: ModelBackend, B: RasterIo> Generator<M, B> {
    pub fn with_io(model: M, io: B, config: &AppConfig) -> Self {
        Self {
            model,
            io,
            config: config.generation.clone(),
            quality: Quality::new(config.output.quality),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn io(&self) -> &B {
        &self.io
    }

    /// Model identifier from config.
    pub fn model_name(&self) -> &str {
        &self.config.model
    }

    /// Fill unset options from config.
    pub fn resolve(&self, options: &GenerationOptions) -> GenerationParams {
        let [default_width, default_height] = self.config.default_size;
        GenerationParams {
            negative_prompt: options
                .negative_prompt
                .clone()
                .unwrap_or_else(|| self.config.negative_prompt.clone()),
            width: options.width.unwrap_or(default_width),
            height: options.height.unwrap_or(default_height),
            num_inference_steps: options
                .num_inference_steps
                .unwrap_or(self.config.num_inference_steps),
            guidance_scale: options.guidance_scale.unwrap_or(self.config.guidance_scale),
            seed: options.seed,
            num_images: options.num_images.unwrap_or(1),
            extra: options.extra.clone(),
        }
    }

    /// Generate images for `prompt`, saving them when `output` is given.
    pub fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
        output: Option<&Path>,
    ) -> Result<Vec<Raster>, GenerationError> {
        let params = self.resolve(options);
        tracing::info!(
            model = %self.model_name(),
            count = params.num_images,
            width = params.width,
            height = params.height,
            "generating images"
        );
        tracing::debug!(%prompt, "prompt");

        let images = self.model.generate(prompt, &params)?;
        if images.is_empty() {
            return Err(GenerationError::Backend("model returned no images".to_string()));
        }

        if let Some(path) = output {
            for (image, target) in images.iter().zip(output_paths(path, images.len())) {
                self.io.save(image, &target, self.quality)?;
                tracing::info!(path = %target.display(), "saved generated image");
            }
        }
        Ok(images)
    }

    /// Resolve a template and generate from it.
    pub fn generate_from_template(
        &self,
        store: &TemplateStore,
        name: &str,
        variables: &HashMap<String, String>,
        overrides: &Parameters,
        output: Option<&Path>,
    ) -> Result<Vec<Raster>, GenerationError> {
        let request = prepare_from_template(store, name, variables, overrides)?;
        let options = GenerationOptions::from_request(&request)?;
        self.generate(&request.prompt, &options, output)
    }

    /// Generate one output per prompt into `output_dir` as `image_NNN.png`.
    /// Stops at the first failure.
    pub fn batch_generate<S: AsRef<str>>(
        &self,
        prompts: &[S],
        output_dir: &Path,
        options: &GenerationOptions,
    ) -> Result<Vec<Vec<Raster>>, GenerationError> {
        std::fs::create_dir_all(output_dir).map_err(ImagingError::from)?;
        prompts
            .iter()
            .enumerate()
            .map(|(i, prompt)| {
                let path = output_dir.join(batch_file_name(i));
                self.generate(prompt.as_ref(), options, Some(&path))
            })
            .collect()
    }
}
