//! Application configuration module.
//!
//! Handles loading, validating, and merging `imagesmith.toml` files. Stock
//! defaults are the base layer; a user file only needs the keys it overrides.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [generation]
//! model = "stabilityai/stable-diffusion-2-1"
//! num_inference_steps = 50
//! guidance_scale = 7.5
//! default_size = [512, 512]   # width, height
//! negative_prompt = "blurry, low quality, distorted"
//!
//! [enhancement]
//! upscale_factor = 2          # 1 disables upscaling
//! denoise_strength = 0.3      # 0.0-1.0
//! sharpen_amount = 0.5        # 0.0-1.0
//! color_enhance = true
//!
//! [output]
//! directory = "output"
//! format = "png"
//! quality = 95                # 1-100, used when encoding lossy formats
//!
//! [templates]
//! directory = "templates"
//! auto_load = true
//! ```
//!
//! The config is a plain value. Callers build one and hand it to
//! [`TemplateStore::from_config`](crate::templates::TemplateStore::from_config),
//! [`Enhancer::new`](crate::imaging::Enhancer::new) and
//! [`Generator::new`](crate::generation::Generator::new); nothing in the crate
//! reads a process-wide instance.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Defaults forwarded to the model backend.
    pub generation: GenerationConfig,
    /// Defaults for the enhancement pipeline (`enhancement.*`).
    pub enhancement: EnhancementConfig,
    /// Encoding settings used at the persistence boundary.
    pub output: OutputConfig,
    /// Template store location.
    pub templates: TemplatesConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.enhancement.upscale_factor == 0 {
            return Err(ConfigError::Validation(
                "enhancement.upscale_factor must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.enhancement.denoise_strength) {
            return Err(ConfigError::Validation(
                "enhancement.denoise_strength must be 0.0-1.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.enhancement.sharpen_amount) {
            return Err(ConfigError::Validation(
                "enhancement.sharpen_amount must be 0.0-1.0".into(),
            ));
        }
        if self.generation.default_size[0] == 0 || self.generation.default_size[1] == 0 {
            return Err(ConfigError::Validation(
                "generation.default_size values must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Look up a value by dotted key, e.g. `"enhancement.sharpen_amount"`.
    ///
    /// Returns `None` when any segment is missing.
    pub fn get(&self, key: &str) -> Option<toml::Value> {
        let mut value = toml::Value::try_from(self).ok()?;
        for segment in key.split('.') {
            value = match value {
                toml::Value::Table(mut table) => table.remove(segment)?,
                _ => return None,
            };
        }
        Some(value)
    }
}

/// Generation defaults. Only consumed when a caller leaves a value unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Model identifier handed to the backend as an opaque string.
    pub model: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f64,
    /// `[width, height]` used when a request does not specify a size.
    pub default_size: [u32; 2],
    pub negative_prompt: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "stabilityai/stable-diffusion-2-1".to_string(),
            num_inference_steps: 50,
            guidance_scale: 7.5,
            default_size: [512, 512],
            negative_prompt: "blurry, low quality, distorted".to_string(),
        }
    }
}

/// Enhancement pipeline defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnhancementConfig {
    pub upscale_factor: u32,
    pub denoise_strength: f32,
    pub sharpen_amount: f32,
    pub color_enhance: bool,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            upscale_factor: 2,
            denoise_strength: 0.3,
            sharpen_amount: 0.5,
            color_enhance: true,
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Default extension for generated files.
    pub format: String,
    /// Lossy encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            format: "png".to_string(),
            quality: 95,
        }
    }
}

/// Template persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    pub directory: PathBuf,
    /// Scan `directory` for records when the store is built.
    pub auto_load: bool,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("templates"),
            auto_load: true,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AppConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file, merged over stock defaults and validated.
///
/// A missing file is not an error: the stock defaults are returned.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse config text, merged over stock defaults and validated.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    let merged = merge_toml(stock_defaults_value(), overlay);
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `imagesmith.toml`.
pub fn stock_config_toml() -> &'static str {
    r##"# imagesmith configuration
# All options are optional. Values shown are the stock defaults.

[generation]
# Opaque model identifier handed to the generation backend.
model = "stabilityai/stable-diffusion-2-1"
num_inference_steps = 50
guidance_scale = 7.5
# [width, height] used when a request does not set a size.
default_size = [512, 512]
negative_prompt = "blurry, low quality, distorted"

[enhancement]
# Integer scale factor. 1 disables upscaling.
upscale_factor = 2
# Normalized 0.0-1.0 strengths.
denoise_strength = 0.3
sharpen_amount = 0.5
color_enhance = true

[output]
directory = "output"
format = "png"
# Lossy encoding quality, 1-100.
quality = 95

[templates]
# One JSON record per template.
directory = "templates"
auto_load = true
"##
}
