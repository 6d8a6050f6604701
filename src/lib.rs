//! # Imagesmith
//!
//! Template-driven prompt building and deterministic image enhancement.
//! A caller describes what it wants declaratively, by naming a stored
//! template or by passing explicit parameters, and gets back either a
//! resolved prompt request or a transformed raster.
//!
//! # Two Subsystems
//!
//! ```text
//! caller → TemplateStore (lookup/search) → Template (format) → Generator → ModelBackend
//! caller → RasterSource → Enhancer (ordered transforms) → RasterIo (persist)
//! ```
//!
//! The generative model is an injected [`generation::ModelBackend`]. Nothing
//! in this crate loads or runs one; the CLI's `prompt` command stops at the
//! resolved request and prints it as JSON.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`templates`] | Template records, placeholder formatting, the in-memory store with JSON persistence |
//! | [`generation`] | Prompt resolution, parameter precedence, model boundary, output naming |
//! | [`imaging`] | Transform primitives, the enhancement pipeline, raster I/O, layout helpers |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fixed Step Order
//!
//! Enhancement steps always run `upscale → denoise → color → contrast →
//! brightness → sharpen`. Callers switch steps on and off; they never
//! reorder them. See [`imaging::pipeline`].
//!
//! ## Explicit Configuration
//!
//! There is no process-wide config. An [`config::AppConfig`] is loaded once
//! and handed to [`templates::TemplateStore::from_config`],
//! [`imaging::Enhancer::new`] and [`generation::Generator::new`].
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, encoding and every filter use the `image` crate plus `rayon`
//! for the denoise filter and batch runs. No system libraries are needed.

pub mod config;
pub mod generation;
pub mod imaging;
pub mod output;
pub mod templates;

#[cfg(test)]
pub(crate) mod test_helpers;
