//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity leads with its identity (positional index + name), with
//! details on indented context lines underneath:
//!
//! ## Template list
//!
//! ```text
//! 001 product_photography [realistic]
//!     Professional product photography template
//!     Tags: product, commercial, photography
//! 002 landscape_art [artistic]
//!     Beautiful landscape artwork template
//!     Tags: landscape, nature, art
//! ```
//!
//! ## Enhancement
//!
//! ```text
//! photo.jpg → photo_enhanced.png (800x600)
//!     upscale x2
//!     denoise 0.3
//!     sharpen 0.5
//! ```
//!
//! ## Batch
//!
//! ```text
//! Enhanced 2 images, 1 failed
//!     out/a.png
//!     out/b.png
//!     Failed: in/broken.jpg (Failed to decode in/broken.jpg: ...)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{BatchReport, EnhancementRequest, ImageInfo, Raster};
use crate::templates::Template;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Templates
// ============================================================================

pub fn format_template_list(templates: &[&Template]) -> Vec<String> {
    if templates.is_empty() {
        return vec!["No templates found".to_string()];
    }
    let mut lines = Vec::new();
    for (i, template) in templates.iter().enumerate() {
        lines.push(format!(
            "{} {} [{}]",
            format_index(i + 1),
            template.name,
            template.style
        ));
        if !template.description.is_empty() {
            lines.push(format!(
                "{}{}",
                indent(1),
                truncate_desc(&template.description, 60)
            ));
        }
        if !template.tags.is_empty() {
            lines.push(format!("{}Tags: {}", indent(1), template.tags.join(", ")));
        }
    }
    lines
}

pub fn print_template_list(templates: &[&Template]) {
    for line in format_template_list(templates) {
        println!("{}", line);
    }
}

/// Full view of one template, including the variables its prompt needs.
pub fn format_template_detail(template: &Template) -> Vec<String> {
    let mut lines = vec![
        template.name.clone(),
        format!("{}{}", indent(1), template.description),
        format!("{}Style: {}", indent(1), template.style),
    ];
    if !template.tags.is_empty() {
        lines.push(format!("{}Tags: {}", indent(1), template.tags.join(", ")));
    }
    lines.push(format!("{}Prompt: {}", indent(1), template.prompt));
    if !template.negative_prompt.is_empty() {
        lines.push(format!("{}Negative: {}", indent(1), template.negative_prompt));
    }
    let variables = template.placeholders();
    if !variables.is_empty() {
        lines.push(format!("{}Variables: {}", indent(1), variables.join(", ")));
    }
    if !template.parameters.is_empty() {
        lines.push(format!("{}Parameters:", indent(1)));
        for (key, value) in &template.parameters {
            lines.push(format!("{}{} = {}", indent(2), key, value));
        }
    }
    lines
}

pub fn print_template_detail(template: &Template) {
    for line in format_template_detail(template) {
        println!("{}", line);
    }
}

// ============================================================================
// Enhancement
// ============================================================================

/// One enhancement run: source, destination, final size, then the steps.
pub fn format_enhance_output(
    input: &Path,
    request: &EnhancementRequest,
    result: &Raster,
) -> Vec<String> {
    let destination = request
        .output
        .as_deref()
        .map(file_name)
        .unwrap_or_else(|| "(not saved)".to_string());
    let mut lines = vec![format!(
        "{} → {} ({}x{})",
        file_name(input),
        destination,
        result.width(),
        result.height()
    )];
    if request.steps.is_empty() {
        lines.push(format!("{}no changes", indent(1)));
    }
    for step in &request.steps {
        lines.push(format!("{}{}", indent(1), step));
    }
    lines
}

pub fn print_enhance_output(input: &Path, request: &EnhancementRequest, result: &Raster) {
    for line in format_enhance_output(input, request, result) {
        println!("{}", line);
    }
}

pub fn format_batch_report(report: &BatchReport) -> Vec<String> {
    let noun = if report.processed.len() == 1 {
        "image"
    } else {
        "images"
    };
    let mut header = format!("Enhanced {} {}", report.processed.len(), noun);
    if !report.failed.is_empty() {
        header.push_str(&format!(", {} failed", report.failed.len()));
    }

    let mut lines = vec![header];
    for path in &report.processed {
        lines.push(format!("{}{}", indent(1), path.display()));
    }
    for (path, error) in &report.failed {
        lines.push(format!("{}Failed: {} ({})", indent(1), path.display(), error));
    }
    lines
}

pub fn print_batch_report(report: &BatchReport) {
    for line in format_batch_report(report) {
        println!("{}", line);
    }
}

pub fn format_image_info(path: &Path, info: &ImageInfo) -> Vec<String> {
    let mut lines = vec![
        file_name(path),
        format!("{}Size: {}x{}", indent(1), info.width, info.height),
        format!("{}Aspect: {:.3}", indent(1), info.aspect_ratio),
    ];
    if let Some(format) = &info.format {
        lines.push(format!("{}Format: {}", indent(1), format));
    }
    if let Some(bytes) = info.file_size {
        lines.push(format!("{}File size: {} bytes", indent(1), bytes));
    }
    lines
}

pub fn print_image_info(path: &Path, info: &ImageInfo) {
    for line in format_image_info(path, info) {
        println!("{}", line);
    }
}
