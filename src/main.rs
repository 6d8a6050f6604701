use clap::{Parser, Subcommand};
use imagesmith::config::{self, AppConfig};
use imagesmith::generation::prepare_from_template;
use imagesmith::imaging::compose::compare_side_by_side;
use imagesmith::imaging::{
    EnhanceOptions, Enhancer, ImageInfo, Quality, RasterIo, RasterSource, RustBackend,
};
use imagesmith::output;
use imagesmith::templates::{ParamValue, Parameters, Template, TemplateFilter, TemplateStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod logging;

#[derive(Parser)]
#[command(name = "imagesmith")]
#[command(about = "Template-driven prompts and deterministic image enhancement")]
#[command(long_about = "\
Template-driven prompts and deterministic image enhancement

Templates are named, parameterized prompts. Built-ins are always available;
records saved as <name>.json in the templates directory are loaded on start.

Enhancement steps always run in this order, each one optional:

  upscale → denoise → color → contrast → brightness → sharpen

Run 'imagesmith gen-config' to generate a documented imagesmith.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = "imagesmith.toml", global = true)]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List, search, show, create and delete templates
    Templates {
        #[command(subcommand)]
        action: TemplatesCommand,
    },
    /// Resolve a template into a prompt request and print it as JSON
    Prompt {
        template: String,
        /// Placeholder value, repeatable
        #[arg(long = "var", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,
        /// Generation parameter override, repeatable
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Run the enhancement pipeline on one image
    Enhance {
        input: PathBuf,
        /// Output path [default: <input>_enhanced.<ext>]
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        steps: EnhanceArgs,
    },
    /// Denoise, color, contrast and sharpen with config strengths
    Auto {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Upscale, then apply a light sharpen
    SuperRes {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 2)]
        scale: u32,
    },
    /// Denoise only
    Denoise {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 0.0 to 1.0
        #[arg(long, default_value_t = 0.5)]
        strength: f32,
    },
    /// Brightness and contrast only
    Lighting {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// -1.0 to 1.0
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        brightness: f32,
        /// 1.0 keeps the image
        #[arg(long, default_value_t = 1.0)]
        contrast: f32,
    },
    /// Enhance every image in a directory
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
        #[command(flatten)]
        steps: EnhanceArgs,
    },
    /// Place two images side by side
    Compare {
        left: PathBuf,
        right: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Show image dimensions, format and file size
    Info { path: PathBuf },
    /// Print a stock imagesmith.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum TemplatesCommand {
    /// List templates, optionally filtered by tag and style
    List {
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        style: Option<String>,
    },
    /// Case-insensitive search in name, description and tags
    Search { query: String },
    /// Show one template in full
    Show { name: String },
    /// Create a template and save it to the templates directory
    Create {
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        prompt: String,
        #[arg(long, default_value = "")]
        negative: String,
        #[arg(long)]
        style: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },
    /// Delete a template and its saved record
    Delete { name: String },
}

/// Step switches shared by `enhance` and `batch`. Unset values come from config.
#[derive(clap::Args, Clone)]
struct EnhanceArgs {
    /// Upscale factor (2, 4, ...)
    #[arg(short, long)]
    upscale: Option<u32>,
    #[arg(long)]
    no_denoise: bool,
    /// 0.0 to 1.0
    #[arg(long)]
    denoise_strength: Option<f32>,
    #[arg(long)]
    no_sharpen: bool,
    /// 0.0 to 1.0
    #[arg(long)]
    sharpen_amount: Option<f32>,
    #[arg(long)]
    no_color: bool,
    #[arg(long)]
    no_contrast: bool,
    /// -1.0 to 1.0
    #[arg(long, allow_hyphen_values = true)]
    brightness: Option<f32>,
}

impl EnhanceArgs {
    fn options(&self) -> EnhanceOptions {
        EnhanceOptions {
            upscale_factor: self.upscale,
            denoise: !self.no_denoise,
            denoise_strength: self.denoise_strength,
            sharpen: !self.no_sharpen,
            sharpen_amount: self.sharpen_amount,
            color_enhance: self.no_color.then_some(false),
            contrast_enhance: !self.no_contrast,
            brightness_adjust: self.brightness,
        }
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn to_parameters(pairs: &[(String, String)]) -> Parameters {
    pairs
        .iter()
        .map(|(k, v)| (k.clone(), ParamValue::parse(v)))
        .collect()
}

/// `photo.jpg` → `photo_enhanced.jpg`, next to the input.
fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_enhanced.{}", ext.to_string_lossy()),
        None => format!("{stem}_enhanced"),
    };
    input.with_file_name(name)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet)?;

    let config = config::load_config(&cli.config)?;

    match cli.command {
        Command::Templates { action } => run_templates(action, &config)?,
        Command::Prompt {
            template,
            vars,
            params,
        } => {
            let store = TemplateStore::from_config(&config.templates);
            let variables: HashMap<String, String> = vars.into_iter().collect();
            let request =
                prepare_from_template(&store, &template, &variables, &to_parameters(&params))?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Enhance {
            input,
            output,
            steps,
        } => {
            let enhancer = Enhancer::new(&config);
            let output = output.unwrap_or_else(|| default_output(&input));
            let request = enhancer.plan(&steps.options(), Some(&output));
            let result = enhancer.run(RasterSource::from(input.as_path()), &request)?;
            output::print_enhance_output(&input, &request, &result);
        }
        Command::Auto { input, output } => {
            let output = output.unwrap_or_else(|| default_output(&input));
            let result = Enhancer::new(&config).auto_enhance(input.as_path(), Some(&output))?;
            print_saved(&input, &output, result.dimensions());
        }
        Command::SuperRes {
            input,
            output,
            scale,
        } => {
            let output = output.unwrap_or_else(|| default_output(&input));
            let result =
                Enhancer::new(&config).super_resolution(input.as_path(), scale, Some(&output))?;
            print_saved(&input, &output, result.dimensions());
        }
        Command::Denoise {
            input,
            output,
            strength,
        } => {
            let output = output.unwrap_or_else(|| default_output(&input));
            let result =
                Enhancer::new(&config).remove_noise(input.as_path(), strength, Some(&output))?;
            print_saved(&input, &output, result.dimensions());
        }
        Command::Lighting {
            input,
            output,
            brightness,
            contrast,
        } => {
            let output = output.unwrap_or_else(|| default_output(&input));
            let result = Enhancer::new(&config).adjust_lighting(
                input.as_path(),
                brightness,
                contrast,
                Some(&output),
            )?;
            print_saved(&input, &output, result.dimensions());
        }
        Command::Batch {
            input_dir,
            output_dir,
            steps,
        } => {
            let report =
                Enhancer::new(&config).enhance_batch(&input_dir, &output_dir, &steps.options())?;
            output::print_batch_report(&report);
        }
        Command::Compare {
            left,
            right,
            output,
        } => {
            let backend = RustBackend::new();
            let a = RasterSource::from(left.as_path()).resolve(&backend)?;
            let b = RasterSource::from(right.as_path()).resolve(&backend)?;
            let combined = compare_side_by_side(&a, &b)?;
            backend.save(&combined, &output, Quality::new(config.output.quality))?;
            println!("{}", output.display());
        }
        Command::Info { path } => {
            let info = ImageInfo::from_path(&path)?;
            output::print_image_info(&path, &info);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn print_saved(input: &Path, output: &Path, (width, height): (u32, u32)) {
    println!(
        "{} → {} ({}x{})",
        input.display(),
        output.display(),
        width,
        height
    );
}

fn run_templates(
    action: TemplatesCommand,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = TemplateStore::from_config(&config.templates);
    match action {
        TemplatesCommand::List { tag, style } => {
            let filter = TemplateFilter { tag, style };
            output::print_template_list(&store.list(&filter));
        }
        TemplatesCommand::Search { query } => {
            output::print_template_list(&store.search(&query));
        }
        TemplatesCommand::Show { name } => match store.get(&name) {
            Some(template) => output::print_template_detail(template),
            None => return Err(format!("Template '{name}' not found").into()),
        },
        TemplatesCommand::Create {
            name,
            description,
            prompt,
            negative,
            style,
            tags,
            params,
        } => {
            let mut template = Template::new(name, description, prompt)
                .with_negative_prompt(negative)
                .with_tags(tags);
            if let Some(style) = style {
                template = template.with_style(style);
            }
            template.parameters = to_parameters(&params);
            let path = store.save(&template, None)?;
            store.add(template);
            println!("Saved {}", path.display());
        }
        TemplatesCommand::Delete { name } => {
            if store.delete(&name) {
                println!("Deleted '{name}'");
            } else {
                return Err(format!("Template '{name}' not found").into());
            }
        }
    }
    Ok(())
}
