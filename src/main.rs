use clap::{Args, Parser, Subcommand};
use simple_edit::imaging::{
    EditParams, OutputFormat, OutputOptions, Quality, RustBackend, Upload, inspect, render,
};
use simple_edit::{config, output, server};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-edit")]
#[command(about = "Browser-based image editor")]
#[command(long_about = "\
Browser-based image editor

Upload a PNG, JPEG, WEBP or HEIC image, rotate and scale it, adjust
brightness, contrast, sharpness and color, apply blur, edge detection,
grayscale and other filters, read its EXIF metadata and download the result
as PNG, JPEG or WEBP.

  simple-edit serve                 # open http://127.0.0.1:8501/
  simple-edit info photo.heic       # metrics + EXIF table
  simple-edit edit photo.jpg --rotate 90 --grayscale --format webp

Edit order: EXIF orientation → rotate → scale → brightness → contrast →
sharpness → color → blur → edges → invert → grayscale → posterize → solarize

Run 'simple-edit gen-config' to generate a documented simple-edit.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (optional; stock defaults apply when missing)
    #[arg(long, default_value = "simple-edit.toml", global = true)]
    config: PathBuf,

    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the editor page and its API
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Apply edits to an image file and write the result
    Edit(EditArgs),
    /// Print resolution, color mode, size, DPI and EXIF of an image
    Info {
        input: PathBuf,
    },
    /// Print a stock simple-edit.toml with all options documented
    GenConfig,
}

/// Flags mirroring the editor controls.
#[derive(Args)]
struct EditArgs {
    /// Image to edit (png, jpg, jpeg, webp, heic, heif)
    input: PathBuf,

    /// Output file [default: processed_image.<ext> beside the input]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: png, jpeg or webp [default: output.format]
    #[arg(long)]
    format: Option<OutputFormat>,

    /// JPEG quality 1-100 [default: output.quality]
    #[arg(long)]
    quality: Option<u8>,

    /// Counter-clockwise rotation in degrees (0-359)
    #[arg(long, default_value_t = 0)]
    rotate: u32,

    /// Scale in percent (1-1000)
    #[arg(long, default_value_t = 100)]
    scale: u32,

    /// Brightness factor (0.0-2.0, 1.0 = unchanged)
    #[arg(long, default_value_t = 1.0)]
    brightness: f32,

    /// Contrast factor (0.0-2.0)
    #[arg(long, default_value_t = 1.0)]
    contrast: f32,

    /// Sharpness factor (0.0-2.0)
    #[arg(long, default_value_t = 1.0)]
    sharpness: f32,

    /// Color / saturation factor (0.0-2.0)
    #[arg(long, default_value_t = 1.0)]
    color: f32,

    /// Gaussian blur radius (0-10); the flag alone uses the default radius
    #[arg(long, num_args = 0..=1, default_missing_value = "2.0")]
    blur: Option<f32>,

    /// Laplacian edge detection
    #[arg(long)]
    edges: bool,

    /// Invert colors
    #[arg(long)]
    invert: bool,

    /// Convert to grayscale
    #[arg(long)]
    grayscale: bool,

    /// Posterize to N bits per channel (1-8)
    #[arg(long, num_args = 0..=1, default_missing_value = "4")]
    posterize: Option<u8>,

    /// Solarize samples at or above the threshold (0-255)
    #[arg(long, num_args = 0..=1, default_missing_value = "128")]
    solarize: Option<u8>,

    /// Ignore the EXIF orientation tag
    #[arg(long)]
    no_exif_transpose: bool,
}

impl EditArgs {
    fn params(&self) -> EditParams {
        EditParams {
            rotation: self.rotate,
            scale_percent: self.scale,
            brightness: self.brightness,
            contrast: self.contrast,
            sharpness: self.sharpness,
            color: self.color,
            blur_radius: self.blur,
            find_edges: self.edges,
            invert: self.invert,
            grayscale: self.grayscale,
            posterize_bits: self.posterize,
            solarize_threshold: self.solarize,
            exif_transpose: !self.no_exif_transpose,
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("simple_edit={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn read_upload(path: &Path) -> std::io::Result<Upload> {
    let data = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Upload { file_name, data })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Serve { bind } => {
            let mut editor_config = config::load_config(&cli.config)?;
            if let Some(bind) = bind {
                editor_config.server.bind = bind;
                editor_config.validate()?;
            }
            tokio::runtime::Runtime::new()?.block_on(server::serve(editor_config))?;
        }
        Command::Edit(args) => {
            let editor_config = config::load_config(&cli.config)?;
            let defaults = editor_config.output.options();
            let options = OutputOptions {
                format: args.format.unwrap_or(defaults.format),
                quality: args.quality.map_or(defaults.quality, Quality::new),
            };
            let params = args.params();
            let upload = read_upload(&args.input)?;
            let rendered = render(
                &RustBackend::new(),
                &upload,
                &params,
                options,
                editor_config.limits.max_pixels,
            )?;

            let destination = args
                .output
                .clone()
                .unwrap_or_else(|| args.input.with_file_name(rendered.download_name()));
            std::fs::write(&destination, &rendered.bytes)?;
            output::print_edit_output(&args.input, &destination, &params, &rendered);
        }
        Command::Info { input } => {
            let editor_config = config::load_config(&cli.config)?;
            let upload = read_upload(&input)?;
            let inspection = inspect(
                &RustBackend::new(),
                &upload,
                editor_config.limits.max_pixels,
            )?;
            output::print_info_output(&input, &inspection);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
