use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use asciify_core::{
    AsciiRenderer, BlockMode, Charset, Conversion, ConvertOptions, DitherAlgorithm, EdgeStyle,
    GlyphGrid, GradientStyle, StrategyKind,
};
use clap::{Parser, Subcommand};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, Frame};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn, LevelFilter};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert images or animations to ASCII glyph grids")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render ASCII art to stdout for a quick preview
    Preview(PreviewArgs),
    /// Convert an image to ASCII and write the result to disk
    Convert(ConvertArgs),
    /// Convert an animation (GIF or directory of frames) to ASCII frame files
    Animate(AnimateArgs),
    /// List strategies, charsets, modes and dithering algorithms
    List,
    /// Show the options a strategy reads with their defaults and ranges
    Options {
        /// Strategy id or alias
        strategy: String,
    },
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input image path
    input: PathBuf,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image path
    input: PathBuf,
    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// Input animation path (GIF file or directory of images)
    input: PathBuf,
    /// Output directory for frame files
    #[arg(short, long)]
    out_dir: PathBuf,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug, Clone)]
struct RenderSettings {
    /// Conversion strategy (brightness, edge_detection, sobel_gradient, block_chars, dithering)
    #[arg(short, long)]
    strategy: Option<String>,
    /// TOML file with default options and an optional `strategy` key
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output width in glyphs (1..=1000)
    #[arg(long)]
    width: Option<i64>,
    /// Glyph ramp: detailed, extended or simple
    #[arg(long)]
    charset: Option<String>,
    /// Invert intensity (edge strategy: edges drawn as `#` on blank)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    invert: Option<bool>,
    /// Contrast multiplier about mid gray
    #[arg(long)]
    contrast: Option<f64>,
    /// Brightness multiplier
    #[arg(long)]
    brightness: Option<f64>,
    /// Canny low threshold
    #[arg(long)]
    low_threshold: Option<f64>,
    /// Canny high threshold
    #[arg(long)]
    high_threshold: Option<f64>,
    /// Gaussian blur kernel size before edge detection
    #[arg(long)]
    blur_kernel: Option<i64>,
    /// Normalized gradient magnitude below which no direction is drawn
    #[arg(long)]
    magnitude_threshold: Option<f64>,
    /// Shade weak gradients instead of leaving them blank
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    show_magnitude: Option<bool>,
    /// Strategy mode (edge: outline/intensity, gradient: direction/combined,
    /// block: block/halfblock/braille/braille-dither)
    #[arg(long)]
    mode: Option<String>,
    /// Braille threshold (0..=255)
    #[arg(long)]
    threshold: Option<i64>,
    /// Dithering algorithm
    #[arg(long)]
    algorithm: Option<String>,
    /// Dithering gray levels (2..=256)
    #[arg(long)]
    levels: Option<i64>,
    /// Edge share of the combined gradient blend (0..=1)
    #[arg(long)]
    edge_weight: Option<f64>,
    /// Extra `key=value` option, may be repeated
    #[arg(long = "set", value_name = "KEY=VALUE")]
    extra: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Preview(args) => preview(args),
        Commands::Convert(args) => convert(args),
        Commands::Animate(args) => animate(args),
        Commands::List => {
            list();
            Ok(())
        },
        Commands::Options { strategy } => options(&strategy),
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose > 0 {
        let level = match verbose {
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        builder.filter_level(level);
    }
    builder.init();
}

fn preview(args: PreviewArgs) -> Result<()> {
    let conversion = args.settings.to_conversion()?;
    let output = AsciiRenderer
        .render_path(&args.input, &conversion)
        .with_context(|| format!("failed to render {:?}", args.input))?;

    for row in output.grid.rows() {
        println!("{}", row);
    }

    Ok(())
}

fn convert(args: ConvertArgs) -> Result<()> {
    let conversion = args.settings.to_conversion()?;
    let output = AsciiRenderer
        .render_path(&args.input, &conversion)
        .with_context(|| format!("failed to render {:?}", args.input))?;

    write_grid(&args.output, &output.grid)?;
    info!(
        "wrote {}x{} glyphs ({}) to {:?}",
        output.grid.width,
        output.grid.height,
        output.strategy,
        args.output
    );
    Ok(())
}

fn animate(args: AnimateArgs) -> Result<()> {
    let conversion = args.settings.to_conversion()?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {:?}", args.out_dir))?;

    let frames = load_frames(&args.input)?;
    let progress = ProgressBar::new(frames.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames",
        )?
        .progress_chars("=> "),
    );

    for (index, frame) in frames.into_iter().enumerate() {
        let dynamic = DynamicImage::ImageRgba8(frame.into_buffer());
        let output = AsciiRenderer
            .render_dynamic(dynamic, &conversion)
            .with_context(|| format!("failed to render frame {}", index))?;

        let frame_path = args.out_dir.join(format!("frame_{:04}.txt", index));
        write_grid(&frame_path, &output.grid)?;
        progress.inc(1);
    }

    progress.finish_with_message(format!("Frames written to {:?}", args.out_dir));
    Ok(())
}

fn list() {
    println!("Strategies:");
    for kind in StrategyKind::ALL {
        println!("  {:<16} {}", kind.id(), kind.name());
        println!("  {:<16} {}", "", kind.description());
    }

    let charsets: Vec<_> = Charset::ALL.iter().map(|c| c.name()).collect();
    println!("\nCharsets: {}", charsets.join(", "));

    let edge = [EdgeStyle::Outline, EdgeStyle::Intensity].map(EdgeStyle::name);
    let gradient = [GradientStyle::Direction, GradientStyle::Combined].map(GradientStyle::name);
    let block: Vec<_> = BlockMode::ALL.iter().map(|m| m.name()).collect();
    println!("Edge modes: {}", edge.join(", "));
    println!("Gradient modes: {}", gradient.join(", "));
    println!("Block modes: {}", block.join(", "));

    let algorithms: Vec<_> = DitherAlgorithm::ALL.iter().map(|a| a.name()).collect();
    println!("Dithering algorithms: {}", algorithms.join(", "));
}

fn options(strategy: &str) -> Result<()> {
    let kind: StrategyKind = strategy.parse()?;
    println!("{} ({})", kind.name(), kind.id());
    println!("  {:<20} {:<16} {}", "option", "default", "accepted");
    for spec in kind.options() {
        println!("  {:<20} {:<16} {}", spec.name, spec.default, spec.range);
    }
    Ok(())
}

fn write_grid(path: &Path, grid: &GlyphGrid) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    for row in grid.rows() {
        writeln!(file, "{}", row)?;
    }
    Ok(())
}

fn load_frames(path: &Path) -> Result<Vec<Frame>> {
    if path.is_dir() {
        load_frames_from_directory(path)
    } else {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension == "gif" {
            load_frames_from_gif(path)
        } else {
            let image =
                image::open(path).with_context(|| format!("failed to open image {:?}", path))?;
            Ok(vec![Frame::new(image.into_rgba8())])
        }
    }
}

fn load_frames_from_gif(path: &Path) -> Result<Vec<Frame>> {
    let file = File::open(path).with_context(|| format!("failed to open GIF {:?}", path))?;
    let decoder =
        GifDecoder::new(file).with_context(|| format!("failed to decode GIF {:?}", path))?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .with_context(|| format!("failed to collect frames from {:?}", path))?;
    debug!("decoded {} frames from {:?}", frames.len(), path);
    Ok(frames)
}

fn load_frames_from_directory(path: &Path) -> Result<Vec<Frame>> {
    let mut entries: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .collect();
    entries.sort();
    if entries.is_empty() {
        bail!("no image files found in {:?}", path);
    }

    let mut frames = Vec::with_capacity(entries.len());
    for entry in entries {
        let image = match image::open(&entry) {
            Ok(image) => image,
            Err(err) => {
                warn!("skipping {:?}: {}", entry, err);
                continue;
            },
        };
        frames.push(Frame::new(image.into_rgba8()));
    }
    if frames.is_empty() {
        bail!("no decodable images in {:?}", path);
    }
    Ok(frames)
}

/// Reads a TOML config whose keys are option names plus an optional `strategy`.
fn load_config(path: &Path) -> Result<(Option<String>, ConvertOptions)> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read config {:?}", path))?;
    let mut table: toml::Table =
        text.parse().with_context(|| format!("failed to parse config {:?}", path))?;

    let strategy = match table.remove("strategy") {
        Some(toml::Value::String(name)) => Some(name),
        Some(other) => bail!("`strategy` in {:?} must be a string, got {}", path, other),
        None => None,
    };
    let options: ConvertOptions = toml::Value::Table(table)
        .try_into()
        .with_context(|| format!("invalid options in config {:?}", path))?;

    Ok((strategy, options))
}

impl RenderSettings {
    fn command_line_options(&self) -> Result<ConvertOptions> {
        let mut options = ConvertOptions {
            width: self.width,
            invert: self.invert,
            contrast: self.contrast,
            brightness: self.brightness,
            low_threshold: self.low_threshold,
            high_threshold: self.high_threshold,
            blur_kernel: self.blur_kernel,
            magnitude_threshold: self.magnitude_threshold,
            show_magnitude: self.show_magnitude,
            mode: self.mode.clone(),
            threshold: self.threshold,
            algorithm: self.algorithm.clone(),
            levels: self.levels,
            charset: self.charset.clone(),
            edge_weight: self.edge_weight,
        };

        for pair in &self.extra {
            let Some((key, value)) = pair.split_once('=') else {
                bail!("expected KEY=VALUE, got `{}`", pair);
            };
            options.set(key, value)?;
        }

        Ok(options)
    }

    fn to_conversion(&self) -> Result<Conversion> {
        let (config_strategy, config_options) = match &self.config {
            Some(path) => load_config(path)?,
            None => (None, ConvertOptions::default()),
        };

        let options = config_options.merge(self.command_line_options()?);
        let strategy = self
            .strategy
            .as_deref()
            .or(config_strategy.as_deref())
            .unwrap_or(StrategyKind::Brightness.id());
        let kind: StrategyKind = strategy.parse()?;

        debug!("options for {}: {:?}", kind, options);
        Ok(Conversion::from_options(kind, &options)?)
    }
}
