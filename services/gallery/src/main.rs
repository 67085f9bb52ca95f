//! Weather map gallery runner.
//!
//! Runs one recipe (or all of them) and writes the maps as PNG files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wx_common::{BoundingBox, TimeSelector};

use gallery::{recipes, GalleryConfig, Recipe, RecipeOptions};

#[derive(Parser, Debug)]
#[command(name = "wx-gallery")]
#[command(about = "Fetch weather data and render gallery maps")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Optional YAML configuration file (environment variables otherwise)
    #[arg(short, long, env = "GALLERY_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output PNG path, or directory when running all recipes
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Valid time: "latest", an ISO 8601 instant, or "start/end"
    #[arg(long, default_value = "latest", global = true)]
    time: String,

    /// Map extent as "min_lon,min_lat,max_lon,max_lat"
    #[arg(long, global = true)]
    bbox: Option<String>,

    /// Image width in pixels
    #[arg(long, global = true)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long, global = true)]
    height: Option<u32>,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Lightning mapper flashes colored by energy
    Lightning,
    /// 500 hPa absolute vorticity advection
    VorticityAdvection,
    /// Potential temperature on the 2 PVU surface
    DynamicTropopause,
    /// Earth-relative 10 m wind barbs
    WindBarbs,
    /// Every recipe in turn
    All,
}

impl Command {
    fn recipes(&self) -> Vec<Recipe> {
        match self {
            Command::Lightning => vec![Recipe::Lightning],
            Command::VorticityAdvection => vec![Recipe::VorticityAdvection],
            Command::DynamicTropopause => vec![Recipe::DynamicTropopause],
            Command::WindBarbs => vec![Recipe::WindBarbs],
            Command::All => Recipe::ALL.to_vec(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &args.config {
        Some(path) => GalleryConfig::from_yaml(path)?,
        None => GalleryConfig::from_env(),
    };
    if let Err(e) = config.validate() {
        bail!("Invalid configuration: {}", e);
    }

    let time = TimeSelector::parse(&args.time)
        .with_context(|| format!("Invalid --time '{}'", args.time))?;
    let extent = args
        .bbox
        .as_deref()
        .map(BoundingBox::parse)
        .transpose()
        .with_context(|| format!("Invalid --bbox '{}'", args.bbox.as_deref().unwrap_or("")))?;

    let selected = args.command.recipes();
    let single = selected.len() == 1;
    let mut failures = 0usize;

    for recipe in selected {
        let mut options = RecipeOptions::new(recipe, &config);
        options.time = time;
        if let Some(extent) = extent {
            options.extent = extent;
        }
        if let Some(width) = args.width {
            options.width = width;
        }
        if let Some(height) = args.height {
            options.height = height;
        }

        let path = output_path(&args.output, &config, recipe, &time, single);
        match run_one(recipe, &config, &options, &path).await {
            Ok(()) => info!(recipe = %recipe, path = %path.display(), "Wrote map"),
            Err(e) if single => return Err(e),
            Err(e) => {
                error!(recipe = %recipe, error = format!("{:#}", e), "Recipe failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} recipe(s) failed", failures);
    }
    Ok(())
}

async fn run_one(
    recipe: Recipe,
    config: &GalleryConfig,
    options: &RecipeOptions,
    path: &Path,
) -> Result<()> {
    let plot = recipes::run(recipe, config, options).await?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    plot.save_png(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// `--output` is the file for a single recipe and the directory otherwise.
fn output_path(
    output: &Option<PathBuf>,
    config: &GalleryConfig,
    recipe: Recipe,
    time: &TimeSelector,
    single: bool,
) -> PathBuf {
    match output {
        Some(path) if single => path.clone(),
        Some(dir) => dir.join(recipe.file_name(time)),
        None => config.output_dir.join(recipe.file_name(time)),
    }
}
