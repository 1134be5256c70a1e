//! marketmap CLI - compute and check market heat map layouts.

#![allow(
    clippy::uninlined_format_args,
    clippy::unwrap_used,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::doc_markdown
)]

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use marketmap_core::{ConfigError, DataError, Dataset, HeatmapConfig};
use marketmap_layout::{Heatmap, Tile};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "marketmap")]
#[command(about = "Squarified treemap layouts for market heat maps")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a dataset and print the tiles
    Layout(LayoutArgs),

    /// Check dataset validity
    Check {
        /// Path to dataset file (.json, .yaml, .yml)
        dataset: PathBuf,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// Path to dataset file (.json, .yaml, .yml)
    dataset: PathBuf,

    /// Container width (overrides config)
    #[arg(long)]
    width: Option<f64>,

    /// Container height (overrides config)
    #[arg(long)]
    height: Option<f64>,

    /// Heat map config file (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Drill into a group; repeat to go deeper
    #[arg(long)]
    focus: Vec<String>,

    /// Also lay out children of groups, down to this many levels
    #[arg(long)]
    nested: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("dataset: {0}")]
    Data(#[from] DataError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("no group '{0}' at the current level")]
    UnknownFocus(String),

    #[error("output: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON shape of the `layout` command.
#[derive(Serialize)]
struct LayoutReport<'a> {
    title: String,
    width: f64,
    height: f64,
    tiles: &'a [Tile],
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> Result<String, CliError> {
    match &cli.command {
        Commands::Layout(args) => layout(args),
        Commands::Check { dataset } => check_dataset(dataset),
    }
}

fn layout(args: &LayoutArgs) -> Result<String, CliError> {
    let dataset = Dataset::load(&args.dataset)?;
    let mut config = match &args.config {
        Some(path) => HeatmapConfig::load(path)?,
        None => HeatmapConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(depth) = args.nested {
        config.max_depth = depth;
    }
    config.validate()?;

    let mut map = Heatmap::new(dataset, config);
    for id in &args.focus {
        if !map.enter(id) {
            return Err(CliError::UnknownFocus(id.clone()));
        }
    }

    let tiles = map.tiles();
    info!(tiles = tiles.len(), title = %map.title(), "layout computed");

    match args.format {
        OutputFormat::Json => {
            let report = LayoutReport {
                title: map.title(),
                width: map.config().width,
                height: map.config().height,
                tiles: &tiles,
            };
            let mut json = serde_json::to_string_pretty(&report)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => Ok(render_text(
            &map.title(),
            map.config().width,
            map.config().height,
            &tiles,
        )),
    }
}

fn render_text(title: &str, width: f64, height: f64, tiles: &[Tile]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({}x{}, {} tiles)",
        title,
        width,
        height,
        tiles.len()
    );
    if tiles.is_empty() {
        out.push_str("  No data available\n");
        return out;
    }
    let _ = writeln!(
        out,
        "{:<20} {:>9} {:>9} {:>9} {:>9} {:>8} {:>7}",
        "id", "x", "y", "w", "h", "change", "share"
    );
    for tile in tiles {
        let id = format!("{}{}", "  ".repeat(tile.depth), tile.id);
        let _ = writeln!(
            out,
            "{:<20} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>8} {:>6.2}%",
            id,
            tile.rect.x,
            tile.rect.y,
            tile.rect.width,
            tile.rect.height,
            marketmap_layout::format_change(tile.change),
            tile.area_share * 100.0
        );
    }
    out
}

fn check_dataset(path: &Path) -> Result<String, CliError> {
    debug!(path = %path.display(), "checking dataset");
    let dataset = Dataset::load(path)?;
    let summary = dataset.summary();

    let mut out = String::new();
    let _ = writeln!(out, "Checking dataset: {}", path.display());
    out.push_str("Dataset valid!\n");
    let _ = writeln!(out, "  Name: {}", dataset.name);
    let view = format!("{:?}", dataset.view).to_lowercase();
    let _ = writeln!(out, "  View: {}", view);
    let _ = writeln!(out, "  Top-level items: {}", summary.top_level);
    let _ = writeln!(out, "  Total items: {}", summary.total_items);
    let _ = writeln!(out, "  Groups: {}", summary.groups);
    let _ = writeln!(out, "  Total value: {}", summary.total_value);
    let _ = writeln!(
        out,
        "  Gainers/Losers: {}/{}",
        summary.gainers, summary.losers
    );
    if summary.zero_weight > 0 {
        let _ = writeln!(out, "  Zero weight (not drawn): {}", summary.zero_weight);
    }
    Ok(out)
}
