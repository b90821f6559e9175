//! nuscenes-osm: export nuScenes maps and scenes as OSM XML and GPX.
//!
//! Map expansion layers (drivable areas, lanes, walkways, dividers, traffic
//! lights, ...) become OSM nodes, ways and multipolygon relations. Scenes
//! become one track per entity (the ego vehicle and every annotated
//! instance), written either as GPX tracks or as OSM nodes linked by ways.
//! Local map coordinates are placed on the globe through a per-location UTM
//! origin.
//!
//! # Modules
//!
//! - [`dataset`]: JSON-backed map and scene tables
//! - [`geo`]: Map origins and the UTM inverse projection
//! - [`export`]: Id allocation, geometry and track encoders, document writers
//! - [`error`]: Error types for export operations

pub mod dataset;
pub mod error;
pub mod export;
pub mod geo;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

pub use error::ExportError;

use export::{
    ExportReport, MapExportOptions, SceneExportOptions, SceneFormat, TerminalSample,
    DEFAULT_EGO_CHANNEL,
};
use geo::OriginTable;

/// The nuscenes-osm CLI application.
#[derive(Parser)]
#[command(name = "nuscenes-osm")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug details to stderr (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Export map expansion layers to one OSM file per map.
    Map(MapArgs),
    /// Export scenes to one GPX or OSM file per scene.
    Scenes(ScenesArgs),
}

/// Arguments for the map subcommand.
#[derive(clap::Args)]
struct MapArgs {
    /// Dataset root directory [default: ~/data/nuscenes].
    #[arg(env = "NUSCENES_DATAROOT")]
    dataroot: Option<PathBuf>,

    /// Map to export (repeatable). Defaults to every known location.
    #[arg(long = "map", value_name = "NAME")]
    maps: Vec<String>,

    /// Directory the .osm files are written to.
    #[arg(long, short, default_value = ".")]
    output_dir: PathBuf,

    /// YAML file adding or overriding map origins.
    #[arg(long, value_name = "FILE")]
    origins: Option<PathBuf>,
}

/// Arguments for the scenes subcommand.
#[derive(clap::Args)]
struct ScenesArgs {
    /// Dataset root directory [default: ~/data/nuscenes].
    #[arg(env = "NUSCENES_DATAROOT")]
    dataroot: Option<PathBuf>,

    /// Dataset version (subdirectory of the dataset root).
    #[arg(default_value = "v1.0-mini")]
    version: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = FormatArg::Gpx)]
    format: FormatArg,

    /// Scene index to export (repeatable). Defaults to every scene.
    #[arg(long = "scene", value_name = "INDEX")]
    scenes: Vec<usize>,

    /// Directory the output files are written to.
    #[arg(long, short, default_value = ".")]
    output_dir: PathBuf,

    /// YAML file adding or overriding map origins.
    #[arg(long, value_name = "FILE")]
    origins: Option<PathBuf>,

    /// Also emit points for the last sample of each scene.
    #[arg(long)]
    include_terminal_sample: bool,

    /// Sensor channel whose key frames provide the ego pose.
    #[arg(long, default_value = DEFAULT_EGO_CHANNEL)]
    ego_channel: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Gpx,
    Osm,
}

impl From<FormatArg> for SceneFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Gpx => SceneFormat::Gpx,
            FormatArg::Osm => SceneFormat::Osm,
        }
    }
}

/// Run the nuscenes-osm CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ExportError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let report = match cli.command {
        Some(Commands::Map(args)) => run_map(args)?,
        Some(Commands::Scenes(args)) => run_scenes(args)?,
        None => {
            println!("nuscenes-osm {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Export nuScenes maps and scenes as OSM XML and GPX.");
            println!();
            println!("Run 'nuscenes-osm --help' for usage information.");
            return Ok(());
        }
    };

    print!("{report}");
    if report.is_success() {
        Ok(())
    } else {
        Err(ExportError::UnitsFailed {
            failed: report.failure_count(),
            total: report.total(),
        })
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_map(args: MapArgs) -> Result<ExportReport, ExportError> {
    let options = MapExportOptions {
        dataroot: args.dataroot.unwrap_or_else(default_dataroot),
        output_dir: args.output_dir,
        maps: args.maps,
        origins: load_origins(args.origins.as_deref())?,
    };
    export::export_maps(&options)
}

fn run_scenes(args: ScenesArgs) -> Result<ExportReport, ExportError> {
    let options = SceneExportOptions {
        dataroot: args.dataroot.unwrap_or_else(default_dataroot),
        version: args.version,
        output_dir: args.output_dir,
        format: args.format.into(),
        scenes: args.scenes,
        origins: load_origins(args.origins.as_deref())?,
        terminal: if args.include_terminal_sample {
            TerminalSample::Include
        } else {
            TerminalSample::Exclude
        },
        ego_channel: args.ego_channel,
    };
    export::export_scenes(&options)
}

fn load_origins(path: Option<&Path>) -> Result<OriginTable, ExportError> {
    let mut origins = OriginTable::builtin();
    if let Some(path) = path {
        origins.extend_from_file(path)?;
        tracing::debug!(path = %path.display(), "loaded map origins");
    }
    Ok(origins)
}

/// `~/data/nuscenes`, falling back to a relative path without `HOME`.
fn default_dataroot() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join("data")
        .join("nuscenes")
}
