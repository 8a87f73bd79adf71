use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, error, trace, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use waymark::abstractions::{ConsoleMap, ConsolePresentation, FixedPosition};
use waymark::config::AppConfig;
use waymark::session::{SessionController, SessionState};
use waymark::storage::{FileKeyValueStore, WorkoutStore};
use waymark::workout::{Coordinates, WorkoutForm, WorkoutId, WorkoutKind};

type Controller =
    SessionController<ConsoleMap, ConsolePresentation, FileKeyValueStore, FixedPosition>;

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Log runs and rides where they happened
#[derive(Parser)]
#[command(name = "waymark")]
#[command(about = "Waymark - a location-tagged workout log", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the workout log
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Current position as LAT,LNG (overrides home_position)
    #[arg(long, global = true, allow_hyphen_values = true)]
    position: Option<Coordinates>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a workout at a point on the map
    Log {
        /// Where the workout happened, as LAT,LNG
        #[arg(long, allow_hyphen_values = true)]
        at: Coordinates,

        /// Workout type: run or ride
        #[arg(long, default_value = "run")]
        kind: WorkoutKind,

        /// Distance in kilometres
        #[arg(long)]
        distance: f64,

        /// Duration in minutes
        #[arg(long)]
        duration: f64,

        /// Steps per minute (runs)
        #[arg(long)]
        cadence: Option<f64>,

        /// Elevation gain in metres (rides)
        #[arg(long)]
        elevation: Option<f64>,
    },
    /// Show every logged workout
    List,
    /// Center the map on a logged workout
    Focus {
        /// Workout id as shown by `list`
        id: String,
    },
    /// Delete every logged workout and start over
    Reset,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn log_level(verbose: u8, configured: Option<&str>) -> &str {
    match verbose {
        0 => configured.unwrap_or("info"),
        1 => "debug",
        _ => "trace",
    }
}

/// Install the subscriber; the returned handle swaps in the configured level later
fn init_logging(verbose: u8) -> FilterHandle {
    let (filter, handle) = reload::Layer::new(EnvFilter::new(log_level(verbose, None)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose >= 2)
                .with_line_number(verbose >= 2),
        )
        .init();

    handle
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let filter = init_logging(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(position) = cli.position {
        config.home_position = Some(position);
    }

    if cli.verbose == 0 {
        if let Some(level) = config.log_level.as_deref() {
            if let Err(e) = filter.reload(EnvFilter::new(level)) {
                warn!("Cannot apply log level {:?}: {}", level, e);
            }
        }
    }
    debug!("Waymark started with verbosity level: {}", cli.verbose);
    trace!("Effective configuration: {:?}", config);

    let mut controller = build_controller(&config);

    match cli.command {
        Commands::Log {
            at,
            kind,
            distance,
            duration,
            cadence,
            elevation,
        } => {
            let form = WorkoutForm {
                kind,
                distance_km: distance,
                duration_min: duration,
                cadence_spm: cadence,
                elevation_gain_m: elevation,
            };
            run_log(&mut controller, at, form).await
        }
        Commands::List => run_list(&mut controller).await,
        Commands::Focus { id } => run_focus(&mut controller, WorkoutId::from_string(id)).await,
        Commands::Reset => run_reset(&mut controller).await,
    }
}

fn build_controller(config: &AppConfig) -> Controller {
    let store = WorkoutStore::with_key(
        FileKeyValueStore::new(&config.data_dir),
        config.storage_key.clone(),
    );

    SessionController::new(
        ConsoleMap::new(),
        ConsolePresentation::new(),
        store,
        FixedPosition::new(config.home_position),
        config.map_zoom_level,
    )
}

async fn start(controller: &mut Controller) -> anyhow::Result<()> {
    if let SessionState::PositionUnavailable { reason } = controller.start().await {
        bail!(
            "No map without a position ({reason}); pass --position LAT,LNG or set home_position"
        );
    }
    Ok(())
}

async fn run_log(
    controller: &mut Controller,
    at: Coordinates,
    form: WorkoutForm,
) -> anyhow::Result<()> {
    start(controller).await?;

    controller.select_point(at).await;
    controller.select_variant(form.kind).await;
    let id = controller.submit(form).await?;

    println!("✅ Logged workout {id}");
    Ok(())
}

async fn run_list(controller: &mut Controller) -> anyhow::Result<()> {
    start(controller).await?;

    if controller.workouts().is_empty() {
        println!("No workouts logged yet");
    }
    Ok(())
}

async fn run_focus(controller: &mut Controller, id: WorkoutId) -> anyhow::Result<()> {
    start(controller).await?;
    controller.select_entry(&id).await?;
    Ok(())
}

async fn run_reset(controller: &mut Controller) -> anyhow::Result<()> {
    let state = controller
        .reset()
        .await
        .context("Workout log was not cleared")?;
    debug!("Session restarted in state {}", state.name());

    println!("✅ Workout log cleared");
    Ok(())
}
