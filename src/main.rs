//! CLI entry point for the Bluebikes station traffic map.
//!
//! Loads the station list and trip log, aggregates per-station traffic for a
//! time-of-day window, and writes a render-ready scene for the map.

use anyhow::Result;
use bluebikes_traffic::{
    config::{DEFAULT_STATIONS_URL, DEFAULT_TRIPS_URL, MapConfig},
    fetch::BasicClient,
    output::{write_scene, write_station_table},
    pipeline::TrafficMap,
    time_display::window_label,
    traffic::{ANY_TIME, DEFAULT_TOLERANCE, TimeWindow, rank_by_traffic},
};
use clap::{Args, Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bluebikes_traffic")]
#[command(about = "Bluebikes station traffic for a bike-lane map", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Sources {
    /// Station list JSON (file path or URL)
    #[arg(long, env = "BLUEBIKES_STATIONS", default_value = DEFAULT_STATIONS_URL)]
    stations: String,

    /// Trip log CSV (file path or URL)
    #[arg(long, env = "BLUEBIKES_TRIPS", default_value = DEFAULT_TRIPS_URL)]
    trips: String,

    /// Optional map config JSON overriding view, lanes and marker style
    #[arg(long)]
    config: Option<String>,

    /// Half-width of the time window in minutes
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: u16,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate once and write the scene
    Render {
        #[command(flatten)]
        sources: Sources,

        /// Minute of day to filter around, -1 for any time
        #[arg(long, default_value_t = ANY_TIME, allow_hyphen_values = true)]
        time: i32,

        /// Scene JSON output path, "-" for stdout
        #[arg(short, long, default_value = "scene.json")]
        output: String,

        /// Optional per-station CSV table
        #[arg(long)]
        table: Option<String>,
    },
    /// Read slider values from stdin, rewriting the scene for each
    Slider {
        #[command(flatten)]
        sources: Sources,

        /// Scene JSON output path, "-" for stdout
        #[arg(short, long, default_value = "scene.json")]
        output: String,
    },
    /// Log the busiest stations
    Top {
        #[command(flatten)]
        sources: Sources,

        /// Number of stations to show
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Minute of day to filter around, -1 for any time
        #[arg(long, default_value_t = ANY_TIME, allow_hyphen_values = true)]
        time: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/bluebikes_traffic.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("bluebikes_traffic.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", LevelFilter::INFO));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        let message = format!("{e:#}");
        error!(error = %message, "Error loading data");
        return Err(e);
    }
    Ok(())
}

fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(var)
        .from_env_lossy()
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Render {
            sources,
            time,
            output,
            table,
        } => {
            let window = TimeWindow::from_slider(time, sources.tolerance)?;
            let map = load_map(&sources).await?;

            let snapshot = map.snapshot(window);
            if let Some(table) = table {
                write_station_table(&table, &snapshot.stations, &snapshot.scale)?;
            }
            write_scene(&output, &map.scene(&snapshot))?;
        }
        Commands::Slider { sources, output } => {
            let map = load_map(&sources).await?;
            slider_loop(&map, sources.tolerance, &output).await?;
        }
        Commands::Top {
            sources,
            count,
            time,
        } => {
            let window = TimeWindow::from_slider(time, sources.tolerance)?;
            let map = load_map(&sources).await?;
            let snapshot = map.snapshot(window);

            info!(time = %window_label(&window), trips = map.trip_count(), "Busiest stations");
            for (rank, s) in rank_by_traffic(&snapshot.stations)
                .into_iter()
                .take(count)
                .enumerate()
            {
                info!(
                    rank = rank + 1,
                    station_id = %s.id,
                    name = s.name.as_deref().unwrap_or(""),
                    total = s.traffic.total(),
                    departures = s.traffic.departures(),
                    arrivals = s.traffic.arrivals(),
                    radius = snapshot.scale.radius(s.traffic.total()),
                    "Station"
                );
            }
        }
    }
    Ok(())
}

async fn load_map(sources: &Sources) -> Result<TrafficMap> {
    let config = MapConfig::load_or_default(sources.config.as_deref())?;
    let client = BasicClient::new()?;
    TrafficMap::load(&client, &sources.stations, &sources.trips, config).await
}

/// Re-renders on every slider value read from stdin until EOF. Lines that are
/// not a valid slider position are logged and skipped.
#[tracing::instrument(skip(map))]
async fn slider_loop(map: &TrafficMap, tolerance: u16, output: &str) -> Result<()> {
    write_scene(output, &map.render(TimeWindow::Any))?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let window = match line.parse::<i32>() {
            Ok(value) => match TimeWindow::from_slider(value, tolerance) {
                Ok(window) => window,
                Err(e) => {
                    warn!(error = %e, "Ignoring slider value");
                    continue;
                }
            },
            Err(e) => {
                warn!(input = line, error = %e, "Ignoring non-numeric slider input");
                continue;
            }
        };

        info!(time = %window_label(&window), "Slider moved");
        write_scene(output, &map.render(window))?;
    }

    info!("Slider input closed");
    Ok(())
}
