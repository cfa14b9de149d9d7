//! Load once, then aggregate and scale on demand.
//!
//! The two sources download concurrently; aggregation waits for both. Each
//! [`TrafficMap::render`] call is independent of the previous one.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::MapConfig;
use crate::fetch::{HttpClient, load_source};
use crate::model::{Station, Trip};
use crate::output::Scene;
use crate::parser::{TripLog, parse_stations, parse_trips};
use crate::scale::RadiusScale;
use crate::traffic::{TimeWindow, aggregate};

/// Fetches and parses both sources. Fails if either does.
#[tracing::instrument(skip(client))]
pub async fn load_inputs<C: HttpClient>(
    client: &C,
    stations_source: &str,
    trips_source: &str,
) -> Result<(Vec<Station>, TripLog)> {
    let (station_bytes, trip_bytes) = tokio::try_join!(
        load_source(client, stations_source),
        load_source(client, trips_source),
    )?;

    let stations = parse_stations(&station_bytes)
        .with_context(|| format!("failed to parse stations from {stations_source}"))?;
    let trips = parse_trips(&trip_bytes)
        .with_context(|| format!("failed to parse trips from {trips_source}"))?;

    info!(
        stations = stations.len(),
        trips = trips.trips.len(),
        skipped = trips.skipped,
        "Inputs loaded"
    );
    Ok((stations, trips))
}

/// Aggregated stations for one time window, with the scale sized to them.
#[derive(Debug)]
pub struct Snapshot {
    pub window: TimeWindow,
    pub stations: Vec<Station>,
    pub scale: RadiusScale,
}

/// Loaded station list and trip log, ready to re-render for any time window.
pub struct TrafficMap {
    stations: Vec<Station>,
    trips: Vec<Trip>,
    config: MapConfig,
}

impl TrafficMap {
    pub fn new(stations: Vec<Station>, trips: Vec<Trip>, config: MapConfig) -> Self {
        Self {
            stations,
            trips,
            config,
        }
    }

    pub async fn load<C: HttpClient>(
        client: &C,
        stations_source: &str,
        trips_source: &str,
        config: MapConfig,
    ) -> Result<Self> {
        let (stations, log) = load_inputs(client, stations_source, trips_source).await?;
        Ok(Self::new(stations, log.trips, config))
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn snapshot(&self, window: TimeWindow) -> Snapshot {
        let stations = aggregate(&self.stations, &self.trips, window);
        let scale = RadiusScale::with_max_radius(&stations, self.config.max_radius);
        Snapshot {
            window,
            stations,
            scale,
        }
    }

    pub fn scene(&self, snapshot: &Snapshot) -> Scene {
        Scene::build(&snapshot.stations, &snapshot.scale, snapshot.window, &self.config)
    }

    pub fn render(&self, window: TimeWindow) -> Scene {
        self.scene(&self.snapshot(window))
    }
}
