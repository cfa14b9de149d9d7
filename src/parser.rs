//! Parsers for the station list (JSON) and the trip log (CSV).

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::model::{LonLat, Station, StationId, Trip};

/// Trips that parsed cleanly, plus how many rows were dropped as malformed.
#[derive(Debug, Default)]
pub struct TripLog {
    pub trips: Vec<Trip>,
    pub skipped: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StationDocument {
    Envelope { data: StationData },
    Bare(Vec<StationRecord>),
}

#[derive(Deserialize)]
struct StationData {
    stations: Vec<StationRecord>,
}

#[derive(Deserialize)]
struct StationRecord {
    short_name: Option<String>,
    name: Option<String>,
    capacity: Option<u32>,
    lon: Coordinate,
    lat: Coordinate,
}

/// Some station feeds publish coordinates as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn value(&self) -> Result<f64> {
        match self {
            Coordinate::Number(v) => Ok(*v),
            Coordinate::Text(s) => s
                .trim()
                .parse()
                .with_context(|| format!("invalid coordinate '{s}'")),
        }
    }
}

/// Parses a station document, preserving input order.
///
/// Records without a `short_name` are skipped. A repeated `short_name` is an error.
pub fn parse_stations(bytes: &[u8]) -> Result<Vec<Station>> {
    let doc: StationDocument =
        serde_json::from_slice(bytes).context("station document is not valid JSON")?;
    let records = match doc {
        StationDocument::Envelope { data } => data.stations,
        StationDocument::Bare(records) => records,
    };

    let mut seen = HashSet::new();
    let mut stations = Vec::with_capacity(records.len());
    let mut unnamed = 0;

    for rec in records {
        let Some(short_name) = rec.short_name.filter(|s| !s.trim().is_empty()) else {
            unnamed += 1;
            continue;
        };
        let id = StationId::new(short_name.trim());
        if !seen.insert(id.clone()) {
            bail!("Duplicate station {id}");
        }

        let position = LonLat::new(rec.lon.value()?, rec.lat.value()?);
        stations.push(Station {
            name: rec.name,
            capacity: rec.capacity,
            ..Station::new(id, position)
        });
    }

    if unnamed > 0 {
        warn!(unnamed, "Skipped station records without a short_name");
    }
    debug!(count = stations.len(), "Stations parsed");

    Ok(stations)
}

#[derive(Deserialize)]
struct TripRecord {
    start_station_id: Option<String>,
    end_station_id: Option<String>,
    started_at: Option<String>,
    ended_at: Option<String>,
}

impl TripRecord {
    fn into_trip(self) -> Option<Trip> {
        Some(Trip {
            start_station_id: station_id(self.start_station_id)?,
            end_station_id: station_id(self.end_station_id)?,
            started_at: parse_timestamp(self.started_at.as_deref()?)?,
            ended_at: parse_timestamp(self.ended_at.as_deref()?)?,
        })
    }
}

fn station_id(raw: Option<String>) -> Option<StationId> {
    let raw = raw?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(StationId::new(trimmed))
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a trip timestamp as local wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
}

/// Parses the trip CSV. Rows missing a station id or a readable timestamp are
/// counted in [`TripLog::skipped`] rather than failing the whole load.
///
/// # Errors
///
/// Returns an error if the header row is unreadable or lacks a required column.
pub fn parse_trips(bytes: &[u8]) -> Result<TripLog> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = rdr.headers().context("trip CSV has no header row")?;
    for column in ["start_station_id", "end_station_id", "started_at", "ended_at"] {
        if !headers.iter().any(|h| h == column) {
            bail!("trip CSV is missing column '{column}'");
        }
    }

    let mut log = TripLog::default();
    for (line, result) in rdr.deserialize::<TripRecord>().enumerate() {
        match result.ok().and_then(TripRecord::into_trip) {
            Some(trip) => log.trips.push(trip),
            None => {
                debug!(row = line + 1, "Skipping malformed trip row");
                log.skipped += 1;
            }
        }
    }

    if log.skipped > 0 {
        warn!(skipped = log.skipped, kept = log.trips.len(), "Malformed trip rows excluded");
    }
    debug!(count = log.trips.len(), "Trips parsed");

    Ok(log)
}
