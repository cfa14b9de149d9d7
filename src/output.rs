//! Render-ready output: marker records, the scene handed to the map, and file writers.
//!
//! Scenes are written as pretty JSON; the per-station table as CSV.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::config::{LaneLayer, MapConfig, MapView, MarkerStyle};
use crate::model::{Station, StationId};
use crate::scale::RadiusScale;
use crate::time_display::window_label;
use crate::traffic::TimeWindow;

/// One circle for the renderer to project and draw.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Marker {
    pub station_id: StationId,
    /// `[lon, lat]`
    pub position: [f64; 2],
    pub radius: f64,
    pub tooltip: String,
}

impl Marker {
    pub fn for_station(station: &Station, scale: &RadiusScale) -> Self {
        Self {
            station_id: station.id.clone(),
            position: [station.position.lon, station.position.lat],
            radius: scale.radius(station.traffic.total()),
            tooltip: tooltip(station),
        }
    }
}

/// `"12 trips (5 departures, 7 arrivals)"`
pub fn tooltip(station: &Station) -> String {
    let t = &station.traffic;
    format!(
        "{} trips ({} departures, {} arrivals)",
        t.total(),
        t.departures(),
        t.arrivals()
    )
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeFilter {
    pub slider: i32,
    pub label: String,
    pub window: TimeWindow,
}

impl From<TimeWindow> for TimeFilter {
    fn from(window: TimeWindow) -> Self {
        Self {
            slider: window.slider_value(),
            label: window_label(&window),
            window,
        }
    }
}

/// Everything the map needs to redraw: view, lane layers, markers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scene {
    pub generated_at: DateTime<Utc>,
    pub view: MapView,
    pub lanes: Vec<LaneLayer>,
    pub marker_style: MarkerStyle,
    pub time_filter: TimeFilter,
    pub max_traffic: u32,
    pub markers: Vec<Marker>,
}

impl Scene {
    /// Builds markers in station order, sized by `scale`.
    pub fn build(
        stations: &[Station],
        scale: &RadiusScale,
        window: TimeWindow,
        config: &MapConfig,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            view: config.view.clone(),
            lanes: config.lanes.clone(),
            marker_style: config.marker_style.clone(),
            time_filter: window.into(),
            max_traffic: scale.max_traffic(),
            markers: stations
                .iter()
                .map(|s| Marker::for_station(s, scale))
                .collect(),
        }
    }
}

/// Writes `scene` as pretty JSON to `path`, replacing any previous file.
/// A path of `-` writes to stdout.
pub fn write_scene(path: &str, scene: &Scene) -> Result<()> {
    let json = serde_json::to_string_pretty(scene)?;
    if path == "-" {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}")?;
        stdout.flush()?;
    } else {
        if let Some(dir) = Path::new(path).parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, json).with_context(|| format!("failed to write scene {path}"))?;
    }
    info!(
        path,
        markers = scene.markers.len(),
        time = %scene.time_filter.label,
        "Scene written"
    );
    Ok(())
}

#[derive(Serialize)]
struct StationRow<'a> {
    station_id: &'a str,
    name: Option<&'a str>,
    lon: f64,
    lat: f64,
    arrivals: u32,
    departures: u32,
    total_traffic: u32,
    radius: f64,
}

/// Writes one CSV row per station, with a header, replacing any existing file.
pub fn write_station_table(path: &str, stations: &[Station], scale: &RadiusScale) -> Result<()> {
    debug!(path, rows = stations.len(), "Writing station table");

    let file = File::create(path).with_context(|| format!("failed to create {path}"))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for s in stations {
        writer.serialize(StationRow {
            station_id: s.id.as_str(),
            name: s.name.as_deref(),
            lon: s.position.lon,
            lat: s.position.lat,
            arrivals: s.traffic.arrivals(),
            departures: s.traffic.departures(),
            total_traffic: s.traffic.total(),
            radius: scale.radius(s.traffic.total()),
        })?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LonLat, Traffic};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn stations() -> Vec<Station> {
        vec![
            Station::new(StationId::new("A"), LonLat::new(-71.1, 42.3))
                .with_traffic(Traffic::new(1, 2)),
            Station::new(StationId::new("B"), LonLat::new(-71.0, 42.4)),
        ]
    }

    #[test]
    fn test_tooltip_text() {
        assert_eq!(tooltip(&stations()[0]), "3 trips (2 departures, 1 arrivals)");
    }

    #[test]
    fn test_scene_markers_follow_station_order() {
        let stations = stations();
        let scale = RadiusScale::build(&stations);
        let scene = Scene::build(&stations, &scale, TimeWindow::Any, &MapConfig::default());

        assert_eq!(scene.markers.len(), 2);
        assert_eq!(scene.markers[0].station_id.as_str(), "A");
        assert_eq!(scene.markers[0].position, [-71.1, 42.3]);
        assert_eq!(scene.markers[0].radius, 25.0);
        assert_eq!(scene.markers[1].radius, 0.0);
        assert_eq!(scene.max_traffic, 3);
        assert_eq!(scene.time_filter.slider, -1);
        assert_eq!(scene.time_filter.label, "(any time)");
    }

    #[test]
    fn test_write_scene_overwrites() {
        let path = temp_path("bluebikes_traffic_test_scene.json");
        let _ = fs::remove_file(&path);

        let stations = stations();
        let scale = RadiusScale::build(&stations);
        let config = MapConfig::default();
        let any = Scene::build(&stations, &scale, TimeWindow::Any, &config);
        let morning = Scene::build(
            &stations,
            &scale,
            TimeWindow::Around { minute: 480, tolerance: 60 },
            &config,
        );

        write_scene(&path, &any).unwrap();
        write_scene(&path, &morning).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["time_filter"]["slider"], 480);
        assert_eq!(json["time_filter"]["label"], "8:00 AM");
        assert_eq!(json["time_filter"]["window"]["kind"], "around");
        assert_eq!(json["markers"].as_array().unwrap().len(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_station_table() {
        let path = temp_path("bluebikes_traffic_test_table.csv");
        let _ = fs::remove_file(&path);

        let stations = stations();
        let scale = RadiusScale::build(&stations);
        write_station_table(&path, &stations, &scale).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("station_id,name,lon,lat,arrivals"));
        assert!(lines[1].starts_with("A,,-71.1,42.3,1,2,3,25"));

        fs::remove_file(&path).unwrap();
    }
}
