//! Map presentation settings handed to the renderer with every scene.
//!
//! Defaults reproduce the Boston/Cambridge bike map. A JSON file may override
//! any subset of fields:
//! ```json
//! {
//!   "view": { "center": [-71.06, 42.36], "zoom": 13.0, "min_zoom": 5.0, "max_zoom": 18.0 },
//!   "marker_style": { "fill": "tomato", "stroke": "white", "stroke_width": 1.0, "opacity": 0.8 }
//! }
//! ```

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATIONS_URL: &str = "https://dsc106.com/labs/lab07/data/bluebikes-stations.json";
pub const DEFAULT_TRIPS_URL: &str =
    "https://dsc106.com/labs/lab07/data/bluebikes-traffic-2024-03.csv";

const BOSTON_LANES_URL: &str = "https://bostonopendata-boston.opendata.arcgis.com/datasets/boston::existing-bike-network-2022.geojson";
const CAMBRIDGE_LANES_URL: &str = "https://raw.githubusercontent.com/cambridgegis/cambridgegis_data/main/Recreation/Bike_Facilities/RECREATION_BikeFacilities.geojson";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapView {
    /// `[lon, lat]`
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [-71.09415, 42.36027],
            zoom: 12.0,
            min_zoom: 5.0,
            max_zoom: 18.0,
        }
    }
}

/// A GeoJSON line layer drawn beneath the station markers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaneLayer {
    pub id: String,
    pub source: String,
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

impl LaneLayer {
    fn bike_network(id: &str, source: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            color: color.to_string(),
            width: 5.0,
            opacity: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            fill: "steelblue".to_string(),
            stroke: "white".to_string(),
            stroke_width: 1.0,
            opacity: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub view: MapView,
    pub lanes: Vec<LaneLayer>,
    pub marker_style: MarkerStyle,
    pub max_radius: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            view: MapView::default(),
            lanes: vec![
                LaneLayer::bike_network("bike-lanes", BOSTON_LANES_URL, "#32D400"),
                LaneLayer::bike_network("cambridge-bike-lanes", CAMBRIDGE_LANES_URL, "#006400"),
            ],
            marker_style: MarkerStyle::default(),
            max_radius: crate::scale::MAX_RADIUS,
        }
    }
}

impl MapConfig {
    /// Loads the config from a JSON file at `path`. Missing fields keep their defaults.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read map config {path}"))?;
        Self::from_json(&content).with_context(|| format!("invalid map config {path}"))
    }

    /// Parses a config. `max_radius` must be finite and positive.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        ensure!(
            config.max_radius.is_finite() && config.max_radius > 0.0,
            "max_radius must be a positive number, got {}",
            config.max_radius
        );
        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
