//! Square-root scale from total traffic to marker radius.
//!
//! Marker area, not radius, tracks traffic: doubling traffic grows the radius by √2.

use serde::Serialize;

use crate::model::Station;

/// Radius in pixels of the busiest station's marker.
pub const MAX_RADIUS: f64 = 25.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RadiusScale {
    max_traffic: u32,
    max_radius: f64,
}

impl RadiusScale {
    /// Builds a scale whose domain tops out at the busiest station in `stations`.
    pub fn build(stations: &[Station]) -> Self {
        Self::with_max_radius(stations, MAX_RADIUS)
    }

    pub fn with_max_radius(stations: &[Station], max_radius: f64) -> Self {
        let max_traffic = stations
            .iter()
            .map(|s| s.traffic.total())
            .max()
            .unwrap_or(0);
        Self {
            max_traffic,
            max_radius,
        }
    }

    pub fn max_traffic(&self) -> u32 {
        self.max_traffic
    }

    /// Radius for a total-traffic value. Always 0 when no station saw any traffic.
    pub fn radius(&self, total_traffic: u32) -> f64 {
        if self.max_traffic == 0 {
            return 0.0;
        }
        (total_traffic as f64 / self.max_traffic as f64).sqrt() * self.max_radius
    }
}
