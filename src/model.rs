//! Core records: stations, trips and per-station traffic counts.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minutes in a day. Minute-of-day values live in `[0, MINUTES_PER_DAY)`.
pub const MINUTES_PER_DAY: u16 = 1440;

/// A station's short code, e.g. `"A32000"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Arrival and departure counts for one station.
///
/// `total_traffic` is always `arrivals + departures`; the fields are private so
/// the sum cannot drift from its parts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Traffic {
    arrivals: u32,
    departures: u32,
    total_traffic: u32,
}

impl Traffic {
    pub fn new(arrivals: u32, departures: u32) -> Self {
        Self {
            arrivals,
            departures,
            total_traffic: arrivals + departures,
        }
    }

    pub fn arrivals(&self) -> u32 {
        self.arrivals
    }

    pub fn departures(&self) -> u32 {
        self.departures
    }

    pub fn total(&self) -> u32 {
        self.total_traffic
    }
}

/// A bike-share dock. `traffic` is zero until a station list goes through
/// [`crate::traffic::aggregate`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Station {
    pub id: StationId,
    pub name: Option<String>,
    pub capacity: Option<u32>,
    pub position: LonLat,
    pub traffic: Traffic,
}

impl Station {
    pub fn new(id: StationId, position: LonLat) -> Self {
        Self {
            id,
            name: None,
            capacity: None,
            position,
            traffic: Traffic::default(),
        }
    }

    pub fn with_traffic(&self, traffic: Traffic) -> Self {
        Self {
            traffic,
            ..self.clone()
        }
    }
}

/// One rental: where and when it started and ended.
#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    pub start_station_id: StationId,
    pub end_station_id: StationId,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
}

impl Trip {
    pub fn start_minute(&self) -> u16 {
        minute_of_day(&self.started_at)
    }

    pub fn end_minute(&self) -> u16 {
        minute_of_day(&self.ended_at)
    }
}

fn minute_of_day(ts: &NaiveDateTime) -> u16 {
    (ts.hour() * 60 + ts.minute()) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 42)
            .unwrap()
    }

    #[test]
    fn test_traffic_total_is_sum() {
        let t = Traffic::new(3, 4);
        assert_eq!(t.arrivals(), 3);
        assert_eq!(t.departures(), 4);
        assert_eq!(t.total(), 7);
        assert_eq!(Traffic::default().total(), 0);
    }

    #[test]
    fn test_trip_minutes_ignore_seconds() {
        let trip = Trip {
            start_station_id: StationId::new("A"),
            end_station_id: StationId::new("B"),
            started_at: at(0, 0),
            ended_at: at(23, 59),
        };
        assert_eq!(trip.start_minute(), 0);
        assert_eq!(trip.end_minute(), 1439);
    }

    #[test]
    fn test_with_traffic_keeps_identity() {
        let s = Station::new(StationId::new("A"), LonLat::new(-71.0, 42.0));
        let enriched = s.with_traffic(Traffic::new(1, 2));
        assert_eq!(enriched.id, s.id);
        assert_eq!(enriched.position, s.position);
        assert_eq!(enriched.traffic.total(), 3);
        assert_eq!(s.traffic.total(), 0);
    }
}
