use std::collections::HashMap;

use crate::model::{Station, Trip, Traffic};
use crate::traffic::window::TimeWindow;

/// Counts arrivals and departures per station.
///
/// Departures are trips whose start falls in `window`, arrivals are trips whose
/// end does. Trips naming an unknown station count toward nothing. Returns a
/// fresh list in input order; neither input is modified.
pub fn aggregate(stations: &[Station], trips: &[Trip], window: TimeWindow) -> Vec<Station> {
    let mut departures: HashMap<&str, u32> = HashMap::new();
    let mut arrivals: HashMap<&str, u32> = HashMap::new();

    for trip in trips {
        if window.contains(trip.start_minute()) {
            *departures.entry(trip.start_station_id.as_str()).or_default() += 1;
        }
        if window.contains(trip.end_minute()) {
            *arrivals.entry(trip.end_station_id.as_str()).or_default() += 1;
        }
    }

    stations
        .iter()
        .map(|station| {
            let id = station.id.as_str();
            station.with_traffic(Traffic::new(
                arrivals.get(id).copied().unwrap_or(0),
                departures.get(id).copied().unwrap_or(0),
            ))
        })
        .collect()
}

/// Stations ordered busiest first. Ties keep input order.
pub fn rank_by_traffic(stations: &[Station]) -> Vec<&Station> {
    let mut ranked: Vec<&Station> = stations.iter().collect();
    ranked.sort_by_key(|s| std::cmp::Reverse(s.traffic.total()));
    ranked
}
