//! Per-station traffic counts, optionally restricted to a time of day.

pub mod aggregate;
pub mod window;

pub use aggregate::{aggregate, rank_by_traffic};
pub use window::{ANY_TIME, DEFAULT_TOLERANCE, TimeWindow};
