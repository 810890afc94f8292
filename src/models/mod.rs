//! Shared value types used across the database and service layers.

pub mod time;

pub use time::{TimeWindow, coerce_days, listing_lookback};
