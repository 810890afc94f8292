//! Read-only HTTP API over an environmental noise-monitoring database.
//!
//! The crate serves five measurement series (LAeq aggregates, 1-minute
//! samples, statistical percentiles, period extremes and broker connectivity
//! status) as JSON listings, a dashboard summary, and report exports rendered
//! to Excel or PDF.
//!
//! # Layout
//!
//! - [`models`]: time handling shared by every layer (fixed-offset display,
//!   window resolution, query coercion)
//! - [`db`]: repository trait and the MySQL / in-memory backends
//! - [`services`]: report assembly, merge & gap-fill, document rendering,
//!   dashboard aggregation
//! - [`http`]: axum handlers, router and error envelopes

pub mod db;
pub mod http;
pub mod models;
pub mod services;
