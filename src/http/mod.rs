//! HTTP server module for the noise-monitoring API.
//!
//! An axum-based read-only REST API over the monitoring tables. The HTTP
//! layer owns request parsing, response shaping, and error mapping; all
//! report logic lives in the service layer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Query parsing and coercion                             │
//! │  - JSON serialization, file downloads                     │
//! │  - CORS, compression, error envelopes                     │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services/)                                │
//! │  - Window resolution, normalization, merge & gap-fill     │
//! │  - Spreadsheet / PDF rendering, dashboard aggregation     │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Repository Layer (db/)                                   │
//! │  - LocalRepository / MysqlRepository                      │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::AppError;
pub use router::create_router;
pub use state::AppState;
