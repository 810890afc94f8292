//! Report and dashboard services.
//!
//! Everything here is storage-agnostic: services take a
//! [`NoiseRepository`](crate::db::NoiseRepository) reference and produce
//! plain data (assembled reports, rendered documents, dashboard summaries)
//! for the HTTP layer to serve.

pub mod dashboard;
pub mod excel;
pub mod merge;
pub mod pdf;
pub mod report;
pub mod series;

pub use dashboard::{build_dashboard_summary, DashboardSummary};
pub use excel::render_excel;
pub use merge::{gap_fill, merge_and_fill, merge_series, seed_latest_values};
pub use pdf::{render_pdf, MAX_PDF_ROWS};
pub use report::{build_report, Column, Report, ReportType};
pub use series::{Metric, MetricValues, ReportRow};

/// Failure while turning an assembled report into a document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("spreadsheet rendering failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error("pdf rendering failed: {0}")]
    Pdf(String),
    #[error("report file error: {0}")]
    Io(#[from] std::io::Error),
}
