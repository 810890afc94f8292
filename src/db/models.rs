//! Raw row types as read from storage.
//!
//! These mirror the monitoring tables one to one. Metric columns are nullable
//! at the source (a sampler can report a period without a value), so they are
//! `Option<f64>` here and stay optional until the service layer decides how to
//! present them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The monitored series and their backing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    /// 1-minute LAeq samples (`laeq_data`).
    LaeqData,
    /// LAeq samples (`laeq`).
    Laeq,
    /// Statistical percentiles L10/L50/L90 (`laeq_metrics`).
    Metrics,
    /// Period extremes Lmin/Lmax (`laeq_lmin_lmax`).
    Extremes,
    /// Broker connectivity status (`mqtt_status`).
    MqttStatus,
}

impl Series {
    /// Backing table name, useful in logs and error context.
    pub fn table_name(self) -> &'static str {
        match self {
            Series::LaeqData => "laeq_data",
            Series::Laeq => "laeq",
            Series::Metrics => "laeq_metrics",
            Series::Extremes => "laeq_lmin_lmax",
            Series::MqttStatus => "mqtt_status",
        }
    }
}

/// A row from the `laeq` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaeqRow {
    pub id: i64,
    pub value: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `laeq_data` table (high-frequency 1-minute samples).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaeqDataRow {
    pub id: i64,
    pub value: Option<f64>,
    /// Sampling interval tag; the API only ever serves `1m` rows.
    pub sample_type: String,
    pub created_at: DateTime<Utc>,
}

/// A row from the `laeq_metrics` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRow {
    pub id: i64,
    pub l10: Option<f64>,
    pub l50: Option<f64>,
    pub l90: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `laeq_lmin_lmax` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremesRow {
    pub id: i64,
    pub lmin: Option<f64>,
    pub lmax: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `mqtt_status` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqttStatusRow {
    pub id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Running daily aggregate over `laeq.value`.
///
/// All fields are `None` when the day has no samples; the dashboard maps that
/// to explicit zeros so a silent day is distinguishable from a missing table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TodayStats {
    pub max_laeq: Option<f64>,
    pub min_laeq: Option<f64>,
    pub avg_laeq: Option<f64>,
}

/// Sort direction for the status listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Sortable columns of `mqtt_status`.
///
/// Whitelisted so an arbitrary query string can never reach the storage
/// layer as a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusSortField {
    Id,
    Status,
    CreatedAt,
    #[default]
    UpdatedAt,
}

/// Parsed `sort=field,ASC|DESC` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: StatusSortField,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Parse a `field,ASC|DESC` value. Unknown fields and directions fall
    /// back to the default (`updated_at DESC` / `DESC`).
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.splitn(2, ',');
        let field = match parts.next().map(str::trim) {
            Some("id") => StatusSortField::Id,
            Some("status") => StatusSortField::Status,
            Some("created_at") => StatusSortField::CreatedAt,
            _ => StatusSortField::UpdatedAt,
        };
        let direction = match parts.next().map(|d| d.trim().to_ascii_uppercase()) {
            Some(ref d) if d == "ASC" => SortDirection::Asc,
            _ => SortDirection::Desc,
        };
        Self { field, direction }
    }
}
