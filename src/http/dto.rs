//! Data Transfer Objects for the HTTP API.
//!
//! Query DTOs keep every parameter a string where the original value matters
//! (`days` must coerce rather than reject), and response DTOs pin the exact
//! field casing the monitoring dashboard binds against (`L10`, `Lmax`,
//! `type`, camelCase query keys).

use serde::{Deserialize, Serialize};

use crate::db::models::{ExtremesRow, LaeqDataRow, LaeqRow, MetricsRow, MqttStatusRow};
use crate::models::time;

/// Query parameters shared by the series listing endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Query parameters of the connectivity-status listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusQuery {
    pub limit: Option<i64>,
    /// Status prefix filter (`Online` matches `Online`, `Online-2`, ...).
    pub status: Option<String>,
    /// `field,ASC|DESC`; unknown fields fall back to `updated_at DESC`.
    pub sort: Option<String>,
}

/// Query parameters of both export endpoints.
///
/// `days` stays a string so `days=abc` coerces to the default instead of
/// failing query extraction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub report_type: Option<String>,
    pub days: Option<String>,
    pub format: Option<String>,
}

/// One `laeq` listing entry. A null reading presents as zero here; the
/// listing is a chart feed and charts want numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaeqEntry {
    pub id: i64,
    pub value: f64,
    pub created_at: String,
}

impl From<LaeqRow> for LaeqEntry {
    fn from(row: LaeqRow) -> Self {
        Self {
            id: row.id,
            value: row.value.unwrap_or(0.0),
            created_at: time::format_listing(row.created_at),
        }
    }
}

/// One 1-minute sample entry. The raw reading keeps its null here, unlike
/// the aggregate listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaeqDataEntry {
    pub laeq: Option<f64>,
    #[serde(rename = "type")]
    pub sample_type: String,
    pub created_at: String,
}

impl From<LaeqDataRow> for LaeqDataEntry {
    fn from(row: LaeqDataRow) -> Self {
        Self {
            laeq: row.value,
            sample_type: row.sample_type,
            created_at: time::format_listing(row.created_at),
        }
    }
}

/// One percentile listing entry, nulls presented as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsEntry {
    pub id: i64,
    #[serde(rename = "L10")]
    pub l10: f64,
    #[serde(rename = "L50")]
    pub l50: f64,
    #[serde(rename = "L90")]
    pub l90: f64,
    pub created_at: String,
}

impl From<MetricsRow> for MetricsEntry {
    fn from(row: MetricsRow) -> Self {
        Self {
            id: row.id,
            l10: row.l10.unwrap_or(0.0),
            l50: row.l50.unwrap_or(0.0),
            l90: row.l90.unwrap_or(0.0),
            created_at: time::format_listing(row.created_at),
        }
    }
}

/// One extremes listing entry, nulls presented as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtremesEntry {
    pub id: i64,
    #[serde(rename = "Lmin")]
    pub lmin: f64,
    #[serde(rename = "Lmax")]
    pub lmax: f64,
    pub created_at: String,
}

impl From<ExtremesRow> for ExtremesEntry {
    fn from(row: ExtremesRow) -> Self {
        Self {
            id: row.id,
            lmin: row.lmin.unwrap_or(0.0),
            lmax: row.lmax.unwrap_or(0.0),
            created_at: time::format_listing(row.created_at),
        }
    }
}

/// One connectivity-status listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqttStatusEntry {
    pub id: i64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MqttStatusRow> for MqttStatusEntry {
    fn from(row: MqttStatusRow) -> Self {
        Self {
            id: row.id,
            status: row.status,
            created_at: time::format_listing(row.created_at),
            updated_at: time::format_listing(row.updated_at),
        }
    }
}

/// View-mode export response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportView {
    pub title: String,
    pub data: Vec<serde_json::Value>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::parse_bound;

    #[test]
    fn laeq_entry_zeroes_null_readings() {
        let entry = LaeqEntry::from(LaeqRow {
            id: 1,
            value: None,
            created_at: parse_bound("2024-06-10 04:00:00").unwrap(),
        });
        assert_eq!(entry.value, 0.0);
        assert_eq!(entry.created_at, "2024-06-10 12:00:00");
    }

    #[test]
    fn minute_entry_keeps_nulls_and_renames_type() {
        let entry = LaeqDataEntry::from(LaeqDataRow {
            id: 1,
            value: None,
            sample_type: "1m".to_string(),
            created_at: parse_bound("2024-06-10 04:00:00").unwrap(),
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["laeq"].is_null());
        assert_eq!(json["type"], "1m");
    }

    #[test]
    fn metric_field_names_keep_their_casing() {
        let entry = MetricsEntry::from(MetricsRow {
            id: 1,
            l10: Some(55.0),
            l50: None,
            l90: Some(40.0),
            created_at: parse_bound("2024-06-10 04:00:00").unwrap(),
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["L10"], 55.0);
        assert_eq!(json["L50"], 0.0);
        assert_eq!(json["L90"], 40.0);
    }
}
