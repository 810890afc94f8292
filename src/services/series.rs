//! Series normalization: raw storage rows become a common report row shape.
//!
//! Every series contributes a fixed set of metrics; a normalized row carries
//! exactly that set, formatted for display, and nothing else. Metrics a series
//! does not declare stay `None` so the merge step can tell "this series never
//! reports L10" apart from "L10 was null in this sample".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{ExtremesRow, LaeqRow, MetricsRow};

/// The six reportable sound-level metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Laeq,
    L10,
    L50,
    L90,
    Lmin,
    Lmax,
}

impl Metric {
    /// All metrics, in report column order.
    pub const ALL: [Metric; 6] = [
        Metric::Laeq,
        Metric::L10,
        Metric::L50,
        Metric::L90,
        Metric::Lmin,
        Metric::Lmax,
    ];

    /// JSON/schema field key for this metric.
    pub fn key(self) -> &'static str {
        match self {
            Metric::Laeq => "laeq",
            Metric::L10 => "L10",
            Metric::L50 => "L50",
            Metric::L90 => "L90",
            Metric::Lmin => "Lmin",
            Metric::Lmax => "Lmax",
        }
    }

    /// Inverse of [`Metric::key`].
    pub fn from_key(key: &str) -> Option<Self> {
        Metric::ALL.into_iter().find(|m| m.key() == key)
    }
}

/// One display-formatted value slot per metric.
///
/// Values are already strings here: formatting happens once, at
/// normalization, and nulls stay `None` through merge and fill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricValues {
    pub laeq: Option<String>,
    pub l10: Option<String>,
    pub l50: Option<String>,
    pub l90: Option<String>,
    pub lmin: Option<String>,
    pub lmax: Option<String>,
}

impl MetricValues {
    pub fn get(&self, metric: Metric) -> Option<&str> {
        match metric {
            Metric::Laeq => self.laeq.as_deref(),
            Metric::L10 => self.l10.as_deref(),
            Metric::L50 => self.l50.as_deref(),
            Metric::L90 => self.l90.as_deref(),
            Metric::Lmin => self.lmin.as_deref(),
            Metric::Lmax => self.lmax.as_deref(),
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<String>) {
        let slot = match metric {
            Metric::Laeq => &mut self.laeq,
            Metric::L10 => &mut self.l10,
            Metric::L50 => &mut self.l50,
            Metric::L90 => &mut self.l90,
            Metric::Lmin => &mut self.lmin,
            Metric::Lmax => &mut self.lmax,
        };
        *slot = value;
    }

    /// True when every metric slot holds a value.
    pub fn is_dense(&self) -> bool {
        Metric::ALL.into_iter().all(|m| self.get(m).is_some())
    }
}

/// A normalized (and, after the engine runs, gap-filled) report row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: i64,
    /// Stored UTC timestamp; kept unformatted so merging sorts on the
    /// instant, not on a display string.
    pub created_at: DateTime<Utc>,
    pub values: MetricValues,
}

/// Format a stored reading for display: two decimals, half-up, always a
/// `.` decimal point. `None` stays `None`.
pub fn format_decimal(value: Option<f64>) -> Option<String> {
    value.map(|v| {
        let rounded = (v * 100.0).round() / 100.0;
        format!("{rounded:.2}")
    })
}

pub fn normalize_laeq(rows: &[LaeqRow]) -> Vec<ReportRow> {
    rows.iter()
        .map(|row| ReportRow {
            id: row.id,
            created_at: row.created_at,
            values: MetricValues {
                laeq: format_decimal(row.value),
                ..MetricValues::default()
            },
        })
        .collect()
}

pub fn normalize_metrics(rows: &[MetricsRow]) -> Vec<ReportRow> {
    rows.iter()
        .map(|row| ReportRow {
            id: row.id,
            created_at: row.created_at,
            values: MetricValues {
                l10: format_decimal(row.l10),
                l50: format_decimal(row.l50),
                l90: format_decimal(row.l90),
                ..MetricValues::default()
            },
        })
        .collect()
}

pub fn normalize_extremes(rows: &[ExtremesRow]) -> Vec<ReportRow> {
    rows.iter()
        .map(|row| ReportRow {
            id: row.id,
            created_at: row.created_at,
            values: MetricValues {
                lmin: format_decimal(row.lmin),
                lmax: format_decimal(row.lmax),
                ..MetricValues::default()
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::time::parse_bound;

    #[test]
    fn whole_numbers_format_to_two_decimals() {
        assert_eq!(format_decimal(Some(3.0)), Some("3.00".to_string()));
        assert_eq!(format_decimal(Some(53.2)), Some("53.20".to_string()));
        assert_eq!(format_decimal(Some(41.455)), Some("41.46".to_string()));
    }

    #[test]
    fn null_readings_stay_null() {
        assert_eq!(format_decimal(None), None);
    }

    #[test]
    fn laeq_rows_populate_only_their_metric() {
        let rows = vec![LaeqRow {
            id: 7,
            value: Some(52.5),
            created_at: parse_bound("2024-06-10 12:00:00").unwrap(),
        }];
        let normalized = normalize_laeq(&rows);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].values.get(Metric::Laeq), Some("52.50"));
        for metric in [Metric::L10, Metric::L50, Metric::L90, Metric::Lmin, Metric::Lmax] {
            assert_eq!(normalized[0].values.get(metric), None);
        }
    }

    #[test]
    fn metrics_rows_carry_nulls_through() {
        let rows = vec![MetricsRow {
            id: 1,
            l10: Some(55.0),
            l50: None,
            l90: Some(40.125),
            created_at: parse_bound("2024-06-10 12:00:00").unwrap(),
        }];
        let normalized = normalize_metrics(&rows);
        assert_eq!(normalized[0].values.get(Metric::L10), Some("55.00"));
        assert_eq!(normalized[0].values.get(Metric::L50), None);
        assert_eq!(normalized[0].values.get(Metric::L90), Some("40.13"));
    }

    #[test]
    fn metric_keys_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_key(metric.key()), Some(metric));
        }
        assert_eq!(Metric::from_key("created_at"), None);
    }
}
