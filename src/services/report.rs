//! Report assembly: resolve windows, read the participating series,
//! normalize, and (for the combined report) merge and gap-fill.
//!
//! The report type is decided once, here, and everything downstream (JSON
//! view, spreadsheet, PDF) consumes the same assembled [`Report`] without
//! re-deriving rows.

use chrono::Duration;
use futures::try_join;
use serde_json::{Map, Number, Value};

use crate::db::models::Series;
use crate::db::repository::{NoiseRepository, RepositoryResult};
use crate::models::time::{self, TimeWindow};
use crate::services::merge::merge_and_fill;
use crate::services::series::{
    normalize_extremes, normalize_laeq, normalize_metrics, Metric, ReportRow,
};

/// The four report variants the API serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    Laeq,
    Percentiles,
    Extremes,
    All,
}

impl ReportType {
    /// Parse the `reportType` query value. Anything unrecognized (including
    /// absence) is the combined report.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("laeq") => ReportType::Laeq,
            Some("percentiles") => ReportType::Percentiles,
            Some("extremes") => ReportType::Extremes,
            _ => ReportType::All,
        }
    }

    /// Identifier used in export filenames.
    pub fn slug(self) -> &'static str {
        match self {
            ReportType::Laeq => "laeq",
            ReportType::Percentiles => "percentiles",
            ReportType::Extremes => "extremes",
            ReportType::All => "all",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportType::Laeq => "LAeq Sound Level Report",
            ReportType::Percentiles => "Sound Level Percentiles Report",
            ReportType::Extremes => "Sound Level Extremes Report",
            ReportType::All => "Complete Sound Level Report",
        }
    }

    /// Metrics this report type carries, in column order.
    pub fn metrics(self) -> &'static [Metric] {
        match self {
            ReportType::Laeq => &[Metric::Laeq],
            ReportType::Percentiles => &[Metric::L10, Metric::L50, Metric::L90],
            ReportType::Extremes => &[Metric::Lmin, Metric::Lmax],
            ReportType::All => &Metric::ALL,
        }
    }

    /// Column schema shared by both renderers and the JSON view.
    pub fn columns(self) -> Vec<Column> {
        let mut columns = vec![Column {
            header: "ID",
            key: "id",
            width: 10.0,
        }];
        for metric in self.metrics() {
            columns.push(Column {
                header: metric_header(*metric),
                key: metric.key(),
                width: 15.0,
            });
        }
        columns.push(Column {
            header: "Created At",
            key: "created_at",
            width: 20.0,
        });
        columns
    }
}

fn metric_header(metric: Metric) -> &'static str {
    match metric {
        Metric::Laeq => "LAeq (dB)",
        Metric::L10 => "L10 (dB)",
        Metric::L50 => "L50 (dB)",
        Metric::L90 => "L90 (dB)",
        Metric::Lmin => "Lmin (dB)",
        Metric::Lmax => "Lmax (dB)",
    }
}

/// One column of a rendered report.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header label shown to the reader.
    pub header: &'static str,
    /// Row field this column reads.
    pub key: &'static str,
    /// Display width (spreadsheet character units).
    pub width: f64,
}

/// An assembled, render-ready report.
#[derive(Debug, Clone)]
pub struct Report {
    pub report_type: ReportType,
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Text for one cell, in display form. Missing metric values are `None`
    /// so each renderer can choose its own blank representation.
    pub fn cell_text(row: &ReportRow, key: &str) -> Option<String> {
        match key {
            "id" => Some(row.id.to_string()),
            "created_at" => Some(time::format_report(row.created_at)),
            _ => Metric::from_key(key)
                .and_then(|metric| row.values.get(metric))
                .map(str::to_string),
        }
    }

    /// Rows as JSON objects in column order, for the view-mode endpoint.
    pub fn to_json_rows(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut object = Map::new();
                for column in &self.columns {
                    let value = match column.key {
                        "id" => Value::Number(Number::from(row.id)),
                        "created_at" => Value::String(time::format_report(row.created_at)),
                        key => Metric::from_key(key)
                            .and_then(|metric| row.values.get(metric))
                            .map(|v| Value::String(v.to_string()))
                            .unwrap_or(Value::Null),
                    };
                    object.insert(column.key.to_string(), value);
                }
                Value::Object(object)
            })
            .collect()
    }
}

/// Resolve a series' default export window and read the whole of it.
///
/// Export reads are deliberately unlimited at the reader; the PDF renderer
/// caps rows at render time and Excel takes everything.
async fn read_series(
    repo: &dyn NoiseRepository,
    series: Series,
    lookback: Duration,
) -> RepositoryResult<Vec<ReportRow>> {
    let latest = repo.latest_timestamp(series).await?;
    let Some(window) = TimeWindow::resolve(latest, None, None, lookback) else {
        return Ok(Vec::new());
    };
    let rows = match series {
        Series::Laeq => normalize_laeq(&repo.fetch_laeq(window, None).await?),
        Series::Metrics => normalize_metrics(&repo.fetch_metrics(window, None).await?),
        Series::Extremes => normalize_extremes(&repo.fetch_extremes(window, None).await?),
        // Not report participants.
        Series::LaeqData | Series::MqttStatus => Vec::new(),
    };
    Ok(rows)
}

/// Assemble a report over the last `days` days of each participating series.
///
/// Single-series reports are the normalized rows as-is (already newest
/// first); the combined report merges all three series and gap-fills.
/// An empty result is a valid report; the HTTP layer turns it into 404.
pub async fn build_report(
    repo: &dyn NoiseRepository,
    report_type: ReportType,
    days: i64,
) -> RepositoryResult<Report> {
    let lookback = time::export_lookback(days);

    let rows = match report_type {
        ReportType::Laeq => read_series(repo, Series::Laeq, lookback).await?,
        ReportType::Percentiles => read_series(repo, Series::Metrics, lookback).await?,
        ReportType::Extremes => read_series(repo, Series::Extremes, lookback).await?,
        ReportType::All => {
            // Independent reads; join them and fail if any fails.
            let (laeq, metrics, extremes) = try_join!(
                read_series(repo, Series::Laeq, lookback),
                read_series(repo, Series::Metrics, lookback),
                read_series(repo, Series::Extremes, lookback),
            )?;
            merge_and_fill(vec![laeq, metrics, extremes])
        }
    };

    Ok(Report {
        report_type,
        title: report_type.title().to_string(),
        columns: report_type.columns(),
        rows,
    })
}
