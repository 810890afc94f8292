//! In-memory repository for unit testing and local development.
//!
//! Behaves like the MySQL backend from the caller's point of view: windows
//! are closed intervals, rows come back newest first, and `limit` is applied
//! after ordering. Rows are seeded through the `insert_*` methods.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::models::{
    ExtremesRow, LaeqDataRow, LaeqRow, MetricsRow, MqttStatusRow, Series, SortDirection, SortSpec,
    StatusSortField, TodayStats,
};
use crate::db::repository::{NoiseRepository, RepositoryError, RepositoryResult};
use crate::models::TimeWindow;

/// Rows served by `fetch_laeq_data`; everything else is ignored, like the
/// SQL filter on the real table.
const MINUTE_SAMPLE_TYPE: &str = "1m";

#[derive(Default)]
struct Tables {
    laeq: Vec<LaeqRow>,
    laeq_data: Vec<LaeqDataRow>,
    metrics: Vec<MetricsRow>,
    extremes: Vec<ExtremesRow>,
    mqtt_status: Vec<MqttStatusRow>,
}

/// In-memory implementation of [`NoiseRepository`].
#[derive(Default)]
pub struct LocalRepository {
    tables: RwLock<Tables>,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_laeq(&self, row: LaeqRow) {
        if let Ok(mut tables) = self.tables.write() {
            tables.laeq.push(row);
        }
    }

    pub fn insert_laeq_data(&self, row: LaeqDataRow) {
        if let Ok(mut tables) = self.tables.write() {
            tables.laeq_data.push(row);
        }
    }

    pub fn insert_metrics(&self, row: MetricsRow) {
        if let Ok(mut tables) = self.tables.write() {
            tables.metrics.push(row);
        }
    }

    pub fn insert_extremes(&self, row: ExtremesRow) {
        if let Ok(mut tables) = self.tables.write() {
            tables.extremes.push(row);
        }
    }

    pub fn insert_mqtt_status(&self, row: MqttStatusRow) {
        if let Ok(mut tables) = self.tables.write() {
            tables.mqtt_status.push(row);
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> RepositoryResult<T> {
        let tables = self
            .tables
            .read()
            .map_err(|_| RepositoryError::internal("repository lock poisoned"))?;
        Ok(f(&tables))
    }
}

/// Window + order + limit over any row type with a time column.
fn select_window<R: Clone>(
    rows: &[R],
    ts: impl Fn(&R) -> DateTime<Utc>,
    window: TimeWindow,
    limit: Option<i64>,
) -> Vec<R> {
    let mut selected: Vec<R> = rows
        .iter()
        .filter(|r| window.contains(ts(r)))
        .cloned()
        .collect();
    selected.sort_by(|a, b| ts(b).cmp(&ts(a)));
    if let Some(limit) = limit {
        selected.truncate(limit.max(0) as usize);
    }
    selected
}

fn latest_by<R: Clone>(rows: &[R], ts: impl Fn(&R) -> DateTime<Utc>) -> Option<R> {
    rows.iter().max_by_key(|r| ts(r)).cloned()
}

#[async_trait]
impl NoiseRepository for LocalRepository {
    async fn latest_timestamp(&self, series: Series) -> RepositoryResult<Option<DateTime<Utc>>> {
        self.read(|t| match series {
            Series::Laeq => t.laeq.iter().map(|r| r.created_at).max(),
            Series::LaeqData => t
                .laeq_data
                .iter()
                .filter(|r| r.sample_type == MINUTE_SAMPLE_TYPE)
                .map(|r| r.created_at)
                .max(),
            Series::Metrics => t.metrics.iter().map(|r| r.created_at).max(),
            Series::Extremes => t.extremes.iter().map(|r| r.created_at).max(),
            Series::MqttStatus => t.mqtt_status.iter().map(|r| r.updated_at).max(),
        })
    }

    async fn fetch_laeq(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<LaeqRow>> {
        self.read(|t| select_window(&t.laeq, |r| r.created_at, window, limit))
    }

    async fn fetch_laeq_data(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<LaeqDataRow>> {
        self.read(|t| {
            let minute_rows: Vec<LaeqDataRow> = t
                .laeq_data
                .iter()
                .filter(|r| r.sample_type == MINUTE_SAMPLE_TYPE)
                .cloned()
                .collect();
            select_window(&minute_rows, |r| r.created_at, window, limit)
        })
    }

    async fn fetch_metrics(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<MetricsRow>> {
        self.read(|t| select_window(&t.metrics, |r| r.created_at, window, limit))
    }

    async fn fetch_extremes(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<ExtremesRow>> {
        self.read(|t| select_window(&t.extremes, |r| r.created_at, window, limit))
    }

    async fn fetch_mqtt_status(
        &self,
        window: Option<TimeWindow>,
        status_prefix: Option<&str>,
        sort: SortSpec,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<MqttStatusRow>> {
        self.read(|t| {
            let mut rows: Vec<MqttStatusRow> = t
                .mqtt_status
                .iter()
                .filter(|r| window.map_or(true, |w| w.contains(r.updated_at)))
                .filter(|r| status_prefix.map_or(true, |p| r.status.starts_with(p)))
                .cloned()
                .collect();
            rows.sort_by(|a, b| {
                let ordering = match sort.field {
                    StatusSortField::Id => a.id.cmp(&b.id),
                    StatusSortField::Status => a.status.cmp(&b.status),
                    StatusSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                    StatusSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                };
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
            if let Some(limit) = limit {
                rows.truncate(limit.max(0) as usize);
            }
            rows
        })
    }

    async fn latest_laeq(&self) -> RepositoryResult<Option<LaeqRow>> {
        self.read(|t| latest_by(&t.laeq, |r| r.created_at))
    }

    async fn latest_metrics(&self) -> RepositoryResult<Option<MetricsRow>> {
        self.read(|t| latest_by(&t.metrics, |r| r.created_at))
    }

    async fn latest_extremes(&self) -> RepositoryResult<Option<ExtremesRow>> {
        self.read(|t| latest_by(&t.extremes, |r| r.created_at))
    }

    async fn latest_mqtt_status(&self) -> RepositoryResult<Option<MqttStatusRow>> {
        self.read(|t| latest_by(&t.mqtt_status, |r| r.updated_at))
    }

    async fn today_stats(&self, since: DateTime<Utc>) -> RepositoryResult<TodayStats> {
        self.read(|t| {
            let values: Vec<f64> = t
                .laeq
                .iter()
                .filter(|r| r.created_at >= since)
                .filter_map(|r| r.value)
                .collect();
            if values.is_empty() {
                return TodayStats::default();
            }
            let sum: f64 = values.iter().sum();
            TodayStats {
                max_laeq: values.iter().cloned().reduce(f64::max),
                min_laeq: values.iter().cloned().reduce(f64::min),
                avg_laeq: Some(sum / values.len() as f64),
            }
        })
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}
