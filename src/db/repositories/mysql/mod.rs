//! MySQL repository implementation using Diesel.
//!
//! Queries are synchronous Diesel calls executed under
//! `tokio::task::spawn_blocking`, with connections drawn from an r2d2 pool.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `MYSQL_DATABASE_URL`: connection string (required)
//! - `MYSQL_POOL_MAX`: maximum pool size (default: 10)
//! - `MYSQL_POOL_MIN`: minimum idle connections (default: 1)
//! - `MYSQL_CONN_TIMEOUT_SEC`: connection timeout in seconds (default: 30)

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::dsl::{avg, max, min};
use diesel::mysql::MysqlConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use std::time::Duration;
use tokio::task;

use crate::db::models::{
    ExtremesRow, LaeqDataRow, LaeqRow, MetricsRow, MqttStatusRow, Series, SortDirection, SortSpec,
    StatusSortField, TodayStats,
};
use crate::db::repository::{ErrorContext, NoiseRepository, RepositoryError, RepositoryResult};
use crate::models::TimeWindow;

mod models;
mod schema;

use models::*;
use schema::{laeq, laeq_data, laeq_lmin_lmax, laeq_metrics, mqtt_status};

type MysqlPool = Pool<ConnectionManager<MysqlConnection>>;

/// Rows served by `fetch_laeq_data`.
const MINUTE_SAMPLE_TYPE: &str = "1m";

/// Configuration for connecting to MySQL.
#[derive(Debug, Clone)]
pub struct MysqlConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
}

impl Default for MysqlConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
        }
    }
}

impl MysqlConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, RepositoryError> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("MYSQL_DATABASE_URL"))
            .map_err(|_| {
                RepositoryError::configuration("DATABASE_URL or MYSQL_DATABASE_URL must be set")
            })?;

        let max_pool_size = std::env::var("MYSQL_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);

        let min_pool_size = std::env::var("MYSQL_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        let connection_timeout_sec = std::env::var("MYSQL_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
        })
    }

    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Diesel-backed repository for the MySQL monitoring database.
pub struct MysqlRepository {
    pool: MysqlPool,
}

impl MysqlRepository {
    /// Build the connection pool and verify one connection can be drawn.
    pub fn connect(config: &MysqlConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<MysqlConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .build(manager)
            .map_err(|e| {
                RepositoryError::ConnectionError {
                    message: e.to_string(),
                    context: ErrorContext::new("connect").retryable(),
                }
            })?;
        Ok(Self { pool })
    }

    /// Run a synchronous Diesel closure on the blocking pool.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut MysqlConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(RepositoryError::from)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("blocking task join error: {e}")))?
        .map_err(|e| e.with_operation(operation))
    }
}

fn bounds(window: TimeWindow) -> (NaiveDateTime, NaiveDateTime) {
    (window.start.naive_utc(), window.end.naive_utc())
}

/// Escape LIKE metacharacters so a status prefix is matched literally.
fn escape_like(prefix: &str) -> String {
    prefix
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl NoiseRepository for MysqlRepository {
    async fn latest_timestamp(&self, series: Series) -> RepositoryResult<Option<DateTime<Utc>>> {
        self.with_conn("latest_timestamp", move |conn| {
            let latest: Option<NaiveDateTime> = match series {
                Series::Laeq => laeq::table
                    .select(max(laeq::created_at))
                    .first(conn)?,
                Series::LaeqData => laeq_data::table
                    .filter(laeq_data::sample_type.eq(MINUTE_SAMPLE_TYPE))
                    .select(max(laeq_data::created_at))
                    .first(conn)?,
                Series::Metrics => laeq_metrics::table
                    .select(max(laeq_metrics::created_at))
                    .first(conn)?,
                Series::Extremes => laeq_lmin_lmax::table
                    .select(max(laeq_lmin_lmax::created_at))
                    .first(conn)?,
                Series::MqttStatus => mqtt_status::table
                    .select(max(mqtt_status::updated_at))
                    .first(conn)?,
            };
            Ok(latest.map(naive_to_utc))
        })
        .await
    }

    async fn fetch_laeq(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<LaeqRow>> {
        self.with_conn("fetch_laeq", move |conn| {
            let (start, end) = bounds(window);
            let mut query = laeq::table
                .filter(laeq::created_at.ge(start))
                .filter(laeq::created_at.le(end))
                .order(laeq::created_at.desc())
                .into_boxed();
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            let rows: Vec<DbLaeqRow> = query.load(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn fetch_laeq_data(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<LaeqDataRow>> {
        self.with_conn("fetch_laeq_data", move |conn| {
            let (start, end) = bounds(window);
            let mut query = laeq_data::table
                .filter(laeq_data::sample_type.eq(MINUTE_SAMPLE_TYPE))
                .filter(laeq_data::created_at.ge(start))
                .filter(laeq_data::created_at.le(end))
                .order(laeq_data::created_at.desc())
                .into_boxed();
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            let rows: Vec<DbLaeqDataRow> = query.load(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn fetch_metrics(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<MetricsRow>> {
        self.with_conn("fetch_metrics", move |conn| {
            let (start, end) = bounds(window);
            let mut query = laeq_metrics::table
                .filter(laeq_metrics::created_at.ge(start))
                .filter(laeq_metrics::created_at.le(end))
                .order(laeq_metrics::created_at.desc())
                .into_boxed();
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            let rows: Vec<DbMetricsRow> = query.load(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn fetch_extremes(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<ExtremesRow>> {
        self.with_conn("fetch_extremes", move |conn| {
            let (start, end) = bounds(window);
            let mut query = laeq_lmin_lmax::table
                .filter(laeq_lmin_lmax::created_at.ge(start))
                .filter(laeq_lmin_lmax::created_at.le(end))
                .order(laeq_lmin_lmax::created_at.desc())
                .into_boxed();
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            let rows: Vec<DbExtremesRow> = query.load(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn fetch_mqtt_status(
        &self,
        window: Option<TimeWindow>,
        status_prefix: Option<&str>,
        sort: SortSpec,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<MqttStatusRow>> {
        let prefix = status_prefix.map(escape_like);
        self.with_conn("fetch_mqtt_status", move |conn| {
            let mut query = mqtt_status::table.into_boxed();
            if let Some(window) = window {
                let (start, end) = bounds(window);
                query = query
                    .filter(mqtt_status::updated_at.ge(start))
                    .filter(mqtt_status::updated_at.le(end));
            }
            if let Some(prefix) = prefix {
                query = query.filter(mqtt_status::status.like(format!("{prefix}%")));
            }
            query = match (sort.field, sort.direction) {
                (StatusSortField::Id, SortDirection::Asc) => query.order(mqtt_status::id.asc()),
                (StatusSortField::Id, SortDirection::Desc) => query.order(mqtt_status::id.desc()),
                (StatusSortField::Status, SortDirection::Asc) => {
                    query.order(mqtt_status::status.asc())
                }
                (StatusSortField::Status, SortDirection::Desc) => {
                    query.order(mqtt_status::status.desc())
                }
                (StatusSortField::CreatedAt, SortDirection::Asc) => {
                    query.order(mqtt_status::created_at.asc())
                }
                (StatusSortField::CreatedAt, SortDirection::Desc) => {
                    query.order(mqtt_status::created_at.desc())
                }
                (StatusSortField::UpdatedAt, SortDirection::Asc) => {
                    query.order(mqtt_status::updated_at.asc())
                }
                (StatusSortField::UpdatedAt, SortDirection::Desc) => {
                    query.order(mqtt_status::updated_at.desc())
                }
            };
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            let rows: Vec<DbMqttStatusRow> = query.load(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn latest_laeq(&self) -> RepositoryResult<Option<LaeqRow>> {
        self.with_conn("latest_laeq", move |conn| {
            let row: Option<DbLaeqRow> = laeq::table
                .order(laeq::created_at.desc())
                .first(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn latest_metrics(&self) -> RepositoryResult<Option<MetricsRow>> {
        self.with_conn("latest_metrics", move |conn| {
            let row: Option<DbMetricsRow> = laeq_metrics::table
                .order(laeq_metrics::created_at.desc())
                .first(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn latest_extremes(&self) -> RepositoryResult<Option<ExtremesRow>> {
        self.with_conn("latest_extremes", move |conn| {
            let row: Option<DbExtremesRow> = laeq_lmin_lmax::table
                .order(laeq_lmin_lmax::created_at.desc())
                .first(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn latest_mqtt_status(&self) -> RepositoryResult<Option<MqttStatusRow>> {
        self.with_conn("latest_mqtt_status", move |conn| {
            let row: Option<DbMqttStatusRow> = mqtt_status::table
                .order(mqtt_status::updated_at.desc())
                .first(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn today_stats(&self, since: DateTime<Utc>) -> RepositoryResult<TodayStats> {
        self.with_conn("today_stats", move |conn| {
            let (max_v, min_v, avg_v): (Option<f64>, Option<f64>, Option<f64>) = laeq::table
                .filter(laeq::created_at.ge(since.naive_utc()))
                .select((max(laeq::value), min(laeq::value), avg(laeq::value)))
                .first(conn)?;
            Ok(TodayStats {
                max_laeq: max_v,
                min_laeq: min_v,
                avg_laeq: avg_v,
            })
        })
        .await
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", move |conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
    }
}
