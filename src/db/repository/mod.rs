//! Repository trait: the single seam between the report logic and storage.
//!
//! Every read the API performs goes through [`NoiseRepository`]. All methods
//! are read-only, return rows in descending time order, and apply the caller's
//! window as a closed `[start, end]` interval. A failed read always surfaces
//! as an error; no method silently returns partial data.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::models::{
    ExtremesRow, LaeqDataRow, LaeqRow, MetricsRow, MqttStatusRow, Series, SortSpec, TodayStats,
};
use crate::models::TimeWindow;

/// Read-only access to the noise-monitoring tables.
///
/// `limit` caps the row count at the query level, after the descending order
/// is applied; `None` means unbounded (the report path reads whole windows and
/// caps at render time instead).
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared across axum handlers.
#[async_trait]
pub trait NoiseRepository: Send + Sync {
    /// Most recent timestamp of a series, or `None` for an empty table.
    ///
    /// Uses the series' own time column (`updated_at` for the status series,
    /// `created_at` everywhere else); `laeq_data` only considers 1-minute
    /// rows, like every other read of that table.
    async fn latest_timestamp(&self, series: Series) -> RepositoryResult<Option<DateTime<Utc>>>;

    /// LAeq samples within `window`, newest first.
    async fn fetch_laeq(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<LaeqRow>>;

    /// 1-minute LAeq samples within `window`, newest first.
    async fn fetch_laeq_data(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<LaeqDataRow>>;

    /// Percentile rows (L10/L50/L90) within `window`, newest first.
    async fn fetch_metrics(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<MetricsRow>>;

    /// Extreme rows (Lmin/Lmax) within `window`, newest first.
    async fn fetch_extremes(
        &self,
        window: TimeWindow,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<ExtremesRow>>;

    /// Connectivity-status rows, optionally windowed on `updated_at`,
    /// filtered by status prefix and sorted by a whitelisted column.
    async fn fetch_mqtt_status(
        &self,
        window: Option<TimeWindow>,
        status_prefix: Option<&str>,
        sort: SortSpec,
        limit: Option<i64>,
    ) -> RepositoryResult<Vec<MqttStatusRow>>;

    /// Single most recent LAeq row, if any.
    async fn latest_laeq(&self) -> RepositoryResult<Option<LaeqRow>>;

    /// Single most recent percentile row, if any.
    async fn latest_metrics(&self) -> RepositoryResult<Option<MetricsRow>>;

    /// Single most recent extremes row, if any.
    async fn latest_extremes(&self) -> RepositoryResult<Option<ExtremesRow>>;

    /// Single most recent status row, if any (by `updated_at`).
    async fn latest_mqtt_status(&self) -> RepositoryResult<Option<MqttStatusRow>>;

    /// Max/min/avg of `laeq.value` for rows at or after `since`.
    async fn today_stats(&self, since: DateTime<Utc>) -> RepositoryResult<TodayStats>;

    /// Whether the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;
}
