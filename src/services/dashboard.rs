//! Dashboard summary aggregation.
//!
//! One read per series, newest row only, plus a running max/min/avg of the
//! primary series since local midnight. Missing series become explicit
//! fallback objects rather than leaking nulls to the dashboard: connectivity
//! falls back to `Offline`, metric lookups fall back to zero.

use chrono::Utc;
use futures::try_join;
use serde::Serialize;

use crate::db::repository::{NoiseRepository, RepositoryResult};
use crate::models::time;

/// Latest primary reading, widened with the latest percentile and extreme
/// values so the dashboard gets one object to bind against.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatestLaeq {
    pub id: i64,
    pub value: Option<f64>,
    pub created_at: String,
    #[serde(rename = "L10")]
    pub l10: f64,
    #[serde(rename = "L50")]
    pub l50: f64,
    #[serde(rename = "L90")]
    pub l90: f64,
    #[serde(rename = "Lmax")]
    pub lmax: f64,
    #[serde(rename = "Lmin")]
    pub lmin: f64,
}

/// Connectivity marker. The offline fallback serializes to just
/// `{"status":"Offline"}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConnectivityStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ConnectivityStatus {
    fn offline() -> Self {
        ConnectivityStatus {
            id: None,
            status: "Offline".to_string(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatestHourly {
    #[serde(rename = "Lmax")]
    pub lmax: f64,
    #[serde(rename = "Lmin")]
    pub lmin: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LatestRealtime {
    #[serde(rename = "L10")]
    pub l10: f64,
    #[serde(rename = "L50")]
    pub l50: f64,
    #[serde(rename = "L90")]
    pub l90: f64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TodayStatsSummary {
    #[serde(rename = "maxLaeq")]
    pub max_laeq: f64,
    #[serde(rename = "minLaeq")]
    pub min_laeq: f64,
    #[serde(rename = "avgLaeq")]
    pub avg_laeq: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardSummary {
    #[serde(rename = "latestLaeq")]
    pub latest_laeq: Option<LatestLaeq>,
    #[serde(rename = "mqttStatus")]
    pub mqtt_status: ConnectivityStatus,
    #[serde(rename = "latestHourly")]
    pub latest_hourly: Option<LatestHourly>,
    #[serde(rename = "latestRealtime")]
    pub latest_realtime: Option<LatestRealtime>,
    #[serde(rename = "todayStats")]
    pub today_stats: TodayStatsSummary,
}

/// Assemble the dashboard summary from the newest row of each series.
pub async fn build_dashboard_summary(
    repo: &dyn NoiseRepository,
) -> RepositoryResult<DashboardSummary> {
    let since = time::local_midnight_utc(Utc::now());
    let (laeq, mqtt, extremes, metrics, stats) = try_join!(
        repo.latest_laeq(),
        repo.latest_mqtt_status(),
        repo.latest_extremes(),
        repo.latest_metrics(),
        repo.today_stats(since),
    )?;

    let l10 = metrics.as_ref().and_then(|m| m.l10).unwrap_or(0.0);
    let l50 = metrics.as_ref().and_then(|m| m.l50).unwrap_or(0.0);
    let l90 = metrics.as_ref().and_then(|m| m.l90).unwrap_or(0.0);
    let lmin = extremes.as_ref().and_then(|e| e.lmin).unwrap_or(0.0);
    let lmax = extremes.as_ref().and_then(|e| e.lmax).unwrap_or(0.0);

    let latest_laeq = laeq.map(|row| LatestLaeq {
        id: row.id,
        value: row.value,
        created_at: time::format_listing(row.created_at),
        l10,
        l50,
        l90,
        lmax,
        lmin,
    });

    let mqtt_status = mqtt
        .map(|row| ConnectivityStatus {
            id: Some(row.id),
            status: row.status,
            created_at: Some(time::format_listing(row.created_at)),
            updated_at: Some(time::format_listing(row.updated_at)),
        })
        .unwrap_or_else(ConnectivityStatus::offline);

    let latest_hourly = extremes.map(|row| LatestHourly {
        lmax: row.lmax.unwrap_or(0.0),
        lmin: row.lmin.unwrap_or(0.0),
        created_at: time::format_listing(row.created_at),
    });

    let latest_realtime = metrics.map(|row| LatestRealtime {
        l10: row.l10.unwrap_or(0.0),
        l50: row.l50.unwrap_or(0.0),
        l90: row.l90.unwrap_or(0.0),
        created_at: time::format_listing(row.created_at),
    });

    let today_stats = TodayStatsSummary {
        max_laeq: stats.max_laeq.unwrap_or(0.0),
        min_laeq: stats.min_laeq.unwrap_or(0.0),
        avg_laeq: stats.avg_laeq.unwrap_or(0.0),
    };

    Ok(DashboardSummary {
        latest_laeq,
        mqtt_status,
        latest_hourly,
        latest_realtime,
        today_stats,
    })
}
