//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! repository and service layers; the only logic that lives here is query
//! parsing and response shaping.

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use super::dto::{
    ExportQuery, ExtremesEntry, HealthResponse, LaeqDataEntry, LaeqEntry, ListQuery, MetricsEntry,
    MqttStatusEntry, ReportView, StatusQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::models::{Series, SortSpec};
use crate::models::time::{self, TimeWindow};
use crate::services::dashboard::{build_dashboard_summary, DashboardSummary};
use crate::services::report::{build_report, ReportType};
use crate::services::{render_excel, render_pdf};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Ceiling for a single PDF render; a report that cannot rasterize within
/// this window fails the request instead of pinning a blocking thread.
const PDF_RENDER_TIMEOUT: Duration = Duration::from_secs(120);

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Resolve a listing window from the series' latest timestamp and any
/// explicit bounds. Unparseable bounds are ignored, falling back to the
/// default 24-hour window.
fn listing_window(
    latest: Option<chrono::DateTime<Utc>>,
    query: &ListQuery,
) -> Option<TimeWindow> {
    let start = query.start_date.as_deref().and_then(time::parse_bound);
    let end = query.end_date.as_deref().and_then(time::parse_bound);
    TimeWindow::resolve(latest, start, end, time::listing_lookback())
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let database = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database,
    }))
}

// =============================================================================
// Series Listings
// =============================================================================

/// GET /laeq
///
/// LAeq samples from the last 24 hours of data (or an explicit range),
/// newest first. An empty series is an empty array, not an error.
pub async fn list_laeq(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<Vec<LaeqEntry>> {
    let latest = state
        .repository
        .latest_timestamp(Series::Laeq)
        .await
        .map_err(|e| AppError::repository("Failed to fetch LAeq table data", e))?;
    let Some(window) = listing_window(latest, &query) else {
        return Ok(Json(Vec::new()));
    };

    let rows = state
        .repository
        .fetch_laeq(window, query.limit)
        .await
        .map_err(|e| AppError::repository("Failed to fetch LAeq table data", e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET /laeq-data
///
/// 1-minute samples; defaults to the most recent 60 when no limit is given.
pub async fn list_laeq_data(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<Vec<LaeqDataEntry>> {
    let latest = state
        .repository
        .latest_timestamp(Series::LaeqData)
        .await
        .map_err(|e| AppError::repository("Failed to fetch LAeq data", e))?;
    let Some(window) = listing_window(latest, &query) else {
        return Ok(Json(Vec::new()));
    };

    let limit = Some(query.limit.unwrap_or(60));
    let rows = state
        .repository
        .fetch_laeq_data(window, limit)
        .await
        .map_err(|e| AppError::repository("Failed to fetch LAeq data", e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET /laeq-metrics
pub async fn list_metrics(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<Vec<MetricsEntry>> {
    let latest = state
        .repository
        .latest_timestamp(Series::Metrics)
        .await
        .map_err(|e| AppError::repository("Failed to fetch LAeq metrics data", e))?;
    let Some(window) = listing_window(latest, &query) else {
        return Ok(Json(Vec::new()));
    };

    let rows = state
        .repository
        .fetch_metrics(window, query.limit)
        .await
        .map_err(|e| AppError::repository("Failed to fetch LAeq metrics data", e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET /laeq-lmin-lmax
pub async fn list_extremes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<Vec<ExtremesEntry>> {
    let latest = state
        .repository
        .latest_timestamp(Series::Extremes)
        .await
        .map_err(|e| AppError::repository("Failed to fetch LAeq lmin lmax data", e))?;
    let Some(window) = listing_window(latest, &query) else {
        return Ok(Json(Vec::new()));
    };

    let rows = state
        .repository
        .fetch_extremes(window, query.limit)
        .await
        .map_err(|e| AppError::repository("Failed to fetch LAeq lmin lmax data", e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// GET /mqtt-status
///
/// Connectivity history, windowed on `updated_at`, with optional status
/// prefix filter and whitelisted sorting.
pub async fn list_mqtt_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> HandlerResult<Vec<MqttStatusEntry>> {
    let latest = state
        .repository
        .latest_timestamp(Series::MqttStatus)
        .await
        .map_err(|e| AppError::repository("Failed to fetch MQTT status", e))?;
    let window = latest.map(|l| TimeWindow::new(l - time::listing_lookback(), l));
    let sort = query.sort.as_deref().map(SortSpec::parse).unwrap_or_default();

    let rows = state
        .repository
        .fetch_mqtt_status(window, query.status.as_deref(), sort, query.limit)
        .await
        .map_err(|e| AppError::repository("Failed to fetch MQTT status", e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

// =============================================================================
// Dashboard
// =============================================================================

/// GET /dashboard-summary
pub async fn dashboard_summary(
    State(state): State<AppState>,
) -> HandlerResult<DashboardSummary> {
    let summary = build_dashboard_summary(state.repository.as_ref())
        .await
        .map_err(|e| AppError::repository("Failed to fetch dashboard summary", e))?;
    Ok(Json(summary))
}

// =============================================================================
// Export
// =============================================================================

/// GET /export
///
/// View mode: the assembled report as JSON.
pub async fn view_export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> HandlerResult<ReportView> {
    let report_type = ReportType::parse(query.report_type.as_deref());
    let days = time::coerce_days(query.days.as_deref());

    let report = build_report(state.repository.as_ref(), report_type, days)
        .await
        .map_err(|e| AppError::repository("Failed to fetch data", e))?;
    if report.is_empty() {
        return Err(AppError::NotFound(
            "No data found for the given parameters".to_string(),
        ));
    }

    Ok(Json(ReportView {
        title: report.title.clone(),
        data: report.to_json_rows(),
    }))
}

/// GET /export/export
///
/// Download mode: the same report rendered as a spreadsheet or PDF. The
/// empty-report check runs before format validation, so an empty window is
/// 404 even with a bogus format.
pub async fn download_export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let report_type = ReportType::parse(query.report_type.as_deref());
    let days = time::coerce_days(query.days.as_deref());

    let report = build_report(state.repository.as_ref(), report_type, days)
        .await
        .map_err(|e| AppError::repository("Failed to export data", e))?;
    if report.is_empty() {
        return Err(AppError::NotFound(
            "No data found for the given parameters".to_string(),
        ));
    }

    let date = time::to_local(Utc::now()).format("%Y-%m-%d");
    let filename = format!("noise_report_{}_{}", report_type.slug(), date);

    match query.format.as_deref() {
        Some("excel") => {
            let bytes = tokio::task::spawn_blocking(move || render_excel(&report))
                .await
                .map_err(|e| AppError::internal("Failed to export data", e.to_string()))??;
            Ok(file_response(
                bytes,
                XLSX_CONTENT_TYPE,
                &format!("{filename}.xlsx"),
            ))
        }
        Some("pdf") => {
            let render = tokio::task::spawn_blocking(move || render_pdf(&report));
            let bytes = tokio::time::timeout(PDF_RENDER_TIMEOUT, render)
                .await
                .map_err(|_| {
                    AppError::internal("Failed to export data", "PDF rendering timed out")
                })?
                .map_err(|e| AppError::internal("Failed to export data", e.to_string()))??;
            Ok(file_response(
                bytes,
                "application/pdf",
                &format!("{filename}.pdf"),
            ))
        }
        _ => Err(AppError::BadRequest(
            "Invalid format. Please use \"excel\" or \"pdf\"".to_string(),
        )),
    }
}

fn file_response(bytes: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
