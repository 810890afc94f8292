//! End-to-end handler tests against the in-memory repository.
//!
//! These drive the axum handlers directly, so they exercise query parsing,
//! window resolution, repository reads and response shaping together.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};

use noise_monitor::db::models::{ExtremesRow, LaeqDataRow, LaeqRow, MetricsRow, MqttStatusRow};
use noise_monitor::db::repositories::LocalRepository;
use noise_monitor::db::repository::NoiseRepository;
use noise_monitor::http::dto::{ExportQuery, ListQuery, StatusQuery};
use noise_monitor::http::{handlers, AppError, AppState};
use noise_monitor::models::time::parse_bound;

use chrono::{DateTime, Utc};

fn utc(s: &str) -> DateTime<Utc> {
    parse_bound(s).expect("test timestamp")
}

fn state_with(repo: LocalRepository) -> AppState {
    AppState::new(Arc::new(repo) as Arc<dyn NoiseRepository>)
}

fn laeq(id: i64, value: f64, ts: &str) -> LaeqRow {
    LaeqRow {
        id,
        value: Some(value),
        created_at: utc(ts),
    }
}

// =========================================================
// Series Listings
// =========================================================

#[tokio::test]
async fn laeq_listing_defaults_to_last_day_of_data() {
    let repo = LocalRepository::new();
    repo.insert_laeq(laeq(1, 50.0, "2024-06-10 12:00:00"));
    // 36 hours before the latest row; outside the default window.
    repo.insert_laeq(laeq(2, 60.0, "2024-06-09 00:00:00"));

    let state = state_with(repo);
    let entries = handlers::list_laeq(State(state), Query(ListQuery::default()))
        .await
        .unwrap()
        .0;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, 1);
    // Stored UTC, presented at +08:00.
    assert_eq!(entries[0].created_at, "2024-06-10 20:00:00");
}

#[tokio::test]
async fn empty_series_lists_as_empty_array() {
    let state = state_with(LocalRepository::new());
    let entries = handlers::list_laeq(State(state), Query(ListQuery::default()))
        .await
        .unwrap()
        .0;
    assert!(entries.is_empty());
}

#[tokio::test]
async fn laeq_null_reading_presents_as_zero() {
    let repo = LocalRepository::new();
    repo.insert_laeq(LaeqRow {
        id: 1,
        value: None,
        created_at: utc("2024-06-10 12:00:00"),
    });

    let state = state_with(repo);
    let entries = handlers::list_laeq(State(state), Query(ListQuery::default()))
        .await
        .unwrap()
        .0;
    assert_eq!(entries[0].value, 0.0);
}

#[tokio::test]
async fn explicit_bounds_override_the_default_window() {
    let repo = LocalRepository::new();
    repo.insert_laeq(laeq(1, 50.0, "2024-06-10 12:00:00"));
    repo.insert_laeq(laeq(2, 60.0, "2024-06-05 12:00:00"));

    let query = ListQuery {
        start_date: Some("2024-06-05 00:00:00".to_string()),
        ..ListQuery::default()
    };
    let state = state_with(repo);
    let entries = handlers::list_laeq(State(state), Query(query))
        .await
        .unwrap()
        .0;
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn minute_listing_defaults_to_sixty_rows() {
    let repo = LocalRepository::new();
    for i in 0..70 {
        repo.insert_laeq_data(LaeqDataRow {
            id: i + 1,
            value: Some(45.0),
            sample_type: "1m".to_string(),
            created_at: utc("2024-06-10 10:00:00") + chrono::Duration::minutes(i),
        });
    }

    let state = state_with(repo);
    let entries = handlers::list_laeq_data(State(state), Query(ListQuery::default()))
        .await
        .unwrap()
        .0;
    assert_eq!(entries.len(), 60);
}

#[tokio::test]
async fn minute_listing_serves_only_minute_samples() {
    let repo = LocalRepository::new();
    repo.insert_laeq_data(LaeqDataRow {
        id: 1,
        value: Some(45.0),
        sample_type: "1m".to_string(),
        created_at: utc("2024-06-10 10:00:00"),
    });
    repo.insert_laeq_data(LaeqDataRow {
        id: 2,
        value: Some(46.0),
        sample_type: "1h".to_string(),
        created_at: utc("2024-06-10 11:00:00"),
    });

    let state = state_with(repo);
    let entries = handlers::list_laeq_data(State(state), Query(ListQuery::default()))
        .await
        .unwrap()
        .0;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].sample_type, "1m");
    assert_eq!(entries[0].laeq, Some(45.0));
}

#[tokio::test]
async fn metrics_and_extremes_listings_zero_null_fields() {
    let repo = LocalRepository::new();
    repo.insert_metrics(MetricsRow {
        id: 1,
        l10: Some(55.0),
        l50: None,
        l90: Some(40.0),
        created_at: utc("2024-06-10 12:00:00"),
    });
    repo.insert_extremes(ExtremesRow {
        id: 2,
        lmin: None,
        lmax: Some(72.0),
        created_at: utc("2024-06-10 12:00:00"),
    });

    let state = state_with(repo);
    let metrics = handlers::list_metrics(State(state.clone()), Query(ListQuery::default()))
        .await
        .unwrap()
        .0;
    assert_eq!(metrics[0].l50, 0.0);
    assert_eq!(metrics[0].l10, 55.0);

    let extremes = handlers::list_extremes(State(state), Query(ListQuery::default()))
        .await
        .unwrap()
        .0;
    assert_eq!(extremes[0].lmin, 0.0);
    assert_eq!(extremes[0].lmax, 72.0);
}

#[tokio::test]
async fn status_listing_filters_by_prefix_and_sorts() {
    let repo = LocalRepository::new();
    for (id, status, ts) in [
        (1, "Online", "2024-06-10 10:00:00"),
        (2, "Offline", "2024-06-10 11:00:00"),
        (3, "Online-backup", "2024-06-10 12:00:00"),
    ] {
        repo.insert_mqtt_status(MqttStatusRow {
            id,
            status: status.to_string(),
            created_at: utc(ts),
            updated_at: utc(ts),
        });
    }

    let query = StatusQuery {
        status: Some("On".to_string()),
        sort: Some("updated_at,ASC".to_string()),
        ..StatusQuery::default()
    };
    let state = state_with(repo);
    let entries = handlers::list_mqtt_status(State(state), Query(query))
        .await
        .unwrap()
        .0;
    let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

// =========================================================
// Dashboard
// =========================================================

#[tokio::test]
async fn dashboard_summary_serves_fallbacks_for_an_empty_store() {
    let state = state_with(LocalRepository::new());
    let summary = handlers::dashboard_summary(State(state)).await.unwrap().0;

    assert!(summary.latest_laeq.is_none());
    assert_eq!(summary.mqtt_status.status, "Offline");
    assert_eq!(summary.today_stats.max_laeq, 0.0);
}

// =========================================================
// Export
// =========================================================

#[tokio::test]
async fn export_view_returns_title_and_filled_rows() {
    let repo = LocalRepository::new();
    repo.insert_laeq(laeq(1, 52.0, "2024-06-10 10:00:00"));
    repo.insert_metrics(MetricsRow {
        id: 2,
        l10: Some(55.0),
        l50: Some(50.0),
        l90: Some(45.0),
        created_at: utc("2024-06-10 12:00:00"),
    });

    let state = state_with(repo);
    let view = handlers::view_export(State(state), Query(ExportQuery::default()))
        .await
        .unwrap()
        .0;

    assert_eq!(view.title, "Complete Sound Level Report");
    assert_eq!(view.data.len(), 2);
    // Older row picks up the newer percentiles through the gap-fill.
    assert_eq!(view.data[1]["laeq"], "52.00");
    assert_eq!(view.data[1]["L10"], "55.00");
}

#[tokio::test]
async fn export_view_is_404_when_the_window_is_empty() {
    let state = state_with(LocalRepository::new());
    let err = handlers::view_export(State(state), Query(ExportQuery::default()))
        .await
        .err()
        .expect("empty export should fail");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn export_days_coercion_treats_garbage_as_one_day() {
    let repo = LocalRepository::new();
    repo.insert_laeq(laeq(1, 52.0, "2024-06-10 12:00:00"));
    repo.insert_laeq(laeq(2, 53.0, "2024-06-07 12:00:00"));
    let state = state_with(repo);

    for days in [None, Some("abc".to_string()), Some("0".to_string())] {
        let query = ExportQuery {
            report_type: Some("laeq".to_string()),
            days,
            format: None,
        };
        let view = handlers::view_export(State(state.clone()), Query(query))
            .await
            .unwrap()
            .0;
        assert_eq!(view.data.len(), 1);
    }
}

#[tokio::test]
async fn export_download_rejects_unknown_formats() {
    let repo = LocalRepository::new();
    repo.insert_laeq(laeq(1, 52.0, "2024-06-10 12:00:00"));

    let query = ExportQuery {
        format: Some("csv".to_string()),
        ..ExportQuery::default()
    };
    let state = state_with(repo);
    let err = handlers::download_export(State(state), Query(query))
        .await
        .err()
        .expect("unknown format should fail");
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn export_download_prefers_404_over_format_validation() {
    let query = ExportQuery {
        format: Some("csv".to_string()),
        ..ExportQuery::default()
    };
    let state = state_with(LocalRepository::new());
    let err = handlers::download_export(State(state), Query(query))
        .await
        .err()
        .expect("empty export should fail");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn export_download_excel_streams_a_workbook() {
    let repo = LocalRepository::new();
    repo.insert_laeq(laeq(1, 52.0, "2024-06-10 12:00:00"));

    let query = ExportQuery {
        report_type: Some("laeq".to_string()),
        days: None,
        format: Some("excel".to_string()),
    };
    let state = state_with(repo);
    let response = handlers::download_export(State(state), Query(query))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(disposition.contains("noise_report_laeq_"));
    assert!(disposition.ends_with(".xlsx\""));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..2], b"PK");
}

#[tokio::test]
async fn export_download_pdf_streams_a_document() {
    let repo = LocalRepository::new();
    repo.insert_laeq(laeq(1, 52.0, "2024-06-10 12:00:00"));

    let query = ExportQuery {
        report_type: Some("laeq".to_string()),
        days: None,
        format: Some("pdf".to_string()),
    };
    let state = state_with(repo);
    let response = handlers::download_export(State(state), Query(query))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/pdf")
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..5], b"%PDF-");
}
