#![allow(clippy::unwrap_used)]
// Fetch/save envelope tests for `ResourceStore` against wiremock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fanlink_api::FanClient;
use fanlink_core::{
    ControlMode, CoreError, CurvePoint, ErrorKey, HistoryRange, LogQuery, Resource, ResourceStore,
    Status, Tracking,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Arc<ResourceStore>) {
    let server = MockServer::start().await;
    let client = FanClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    (server, Arc::new(ResourceStore::new(client)))
}

fn log_lines(n: usize) -> serde_json::Value {
    let logs: Vec<_> = (0..n)
        .map(|i| json!({ "time": "2025-03-01 10:00:00,000", "level": "INFO", "message": format!("line {i}") }))
        .collect();
    json!({ "logs": logs })
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_status_replaces_whole_status() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cpu_temp": 62.5,
            "fan_speed": 30,
            "power": 145,
            "control_mode": "manual",
            "last_update": "2025-03-01T10:00:00"
        })))
        .mount(&server)
        .await;

    let status = store.fetch_status().await.unwrap();

    assert_eq!(status.control_mode, ControlMode::Manual);
    assert!(status.last_update.is_some());
    assert_eq!(*store.status(), status);
    assert_eq!(store.tracking(), Tracking::default());
}

#[tokio::test]
async fn restore_auto_control_flips_mode() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cpu_temp": 70, "fan_speed": 60, "power": 180, "control_mode": "manual", "last_update": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dashboard/restore-auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    store.fetch_status().await.unwrap();
    store.restore_auto_control().await.unwrap();

    let status = store.status();
    assert_eq!(status.control_mode, ControlMode::Auto);
    assert_eq!(
        *status,
        Status {
            cpu_temp: 70.0,
            fan_speed: 60.0,
            power: 180.0,
            control_mode: ControlMode::Auto,
            last_update: None,
        }
    );
}

// ── Curve ───────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_curve_accepts_device_field_names() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/curve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "points": [{ "temp": 50, "speed": 15 }, { "temp": 80, "speed": 40 }]
        })))
        .mount(&server)
        .await;

    let points = store.fetch_curve().await.unwrap();

    assert_eq!(points, vec![CurvePoint::new(50.0, 15.0), CurvePoint::new(80.0, 40.0)]);
    assert_eq!(*store.curve(), points);
}

#[tokio::test]
async fn save_curve_mirrors_submitted_points() {
    let (server, store) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/curve"))
        .and(body_json(json!({
            "points": [{ "x": 30.0, "y": 20.0 }, { "x": 70.0, "y": 100.0 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let points = vec![CurvePoint::new(30.0, 20.0), CurvePoint::new(70.0, 100.0)];
    store.save_curve(points.clone()).await.unwrap();

    assert_eq!(*store.curve(), points);
    assert!(!store.is_loading(Resource::Curve));
    assert_eq!(store.error(ErrorKey::Curve), None);
}

#[tokio::test]
async fn rejected_save_keeps_previous_curve() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/curve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "points": [{ "x": 40, "y": 25 }, { "x": 75, "y": 90 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/curve"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "at least 2 points required" })),
        )
        .mount(&server)
        .await;

    let before = store.fetch_curve().await.unwrap();
    let err = store
        .save_curve(vec![CurvePoint::new(30.0, 20.0)])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Request { resource: Resource::Curve, status: Some(400), .. }
    ));
    assert_eq!(*store.curve(), before);
    assert_eq!(
        store.error(ErrorKey::Curve).as_deref(),
        Some("at least 2 points required")
    );
}

// ── History ─────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_history_defaults_to_one_hour() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/history"))
        .and(query_param("range", "1h"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "time": "2025-03-01T09:00:00", "cpu_temp": 48.0, "fan_speed": 15, "power": 110 },
                { "time": "2025-03-01T09:00:30", "cpu_temp": 49.5, "fan_speed": 15, "power": null }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let samples = store.fetch_history(None).await.unwrap();

    assert_eq!(samples.len(), 2);
    assert_eq!(samples[1].power, None);
    assert_eq!(store.history().len(), 2);
    assert_eq!(store.history_range(), HistoryRange::OneHour);
}

#[tokio::test]
async fn failed_history_records_detail_and_clears_loading() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/history"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "range out of bounds" })),
        )
        .mount(&server)
        .await;

    let err = store.fetch_history(HistoryRange::Week).await.unwrap_err();

    assert_eq!(err.to_string(), "range out of bounds");
    assert_eq!(
        store.error(ErrorKey::History).as_deref(),
        Some("range out of bounds")
    );
    assert!(!store.is_loading(Resource::History));
    assert!(store.history().is_empty());
    // Other resources untouched.
    assert_eq!(store.error(ErrorKey::Status), None);
    assert_eq!(store.error(ErrorKey::Curve), None);
}

// ── Logs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_logs_replaces_buffer_beyond_capacity() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("limit", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(log_lines(250)))
        .mount(&server)
        .await;

    let entries = store.fetch_logs(&LogQuery::new().limit(250)).await.unwrap();

    assert_eq!(entries.len(), 250);
    assert_eq!(store.logs().len(), 250);
    assert_eq!(
        store.logs().newest().and_then(|e| e.message.as_deref()),
        Some("line 0")
    );
}

#[tokio::test]
async fn server_error_without_detail_uses_status_line() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = store.fetch_logs(&LogQuery::new()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(store.error(ErrorKey::Logs).as_deref(), Some("HTTP 500"));

    store.clear_error(ErrorKey::Logs);
    assert_eq!(store.error(ErrorKey::Logs), None);
}

#[tokio::test]
async fn malformed_body_uses_fallback_message() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    store.fetch_logs(&LogQuery::new()).await.unwrap_err();

    assert_eq!(
        store.error(ErrorKey::Logs).as_deref(),
        Some("Failed to fetch logs")
    );
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn loading_is_raised_while_in_flight() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/curve"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "points": [] }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let mut tracking = store.subscribe_tracking();
    let task = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.fetch_curve().await }
    });

    let raised = tracking.changed().await.unwrap();
    assert!(raised.curve.loading);
    assert!(!raised.status.loading);

    task.await.unwrap().unwrap();
    assert!(!store.is_loading(Resource::Curve));
}

#[tokio::test]
async fn superseded_response_does_not_overwrite_latest() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/history"))
        .and(query_param("range", "7d"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [{ "cpu_temp": 1.0 }, { "cpu_temp": 2.0 }, { "cpu_temp": 3.0 }] }))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/history"))
        .and(query_param("range", "6h"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [{ "cpu_temp": 9.0 }] })))
        .mount(&server)
        .await;

    let slow = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.fetch_history(HistoryRange::Week).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let fast = store.fetch_history(HistoryRange::SixHours).await.unwrap();
    assert_eq!(fast.len(), 1);

    // The slow caller still gets its own data...
    let slow = slow.await.unwrap().unwrap();
    assert_eq!(slow.len(), 3);
    // ...but the store keeps the latest request's result.
    assert_eq!(store.history().len(), 1);
    assert_eq!(store.history_range(), HistoryRange::SixHours);
    assert!(!store.is_loading(Resource::History));
}

#[tokio::test]
async fn superseded_failure_leaves_error_slot_alone() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/history"))
        .and(query_param("range", "24h"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(json!({ "detail": "database busy" }))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/history"))
        .and(query_param("range", "1h"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let slow = tokio::spawn({
        let store = Arc::clone(&store);
        async move { store.fetch_history(HistoryRange::Day).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    store.fetch_history(HistoryRange::OneHour).await.unwrap();

    let err = slow.await.unwrap().unwrap_err();
    assert_eq!(err.user_message(), "database busy");
    assert_eq!(store.error(ErrorKey::History), None);
}

#[tokio::test]
async fn clear_all_errors_nulls_every_slot() {
    let (server, store) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "detail": "down" })))
        .mount(&server)
        .await;

    store.fetch_status().await.unwrap_err();
    store.fetch_curve().await.unwrap_err();
    store.fetch_history(None).await.unwrap_err();
    store.fetch_logs(&LogQuery::new()).await.unwrap_err();
    assert_eq!(store.tracking().errors().len(), 4);

    store.clear_error(ErrorKey::Curve);
    assert_eq!(store.error(ErrorKey::Curve), None);
    assert_eq!(store.error(ErrorKey::Status).as_deref(), Some("down"));

    store.clear_all_errors();
    assert_eq!(store.tracking(), Tracking::default());
}
