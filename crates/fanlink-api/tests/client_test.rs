#![allow(clippy::unwrap_used)]
// Integration tests for `FanClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fanlink_api::{CurvePointRecord, Error, FanClient, HistoryRange, LogQuery, SettingsUpdate};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, FanClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = FanClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cpu_temp": 55.5,
            "fan_speed": 900,
            "power": 12,
            "control_mode": "manual",
            "last_update": "2025-03-01T10:00:00+00:00"
        })))
        .mount(&server)
        .await;

    let status = client.get_status().await.unwrap();

    assert_eq!(status.cpu_temp, Some(55.5));
    assert_eq!(status.fan_speed, Some(900.0));
    assert_eq!(status.power, Some(12.0));
    assert_eq!(status.control_mode.as_deref(), Some("manual"));
    assert_eq!(
        status.last_update,
        Some(Some("2025-03-01T10:00:00+00:00".to_string()))
    );
}

// ── Curve ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_curve_with_device_field_names() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/curve"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "points": [
                { "temp": 50, "speed": 15 },
                { "temp": 60, "speed": 15 },
                { "temp": 70, "speed": 20 },
                { "temp": 80, "speed": 40 }
            ]
        })))
        .mount(&server)
        .await;

    let curve = client.get_curve().await.unwrap();

    assert_eq!(curve.points.len(), 4);
    assert_eq!(curve.points[2], CurvePointRecord { x: 70.0, y: 20.0 });
}

#[tokio::test]
async fn test_put_curve_sends_points() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/curve"))
        .and(body_json(json!({
            "points": [{ "x": 30.0, "y": 20.0 }, { "x": 70.0, "y": 100.0 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .put_curve(&[
            CurvePointRecord { x: 30.0, y: 20.0 },
            CurvePointRecord { x: 70.0, y: 100.0 },
        ])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_put_curve_rejected_with_detail() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/curve"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "at least 2 points required" })),
        )
        .mount(&server)
        .await;

    let result = client.put_curve(&[CurvePointRecord { x: 30.0, y: 20.0 }]).await;

    match result {
        Err(Error::Api {
            status, ref detail, ..
        }) => {
            assert_eq!(status, 400);
            assert_eq!(detail.as_deref(), Some("at least 2 points required"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── History ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_history_passes_range() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard/history"))
        .and(query_param("range", "6h"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "time": "2025-03-01T09:00:00", "cpu_temp": 48.0, "fan_speed": 15, "power": 110 },
                { "time": "2025-03-01T09:00:30", "cpu_temp": 49.5, "fan_speed": 15, "power": null }
            ]
        })))
        .mount(&server)
        .await;

    let history = client.get_history(HistoryRange::SixHours).await.unwrap();

    assert_eq!(history.data.len(), 2);
    assert_eq!(history.data[0].power, Some(110.0));
    assert_eq!(history.data[1].power, None);
}

// ── Logs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_logs_with_filters() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .and(query_param("level", "ERROR"))
        .and(query_param("search", "ipmi"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logs": [{
                "time": "2025-03-01 10:00:00,123",
                "level": "ERROR",
                "message": "ipmitool timed out"
            }]
        })))
        .mount(&server)
        .await;

    let query = LogQuery::new().level("ERROR").search("ipmi").limit(20);
    let logs = client.get_logs(&query).await.unwrap();

    assert_eq!(logs.logs.len(), 1);
    assert_eq!(logs.logs[0].message.as_deref(), Some("ipmitool timed out"));
}

// ── Settings ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_settings_round_trip_calls() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip_address": "10.0.0.20",
            "username": "root",
            "password": "******",
            "interval": 30
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/settings"))
        .and(body_json(json!({ "interval": 60 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let settings = client.get_settings().await.unwrap();
    assert_eq!(settings.ip_address, "10.0.0.20");
    assert_eq!(settings.interval, 30);

    let update = SettingsUpdate {
        interval: Some(60),
        ..SettingsUpdate::default()
    };
    client.put_settings(&update).await.unwrap();
}

#[tokio::test]
async fn test_restore_auto() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/dashboard/restore-auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client.restore_auto().await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_without_detail() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client.get_status().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(err.detail().is_none());
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/curve"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.get_curve().await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on port 9 of localhost in CI sandboxes.
    let client = FanClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9").unwrap(),
    );

    let result = client.get_status().await;

    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}
