//! Integration tests for the Sensi API.
//!
//! Exercises the full HTTP surface against isolated temp-dir stores.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use sensi_api::{
    routes::{build_all_routes_with_state, ErrorResponse, ListPresetsResponse},
    with_middleware, AppState, DeviceCatalog, DeviceLookup, Preset, PresetStore,
};
use sensi_common::Config;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// Test helper to create a router over a temp preset file and the built-in
/// device catalog (no completion provider).
fn create_test_app(temp_dir: &TempDir) -> axum::Router {
    let state = AppState {
        presets: Arc::new(PresetStore::new(temp_dir.path().join("presets.json"))),
        devices: Arc::new(DeviceLookup::new(DeviceCatalog::builtin())),
    };
    with_middleware(build_all_routes_with_state(state), &Config::default())
}

/// Helper to make a request and get JSON response.
async fn request_json<T: serde::de::DeserializeOwned>(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, T) {
    let (status, bytes) = request_raw(app, method, uri, body).await;
    let json: T = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

async fn request_raw(
    app: &axum::Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>) {
    let request = Request::builder().method(method).uri(uri);

    let request = if let Some(b) = body {
        request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap()
    } else {
        request.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();

    (status, body.to_vec())
}

// ─────────────────────────────────────────────────────────────────────────────
// Health Check Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_check() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    for uri in ["/health", "/api/v1/health"] {
        let (status, json): (_, Value) = request_json(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "sensi-api");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Calculation Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_calculate_from_raw_form() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, json): (_, Value) = request_json(
        &app,
        Method::POST,
        "/api/v1/calculate",
        Some(json!({
            "platform": "iOS",
            "playstyle": "balanced",
            "pingLevel": "medium",
            "screenSize": "6.7",
            "refreshRate": 60
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json["sensitivities"],
        json!({
            "general": 143,
            "redDot": 130,
            "scope2x": 122,
            "scope4x": 107,
            "awmScope": 80,
            "freeLook": 101
        })
    );
    assert_eq!(json["input"]["platform"], "ios");
    assert!(json.get("explanation").is_none());
}

#[tokio::test]
async fn test_calculate_with_explanation() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, json): (_, Value) = request_json(
        &app,
        Method::POST,
        "/api/v1/calculate",
        Some(json!({ "playstyle": "sniper", "refreshRate": 120, "explain": true })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let text = json["explanation"].as_str().unwrap();
    assert!(text.contains("High refresh rate (120 Hz)"));
    let general = json["sensitivities"]["general"].as_u64().unwrap();
    assert!(text.contains(&format!("General: {general}")));
}

#[tokio::test]
async fn test_calculate_rejects_unknown_playstyle() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, json): (_, ErrorResponse) = request_json(
        &app,
        Method::POST,
        "/api/v1/calculate",
        Some(json!({ "playstyle": "camper" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json.code, "INVALID_INPUT");
    assert!(json.error.contains("camper"));
}

#[tokio::test]
async fn test_explain_returns_sections() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, json): (_, Value) = request_json(
        &app,
        Method::POST,
        "/api/v1/explain",
        Some(json!({
            "input": { "platform": "android", "dpi": 500 },
            "result": {
                "general": 150, "redDot": 140, "scope2x": 130,
                "scope4x": 120, "awmScope": 90, "freeLook": 110
            }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let sections = json["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 6);
    assert_eq!(sections[0]["title"], "Device");
    assert!(sections[0]["body"].as_str().unwrap().contains("high-density"));
    assert!(json["text"].as_str().unwrap().contains("AWM Scope: 90"));
}

#[tokio::test]
async fn test_explain_rejects_out_of_range_result() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, json): (_, ErrorResponse) = request_json(
        &app,
        Method::POST,
        "/api/v1/explain",
        Some(json!({
            "result": {
                "general": 0, "redDot": 140, "scope2x": 130,
                "scope4x": 120, "awmScope": 90, "freeLook": 110
            }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json.code, "INVALID_INPUT");
}

// ─────────────────────────────────────────────────────────────────────────────
// Preset Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_preset_crud() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, created): (_, Preset) = request_json(
        &app,
        Method::POST,
        "/api/v1/presets",
        Some(json!({
            "name": "Ranked",
            "device": "Poco X3 Pro",
            "input": { "platform": "android", "playstyle": "rusher", "dpi": 440 }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.name, "Ranked");
    assert_eq!(created.dpi, Some(440));

    let (status, list): (_, ListPresetsResponse) =
        request_json(&app, Method::GET, "/api/v1/presets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.total, 1);
    assert_eq!(list.presets[0].id, created.id);

    let uri = format!("/api/v1/presets/{}", created.id);
    let (status, fetched): (_, Preset) = request_json(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, body) = request_raw(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, json): (_, ErrorResponse) = request_json(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json.code, "NOT_FOUND");

    let (status, _): (_, ErrorResponse) = request_json(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_preset_keeps_supplied_sensitivities() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let sensitivities = json!({
        "general": 180, "redDot": 170, "scope2x": 160,
        "scope4x": 150, "awmScope": 100, "freeLook": 175
    });
    let (status, created): (_, Value) = request_json(
        &app,
        Method::POST,
        "/api/v1/presets",
        Some(json!({ "name": "custom", "sensitivities": sensitivities })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["sensitivities"], sensitivities);
    assert!(created["createdAt"].is_string());
}

#[tokio::test]
async fn test_preset_requires_name() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, json): (_, ErrorResponse) = request_json(
        &app,
        Method::POST,
        "/api/v1/presets",
        Some(json!({ "name": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json.code, "INVALID_INPUT");
}

// ─────────────────────────────────────────────────────────────────────────────
// Device Lookup Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_device_lookup_hit() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, json): (_, Value) = request_json(
        &app,
        Method::GET,
        "/api/v1/devices/lookup?name=poco%20x3%20pro",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["found"], true);
    assert_eq!(json["device"]["name"], "Poco X3 Pro");
    assert_eq!(json["device"]["defaultDpi"], 440);
    assert_eq!(json["device"]["platform"], "android");
}

#[tokio::test]
async fn test_device_lookup_miss() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, json): (_, Value) = request_json(
        &app,
        Method::GET,
        "/api/v1/devices/lookup?name=Imaginary%20Phone%209000",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "found": false }));
}

#[tokio::test]
async fn test_device_lookup_requires_name() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let (status, json): (_, ErrorResponse) =
        request_json(&app, Method::GET, "/api/v1/devices/lookup", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json.code, "INVALID_INPUT");
}

// ─────────────────────────────────────────────────────────────────────────────
// Middleware Tests
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_oversized_body_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let padding = "x".repeat(sensi_api::MAX_BODY_BYTES + 1);
    let (status, _) = request_raw(
        &app,
        Method::POST,
        "/api/v1/calculate",
        Some(json!({ "platform": "ios", "padding": padding })),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_responses_carry_a_generated_trace_id() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let trace_id = response
        .headers()
        .get(sensi_api::TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    let parsed = uuid::Uuid::parse_str(trace_id).unwrap();
    assert_eq!(parsed.get_version_num(), 4);
}

#[tokio::test]
async fn test_caller_trace_id_is_echoed() {
    let temp_dir = TempDir::new().unwrap();
    let app = create_test_app(&temp_dir);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/calculate")
        .header(header::CONTENT_TYPE, "application/json")
        .header(sensi_api::TRACE_ID_HEADER, "client-run-42")
        .body(Body::from(json!({ "platform": "ios" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(sensi_api::TRACE_ID_HEADER).unwrap(),
        "client-run-42"
    );
}
