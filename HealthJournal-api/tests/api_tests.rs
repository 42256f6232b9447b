use std::sync::Once;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use health_journal_api::api::create_application;
use chrono::{Duration, Utc};
use health_journal_domain::config::{AnalysisConfig, BodyConfig};
use health_journal_domain::entities::AnalysisInput;
use health_journal_domain::testing::{cardio_at, cigar_at, daily_readings, drinks_at, weight_at};

static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn app() -> Router {
    initialize();
    create_application(AnalysisConfig::default()).unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty)).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn reading(id: &str, day: u32, systolic: u16, diastolic: u16) -> Value {
    json!({
        "id": id,
        "systolic": systolic,
        "diastolic": diastolic,
        "heart_rate": 70,
        "timestamp": format!("2024-05-{:02}T08:00:00Z", day),
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(app(), Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["analysis_engine"]["status"], "ok");
}

#[tokio::test]
async fn test_analysis_without_readings_is_insufficient() {
    let (status, body) = send(app(), Method::POST, "/api/v1/analysis", Some(json!({}).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "insufficient_data");
    assert!(body["report"].is_null());
}

#[tokio::test]
async fn test_analysis_returns_complete_report() {
    let payload = json!({
        "readings": [
            reading("a", 3, 128, 84),
            reading("b", 1, 120, 80),
            reading("c", 2, 124, 82),
        ],
        "cigar_entries": [
            { "count": 1, "timestamp": "2024-05-02T19:00:00Z" }
        ],
    });
    let (status, body) = send(app(), Method::POST, "/api/v1/analysis", Some(payload.to_string())).await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["status"], "complete");
    let report = &body["report"];
    assert_eq!(report["summary"]["reading_count"], 3);
    assert_eq!(report["trend_analysis"]["systolic"]["direction"], "increasing");
    assert!(report["personalized_recommendations"].as_array().is_some_and(|recs| !recs.is_empty()));
}

#[tokio::test]
async fn test_lifestyle_logs_round_trip_through_the_endpoint() {
    let today = Utc::now();
    let input = AnalysisInput {
        cigar_entries: vec![cigar_at(today - Duration::days(1), 2)],
        drink_entries: vec![drinks_at(today - Duration::days(2), 4)],
        cardio_entries: vec![cardio_at(today, 40)],
        weight_entries: vec![weight_at(today - Duration::days(3), 181.0), weight_at(today, 180.0)],
        ..AnalysisInput::from_readings(daily_readings(today, &[(126, 82), (131, 85), (138, 89), (124, 80)]))
    };
    let payload = serde_json::to_string(&input).unwrap();
    let (status, body) = send(app(), Method::POST, "/api/v1/analysis", Some(payload)).await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    let lifestyle = &body["report"]["lifestyle_correlation"];
    assert_eq!(lifestyle["smoking"]["status"], "analyzed");
    assert_eq!(lifestyle["alcohol"]["heavy"]["status"], "analyzed");
    assert_eq!(lifestyle["cardio"]["total_minutes"], 40);
    assert_eq!(lifestyle["weight"]["status"], "analyzed");
}

#[tokio::test]
async fn test_out_of_range_reading_is_rejected() {
    let payload = json!({ "readings": [reading("a", 1, 120, 80), reading("b", 2, 350, 80)] });
    let (status, body) = send(app(), Method::POST, "/api/v1/analysis", Some(payload.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    let details = body["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d.as_str().unwrap_or_default().starts_with("readings[1].systolic")));
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (status, body) = send(app(), Method::POST, "/api/v1/analysis", Some("{\"readings\": [".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_config_endpoint() {
    let (status, body) = send(app(), Method::GET, "/api/v1/analysis/config", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["body"]["height_m"], 1.83);
    assert_eq!(body["utc_offset_minutes"], 0);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let (status, body) = send(app(), Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/analysis"]["post"].is_object());
}

#[test]
fn test_invalid_config_is_refused() {
    let config = AnalysisConfig {
        body: BodyConfig {
            height_m: 0.0,
            ..BodyConfig::default()
        },
        ..AnalysisConfig::default()
    };
    assert!(create_application(config).is_err());
}
