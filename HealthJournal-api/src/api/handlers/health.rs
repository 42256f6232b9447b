use std::collections::BTreeMap;
use std::sync::{Arc, Once};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use health_journal_domain::config::AnalysisConfig;
use health_journal_domain::health::{ComponentStatus, HealthService, HealthServiceTrait, SystemStatus};

/// Shared handle to the health service
pub type SharedHealthService = Arc<dyn HealthServiceTrait + Send + Sync>;

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Current service status ("ok", "degraded", or "error")
    pub status: String,
    /// Application version from the Cargo manifest
    pub version: String,
    /// Unix timestamp of when the response was generated
    pub timestamp: u64,
    /// Uptime of the service in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    /// Status of each checked component, keyed by name
    pub components: BTreeMap<String, ComponentHealthStatus>,
    pub environment: String,
}

/// Health status for an individual component
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    /// Status of the component ("ok", "degraded", or "error")
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time used for uptime reporting
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let _ = SERVER_START_TIME.set(unix_now());
    });
}

/// Health check endpoint
///
/// Runs a smoke analysis through the configured engine.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 500, description = "Analysis engine is misconfigured", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service))]
pub async fn health_check(Extension(health_service): Extension<SharedHealthService>) -> impl IntoResponse {
    info!("Health check requested");

    let now = unix_now();
    let uptime = SERVER_START_TIME.get().map(|&start| now.saturating_sub(start));
    let system_health = health_service.get_system_health().await;

    let components = system_health
        .components
        .iter()
        .map(|(name, component)| {
            (
                name.clone(),
                ComponentHealthStatus {
                    status: map_component_status(&component.status).to_string(),
                    message: component.details.clone(),
                },
            )
        })
        .collect();

    let (status_code, status) = match system_health.status {
        SystemStatus::Healthy => (StatusCode::OK, "ok"),
        SystemStatus::Degraded => (StatusCode::SERVICE_UNAVAILABLE, "degraded"),
        SystemStatus::Unhealthy => (StatusCode::INTERNAL_SERVER_ERROR, "error"),
    };
    if status_code != StatusCode::OK {
        warn!(status, "Health check reports a problem");
    }

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components,
        environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
    };

    (status_code, Json(response))
}

fn map_component_status(status: &ComponentStatus) -> &'static str {
    match status {
        ComponentStatus::Healthy => "ok",
        ComponentStatus::Degraded => "degraded",
        ComponentStatus::Unhealthy => "error",
    }
}

/// Health service checking the engine built from `config`
pub fn create_health_service(config: AnalysisConfig) -> SharedHealthService {
    Arc::new(HealthService::new(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use health_journal_domain::testing::MockHealthService;

    async fn call(service: SharedHealthService) -> (StatusCode, HealthResponse) {
        let response = health_check(Extension(service)).await.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_ok() {
        initialize_server_start_time();
        let (status, body) = call(Arc::new(MockHealthService::new())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.components["analysis_engine"].status, "ok");
        assert!(body.uptime.is_some());
    }

    #[tokio::test]
    async fn test_health_check_degraded() {
        let (status, body) = call(Arc::new(MockHealthService::new().with_degraded_engine())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.components["analysis_engine"].status, "degraded");
        assert!(body.components["analysis_engine"].message.is_some());
    }

    #[tokio::test]
    async fn test_health_check_unhealthy_with_extra_component() {
        let service = MockHealthService::new()
            .with_unhealthy_engine()
            .with_component("cache", ComponentStatus::Healthy, None);
        let (status, body) = call(Arc::new(service)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.status, "error");
        assert_eq!(body.components.len(), 2);
        assert_eq!(body.components["cache"].status, "ok");
    }

    #[tokio::test]
    async fn test_real_health_service_with_default_config() {
        let (status, body) = call(create_health_service(AnalysisConfig::default())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
    }
}
