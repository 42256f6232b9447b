use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, instrument, warn};

use health_journal_domain::config::{AnalysisConfig, ConfigError};
use health_journal_domain::entities::{AnalysisInput, AnalysisOutcome};
use health_journal_domain::services::{AnalysisService, AnalysisServiceTrait};

use crate::entities::common::ErrorResponse;

/// Service type for dependency injection
pub type SharedAnalysisService = Arc<dyn AnalysisServiceTrait + Send + Sync>;

/// Build the engine the handlers run with
///
/// # Errors
///
/// Fails when `config` is internally inconsistent.
pub fn create_service(config: AnalysisConfig) -> Result<SharedAnalysisService, ConfigError> {
    Ok(Arc::new(AnalysisService::new(config)?))
}

/// Analyze a journal snapshot
///
/// Returns the full report, or an `insufficient_data` outcome when no readings
/// were supplied.
#[utoipa::path(
    post,
    path = "/api/v1/analysis",
    request_body = AnalysisInput,
    responses(
        (status = 200, description = "Analysis outcome", body = AnalysisOutcome),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    ),
    tag = "analysis"
)]
#[instrument(skip(service, payload))]
pub async fn analyze(
    State(service): State<SharedAnalysisService>,
    payload: Result<Json<AnalysisInput>, JsonRejection>,
) -> Result<Json<AnalysisOutcome>, ErrorResponse> {
    let Json(input) = payload.map_err(|rejection| {
        warn!("Rejected unreadable analysis request: {}", rejection);
        ErrorResponse::from(rejection)
    })?;

    service.validate_input(&input)?;

    info!(
        readings = input.readings.len(),
        lifestyle_entries = input.cigar_entries.len()
            + input.drink_entries.len()
            + input.cardio_entries.len()
            + input.weight_entries.len()
            + input.event_entries.len(),
        "Running blood pressure analysis"
    );
    Ok(Json(service.analyze(&input)))
}

/// Active analysis configuration
#[utoipa::path(
    get,
    path = "/api/v1/analysis/config",
    responses(
        (status = 200, description = "Thresholds and weights the engine runs with", body = AnalysisConfig)
    ),
    tag = "analysis"
)]
#[instrument(skip(service))]
pub async fn get_analysis_config(State(service): State<SharedAnalysisService>) -> Json<AnalysisConfig> {
    Json(service.config().clone())
}
