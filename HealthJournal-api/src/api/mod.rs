pub mod handlers;
pub mod routes;

use axum::Router;

use health_journal_domain::config::{AnalysisConfig, ConfigError};

/// Create the application router for `config`
///
/// # Errors
///
/// Fails when `config` is internally inconsistent.
pub fn create_application(config: AnalysisConfig) -> Result<Router, ConfigError> {
    let analysis_service = handlers::analysis::create_service(config.clone())?;
    let health_service = handlers::health::create_health_service(config);
    Ok(routes::create_app(analysis_service, health_service))
}
