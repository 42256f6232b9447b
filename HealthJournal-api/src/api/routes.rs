use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::api::handlers::analysis::{self, SharedAnalysisService};
use crate::api::handlers::health::{self, SharedHealthService};
use crate::openapi::configure_swagger_routes;

/// Create the application router around the given services
pub fn create_app(analysis_service: SharedAnalysisService, health_service: SharedHealthService) -> Router {
    debug!("Creating application router");

    let api_routes = Router::new()
        .route("/analysis", post(analysis::analyze))
        .route("/analysis/config", get(analysis::get_analysis_config))
        .with_state(analysis_service);

    debug!("API routes configured");

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service));

    let app = Router::new().merge(public_routes).nest("/api/v1", api_routes);

    let app = add_swagger_ui(app);
    debug!("Swagger UI merged");

    health::initialize_server_start_time();

    app.layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive())
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
