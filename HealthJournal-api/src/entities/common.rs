use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use health_journal_domain::services::AnalysisServiceError;

/// Error body returned by every endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// One entry per problem found, when there is more than one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ErrorResponse {
    /// Input failed validation
    pub fn validation_error(message: &str, details: Option<Vec<String>>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// The request body could not be read
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.error.as_str() {
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<AnalysisServiceError> for ErrorResponse {
    fn from(err: AnalysisServiceError) -> Self {
        match err {
            AnalysisServiceError::ValidationError(problems) => {
                let details: Vec<String> = problems.split("; ").map(str::to_string).collect();
                Self::validation_error("The analysis request is invalid", Some(details))
            }
            AnalysisServiceError::InvalidConfig(_) => Self::internal_error(),
        }
    }
}

impl From<JsonRejection> for ErrorResponse {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(&rejection.body_text())
    }
}
