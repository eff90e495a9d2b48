//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use overlayhub_protocols::error::{AnalysisError, CommandError, HubError};

/// Errors surfaced by the HTTP API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Hub(#[from] HubError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Command(CommandError::SecurityRejection { .. }) => StatusCode::FORBIDDEN,
            Self::Command(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Analysis(AnalysisError::Unsupported(_)) => StatusCode::BAD_REQUEST,
            Self::Analysis(_) => StatusCode::BAD_GATEWAY,
            Self::Hub(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Command(e) => e.code(),
            Self::Analysis(_) => "ANALYSIS_ERROR",
            Self::Hub(e) => e.code(),
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::NotFound(_) => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errors = match &self {
            Self::Command(e) => e.messages(),
            other => vec![other.to_string()],
        };
        let body = json!({
            "status": "rejected",
            "code": self.code(),
            "errors": errors,
        });
        (self.status(), Json(body)).into_response()
    }
}
