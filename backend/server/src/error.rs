use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::upstream::UpstreamError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to fetch alerts")]
    Alerts(#[source] UpstreamError),

    #[error("Failed to fetch reference data")]
    Reference(#[source] UpstreamError),

    #[error("Failed to fetch alert types")]
    AlertTypes(#[source] UpstreamError),
}

/// Body of every failed relay response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub error: String,
    pub message: String,
}

impl AppError {
    pub fn upstream(&self) -> &UpstreamError {
        match self {
            AppError::Alerts(e) | AppError::Reference(e) | AppError::AlertTypes(e) => e,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            error: self.to_string(),
            message: self.upstream().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope = self.envelope();
        error!("{}: {}", envelope.error, envelope.message);

        (StatusCode::INTERNAL_SERVER_ERROR, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode as UpstreamStatus;

    use super::*;

    #[test]
    fn test_envelope() {
        let err = AppError::Alerts(UpstreamError::Status(UpstreamStatus::SERVICE_UNAVAILABLE));

        assert_eq!(
            err.envelope(),
            ErrorEnvelope {
                error: "Failed to fetch alerts".to_string(),
                message: "FSA API responded with status: 503".to_string(),
            }
        );
    }

    #[test]
    fn test_always_internal_error() {
        let err = AppError::AlertTypes(UpstreamError::Status(UpstreamStatus::NOT_FOUND));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
