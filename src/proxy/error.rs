use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::error_classifier::classify_transport_error;

/// Input problems detected before the backend is contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MalformedInput {
    #[error("Invalid JSON body")]
    InvalidJson,
    #[error("No file uploaded")]
    NoFile,
    #[error("Invalid multipart form data")]
    InvalidMultipart,
    #[error("Invalid organization id")]
    InvalidOrgId,
}

/// Failures the gateway answers itself. Backend error statuses are not
/// represented here: they are relayed, not translated.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Unauthorized")]
    Unauthenticated,

    #[error(transparent)]
    MalformedInput(#[from] MalformedInput),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Session signing is not configured")]
    SessionUnavailable,

    #[error("upstream transport failure: {0}")]
    TransportFailure(#[from] reqwest::Error),

    #[error("upstream returned an unusable response: {0}")]
    InvalidUpstreamResponse(&'static str),

    #[error("could not build upstream url: {0}")]
    InvalidUpstreamUrl(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::MalformedInput(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::SessionUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::TransportFailure(_) | Self::InvalidUpstreamResponse(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidUpstreamUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::TransportFailure(e) => {
                let (kind, message) = classify_transport_error(e);
                tracing::error!(kind, error = %e, "backend call failed");
                json!({ "error": "Bad gateway", "kind": kind, "message": message })
            }
            Self::InvalidUpstreamResponse(kind) => {
                tracing::error!(kind, "backend response rejected");
                json!({ "error": "Bad gateway", "kind": kind })
            }
            Self::InvalidUpstreamUrl(reason) => {
                tracing::error!(%reason, "failed to build backend url");
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
