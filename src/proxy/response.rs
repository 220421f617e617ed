//! Backend response normalization
//!
//! Every buffered backend body is classified into a [`BackendPayload`] and
//! re-emitted with the backend's own status code. Successful downloads skip
//! classification and are piped through.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use serde_json::{value::RawValue, Value};

use super::error::GatewayError;
use super::error_classifier::classify_transport_error;
use crate::core::CredentialStrategy;

/// A backend body. JSON is kept as the validated original text so numbers
/// outside the 64-bit range and key order survive the relay.
#[derive(Debug, Clone)]
pub enum BackendPayload {
    Json(Box<RawValue>),
    Text(String),
    Empty,
}

impl PartialEq for BackendPayload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Json(a), Self::Json(b)) => a.get() == b.get(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Empty, Self::Empty) => true,
            _ => false,
        }
    }
}

impl BackendPayload {
    /// Never fails: anything that is neither blank nor JSON is text.
    pub fn classify(bytes: &[u8]) -> Self {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self::Empty;
        }
        match serde_json::from_slice::<Box<RawValue>>(bytes) {
            Ok(raw) => Self::Json(raw),
            Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Parsed view of a JSON payload, for callers that inspect fields.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::Json(raw) => serde_json::from_str(raw.get()).ok(),
            _ => None,
        }
    }
}

/// `application/json`, `application/problem+json`, `application/vnd.api+json`...
fn is_json_content_type(value: &HeaderValue) -> bool {
    let Ok(value) = value.to_str() else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or_default().trim();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    kind.eq_ignore_ascii_case("application")
        && (subtype.eq_ignore_ascii_case("json")
            || subtype.to_ascii_lowercase().ends_with("+json"))
}

/// What a completed backend call means for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOutcome {
    Success,
    /// 401 on an admin-session route; the cookie has to go
    UpstreamUnauthorized,
    /// any other non-2xx, relayed as-is
    UpstreamError,
}

impl UpstreamOutcome {
    pub fn classify(status: StatusCode, strategy: CredentialStrategy) -> Self {
        if status.is_success() {
            Self::Success
        } else if status == StatusCode::UNAUTHORIZED
            && strategy == CredentialStrategy::AdminSession
        {
            Self::UpstreamUnauthorized
        } else {
            Self::UpstreamError
        }
    }
}

/// A fully read backend response.
#[derive(Debug)]
pub struct BufferedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub payload: BackendPayload,
}

impl BufferedResponse {
    /// Reads the whole body. A body that breaks off mid-way is a transport
    /// failure, not an empty payload.
    pub async fn read(response: reqwest::Response) -> Result<Self, GatewayError> {
        let status = response.status();
        let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
        let bytes = response.bytes().await?;

        Ok(Self {
            status,
            content_type,
            payload: BackendPayload::classify(&bytes),
        })
    }

    pub fn into_response(self) -> Response {
        render(self.status, self.content_type, self.payload)
    }
}

fn forbids_body(status: StatusCode) -> bool {
    status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

pub fn render(
    status: StatusCode,
    content_type: Option<HeaderValue>,
    payload: BackendPayload,
) -> Response {
    if forbids_body(status) {
        return status.into_response();
    }

    match payload {
        BackendPayload::Json(raw) => {
            let content_type = content_type
                .filter(is_json_content_type)
                .unwrap_or_else(|| HeaderValue::from_static("application/json"));
            (status, [(header::CONTENT_TYPE, content_type)], raw.get().to_owned()).into_response()
        }
        BackendPayload::Text(text) => {
            let content_type = content_type
                .unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8"));
            (status, [(header::CONTENT_TYPE, content_type)], text).into_response()
        }
        BackendPayload::Empty => (status, Json(Value::Null)).into_response(),
    }
}

/// Relays a successful download without buffering it.
pub fn stream_download(response: reqwest::Response) -> Response {
    let status = response.status();

    // file metadata carried over verbatim
    let mut headers = HeaderMap::new();
    for name in [
        header::CONTENT_TYPE,
        header::CONTENT_DISPOSITION,
        header::CONTENT_LENGTH,
    ] {
        if let Some(value) = response.headers().get(&name) {
            headers.insert(name, value.clone());
        }
    }

    let stream = response.bytes_stream().inspect_err(|e| {
        let (kind, _) = classify_transport_error(e);
        tracing::warn!(kind, error = %e, "download stream from backend interrupted");
    });

    (status, headers, Body::from_stream(stream)).into_response()
}
