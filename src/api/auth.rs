//! Admin session endpoints
//!
//! Login exchanges backend credentials for a signed cookie; the backend
//! access token itself never reaches the browser.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::Value;

use super::common::ApiResponse;
use crate::core::cookie::extract_cookie;
use crate::core::SessionPayload;
use crate::proxy::body::read_json;
use crate::proxy::forward::{ForwardSpec, OutboundBody};
use crate::proxy::invalidator::clear_session_cookie;
use crate::proxy::response::{BackendPayload, BufferedResponse};
use crate::proxy::GatewayError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

#[derive(Debug, PartialEq)]
struct LoginGrant {
    access_token: String,
    expires_in: Option<u64>,
    /// Backend's user record, kept in the session as an auxiliary claim
    user: Option<Value>,
}

impl LoginGrant {
    /// Accepts `{data: {access_token, expires_in}}` as well as the bare object.
    fn from_payload(payload: &BackendPayload) -> Option<Self> {
        let root = payload.to_value()?;
        let grant = [root.get("data"), Some(&root)]
            .into_iter()
            .flatten()
            .find_map(Self::from_object);
        grant
    }

    fn from_object(object: &Value) -> Option<Self> {
        let access_token = object
            .get("access_token")?
            .as_str()
            .filter(|t| !t.is_empty())?;
        let expires_in = object.get("expires_in").and_then(|v| match v {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        });
        Some(Self {
            access_token: access_token.to_string(),
            expires_in,
            user: object.get("user").filter(|u| u.is_object()).cloned(),
        })
    }
}

pub async fn login(State(state): State<Arc<AppState>>, req: Request) -> Response {
    match try_login(&state, req).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn try_login(state: &AppState, req: Request) -> Result<Response, GatewayError> {
    let gateway = &state.gateway;
    let codec = gateway.resolver().codec();
    if !codec.has_secret() {
        tracing::warn!("login attempted but no session secret is configured");
        return Err(GatewayError::SessionUnavailable);
    }

    let mut spec = ForwardSpec::new(Method::POST, ["auth", "login"]);
    spec.body = OutboundBody::Json(read_json(req).await?);

    let backend = BufferedResponse::read(gateway.upstream().execute(spec).await?).await?;
    if !backend.status.is_success() {
        return Ok(backend.into_response());
    }

    let grant = LoginGrant::from_payload(&backend.payload)
        .ok_or(GatewayError::InvalidUpstreamResponse("missing_access_token"))?;

    let ttl = match grant.expires_in.filter(|secs| *secs > 0) {
        Some(secs) => secs.min(state.config.session_ttl_secs),
        None => state.config.session_ttl_secs,
    };
    let expires_at = i64::try_from(ttl)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .ok_or(GatewayError::SessionUnavailable)?;

    let mut payload = SessionPayload::new(grant.access_token, expires_at);
    if let Some(user) = grant.user {
        payload = payload.with_claim("user", user);
    }
    let token = codec.encode(&payload).map_err(|e| {
        tracing::error!("failed to sign session: {}", e);
        GatewayError::SessionUnavailable
    })?;
    let cookie = HeaderValue::from_str(&gateway.cookie().issue(&token, ttl)).map_err(|e| {
        tracing::error!("failed to encode session cookie: {}", e);
        GatewayError::SessionUnavailable
    })?;

    tracing::info!(expires_at = payload.expires_at, "admin session issued");

    let mut response = ApiResponse::ok(SessionInfo {
        authenticated: true,
        expires_at: Some(payload.expires_at),
    })
    .into_response();
    response.headers_mut().append(header::SET_COOKIE, cookie);
    Ok(response)
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Response {
    let mut response = ApiResponse::empty().into_response();
    clear_session_cookie(&mut response, state.gateway.cookie());
    response
}

/// Reports whether the cookie still holds a valid session. Never contacts
/// the backend.
pub async fn session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let codec = state.gateway.resolver().codec();
    let expires_at = extract_cookie(&headers, &state.gateway.cookie().name())
        .filter(|_| codec.has_secret())
        .and_then(|token| codec.decode(&token).ok())
        .map(|payload| payload.expires_at);

    ApiResponse::ok(SessionInfo {
        authenticated: expires_at.is_some(),
        expires_at,
    })
    .into_response()
}
