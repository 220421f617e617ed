//! Admin session invalidation
//!
//! A backend 401 on an admin route means the embedded access token is no
//! longer honoured. The 401 and the cookie-clearing header leave together.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::response::{render, BufferedResponse};
use crate::core::SessionCookie;

pub fn invalidate_session(backend: BufferedResponse, cookie: &SessionCookie) -> Response {
    tracing::info!("backend rejected admin session, clearing cookie");

    let mut response = if backend.payload.is_empty() {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
    } else {
        render(StatusCode::UNAUTHORIZED, backend.content_type, backend.payload)
    };

    clear_session_cookie(&mut response, cookie);
    response
}

/// Appends the cookie-clearing instruction; shared with logout.
pub fn clear_session_cookie(response: &mut Response, cookie: &SessionCookie) {
    response
        .headers_mut()
        .append(header::SET_COOKIE, cookie.clear_header());
}
