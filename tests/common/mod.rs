//! Common test utilities: a recording stub backend and a gateway wired to it

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use chrono::{Duration, Utc};
use forwarding_gateway::api::build_routes;
use forwarding_gateway::core::models::GatewayConfig;
use forwarding_gateway::core::{SessionCodec, SessionPayload};
use forwarding_gateway::state::AppState;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const SECRET: &str = "test-secret-with-at-least-32-bytes!!";

/// One request as the backend saw it
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: Vec<(HeaderName, &'static str)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self {
            status,
            headers: vec![(header::CONTENT_TYPE, "application/json")],
            body: serde_json::to_vec(&body).unwrap(),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// Stub backend. Without a configured reply it echoes the request body back
/// with the request's content type.
#[derive(Clone, Default)]
pub struct StubBackend {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Seen>>>,
    reply: Arc<Mutex<Option<Reply>>>,
}

impl StubBackend {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Seen {
        self.seen.lock().unwrap().last().cloned().expect("backend was not called")
    }

    pub fn reply_with(&self, reply: Reply) {
        *self.reply.lock().unwrap() = Some(reply);
    }
}

async fn record(State(stub): State<StubBackend>, req: Request) -> Response {
    stub.calls.fetch_add(1, Ordering::SeqCst);

    let (parts, body) = req.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap();
    stub.seen.lock().unwrap().push(Seen {
        method: parts.method,
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        headers: parts.headers.clone(),
        body: body.clone(),
    });

    let reply = stub.reply.lock().unwrap().clone();
    match reply {
        Some(reply) => {
            let mut response = Response::new(Body::from(reply.body));
            *response.status_mut() = reply.status;
            for (name, value) in reply.headers {
                response
                    .headers_mut()
                    .insert(name, HeaderValue::from_static(value));
            }
            response
        }
        None => {
            let content_type = parts
                .headers
                .get(header::CONTENT_TYPE)
                .cloned()
                .unwrap_or(HeaderValue::from_static("application/json"));
            (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
        }
    }
}

pub async fn spawn_backend() -> (StubBackend, String) {
    let stub = StubBackend::default();
    let app = Router::new().fallback(record).with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (stub, format!("http://{}/api/v1", addr))
}

pub fn config_for(backend_url: &str) -> GatewayConfig {
    GatewayConfig {
        backend_url: backend_url.to_string(),
        session_secret: Some(SECRET.to_string()),
        ..GatewayConfig::default()
    }
}

pub fn gateway(config: GatewayConfig) -> Router {
    build_routes(Arc::new(AppState::new(config).unwrap()))
}

pub async fn setup() -> (StubBackend, Router) {
    let (stub, url) = spawn_backend().await;
    (stub, gateway(config_for(&url)))
}

/// Signed session cookie header value for `access_token`
pub fn session_cookie(access_token: &str, lifetime: Duration) -> String {
    let codec = SessionCodec::new(Some(SECRET));
    let token = codec
        .encode(&SessionPayload::new(access_token, Utc::now() + lifetime))
        .unwrap();
    format!("admin_session={}", token)
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

pub fn json_body(bytes: &Bytes) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap()
}
