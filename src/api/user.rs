//! 用户路由
//!
//! The caller's own `Authorization` header is relayed without inspection,
//! together with its `X-ORG-ID` when present.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    response::Response,
};

use crate::proxy::{BodyKind, RouteSpec};
use crate::state::AppState;

async fn forward<const N: usize>(state: &AppState, path: [&str; N], req: Request) -> Response {
    let route = RouteSpec::user(req.method().clone(), path);
    state.gateway.forward(route, req).await
}

pub async fn campaigns(State(state): State<Arc<AppState>>, req: Request) -> Response {
    forward(&state, ["campaigns"], req).await
}

pub async fn campaign(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<String>,
    req: Request,
) -> Response {
    forward(&state, ["campaigns", campaign_id.as_str()], req).await
}

pub async fn segments(State(state): State<Arc<AppState>>, req: Request) -> Response {
    forward(&state, ["segments"], req).await
}

pub async fn credits(State(state): State<Arc<AppState>>, req: Request) -> Response {
    forward(&state, ["credits"], req).await
}

pub async fn upload_pos(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let route = RouteSpec::user(req.method().clone(), ["pos", "upload"]).body(BodyKind::Multipart);
    state.gateway.forward(route, req).await
}

/// Body is piped to the backend as it arrives
pub async fn ingest_pos(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let route = RouteSpec::user(req.method().clone(), ["pos", "ingest"]).body(BodyKind::Raw);
    state.gateway.forward(route, req).await
}

pub async fn download_export(
    State(state): State<Arc<AppState>>,
    Path(export_id): Path<String>,
    req: Request,
) -> Response {
    let route =
        RouteSpec::user(req.method().clone(), ["exports", export_id.as_str(), "download"]).download();
    state.gateway.forward(route, req).await
}
