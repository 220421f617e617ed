//! 管理后台路由
//!
//! Authenticated by the signed `admin_session` cookie. Every route below an
//! organization also sends that organization as `X-ORG-ID`.

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    response::Response,
};

use crate::proxy::{BodyKind, RouteSpec};
use crate::state::AppState;

fn org_route(req: &Request, org_id: &str, rest: &[&str]) -> RouteSpec {
    let path = ["organizations", org_id].into_iter().chain(rest.iter().copied());
    RouteSpec::admin(req.method().clone(), path).org(org_id)
}

pub async fn list_organizations(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let route = RouteSpec::admin(req.method().clone(), ["admin", "organizations"]);
    state.gateway.forward(route, req).await
}

/// GET lists, POST creates
pub async fn campaigns(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<String>,
    req: Request,
) -> Response {
    let route = org_route(&req, &org_id, &["campaigns"]);
    state.gateway.forward(route, req).await
}

pub async fn campaign(
    State(state): State<Arc<AppState>>,
    Path((org_id, campaign_id)): Path<(String, String)>,
    req: Request,
) -> Response {
    let route = org_route(&req, &org_id, &["campaigns", campaign_id.as_str()]);
    state.gateway.forward(route, req).await
}

pub async fn segments(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<String>,
    req: Request,
) -> Response {
    let route = org_route(&req, &org_id, &["segments"]);
    state.gateway.forward(route, req).await
}

/// The backend filters credits by query parameter as well as by path, so the
/// parameter is pinned to the path's organization.
pub async fn credits(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<String>,
    req: Request,
) -> Response {
    let route = org_route(&req, &org_id, &["credits"]).pin("organization_id", org_id.as_str());
    state.gateway.forward(route, req).await
}

pub async fn grant_credits(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<String>,
    req: Request,
) -> Response {
    let route = org_route(&req, &org_id, &["credits", "grant"]);
    state.gateway.forward(route, req).await
}

pub async fn import_pos(
    State(state): State<Arc<AppState>>,
    Path(org_id): Path<String>,
    req: Request,
) -> Response {
    let route = org_route(&req, &org_id, &["pos", "import"]).body(BodyKind::Multipart);
    state.gateway.forward(route, req).await
}

pub async fn download_export(
    State(state): State<Arc<AppState>>,
    Path((org_id, export_id)): Path<(String, String)>,
    req: Request,
) -> Response {
    let route = org_route(&req, &org_id, &["exports", export_id.as_str(), "download"]).download();
    state.gateway.forward(route, req).await
}
