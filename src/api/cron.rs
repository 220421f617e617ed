use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    response::Response,
};

use crate::proxy::RouteSpec;
use crate::state::AppState;

/// Scheduled jobs. `X-CRON-SECRET` is only checked for presence here; the
/// backend validates its value.
pub async fn run_job(
    State(state): State<Arc<AppState>>,
    Path(job): Path<String>,
    req: Request,
) -> Response {
    let route = RouteSpec::cron(req.method().clone(), ["cron", job.as_str()]);
    state.gateway.forward(route, req).await
}
