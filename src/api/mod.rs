use crate::core::credentials::{X_CRON_SECRET, X_ORG_ID};
use crate::core::models::GatewayConfig;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

mod admin;
mod auth;
pub mod common;
mod cron;
mod user;

pub fn build_routes(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);
    let cors = cors_layer(&state.config);

    let router = Router::new()
        // Session
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        // Admin
        .route("/api/admin/organizations", get(admin::list_organizations))
        .route(
            "/api/admin/organizations/:org_id/campaigns",
            get(admin::campaigns).post(admin::campaigns),
        )
        .route(
            "/api/admin/organizations/:org_id/campaigns/:campaign_id",
            get(admin::campaign)
                .put(admin::campaign)
                .delete(admin::campaign),
        )
        .route(
            "/api/admin/organizations/:org_id/segments",
            get(admin::segments).post(admin::segments),
        )
        .route(
            "/api/admin/organizations/:org_id/credits",
            get(admin::credits),
        )
        .route(
            "/api/admin/organizations/:org_id/credits/grant",
            post(admin::grant_credits),
        )
        .route(
            "/api/admin/organizations/:org_id/pos/import",
            post(admin::import_pos),
        )
        .route(
            "/api/admin/organizations/:org_id/exports/:export_id/download",
            get(admin::download_export),
        )
        // User
        .route(
            "/api/campaigns",
            get(user::campaigns).post(user::campaigns),
        )
        .route(
            "/api/campaigns/:campaign_id",
            get(user::campaign).put(user::campaign).delete(user::campaign),
        )
        .route("/api/segments", get(user::segments).post(user::segments))
        .route("/api/credits", get(user::credits))
        .route("/api/pos/upload", post(user::upload_pos))
        .route("/api/pos/ingest", post(user::ingest_pos))
        .route(
            "/api/exports/:export_id/download",
            get(user::download_export),
        )
        // Cron
        .route("/api/cron/:job", post(cron::run_job))
        // Health
        .route("/healthz", get(|| async { "ok" }))
        .layer(body_limit)
        .layer(middleware::from_fn(common::request_logger))
        .with_state(state);

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Credentialed CORS for the configured origins; none configured means
/// same-origin only.
fn cors_layer(config: &GatewayConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, X_ORG_ID, X_CRON_SECRET]),
    )
}
