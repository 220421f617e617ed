use axum::{extract::Request, middleware::Next, response::Response, Json};
use serde::Serialize;
use tracing::Instrument;

/// API 响应包装
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

impl ApiResponse<()> {
    /// `{"success":true,"data":null}`
    pub fn empty() -> Json<Self> {
        Json(Self {
            success: true,
            data: None,
            error: None,
        })
    }
}

pub async fn request_logger(req: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = std::time::Instant::now();

    let response = next
        .run(req)
        .instrument(tracing::info_span!("request", id = %request_id))
        .await;

    let duration = start.elapsed();
    tracing::info!(
        request_id = %request_id,
        "{} {} - status: {}, latency: {}ms",
        method,
        uri.path(),
        response.status(),
        duration.as_millis()
    );
    response
}
