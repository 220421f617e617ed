// Upstream client implementation
// One shared HTTP client for every backend call

use reqwest::{header, Client, Response};
use tokio::time::Duration;
use url::Url;

use crate::core::models::GatewayConfig;
use crate::proxy::error::GatewayError;
use crate::proxy::forward::{ForwardSpec, OutboundBody};

const USER_AGENT: &str = concat!("forwarding-gateway/", env!("CARGO_PKG_VERSION"));

pub struct UpstreamClient {
    http_client: Client,
    base_url: Url,
}

impl UpstreamClient {
    pub fn new(config: &GatewayConfig, base_url: Url) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(20))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            // 3xx is relayed to the caller, never followed
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(USER_AGENT);

        // No overall deadline unless configured; long uploads and exports are legitimate
        if let Some(secs) = config.request_timeout_secs.filter(|s| *s > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let proxy = &config.upstream_proxy;
        if proxy.enabled && !proxy.url.is_empty() {
            match reqwest::Proxy::all(&proxy.url) {
                Ok(p) => {
                    builder = builder.proxy(p);
                    tracing::info!("UpstreamClient enabled proxy: {}", proxy.url);
                }
                Err(e) => {
                    tracing::warn!("Ignoring invalid upstream proxy {}: {}", proxy.url, e);
                    builder = builder.no_proxy();
                }
            }
        } else {
            builder = builder.no_proxy();
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issues exactly one backend call. Backend error statuses come back as
    /// `Ok`; only transport-level failures are errors.
    pub async fn execute(&self, spec: ForwardSpec) -> Result<Response, GatewayError> {
        let url = spec.target_url(&self.base_url)?;
        tracing::debug!(method = %spec.method, %url, body = ?spec.body, "forwarding to backend");

        let mut request = self
            .http_client
            .request(spec.method, url)
            .headers(spec.headers);

        request = match spec.body {
            OutboundBody::None => request,
            OutboundBody::Json(bytes) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(bytes),
            OutboundBody::Multipart(form) => request.multipart(form),
            OutboundBody::Stream(body) => request.body(body),
        };

        Ok(request.send().await?)
    }
}
