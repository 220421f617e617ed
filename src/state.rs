use std::sync::Arc;

use crate::core::models::{ConfigError, GatewayConfig};
use crate::core::{CredentialResolver, SessionCodec, SessionCookie};
use crate::proxy::{Gateway, UpstreamClient};

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Web 应用状态
///
/// Read-only after startup; every request sees the same configuration,
/// signing secret and pooled client.
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, InitError> {
        let base_url = config.validate()?;

        let codec = SessionCodec::new(config.session_secret.as_deref());
        let resolver = CredentialResolver::new(codec, config.session_cookie_name.clone());
        let cookie = SessionCookie::new(config.session_cookie_name.clone(), config.secure_cookies)?;
        let upstream = Arc::new(UpstreamClient::new(&config, base_url)?);

        Ok(Self {
            gateway: Gateway::new(resolver, upstream, cookie),
            config: Arc::new(config),
        })
    }
}
