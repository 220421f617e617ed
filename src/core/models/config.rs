//! 网关配置模型

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::core::cookie::is_valid_cookie_name;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_SESSION_COOKIE: &str = "admin_session";
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backend url {url:?}: {reason}")]
    InvalidBackendUrl { url: String, reason: String },

    #[error("invalid session cookie name {0:?}")]
    InvalidCookieName(String),

    #[error("session secret must be at least {MIN_SECRET_LEN} bytes, got {0}")]
    WeakSecret(usize),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 网关配置
///
/// Assembled once at startup and shared read-only through `AppState`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// 后端 API 基础地址
    pub backend_url: String,

    /// Session 签名密钥; `None` disables every admin-session route
    pub session_secret: Option<String>,

    pub session_cookie_name: String,

    /// Adds `Secure` to issued and cleared cookies (production)
    pub secure_cookies: bool,

    /// Upper bound for the lifetime of an issued session (seconds)
    pub session_ttl_secs: u64,

    /// Client-level timeout for outbound calls; unset means no timeout
    pub request_timeout_secs: Option<u64>,

    /// 上游代理配置
    pub upstream_proxy: UpstreamProxyConfig,

    pub max_body_bytes: usize,

    /// Origins allowed to call the gateway with credentials
    pub cors_origins: Vec<String>,
}

/// 上游代理配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UpstreamProxyConfig {
    /// 是否启用
    pub enabled: bool,
    /// 代理地址 (http://, https://, socks5://)
    pub url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            session_secret: None,
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            secure_cookies: false,
            session_ttl_secs: 8 * 60 * 60,
            request_timeout_secs: None,
            upstream_proxy: UpstreamProxyConfig::default(),
            max_body_bytes: 50 * 1024 * 1024,
            cors_origins: Vec::new(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("backend_url", &self.backend_url)
            .field(
                "session_secret",
                &self.session_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("session_cookie_name", &self.session_cookie_name)
            .field("secure_cookies", &self.secure_cookies)
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("upstream_proxy", &self.upstream_proxy)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl GatewayConfig {
    /// Checks the invariants the rest of the gateway relies on and returns
    /// the parsed backend base URL.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBackendUrl {
            url: self.backend_url.clone(),
            reason,
        };

        let url = Url::parse(&self.backend_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("not a base url".to_string()));
        }

        if !is_valid_cookie_name(&self.session_cookie_name) {
            return Err(ConfigError::InvalidCookieName(
                self.session_cookie_name.clone(),
            ));
        }

        if let Some(secret) = &self.session_secret {
            if secret.len() < MIN_SECRET_LEN {
                return Err(ConfigError::WeakSecret(secret.len()));
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GatewayConfig::default();
        let url = config.validate().unwrap();
        assert_eq!(url.as_str(), DEFAULT_BACKEND_URL);
        assert_eq!(config.session_cookie_name, "admin_session");
        assert!(config.session_secret.is_none());
    }

    #[test]
    fn test_rejects_short_secret() {
        let config = GatewayConfig {
            session_secret: Some("too-short".to_string()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::WeakSecret(9))));
    }

    #[test]
    fn test_rejects_non_http_backend() {
        let config = GatewayConfig {
            backend_url: "ftp://backend.internal/api".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBackendUrl { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_cookie_name() {
        let config = GatewayConfig {
            session_cookie_name: "admin session;".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCookieName(name)) if name == "admin session;"
        ));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{"backend_url": "https://api.example.com/v2"}"#).unwrap();
        assert_eq!(config.backend_url, "https://api.example.com/v2");
        assert_eq!(config.session_ttl_secs, 8 * 60 * 60);
        assert!(!config.upstream_proxy.enabled);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = GatewayConfig {
            session_secret: Some("x".repeat(40)),
            ..Default::default()
        };
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(&"x".repeat(40)));
    }
}
