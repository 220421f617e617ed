//! 核心数据模型

mod config;
mod session;

pub use config::{
    ConfigError, GatewayConfig, UpstreamProxyConfig, DEFAULT_BACKEND_URL, DEFAULT_SESSION_COOKIE,
    MIN_SECRET_LEN,
};
pub use session::SessionPayload;
