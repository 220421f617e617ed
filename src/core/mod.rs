//! 核心模块
//! 会话编解码、凭证解析与配置，不依赖 HTTP 转发层

pub mod cookie;
pub mod credentials;
pub mod logger;
pub mod models;
pub mod session;
pub mod storage;

// 重导出常用类型
pub use cookie::SessionCookie;
pub use credentials::{CredentialResolver, CredentialStrategy, InboundCredential};
pub use models::{GatewayConfig, SessionPayload};
pub use session::{SessionCodec, SessionError};
