// proxy 模块 - 转发引擎

pub mod body;
pub mod error;
pub mod error_classifier;
pub mod forward;
pub mod gateway;
pub mod invalidator;
pub mod response;
pub mod route;
pub mod upstream; // 上游客户端

pub use error::{GatewayError, MalformedInput};
pub use gateway::Gateway;
pub use response::BackendPayload;
pub use route::{BodyKind, ResponseMode, RouteSpec};
pub use upstream::UpstreamClient;
