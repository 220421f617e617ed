//! Per-endpoint forwarding descriptors

use axum::http::Method;

use crate::core::CredentialStrategy;

/// How the inbound body is read and re-sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    None,
    Json,
    /// multipart/form-data with a required `file` part
    Multipart,
    /// streamed to the backend as-is
    Raw,
}

impl BodyKind {
    /// JSON for methods that carry a payload, nothing otherwise.
    pub fn for_method(method: &Method) -> Self {
        match *method {
            Method::GET | Method::HEAD | Method::DELETE | Method::OPTIONS => Self::None,
            _ => Self::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// buffer, classify as JSON/text/empty, re-emit
    Normalize,
    /// pipe a successful response through unbuffered, keeping file metadata
    Download,
}

#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub strategy: CredentialStrategy,
    pub method: Method,
    /// Backend path segments, appended to the configured base URL
    pub backend_path: Vec<String>,
    pub body: BodyKind,
    pub response: ResponseMode,
    /// Tenant the route addresses; sent as `X-ORG-ID`
    pub org_id: Option<String>,
    /// Query parameters forced to a value regardless of the inbound query
    pub pinned_query: Vec<(String, String)>,
}

impl RouteSpec {
    pub fn new<I, S>(strategy: CredentialStrategy, method: Method, backend_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strategy,
            body: BodyKind::for_method(&method),
            method,
            backend_path: backend_path.into_iter().map(Into::into).collect(),
            response: ResponseMode::Normalize,
            org_id: None,
            pinned_query: Vec::new(),
        }
    }

    pub fn admin<I, S>(method: Method, backend_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CredentialStrategy::AdminSession, method, backend_path)
    }

    pub fn user<I, S>(method: Method, backend_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CredentialStrategy::BearerPassthrough, method, backend_path)
    }

    pub fn cron<I, S>(method: Method, backend_path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(CredentialStrategy::CronSecret, method, backend_path).body(BodyKind::None)
    }

    pub fn body(mut self, body: BodyKind) -> Self {
        self.body = body;
        self
    }

    pub fn download(mut self) -> Self {
        self.body = BodyKind::None;
        self.response = ResponseMode::Download;
        self
    }

    pub fn org(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    pub fn pin(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.pinned_query.push((name.into(), value.into()));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_kind_follows_method() {
        assert_eq!(BodyKind::for_method(&Method::GET), BodyKind::None);
        assert_eq!(BodyKind::for_method(&Method::DELETE), BodyKind::None);
        assert_eq!(BodyKind::for_method(&Method::POST), BodyKind::Json);
        assert_eq!(BodyKind::for_method(&Method::PUT), BodyKind::Json);
        assert_eq!(BodyKind::for_method(&Method::PATCH), BodyKind::Json);
    }

    #[test]
    fn test_cron_routes_never_read_a_body() {
        let route = RouteSpec::cron(Method::POST, ["cron", "expire-credits"]);
        assert_eq!(route.body, BodyKind::None);
        assert_eq!(route.strategy, CredentialStrategy::CronSecret);
    }

    #[test]
    fn test_download_route() {
        let route = RouteSpec::user(Method::GET, ["exports", "e1", "download"]).download();
        assert_eq!(route.response, ResponseMode::Download);
        assert_eq!(route.backend_path, vec!["exports", "e1", "download"]);
    }
}
