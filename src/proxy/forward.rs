use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use url::Url;

use super::error::GatewayError;

/// Body of one outbound call.
pub enum OutboundBody {
    None,
    Json(Bytes),
    /// Content type (with boundary) is set by reqwest
    Multipart(reqwest::multipart::Form),
    Stream(reqwest::Body),
}

impl std::fmt::Debug for OutboundBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Json(bytes) => write!(f, "Json({} bytes)", bytes.len()),
            Self::Multipart(form) => write!(f, "Multipart(boundary={})", form.boundary()),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// Everything needed to issue exactly one backend call.
#[derive(Debug)]
pub struct ForwardSpec {
    pub method: Method,
    pub path: Vec<String>,
    /// Raw inbound query string, passed through untouched unless pinned
    pub query: Option<String>,
    pub pinned_query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: OutboundBody,
}

impl ForwardSpec {
    pub fn new<I, S>(method: Method, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            path: path.into_iter().map(Into::into).collect(),
            query: None,
            pinned_query: Vec::new(),
            headers: HeaderMap::new(),
            body: OutboundBody::None,
        }
    }

    /// Resolves the target URL against the backend base. Path segments are
    /// percent-encoded one by one so route parameters cannot add segments.
    pub fn target_url(&self, base: &Url) -> Result<Url, GatewayError> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);

        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUpstreamUrl(base.to_string()))?
            .pop_if_empty()
            .extend(&self.path);

        let raw = self.query.as_deref().filter(|q| !q.is_empty());
        if self.pinned_query.is_empty() {
            url.set_query(raw);
            return Ok(url);
        }

        let kept: Vec<(String, String)> = raw
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .filter(|(k, _)| !self.pinned_query.iter().any(|(p, _)| p == k))
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        url.query_pairs_mut()
            .extend_pairs(kept.iter())
            .extend_pairs(self.pinned_query.iter());

        Ok(url)
    }
}
