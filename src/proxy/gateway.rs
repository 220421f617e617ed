//! Forwarding orchestration
//!
//! One inbound request, one backend call: resolve the credential, read the
//! body the route declares, forward, then normalize or stream the answer.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::HeaderValue,
    response::{IntoResponse, Response},
};

use super::body::read_body;
use super::error::{GatewayError, MalformedInput};
use super::forward::ForwardSpec;
use super::invalidator::invalidate_session;
use super::response::{stream_download, BufferedResponse, UpstreamOutcome};
use super::route::{ResponseMode, RouteSpec};
use super::upstream::UpstreamClient;
use crate::core::credentials::X_ORG_ID;
use crate::core::{CredentialResolver, SessionCookie};

#[derive(Clone)]
pub struct Gateway {
    resolver: CredentialResolver,
    upstream: Arc<UpstreamClient>,
    cookie: SessionCookie,
}

impl Gateway {
    pub fn new(
        resolver: CredentialResolver,
        upstream: Arc<UpstreamClient>,
        cookie: SessionCookie,
    ) -> Self {
        Self {
            resolver,
            upstream,
            cookie,
        }
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    pub async fn forward(&self, route: RouteSpec, req: Request) -> Response {
        match self.try_forward(route, req).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        }
    }

    pub async fn try_forward(&self, route: RouteSpec, req: Request) -> Result<Response, GatewayError> {
        // Credentials first: an unauthenticated caller never gets its body read
        let credential = self.resolver.resolve(route.strategy, req.headers());
        if !credential.is_authenticated() {
            return Err(GatewayError::Unauthenticated);
        }

        let mut headers = credential.outbound_headers();
        if let Some(org_id) = &route.org_id {
            let value = HeaderValue::from_str(org_id).map_err(|_| MalformedInput::InvalidOrgId)?;
            headers.insert(X_ORG_ID, value);
        }

        let query = req.uri().query().map(str::to_string);
        let body = read_body(route.body, req).await?;

        let spec = ForwardSpec {
            method: route.method,
            path: route.backend_path,
            query,
            pinned_query: route.pinned_query,
            headers,
            body,
        };
        let response = self.upstream.execute(spec).await?;

        let status = response.status();
        let outcome = UpstreamOutcome::classify(status, route.strategy);
        if outcome == UpstreamOutcome::Success && route.response == ResponseMode::Download {
            return Ok(stream_download(response));
        }

        let buffered = BufferedResponse::read(response).await?;
        Ok(match outcome {
            UpstreamOutcome::UpstreamUnauthorized => invalidate_session(buffered, &self.cookie),
            UpstreamOutcome::UpstreamError => {
                tracing::debug!(%status, "relaying backend error");
                buffered.into_response()
            }
            UpstreamOutcome::Success => buffered.into_response(),
        })
    }
}
