//! 凭证解析
//!
//! Turns an inbound request into the credential headers the backend expects.
//! Each route picks one [`CredentialStrategy`]; resolution never fails, it
//! yields either a concrete credential or [`InboundCredential::Unauthenticated`].

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::core::cookie::extract_cookie;
use crate::core::session::{SessionCodec, SessionError};

pub const X_ORG_ID: HeaderName = HeaderName::from_static("x-org-id");
pub const X_CRON_SECRET: HeaderName = HeaderName::from_static("x-cron-secret");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStrategy {
    /// Signed `admin_session` cookie, translated into a bearer token
    AdminSession,
    /// Caller's own `Authorization` header, relayed undecoded
    BearerPassthrough,
    /// `X-CRON-SECRET` for scheduled callers. Only the header's presence is
    /// checked; the backend is the one comparing it, so this path carries
    /// less trust than the other two.
    CronSecret,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NoSecretConfigured,
    MissingCookie,
    InvalidSession(SessionError),
    MissingAuthorization,
    MissingCronSecret,
}

#[derive(Debug, Clone)]
pub enum InboundCredential {
    AdminSession {
        authorization: HeaderValue,
        expires_at: i64,
    },
    BearerPassthrough {
        authorization: HeaderValue,
        org_id: Option<HeaderValue>,
    },
    CronSecret {
        secret: HeaderValue,
    },
    Unauthenticated(Rejection),
}

impl InboundCredential {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Unauthenticated(_))
    }

    /// Headers to merge into the outbound request. Empty when unauthenticated.
    pub fn outbound_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match self {
            Self::AdminSession { authorization, .. } => {
                headers.insert(header::AUTHORIZATION, authorization.clone());
            }
            Self::BearerPassthrough {
                authorization,
                org_id,
            } => {
                headers.insert(header::AUTHORIZATION, authorization.clone());
                if let Some(org_id) = org_id {
                    headers.insert(X_ORG_ID.clone(), org_id.clone());
                }
            }
            Self::CronSecret { secret } => {
                headers.insert(X_CRON_SECRET.clone(), secret.clone());
            }
            Self::Unauthenticated(_) => {}
        }
        headers
    }
}

#[derive(Clone)]
pub struct CredentialResolver {
    codec: SessionCodec,
    cookie_name: String,
}

impl CredentialResolver {
    pub fn new(codec: SessionCodec, cookie_name: impl Into<String>) -> Self {
        Self {
            codec,
            cookie_name: cookie_name.into(),
        }
    }

    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    pub fn resolve(&self, strategy: CredentialStrategy, headers: &HeaderMap) -> InboundCredential {
        let credential = match strategy {
            CredentialStrategy::AdminSession => self.resolve_admin(headers),
            CredentialStrategy::BearerPassthrough => resolve_bearer(headers),
            CredentialStrategy::CronSecret => resolve_cron(headers),
        };
        if let InboundCredential::Unauthenticated(reason) = &credential {
            tracing::debug!(?strategy, ?reason, "request rejected before forwarding");
        }
        credential
    }

    fn resolve_admin(&self, headers: &HeaderMap) -> InboundCredential {
        // Without a secret the cookie cannot be trusted, so it is not even read.
        if !self.codec.has_secret() {
            return InboundCredential::Unauthenticated(Rejection::NoSecretConfigured);
        }

        let Some(token) = extract_cookie(headers, &self.cookie_name) else {
            return InboundCredential::Unauthenticated(Rejection::MissingCookie);
        };

        let payload = match self.codec.decode(&token) {
            Ok(payload) => payload,
            Err(e) => return InboundCredential::Unauthenticated(Rejection::InvalidSession(e)),
        };

        match HeaderValue::from_str(&format!("Bearer {}", payload.access_token)) {
            Ok(mut authorization) => {
                authorization.set_sensitive(true);
                InboundCredential::AdminSession {
                    authorization,
                    expires_at: payload.expires_at,
                }
            }
            Err(_) => InboundCredential::Unauthenticated(Rejection::InvalidSession(
                SessionError::Malformed,
            )),
        }
    }
}

fn non_empty(value: Option<&HeaderValue>) -> Option<HeaderValue> {
    value.filter(|v| !v.as_bytes().iter().all(u8::is_ascii_whitespace)).cloned()
}

fn resolve_bearer(headers: &HeaderMap) -> InboundCredential {
    let Some(mut authorization) = non_empty(headers.get(header::AUTHORIZATION)) else {
        return InboundCredential::Unauthenticated(Rejection::MissingAuthorization);
    };
    authorization.set_sensitive(true);

    InboundCredential::BearerPassthrough {
        authorization,
        org_id: non_empty(headers.get(&X_ORG_ID)),
    }
}

fn resolve_cron(headers: &HeaderMap) -> InboundCredential {
    match non_empty(headers.get(&X_CRON_SECRET)) {
        Some(mut secret) => {
            secret.set_sensitive(true);
            InboundCredential::CronSecret { secret }
        }
        None => InboundCredential::Unauthenticated(Rejection::MissingCronSecret),
    }
}
