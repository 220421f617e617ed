//! Session 编解码
//!
//! Admin sessions are stateless: the cookie value is a signed token of the
//! form `v1.<payload>.<signature>`, where `payload` is the URL-safe base64 of
//! the JSON [`SessionPayload`] and `signature` is HMAC-SHA256 over
//! `v1.<payload>` keyed with the process-wide session secret.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::core::models::SessionPayload;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no session secret configured")]
    MissingSecret,

    #[error("session token is malformed")]
    Malformed,

    #[error("session signature does not match")]
    InvalidSignature,

    #[error("session expired")]
    Expired,
}

/// Signs and verifies admin session tokens.
#[derive(Clone)]
pub struct SessionCodec {
    secret: Option<Vec<u8>>,
}

impl SessionCodec {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret
                .filter(|s| !s.is_empty())
                .map(|s| s.as_bytes().to_vec()),
        }
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        let secret = self.secret.as_deref().ok_or(SessionError::MissingSecret)?;
        HmacSha256::new_from_slice(secret).map_err(|_| SessionError::MissingSecret)
    }

    pub fn encode(&self, payload: &SessionPayload) -> Result<String, SessionError> {
        let mut mac = self.mac()?;
        let json = serde_json::to_vec(payload).map_err(|_| SessionError::Malformed)?;
        let signed = format!("{}.{}", TOKEN_VERSION, URL_SAFE_NO_PAD.encode(json));

        mac.update(signed.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signed, signature))
    }

    /// Verifies `token` against the wall clock.
    pub fn decode(&self, token: &str) -> Result<SessionPayload, SessionError> {
        self.decode_at(token, Utc::now())
    }

    /// Verifies `token` as of `now`. The signature is checked before the
    /// payload is parsed, so unsigned input never reaches serde.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionPayload, SessionError> {
        let mut mac = self.mac()?;

        let (signed, signature) = token.rsplit_once('.').ok_or(SessionError::Malformed)?;
        let (version, payload) = signed.split_once('.').ok_or(SessionError::Malformed)?;
        if version != TOKEN_VERSION || payload.is_empty() || signature.is_empty() {
            return Err(SessionError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| SessionError::Malformed)?;
        mac.update(signed.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::InvalidSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| SessionError::Malformed)?;
        let payload: SessionPayload =
            serde_json::from_slice(&json).map_err(|_| SessionError::Malformed)?;

        if payload.is_expired_at(now) {
            return Err(SessionError::Expired);
        }

        Ok(payload)
    }
}
