//! Session 数据模型

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims carried inside a signed admin session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Upstream access token, replayed as `Authorization: Bearer ...`
    pub access_token: String,

    /// Unix timestamp (seconds) after which the token is rejected
    pub expires_at: i64,

    /// Auxiliary claims (user id, email, role...) kept opaque
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl SessionPayload {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: expires_at.timestamp(),
            claims: Map::new(),
        }
    }

    pub fn with_claim(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(key.into(), value.into());
        self
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires_at, 0).single()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at
    }
}
