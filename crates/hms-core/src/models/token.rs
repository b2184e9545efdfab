//! Revoked token model
//!
//! Logout stores the token's `jti` until the token would have expired anyway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entry in the token revocation set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedToken {
    /// Unique token id
    pub jti: String,

    /// Expiry of the revoked token; the entry is useless afterwards
    pub expires_at: DateTime<Utc>,

    pub revoked_at: DateTime<Utc>,
}

impl RevokedToken {
    pub fn new(jti: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            jti: jti.into(),
            expires_at,
            revoked_at: Utc::now(),
        }
    }

    /// Past the token's own expiry, so safe to purge
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
