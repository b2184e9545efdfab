//! Token sessions: issuing, validating and revoking bearer tokens
//!
//! A token is valid when its signature, issuer and expiry check out and
//! its `jti` is not in the revocation set. Logout adds the `jti` to the set
//! until the token's own expiry; the sweeper purges entries after that.

use crate::claims::Claims;
use crate::jwt::JwtService;
use chrono::Utc;
use hms_core::models::{RevokedToken, User};
use hms_core::traits::RevokedTokenRepository;
use hms_core::{AppError, AppResult};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A freshly issued token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Issues and checks bearer tokens against the revocation set
pub struct SessionManager {
    jwt: JwtService,
    revocations: Arc<dyn RevokedTokenRepository>,
}

impl SessionManager {
    pub fn new(jwt: JwtService, revocations: Arc<dyn RevokedTokenRepository>) -> Self {
        Self { jwt, revocations }
    }

    /// Sign a new token for the user
    pub fn issue(&self, user: &User) -> AppResult<IssuedToken> {
        let (token, claims) = self.jwt.issue(user)?;
        debug!(user_id = user.id, jti = %claims.jti, "Issued token");
        Ok(IssuedToken { token, claims })
    }

    /// Full validation, including the revocation set
    #[instrument(skip(self, token))]
    pub async fn validate(&self, token: &str) -> AppResult<Claims> {
        let claims = self.jwt.validate_token(token)?;

        if self.revocations.is_revoked(&claims.jti).await? {
            warn!(jti = %claims.jti, "Rejected revoked token");
            return Err(AppError::TokenRevoked);
        }

        Ok(claims)
    }

    /// Revoke a token until it expires
    ///
    /// Accepts expired tokens; they are already unusable, so nothing is
    /// stored. Revoking the same token twice is not an error.
    #[instrument(skip(self, token))]
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        let claims = self.jwt.decode_for_revocation(token)?;

        if claims.is_expired() {
            debug!(jti = %claims.jti, "Token already expired, nothing to revoke");
            return Ok(());
        }

        self.revocations
            .revoke(&RevokedToken::new(claims.jti.clone(), claims.expires_at()))
            .await?;

        info!(user_id = claims.uid, jti = %claims.jti, "Token revoked");
        Ok(())
    }

    /// Drop revocation entries for tokens that have expired
    pub async fn purge_expired(&self) -> AppResult<u64> {
        self.revocations.purge_expired(Utc::now()).await
    }

    /// Lifetime of issued tokens in seconds
    pub fn expiration_secs(&self) -> i64 {
        self.jwt.expiration_secs()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("jwt", &self.jwt)
            .finish_non_exhaustive()
    }
}
