use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

/// Signed session payload carried in the cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated user id.
    pub sub: Uuid,
    /// Token id; the key revocation is tracked under.
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Issues, resolves, and revokes cookie-carried session tokens.
///
/// A token is Active until its expiry passes or it is revoked; both end
/// states are absorbing. Revocation is a single-node in-memory set keyed by
/// token id, mutated synchronously on logout and stale-user cleanup.
#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    revoked: Arc<Mutex<HashSet<Uuid>>>,
}

impl SessionManager {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            revoked: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a new token bound to `user_id`. A user may hold any number of
    /// concurrent valid tokens.
    pub fn create(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = SessionClaims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, jti = %claims.jti, "session issued");
        Ok(token)
    }

    /// Resolve a token to its user id. Missing, malformed, expired, and
    /// revoked tokens all collapse into `None`; callers must not learn
    /// which.
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)
            .ok()?
            .claims;
        if self.revoked.lock().unwrap().contains(&claims.jti) {
            return None;
        }
        Some(claims.sub)
    }

    /// Revoke a token. Idempotent: revoking an already-revoked, expired, or
    /// garbage token is a no-op success.
    pub fn revoke(&self, token: &str) {
        // Expiry is deliberately ignored here; an expired token is already
        // a terminal state and marking it revoked changes nothing.
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        if let Ok(data) = decode::<SessionClaims>(token, &self.decoding, &validation) {
            debug!(jti = %data.claims.jti, "session revoked");
            self.revoked.lock().unwrap().insert(data.claims.jti);
        }
    }
}
