//! Upload credentials.
//!
//! A credential is an HS256 JWT carrying `{sub, iss, iat, exp}`. Nothing is stored
//! server-side: a token is valid when its signature and issuer check out and the
//! current time lies in `[iat, exp]`. Tokens are bearer credentials and stay
//! reusable until they expire.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::FilehostConfig;

/// Claims carried by an upload credential
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadClaims {
    pub sub: String, // account name of the uploader
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Signing key is not configured")]
    MissingKey,

    #[error("Credential lifetime bounds are invalid: min {min:?} exceeds max {max:?}")]
    InvalidTtlBounds { min: Duration, max: Duration },

    #[error("Failed to sign credential: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies upload credentials.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_min: Duration,
    ttl_max: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl_min", &self.ttl_min)
            .field("ttl_max", &self.ttl_max)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        ttl_min: Duration,
        ttl_max: Duration,
    ) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingKey);
        }
        if ttl_min > ttl_max {
            return Err(TokenError::InvalidTtlBounds {
                min: ttl_min,
                max: ttl_max,
            });
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            ttl_min,
            ttl_max,
        })
    }

    pub fn from_config(config: &FilehostConfig) -> Result<Self, TokenError> {
        Self::new(
            config.token_secret.as_bytes(),
            config.token_issuer.clone(),
            config.token_ttl_min,
            config.token_ttl_max,
        )
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a credential for `identity` valid for `ttl` (clamped to the configured bounds).
    pub fn issue(&self, identity: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(identity, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = ttl.clamp(self.ttl_min, self.ttl_max);
        let iat = now.timestamp();
        let claims = UploadClaims {
            sub: identity.to_string(),
            iss: self.issuer.clone(),
            iat,
            exp: iat.saturating_add(ttl.as_secs() as i64),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a credential and return the identity it was issued to.
    ///
    /// Every failure yields `None`; the reason is only logged.
    pub fn verify(&self, token: &str) -> Option<String> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["sub", "iss", "iat", "exp"]);
        // Time window is checked below against `now`.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let claims = match decode::<UploadClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "Upload credential rejected");
                return None;
            }
        };

        let now = now.timestamp();
        if now < claims.iat || now > claims.exp {
            tracing::debug!(
                iat = claims.iat,
                exp = claims.exp,
                now,
                "Upload credential outside its validity window"
            );
            return None;
        }

        Some(claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service() -> TokenService {
        TokenService::new(
            SECRET,
            "filehost",
            Duration::from_secs(60),
            Duration::from_secs(86_400),
        )
        .unwrap()
    }

    #[test]
    fn test_inverted_ttl_bounds_rejected() {
        let result = TokenService::new(
            SECRET,
            "filehost",
            Duration::from_secs(600),
            Duration::from_secs(60),
        );
        assert!(matches!(result, Err(TokenError::InvalidTtlBounds { .. })));
    }

    #[test]
    fn test_issue_then_verify_returns_identity() {
        let tokens = service();
        let token = tokens.issue("alice", Duration::from_secs(300)).unwrap();
        assert_eq!(tokens.verify(&token), Some("alice".to_string()));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let issued = Utc::now();
        let token = tokens
            .issue_at("alice", Duration::from_secs(60), issued)
            .unwrap();

        assert!(tokens
            .verify_at(&token, issued + TimeDelta::seconds(60))
            .is_some());
        assert!(tokens
            .verify_at(&token, issued + TimeDelta::seconds(61))
            .is_none());
    }

    #[test]
    fn test_token_not_valid_before_issue() {
        let tokens = service();
        let issued = Utc::now();
        let token = tokens
            .issue_at("alice", Duration::from_secs(60), issued)
            .unwrap();
        assert!(tokens
            .verify_at(&token, issued - TimeDelta::seconds(5))
            .is_none());
    }

    #[test]
    fn test_ttl_clamped_to_bounds() {
        let tokens = service();
        let issued = Utc::now();
        // Requested 1s, clamped up to 60s.
        let token = tokens
            .issue_at("alice", Duration::from_secs(1), issued)
            .unwrap();
        assert!(tokens
            .verify_at(&token, issued + TimeDelta::seconds(30))
            .is_some());

        // Requested 10 days, clamped down to 24h.
        let token = tokens
            .issue_at("alice", Duration::from_secs(10 * 86_400), issued)
            .unwrap();
        assert!(tokens
            .verify_at(&token, issued + TimeDelta::seconds(86_401))
            .is_none());
    }

    #[test]
    fn test_different_secret_rejected() {
        let token = service().issue("alice", Duration::from_secs(300)).unwrap();
        let other = TokenService::new(
            b"ffffffffffffffffffffffffffffffff",
            "filehost",
            Duration::from_secs(60),
            Duration::from_secs(86_400),
        )
        .unwrap();
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_different_issuer_rejected() {
        let token = service().issue("alice", Duration::from_secs(300)).unwrap();
        let other = TokenService::new(
            SECRET,
            "someone-else",
            Duration::from_secs(60),
            Duration::from_secs(86_400),
        )
        .unwrap();
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let tokens = service();
        for garbage in ["", "abc", "a.b.c", "....", "Bearer x"] {
            assert!(tokens.verify(garbage).is_none(), "accepted {:?}", garbage);
        }
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let result = TokenService::new(
            b"",
            "filehost",
            Duration::from_secs(60),
            Duration::from_secs(86_400),
        );
        assert!(matches!(result, Err(TokenError::MissingKey)));
    }
}
