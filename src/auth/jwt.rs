//! JWT Token Handler
//! Mission: Mint and validate stateless session tokens securely

use crate::auth::models::Claims;
use crate::models::UserRole;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

const ISSUER: &str = "gatekeeper-backend";
const AUDIENCE: &str = "gatekeeper-users";

/// JWT manager for token operations. Tokens are stateless: nothing is kept
/// server-side, so a token stays valid until its expiry even after logout.
pub struct JwtManager {
    secret: String,
    expiration_hours: i64,
}

impl JwtManager {
    pub fn new(secret: String, expiration_hours: i64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }

    /// Issue a signed HS256 token for a user. Returns the compact token and
    /// its time-to-live in seconds.
    pub fn issue(&self, user_id: Uuid, role: UserRole) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.expiration_hours))
            .context("Invalid expiry timestamp")?
            .timestamp() as usize;

        let expires_in = (self.expiration_hours * 3600) as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iss: ISSUER.to_string(),
            aud: vec![AUDIENCE.to_string()],
            iat: now.timestamp() as usize,
            nbf: now.timestamp() as usize,
            exp: expiration,
        };

        debug!(
            user_id = %user_id,
            expires_in_hours = self.expiration_hours,
            "Issuing session token"
        );

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign token")?;

        Ok((token, expires_in))
    }

    /// Validate a token and extract its claims.
    ///
    /// Rejects: bad signature, any algorithm other than HS256 (a token
    /// claiming `none` or an asymmetric scheme never validates), issuer
    /// mismatch, audience missing or wrong, expired (zero leeway) and
    /// not-yet-valid tokens.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .context("Invalid or expired token")?;

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    fn manager() -> JwtManager {
        JwtManager::new("test-secret-key-12345".to_string(), 24)
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let jwt = manager();
        let user_id = Uuid::new_v4();

        let (token, expires_in) = jwt.issue(user_id, UserRole::Owner).unwrap();
        assert!(!token.is_empty());
        assert_eq!(expires_in, 24 * 3600);

        let claims = jwt.validate(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, UserRole::Owner);
        assert_eq!(claims.iss, ISSUER);
        assert!(claims.aud.contains(&AUDIENCE.to_string()));
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(manager().validate("invalid.token.here").is_err());
        assert!(manager().validate("").is_err());
    }

    #[test]
    fn test_different_secrets_reject() {
        let jwt1 = JwtManager::new("secret1".to_string(), 24);
        let jwt2 = JwtManager::new("secret2".to_string(), 24);

        let (token, _) = jwt1.issue(Uuid::new_v4(), UserRole::User).unwrap();
        assert!(jwt2.validate(&token).is_err());
    }

    #[test]
    fn test_algorithm_substitution_rejected() {
        // Same secret, but signed with a different HMAC variant: the
        // validator pins HS256 and must refuse the header's algorithm.
        let jwt = manager();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::Admin,
            iss: ISSUER.to_string(),
            aud: vec![AUDIENCE.to_string()],
            iat: Utc::now().timestamp() as usize,
            nbf: Utc::now().timestamp() as usize,
            exp: (Utc::now().timestamp() + 3600) as usize,
        };
        let forged = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();

        assert!(jwt.validate(&forged).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = manager();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::User,
            iss: ISSUER.to_string(),
            aud: vec![AUDIENCE.to_string()],
            iat: (now - 3600) as usize,
            nbf: (now - 3600) as usize,
            exp: (now - 1) as usize, // one second past expiry
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();

        assert!(jwt.validate(&token).is_err());
    }

    #[test]
    fn test_not_yet_valid_token_rejected() {
        let jwt = manager();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::User,
            iss: ISSUER.to_string(),
            aud: vec![AUDIENCE.to_string()],
            iat: now as usize,
            nbf: (now + 3600) as usize,
            exp: (now + 7200) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();

        assert!(jwt.validate(&token).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let jwt = manager();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::User,
            iss: "some-other-service".to_string(),
            aud: vec![AUDIENCE.to_string()],
            iat: now as usize,
            nbf: now as usize,
            exp: (now + 3600) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();

        assert!(jwt.validate(&token).is_err());
    }

    #[test]
    fn test_missing_or_wrong_audience_rejected() {
        let jwt = manager();
        let now = Utc::now().timestamp();

        let wrong_aud = Claims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::User,
            iss: ISSUER.to_string(),
            aud: vec!["someone-else".to_string()],
            iat: now as usize,
            nbf: now as usize,
            exp: (now + 3600) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &wrong_aud,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();
        assert!(jwt.validate(&token).is_err());

        // No audience claim at all.
        #[derive(Serialize)]
        struct NoAudClaims {
            sub: String,
            role: UserRole,
            iss: String,
            iat: usize,
            nbf: usize,
            exp: usize,
        }
        let no_aud = NoAudClaims {
            sub: Uuid::new_v4().to_string(),
            role: UserRole::User,
            iss: ISSUER.to_string(),
            iat: now as usize,
            nbf: now as usize,
            exp: (now + 3600) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &no_aud,
            &EncodingKey::from_secret("test-secret-key-12345".as_bytes()),
        )
        .unwrap();
        assert!(jwt.validate(&token).is_err());
    }
}
