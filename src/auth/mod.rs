pub mod password;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::Role;

/// Lifetime of an issued token in seconds. There is no refresh.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: Uuid, role: Role, issued_at: DateTime<Utc>) -> Self {
        Self {
            id,
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Token expired")]
    Expired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Signs and verifies HS256 tokens with the configured secret.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
}

impl TokenService {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }
        Ok(Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
        })
    }

    pub fn issue(&self, id: Uuid, role: Role) -> Result<String, AuthError> {
        self.issue_at(id, role, Utc::now())
    }

    pub fn issue_at(&self, id: Uuid, role: Role, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        encode(&Header::default(), &Claims::new(id, role, issued_at), &self.keys.encoding)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Claims>(token, &self.keys.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_rejected() {
        assert!(matches!(TokenService::new(""), Err(AuthError::InvalidSecret)));
    }

    #[test]
    fn issued_token_round_trips_identity_and_expiry() {
        let tokens = TokenService::new("test-secret").unwrap();
        let id = Uuid::new_v4();
        let token = tokens.issue(id, Role::Parent).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.role, Role::Parent);
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new("test-secret").unwrap();
        let token = tokens
            .issue_at(Uuid::new_v4(), Role::Admin, Utc::now() - Duration::hours(25))
            .unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let ours = TokenService::new("test-secret").unwrap();
        let theirs = TokenService::new("other-secret").unwrap();
        let token = theirs.issue(Uuid::new_v4(), Role::Admin).unwrap();
        assert!(matches!(ours.verify(&token), Err(AuthError::InvalidToken(_))));
        assert!(matches!(ours.verify("garbage"), Err(AuthError::InvalidToken(_))));
    }
}
