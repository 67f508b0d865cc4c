use std::collections::HashSet;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Claims carried by a bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens for a single shared secret
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp: iat + self.expiry_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        self.verify_at(token, Utc::now())
    }

    /// Check signature and expiry against the supplied clock.
    ///
    /// Expiry is evaluated here rather than inside `jsonwebtoken` so the
    /// result depends only on the token, the secret and `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims =
            HashSet::from(["exp".to_string(), "sub".to_string()]);

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AppError::Forbidden("Invalid token".to_string()))?;

        if data.claims.sub.trim().is_empty() {
            return Err(AppError::Forbidden("Invalid token".to_string()));
        }

        if now.timestamp() >= data.claims.exp {
            return Err(AppError::Forbidden("Token expired".to_string()));
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn service() -> TokenService {
        TokenService::new("test-secret", 3600)
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let token = tokens.issue("user-1").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_valid_until_one_hour() {
        let tokens = service();
        let issued = Utc::now();
        let token = tokens.issue_at("user-1", issued).unwrap();

        assert!(tokens.verify_at(&token, issued + Duration::minutes(59)).is_ok());
        assert!(matches!(
            tokens.verify_at(&token, issued + Duration::hours(1)),
            Err(AppError::Forbidden(_))
        ));
        assert!(tokens.verify_at(&token, issued + Duration::hours(2)).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue("user-1").unwrap();
        let other = TokenService::new("other-secret", 3600);
        assert!(matches!(other.verify(&token), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            service().verify("not.a.token"),
            Err(AppError::Forbidden(_))
        ));
    }
}
