use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::{AppError, Result};

/// The claims carried by a bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The principal's user id.
    pub sub: String,
    /// The issue timestamp (unix seconds).
    pub iat: i64,
    /// The expiry timestamp (unix seconds).
    pub exp: i64,
}

/// Issues a signed HS256 bearer token for a user.
pub fn issue_token(secret: &str, user_id: Uuid, expire_minutes: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(expire_minutes)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))
}

/// Verifies a bearer token and returns the principal's user id.
///
/// Signature and expiry are both checked; any failure is an
/// authentication error, never a detailed diagnostic.
pub fn verify_token(secret: &str, token: &str) -> Result<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))?;

    Uuid::parse_str(&data.claims.sub)
        .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-at-least-32-chars-long";

    #[test]
    fn issue_and_verify_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token(SECRET, user_id, 60).unwrap();
        assert_eq!(verify_token(SECRET, &token).unwrap(), user_id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(SECRET, Uuid::new_v4(), 60).unwrap();
        assert!(verify_token("another-secret-also-32-chars-long!!", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // jsonwebtoken's default validation has 60s of leeway.
        let token = issue_token(SECRET, Uuid::new_v4(), -5).unwrap();
        assert!(verify_token(SECRET, &token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(verify_token(SECRET, "not.a.token").is_err());
    }
}
