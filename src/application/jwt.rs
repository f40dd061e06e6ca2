use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::app_error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String, // admin email
    pub exp: i64,
    pub iat: i64,
}

pub fn issue_admin(email: &str, secret: &SecretString, ttl: Duration) -> AppResult<String> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = AdminClaims {
        sub: email.to_string(),
        iat: now,
        exp: now + ttl.whole_seconds(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify_admin(token: &str, secret: &SecretString) -> AppResult<AdminClaims> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string().into())
    }

    #[test]
    fn issued_token_verifies() {
        let token = issue_admin("admin@x.com", &secret("s3cret"), Duration::hours(1)).unwrap();
        let claims = verify_admin(&token, &secret("s3cret")).unwrap();
        assert_eq!(claims.sub, "admin@x.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_admin("admin@x.com", &secret("one"), Duration::hours(1)).unwrap();
        assert!(matches!(
            verify_admin(&token, &secret("two")),
            Err(AppError::InvalidCredentials)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        // Default validation leeway is 60s.
        let token = issue_admin("admin@x.com", &secret("k"), Duration::minutes(-5)).unwrap();
        assert!(verify_admin(&token, &secret("k")).is_err());
    }
}
