use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};

use crate::app_error::{AppError, AppResult};
use crate::application::jwt;
use crate::domain::entities::member::normalize_email;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSession {
    pub email: String,
    /// Unix seconds.
    pub expires_at: i64,
}

#[async_trait]
pub trait AdminAuthenticator: Send + Sync {
    /// Returns the session token and the session it encodes.
    async fn login(&self, email: &str, password: &str) -> AppResult<(String, AdminSession)>;
    async fn logout(&self, token: &str) -> AppResult<()>;
    async fn current_session(&self, token: &str) -> AppResult<Option<AdminSession>>;
}

/// A single admin account taken from configuration, with JWT sessions.
pub struct ConfiguredAdminAuth {
    email: String,
    password_digest: [u8; 32],
    jwt_secret: SecretString,
    session_ttl: Duration,
    revoked: Mutex<HashMap<String, i64>>,
}

impl ConfiguredAdminAuth {
    pub fn new(
        email: &str,
        password: &SecretString,
        jwt_secret: SecretString,
        session_ttl: Duration,
    ) -> Self {
        Self {
            email: normalize_email(email),
            password_digest: digest(password.expose_secret()),
            jwt_secret,
            session_ttl,
            revoked: Mutex::new(HashMap::new()),
        }
    }

    fn is_revoked(&self, token: &str) -> AppResult<bool> {
        let revoked = self
            .revoked
            .lock()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(revoked.contains_key(&hex::encode(digest(token))))
    }
}

#[async_trait]
impl AdminAuthenticator for ConfiguredAdminAuth {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> AppResult<(String, AdminSession)> {
        let email_ok = normalize_email(email) == self.email;
        let password_ok = digest(password) == self.password_digest;
        if !(email_ok && password_ok) {
            warn!("Admin login rejected");
            return Err(AppError::InvalidCredentials);
        }

        let token = jwt::issue_admin(&self.email, &self.jwt_secret, self.session_ttl)?;
        let claims = jwt::verify_admin(&token, &self.jwt_secret)?;
        info!("Admin logged in");
        Ok((
            token,
            AdminSession {
                email: claims.sub,
                expires_at: claims.exp,
            },
        ))
    }

    #[instrument(skip(self, token))]
    async fn logout(&self, token: &str) -> AppResult<()> {
        let Ok(claims) = jwt::verify_admin(token, &self.jwt_secret) else {
            return Ok(());
        };
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let mut revoked = self
            .revoked
            .lock()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(hex::encode(digest(token)), claims.exp);
        info!("Admin logged out");
        Ok(())
    }

    async fn current_session(&self, token: &str) -> AppResult<Option<AdminSession>> {
        let Ok(claims) = jwt::verify_admin(token, &self.jwt_secret) else {
            return Ok(None);
        };
        if claims.sub != self.email || self.is_revoked(token)? {
            return Ok(None);
        }
        Ok(Some(AdminSession {
            email: claims.sub,
            expires_at: claims.exp,
        }))
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
