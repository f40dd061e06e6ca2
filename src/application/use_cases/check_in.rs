use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::use_cases::otp::{OtpUseCases, OtpVerdict};
use crate::application::use_cases::visit::{VisitRecord, VisitUseCases};
use crate::domain::entities::member::normalize_email;

/// What the check-in screen remembers about a signed-in member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSession {
    pub member_id: Uuid,
    pub email: String,
    pub name: String,
    pub visit_id: Uuid,
    pub sign_in_time: NaiveDateTime,
}

#[async_trait]
pub trait MemberSessionStore: Send + Sync {
    async fn save(&self, token_hash: &str, session: &MemberSession) -> AppResult<()>;
    async fn get(&self, token_hash: &str) -> AppResult<Option<MemberSession>>;
    async fn clear(&self, token_hash: &str) -> AppResult<()>;
}

#[derive(Clone)]
pub struct CheckInUseCases {
    otp: Arc<OtpUseCases>,
    visits: Arc<VisitUseCases>,
    sessions: Arc<dyn MemberSessionStore>,
}

impl CheckInUseCases {
    pub fn new(
        otp: Arc<OtpUseCases>,
        visits: Arc<VisitUseCases>,
        sessions: Arc<dyn MemberSessionStore>,
    ) -> Self {
        Self {
            otp,
            visits,
            sessions,
        }
    }

    /// Consumes the code, opens a visit and returns the raw session token with the session.
    #[instrument(skip(self, code))]
    pub async fn verify_and_sign_in(
        &self,
        email: &str,
        code: &str,
    ) -> AppResult<(String, MemberSession)> {
        match self.otp.verify(email, code).await? {
            OtpVerdict::Valid => {}
            OtpVerdict::NotFound => return Err(AppError::InvalidCode),
            OtpVerdict::Expired => return Err(AppError::CodeExpired),
        }

        let visit = self.visits.sign_in(email).await?;
        let session = MemberSession {
            member_id: visit.member_id,
            email: normalize_email(email),
            name: visit.member_name.clone(),
            visit_id: visit.id,
            sign_in_time: visit.sign_in_time,
        };

        let token = generate_token();
        self.sessions.save(&hash_token(&token), &session).await?;
        info!(member_id = %session.member_id, "Check-in session started");
        Ok((token, session))
    }

    #[instrument(skip(self, token))]
    pub async fn sign_out(&self, token: &str) -> AppResult<VisitRecord> {
        let token_hash = hash_token(token);
        let session = self
            .sessions
            .get(&token_hash)
            .await?
            .ok_or(AppError::NoActiveSession)?;

        let result = self.visits.sign_out(&session.email).await;
        if let Err(AppError::NoOpenVisit) = &result {
            warn!(member_id = %session.member_id, "Session outlived its visit");
        }
        if matches!(result, Ok(_) | Err(AppError::NoOpenVisit)) {
            self.sessions.clear(&token_hash).await?;
        }
        result
    }

    #[instrument(skip(self, token))]
    pub async fn current_session(&self, token: &str) -> AppResult<Option<MemberSession>> {
        self.sessions.get(&hash_token(token)).await
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn hash_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}
