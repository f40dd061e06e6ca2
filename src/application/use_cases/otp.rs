use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::app_error::AppResult;
use crate::application::use_cases::member::{MemberRepo, resolve_active_member};
use crate::application::validators::is_well_formed_code;
use crate::domain::entities::member::{Member, normalize_email};
use crate::domain::entities::otp_code::OtpCode;

// ============================================================================
// Ports
// ============================================================================

#[async_trait]
pub trait OtpRepo: Send + Sync {
    /// Inserts or replaces the code for `code.email`.
    async fn upsert(&self, code: &OtpCode) -> AppResult<()>;
    async fn get(&self, email: &str) -> AppResult<Option<OtpCode>>;
    /// Atomically deletes and returns the record if `code` matches. A mismatch leaves it in place.
    async fn consume(&self, email: &str, code: &str) -> AppResult<Option<OtpCode>>;
    async fn delete(&self, email: &str) -> AppResult<()>;
}

#[async_trait]
pub trait OtpMailer: Send + Sync {
    /// `Ok(false)` when the provider refused the message; `Err` only for transport faults.
    async fn send_code(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
        company_name: &str,
    ) -> AppResult<bool>;
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IssuedOtp {
    pub email: String,
    pub code: String,
    pub expires_at: NaiveDateTime,
    /// False when the email could not be handed to the provider. The code is still valid.
    pub delivered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpVerdict {
    Valid,
    /// No record, or the code did not match. Deliberately indistinguishable.
    NotFound,
    Expired,
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct OtpUseCases {
    members: Arc<dyn MemberRepo>,
    codes: Arc<dyn OtpRepo>,
    mailer: Arc<dyn OtpMailer>,
    company_name: String,
    ttl_minutes: i64,
}

impl OtpUseCases {
    pub fn new(
        members: Arc<dyn MemberRepo>,
        codes: Arc<dyn OtpRepo>,
        mailer: Arc<dyn OtpMailer>,
        company_name: String,
        ttl_minutes: i64,
    ) -> Self {
        Self {
            members,
            codes,
            mailer,
            company_name,
            ttl_minutes,
        }
    }

    pub fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }

    /// Issue a code for an active member, overwriting any live one.
    #[instrument(skip(self))]
    pub async fn issue(&self, email: &str) -> AppResult<IssuedOtp> {
        let member = resolve_active_member(self.members.as_ref(), email).await?;
        self.issue_for(&member).await
    }

    /// Drop the member's current code, then issue a new one with a fresh window.
    #[instrument(skip(self))]
    pub async fn resend(&self, email: &str) -> AppResult<IssuedOtp> {
        let member = resolve_active_member(self.members.as_ref(), email).await?;
        self.codes.delete(&normalize_email(&member.email)).await?;
        self.issue_for(&member).await
    }

    /// Check a submitted code. Any matching record is deleted, expired or not.
    #[instrument(skip(self, submitted))]
    pub async fn verify(&self, email: &str, submitted: &str) -> AppResult<OtpVerdict> {
        let email = normalize_email(email);
        let submitted = submitted.trim();
        if !is_well_formed_code(submitted) {
            warn!(%email, "Rejected malformed code");
            return Ok(OtpVerdict::NotFound);
        }

        let live = self.codes.get(&email).await?;
        if !live.is_some_and(|record| record.code == submitted) {
            warn!(%email, "Invalid code submitted");
            return Ok(OtpVerdict::NotFound);
        }

        // A concurrent verification may have taken the code in between.
        let Some(record) = self.codes.consume(&email, submitted).await? else {
            warn!(%email, "Code already used");
            return Ok(OtpVerdict::NotFound);
        };

        if record.is_expired(Utc::now().naive_utc()) {
            info!(%email, expired_at = %record.expires_at, "Expired code submitted");
            return Ok(OtpVerdict::Expired);
        }

        Ok(OtpVerdict::Valid)
    }

    async fn issue_for(&self, member: &Member) -> AppResult<IssuedOtp> {
        let now = Utc::now().naive_utc();
        // Rows created before emails were lower-cased may carry mixed case.
        let record = OtpCode {
            email: normalize_email(&member.email),
            code: generate_code(),
            expires_at: now + Duration::minutes(self.ttl_minutes),
            issued_at: now,
        };
        self.codes.upsert(&record).await?;

        // The stored code stays valid whatever happens to the email.
        let delivered = match self
            .mailer
            .send_code(&member.email, &member.name, &record.code, &self.company_name)
            .await
        {
            Ok(true) => true,
            Ok(false) => {
                warn!(email = %member.email, "Email provider did not accept the code message");
                false
            }
            Err(err) => {
                warn!(email = %member.email, error = %err, "Code email dispatch failed");
                false
            }
        };

        info!(email = %member.email, delivered, "Code issued");
        Ok(IssuedOtp {
            email: record.email,
            code: record.code,
            expires_at: record.expires_at,
            delivered,
        })
    }
}

/// Uniform over 100000..=999999.
fn generate_code() -> String {
    rand::rngs::OsRng.gen_range(100_000..=999_999u32).to_string()
}
