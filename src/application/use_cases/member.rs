use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::use_cases::otp::{IssuedOtp, OtpUseCases};
use crate::application::validators::is_valid_email;
use crate::domain::entities::member::{Member, MemberCategory, NewMember, normalize_email};

// ============================================================================
// Repository Trait
// ============================================================================

#[async_trait]
pub trait MemberRepo: Send + Sync {
    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Member>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Member>>;
    /// All members ordered by name.
    async fn list_by_name(&self) -> AppResult<Vec<Member>>;
    /// Fails with `DuplicateEmail` if the email is already registered.
    async fn insert(&self, draft: &MemberDraft) -> AppResult<Member>;
    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<Option<Member>>;
}

/// A validated registration, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    pub category: MemberCategory,
    pub phone: Option<String>,
    pub role: Option<String>,
}

impl MemberDraft {
    pub fn parse(input: NewMember) -> AppResult<Self> {
        let name = input.name.trim().to_string();
        let email = input.email.trim().to_string();
        let category = input.category.trim().to_string();

        if name.is_empty() || email.is_empty() || category.is_empty() {
            return Err(AppError::InvalidInput(
                "Please fill in all required fields".into(),
            ));
        }
        if !is_valid_email(&email) {
            return Err(AppError::InvalidInput("Enter a valid email address".into()));
        }
        let category = MemberCategory::parse(&category).ok_or_else(|| {
            AppError::InvalidInput(format!("Unknown member category: {category}"))
        })?;

        Ok(Self {
            name,
            email: normalize_email(&email),
            category,
            phone: non_blank(input.phone),
            role: non_blank(input.role),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolves an email to a member that may sign in or receive a code.
pub(crate) async fn resolve_active_member(repo: &dyn MemberRepo, email: &str) -> AppResult<Member> {
    let member = repo
        .find_by_email(&normalize_email(email))
        .await?
        .ok_or(AppError::MemberNotFound)?;
    if !member.is_active {
        return Err(AppError::MemberInactive);
    }
    Ok(member)
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredMember {
    pub member: Member,
    pub otp: IssuedOtp,
}

#[derive(Clone)]
pub struct MemberUseCases {
    repo: Arc<dyn MemberRepo>,
    otp: Arc<OtpUseCases>,
}

impl MemberUseCases {
    pub fn new(repo: Arc<dyn MemberRepo>, otp: Arc<OtpUseCases>) -> Self {
        Self { repo, otp }
    }

    /// Adds an active member and sends them a first passcode.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: NewMember) -> AppResult<RegisteredMember> {
        let draft = MemberDraft::parse(input)?;
        let member = self.repo.insert(&draft).await?;
        info!(member_id = %member.id, category = %member.category, "Member registered");

        let otp = self.otp.issue(&member.email).await?;
        Ok(RegisteredMember { member, otp })
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<Member>> {
        self.repo.list_by_name().await
    }

    #[instrument(skip(self))]
    pub async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<Member> {
        let member = self
            .repo
            .set_active(id, is_active)
            .await?
            .ok_or(AppError::NotFound)?;
        info!(member_id = %id, is_active, "Member status changed");
        Ok(member)
    }

    /// Replaces any live code for the member with a fresh one.
    #[instrument(skip(self))]
    pub async fn regenerate_otp(&self, id: Uuid) -> AppResult<IssuedOtp> {
        let member = self.repo.get_by_id(id).await?.ok_or(AppError::NotFound)?;
        self.otp.resend(&member.email).await
    }
}
