use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::use_cases::member::{MemberRepo, resolve_active_member};
use crate::domain::entities::member::{Member, normalize_email};
use crate::domain::entities::visit_log::{VisitChange, VisitLog};

// ============================================================================
// Ports
// ============================================================================

#[async_trait]
pub trait VisitLogRepo: Send + Sync {
    /// Opens a visit. Fails with `AlreadySignedIn` if the store already holds an open one.
    async fn insert_open(&self, member_id: Uuid, sign_in_time: NaiveDateTime) -> AppResult<VisitLog>;
    async fn find_open_by_member(&self, member_id: Uuid) -> AppResult<Option<VisitLog>>;
    /// Sets the sign-out time only if the visit is still open. `None` when nothing was closed.
    async fn close(&self, visit_id: Uuid, sign_out_time: NaiveDateTime) -> AppResult<Option<VisitLog>>;
    async fn list_open(&self) -> AppResult<Vec<VisitLog>>;
    /// Closed visits whose sign-out time is at or after `since`.
    async fn list_closed_since(&self, since: NaiveDateTime) -> AppResult<Vec<VisitLog>>;
}

/// Push notifications for inserts and updates on the visit log.
pub trait VisitChangeFeed: Send + Sync {
    fn subscribe(&self) -> broadcast::Receiver<VisitChange>;
}

// ============================================================================
// Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VisitRecord {
    pub id: Uuid,
    pub member_id: Uuid,
    pub member_name: String,
    pub sign_in_time: NaiveDateTime,
    pub sign_out_time: Option<NaiveDateTime>,
    pub duration_seconds: Option<i64>,
}

impl VisitRecord {
    fn new(visit: &VisitLog, member: &Member) -> Self {
        Self {
            id: visit.id,
            member_id: member.id,
            member_name: member.name.clone(),
            sign_in_time: visit.sign_in_time,
            sign_out_time: visit.sign_out_time,
            duration_seconds: visit.duration().map(|d| d.num_seconds()),
        }
    }
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct VisitUseCases {
    members: Arc<dyn MemberRepo>,
    visits: Arc<dyn VisitLogRepo>,
}

impl VisitUseCases {
    pub fn new(members: Arc<dyn MemberRepo>, visits: Arc<dyn VisitLogRepo>) -> Self {
        Self { members, visits }
    }

    #[instrument(skip(self))]
    pub async fn sign_in(&self, email: &str) -> AppResult<VisitRecord> {
        let member = resolve_active_member(self.members.as_ref(), email).await?;

        if self.visits.find_open_by_member(member.id).await?.is_some() {
            return Err(AppError::AlreadySignedIn);
        }

        // A concurrent sign-in that slips past the check above is stopped by the store.
        let visit = self
            .visits
            .insert_open(member.id, Utc::now().naive_utc())
            .await?;

        info!(member_id = %member.id, visit_id = %visit.id, "Member signed in");
        Ok(VisitRecord::new(&visit, &member))
    }

    /// Closes the member's open visit. Deactivated members can still leave.
    #[instrument(skip(self))]
    pub async fn sign_out(&self, email: &str) -> AppResult<VisitRecord> {
        let member = self
            .members
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::MemberNotFound)?;

        let open = self
            .visits
            .find_open_by_member(member.id)
            .await?
            .ok_or(AppError::NoOpenVisit)?;

        let sign_out_time = Utc::now().naive_utc().max(open.sign_in_time);
        let closed = self
            .visits
            .close(open.id, sign_out_time)
            .await?
            .ok_or(AppError::NoOpenVisit)?;

        info!(
            member_id = %member.id,
            visit_id = %closed.id,
            duration_secs = closed.duration().map(|d| d.num_seconds()),
            "Member signed out"
        );
        Ok(VisitRecord::new(&closed, &member))
    }
}
