use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::AppResult;
use crate::application::use_cases::member::MemberRepo;
use crate::application::use_cases::visit::VisitLogRepo;
use crate::domain::entities::member::{Member, MemberCategory};
use crate::domain::entities::visit_log::VisitLog;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberStatus {
    #[serde(flatten)]
    pub member: Member,
    pub is_signed_in: bool,
    pub current_visit_id: Option<Uuid>,
    pub current_sign_in_time: Option<NaiveDateTime>,
    pub current_sign_out_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedInMember {
    pub member_id: Uuid,
    pub visit_id: Uuid,
    pub name: String,
    pub email: String,
    pub category: MemberCategory,
    pub sign_in_time: NaiveDateTime,
    pub duration_seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceStats {
    pub total_members: usize,
    pub active_members: usize,
    pub today_sign_ins: usize,
    pub currently_in_office: usize,
}

/// Read-side queries over the roster joined with the visit log.
#[derive(Clone)]
pub struct StatusUseCases {
    members: Arc<dyn MemberRepo>,
    visits: Arc<dyn VisitLogRepo>,
    utc_offset: Duration,
}

impl StatusUseCases {
    /// `utc_offset` places the office day boundary (local midnight).
    pub fn new(members: Arc<dyn MemberRepo>, visits: Arc<dyn VisitLogRepo>, utc_offset: Duration) -> Self {
        Self {
            members,
            visits,
            utc_offset,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_with_status(&self) -> AppResult<Vec<MemberStatus>> {
        let day_start = self.office_day_start(Utc::now().naive_utc());
        let members = self.members.list_by_name().await?;
        let open = self.visits.list_open().await?;
        let closed_today = self.visits.list_closed_since(day_start).await?;
        Ok(project(members, &open, &closed_today))
    }

    #[instrument(skip(self))]
    pub async fn signed_in_members(&self) -> AppResult<Vec<SignedInMember>> {
        let now = Utc::now().naive_utc();
        let members: HashMap<Uuid, Member> = self
            .members
            .list_by_name()
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut rows: Vec<SignedInMember> = self
            .visits
            .list_open()
            .await?
            .into_iter()
            .filter_map(|visit| {
                let member = members.get(&visit.member_id)?;
                Some(SignedInMember {
                    member_id: member.id,
                    visit_id: visit.id,
                    name: member.name.clone(),
                    email: member.email.clone(),
                    category: member.category,
                    sign_in_time: visit.sign_in_time,
                    duration_seconds: (now - visit.sign_in_time).num_seconds().max(0),
                })
            })
            .collect();
        rows.sort_by_key(|row| row.sign_in_time);
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> AppResult<AttendanceStats> {
        let day_start = self.office_day_start(Utc::now().naive_utc());
        let members = self.members.list_by_name().await?;
        let open = self.visits.list_open().await?;
        let closed_today = self.visits.list_closed_since(day_start).await?;

        let today_sign_ins = open
            .iter()
            .chain(closed_today.iter())
            .filter(|v| v.sign_in_time >= day_start)
            .count();

        Ok(AttendanceStats {
            total_members: members.len(),
            active_members: members.iter().filter(|m| m.is_active).count(),
            today_sign_ins,
            currently_in_office: open.len(),
        })
    }

    /// Start of the office-local day containing `now`, expressed in UTC.
    pub fn office_day_start(&self, now: NaiveDateTime) -> NaiveDateTime {
        let local = now + self.utc_offset;
        local.date().and_time(NaiveTime::MIN) - self.utc_offset
    }
}

/// Joins members with open visits and today's closed visits, then orders
/// signed-in first, active next, then by name.
pub fn project(members: Vec<Member>, open: &[VisitLog], closed_today: &[VisitLog]) -> Vec<MemberStatus> {
    let open_by_member: HashMap<Uuid, &VisitLog> = open.iter().map(|v| (v.member_id, v)).collect();

    let mut latest_closed: HashMap<Uuid, &VisitLog> = HashMap::new();
    for visit in closed_today.iter().filter(|v| !v.is_open()) {
        latest_closed
            .entry(visit.member_id)
            .and_modify(|current| {
                if visit.sign_out_time > current.sign_out_time {
                    *current = visit;
                }
            })
            .or_insert(visit);
    }

    let mut rows: Vec<MemberStatus> = members
        .into_iter()
        .map(|member| {
            if let Some(visit) = open_by_member.get(&member.id) {
                MemberStatus {
                    is_signed_in: true,
                    current_visit_id: Some(visit.id),
                    current_sign_in_time: Some(visit.sign_in_time),
                    current_sign_out_time: None,
                    member,
                }
            } else if let Some(visit) = latest_closed.get(&member.id) {
                MemberStatus {
                    is_signed_in: false,
                    current_visit_id: None,
                    current_sign_in_time: Some(visit.sign_in_time),
                    current_sign_out_time: visit.sign_out_time,
                    member,
                }
            } else {
                MemberStatus {
                    is_signed_in: false,
                    current_visit_id: None,
                    current_sign_in_time: None,
                    current_sign_out_time: None,
                    member,
                }
            }
        })
        .collect();

    rows.sort_by(display_order);
    rows
}

fn display_order(a: &MemberStatus, b: &MemberStatus) -> Ordering {
    b.is_signed_in
        .cmp(&a.is_signed_in)
        .then_with(|| b.member.is_active.cmp(&a.member.is_active))
        .then_with(|| {
            a.member
                .name
                .to_lowercase()
                .cmp(&b.member.name.to_lowercase())
        })
}

/// Case-insensitive substring match over name, email, role and category.
pub fn search(statuses: &[MemberStatus], query: &str) -> Vec<MemberStatus> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return statuses.to_vec();
    }
    statuses
        .iter()
        .filter(|s| {
            let m = &s.member;
            let haystack = format!(
                "{} {} {} {}",
                m.name,
                m.email,
                m.role.as_deref().unwrap_or(""),
                m.category
            )
            .to_lowercase();
            haystack.contains(&needle)
        })
        .cloned()
        .collect()
}
