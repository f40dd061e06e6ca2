//! In-memory mock for the member roster.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::member::{MemberDraft, MemberRepo},
    domain::entities::member::Member,
};

#[derive(Default)]
pub struct InMemoryMemberRepo {
    pub members: Mutex<HashMap<Uuid, Member>>,
}

impl InMemoryMemberRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with initial members.
    pub fn with_members(members: Vec<Member>) -> Self {
        let map = members.into_iter().map(|m| (m.id, m)).collect();
        Self {
            members: Mutex::new(map),
        }
    }

    pub fn get_all(&self) -> Vec<Member> {
        self.members.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl MemberRepo for InMemoryMemberRepo {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Member>> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .values()
            .find(|m| m.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Member>> {
        Ok(self.members.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_name(&self) -> AppResult<Vec<Member>> {
        let mut members = self.get_all();
        members.sort_by_key(|m| m.name.to_lowercase());
        Ok(members)
    }

    async fn insert(&self, draft: &MemberDraft) -> AppResult<Member> {
        let mut members = self.members.lock().unwrap();
        if members
            .values()
            .any(|m| m.email.eq_ignore_ascii_case(&draft.email))
        {
            return Err(AppError::DuplicateEmail);
        }

        let member = Member {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            email: draft.email.clone(),
            category: draft.category,
            phone: draft.phone.clone(),
            role: draft.role.clone(),
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        };
        members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<Option<Member>> {
        let mut members = self.members.lock().unwrap();
        Ok(members.get_mut(&id).map(|m| {
            m.is_active = is_active;
            m.clone()
        }))
    }
}
