//! In-memory mocks for member check-in sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    app_error::AppResult,
    application::use_cases::check_in::{MemberSession, MemberSessionStore},
};

#[derive(Default)]
pub struct InMemoryMemberSessionStore {
    pub sessions: Mutex<HashMap<String, MemberSession>>,
}

impl InMemoryMemberSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl MemberSessionStore for InMemoryMemberSessionStore {
    async fn save(&self, token_hash: &str, session: &MemberSession) -> AppResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(token_hash.to_string(), session.clone());
        Ok(())
    }

    async fn get(&self, token_hash: &str) -> AppResult<Option<MemberSession>> {
        Ok(self.sessions.lock().unwrap().get(token_hash).cloned())
    }

    async fn clear(&self, token_hash: &str) -> AppResult<()> {
        self.sessions.lock().unwrap().remove(token_hash);
        Ok(())
    }
}
