//! In-memory visit log that doubles as its own change feed.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Mutex;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::visit::{VisitChangeFeed, VisitLogRepo},
    domain::entities::visit_log::{VisitChange, VisitLog},
};

pub struct InMemoryVisitLogRepo {
    pub visits: Mutex<Vec<VisitLog>>,
    changes: broadcast::Sender<VisitChange>,
}

impl Default for InMemoryVisitLogRepo {
    fn default() -> Self {
        Self::with_visits(vec![])
    }
}

impl InMemoryVisitLogRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visits(visits: Vec<VisitLog>) -> Self {
        let (changes, _) = broadcast::channel(64);
        Self {
            visits: Mutex::new(visits),
            changes,
        }
    }

    pub fn open_count(&self, member_id: Uuid) -> usize {
        self.visits
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.member_id == member_id && v.is_open())
            .count()
    }

    pub fn open_visits(&self) -> Vec<VisitLog> {
        self.visits
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.is_open())
            .cloned()
            .collect()
    }

    pub fn total(&self) -> usize {
        self.visits.lock().unwrap().len()
    }

    /// Opens a visit signed in just now, as if another process had written it.
    pub fn seed_open(&self, member_id: Uuid) -> VisitLog {
        let visit = VisitLog {
            id: Uuid::new_v4(),
            member_id,
            sign_in_time: chrono::Utc::now().naive_utc(),
            sign_out_time: None,
        };
        self.visits.lock().unwrap().push(visit.clone());
        self.publish(VisitChange::Inserted {
            visit_id: visit.id,
            member_id,
        });
        visit
    }

    /// Closes the member's open visits behind the service's back, without notifying.
    pub fn close_all(&self, member_id: Uuid) {
        let now = chrono::Utc::now().naive_utc();
        for visit in self.visits.lock().unwrap().iter_mut() {
            if visit.member_id == member_id && visit.is_open() {
                visit.sign_out_time = Some(now);
            }
        }
    }

    fn publish(&self, change: VisitChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

#[async_trait]
impl VisitLogRepo for InMemoryVisitLogRepo {
    async fn insert_open(&self, member_id: Uuid, sign_in_time: NaiveDateTime) -> AppResult<VisitLog> {
        let visit = {
            let mut visits = self.visits.lock().unwrap();
            if visits.iter().any(|v| v.member_id == member_id && v.is_open()) {
                return Err(AppError::AlreadySignedIn);
            }
            let visit = VisitLog {
                id: Uuid::new_v4(),
                member_id,
                sign_in_time,
                sign_out_time: None,
            };
            visits.push(visit.clone());
            visit
        };
        self.publish(VisitChange::Inserted {
            visit_id: visit.id,
            member_id,
        });
        Ok(visit)
    }

    async fn find_open_by_member(&self, member_id: Uuid) -> AppResult<Option<VisitLog>> {
        Ok(self
            .visits
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.member_id == member_id && v.is_open())
            .cloned())
    }

    async fn close(&self, visit_id: Uuid, sign_out_time: NaiveDateTime) -> AppResult<Option<VisitLog>> {
        let closed = {
            let mut visits = self.visits.lock().unwrap();
            visits
                .iter_mut()
                .find(|v| v.id == visit_id && v.is_open())
                .map(|v| {
                    v.sign_out_time = Some(sign_out_time);
                    v.clone()
                })
        };
        if let Some(visit) = &closed {
            self.publish(VisitChange::Updated {
                visit_id: visit.id,
                member_id: visit.member_id,
            });
        }
        Ok(closed)
    }

    async fn list_open(&self) -> AppResult<Vec<VisitLog>> {
        Ok(self
            .visits
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.is_open())
            .cloned()
            .collect())
    }

    async fn list_closed_since(&self, since: NaiveDateTime) -> AppResult<Vec<VisitLog>> {
        Ok(self
            .visits
            .lock()
            .unwrap()
            .iter()
            .filter(|v| v.sign_out_time.is_some_and(|out| out >= since))
            .cloned()
            .collect())
    }
}

impl VisitChangeFeed for InMemoryVisitLogRepo {
    fn subscribe(&self) -> broadcast::Receiver<VisitChange> {
        self.changes.subscribe()
    }
}
