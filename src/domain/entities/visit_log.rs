use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use uuid::Uuid;

/// One physical presence session. `sign_out_time == None` means the visit is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitLog {
    pub id: Uuid,
    pub member_id: Uuid,
    pub sign_in_time: NaiveDateTime,
    pub sign_out_time: Option<NaiveDateTime>,
}

impl VisitLog {
    pub fn is_open(&self) -> bool {
        self.sign_out_time.is_none()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.sign_out_time.map(|out| out - self.sign_in_time)
    }
}

/// What the visit log store reports to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitChange {
    Inserted { visit_id: Uuid, member_id: Uuid },
    Updated { visit_id: Uuid, member_id: Uuid },
    /// Emitted by polling feeds: the log may have changed, re-read everything.
    Resync,
}
