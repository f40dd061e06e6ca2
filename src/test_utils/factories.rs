//! Test data factories.
//!
//! Each factory creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::entities::{
    member::{Member, MemberCategory},
    visit_log::VisitLog,
};

/// Create a test member with sensible defaults. Active staff, unique email.
pub fn create_test_member(overrides: impl FnOnce(&mut Member)) -> Member {
    let id = Uuid::new_v4();
    let mut member = Member {
        id,
        name: "Test Member".to_string(),
        email: format!("member-{}@office.test", id.simple()),
        category: MemberCategory::Staff,
        phone: None,
        role: None,
        is_active: true,
        created_at: test_datetime(),
    };
    overrides(&mut member);
    member
}

/// Create an open visit for `member_id` starting at `test_datetime()`.
pub fn create_test_visit(member_id: Uuid, overrides: impl FnOnce(&mut VisitLog)) -> VisitLog {
    let mut visit = VisitLog {
        id: Uuid::new_v4(),
        member_id,
        sign_in_time: test_datetime(),
        sign_out_time: None,
    };
    overrides(&mut visit);
    visit
}

/// Fixed timestamp for deterministic tests.
pub fn test_datetime() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2025-01-15 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
}
