use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roster category a member belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberCategory {
    Staff,
    Understudy,
    #[serde(alias = "innovation_lab_user")]
    LabUser,
}

impl MemberCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberCategory::Staff => "staff",
            MemberCategory::Understudy => "understudy",
            MemberCategory::LabUser => "lab_user",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "staff" => Some(MemberCategory::Staff),
            "understudy" => Some(MemberCategory::Understudy),
            "lab_user" | "innovation_lab_user" => Some(MemberCategory::LabUser),
            _ => None,
        }
    }
}

impl std::fmt::Display for MemberCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub category: MemberCategory,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// Fields an admin supplies when registering a member.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub category: String,
    pub phone: Option<String>,
    pub role: Option<String>,
}

/// Lower-cases and trims an email so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
