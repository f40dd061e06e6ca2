use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, is_unique_violation},
    app_error::{AppError, AppResult},
    domain::entities::member::{Member, MemberCategory},
    use_cases::member::{MemberDraft, MemberRepo},
};

const MEMBER_COLUMNS: &str = "id, name, email, category, phone, role, is_active, created_at";

#[derive(FromRow)]
struct DbMember {
    id: Uuid,
    name: String,
    email: String,
    category: String,
    phone: Option<String>,
    role: Option<String>,
    is_active: bool,
    created_at: NaiveDateTime,
}

impl TryFrom<DbMember> for Member {
    type Error = AppError;

    fn try_from(db: DbMember) -> AppResult<Self> {
        let category = MemberCategory::parse(&db.category).ok_or_else(|| {
            tracing::error!(member_id = %db.id, category = %db.category, "Unknown stored category");
            AppError::Database("Member has an unknown category".into())
        })?;
        Ok(Member {
            id: db.id,
            name: db.name,
            email: db.email,
            category,
            phone: db.phone,
            role: db.role,
            is_active: db.is_active,
            created_at: db.created_at,
        })
    }
}

#[async_trait]
impl MemberRepo for PostgresPersistence {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Member>> {
        let rec = sqlx::query_as::<_, DbMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        rec.map(Member::try_from).transpose()
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Member>> {
        let rec = sqlx::query_as::<_, DbMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        rec.map(Member::try_from).transpose()
    }

    async fn list_by_name(&self) -> AppResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, DbMember>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY lower(name), created_at"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(AppError::from)?;
        rows.into_iter().map(Member::try_from).collect()
    }

    async fn insert(&self, draft: &MemberDraft) -> AppResult<Member> {
        let rec = sqlx::query_as::<_, DbMember>(&format!(
            r#"INSERT INTO members (id, name, email, category, phone, role, is_active)
               VALUES ($1, $2, $3, $4, $5, $6, TRUE)
               RETURNING {MEMBER_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(draft.category.as_str())
        .bind(&draft.phone)
        .bind(&draft.role)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateEmail
            } else {
                AppError::from(e)
            }
        })?;
        Member::try_from(rec)
    }

    async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<Option<Member>> {
        let rec = sqlx::query_as::<_, DbMember>(&format!(
            "UPDATE members SET is_active = $2 WHERE id = $1 RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(id)
        .bind(is_active)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        rec.map(Member::try_from).transpose()
    }
}
