use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, is_unique_violation},
    app_error::{AppError, AppResult},
    domain::entities::visit_log::VisitLog,
    use_cases::visit::VisitLogRepo,
};

#[derive(FromRow)]
struct DbVisitLog {
    id: Uuid,
    member_id: Uuid,
    sign_in_time: NaiveDateTime,
    sign_out_time: Option<NaiveDateTime>,
}

impl From<DbVisitLog> for VisitLog {
    fn from(db: DbVisitLog) -> Self {
        VisitLog {
            id: db.id,
            member_id: db.member_id,
            sign_in_time: db.sign_in_time,
            sign_out_time: db.sign_out_time,
        }
    }
}

#[async_trait]
impl VisitLogRepo for PostgresPersistence {
    async fn insert_open(&self, member_id: Uuid, sign_in_time: NaiveDateTime) -> AppResult<VisitLog> {
        // visit_logs_one_open_per_member rejects a second open row.
        let rec = sqlx::query_as::<_, DbVisitLog>(
            r#"INSERT INTO visit_logs (id, member_id, sign_in_time)
               VALUES ($1, $2, $3)
               RETURNING id, member_id, sign_in_time, sign_out_time"#,
        )
        .bind(Uuid::new_v4())
        .bind(member_id)
        .bind(sign_in_time)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::AlreadySignedIn
            } else {
                AppError::from(e)
            }
        })?;
        Ok(rec.into())
    }

    async fn find_open_by_member(&self, member_id: Uuid) -> AppResult<Option<VisitLog>> {
        let rec = sqlx::query_as::<_, DbVisitLog>(
            r#"SELECT id, member_id, sign_in_time, sign_out_time
               FROM visit_logs
               WHERE member_id = $1 AND sign_out_time IS NULL
               ORDER BY sign_in_time DESC
               LIMIT 1"#,
        )
        .bind(member_id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(rec.map(VisitLog::from))
    }

    async fn close(&self, visit_id: Uuid, sign_out_time: NaiveDateTime) -> AppResult<Option<VisitLog>> {
        let rec = sqlx::query_as::<_, DbVisitLog>(
            r#"UPDATE visit_logs
               SET sign_out_time = $2
               WHERE id = $1 AND sign_out_time IS NULL
               RETURNING id, member_id, sign_in_time, sign_out_time"#,
        )
        .bind(visit_id)
        .bind(sign_out_time)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(rec.map(VisitLog::from))
    }

    async fn list_open(&self) -> AppResult<Vec<VisitLog>> {
        let rows = sqlx::query_as::<_, DbVisitLog>(
            r#"SELECT id, member_id, sign_in_time, sign_out_time
               FROM visit_logs
               WHERE sign_out_time IS NULL
               ORDER BY sign_in_time"#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(VisitLog::from).collect())
    }

    async fn list_closed_since(&self, since: NaiveDateTime) -> AppResult<Vec<VisitLog>> {
        let rows = sqlx::query_as::<_, DbVisitLog>(
            r#"SELECT id, member_id, sign_in_time, sign_out_time
               FROM visit_logs
               WHERE sign_out_time IS NOT NULL AND sign_out_time >= $1
               ORDER BY sign_out_time DESC"#,
        )
        .bind(since)
        .fetch_all(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(VisitLog::from).collect())
    }
}
