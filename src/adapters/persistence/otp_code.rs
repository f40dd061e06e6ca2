use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::FromRow;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::otp_code::OtpCode,
    use_cases::otp::OtpRepo,
};

#[derive(FromRow)]
struct DbOtpCode {
    email: String,
    code: String,
    expires_at: NaiveDateTime,
    created_at: NaiveDateTime,
}

impl From<DbOtpCode> for OtpCode {
    fn from(db: DbOtpCode) -> Self {
        OtpCode {
            email: db.email,
            code: db.code,
            expires_at: db.expires_at,
            issued_at: db.created_at,
        }
    }
}

#[async_trait]
impl OtpRepo for PostgresPersistence {
    async fn upsert(&self, code: &OtpCode) -> AppResult<()> {
        sqlx::query(
            r#"INSERT INTO otp_codes (email, code, expires_at, created_at)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (email) DO UPDATE
               SET code = EXCLUDED.code,
                   expires_at = EXCLUDED.expires_at,
                   created_at = EXCLUDED.created_at"#,
        )
        .bind(&code.email)
        .bind(&code.code)
        .bind(code.expires_at)
        .bind(code.issued_at)
        .execute(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(())
    }

    async fn get(&self, email: &str) -> AppResult<Option<OtpCode>> {
        let rec = sqlx::query_as::<_, DbOtpCode>(
            "SELECT email, code, expires_at, created_at FROM otp_codes WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(rec.map(OtpCode::from))
    }

    async fn consume(&self, email: &str, code: &str) -> AppResult<Option<OtpCode>> {
        // Single statement so two concurrent verifications cannot both succeed.
        let rec = sqlx::query_as::<_, DbOtpCode>(
            r#"DELETE FROM otp_codes
               WHERE email = $1 AND code = $2
               RETURNING email, code, expires_at, created_at"#,
        )
        .bind(email)
        .bind(code)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(rec.map(OtpCode::from))
    }

    async fn delete(&self, email: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM otp_codes WHERE email = $1")
            .bind(email)
            .execute(self.pool())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
