use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{
    app_error::{AppError, AppResult},
    infra::error::InfraError,
    use_cases::check_in::{MemberSession, MemberSessionStore},
};

/// Check-in sessions kept in Redis under their token hash, expiring after `ttl_secs`.
#[derive(Clone)]
pub struct RedisMemberSessionStore {
    manager: ConnectionManager,
    ttl_secs: u64,
}

impl RedisMemberSessionStore {
    pub async fn new(redis_url: &str, ttl_secs: u64) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url).map_err(InfraError::RedisConnection)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::RedisConnection)?;
        Ok(Self {
            manager,
            ttl_secs: ttl_secs.max(60),
        })
    }

    fn key(token_hash: &str) -> String {
        format!("checkin:{token_hash}")
    }
}

#[async_trait]
impl MemberSessionStore for RedisMemberSessionStore {
    async fn save(&self, token_hash: &str, session: &MemberSession) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let payload =
            serde_json::to_string(session).map_err(|e| AppError::Internal(e.to_string()))?;

        let _: () = conn
            .set_ex(Self::key(token_hash), payload, self.ttl_secs)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn get(&self, token_hash: &str) -> AppResult<Option<MemberSession>> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn
            .get(Self::key(token_hash))
            .await
            .map_err(store_error)?;

        raw.map(|value| {
            serde_json::from_str(&value).map_err(|e| AppError::Internal(e.to_string()))
        })
        .transpose()
    }

    async fn clear(&self, token_hash: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .del(Self::key(token_hash))
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

/// An unreachable session store is a storage failure like any other.
fn store_error(err: redis::RedisError) -> AppError {
    tracing::error!(error = %err, "Session store error");
    AppError::Database("Session store unavailable".into())
}
