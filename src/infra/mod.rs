use crate::{adapters::persistence::PostgresPersistence, infra::db::init_db};

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod http_client;
pub mod member_sessions;
pub mod setup;
pub mod visit_change_feed;

pub async fn postgres_persistence(database_url: &str) -> anyhow::Result<PostgresPersistence> {
    let pool = init_db(database_url).await?;
    db::run_migrations(&pool).await?;
    Ok(PostgresPersistence::new(pool))
}
