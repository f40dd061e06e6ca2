pub mod admin;
pub mod checkin;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/checkin", checkin::router())
        .nest("/admin", admin::router(app_state))
}
