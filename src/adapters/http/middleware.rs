use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{adapters::http::app_state::AppState, app_error::AppError};

pub const ADMIN_COOKIE: &str = "admin_token";

/// Lets the request through only with a valid admin session cookie.
/// The `AdminSession` is added to the request extensions.
pub async fn require_admin(
    State(app_state): State<AppState>,
    cookies: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = cookies.get(ADMIN_COOKIE).map(|c| c.value().to_owned()) else {
        return Err(AppError::InvalidCredentials);
    };

    let session = app_state
        .admin_auth
        .current_session(&token)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    tracing::debug!(admin = %session.email, "Admin request");
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
