use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    use_cases::otp::IssuedOtp,
};

pub const SESSION_COOKIE: &str = "checkin_session";

#[derive(Deserialize)]
struct EmailPayload {
    email: String,
}

#[derive(Deserialize)]
struct VerifyPayload {
    email: String,
    code: String,
}

/// What a member sees after asking for a code. The code itself only goes out by email.
#[derive(Serialize)]
struct CodeSent {
    email: String,
    expires_at: NaiveDateTime,
    delivered: bool,
}

impl From<IssuedOtp> for CodeSent {
    fn from(otp: IssuedOtp) -> Self {
        Self {
            email: otp.email,
            expires_at: otp.expires_at,
            delivered: otp.delivered,
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request-otp", post(request_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/verify", post(verify))
        .route("/sign-out", post(sign_out))
        .route("/session", get(session))
}

async fn request_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> AppResult<impl IntoResponse> {
    let issued = app_state.otp_use_cases.issue(&payload.email).await?;
    Ok((StatusCode::ACCEPTED, Json(CodeSent::from(issued))))
}

async fn resend_otp(
    State(app_state): State<AppState>,
    Json(payload): Json<EmailPayload>,
) -> AppResult<impl IntoResponse> {
    let issued = app_state.otp_use_cases.resend(&payload.email).await?;
    Ok((StatusCode::ACCEPTED, Json(CodeSent::from(issued))))
}

async fn verify(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<VerifyPayload>,
) -> AppResult<impl IntoResponse> {
    let (token, session) = app_state
        .check_in_use_cases
        .verify_and_sign_in(&payload.email, &payload.code)
        .await?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(app_state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(app_state.config.member_session_ttl)
        .build();
    Ok((jar.add(cookie), Json(session)))
}

async fn sign_out(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
        return Err(AppError::NoActiveSession);
    };

    let visit = app_state.check_in_use_cases.sign_out(&token).await?;
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Json(visit)))
}

async fn session(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
        return Err(AppError::NoActiveSession);
    };

    let session = app_state
        .check_in_use_cases
        .current_session(&token)
        .await?
        .ok_or(AppError::NoActiveSession)?;
    Ok(Json(session))
}
