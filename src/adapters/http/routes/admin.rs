use std::time::Duration;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    adapters::http::{
        app_state::AppState,
        middleware::{ADMIN_COOKIE, require_admin},
    },
    app_error::AppResult,
    domain::entities::member::NewMember,
    use_cases::{admin_auth::AdminSession, status::search},
};

/// Upper bound for a long-poll on the live roster.
const MAX_LIVE_WAIT: Duration = Duration::from_secs(25);

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

#[derive(Deserialize)]
struct LiveQuery {
    after: Option<u64>,
    wait_secs: Option<u64>,
}

#[derive(Deserialize)]
struct ActivePayload {
    is_active: bool,
}

pub fn router(app_state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/session", get(session))
        .route("/members", get(list_members).post(register_member))
        .route("/members/live", get(live_members))
        .route("/members/{id}/active", patch(set_active))
        .route("/members/{id}/otp", post(regenerate_otp))
        .route("/signed-in", get(signed_in))
        .route("/stats", get(stats))
        .route_layer(middleware::from_fn_with_state(app_state, require_admin));

    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(protected)
}

async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> AppResult<impl IntoResponse> {
    let (token, session) = app_state
        .admin_auth
        .login(&payload.email, &payload.password)
        .await?;

    let cookie = Cookie::build((ADMIN_COOKIE, token))
        .http_only(true)
        .secure(app_state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(app_state.config.admin_session_ttl)
        .build();
    Ok((jar.add(cookie), Json(session)))
}

async fn logout(State(app_state): State<AppState>, jar: CookieJar) -> AppResult<impl IntoResponse> {
    if let Some(token) = jar.get(ADMIN_COOKIE).map(|c| c.value().to_owned()) {
        app_state.admin_auth.logout(&token).await?;
    }
    let jar = jar.remove(Cookie::build(ADMIN_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}

async fn session(Extension(session): Extension<AdminSession>) -> impl IntoResponse {
    Json(session)
}

async fn list_members(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<impl IntoResponse> {
    let statuses = app_state.status_use_cases.list_with_status().await?;
    let statuses = match query.q.as_deref() {
        Some(q) => search(&statuses, q),
        None => statuses,
    };
    Ok(Json(statuses))
}

/// Returns the roster snapshot. With `after`, waits for a newer version first.
async fn live_members(
    State(app_state): State<AppState>,
    Query(query): Query<LiveQuery>,
) -> impl IntoResponse {
    let roster = &app_state.live_roster;
    let snapshot = match query.after {
        Some(version) => {
            let wait = query
                .wait_secs
                .map(Duration::from_secs)
                .unwrap_or(MAX_LIVE_WAIT)
                .min(MAX_LIVE_WAIT);
            roster.wait_newer_than(version, wait).await
        }
        None => roster.current(),
    };
    Json(snapshot.as_ref().clone())
}

async fn register_member(
    State(app_state): State<AppState>,
    Json(payload): Json<NewMember>,
) -> AppResult<impl IntoResponse> {
    let registered = app_state.member_use_cases.register(payload).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

async fn set_active(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ActivePayload>,
) -> AppResult<impl IntoResponse> {
    let member = app_state
        .member_use_cases
        .set_active(id, payload.is_active)
        .await?;
    Ok(Json(member))
}

async fn regenerate_otp(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let issued = app_state.member_use_cases.regenerate_otp(id).await?;
    Ok(Json(issued))
}

async fn signed_in(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(app_state.status_use_cases.signed_in_members().await?))
}

async fn stats(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    Ok(Json(app_state.status_use_cases.stats().await?))
}
