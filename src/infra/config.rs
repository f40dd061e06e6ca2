use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use time::Duration;
use url::Url;

pub struct AppConfig {
    pub database_url: String,
    pub redis_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    /// Mark session cookies `Secure`. Enable when served over HTTPS.
    pub cookie_secure: bool,
    pub resend_api_key: SecretString,
    pub email_from: String,
    pub email_api_url: Url,
    /// Shown in email subjects and sender names.
    pub company_name: String,
    pub otp_ttl_minutes: i64,
    pub jwt_secret: SecretString,
    pub admin_email: String,
    pub admin_password: SecretString,
    pub admin_session_ttl: Duration,
    pub member_session_ttl: Duration,
    /// Offset of office-local time from UTC; decides where "today" starts.
    pub office_utc_offset_minutes: i64,
    /// Use Postgres LISTEN/NOTIFY for roster refreshes. When false, poll instead.
    pub change_feed_enabled: bool,
    pub status_poll_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url: String = get_env("DATABASE_URL");
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());
        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");
        let cookie_secure: bool = get_env_default("COOKIE_SECURE", false);

        let resend_api_key = SecretString::new(get_env::<String>("RESEND_API_KEY").into());
        let email_from: String = get_env("EMAIL_FROM");
        let email_api_url: Url = get_env_default(
            "EMAIL_API_URL",
            String::from("https://api.resend.com/emails"),
        )
        .parse()
        .expect("EMAIL_API_URL must be a valid URL");
        let company_name: String = get_env_default("COMPANY_NAME", "Innovation Lab".to_string());
        let otp_ttl_minutes: i64 = get_env_default("OTP_TTL_MINUTES", 10);

        let jwt_secret = SecretString::new(get_env::<String>("JWT_SECRET").into());
        let admin_email: String = get_env("ADMIN_EMAIL");
        let admin_password = SecretString::new(get_env::<String>("ADMIN_PASSWORD").into());
        let admin_session_ttl_hours: i64 = get_env_default("ADMIN_SESSION_TTL_HOURS", 12);
        let member_session_ttl_hours: i64 = get_env_default("MEMBER_SESSION_TTL_HOURS", 12);

        let office_utc_offset_minutes: i64 = get_env_default("OFFICE_UTC_OFFSET_MINUTES", 0);
        let change_feed_enabled: bool = get_env_default("CHANGE_FEED_ENABLED", true);
        let status_poll_seconds: u64 = get_env_default("STATUS_POLL_SECONDS", 15);

        Self {
            database_url,
            redis_url,
            bind_addr,
            cors_origin,
            cookie_secure,
            resend_api_key,
            email_from,
            email_api_url,
            company_name,
            otp_ttl_minutes,
            jwt_secret,
            admin_email,
            admin_password,
            admin_session_ttl: Duration::hours(admin_session_ttl_hours),
            member_session_ttl: Duration::hours(member_session_ttl_hours),
            office_utc_offset_minutes,
            change_feed_enabled,
            status_poll_seconds: status_poll_seconds.max(1),
        }
    }
}
