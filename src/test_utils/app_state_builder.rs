//! Test app state builder for HTTP-level tests.
//!
//! `TestAppStateBuilder` creates an `AppState` wired to in-memory mocks.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        admin_auth::{AdminAuthenticator, ConfiguredAdminAuth},
        check_in::CheckInUseCases,
        live_roster::LiveRoster,
        member::MemberUseCases,
        otp::OtpUseCases,
        status::StatusUseCases,
        visit::{VisitChangeFeed, VisitUseCases},
    },
    domain::entities::member::Member,
    infra::config::AppConfig,
    test_utils::{
        InMemoryMemberRepo, InMemoryMemberSessionStore, InMemoryOtpRepo, InMemoryVisitLogRepo,
        RecordingOtpMailer,
    },
};

pub const TEST_ADMIN_EMAIL: &str = "admin@office.test";
pub const TEST_ADMIN_PASSWORD: &str = "correct-horse";

/// Handles on the mocks behind a built `AppState`, for assertions.
pub struct TestMocks {
    pub members: Arc<InMemoryMemberRepo>,
    pub codes: Arc<InMemoryOtpRepo>,
    pub mailer: Arc<RecordingOtpMailer>,
    pub visits: Arc<InMemoryVisitLogRepo>,
    pub sessions: Arc<InMemoryMemberSessionStore>,
}

/// Builder for `AppState` with in-memory mocks.
///
/// ```ignore
/// let (app_state, mocks) = TestAppStateBuilder::new()
///     .with_member(create_test_member(|m| m.email = "ada@office.test".into()))
///     .build_with_mocks()
///     .await;
/// ```
pub struct TestAppStateBuilder {
    members: Vec<Member>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self { members: vec![] }
    }

    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub async fn build_with_mocks(self) -> (AppState, TestMocks) {
        let mocks = TestMocks {
            members: Arc::new(InMemoryMemberRepo::with_members(self.members)),
            codes: Arc::new(InMemoryOtpRepo::new()),
            mailer: Arc::new(RecordingOtpMailer::new()),
            visits: Arc::new(InMemoryVisitLogRepo::new()),
            sessions: Arc::new(InMemoryMemberSessionStore::new()),
        };

        let config = test_config();

        let otp_use_cases = Arc::new(OtpUseCases::new(
            mocks.members.clone(),
            mocks.codes.clone(),
            mocks.mailer.clone(),
            config.company_name.clone(),
            config.otp_ttl_minutes,
        ));
        let member_use_cases = Arc::new(MemberUseCases::new(
            mocks.members.clone(),
            otp_use_cases.clone(),
        ));
        let visit_use_cases = Arc::new(VisitUseCases::new(
            mocks.members.clone(),
            mocks.visits.clone(),
        ));
        let status_use_cases = Arc::new(StatusUseCases::new(
            mocks.members.clone(),
            mocks.visits.clone(),
            chrono::Duration::minutes(config.office_utc_offset_minutes),
        ));
        let check_in_use_cases = Arc::new(CheckInUseCases::new(
            otp_use_cases.clone(),
            visit_use_cases,
            mocks.sessions.clone(),
        ));

        let visit_feed: Arc<dyn VisitChangeFeed> = mocks.visits.clone();
        let live_roster = Arc::new(
            LiveRoster::start(status_use_cases.clone(), visit_feed.as_ref())
                .await
                .expect("in-memory roster should load"),
        );

        let admin_auth: Arc<dyn AdminAuthenticator> = Arc::new(ConfiguredAdminAuth::new(
            &config.admin_email,
            &config.admin_password,
            config.jwt_secret.clone(),
            config.admin_session_ttl,
        ));

        let state = AppState {
            config: Arc::new(config),
            member_use_cases,
            otp_use_cases,
            status_use_cases,
            check_in_use_cases,
            admin_auth,
            live_roster,
            visit_feed,
        };
        (state, mocks)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        redis_url: String::new(),
        bind_addr: "127.0.0.1:3001".parse::<SocketAddr>().unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        cookie_secure: false,
        resend_api_key: SecretString::new("re_test".into()),
        email_from: "noreply@office.test".to_string(),
        email_api_url: Url::parse("http://localhost:9/emails").unwrap(),
        company_name: "Innovation Lab".to_string(),
        otp_ttl_minutes: 10,
        jwt_secret: SecretString::new("test_jwt_secret".into()),
        admin_email: TEST_ADMIN_EMAIL.to_string(),
        admin_password: SecretString::new(TEST_ADMIN_PASSWORD.into()),
        admin_session_ttl: Duration::hours(12),
        member_session_ttl: Duration::hours(12),
        office_utc_offset_minutes: 0,
        change_feed_enabled: false,
        status_poll_seconds: 15,
    }
}
