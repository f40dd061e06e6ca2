use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{email::resend::ResendOtpMailer, http::app_state::AppState},
    infra::{
        config::AppConfig,
        member_sessions::RedisMemberSessionStore,
        postgres_persistence,
        visit_change_feed::{PgVisitChangeFeed, PollingChangeFeed},
    },
    use_cases::{
        admin_auth::{AdminAuthenticator, ConfiguredAdminAuth},
        check_in::CheckInUseCases,
        live_roster::LiveRoster,
        member::{MemberRepo, MemberUseCases},
        otp::{OtpRepo, OtpUseCases},
        status::StatusUseCases,
        visit::{VisitChangeFeed, VisitLogRepo, VisitUseCases},
    },
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);
    let member_repo = postgres_arc.clone() as Arc<dyn MemberRepo>;
    let otp_repo = postgres_arc.clone() as Arc<dyn OtpRepo>;
    let visit_repo = postgres_arc.clone() as Arc<dyn VisitLogRepo>;

    let sessions = Arc::new(
        RedisMemberSessionStore::new(
            &config.redis_url,
            config.member_session_ttl.whole_seconds().max(0) as u64,
        )
        .await?,
    );

    let mailer = Arc::new(
        ResendOtpMailer::new(
            config.resend_api_key.clone(),
            config.email_from.clone(),
            config.otp_ttl_minutes,
        )
        .with_endpoint(config.email_api_url.as_str()),
    );

    let otp_use_cases = Arc::new(OtpUseCases::new(
        member_repo.clone(),
        otp_repo,
        mailer,
        config.company_name.clone(),
        config.otp_ttl_minutes,
    ));
    let member_use_cases = Arc::new(MemberUseCases::new(
        member_repo.clone(),
        otp_use_cases.clone(),
    ));
    let visit_use_cases = Arc::new(VisitUseCases::new(member_repo.clone(), visit_repo.clone()));
    let status_use_cases = Arc::new(StatusUseCases::new(
        member_repo,
        visit_repo,
        chrono::Duration::minutes(config.office_utc_offset_minutes),
    ));
    let check_in_use_cases = Arc::new(CheckInUseCases::new(
        otp_use_cases.clone(),
        visit_use_cases,
        sessions,
    ));

    let visit_feed: Arc<dyn VisitChangeFeed> = if config.change_feed_enabled {
        Arc::new(PgVisitChangeFeed::start(postgres_arc.pool()).await?)
    } else {
        info!("Change feed disabled, polling visit log instead");
        Arc::new(PollingChangeFeed::start(Duration::from_secs(
            config.status_poll_seconds,
        )))
    };
    let live_roster = Arc::new(LiveRoster::start(status_use_cases.clone(), visit_feed.as_ref()).await?);

    let admin_auth: Arc<dyn AdminAuthenticator> = Arc::new(ConfiguredAdminAuth::new(
        &config.admin_email,
        &config.admin_password,
        config.jwt_secret.clone(),
        config.admin_session_ttl,
    ));

    Ok(AppState {
        config: Arc::new(config),
        member_use_cases,
        otp_use_cases,
        status_use_cases,
        check_in_use_cases,
        admin_auth,
        live_roster,
        visit_feed,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "office_register=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
