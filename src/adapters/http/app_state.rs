use std::sync::Arc;

use crate::{
    infra::config::AppConfig,
    use_cases::{
        admin_auth::AdminAuthenticator, check_in::CheckInUseCases, live_roster::LiveRoster,
        member::MemberUseCases, otp::OtpUseCases, status::StatusUseCases,
        visit::VisitChangeFeed,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub member_use_cases: Arc<MemberUseCases>,
    pub otp_use_cases: Arc<OtpUseCases>,
    pub status_use_cases: Arc<StatusUseCases>,
    pub check_in_use_cases: Arc<CheckInUseCases>,
    pub admin_auth: Arc<dyn AdminAuthenticator>,
    pub live_roster: Arc<LiveRoster>,
    /// Held so the feed's listener task lives as long as the app.
    pub visit_feed: Arc<dyn VisitChangeFeed>,
}
