pub mod admin_auth;
pub mod check_in;
pub mod live_roster;
pub mod member;
pub mod otp;
pub mod status;
pub mod visit;
