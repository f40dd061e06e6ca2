pub mod member;
pub mod otp_code;
pub mod visit_log;
