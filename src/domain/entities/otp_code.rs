use chrono::NaiveDateTime;

/// A stored one-time passcode. At most one exists per (normalized) email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode {
    pub email: String,
    pub code: String,
    pub expires_at: NaiveDateTime,
    pub issued_at: NaiveDateTime,
}

impl OtpCode {
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now > self.expires_at
    }
}
