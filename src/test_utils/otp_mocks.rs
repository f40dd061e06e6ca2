//! In-memory mocks for passcode storage and delivery.

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::otp::{OtpMailer, OtpRepo},
    domain::entities::otp_code::OtpCode,
};

#[derive(Default)]
pub struct InMemoryOtpRepo {
    pub codes: Mutex<HashMap<String, OtpCode>>,
}

impl InMemoryOtpRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_code(&self, email: &str) -> Option<OtpCode> {
        self.codes.lock().unwrap().get(email).cloned()
    }

    /// Moves the stored code back in time by `by`.
    pub fn expire(&self, email: &str, by: Duration) {
        if let Some(code) = self.codes.lock().unwrap().get_mut(email) {
            code.issued_at -= by;
            code.expires_at -= by;
        }
    }

    pub fn len(&self) -> usize {
        self.codes.lock().unwrap().len()
    }
}

#[async_trait]
impl OtpRepo for InMemoryOtpRepo {
    async fn upsert(&self, code: &OtpCode) -> AppResult<()> {
        self.codes
            .lock()
            .unwrap()
            .insert(code.email.clone(), code.clone());
        Ok(())
    }

    async fn get(&self, email: &str) -> AppResult<Option<OtpCode>> {
        Ok(self.get_code(email))
    }

    async fn consume(&self, email: &str, code: &str) -> AppResult<Option<OtpCode>> {
        let mut codes = self.codes.lock().unwrap();
        if codes.get(email).is_some_and(|c| c.code == code) {
            return Ok(codes.remove(email));
        }
        Ok(None)
    }

    async fn delete(&self, email: &str) -> AppResult<()> {
        self.codes.lock().unwrap().remove(email);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCode {
    pub to_email: String,
    pub to_name: String,
    pub code: String,
    pub company_name: String,
}

#[derive(Debug, Clone, Copy, Default)]
enum Delivery {
    #[default]
    Accept,
    Reject,
    TransportError,
}

/// Records accepted messages; can be switched to refuse or fail.
#[derive(Default)]
pub struct RecordingOtpMailer {
    sent: Mutex<Vec<SentCode>>,
    delivery: Mutex<Delivery>,
}

impl RecordingOtpMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentCode> {
        self.sent.lock().unwrap().clone()
    }

    pub fn reject_messages(&self) {
        *self.delivery.lock().unwrap() = Delivery::Reject;
    }

    pub fn fail_with_transport_error(&self) {
        *self.delivery.lock().unwrap() = Delivery::TransportError;
    }
}

#[async_trait]
impl OtpMailer for RecordingOtpMailer {
    async fn send_code(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
        company_name: &str,
    ) -> AppResult<bool> {
        let delivery = *self.delivery.lock().unwrap();
        match delivery {
            Delivery::Accept => {
                self.sent.lock().unwrap().push(SentCode {
                    to_email: to_email.to_string(),
                    to_name: to_name.to_string(),
                    code: code.to_string(),
                    company_name: company_name.to_string(),
                });
                Ok(true)
            }
            Delivery::Reject => Ok(false),
            Delivery::TransportError => {
                Err(AppError::DeliveryFailure("connection refused".into()))
            }
        }
    }
}
