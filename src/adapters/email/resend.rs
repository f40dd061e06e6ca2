use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::warn;

use crate::{
    app_error::{AppError, AppResult},
    application::email_templates,
    infra::http_client,
    use_cases::otp::OtpMailer,
};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Sends passcode emails through the Resend API.
#[derive(Clone)]
pub struct ResendOtpMailer {
    client: Client,
    api_key: SecretString,
    from_email: String,
    ttl_minutes: i64,
    endpoint: String,
}

impl ResendOtpMailer {
    pub fn new(api_key: SecretString, from_email: String, ttl_minutes: i64) -> Self {
        Self {
            client: http_client::build_client(),
            api_key,
            from_email,
            ttl_minutes,
            endpoint: RESEND_API_URL.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Serialize)]
struct ResendReq<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl OtpMailer for ResendOtpMailer {
    async fn send_code(
        &self,
        to_email: &str,
        to_name: &str,
        code: &str,
        company_name: &str,
    ) -> AppResult<bool> {
        let (subject, html) =
            email_templates::otp_email(to_name, code, company_name, self.ttl_minutes);
        let from = format!("{company_name} <{}>", self.from_email);
        let body = ResendReq {
            from: &from,
            to: [to_email],
            subject: &subject,
            html: &html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::DeliveryFailure(format!("Failed to send email: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, %detail, to = %to_email, "Email API rejected message");
            return Ok(false);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use std::sync::{Arc, Mutex};

    async fn serve(status: StatusCode, seen: Arc<Mutex<Vec<serde_json::Value>>>) -> String {
        let app = Router::new().route(
            "/emails",
            post(move |Json(body): Json<serde_json::Value>| {
                let seen = seen.clone();
                async move {
                    seen.lock().unwrap().push(body);
                    (status, Json(serde_json::json!({ "id": "email_123" })))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/emails")
    }

    fn mailer(endpoint: String) -> ResendOtpMailer {
        ResendOtpMailer::new(
            SecretString::new("re_test".to_string().into()),
            "noreply@office.test".into(),
            10,
        )
        .with_endpoint(endpoint)
    }

    #[tokio::test]
    async fn accepted_message_reports_delivered() {
        let seen = Arc::new(Mutex::new(vec![]));
        let endpoint = serve(StatusCode::OK, seen.clone()).await;

        let delivered = mailer(endpoint)
            .send_code("ada@x.com", "Ada", "123456", "Innovation Lab")
            .await
            .unwrap();

        assert!(delivered);
        let body = seen.lock().unwrap()[0].clone();
        assert_eq!(body["to"][0], "ada@x.com");
        assert_eq!(body["from"], "Innovation Lab <noreply@office.test>");
        assert!(body["html"].as_str().unwrap().contains("123456"));
    }

    #[tokio::test]
    async fn rejected_message_is_not_an_error() {
        let endpoint = serve(StatusCode::UNPROCESSABLE_ENTITY, Arc::default()).await;

        let delivered = mailer(endpoint)
            .send_code("ada@x.com", "Ada", "123456", "Innovation Lab")
            .await
            .unwrap();

        assert!(!delivered);
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_delivery_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = mailer(format!("http://{addr}/emails"))
            .send_code("ada@x.com", "Ada", "123456", "Innovation Lab")
            .await;

        assert!(matches!(result, Err(AppError::DeliveryFailure(_))));
    }
}
