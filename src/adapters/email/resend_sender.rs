//! Resend email adapter.
//!
//! Sends the code notification through the Resend HTTP API. Status codes are
//! mapped onto `EmailErrorCode` so the dispatcher can decide whether to retry.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::redemption::CodeNotification;
use crate::ports::{EmailError, EmailErrorCode, EmailSender};

/// Resend API configuration.
#[derive(Clone)]
pub struct ResendConfig {
    api_key: SecretString,
    from: String,
    api_base_url: String,
    timeout: Duration,
}

impl ResendConfig {
    /// `from` is the full header value, e.g. `Salongdeals <noreply@example.se>`.
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            from: from.into(),
            api_base_url: "https://api.resend.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: String,
    html: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

/// Email sender backed by Resend.
pub struct ResendEmailSender {
    config: ResendConfig,
    http_client: reqwest::Client,
}

impl ResendEmailSender {
    pub fn new(config: ResendConfig) -> Result<Self, EmailError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmailError::provider(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

fn error_for_status(status: reqwest::StatusCode, body: String) -> EmailError {
    let code = match status.as_u16() {
        401 | 403 => EmailErrorCode::AuthenticationError,
        429 => EmailErrorCode::RateLimited,
        400..=499 => EmailErrorCode::Rejected,
        _ => EmailErrorCode::ProviderError,
    };
    EmailError::new(code, format!("Resend API error ({}): {}", status, body))
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send_code(&self, notification: &CodeNotification) -> Result<String, EmailError> {
        let url = format!("{}/emails", self.config.api_base_url);
        let body = SendEmailRequest {
            from: &self.config.from,
            to: [notification.email.as_str()],
            subject: notification.subject(),
            html: notification.html_body(),
            text: notification.text_body(),
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "Resend send failed");
            return Err(error_for_status(status, error_text));
        }

        let sent: SendEmailResponse = response
            .json()
            .await
            .map_err(|e| EmailError::provider(format!("Failed to parse Resend response: {}", e)))?;

        tracing::info!(message_id = %sent.id, "Code email sent");
        Ok(sent.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn status_codes_map_to_retryability() {
        assert!(!error_for_status(StatusCode::UNPROCESSABLE_ENTITY, String::new()).retryable);
        assert!(!error_for_status(StatusCode::UNAUTHORIZED, String::new()).retryable);
        assert!(error_for_status(StatusCode::TOO_MANY_REQUESTS, String::new()).retryable);
        assert!(error_for_status(StatusCode::BAD_GATEWAY, String::new()).retryable);
    }

    #[test]
    fn request_body_serializes_single_recipient() {
        let body = SendEmailRequest {
            from: "Salongdeals <noreply@example.se>",
            to: ["anna@example.se"],
            subject: "s".to_string(),
            html: "<p>h</p>".to_string(),
            text: "t".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"][0], "anna@example.se");
    }

    #[test]
    fn builds_with_custom_base_url() {
        let config = ResendConfig::new("re_test", "x <noreply@example.se>")
            .with_base_url("http://localhost:9999")
            .with_timeout(Duration::from_secs(2));
        assert!(ResendEmailSender::new(config).is_ok());
    }
}
