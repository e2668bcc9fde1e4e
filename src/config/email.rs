//! Email configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::handlers::RetryPolicy;

/// Email configuration (Resend)
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Resend API key
    pub resend_api_key: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Delivery attempts per notification, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles per attempt
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,

    /// Per-request timeout against the Resend API
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl EmailConfig {
    /// Get formatted "From" header value
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Retry schedule for the notification dispatcher
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: self.retry_base_delay(),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.resend_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("RESEND_API_KEY"));
        }
        if !self.resend_api_key.starts_with("re_") {
            return Err(ValidationError::InvalidResendKey);
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        if self.max_attempts == 0 || self.max_attempts > 10 {
            return Err(ValidationError::InvalidRetryAttempts);
        }
        if self.http_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            resend_api_key: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_from_email() -> String {
    "noreply@salongdeals.se".to_string()
}

fn default_from_name() -> String {
    "Salongdeals".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    500
}

fn default_http_timeout() -> u64 {
    10
}
