//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait with one-off Checkout Sessions and
//! signed webhook verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret).with_currency("sek");
//! let adapter = StripePaymentAdapter::new(config, http_client);
//! ```

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentProvider,
    WebhookEvent, WebhookEventData, WebhookEventType,
};

use super::webhook_types::{hex_encode, SignatureHeader, StripeCheckoutSession, StripeWebhookEvent};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Stripe keeps an unpaid Checkout Session open for 24 hours.
const DEFAULT_SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// ISO currency for deal prices, lowercase.
    currency: String,

    /// Whether to require livemode events in production.
    require_livemode: bool,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            currency: "sek".to_string(),
            require_livemode: false,
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_lowercase();
        self
    }

    /// Require livemode events in production.
    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create an adapter sharing the application's HTTP client.
    pub fn new(config: StripeConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Form parameters for a one-off Checkout Session.
    fn checkout_params(&self, request: &CreateCheckoutRequest) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), "payment".to_string()),
            ("customer_email".to_string(), request.customer_email.clone()),
            (
                "line_items[0][price_data][currency]".to_string(),
                self.config.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                request.amount_minor.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                request.product_name.clone(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
        ];

        params.extend(
            request
                .metadata
                .to_pairs()
                .into_iter()
                .map(|(key, value)| (format!("metadata[{}]", key), value)),
        );
        params
    }

    /// Verify webhook signature using HMAC-SHA256.
    fn verify_signature(&self, payload: &[u8], header: &SignatureHeader) -> Result<(), PaymentError> {
        // 1. Validate timestamp (prevent replay attacks)
        let now = chrono::Utc::now().timestamp();
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_webhook("Event timestamp in future"));
        }

        // 2. Compute expected signature over "<t>.<payload>"
        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.expose_secret().as_bytes())
            .map_err(|e| PaymentError::invalid_webhook(format!("Unusable webhook secret: {}", e)))?;
        mac.update(header.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = mac.finalize().into_bytes();

        // 3. Constant-time comparison against every v1 entry
        let expected_bytes: &[u8] = expected.as_slice();
        let matched = header
            .v1_signatures
            .iter()
            .any(|provided| expected_bytes.ct_eq(provided).unwrap_u8() == 1);

        if !matched {
            tracing::warn!(
                expected_signature = hex_encode(expected_bytes),
                "Invalid webhook signature"
            );
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }

    /// Parse a Stripe event and convert to the port's event type.
    fn parse_event(&self, payload: &[u8]) -> Result<WebhookEvent, PaymentError> {
        let stripe_event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        if self.config.require_livemode && !stripe_event.livemode {
            tracing::warn!(
                event_id = %stripe_event.id,
                "Rejected test mode event in production"
            );
            return Err(PaymentError::invalid_webhook(
                "Test mode events not allowed in production",
            ));
        }

        let event_type = match stripe_event.event_type.as_str() {
            "checkout.session.completed" => WebhookEventType::CheckoutSessionCompleted,
            "checkout.session.expired" => WebhookEventType::CheckoutSessionExpired,
            other => WebhookEventType::Unknown(other.to_string()),
        };

        let data = extract_event_data(&stripe_event)?;

        Ok(WebhookEvent {
            id: stripe_event.id,
            event_type,
            data,
            created_at: stripe_event.created,
        })
    }

    async fn error_from_response(response: reqwest::Response) -> PaymentError {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, error = %error_text, "Stripe API request failed");

        let code = match status {
            reqwest::StatusCode::UNAUTHORIZED => PaymentErrorCode::AuthenticationError,
            reqwest::StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimitExceeded,
            reqwest::StatusCode::BAD_REQUEST => PaymentErrorCode::InvalidRequest,
            _ => PaymentErrorCode::ProviderError,
        };
        PaymentError::new(code, format!("Stripe API error: {}", error_text))
    }
}

/// Extract event data from a Stripe event.
fn extract_event_data(event: &StripeWebhookEvent) -> Result<WebhookEventData, PaymentError> {
    if event.event_type.starts_with("checkout.session.") {
        let session: StripeCheckoutSession = serde_json::from_value(event.data.object.clone())
            .map_err(|e| PaymentError::invalid_webhook(format!("Invalid checkout session: {}", e)))?;

        return Ok(WebhookEventData::Checkout {
            metadata: session.checkout_metadata(),
            session_id: session.id,
            payment_status: session.payment_status,
        });
    }

    Ok(WebhookEventData::Raw {
        json: event.data.object.to_string(),
    })
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = self.checkout_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let stripe_session: StripeCheckoutSession = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })?;

        let url = stripe_session.url.ok_or_else(|| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                "Stripe returned a checkout session without a URL",
            )
        })?;

        tracing::info!(
            deal_id = %request.deal_id,
            session_id = %stripe_session.id,
            amount_minor = request.amount_minor,
            "Checkout session created"
        );

        Ok(CheckoutSession {
            id: stripe_session.id,
            url,
            expires_at: stripe_session
                .expires_at
                .unwrap_or_else(|| chrono::Utc::now().timestamp() + DEFAULT_SESSION_TTL_SECS),
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        // 1. Parse signature header
        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        // 2. Verify signature (includes timestamp validation)
        self.verify_signature(payload, &header)?;

        // 3. Parse and convert event
        let webhook_event = self.parse_event(payload)?;

        tracing::info!(
            event_id = %webhook_event.id,
            event_type = ?webhook_event.event_type,
            "Webhook signature verified"
        );

        Ok(webhook_event)
    }
}
