//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Pre-configured checkout sessions and webhook events
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::ports::{
    CheckoutMetadata, CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentProvider,
    WebhookEvent, WebhookEventData, WebhookEventType,
};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.set_webhook_event(MockPaymentProvider::completed_event("evt_1", metadata));
///
/// let event = mock.verify_webhook(b"{}", "sig").await?;
/// ```
#[derive(Clone, Default)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Next checkout session to return.
    next_checkout: Option<CheckoutSession>,

    /// Webhook event to return on verification.
    next_webhook_event: Option<WebhookEvent>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    /// Every checkout request received.
    checkout_requests: Vec<CreateCheckoutRequest>,

    /// Track method calls for assertions.
    call_log: Vec<String>,

    /// Reject every webhook signature.
    reject_webhooks: bool,
}

impl MockPaymentProvider {
    /// Create a new mock provider with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.lock().reject_webhooks = true;
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the checkout session to return.
    pub fn set_checkout_session(&self, session: CheckoutSession) {
        self.lock().next_checkout = Some(session);
    }

    /// Set the webhook event to return on verification.
    pub fn set_webhook_event(&self, event: WebhookEvent) {
        self.lock().next_webhook_event = Some(event);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.lock().method_errors.insert(method.to_string(), error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.lock().call_log.iter().filter(|m| *m == method).count()
    }

    /// Checkout requests received so far.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.lock().checkout_requests.clone()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Event Builders
    // ════════════════════════════════════════════════════════════════════════════

    /// A paid `checkout.session.completed` event carrying `metadata`.
    pub fn completed_event(id: &str, metadata: CheckoutMetadata) -> WebhookEvent {
        WebhookEvent {
            id: id.to_string(),
            event_type: WebhookEventType::CheckoutSessionCompleted,
            data: WebhookEventData::Checkout {
                session_id: format!("cs_{}", id),
                payment_status: Some("paid".to_string()),
                metadata: Some(metadata),
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// A `checkout.session.expired` event.
    pub fn expired_event(id: &str) -> WebhookEvent {
        WebhookEvent {
            id: id.to_string(),
            event_type: WebhookEventType::CheckoutSessionExpired,
            data: WebhookEventData::Checkout {
                session_id: format!("cs_{}", id),
                payment_status: Some("unpaid".to_string()),
                metadata: None,
            },
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_call(&self, method: &str) -> Result<MutexGuard<'_, MockState>, PaymentError> {
        let mut state = self.lock();
        state.call_log.push(method.to_string());
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }
        Ok(state)
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut state = self.begin_call("create_checkout_session")?;
        state.checkout_requests.push(request);

        let session = state.next_checkout.take().unwrap_or_else(|| {
            let id = format!("cs_mock_{}", uuid::Uuid::new_v4().simple());
            CheckoutSession {
                url: format!("https://checkout.stripe.com/c/pay/{}", id),
                id,
                expires_at: chrono::Utc::now().timestamp() + 24 * 60 * 60,
            }
        });

        Ok(session)
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        _signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        let state = self.begin_call("verify_webhook")?;

        if state.reject_webhooks {
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        if let Some(event) = &state.next_webhook_event {
            return Ok(event.clone());
        }

        let parsed: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| PaymentError::invalid_webhook(e.to_string()))?;

        let event_type = match parsed["type"].as_str().unwrap_or("unknown") {
            "checkout.session.completed" => WebhookEventType::CheckoutSessionCompleted,
            "checkout.session.expired" => WebhookEventType::CheckoutSessionExpired,
            other => WebhookEventType::Unknown(other.to_string()),
        };

        Ok(WebhookEvent {
            id: parsed["id"].as_str().unwrap_or("evt_mock").to_string(),
            event_type,
            data: WebhookEventData::Raw {
                json: String::from_utf8_lossy(payload).to_string(),
            },
            created_at: parsed["created"]
                .as_i64()
                .unwrap_or_else(|| chrono::Utc::now().timestamp()),
        })
    }
}
