//! Mock email sender for testing.
//!
//! Records every notification it is asked to send and can be primed to
//! fail a number of times before succeeding.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::redemption::CodeNotification;
use crate::ports::{EmailError, EmailSender};

/// Mock email sender.
///
/// # Example
///
/// ```ignore
/// let sender = MockEmailSender::new();
/// sender.fail_next(EmailError::network("timeout"));
///
/// // First attempt fails, second succeeds
/// ```
#[derive(Clone, Default)]
pub struct MockEmailSender {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Every call, successful or not.
    attempts: usize,

    /// Notifications that were delivered.
    sent: Vec<CodeNotification>,

    /// Errors returned by the next calls, in order.
    queued_errors: VecDeque<EmailError>,

    /// Error returned by every call once the queue is empty.
    permanent_error: Option<EmailError>,
}

impl MockEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender whose every call fails with `error`.
    pub fn always_failing(error: EmailError) -> Self {
        let mock = Self::new();
        mock.lock().permanent_error = Some(error);
        mock
    }

    /// Fail the next call with `error`.
    pub fn fail_next(&self, error: EmailError) {
        self.lock().queued_errors.push_back(error);
    }

    pub fn sent(&self) -> Vec<CodeNotification> {
        self.lock().sent.clone()
    }

    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl EmailSender for MockEmailSender {
    async fn send_code(&self, notification: &CodeNotification) -> Result<String, EmailError> {
        let mut state = self.lock();
        state.attempts += 1;
        if let Some(err) = state.queued_errors.pop_front() {
            return Err(err);
        }
        if let Some(err) = &state.permanent_error {
            return Err(err.clone());
        }
        state.sent.push(notification.clone());
        Ok(format!("mock-{}", state.sent.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codes::CodeValue;
    use crate::domain::redemption::CustomerInfo;

    fn notification() -> CodeNotification {
        let customer = CustomerInfo::parse("Anna", "anna@example.se", "0701234567", false).unwrap();
        CodeNotification::new(&customer, &CodeValue::try_new("ABCD2345").unwrap(), "Klippning", None)
    }

    #[tokio::test]
    async fn records_sent_notifications() {
        let sender = MockEmailSender::new();
        let id = sender.send_code(&notification()).await.unwrap();
        assert_eq!(id, "mock-1");
        assert_eq!(sender.sent().len(), 1);
    }

    #[tokio::test]
    async fn queued_errors_come_first() {
        let sender = MockEmailSender::new();
        sender.fail_next(EmailError::network("timeout"));

        assert!(sender.send_code(&notification()).await.is_err());
        assert!(sender.send_code(&notification()).await.is_ok());
        assert_eq!(sender.attempts(), 2);
    }
}
