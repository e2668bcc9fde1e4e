//! NotificationDispatcher - delivers the code email with bounded retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::domain::redemption::CodeNotification;
use crate::ports::{EmailError, EmailSender};

/// Retry schedule for retryable delivery failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, given `attempt` failures so far.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Sends code notifications through an `EmailSender`.
pub struct NotificationDispatcher {
    sender: Arc<dyn EmailSender>,
    policy: RetryPolicy,
}

impl NotificationDispatcher {
    pub fn new(sender: Arc<dyn EmailSender>, policy: RetryPolicy) -> Self {
        Self { sender, policy }
    }

    /// Sends `notification`, retrying retryable failures. Returns the
    /// provider's message id.
    pub async fn dispatch(&self, notification: &CodeNotification) -> Result<String, EmailError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.sender.send_code(notification).await {
                Ok(message_id) => return Ok(message_id),
                Err(err) if err.retryable && attempt < max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Code email failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::email::MockEmailSender;
    use crate::domain::codes::CodeValue;
    use crate::domain::redemption::CustomerInfo;

    fn notification() -> CodeNotification {
        let customer = CustomerInfo::parse("Anna", "anna@example.se", "0701234567", false).unwrap();
        CodeNotification::new(&customer, &CodeValue::try_new("ABCD2345").unwrap(), "Klippning", None)
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(500));
        assert_eq!(policy.delay_after(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn retries_transient_failures_until_success() {
        let sender = MockEmailSender::new();
        sender.fail_next(EmailError::network("timeout"));
        sender.fail_next(EmailError::rate_limited("slow down"));
        let dispatcher = NotificationDispatcher::new(Arc::new(sender.clone()), fast_policy(3));

        let result = dispatcher.dispatch(&notification()).await;

        assert!(result.is_ok());
        assert_eq!(sender.attempts(), 3);
        assert_eq!(sender.sent().len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let sender = MockEmailSender::always_failing(EmailError::network("down"));
        let dispatcher = NotificationDispatcher::new(Arc::new(sender.clone()), fast_policy(3));

        assert!(dispatcher.dispatch(&notification()).await.is_err());
        assert_eq!(sender.attempts(), 3);
    }

    #[tokio::test]
    async fn permanent_failure_is_not_retried() {
        let sender = MockEmailSender::always_failing(EmailError::rejected("bad recipient"));
        let dispatcher = NotificationDispatcher::new(Arc::new(sender.clone()), fast_policy(3));

        assert!(dispatcher.dispatch(&notification()).await.is_err());
        assert_eq!(sender.attempts(), 1);
    }
}
