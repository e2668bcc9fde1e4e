//! RedeemDealHandler - Command handler for the storefront redemption flow.
//!
//! Validates the customer, claims the next free code atomically and emails
//! it. The claim-and-notify step is shared with the payment webhook so a
//! paid deal hands out its code exactly the same way.

use std::sync::Arc;

use serde::Serialize;

use super::notification_dispatcher::NotificationDispatcher;
use crate::domain::codes::{CodeError, CodeValue};
use crate::domain::deal::Deal;
use crate::domain::foundation::{DealId, Timestamp};
use crate::domain::redemption::{CodeNotification, CustomerInfo, Submission};
use crate::ports::{ClaimOutcome, DealRepository, DiscountCodeRepository};

/// Command submitted by the redemption form.
#[derive(Debug, Clone)]
pub struct RedeemDealCommand {
    pub deal_id: DealId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub newsletter: bool,
}

/// A code handed to a customer and confirmed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedeemDealResult {
    pub code: CodeValue,
    pub deal_title: String,
    pub message_id: String,
}

/// Handler for redeeming a deal.
pub struct RedeemDealHandler {
    deals: Arc<dyn DealRepository>,
    codes: Arc<dyn DiscountCodeRepository>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl RedeemDealHandler {
    pub fn new(
        deals: Arc<dyn DealRepository>,
        codes: Arc<dyn DiscountCodeRepository>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            deals,
            codes,
            dispatcher,
        }
    }

    pub async fn handle(&self, cmd: RedeemDealCommand) -> Result<RedeemDealResult, CodeError> {
        let mut submission = Submission::new();
        submission.begin()?;
        let result = self.redeem(cmd).await;
        submission.finish(result)
    }

    async fn redeem(&self, cmd: RedeemDealCommand) -> Result<RedeemDealResult, CodeError> {
        // 1. Deal must be open for redemption
        let deal = self
            .deals
            .find_by_id(&cmd.deal_id)
            .await?
            .ok_or(CodeError::deal_not_found(cmd.deal_id))?;
        if !deal.is_redeemable() {
            return Err(CodeError::not_redeemable(deal.id));
        }

        // 2. Contact format, then duplicates
        let customer = CustomerInfo::parse(&cmd.name, &cmd.email, &cmd.phone, cmd.newsletter)?;
        if let Some(reason) = self
            .codes
            .find_contact_conflict(&deal.id, &customer.email, &customer.phone)
            .await?
        {
            return Err(CodeError::ContactRejected(reason));
        }

        // 3. Claim and notify
        self.fulfil(&deal, &customer).await
    }

    /// Claims the next free code of `deal` for `customer` and emails it.
    ///
    /// The claim is final: if delivery fails afterwards the code stays
    /// consumed and `NotificationFailed` carries it so it can be shown.
    pub async fn fulfil(
        &self,
        deal: &Deal,
        customer: &CustomerInfo,
    ) -> Result<RedeemDealResult, CodeError> {
        let claimed = match self.codes.claim(&deal.id, customer, Timestamp::now()).await? {
            ClaimOutcome::Claimed(code) => code,
            ClaimOutcome::Exhausted => {
                tracing::warn!(deal_id = %deal.id, "Redemption attempted on exhausted deal");
                return Err(CodeError::exhausted(deal.id));
            }
            ClaimOutcome::ContactTaken(reason) => return Err(CodeError::ContactRejected(reason)),
        };

        tracing::info!(deal_id = %deal.id, code = %claimed.code, "Discount code claimed");

        let notification =
            CodeNotification::new(customer, &claimed.code, &deal.title, deal.booking_url.clone());
        match self.dispatcher.dispatch(&notification).await {
            Ok(message_id) => Ok(RedeemDealResult {
                code: claimed.code,
                deal_title: deal.title.clone(),
                message_id,
            }),
            Err(err) => {
                tracing::error!(
                    deal_id = %deal.id,
                    code = %claimed.code,
                    error = %err,
                    "Code claimed but email delivery failed"
                );
                Err(CodeError::notification_failed(claimed.code.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::email::MockEmailSender;
    use crate::application::handlers::codes::notification_dispatcher::RetryPolicy;
    use crate::application::handlers::test_support::{fixture, seed_codes, Fixture};
    use crate::domain::redemption::ContactRejection;
    use crate::ports::{EmailError, EmailSender};
    use std::collections::HashSet;
    use std::time::Duration;

    fn handler(f: &Fixture, sender: &MockEmailSender) -> RedeemDealHandler {
        let sender: Arc<dyn EmailSender> = Arc::new(sender.clone());
        let dispatcher = NotificationDispatcher::new(
            sender,
            RetryPolicy {
                max_attempts: 2,
                base_delay: Duration::ZERO,
            },
        );
        RedeemDealHandler::new(f.store.clone(), f.store.clone(), Arc::new(dispatcher))
    }

    fn command(deal_id: DealId, email: &str, phone: &str) -> RedeemDealCommand {
        RedeemDealCommand {
            deal_id,
            name: "Anna Svensson".to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            newsletter: true,
        }
    }

    #[tokio::test]
    async fn redemption_claims_code_and_sends_email() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222"]).await;
        let sender = MockEmailSender::new();

        let result = handler(&f, &sender)
            .handle(command(f.deal.id, "anna@example.se", "0701234567"))
            .await
            .unwrap();

        assert_eq!(result.code.as_str(), "AAAA2222");
        assert_eq!(result.deal_title, f.deal.title);
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].code, "AAAA2222");
        assert!(sent[0].subscribed_to_newsletter);
        let stored = f.store.codes_for_deal(&f.deal.id).await;
        assert!(stored[0].is_used());
        assert_eq!(stored[0].customer().unwrap().email.as_str(), "anna@example.se");
    }

    #[tokio::test]
    async fn empty_pool_is_exhausted() {
        let f = fixture().await;
        let sender = MockEmailSender::new();

        let result = handler(&f, &sender)
            .handle(command(f.deal.id, "anna@example.se", "0701234567"))
            .await;

        assert_eq!(result, Err(CodeError::exhausted(f.deal.id)));
        assert_eq!(sender.attempts(), 0);
    }

    #[tokio::test]
    async fn repeat_customer_is_refused() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222", "BBBB3333"]).await;
        let sender = MockEmailSender::new();
        let handler = handler(&f, &sender);
        handler
            .handle(command(f.deal.id, "anna@example.se", "0701234567"))
            .await
            .unwrap();

        let result = handler
            .handle(command(f.deal.id, "ANNA@example.se", "0709999999"))
            .await;

        assert_eq!(
            result,
            Err(CodeError::ContactRejected(ContactRejection::EmailAlreadyUsed))
        );
        assert_eq!(f.store.codes_for_deal(&f.deal.id).await.iter().filter(|c| c.is_used()).count(), 1);
    }

    #[tokio::test]
    async fn invalid_contact_does_not_consume_a_code() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222"]).await;
        let sender = MockEmailSender::new();

        let result = handler(&f, &sender)
            .handle(command(f.deal.id, "anna@yopmail.com", "0701234567"))
            .await;

        assert_eq!(
            result,
            Err(CodeError::ContactRejected(ContactRejection::DisposableEmail))
        );
        assert!(f.store.codes_for_deal(&f.deal.id).await.iter().all(|c| !c.is_used()));
    }

    #[tokio::test]
    async fn inactive_deal_is_not_redeemable() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222"]).await;
        let mut deal = f.deal.clone();
        deal.set_active(false, Timestamp::now());
        DealRepository::update(f.store.as_ref(), &deal).await.unwrap();
        let sender = MockEmailSender::new();

        let result = handler(&f, &sender)
            .handle(command(f.deal.id, "anna@example.se", "0701234567"))
            .await;

        assert_eq!(result, Err(CodeError::not_redeemable(f.deal.id)));
    }

    #[tokio::test]
    async fn transient_email_failure_is_retried() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222"]).await;
        let sender = MockEmailSender::new();
        sender.fail_next(EmailError::network("timeout"));

        let result = handler(&f, &sender)
            .handle(command(f.deal.id, "anna@example.se", "0701234567"))
            .await;

        assert!(result.is_ok());
        assert_eq!(sender.attempts(), 2);
    }

    #[tokio::test]
    async fn failed_email_keeps_code_consumed_and_reports_it() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222"]).await;
        let sender = MockEmailSender::always_failing(EmailError::rejected("bad recipient"));

        let result = handler(&f, &sender)
            .handle(command(f.deal.id, "anna@example.se", "0701234567"))
            .await;

        assert_eq!(result, Err(CodeError::notification_failed("AAAA2222")));
        assert!(f.store.codes_for_deal(&f.deal.id).await[0].is_used());
    }

    #[tokio::test]
    async fn concurrent_redemptions_never_share_a_code() {
        let f = fixture().await;
        seed_codes(&f.store, f.deal.id, &["AAAA2222", "BBBB3333", "CCCC4444"]).await;
        let sender = MockEmailSender::new();
        let handler = Arc::new(handler(&f, &sender));

        let mut tasks = Vec::new();
        for i in 0..8 {
            let handler = handler.clone();
            let cmd = command(f.deal.id, &format!("kund{}@example.se", i), &format!("07000000{:02}", i));
            tasks.push(tokio::spawn(async move { handler.handle(cmd).await }));
        }

        let mut issued = HashSet::new();
        let mut exhausted = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(result) => assert!(issued.insert(result.code)),
                Err(CodeError::PoolExhausted(_)) => exhausted += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(issued.len(), 3);
        assert_eq!(exhausted, 5);
    }
}
