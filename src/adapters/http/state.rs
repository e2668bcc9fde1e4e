//! Shared application state for every router.

use std::sync::Arc;

use crate::application::handlers::{
    AllocateCodeHandler, CreateDealHandler, DeleteDealHandler, ExportCollaborationsHandler,
    GenerateCodesHandler, GenerationSettings, GetCodeStatsHandler, GetDealHandler,
    HandlePaymentWebhookHandler, ListDealsHandler, ListRedemptionsHandler, MarkCodeUsedHandler,
    NotificationDispatcher, RecordViewHandler, RedeemDealHandler, ReviewDealHandler,
    StartCheckoutHandler, UpdateDealHandler, ValidateContactHandler,
};
use crate::ports::{
    CodeReader, DealRepository, DiscountCodeRepository, PaymentProvider, SalonRepository,
    SessionValidator,
};

/// Dependencies shared by all HTTP handlers.
///
/// Cloned for each request; everything inside is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionValidator>,
    pub salons: Arc<dyn SalonRepository>,
    pub deals: Arc<dyn DealRepository>,
    pub codes: Arc<dyn DiscountCodeRepository>,
    pub reader: Arc<dyn CodeReader>,
    pub payments: Arc<dyn PaymentProvider>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub generation: GenerationSettings,
    /// Storefront origin used for default checkout redirects.
    pub public_base_url: String,
}

impl AppState {
    // ════════════════════════════════════════════════════════════════════════════
    // Code handlers
    // ════════════════════════════════════════════════════════════════════════════

    pub fn generate_codes_handler(&self) -> GenerateCodesHandler {
        GenerateCodesHandler::new(self.deals.clone(), self.codes.clone(), self.generation)
    }

    pub fn allocate_code_handler(&self) -> AllocateCodeHandler {
        AllocateCodeHandler::new(self.deals.clone(), self.codes.clone())
    }

    pub fn mark_code_used_handler(&self) -> MarkCodeUsedHandler {
        MarkCodeUsedHandler::new(self.deals.clone(), self.codes.clone())
    }

    pub fn validate_contact_handler(&self) -> ValidateContactHandler {
        ValidateContactHandler::new(self.codes.clone())
    }

    pub fn redeem_deal_handler(&self) -> RedeemDealHandler {
        RedeemDealHandler::new(
            self.deals.clone(),
            self.codes.clone(),
            self.dispatcher.clone(),
        )
    }

    pub fn start_checkout_handler(&self) -> StartCheckoutHandler {
        StartCheckoutHandler::new(
            self.deals.clone(),
            self.codes.clone(),
            self.payments.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.payments.clone(),
            self.deals.clone(),
            Arc::new(self.redeem_deal_handler()),
        )
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Deal handlers
    // ════════════════════════════════════════════════════════════════════════════

    pub fn create_deal_handler(&self) -> CreateDealHandler {
        CreateDealHandler::new(self.deals.clone(), self.salons.clone())
    }

    pub fn update_deal_handler(&self) -> UpdateDealHandler {
        UpdateDealHandler::new(self.deals.clone())
    }

    pub fn review_deal_handler(&self) -> ReviewDealHandler {
        ReviewDealHandler::new(self.deals.clone())
    }

    pub fn delete_deal_handler(&self) -> DeleteDealHandler {
        DeleteDealHandler::new(self.deals.clone(), self.codes.clone())
    }

    pub fn get_deal_handler(&self) -> GetDealHandler {
        GetDealHandler::new(self.deals.clone())
    }

    pub fn list_deals_handler(&self) -> ListDealsHandler {
        ListDealsHandler::new(self.deals.clone())
    }

    pub fn record_view_handler(&self) -> RecordViewHandler {
        RecordViewHandler::new(self.deals.clone())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Reporting handlers
    // ════════════════════════════════════════════════════════════════════════════

    pub fn code_stats_handler(&self) -> GetCodeStatsHandler {
        GetCodeStatsHandler::new(self.deals.clone(), self.reader.clone())
    }

    pub fn list_redemptions_handler(&self) -> ListRedemptionsHandler {
        ListRedemptionsHandler::new(self.reader.clone())
    }

    pub fn export_collaborations_handler(&self) -> ExportCollaborationsHandler {
        ExportCollaborationsHandler::new(self.reader.clone())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use crate::adapters::email::MockEmailSender;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::application::handlers::RetryPolicy;
    use std::time::Duration;

    /// State over one in-memory store with mock email and payments.
    pub(crate) struct TestApp {
        pub state: AppState,
        pub store: Arc<InMemoryStore>,
        pub email: MockEmailSender,
        pub payments: MockPaymentProvider,
        pub sessions: MockSessionValidator,
    }

    impl TestApp {
        /// `Authorization` header value for a token whose subject is `salon_id`.
        pub(crate) fn bearer_for(&self, salon_id: crate::domain::foundation::SalonId) -> String {
            format!("Bearer {}", self.sessions.token_for_salon(salon_id))
        }
    }

    pub(crate) fn test_app() -> TestApp {
        let store = Arc::new(InMemoryStore::new());
        let email = MockEmailSender::new();
        let payments = MockPaymentProvider::new();
        let sessions = MockSessionValidator::new();
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        };
        let state = AppState {
            sessions: Arc::new(sessions.clone()),
            salons: store.clone(),
            deals: store.clone(),
            codes: store.clone(),
            reader: store.clone(),
            payments: Arc::new(payments.clone()),
            dispatcher: Arc::new(NotificationDispatcher::new(Arc::new(email.clone()), policy)),
            generation: GenerationSettings {
                batch_size: 10,
                batch_delay: Duration::ZERO,
                max_quantity: 500,
            },
            public_base_url: "https://deals.example.se".to_string(),
        };
        TestApp {
            state,
            store,
            email,
            payments,
            sessions,
        }
    }
}
