//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `DealRepository` - Deal aggregates and view counters
//! - `DiscountCodeRepository` - Code pools, atomic claim and compare-and-swap
//! - `SalonRepository` - Salon and admin accounts
//! - `CodeReader` - Dashboard statistics, redemption listing, collaboration rows
//!
//! ## External Service Ports
//!
//! - `PaymentProvider` - Hosted checkout and signed webhooks
//! - `EmailSender` - Transactional code email
//! - `SessionValidator` - Bearer token validation for salon dashboards

mod code_reader;
mod deal_repository;
mod discount_code_repository;
mod email_sender;
mod payment_provider;
mod salon_repository;
mod session_validator;

pub use code_reader::{CodeReader, ReaderError};
pub use deal_repository::DealRepository;
pub use discount_code_repository::{ClaimOutcome, DiscountCodeRepository, MarkUsedOutcome};
pub use email_sender::{EmailError, EmailErrorCode, EmailSender};
pub use payment_provider::{
    CheckoutMetadata, CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode,
    PaymentProvider, WebhookEvent, WebhookEventData, WebhookEventType,
};
pub use salon_repository::SalonRepository;
pub use session_validator::SessionValidator;
