//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod codes;
pub mod deals;
pub mod reporting;

#[cfg(test)]
pub(crate) mod test_support;

pub use codes::{
    AllocateCodeHandler, AllocateCodeQuery, GenerateCodesCommand, GenerateCodesHandler,
    GenerationSettings, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    MarkCodeUsedCommand, MarkCodeUsedHandler, NotificationDispatcher, RedeemDealCommand,
    RedeemDealHandler, RedeemDealResult, RetryPolicy, StartCheckoutCommand, StartCheckoutHandler,
    ValidateContactHandler, ValidateContactQuery, WebhookError, WebhookOutcome,
};
pub use deals::{
    CreateDealCommand, CreateDealHandler, DeleteDealCommand, DeleteDealHandler, GetDealHandler,
    GetDealQuery, ListDealsHandler, ListDealsQuery, RecordViewHandler, ReviewDealCommand,
    ReviewDealHandler, ReviewDecision, UpdateDealCommand, UpdateDealHandler,
};
pub use reporting::{
    ExportCollaborationsHandler, ExportCollaborationsQuery, GetCodeStatsHandler,
    GetCodeStatsQuery, ListRedemptionsHandler, ListRedemptionsQuery,
};
