//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

pub mod handlers;

pub use handlers::{
    // Code handlers
    AllocateCodeHandler, GenerateCodesHandler, HandlePaymentWebhookHandler,
    MarkCodeUsedHandler, NotificationDispatcher, RedeemDealHandler, StartCheckoutHandler,
    ValidateContactHandler,
    // Deal handlers
    CreateDealHandler, DeleteDealHandler, GetDealHandler, ListDealsHandler, RecordViewHandler,
    ReviewDealHandler, UpdateDealHandler,
    // Reporting handlers
    ExportCollaborationsHandler, GetCodeStatsHandler, ListRedemptionsHandler,
};
