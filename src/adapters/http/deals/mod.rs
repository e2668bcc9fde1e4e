//! HTTP adapter for deal management endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::DealApiError;
pub use routes::deals_router;
