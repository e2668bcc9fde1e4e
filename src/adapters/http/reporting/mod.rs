//! HTTP adapter for code statistics, redemption listings and CSV export.

pub mod handlers;
pub mod routes;

pub use routes::reporting_router;
