//! HTTP middleware for axum.
//!
//! - `auth` - Bearer token authentication and salon extractors

pub mod auth;

pub use auth::{salon_auth_middleware, AuthRejection, AuthState, OptionalSalon, RequireSalon};
