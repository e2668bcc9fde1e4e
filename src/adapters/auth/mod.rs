//! Authentication adapters.
//!
//! - `JwtSessionValidator` - HS256 access tokens signed with the provider's shared secret
//! - `MockSessionValidator` - Token table for tests and local development

mod jwt;
mod mock;

pub use jwt::{JwtConfig, JwtSessionValidator};
pub use mock::MockSessionValidator;
