//! Session validation port.
//!
//! Salon dashboards call the API with a bearer access token issued by the
//! auth provider. Implementations verify it and return the caller identity.
//!
//! Implementations must check the signature, the expiry and the audience.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts the caller identity.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw access token (without the `Bearer ` prefix).
    ///
    /// # Errors
    ///
    /// - `InvalidToken` for malformed, forged or mis-addressed tokens
    /// - `TokenExpired` for tokens past their expiry
    /// - `ServiceUnavailable` when the validator cannot decide
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_validator_is_object_safe() {
        fn _accepts_dyn(_validator: &dyn SessionValidator) {}
    }
}
