//! Authentication types for the domain layer.
//!
//! A salon signs in with the hosted auth provider and calls the API with the
//! access token it was issued. The token's subject is the salon's id. These
//! types carry the validated claims from the `SessionValidator` port to the
//! HTTP layer without tying either side to a token format.

use thiserror::Error;

use super::SalonId;

/// Caller identity taken from a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Subject claim; the id of the salon account.
    pub subject: String,

    /// Email claim, when the provider includes one.
    pub email: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(subject: impl Into<String>, email: Option<String>) -> Self {
        Self {
            subject: subject.into(),
            email,
        }
    }

    /// A user whose subject is the given salon.
    pub fn for_salon(salon_id: SalonId) -> Self {
        Self::new(salon_id.to_string(), None)
    }

    /// The salon this token speaks for.
    ///
    /// # Errors
    ///
    /// `InvalidToken` if the subject is not a salon id.
    pub fn salon_id(&self) -> Result<SalonId, AuthError> {
        self.subject
            .trim()
            .parse::<SalonId>()
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is malformed, has a bad signature or wrong claims.
    #[error("Invalid token")]
    InvalidToken,

    /// The token was valid but has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The validator could not do its job.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if the caller should sign in again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
