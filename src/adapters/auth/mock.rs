//! Mock session validator for testing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, SalonId};
use crate::ports::SessionValidator;

/// Accepts a fixed set of tokens; anything else is `InvalidToken`.
///
/// # Example
///
/// ```ignore
/// let sessions = MockSessionValidator::new();
/// sessions.add_token("owner-token", AuthenticatedUser::for_salon(owner.id));
/// ```
#[derive(Clone, Default)]
pub struct MockSessionValidator {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    tokens: HashMap<String, AuthenticatedUser>,
    forced_error: Option<AuthError>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: impl Into<String>, user: AuthenticatedUser) -> Self {
        self.add_token(token, user);
        self
    }

    /// Registers a valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, user: AuthenticatedUser) {
        self.lock().tokens.insert(token.into(), user);
    }

    /// Registers and returns a token whose subject is `salon_id`.
    pub fn token_for_salon(&self, salon_id: SalonId) -> String {
        let token = format!("token-{}", salon_id);
        self.add_token(token.clone(), AuthenticatedUser::for_salon(salon_id));
        token
    }

    /// Every later validation fails with `error`.
    pub fn fail_with(&self, error: AuthError) {
        self.lock().forced_error = Some(error);
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let state = self.lock();
        if let Some(error) = state.forced_error.clone() {
            return Err(error);
        }
        state
            .tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
