//! Shared-secret JWT session validator.
//!
//! The auth provider signs salon access tokens with HS256 and a secret shared
//! with this backend. Validation checks:
//!
//! 1. Signature against the shared secret
//! 2. Expiry (`exp`), with a small clock-skew leeway
//! 3. Audience (`aud`), and issuer (`iss`) when one is configured
//!
//! The `sub` claim becomes `AuthenticatedUser::subject`.

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Token validation settings.
#[derive(Clone)]
pub struct JwtConfig {
    secret: SecretString,
    audience: String,
    issuer: Option<String>,
    leeway_secs: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            audience: audience.into(),
            issuer: None,
            leeway_secs: 30,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

#[derive(Debug, Deserialize)]
struct AccessClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Validates HS256 access tokens.
pub struct JwtSessionValidator {
    key: DecodingKey,
    validation: Validation,
    audience: String,
}

impl JwtSessionValidator {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&config.audience]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub", "aud"]);

        Self {
            key: DecodingKey::from_secret(config.secret.expose_secret().as_bytes()),
            validation,
            audience: config.audience,
        }
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    tracing::debug!("Token expired");
                    AuthError::TokenExpired
                }
                ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => {
                    tracing::warn!(error = %e, "Token addressed to another service");
                    AuthError::InvalidToken
                }
                _ => {
                    tracing::debug!(error = %e, "Token validation failed");
                    AuthError::InvalidToken
                }
            }
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(AuthenticatedUser::new(data.claims.sub, data.claims.email))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("audience", &self.audience)
            .field("issuer", &self.validation.iss)
            .finish_non_exhaustive()
    }
}
