//! Authentication configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::auth::JwtConfig;

/// Shortest accepted HS256 secret, in bytes.
const MIN_SECRET_LEN: usize = 32;

/// Access token validation (shared-secret JWT)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret shared with the auth provider
    pub jwt_secret: String,

    /// Expected `aud` claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Expected `iss` claim; not checked when unset
    #[serde(default)]
    pub issuer: Option<String>,

    /// Accepted clock skew for `exp`
    #[serde(default = "default_leeway")]
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Settings for `JwtSessionValidator`
    pub fn jwt_config(&self) -> JwtConfig {
        let config = JwtConfig::new(self.jwt_secret.clone(), self.audience.clone())
            .with_leeway(self.leeway_secs);
        match &self.issuer {
            Some(issuer) => config.with_issuer(issuer.clone()),
            None => config,
        }
    }

    /// Validate authentication configuration
    ///
    /// In production the issuer must be set and use HTTPS.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.jwt_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__JWT_SECRET"));
        }
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(ValidationError::JwtSecretTooShort);
        }
        if self.audience.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__AUDIENCE"));
        }
        if *environment == Environment::Production {
            match &self.issuer {
                Some(issuer) if issuer.starts_with("https://") => {}
                _ => return Err(ValidationError::IssuerMustBeHttps),
            }
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            audience: default_audience(),
            issuer: None,
            leeway_secs: default_leeway(),
        }
    }
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_leeway() -> u64 {
    30
}
