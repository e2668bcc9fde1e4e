//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind host")]
    InvalidHost,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Public base URL must be an http(s) URL")]
    InvalidPublicBaseUrl,

    #[error("Public base URL must use HTTPS in production")]
    PublicBaseUrlMustBeHttps,

    #[error("JWT secret must be at least 32 bytes")]
    JwtSecretTooShort,

    #[error("Token issuer must be an HTTPS URL in production")]
    IssuerMustBeHttps,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Currency must be a three-letter ISO code")]
    InvalidCurrency,

    #[error("Live-mode webhooks require a live Stripe key")]
    LivemodeRequiresLiveKey,

    #[error("Invalid Resend API key format")]
    InvalidResendKey,

    #[error("Invalid from email address")]
    InvalidFromEmail,

    #[error("Email attempts must be between 1 and 10")]
    InvalidRetryAttempts,

    #[error("Code batch size must be between 1 and 1000")]
    InvalidBatchSize,

    #[error("Maximum code quantity must be positive")]
    InvalidMaxQuantity,
}
