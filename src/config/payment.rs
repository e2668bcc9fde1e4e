//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,

    /// ISO currency code for checkout line items
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Reject test-mode webhook events
    #[serde(default)]
    pub require_livemode: bool,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }

        // Verify key prefixes for safety
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency);
        }
        if self.require_livemode && !self.is_live_mode() {
            return Err(ValidationError::LivemodeRequiresLiveKey);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            currency: default_currency(),
            require_livemode: false,
        }
    }
}

fn default_currency() -> String {
    "sek".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PaymentConfig {
        PaymentConfig {
            stripe_api_key: "sk_test_abcd1234".to_string(),
            stripe_webhook_secret: "whsec_xyz789".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_to_sek() {
        assert_eq!(PaymentConfig::default().currency, "sek");
    }

    #[test]
    fn test_is_test_mode() {
        let config = valid();
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());
    }

    #[test]
    fn test_validation_missing_api_key() {
        let config = PaymentConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_missing_webhook_secret() {
        let config = PaymentConfig {
            stripe_webhook_secret: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        let config = PaymentConfig {
            stripe_api_key: "pk_test_xxx".to_string(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_webhook_secret_prefix() {
        let config = PaymentConfig {
            stripe_webhook_secret: "secret_xxx".to_string(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_currency() {
        let config = PaymentConfig {
            currency: "kronor".to_string(),
            ..valid()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidCurrency)));
    }

    #[test]
    fn test_livemode_needs_live_key() {
        let config = PaymentConfig {
            require_livemode: true,
            ..valid()
        };
        assert!(config.validate().is_err());

        let config = PaymentConfig {
            stripe_api_key: "sk_live_abcd".to_string(),
            require_livemode: true,
            ..valid()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(valid().validate().is_ok());
    }
}
