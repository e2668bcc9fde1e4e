//! Reasons a customer's contact details are refused.

use serde::{Deserialize, Serialize};

use super::contact::{EmailAddress, PhoneNumber};

/// Why contact details cannot be used to redeem a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactRejection {
    MissingName,
    InvalidEmail,
    DisposableEmail,
    InvalidPhone,
    EmailAlreadyUsed,
    PhoneAlreadyUsed,
}

impl ContactRejection {
    /// Message shown to the customer on the storefront.
    pub fn user_message(&self) -> &'static str {
        match self {
            ContactRejection::MissingName => "Ange ditt namn",
            ContactRejection::InvalidEmail => "Ange en giltig e-postadress",
            ContactRejection::DisposableEmail => "Tillfälliga e-postadresser är inte tillåtna",
            ContactRejection::InvalidPhone => {
                "Ange ett giltigt svenskt mobilnummer (t.ex. 070 123 45 67)"
            }
            ContactRejection::EmailAlreadyUsed => {
                "Denna e-postadress har redan använts för detta erbjudande"
            }
            ContactRejection::PhoneAlreadyUsed => {
                "Detta telefonnummer har redan använts för detta erbjudande"
            }
        }
    }

    /// True for duplicate-use rejections, false for format problems.
    pub fn is_already_used(&self) -> bool {
        matches!(
            self,
            ContactRejection::EmailAlreadyUsed | ContactRejection::PhoneAlreadyUsed
        )
    }

    /// Form field the rejection refers to.
    pub fn field(&self) -> &'static str {
        match self {
            ContactRejection::MissingName => "name",
            ContactRejection::InvalidEmail
            | ContactRejection::DisposableEmail
            | ContactRejection::EmailAlreadyUsed => "email",
            ContactRejection::InvalidPhone | ContactRejection::PhoneAlreadyUsed => "phone",
        }
    }
}

impl std::fmt::Display for ContactRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ContactRejection {}

/// Outcome of checking contact details against a deal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidation {
    Valid {
        email: EmailAddress,
        phone: PhoneNumber,
    },
    Invalid(ContactRejection),
}

impl ContactValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, ContactValidation::Valid { .. })
    }

    pub fn rejection(&self) -> Option<ContactRejection> {
        match self {
            ContactValidation::Valid { .. } => None,
            ContactValidation::Invalid(reason) => Some(*reason),
        }
    }
}
