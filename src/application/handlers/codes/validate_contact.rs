//! ValidateContactHandler - Query handler for checking customer contact details.

use std::sync::Arc;

use crate::domain::codes::CodeError;
use crate::domain::foundation::DealId;
use crate::domain::redemption::{ContactValidation, EmailAddress, PhoneNumber};
use crate::ports::DiscountCodeRepository;

/// Query to validate an email and phone for a deal.
#[derive(Debug, Clone)]
pub struct ValidateContactQuery {
    pub deal_id: DealId,
    pub email: String,
    pub phone: String,
}

/// Handler for contact validation.
///
/// Format problems are reported before duplicates, and email before phone,
/// so a disposable address is refused regardless of the phone number.
pub struct ValidateContactHandler {
    codes: Arc<dyn DiscountCodeRepository>,
}

impl ValidateContactHandler {
    pub fn new(codes: Arc<dyn DiscountCodeRepository>) -> Self {
        Self { codes }
    }

    pub async fn handle(&self, query: ValidateContactQuery) -> Result<ContactValidation, CodeError> {
        let email = match EmailAddress::parse(&query.email) {
            Ok(email) => email,
            Err(reason) => return Ok(ContactValidation::Invalid(reason)),
        };
        let phone = match PhoneNumber::parse(&query.phone) {
            Ok(phone) => phone,
            Err(reason) => return Ok(ContactValidation::Invalid(reason)),
        };

        if let Some(reason) = self
            .codes
            .find_contact_conflict(&query.deal_id, &email, &phone)
            .await?
        {
            tracing::info!(deal_id = %query.deal_id, reason = ?reason, "Contact already used for deal");
            return Ok(ContactValidation::Invalid(reason));
        }

        Ok(ContactValidation::Valid { email, phone })
    }
}
