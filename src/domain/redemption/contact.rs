//! Customer contact value objects.
//!
//! Email addresses are trimmed and lowercased. Phone numbers are stored in
//! the canonical `+467XXXXXXXX` form whichever prefix was typed, so the
//! per-deal duplicate rule sees `070…`, `+4670…` and `70…` as one number.
//! Both must pass format checks before a code can be claimed for them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::rejection::ContactRejection;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[A-Za-z]{2,}$").expect("email pattern compiles"));

// Swedish mobile: optional +46 or 0, then 7 and eight digits.
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+46|0)?(7\d{8})$").expect("phone pattern compiles"));

const COUNTRY_PREFIX: &str = "+46";

/// Throwaway mailbox providers that are refused for redemption.
const DISPOSABLE_DOMAINS: &[&str] = &[
    "mailinator.com",
    "guerrillamail.com",
    "guerrillamail.net",
    "10minutemail.com",
    "tempmail.com",
    "temp-mail.org",
    "yopmail.com",
    "throwaway.email",
    "trashmail.com",
    "getnada.com",
    "sharklasers.com",
    "dispostable.com",
    "maildrop.cc",
    "fakeinbox.com",
    "mailnesia.com",
    "mintemail.com",
    "emailondeck.com",
    "spamgourmet.com",
    "burnermail.io",
    "mohmal.com",
];

/// A syntactically valid, non-disposable email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, ContactRejection> {
        let normalized = raw.trim().to_lowercase();
        if !EMAIL_RE.is_match(&normalized) {
            return Err(ContactRejection::InvalidEmail);
        }
        let email = Self(normalized);
        if is_disposable_domain(email.domain()) {
            return Err(ContactRejection::DisposableEmail);
        }
        Ok(email)
    }

    pub fn domain(&self) -> &str {
        self.0.rsplit('@').next().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether `domain` (or a parent of it) is on the disposable list.
pub fn is_disposable_domain(domain: &str) -> bool {
    let domain = domain.trim().to_lowercase();
    DISPOSABLE_DOMAINS.iter().any(|blocked| {
        domain == *blocked
            || domain
                .strip_suffix(blocked)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// A Swedish mobile number in canonical `+467XXXXXXXX` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, ContactRejection> {
        let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let subscriber = PHONE_RE
            .captures(&stripped)
            .and_then(|caps| caps.get(2))
            .ok_or(ContactRejection::InvalidPhone)?;
        Ok(Self(format!("{}{}", COUNTRY_PREFIX, subscriber.as_str())))
    }

    /// Canonical form, used for storage and duplicate checks.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Domestic `07…` form for messages shown to the customer.
    pub fn national(&self) -> String {
        match self.0.strip_prefix(COUNTRY_PREFIX) {
            Some(subscriber) => format!("0{}", subscriber),
            None => self.0.clone(),
        }
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contact details bound to a code when it is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub subscribed_to_newsletter: bool,
}

impl CustomerInfo {
    /// Builds customer info from raw form input.
    pub fn parse(
        name: &str,
        email: &str,
        phone: &str,
        subscribed_to_newsletter: bool,
    ) -> Result<Self, ContactRejection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactRejection::MissingName);
        }
        Ok(Self {
            name: name.to_string(),
            email: EmailAddress::parse(email)?,
            phone: PhoneNumber::parse(phone)?,
            subscribed_to_newsletter,
        })
    }

    /// Rebuilds customer info from storage without re-validating it.
    pub fn reconstitute(
        name: String,
        email: String,
        phone: String,
        subscribed_to_newsletter: bool,
    ) -> Self {
        Self {
            name,
            email: EmailAddress(email),
            phone: PhoneNumber(phone),
            subscribed_to_newsletter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = EmailAddress::parse("  Anna.Svensson@Example.SE ").unwrap();
        assert_eq!(email.as_str(), "anna.svensson@example.se");
        assert_eq!(email.domain(), "example.se");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for raw in ["", "anna", "anna@", "@example.se", "anna@example", "an na@example.se", "a@b@c.se"] {
            assert_eq!(
                EmailAddress::parse(raw),
                Err(ContactRejection::InvalidEmail),
                "{raw:?} should be invalid"
            );
        }
    }

    #[test]
    fn disposable_domains_are_rejected() {
        assert_eq!(
            EmailAddress::parse("test@mailinator.com"),
            Err(ContactRejection::DisposableEmail)
        );
        assert_eq!(
            EmailAddress::parse("test@YOPMAIL.com"),
            Err(ContactRejection::DisposableEmail)
        );
    }

    #[test]
    fn disposable_check_covers_subdomains_only() {
        assert!(is_disposable_domain("eu.mailinator.com"));
        assert!(!is_disposable_domain("notmailinator.com"));
    }

    #[test]
    fn swedish_mobile_numbers_are_accepted() {
        assert!(PhoneNumber::parse("+46701234567").is_ok());
        assert!(PhoneNumber::parse("0701234567").is_ok());
        assert!(PhoneNumber::parse("070 123 45 67").is_ok());
        assert!(PhoneNumber::parse("701234567").is_ok());
    }

    #[test]
    fn every_prefix_variant_stores_the_same_number() {
        let canonical: Vec<String> = ["+46701234567", "0701234567", "701234567", "+46 70 123 45 67"]
            .iter()
            .map(|raw| PhoneNumber::parse(raw).unwrap().as_str().to_string())
            .collect();

        assert!(canonical.iter().all(|p| p == "+46701234567"), "{canonical:?}");
    }

    #[test]
    fn national_form_is_for_display() {
        let phone = PhoneNumber::parse("+46701234567").unwrap();
        assert_eq!(phone.national(), "0701234567");
    }

    #[test]
    fn malformed_phone_numbers_are_rejected() {
        for raw in ["070123456", "0801234567", "+4670123456", "07012345678", "abc"] {
            assert_eq!(
                PhoneNumber::parse(raw),
                Err(ContactRejection::InvalidPhone),
                "{raw:?} should be invalid"
            );
        }
    }

    #[test]
    fn customer_requires_a_name() {
        let result = CustomerInfo::parse("   ", "anna@example.se", "0701234567", false);
        assert_eq!(result, Err(ContactRejection::MissingName));
    }

    #[test]
    fn customer_parses_all_fields() {
        let customer = CustomerInfo::parse(" Anna ", "ANNA@example.se", "0701 234 567", true).unwrap();
        assert_eq!(customer.name, "Anna");
        assert_eq!(customer.email.as_str(), "anna@example.se");
        assert_eq!(customer.phone.as_str(), "+46701234567");
        assert!(customer.subscribed_to_newsletter);
    }
}
