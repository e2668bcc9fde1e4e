//! Transactional email carrying a redeemed code.

use serde::{Deserialize, Serialize};

use super::contact::CustomerInfo;
use crate::domain::codes::CodeValue;

/// Everything the customer needs to use their code at the salon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeNotification {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub code: String,
    pub deal_title: String,
    pub subscribed_to_newsletter: bool,
    pub booking_url: Option<String>,
}

impl CodeNotification {
    pub fn new(
        customer: &CustomerInfo,
        code: &CodeValue,
        deal_title: impl Into<String>,
        booking_url: Option<String>,
    ) -> Self {
        Self {
            email: customer.email.as_str().to_string(),
            name: customer.name.clone(),
            phone: customer.phone.national(),
            code: code.as_str().to_string(),
            deal_title: deal_title.into(),
            subscribed_to_newsletter: customer.subscribed_to_newsletter,
            booking_url,
        }
    }

    pub fn subject(&self) -> String {
        format!("Din rabattkod för {}", self.deal_title)
    }

    pub fn text_body(&self) -> String {
        let mut body = format!(
            "Hej {}!\n\nTack för att du löste in erbjudandet \"{}\".\n\nDin rabattkod: {}\n\nVisa koden när du besöker salongen.",
            self.name, self.deal_title, self.code
        );
        if let Some(url) = &self.booking_url {
            body.push_str(&format!("\n\nBoka din tid här: {}", url));
        }
        body
    }

    pub fn html_body(&self) -> String {
        let booking = self
            .booking_url
            .as_deref()
            .map(|url| {
                format!(
                    "<p><a href=\"{}\">Boka din tid här</a></p>",
                    escape_html(url)
                )
            })
            .unwrap_or_default();
        format!(
            "<p>Hej {}!</p><p>Tack för att du löste in erbjudandet <strong>{}</strong>.</p>\
             <p>Din rabattkod:</p><p style=\"font-size:24px;letter-spacing:4px\"><strong>{}</strong></p>\
             <p>Visa koden när du besöker salongen.</p>{}",
            escape_html(&self.name),
            escape_html(&self.deal_title),
            self.code,
            booking
        )
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(booking_url: Option<&str>) -> CodeNotification {
        let customer = CustomerInfo::parse("Anna <3", "anna@example.se", "0701234567", false).unwrap();
        let code = CodeValue::try_new("ABCD2345").unwrap();
        CodeNotification::new(&customer, &code, "Klippning", booking_url.map(String::from))
    }

    #[test]
    fn subject_names_the_deal() {
        assert_eq!(notification(None).subject(), "Din rabattkod för Klippning");
    }

    #[test]
    fn bodies_contain_code_and_booking_link() {
        let n = notification(Some("https://boka.example.se"));
        assert!(n.text_body().contains("ABCD2345"));
        assert!(n.text_body().contains("https://boka.example.se"));
        assert!(n.html_body().contains("href=\"https://boka.example.se\""));
    }

    #[test]
    fn html_body_escapes_customer_name() {
        let html = notification(None).html_body();
        assert!(html.contains("Anna &lt;3"));
        assert!(!html.contains("Boka din tid"));
    }
}
