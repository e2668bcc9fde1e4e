//! Email adapters.
//!
//! - `ResendEmailSender` - Resend HTTP API
//! - `MockEmailSender` - Recording sender for tests and local development

mod mock_email_sender;
mod resend_sender;

pub use mock_email_sender::MockEmailSender;
pub use resend_sender::{ResendConfig, ResendEmailSender};
