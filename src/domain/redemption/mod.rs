//! Redemption module - customer contact validation and code delivery.
//!
//! A customer redeems a deal by submitting name, email and phone. The
//! contact details are validated here; claiming a code and sending it are
//! orchestrated in the application layer.

mod contact;
mod notification;
mod rejection;
mod submission;

pub use contact::{is_disposable_domain, CustomerInfo, EmailAddress, PhoneNumber};
pub use notification::CodeNotification;
pub use rejection::{ContactRejection, ContactValidation};
pub use submission::{Submission, SubmissionState};
