//! Port for transactional email delivery.

use async_trait::async_trait;

use crate::domain::EmailMessage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by email adapters.
    pub enum EmailError {
        /// The provider could not be reached.
        Transport { message: String } => "email transport failed: {message}",
        /// The provider refused the message.
        Rejected { status: u16, message: String } =>
            "email provider rejected message with status {status}: {message}",
    }
}

/// Port for sending one email.
///
/// Callers never fail a user request because of email; see
/// [`Notifier`](crate::domain::Notifier).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver `message`.
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}
