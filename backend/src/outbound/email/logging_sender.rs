//! Email sender that only logs, used when no provider is configured.

use async_trait::async_trait;
use tracing::info;

use crate::domain::EmailMessage;
use crate::domain::ports::{EmailError, EmailSender};

/// Logs each message instead of delivering it. Bodies are not logged since
/// they can carry temporary passwords.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEmailSender;

#[async_trait]
impl EmailSender for LoggingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "email provider not configured; message logged only"
        );
        Ok(())
    }
}
