//! In-app notifications and best-effort email delivery.
//!
//! Email never fails the calling request: delivery errors are logged with
//! `warn!` and written to the system log, then swallowed.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::warn;

use crate::domain::ports::{AuditRepository, EmailSender, NotificationRepository};
use crate::domain::{
    EmailMessage, Error, LogLevel, Notification, NotificationKind, SystemLogEntry, UserId,
};

/// Content of an in-app notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

impl NotificationContent {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            link: None,
        }
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// Shared by every service that informs users about changes.
#[derive(Clone)]
pub struct Notifier {
    notifications: Arc<dyn NotificationRepository>,
    email: Arc<dyn EmailSender>,
    logs: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl Notifier {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        email: Arc<dyn EmailSender>,
        logs: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications,
            email,
            logs,
            clock,
        }
    }

    /// Store an in-app notification.
    pub async fn notify(&self, user_id: UserId, content: NotificationContent) -> Result<(), Error> {
        let notification = Notification::new(
            user_id,
            content.kind,
            content.title,
            content.message,
            content.link,
            self.clock.utc(),
        );
        self.notifications.insert(&notification).await?;
        Ok(())
    }

    /// Send an email, returning whether the provider accepted it.
    pub async fn email(&self, message: EmailMessage) -> bool {
        let Err(error) = self.email.send(&message).await else {
            return true;
        };
        warn!(%error, subject = %message.subject, "email delivery failed");
        let entry = SystemLogEntry::new(
            LogLevel::Error,
            "email",
            format!("failed to deliver \"{}\": {error}", message.subject),
            Some(json!({ "to": message.to.as_ref() })),
            self.clock.utc(),
        );
        if let Err(log_error) = self.logs.record_system(&entry).await {
            warn!(error = %log_error, "failed to record email failure in system log");
        }
        false
    }

    /// Store a notification and send the matching email.
    pub async fn notify_and_email(
        &self,
        user_id: UserId,
        content: NotificationContent,
        message: EmailMessage,
    ) -> Result<(), Error> {
        self.notify(user_id, content).await?;
        self.email(message).await;
        Ok(())
    }
}
