//! Port for notification persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Notification, NotificationId, UserId};

use super::RepositoryError;

/// Port for in-app notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Store a new notification.
    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError>;

    /// Newest notifications of the user.
    async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, RepositoryError>;

    /// Number of unread notifications.
    async fn count_unread(&self, user_id: &UserId) -> Result<u64, RepositoryError>;

    /// Mark one notification read. Returns `false` when it does not exist or
    /// belongs to someone else.
    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
        read_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    /// Mark every unread notification read, returning how many changed.
    async fn mark_all_read(
        &self,
        user_id: &UserId,
        read_at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;
}
