//! Reading and acknowledging in-app notifications.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::NotificationRepository;
use crate::domain::{Error, NOTIFICATION_LIST_MAX, Notification, NotificationId, UserId};

/// Notification inbox service.
#[derive(Clone)]
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(notifications: Arc<dyn NotificationRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications,
            clock,
        }
    }

    /// Newest notifications first; `limit` is clamped to
    /// [`NOTIFICATION_LIST_MAX`].
    pub async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, Error> {
        let limit = limit.clamp(1, NOTIFICATION_LIST_MAX);
        Ok(self.notifications.list(user_id, unread_only, limit).await?)
    }

    pub async fn unread_count(&self, user_id: &UserId) -> Result<u64, Error> {
        Ok(self.notifications.count_unread(user_id).await?)
    }

    /// Mark one of the user's notifications read.
    pub async fn mark_read(&self, user_id: &UserId, id: &NotificationId) -> Result<(), Error> {
        if self
            .notifications
            .mark_read(user_id, id, self.clock.utc())
            .await?
        {
            Ok(())
        } else {
            Err(Error::not_found("notification not found"))
        }
    }

    /// Mark everything read, returning how many notifications changed.
    pub async fn mark_all_read(&self, user_id: &UserId) -> Result<u64, Error> {
        Ok(self
            .notifications
            .mark_all_read(user_id, self.clock.utc())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockNotificationRepository;
    use mockable::DefaultClock;
    use rstest::rstest;

    fn service(repo: MockNotificationRepository) -> NotificationService {
        NotificationService::new(Arc::new(repo), Arc::new(DefaultClock))
    }

    #[rstest]
    #[case(0, 1)]
    #[case(20, 20)]
    #[case(10_000, NOTIFICATION_LIST_MAX)]
    #[tokio::test]
    async fn list_limit_is_clamped(#[case] requested: u32, #[case] expected: u32) {
        let mut repo = MockNotificationRepository::new();
        repo.expect_list()
            .withf(move |_, unread, limit| !*unread && *limit == expected)
            .times(1)
            .return_once(|_, _, _| Ok(Vec::new()));
        service(repo)
            .list(&UserId::random(), false, requested)
            .await
            .expect("list");
    }

    #[tokio::test]
    async fn marking_someone_elses_notification_is_not_found() {
        let mut repo = MockNotificationRepository::new();
        repo.expect_mark_read().return_once(|_, _, _| Ok(false));
        let err = service(repo)
            .mark_read(&UserId::random(), &NotificationId::random())
            .await
            .expect_err("not owned");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
