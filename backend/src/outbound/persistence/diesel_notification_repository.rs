//! PostgreSQL-backed `NotificationRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{NotificationRepository, RepositoryError};
use crate::domain::{Notification, NotificationId, UserId};

use super::diesel_error_mapping::{count, map_diesel_error, map_pool_error};
use super::models::{NotificationRow, collect_rows};
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(&NotificationRow::from(notification))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let mut query = notifications::table
            .filter(notifications::user_id.eq(*user_id.as_uuid()))
            .into_boxed();
        if unread_only {
            query = query.filter(notifications::read_at.is_null());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NotificationRow> = query
            .order_by((notifications::created_at.desc(), notifications::id.desc()))
            .limit(i64::from(limit))
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        notifications::table
            .filter(notifications::user_id.eq(user_id.as_uuid()))
            .filter(notifications::read_at.is_null())
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(count)
            .map_err(map_diesel_error)
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
        read_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owned = notifications::table
            .filter(notifications::id.eq(id.as_uuid()))
            .filter(notifications::user_id.eq(user_id.as_uuid()));
        // Already-read rows keep their first read time but still count as found.
        let found: i64 = owned
            .clone()
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if found == 0 {
            return Ok(false);
        }
        diesel::update(owned.filter(notifications::read_at.is_null()))
            .set(notifications::read_at.eq(Some(read_at)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(true)
    }

    async fn mark_all_read(
        &self,
        user_id: &UserId,
        read_at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(user_id.as_uuid()))
                .filter(notifications::read_at.is_null()),
        )
        .set(notifications::read_at.eq(Some(read_at)))
        .execute(&mut conn)
        .await
        .map(|updated| u64::try_from(updated).unwrap_or_default())
        .map_err(map_diesel_error)
    }
}
