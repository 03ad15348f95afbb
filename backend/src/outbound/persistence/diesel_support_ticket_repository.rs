//! PostgreSQL-backed `SupportTicketRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, SupportTicketRepository};
use crate::domain::{SupportTicket, TicketId, TicketStatus, UserId};

use super::diesel_error_mapping::{count, map_diesel_error, map_pool_error, sql_offset};
use super::models::{SupportTicketRow, collect_rows};
use super::pool::DbPool;
use super::schema::support_tickets;

/// Diesel-backed implementation of the `SupportTicketRepository` port.
#[derive(Clone)]
pub struct DieselSupportTicketRepository {
    pool: DbPool,
}

impl DieselSupportTicketRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupportTicketRepository for DieselSupportTicketRepository {
    async fn insert(&self, ticket: &SupportTicket) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(support_tickets::table)
            .values(&SupportTicketRow::from(ticket))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: &TicketId) -> Result<Option<SupportTicket>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SupportTicketRow> = support_tickets::table
            .find(id.as_uuid())
            .select(SupportTicketRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(SupportTicket::try_from).transpose()
    }

    async fn update(&self, ticket: &SupportTicket) -> Result<(), RepositoryError> {
        let row = SupportTicketRow::from(ticket);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(support_tickets::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SupportTicket>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SupportTicketRow> = support_tickets::table
            .filter(support_tickets::user_id.eq(user_id.as_uuid()))
            .order_by(support_tickets::created_at.desc())
            .select(SupportTicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn list(
        &self,
        status: Option<TicketStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<SupportTicket>, RepositoryError> {
        let mut query = support_tickets::table.into_boxed();
        if let Some(status) = status {
            query = query.filter(support_tickets::status.eq(status.as_str()));
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SupportTicketRow> = query
            .order_by((support_tickets::created_at.desc(), support_tickets::id.desc()))
            .offset(sql_offset(offset))
            .limit(i64::from(limit))
            .select(SupportTicketRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn count_by_status(&self, status: TicketStatus) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        support_tickets::table
            .filter(support_tickets::status.eq(status.as_str()))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(count)
            .map_err(map_diesel_error)
    }
}
