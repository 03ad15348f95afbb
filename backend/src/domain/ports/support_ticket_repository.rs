//! Port for support ticket persistence.

use async_trait::async_trait;

use crate::domain::{SupportTicket, TicketId, TicketStatus, UserId};

use super::RepositoryError;

/// Port for support tickets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SupportTicketRepository: Send + Sync {
    /// Store a new ticket.
    async fn insert(&self, ticket: &SupportTicket) -> Result<(), RepositoryError>;

    /// Fetch a ticket by id.
    async fn find(&self, id: &TicketId) -> Result<Option<SupportTicket>, RepositoryError>;

    /// Persist admin changes.
    async fn update(&self, ticket: &SupportTicket) -> Result<(), RepositoryError>;

    /// Tickets raised by a signed-in user, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SupportTicket>, RepositoryError>;

    /// Tickets in `status` (all when `None`), newest first.
    async fn list(
        &self,
        status: Option<TicketStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<SupportTicket>, RepositoryError>;

    /// Number of tickets in `status`.
    async fn count_by_status(&self, status: TicketStatus) -> Result<u64, RepositoryError>;
}
