//! Port for the audit trail and system log.

use async_trait::async_trait;

use crate::domain::{AuditAction, AuditEntry, SystemLogEntry};

use super::RepositoryError;

/// Port for append-only audit and system log tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Append an audit entry.
    async fn record(&self, entry: &AuditEntry) -> Result<(), RepositoryError>;

    /// Whether an entry with this action, entity type and entity id exists.
    async fn has_marker(
        &self,
        action: AuditAction,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<bool, RepositoryError>;

    /// Newest audit entries.
    async fn list(&self, limit: u32) -> Result<Vec<AuditEntry>, RepositoryError>;

    /// Append a system log row.
    async fn record_system(&self, entry: &SystemLogEntry) -> Result<(), RepositoryError>;

    /// Newest system log rows.
    async fn list_system(&self, limit: u32) -> Result<Vec<SystemLogEntry>, RepositoryError>;
}
