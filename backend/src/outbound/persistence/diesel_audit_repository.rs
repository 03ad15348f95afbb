//! PostgreSQL-backed `AuditRepository` for the append-only audit trail and
//! system log.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AuditRepository, RepositoryError};
use crate::domain::{AuditAction, AuditEntry, SystemLogEntry};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AuditLogRow, SystemLogRow, collect_rows};
use super::pool::DbPool;
use super::schema::{audit_logs, system_logs};

/// Diesel-backed implementation of the `AuditRepository` port.
#[derive(Clone)]
pub struct DieselAuditRepository {
    pool: DbPool,
}

impl DieselAuditRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for DieselAuditRepository {
    async fn record(&self, entry: &AuditEntry) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(audit_logs::table)
            .values(&AuditLogRow::from(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn has_marker(
        &self,
        action: AuditAction,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            audit_logs::table
                .filter(audit_logs::action.eq(action.as_str()))
                .filter(audit_logs::entity_type.eq(entity_type))
                .filter(audit_logs::entity_id.eq(entity_id)),
        ))
        .get_result::<bool>(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn list(&self, limit: u32) -> Result<Vec<AuditEntry>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<AuditLogRow> = audit_logs::table
            .order_by(audit_logs::created_at.desc())
            .limit(i64::from(limit))
            .select(AuditLogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn record_system(&self, entry: &SystemLogEntry) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(system_logs::table)
            .values(&SystemLogRow::from(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_system(&self, limit: u32) -> Result<Vec<SystemLogEntry>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SystemLogRow> = system_logs::table
            .order_by(system_logs::created_at.desc())
            .limit(i64::from(limit))
            .select(SystemLogRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }
}
