//! PostgreSQL-backed `HostRequestRepository`, covering host requests and the
//! outreach invitations sent for them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{HostRequestRepository, RepositoryError};
use crate::domain::{
    HostRequest, HostRequestId, HostRequestOutreach, HostRequestStatus, OutreachId,
    OutreachInvitation, UniversityId,
};

use super::diesel_error_mapping::{count, map_diesel_error, map_pool_error, sql_offset};
use super::models::{HostRequestRow, OutreachRow, collect_rows};
use super::pool::DbPool;
use super::schema::{host_request_outreach, host_requests};

/// Diesel-backed implementation of the `HostRequestRepository` port.
#[derive(Clone)]
pub struct DieselHostRequestRepository {
    pool: DbPool,
}

impl DieselHostRequestRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HostRequestRepository for DieselHostRequestRepository {
    async fn insert(&self, request: &HostRequest) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(host_requests::table)
            .values(&HostRequestRow::from(request))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find(&self, id: &HostRequestId) -> Result<Option<HostRequest>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<HostRequestRow> = host_requests::table
            .find(id.as_uuid())
            .select(HostRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(HostRequest::try_from).transpose()
    }

    async fn update(&self, request: &HostRequest) -> Result<(), RepositoryError> {
        let row = HostRequestRow::from(request);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(host_requests::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list(
        &self,
        status: Option<HostRequestStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<HostRequest>, RepositoryError> {
        let mut query = host_requests::table.into_boxed();
        if let Some(status) = status {
            query = query.filter(host_requests::status.eq(status.as_str()));
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<HostRequestRow> = query
            .order_by((host_requests::created_at.desc(), host_requests::id.desc()))
            .offset(sql_offset(offset))
            .limit(i64::from(limit))
            .select(HostRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn count_by_status(&self, status: HostRequestStatus) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        host_requests::table
            .filter(host_requests::status.eq(status.as_str()))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(count)
            .map_err(map_diesel_error)
    }

    async fn insert_outreach(&self, rows: &[HostRequestOutreach]) -> Result<(), RepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }
        let rows: Vec<OutreachRow> = rows.iter().map(OutreachRow::from).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(host_request_outreach::table)
                    .values(&rows)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_outreach_for_request(
        &self,
        id: &HostRequestId,
    ) -> Result<Vec<HostRequestOutreach>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OutreachRow> = host_request_outreach::table
            .filter(host_request_outreach::host_request_id.eq(id.as_uuid()))
            .order_by(host_request_outreach::sent_at.asc())
            .select(OutreachRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn list_outreach_for_university(
        &self,
        university_id: &UniversityId,
    ) -> Result<Vec<OutreachInvitation>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(OutreachRow, HostRequestRow)> = host_request_outreach::table
            .inner_join(host_requests::table)
            .filter(host_request_outreach::university_id.eq(university_id.as_uuid()))
            .order_by(host_request_outreach::sent_at.desc())
            .select((OutreachRow::as_select(), HostRequestRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|(outreach, request)| {
                Ok(OutreachInvitation {
                    outreach: HostRequestOutreach::try_from(outreach)?,
                    host_request: HostRequest::try_from(request)?,
                })
            })
            .collect()
    }

    async fn find_outreach(
        &self,
        id: &OutreachId,
    ) -> Result<Option<HostRequestOutreach>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OutreachRow> = host_request_outreach::table
            .find(id.as_uuid())
            .select(OutreachRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(HostRequestOutreach::try_from).transpose()
    }

    async fn update_outreach(&self, outreach: &HostRequestOutreach) -> Result<(), RepositoryError> {
        let row = OutreachRow::from(outreach);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(host_request_outreach::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn count_responses_since(&self, since: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        host_request_outreach::table
            .filter(host_request_outreach::responded_at.ge(since))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(count)
            .map_err(map_diesel_error)
    }
}
