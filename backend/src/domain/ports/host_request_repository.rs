//! Port for campus fair host requests and outreach.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    HostRequest, HostRequestId, HostRequestOutreach, HostRequestStatus, OutreachId,
    OutreachInvitation, UniversityId,
};

use super::RepositoryError;

/// Port for host requests and their outreach rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostRequestRepository: Send + Sync {
    /// Store a new host request.
    async fn insert(&self, request: &HostRequest) -> Result<(), RepositoryError>;

    /// Fetch a host request by id.
    async fn find(&self, id: &HostRequestId) -> Result<Option<HostRequest>, RepositoryError>;

    /// Persist a status change.
    async fn update(&self, request: &HostRequest) -> Result<(), RepositoryError>;

    /// Requests in `status` (all when `None`), newest first.
    async fn list(
        &self,
        status: Option<HostRequestStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<HostRequest>, RepositoryError>;

    /// Number of requests in `status`.
    async fn count_by_status(&self, status: HostRequestStatus) -> Result<u64, RepositoryError>;

    /// Insert invitations in one transaction. A duplicate (request,
    /// university) pair fails the whole batch with a conflict.
    async fn insert_outreach(&self, rows: &[HostRequestOutreach]) -> Result<(), RepositoryError>;

    /// Invitations already sent for a request.
    async fn list_outreach_for_request(
        &self,
        id: &HostRequestId,
    ) -> Result<Vec<HostRequestOutreach>, RepositoryError>;

    /// Invitations received by a university with their host requests,
    /// newest first.
    async fn list_outreach_for_university(
        &self,
        university_id: &UniversityId,
    ) -> Result<Vec<OutreachInvitation>, RepositoryError>;

    /// Fetch one invitation.
    async fn find_outreach(
        &self,
        id: &OutreachId,
    ) -> Result<Option<HostRequestOutreach>, RepositoryError>;

    /// Persist the university's answer.
    async fn update_outreach(&self, outreach: &HostRequestOutreach) -> Result<(), RepositoryError>;

    /// Invitations answered at or after `since`.
    async fn count_responses_since(&self, since: DateTime<Utc>) -> Result<u64, RepositoryError>;
}
