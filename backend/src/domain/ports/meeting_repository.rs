//! Port for meeting persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Meeting, MeetingId, MeetingStatus, TimeWindow, UniversityId, UserId};

use super::RepositoryError;

/// Port for meetings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeetingRepository: Send + Sync {
    /// Insert a pending meeting unless a live meeting of the same university
    /// or the same student overlaps it.
    ///
    /// The overlap check and the insert are atomic; a collision returns
    /// [`RepositoryError::Conflict`].
    async fn insert_if_free(&self, meeting: &Meeting) -> Result<(), RepositoryError>;

    /// Fetch a meeting by id.
    async fn find(&self, id: &MeetingId) -> Result<Option<Meeting>, RepositoryError>;

    /// Persist a status change.
    async fn update(&self, meeting: &Meeting) -> Result<(), RepositoryError>;

    /// Meetings of a student, soonest first, optionally filtered by status.
    async fn list_for_student(
        &self,
        student_id: &UserId,
        status: Option<MeetingStatus>,
    ) -> Result<Vec<Meeting>, RepositoryError>;

    /// Meetings of a university, soonest first, optionally filtered by status.
    async fn list_for_university(
        &self,
        university_id: &UniversityId,
        status: Option<MeetingStatus>,
    ) -> Result<Vec<Meeting>, RepositoryError>;

    /// Windows of the university's live meetings intersecting `[from, to)`.
    async fn live_windows(
        &self,
        university_id: &UniversityId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimeWindow>, RepositoryError>;

    /// Confirmed meetings starting in `[from, to)`.
    async fn list_confirmed_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, RepositoryError>;

    /// Pending meetings created before `cutoff` that have not started yet at
    /// `now`.
    async fn list_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, RepositoryError>;

    /// Total number of meetings ever booked.
    async fn count(&self) -> Result<u64, RepositoryError>;
}
