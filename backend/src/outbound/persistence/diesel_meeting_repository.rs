//! PostgreSQL-backed `MeetingRepository`.
//!
//! Booking runs the overlap check and the insert in one `SERIALIZABLE`
//! transaction, so two requests racing for the same slot cannot both commit.
//! The partial unique indexes on live meetings back this up for identical
//! start times.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{MeetingRepository, RepositoryError};
use crate::domain::{
    Meeting, MeetingId, MeetingStatus, TimeWindow, UniversityId, UserId,
};

use super::diesel_error_mapping::{count, map_diesel_error, map_pool_error};
use super::models::{MeetingRow, collect_rows};
use super::pool::DbPool;
use super::schema::meetings;

const LIVE: [&str; 2] = [
    MeetingStatus::Pending.as_str(),
    MeetingStatus::Confirmed.as_str(),
];

/// Failure inside the booking transaction.
#[derive(Debug)]
enum BookingError {
    Overlap,
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for BookingError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

/// Diesel-backed implementation of the `MeetingRepository` port.
#[derive(Clone)]
pub struct DieselMeetingRepository {
    pool: DbPool,
}

impl DieselMeetingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load(
        &self,
        query: meetings::BoxedQuery<'static, diesel::pg::Pg>,
    ) -> Result<Vec<Meeting>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MeetingRow> = query
            .order_by((meetings::starts_at.asc(), meetings::id.asc()))
            .select(MeetingRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }
}

#[async_trait]
impl MeetingRepository for DieselMeetingRepository {
    async fn insert_if_free(&self, meeting: &Meeting) -> Result<(), RepositoryError> {
        let row = MeetingRow::from(meeting);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let outcome = conn
            .build_transaction()
            .serializable()
            .run(|conn| {
                async move {
                    let overlapping: i64 = meetings::table
                        .filter(meetings::status.eq_any(LIVE))
                        .filter(
                            meetings::university_id
                                .eq(row.university_id)
                                .or(meetings::student_id.eq(row.student_id)),
                        )
                        .filter(meetings::starts_at.lt(row.ends_at))
                        .filter(meetings::ends_at.gt(row.starts_at))
                        .count()
                        .get_result(conn)
                        .await?;
                    if overlapping > 0 {
                        return Err(BookingError::Overlap);
                    }
                    diesel::insert_into(meetings::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;
        match outcome {
            Ok(()) => Ok(()),
            Err(BookingError::Overlap) => {
                Err(RepositoryError::conflict("meeting overlaps a live meeting"))
            }
            Err(BookingError::Database(error)) => Err(map_diesel_error(error)),
        }
    }

    async fn find(&self, id: &MeetingId) -> Result<Option<Meeting>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MeetingRow> = meetings::table
            .find(id.as_uuid())
            .select(MeetingRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Meeting::try_from).transpose()
    }

    async fn update(&self, meeting: &Meeting) -> Result<(), RepositoryError> {
        let row = MeetingRow::from(meeting);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(meetings::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_student(
        &self,
        student_id: &UserId,
        status: Option<MeetingStatus>,
    ) -> Result<Vec<Meeting>, RepositoryError> {
        let mut query = meetings::table
            .filter(meetings::student_id.eq(*student_id.as_uuid()))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(meetings::status.eq(status.as_str()));
        }
        self.load(query).await
    }

    async fn list_for_university(
        &self,
        university_id: &UniversityId,
        status: Option<MeetingStatus>,
    ) -> Result<Vec<Meeting>, RepositoryError> {
        let mut query = meetings::table
            .filter(meetings::university_id.eq(*university_id.as_uuid()))
            .into_boxed();
        if let Some(status) = status {
            query = query.filter(meetings::status.eq(status.as_str()));
        }
        self.load(query).await
    }

    async fn live_windows(
        &self,
        university_id: &UniversityId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimeWindow>, RepositoryError> {
        let query = meetings::table
            .filter(meetings::university_id.eq(*university_id.as_uuid()))
            .filter(meetings::status.eq_any(LIVE))
            .filter(meetings::starts_at.lt(to))
            .filter(meetings::ends_at.gt(from))
            .into_boxed();
        Ok(self
            .load(query)
            .await?
            .into_iter()
            .map(|meeting| meeting.window)
            .collect())
    }

    async fn list_confirmed_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, RepositoryError> {
        let query = meetings::table
            .filter(meetings::status.eq(MeetingStatus::Confirmed.as_str()))
            .filter(meetings::starts_at.ge(from))
            .filter(meetings::starts_at.lt(to))
            .into_boxed();
        self.load(query).await
    }

    async fn list_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, RepositoryError> {
        let query = meetings::table
            .filter(meetings::status.eq(MeetingStatus::Pending.as_str()))
            .filter(meetings::created_at.le(cutoff))
            .filter(meetings::starts_at.gt(now))
            .into_boxed();
        self.load(query).await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        meetings::table
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(count)
            .map_err(map_diesel_error)
    }
}
