//! PostgreSQL-backed `InterestRepository`.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{InterestRepository, RepositoryError};
use crate::domain::{Interest, InterestStatus, InterestedStudent, UniversityId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    InterestRow, StudentProfileRow, UserRow, collect_rows, interested_student,
};
use super::pool::DbPool;
use super::schema::{interests, student_profiles, users};

/// Diesel-backed implementation of the `InterestRepository` port.
#[derive(Clone)]
pub struct DieselInterestRepository {
    pool: DbPool,
}

impl DieselInterestRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterestRepository for DieselInterestRepository {
    async fn find(
        &self,
        student_id: &UserId,
        university_id: &UniversityId,
    ) -> Result<Option<Interest>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<InterestRow> = interests::table
            .find((student_id.as_uuid(), university_id.as_uuid()))
            .select(InterestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Interest::try_from).transpose()
    }

    async fn upsert(&self, interest: &Interest) -> Result<(), RepositoryError> {
        let row = InterestRow::from(interest);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(interests::table)
            .values(&row)
            .on_conflict((interests::student_id, interests::university_id))
            .do_update()
            .set((
                interests::program_id.eq(excluded(interests::program_id)),
                interests::note.eq(excluded(interests::note)),
                interests::status.eq(excluded(interests::status)),
                interests::updated_at.eq(excluded(interests::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_student(&self, student_id: &UserId) -> Result<Vec<Interest>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<InterestRow> = interests::table
            .filter(interests::student_id.eq(student_id.as_uuid()))
            .order_by(interests::updated_at.desc())
            .select(InterestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn list_interested_students(
        &self,
        university_id: &UniversityId,
    ) -> Result<Vec<InterestedStudent>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let pairs: Vec<(InterestRow, UserRow)> = interests::table
            .inner_join(users::table.on(users::id.eq(interests::student_id)))
            .filter(interests::university_id.eq(university_id.as_uuid()))
            .filter(interests::status.eq(InterestStatus::Interested.as_str()))
            .filter(users::is_active.eq(true))
            .order_by(interests::updated_at.desc())
            .select((InterestRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let student_ids: Vec<_> = pairs.iter().map(|(_, user)| user.id).collect();
        let mut profiles: HashMap<_, StudentProfileRow> = student_profiles::table
            .filter(student_profiles::user_id.eq_any(student_ids))
            .select(StudentProfileRow::as_select())
            .load::<StudentProfileRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?
            .into_iter()
            .map(|row| (row.user_id, row))
            .collect();

        let rows = pairs.into_iter().map(|(interest, user)| {
            let profile = profiles.remove(&user.id);
            (interest, user, profile)
        });
        rows.map(interested_student).collect()
    }
}
