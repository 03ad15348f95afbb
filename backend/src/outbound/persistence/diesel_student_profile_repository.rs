//! PostgreSQL-backed `StudentProfileRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, StudentProfileRepository};
use crate::domain::{StudentProfile, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::StudentProfileRow;
use super::pool::DbPool;
use super::schema::student_profiles;

/// Diesel-backed implementation of the `StudentProfileRepository` port.
#[derive(Clone)]
pub struct DieselStudentProfileRepository {
    pool: DbPool,
}

impl DieselStudentProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentProfileRepository for DieselStudentProfileRepository {
    async fn find(&self, user_id: &UserId) -> Result<Option<StudentProfile>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<StudentProfileRow> = student_profiles::table
            .find(user_id.as_uuid())
            .select(StudentProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(StudentProfile::try_from).transpose()
    }

    async fn upsert(&self, profile: &StudentProfile) -> Result<(), RepositoryError> {
        let row = StudentProfileRow::from(profile);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(student_profiles::table)
            .values(&row)
            .on_conflict(student_profiles::user_id)
            .do_update()
            .set((
                student_profiles::country.eq(excluded(student_profiles::country)),
                student_profiles::city.eq(excluded(student_profiles::city)),
                student_profiles::current_status.eq(excluded(student_profiles::current_status)),
                student_profiles::field_of_interest
                    .eq(excluded(student_profiles::field_of_interest)),
                student_profiles::preferred_degree.eq(excluded(student_profiles::preferred_degree)),
                student_profiles::budget_range.eq(excluded(student_profiles::budget_range)),
                student_profiles::phone.eq(excluded(student_profiles::phone)),
                student_profiles::cv_key.eq(excluded(student_profiles::cv_key)),
                student_profiles::updated_at.eq(excluded(student_profiles::updated_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
