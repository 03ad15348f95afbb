//! PostgreSQL-backed `UniversityRepository`.
//!
//! Browsing builds a boxed query so each optional filter adds one clause.
//! Program filters are expressed as an `IN` subselect over active programs.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, UniversityRepository};
use crate::domain::{
    ProgramStatus, UniversityFilter, UniversityId, UniversityProfile, User, UserId,
    VerificationStatus,
};

use super::diesel_error_mapping::{count, map_diesel_error, map_pool_error, sql_offset};
use super::models::{UniversityRow, UserRow, collect_rows};
use super::pool::DbPool;
use super::schema::{programs, universities, university_reps, users};

/// Diesel-backed implementation of the `UniversityRepository` port.
#[derive(Clone)]
pub struct DieselUniversityRepository {
    pool: DbPool,
}

impl DieselUniversityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Escape `LIKE` metacharacters so user text matches literally.
pub(super) fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl UniversityRepository for DieselUniversityRepository {
    async fn find(&self, id: &UniversityId) -> Result<Option<UniversityProfile>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UniversityRow> = universities::table
            .find(id.as_uuid())
            .select(UniversityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UniversityProfile::try_from).transpose()
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<UniversityProfile>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UniversityRow> = universities::table
            .filter(universities::owner_user_id.eq(owner.as_uuid()))
            .select(UniversityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UniversityProfile::try_from).transpose()
    }

    async fn find_by_rep(&self, rep: &UserId) -> Result<Option<UniversityProfile>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UniversityRow> = universities::table
            .inner_join(university_reps::table)
            .filter(university_reps::user_id.eq(rep.as_uuid()))
            .select(UniversityRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UniversityProfile::try_from).transpose()
    }

    async fn update(&self, profile: &UniversityProfile) -> Result<(), RepositoryError> {
        let row = UniversityRow::from(profile);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(universities::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn browse(
        &self,
        filter: &UniversityFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<UniversityProfile>, RepositoryError> {
        let mut query = universities::table
            .filter(universities::verification_status.eq(VerificationStatus::Verified.as_str()))
            .into_boxed();
        if let Some(country) = filter.country.as_deref() {
            query = query.filter(universities::country.ilike(escape_like(country)));
        }
        if let Some(text) = filter.query.as_deref() {
            query = query.filter(
                universities::institution_name.ilike(format!("%{}%", escape_like(text))),
            );
        }
        if filter.field.is_some() || filter.degree_level.is_some() {
            let mut matching = programs::table
                .filter(programs::status.eq(ProgramStatus::Active.as_str()))
                .select(programs::university_id)
                .into_boxed();
            if let Some(field) = filter.field.as_deref() {
                matching = matching
                    .filter(programs::field_category.ilike(format!("%{}%", escape_like(field))));
            }
            if let Some(level) = filter.degree_level {
                matching = matching.filter(programs::degree_level.eq(level.as_str()));
            }
            query = query.filter(universities::id.eq_any(matching));
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UniversityRow> = query
            .order_by((universities::institution_name.asc(), universities::id.asc()))
            .offset(sql_offset(offset))
            .limit(i64::from(limit))
            .select(UniversityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn list_by_status(
        &self,
        status: Option<VerificationStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<UniversityProfile>, RepositoryError> {
        let mut query = universities::table.into_boxed();
        if let Some(status) = status {
            query = query.filter(universities::verification_status.eq(status.as_str()));
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UniversityRow> = query
            .order_by((universities::created_at.asc(), universities::id.asc()))
            .offset(sql_offset(offset))
            .limit(i64::from(limit))
            .select(UniversityRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn count_by_status(&self, status: VerificationStatus) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        universities::table
            .filter(universities::verification_status.eq(status.as_str()))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(count)
            .map_err(map_diesel_error)
    }

    async fn list_reps(&self, id: &UniversityId) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = university_reps::table
            .inner_join(users::table)
            .filter(university_reps::university_id.eq(id.as_uuid()))
            .order_by(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Nairobi", "Nairobi")]
    #[case("100%", "100\\%")]
    #[case("a_b\\c", "a\\_b\\\\c")]
    fn like_patterns_are_escaped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(escape_like(raw), expected);
    }
}
