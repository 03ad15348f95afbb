//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Account creation writes the user together with its institution link in
//! one transaction. Hard deletion relies on the `ON DELETE` rules of the
//! schema to remove everything the account owns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::not;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{
    AccountMembership, NewAccount, RepositoryError, StoredCredentials, UserRepository,
};
use crate::domain::{EmailAddress, Role, User, UserId};

use super::diesel_error_mapping::{count, map_diesel_error, map_pool_error};
use super::models::{NewRepLinkRow, UniversityRow, UserRow, collect_rows};
use super::pool::DbPool;
use super::schema::{student_profiles, universities, university_reps, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, account: &NewAccount) -> Result<(), RepositoryError> {
        let user_row = UserRow::new(&account.user, &account.password_hash);
        let membership = account.membership.clone();
        let created_at = account.user.created_at;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(users::table)
                    .values(&user_row)
                    .execute(conn)
                    .await?;
                match membership {
                    AccountMembership::None => {}
                    AccountMembership::Owner(profile) => {
                        diesel::insert_into(universities::table)
                            .values(&UniversityRow::from(&profile))
                            .execute(conn)
                            .await?;
                    }
                    AccountMembership::Rep(university_id) => {
                        diesel::insert_into(university_reps::table)
                            .values(&NewRepLinkRow {
                                user_id: user_row.id,
                                university_id: *university_id.as_uuid(),
                                created_at,
                            })
                            .execute(conn)
                            .await?;
                    }
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserRow::into_credentials).transpose()
    }

    async fn mark_deletion_requested(
        &self,
        id: &UserId,
        requested_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::is_active.eq(false),
                users::deletion_requested_at.eq(Some(requested_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_deletion_due(&self, cutoff: DateTime<Utc>) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::deletion_requested_at.le(cutoff))
            .order_by(users::deletion_requested_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|affected| affected > 0)
            .map_err(map_diesel_error)
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::role.eq(role.as_str()))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map(count)
            .map_err(map_diesel_error)
    }

    async fn list_students_without_profile(
        &self,
        registered_before: DateTime<Utc>,
    ) -> Result<Vec<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let with_profile = student_profiles::table.select(student_profiles::user_id);
        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(Role::Student.as_str()))
            .filter(users::is_active.eq(true))
            .filter(users::created_at.le(registered_before))
            .filter(not(users::id.eq_any(with_profile)))
            .order_by(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }
}
