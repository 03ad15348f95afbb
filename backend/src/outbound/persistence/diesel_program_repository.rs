//! PostgreSQL-backed `ProgramRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProgramRepository, RepositoryError};
use crate::domain::{Program, ProgramId, ProgramStatus, UniversityId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{ProgramRow, collect_rows};
use super::pool::DbPool;
use super::schema::programs;

/// Diesel-backed implementation of the `ProgramRepository` port.
#[derive(Clone)]
pub struct DieselProgramRepository {
    pool: DbPool,
}

impl DieselProgramRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgramRepository for DieselProgramRepository {
    async fn list(
        &self,
        university_id: &UniversityId,
        include_archived: bool,
    ) -> Result<Vec<Program>, RepositoryError> {
        let mut query = programs::table
            .filter(programs::university_id.eq(university_id.as_uuid()))
            .into_boxed();
        if !include_archived {
            query = query.filter(programs::status.eq(ProgramStatus::Active.as_str()));
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ProgramRow> = query
            .order_by((programs::name.asc(), programs::id.asc()))
            .select(ProgramRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows)
    }

    async fn find(&self, id: &ProgramId) -> Result<Option<Program>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ProgramRow> = programs::table
            .find(id.as_uuid())
            .select(ProgramRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Program::try_from).transpose()
    }

    async fn insert(&self, program: &Program) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(programs::table)
            .values(&ProgramRow::from(program))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, program: &Program) -> Result<(), RepositoryError> {
        let row = ProgramRow::from(program);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(programs::table.find(row.id))
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
