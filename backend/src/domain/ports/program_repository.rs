//! Port for study program persistence.

use async_trait::async_trait;

use crate::domain::{Program, ProgramId, UniversityId};

use super::RepositoryError;

/// Port for programs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Programs of a university ordered by name; archived ones only when
    /// `include_archived` is set.
    async fn list(
        &self,
        university_id: &UniversityId,
        include_archived: bool,
    ) -> Result<Vec<Program>, RepositoryError>;

    /// Fetch a program by id.
    async fn find(&self, id: &ProgramId) -> Result<Option<Program>, RepositoryError>;

    /// Insert a new program.
    async fn insert(&self, program: &Program) -> Result<(), RepositoryError>;

    /// Persist changes to an existing program.
    async fn update(&self, program: &Program) -> Result<(), RepositoryError>;
}
