//! Port for university profile persistence.

use async_trait::async_trait;

use crate::domain::{
    UniversityFilter, UniversityId, UniversityProfile, User, UserId, VerificationStatus,
};

use super::RepositoryError;

/// Port for universities and their representatives.
///
/// Listing methods take an offset and a limit; callers over-fetch by one to
/// detect a following page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniversityRepository: Send + Sync {
    /// Fetch a university by id.
    async fn find(&self, id: &UniversityId) -> Result<Option<UniversityProfile>, RepositoryError>;

    /// University owned by the given `UNIVERSITY` user.
    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<UniversityProfile>, RepositoryError>;

    /// University the given `UNIVERSITY_REP` user represents.
    async fn find_by_rep(&self, rep: &UserId) -> Result<Option<UniversityProfile>, RepositoryError>;

    /// Persist profile and verification changes.
    async fn update(&self, profile: &UniversityProfile) -> Result<(), RepositoryError>;

    /// Verified universities matching `filter`, ordered by institution name.
    ///
    /// `field` and `degree_level` match active programs; `query` is a
    /// case-insensitive substring of the institution name.
    async fn browse(
        &self,
        filter: &UniversityFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<UniversityProfile>, RepositoryError>;

    /// Universities in `status` (all when `None`), oldest first.
    async fn list_by_status(
        &self,
        status: Option<VerificationStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<UniversityProfile>, RepositoryError>;

    /// Number of universities in `status`.
    async fn count_by_status(&self, status: VerificationStatus) -> Result<u64, RepositoryError>;

    /// Representative accounts of the university.
    async fn list_reps(&self, id: &UniversityId) -> Result<Vec<User>, RepositoryError>;
}
