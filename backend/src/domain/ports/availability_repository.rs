//! Port for availability persistence.

use async_trait::async_trait;

use crate::domain::{AvailabilityProfile, UniversityId};

use super::RepositoryError;

/// Port for the single availability profile of each university.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    /// Fetch the profile with its weekly windows.
    async fn find(
        &self,
        university_id: &UniversityId,
    ) -> Result<Option<AvailabilityProfile>, RepositoryError>;

    /// Replace the profile and all of its windows.
    async fn save(&self, profile: &AvailabilityProfile) -> Result<(), RepositoryError>;
}
