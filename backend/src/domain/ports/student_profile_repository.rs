//! Port for student profile persistence.

use async_trait::async_trait;

use crate::domain::{StudentProfile, UserId};

use super::RepositoryError;

/// Port for student profiles, keyed by the student's user id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentProfileRepository: Send + Sync {
    /// Fetch a profile; `None` until the student fills it in.
    async fn find(&self, user_id: &UserId) -> Result<Option<StudentProfile>, RepositoryError>;

    /// Insert or replace the profile.
    async fn upsert(&self, profile: &StudentProfile) -> Result<(), RepositoryError>;
}
