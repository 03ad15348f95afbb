//! Port for student interest persistence.

use async_trait::async_trait;

use crate::domain::{Interest, InterestedStudent, UniversityId, UserId};

use super::RepositoryError;

/// Port for interests, unique per (student, university).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InterestRepository: Send + Sync {
    /// The student's interest row for the university, in any status.
    async fn find(
        &self,
        student_id: &UserId,
        university_id: &UniversityId,
    ) -> Result<Option<Interest>, RepositoryError>;

    /// Insert or replace the row for the pair.
    async fn upsert(&self, interest: &Interest) -> Result<(), RepositoryError>;

    /// Every interest row of a student, newest first.
    async fn list_for_student(&self, student_id: &UserId) -> Result<Vec<Interest>, RepositoryError>;

    /// Active students currently interested in the university, newest first.
    async fn list_interested_students(
        &self,
        university_id: &UniversityId,
    ) -> Result<Vec<InterestedStudent>, RepositoryError>;
}
