//! Port for user account persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{EmailAddress, Role, UniversityId, UniversityProfile, User, UserId};

use super::RepositoryError;

/// A user together with the stored password hash, used only for login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Institution link created together with a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountMembership {
    /// Students and admins belong to no institution.
    None,
    /// A university owner and the profile they registered.
    Owner(UniversityProfile),
    /// A representative of an existing university.
    Rep(UniversityId),
}

/// Everything written when an account is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub user: User,
    pub password_hash: String,
    pub membership: AccountMembership,
}

/// Port for user storage.
///
/// Deleting a user cascades to the rows that user owns (profiles, interests,
/// meetings, notifications, owned university). Audit entries are kept.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create the account and its membership atomically.
    ///
    /// Returns [`RepositoryError::Conflict`] when the email is already taken.
    async fn create(&self, account: &NewAccount) -> Result<(), RepositoryError>;

    /// Look up an account by id, active or not.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Look up an account and its password hash by email.
    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, RepositoryError>;

    /// Deactivate the account and stamp the deletion request time.
    async fn mark_deletion_requested(
        &self,
        id: &UserId,
        requested_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Accounts whose deletion was requested at or before `cutoff`.
    async fn list_deletion_due(&self, cutoff: DateTime<Utc>) -> Result<Vec<User>, RepositoryError>;

    /// Hard-delete the account. Returns `false` when it no longer exists.
    async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError>;

    /// Number of accounts with `role`, active or not.
    async fn count_by_role(&self, role: Role) -> Result<u64, RepositoryError>;

    /// Active students registered before `registered_before` without a
    /// profile.
    async fn list_students_without_profile(
        &self,
        registered_before: DateTime<Utc>,
    ) -> Result<Vec<User>, RepositoryError>;
}
