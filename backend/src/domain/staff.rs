//! University staff resolved from a session.

use crate::domain::ports::UniversityRepository;
use crate::domain::{AuthenticatedUser, Error, Role, UniversityProfile, UserId};

/// A `UNIVERSITY` owner or `UNIVERSITY_REP` together with their institution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversityStaff {
    pub user_id: UserId,
    pub role: Role,
    pub university: UniversityProfile,
}

impl UniversityStaff {
    /// Look up the institution the user works for.
    ///
    /// Non-staff roles get `forbidden`; staff without an institution row get
    /// `not_found`.
    pub async fn resolve(
        universities: &dyn UniversityRepository,
        user: &AuthenticatedUser,
    ) -> Result<Self, Error> {
        let university = match user.role {
            Role::University => universities.find_by_owner(&user.user_id).await?,
            Role::UniversityRep => universities.find_by_rep(&user.user_id).await?,
            Role::Student | Role::Admin => {
                return Err(Error::forbidden("university staff access required"));
            }
        };
        let university =
            university.ok_or_else(|| Error::not_found("no university is linked to this account"))?;
        Ok(Self {
            user_id: user.user_id,
            role: user.role,
            university,
        })
    }

    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.role == Role::University
    }

    /// Reject representatives from owner-only operations.
    pub fn ensure_owner(&self) -> Result<(), Error> {
        if self.is_owner() {
            Ok(())
        } else {
            Err(Error::forbidden("only the university owner can do this"))
        }
    }

    /// Resolve and require a verified institution.
    pub async fn resolve_verified(
        universities: &dyn UniversityRepository,
        user: &AuthenticatedUser,
    ) -> Result<Self, Error> {
        let staff = Self::resolve(universities, user).await?;
        staff.university.ensure_verified()?;
        Ok(staff)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUniversityRepository;
    use chrono::Utc;
    use rstest::rstest;

    fn profile(owner: UserId) -> UniversityProfile {
        UniversityProfile::pending(owner, "Makerere University", Utc::now()).expect("profile")
    }

    #[rstest]
    #[case(Role::Student)]
    #[case(Role::Admin)]
    #[tokio::test]
    async fn non_staff_roles_are_forbidden(#[case] role: Role) {
        let repo = MockUniversityRepository::new();
        let user = AuthenticatedUser {
            user_id: UserId::random(),
            role,
        };
        let err = UniversityStaff::resolve(&repo, &user)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn reps_resolve_through_membership() {
        let rep = UserId::random();
        let owner = UserId::random();
        let mut repo = MockUniversityRepository::new();
        repo.expect_find_by_rep()
            .times(1)
            .return_once(move |_| Ok(Some(profile(owner))));
        let user = AuthenticatedUser {
            user_id: rep,
            role: Role::UniversityRep,
        };
        let staff = UniversityStaff::resolve(&repo, &user).await.expect("staff");
        assert!(!staff.is_owner());
        assert_eq!(
            staff.ensure_owner().expect_err("rep").code(),
            ErrorCode::Forbidden
        );
    }

    #[tokio::test]
    async fn pending_institution_fails_verified_resolution() {
        let owner = UserId::random();
        let mut repo = MockUniversityRepository::new();
        repo.expect_find_by_owner()
            .times(1)
            .return_once(move |_| Ok(Some(profile(owner))));
        let user = AuthenticatedUser {
            user_id: owner,
            role: Role::University,
        };
        let err = UniversityStaff::resolve_verified(&repo, &user)
            .await
            .expect_err("pending");
        assert_eq!(err.message(), "university is not verified yet");
    }
}
