//! University staff operations: profile, programs, representatives and the
//! interested-student list.

use std::sync::Arc;

use mockable::Clock;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde_json::json;
use tracing::info;

use crate::domain::account_service::map_hash_error;
use crate::domain::email_templates;
use crate::domain::ports::{
    AccountMembership, AuditRepository, InterestRepository, NewAccount, PasswordHasher,
    ProgramRepository, RepositoryError, UniversityRepository, UserRepository,
};
use crate::domain::{
    AuditAction, AuditEntry, AuthenticatedUser, EmailAddress, Error, FullName, InterestedStudent,
    NewPassword, Notifier, Program, ProgramDraft, ProgramId, ProgramStatus, Role,
    UniversityProfile, UniversityProfileDraft, UniversityStaff, User, UserId,
};

const TEMPORARY_PASSWORD_LEN: usize = 16;
const TEMPORARY_PASSWORD_ATTEMPTS: usize = 8;

/// A freshly created representative and the password emailed to them.
#[derive(Debug, Clone)]
pub struct CreatedRep {
    pub user: User,
    pub email_sent: bool,
}

fn generate_temporary_password() -> Result<NewPassword, Error> {
    let mut rng = rand::thread_rng();
    for _ in 0..TEMPORARY_PASSWORD_ATTEMPTS {
        let candidate: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(TEMPORARY_PASSWORD_LEN)
            .map(char::from)
            .collect();
        if let Ok(password) = NewPassword::new(&candidate) {
            return Ok(password);
        }
    }
    Err(Error::internal("failed to generate a temporary password"))
}

/// Service behind the `/api/v1/university` routes.
#[derive(Clone)]
pub struct UniversityService {
    users: Arc<dyn UserRepository>,
    universities: Arc<dyn UniversityRepository>,
    programs: Arc<dyn ProgramRepository>,
    interests: Arc<dyn InterestRepository>,
    hasher: Arc<dyn PasswordHasher>,
    audit: Arc<dyn AuditRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    login_url: String,
}

impl UniversityService {
    #[expect(
        clippy::too_many_arguments,
        reason = "flat constructor taking one port per field"
    )]
    pub fn new(
        users: Arc<dyn UserRepository>,
        universities: Arc<dyn UniversityRepository>,
        programs: Arc<dyn ProgramRepository>,
        interests: Arc<dyn InterestRepository>,
        hasher: Arc<dyn PasswordHasher>,
        audit: Arc<dyn AuditRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
        login_url: String,
    ) -> Self {
        Self {
            users,
            universities,
            programs,
            interests,
            hasher,
            audit,
            notifier,
            clock,
            login_url,
        }
    }

    /// Resolve the caller's institution.
    pub async fn staff(&self, user: &AuthenticatedUser) -> Result<UniversityStaff, Error> {
        UniversityStaff::resolve(self.universities.as_ref(), user).await
    }

    async fn verified_staff(&self, user: &AuthenticatedUser) -> Result<UniversityStaff, Error> {
        UniversityStaff::resolve_verified(self.universities.as_ref(), user).await
    }

    /// The caller's institution profile.
    pub async fn get_own_profile(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<UniversityProfile, Error> {
        Ok(self.staff(user).await?.university)
    }

    /// Update descriptive fields. Owner only; verification state is kept.
    pub async fn update_profile(
        &self,
        user: &AuthenticatedUser,
        draft: UniversityProfileDraft,
    ) -> Result<UniversityProfile, Error> {
        let staff = self.staff(user).await?;
        staff.ensure_owner()?;
        let mut profile = staff.university;
        draft.apply_to(&mut profile)?;
        self.universities.update(&profile).await?;
        Ok(profile)
    }

    /// All programs of the caller's institution, archived ones included.
    pub async fn list_programs(&self, user: &AuthenticatedUser) -> Result<Vec<Program>, Error> {
        let staff = self.staff(user).await?;
        Ok(self.programs.list(&staff.university.id, true).await?)
    }

    pub async fn create_program(
        &self,
        user: &AuthenticatedUser,
        draft: ProgramDraft,
    ) -> Result<Program, Error> {
        let staff = self.verified_staff(user).await?;
        let program = draft
            .validate()?
            .into_program(staff.university.id, self.clock.utc());
        self.programs.insert(&program).await?;
        Ok(program)
    }

    pub async fn update_program(
        &self,
        user: &AuthenticatedUser,
        id: &ProgramId,
        draft: ProgramDraft,
    ) -> Result<Program, Error> {
        let staff = self.verified_staff(user).await?;
        let mut program = self.own_program(&staff, id).await?;
        draft.validate()?.apply_to(&mut program);
        self.programs.update(&program).await?;
        Ok(program)
    }

    /// Hide a program from students. Archiving twice is a no-op.
    pub async fn archive_program(
        &self,
        user: &AuthenticatedUser,
        id: &ProgramId,
    ) -> Result<Program, Error> {
        let staff = self.verified_staff(user).await?;
        let mut program = self.own_program(&staff, id).await?;
        if program.status != ProgramStatus::Archived {
            program.status = ProgramStatus::Archived;
            self.programs.update(&program).await?;
        }
        Ok(program)
    }

    async fn own_program(&self, staff: &UniversityStaff, id: &ProgramId) -> Result<Program, Error> {
        match self.programs.find(id).await? {
            Some(program) if program.university_id == staff.university.id => Ok(program),
            _ => Err(Error::not_found("program not found")),
        }
    }

    /// Create a representative account with a random temporary password and
    /// email it to them.
    pub async fn create_rep(
        &self,
        user: &AuthenticatedUser,
        email: EmailAddress,
        full_name: FullName,
    ) -> Result<CreatedRep, Error> {
        let staff = self.verified_staff(user).await?;
        staff.ensure_owner()?;
        let now = self.clock.utc();
        let password = generate_temporary_password()?;
        let rep = User::register(email, full_name, Role::UniversityRep, now);
        let password_hash = self.hasher.hash(password.expose()).map_err(map_hash_error)?;
        self.users
            .create(&NewAccount {
                user: rep.clone(),
                password_hash,
                membership: AccountMembership::Rep(staff.university.id),
            })
            .await
            .map_err(|error| match error {
                RepositoryError::Conflict { .. } => Error::conflict("email is already registered"),
                other => other.into(),
            })?;
        let entry = AuditEntry::new(
            Some(staff.user_id),
            AuditAction::RepCreated,
            "user",
            Some(rep.id.to_string()),
            now,
        )
        .with_details(json!({ "universityId": staff.university.id }));
        self.audit.record(&entry).await?;
        info!(rep_id = %rep.id, university_id = %staff.university.id, "representative created");

        let email_sent = self
            .notifier
            .email(email_templates::rep_invitation(
                &rep.email,
                &rep.full_name,
                &staff.university.institution_name,
                password.expose(),
                &self.login_url,
            ))
            .await;
        Ok(CreatedRep {
            user: rep,
            email_sent,
        })
    }

    pub async fn list_reps(&self, user: &AuthenticatedUser) -> Result<Vec<User>, Error> {
        let staff = self.staff(user).await?;
        staff.ensure_owner()?;
        Ok(self.universities.list_reps(&staff.university.id).await?)
    }

    /// Delete a representative account of the caller's institution.
    pub async fn remove_rep(&self, user: &AuthenticatedUser, rep_id: &UserId) -> Result<(), Error> {
        let staff = self.staff(user).await?;
        staff.ensure_owner()?;
        let reps = self.universities.list_reps(&staff.university.id).await?;
        if !reps.iter().any(|rep| rep.id == *rep_id) {
            return Err(Error::not_found("representative not found"));
        }
        self.users.delete(rep_id).await?;
        let entry = AuditEntry::new(
            Some(staff.user_id),
            AuditAction::RepRemoved,
            "user",
            Some(rep_id.to_string()),
            self.clock.utc(),
        );
        self.audit.record(&entry).await?;
        Ok(())
    }

    /// Students currently interested in the caller's institution.
    pub async fn interested_students(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Vec<InterestedStudent>, Error> {
        let staff = self.verified_staff(user).await?;
        Ok(self
            .interests
            .list_interested_students(&staff.university.id)
            .await?)
    }
}

#[cfg(test)]
#[path = "university_service_tests.rs"]
mod tests;
