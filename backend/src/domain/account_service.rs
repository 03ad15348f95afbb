//! Registration, login and session identity.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::email_templates;
use crate::domain::ports::{
    AccountMembership, AuditRepository, NewAccount, PasswordHashError, PasswordHasher,
    RepositoryError, UniversityRepository, UserRepository,
};
use crate::domain::{
    AuditAction, AuditEntry, AuthenticatedUser, EmailAddress, Error, FullName, LoginCredentials,
    NewPassword, Notifier, Role, UniversityProfile, User, UserId, VerificationStatus,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Input for a student sign-up.
#[derive(Debug, Clone)]
pub struct StudentRegistration {
    pub email: EmailAddress,
    pub password: NewPassword,
    pub full_name: FullName,
}

/// Input for a university sign-up.
#[derive(Debug, Clone)]
pub struct UniversityRegistration {
    pub email: EmailAddress,
    pub password: NewPassword,
    pub full_name: FullName,
    pub institution_name: String,
}

pub(crate) fn map_hash_error(error: PasswordHashError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

fn map_create_error(error: RepositoryError) -> Error {
    match error {
        RepositoryError::Conflict { .. } => Error::conflict("email is already registered"),
        other => other.into(),
    }
}

/// Account lifecycle service.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    universities: Arc<dyn UniversityRepository>,
    hasher: Arc<dyn PasswordHasher>,
    audit: Arc<dyn AuditRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        universities: Arc<dyn UniversityRepository>,
        hasher: Arc<dyn PasswordHasher>,
        audit: Arc<dyn AuditRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            universities,
            hasher,
            audit,
            notifier,
            clock,
        }
    }

    /// Create an active student account.
    pub async fn register_student(&self, registration: StudentRegistration) -> Result<User, Error> {
        let now = self.clock.utc();
        let user = User::register(registration.email, registration.full_name, Role::Student, now);
        let password_hash = self
            .hasher
            .hash(registration.password.expose())
            .map_err(map_hash_error)?;
        self.users
            .create(&NewAccount {
                user: user.clone(),
                password_hash,
                membership: AccountMembership::None,
            })
            .await
            .map_err(map_create_error)?;
        self.record_registration(&user).await?;
        self.notifier
            .email(email_templates::student_welcome(&user.email, &user.full_name))
            .await;
        Ok(user)
    }

    /// Create a university owner account and its pending institution.
    pub async fn register_university(
        &self,
        registration: UniversityRegistration,
    ) -> Result<(User, UniversityProfile), Error> {
        let now = self.clock.utc();
        let user = User::register(
            registration.email,
            registration.full_name,
            Role::University,
            now,
        );
        let university = UniversityProfile::pending(user.id, &registration.institution_name, now)?;
        let password_hash = self
            .hasher
            .hash(registration.password.expose())
            .map_err(map_hash_error)?;
        self.users
            .create(&NewAccount {
                user: user.clone(),
                password_hash,
                membership: AccountMembership::Owner(university.clone()),
            })
            .await
            .map_err(map_create_error)?;
        self.record_registration(&user).await?;
        self.notifier
            .email(email_templates::university_welcome(
                &user.email,
                &user.full_name,
                &university.institution_name,
            ))
            .await;
        Ok((user, university))
    }

    async fn record_registration(&self, user: &User) -> Result<(), Error> {
        info!(user_id = %user.id, role = %user.role, "account registered");
        let entry = AuditEntry::new(
            Some(user.id),
            AuditAction::UserRegistered,
            "user",
            Some(user.id.to_string()),
            user.created_at,
        )
        .with_details(json!({ "role": user.role }));
        self.audit.record(&entry).await?;
        Ok(())
    }

    /// Check credentials and the account's standing.
    ///
    /// Unknown emails and wrong passwords share one message so the response
    /// does not reveal which accounts exist.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthenticatedUser, Error> {
        let stored = self
            .users
            .find_credentials(credentials.email())
            .await?
            .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        let user = stored.user;
        if !user.is_active {
            return Err(Error::forbidden("account deactivated"));
        }
        self.ensure_institution_not_rejected(&user).await?;

        let entry = AuditEntry::new(
            Some(user.id),
            AuditAction::UserLogin,
            "user",
            Some(user.id.to_string()),
            self.clock.utc(),
        );
        self.audit.record(&entry).await?;
        Ok(AuthenticatedUser {
            user_id: user.id,
            role: user.role,
        })
    }

    async fn ensure_institution_not_rejected(&self, user: &User) -> Result<(), Error> {
        let university = match user.role {
            Role::University => self.universities.find_by_owner(&user.id).await?,
            Role::UniversityRep => self.universities.find_by_rep(&user.id).await?,
            Role::Student | Role::Admin => None,
        };
        match university {
            Some(profile) if profile.verification_status == VerificationStatus::Rejected => {
                Err(Error::forbidden("university registration rejected"))
            }
            _ => Ok(()),
        }
    }

    /// The signed-in user; deactivated accounts count as signed out.
    pub async fn current_user(&self, user_id: &UserId) -> Result<User, Error> {
        match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(Error::unauthorized("login required")),
        }
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
