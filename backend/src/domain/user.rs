//! User accounts shared by every role.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthenticatedUser, UserId};
use super::text_enum::text_enum;

/// Validation errors for user attributes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("full name must be at least {min} characters")]
    FullNameTooShort { min: usize },
    #[error("full name must be at most {max} characters")]
    FullNameTooLong { max: usize },
    #[error("full name may only contain letters, spaces, apostrophes, dots or hyphens")]
    FullNameInvalidCharacters,
}

/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 254;

/// Normalised email address (trimmed, lower-cased).
///
/// # Examples
/// ```
/// use edumeetup::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Ada@Example.ORG ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.org");
/// assert!(EmailAddress::new("ada@localhost").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, format = Email)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = raw.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains("..");
        if local.is_empty()
            || !domain_ok
            || domain.contains('@')
            || normalised.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Minimum length of a full name.
pub const FULL_NAME_MIN: usize = 2;
/// Maximum length of a full name.
pub const FULL_NAME_MAX: usize = 80;

static FULL_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn full_name_regex() -> &'static Regex {
    FULL_NAME_RE.get_or_init(|| {
        // Length is checked separately; this only constrains characters.
        Regex::new(r"^[\p{L} .'\-]+$")
            .unwrap_or_else(|error| panic!("full name regex failed to compile: {error}"))
    })
}

/// A person's display name as shown to universities and students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "Amina Okafor")]
pub struct FullName(String);

impl FullName {
    /// Validate a trimmed full name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        let length = trimmed.chars().count();
        if length < FULL_NAME_MIN {
            return Err(UserValidationError::FullNameTooShort { min: FULL_NAME_MIN });
        }
        if length > FULL_NAME_MAX {
            return Err(UserValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        if !full_name_regex().is_match(trimmed) {
            return Err(UserValidationError::FullNameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for FullName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

text_enum! {
    /// Role checked by every authorised endpoint.
    pub enum Role {
        Student => "STUDENT",
        University => "UNIVERSITY",
        UniversityRep => "UNIVERSITY_REP",
        Admin => "ADMIN",
    }
}

impl Role {
    /// Owners and representatives act on behalf of an institution.
    #[must_use]
    pub const fn is_university_staff(self) -> bool {
        matches!(self, Self::University | Self::UniversityRep)
    }
}

/// A user account.
///
/// `is_active` turns false as soon as deletion is requested; the row itself is
/// removed by the deletion sweep once the grace period has elapsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub full_name: FullName,
    pub role: Role,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_requested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a freshly registered, active account.
    #[must_use]
    pub fn register(
        email: EmailAddress,
        full_name: FullName,
        role: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::random(),
            email,
            full_name,
            role,
            is_active: true,
            deletion_requested_at: None,
            created_at: now,
        }
    }

    /// Identity kept in the session once this user signs in.
    #[must_use]
    pub const fn authenticated(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: self.id,
            role: self.role,
        }
    }
}
