//! Authentication primitives: login credentials and password policy.
//!
//! Inbound adapters parse raw strings through these constructors before any
//! service sees them. Secrets are wrapped in [`Zeroizing`] so they are wiped
//! from memory when dropped.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::{EmailAddress, Role, UserId, UserValidationError};

/// Errors returned when a login payload is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    #[error("email is not valid: {0}")]
    InvalidEmail(UserValidationError),
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is normalised by [`EmailAddress`].
/// - `password` is non-empty and otherwise kept exactly as typed.
///
/// # Examples
/// ```
/// use edumeetup::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.org", "s3cret").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.org");
/// assert_eq!(creds.password(), "s3cret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = EmailAddress::new(email).map_err(LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password as provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Password policy violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyError {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("password must be at most {max} characters")]
    TooLong { max: usize },
    #[error("password must contain at least one letter and one digit")]
    MissingCharacterClass,
}

/// Minimum password length.
pub const PASSWORD_MIN: usize = 8;
/// Maximum password length.
pub const PASSWORD_MAX: usize = 128;

/// A password chosen at registration, checked against the policy.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate a candidate password.
    pub fn new(raw: &str) -> Result<Self, PasswordPolicyError> {
        let length = raw.chars().count();
        if length < PASSWORD_MIN {
            return Err(PasswordPolicyError::TooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(PasswordPolicyError::TooLong { max: PASSWORD_MAX });
        }
        let has_letter = raw.chars().any(char::is_alphabetic);
        let has_digit = raw.chars().any(|c| c.is_ascii_digit());
        if !(has_letter && has_digit) {
            return Err(PasswordPolicyError::MissingCharacterClass);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Secret text, for hashing only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NewPassword(<redacted>)")
    }
}

/// Identity established by a successful login and stored in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", true)]
    #[case("ada@example.org", "", false)]
    fn invalid_credentials(#[case] email: &str, #[case] password: &str, #[case] bad_email: bool) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(matches!(err, LoginValidationError::InvalidEmail(_)), bad_email);
    }

    #[rstest]
    fn password_whitespace_is_preserved() {
        let creds = LoginCredentials::try_from_parts("ada@example.org", " pw ")
            .expect("valid credentials");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    #[case("short1", PasswordPolicyError::TooShort { min: PASSWORD_MIN })]
    #[case("lettersonly", PasswordPolicyError::MissingCharacterClass)]
    #[case("1234567890", PasswordPolicyError::MissingCharacterClass)]
    fn rejects_weak_passwords(#[case] raw: &str, #[case] expected: PasswordPolicyError) {
        assert_eq!(NewPassword::new(raw), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_password() {
        let raw = format!("a1{}", "x".repeat(PASSWORD_MAX));
        assert_eq!(
            NewPassword::new(&raw),
            Err(PasswordPolicyError::TooLong { max: PASSWORD_MAX })
        );
    }

    #[rstest]
    fn debug_output_hides_the_secret() {
        let password = NewPassword::new("correct horse 9").expect("valid password");
        assert!(!format!("{password:?}").contains("horse"));
        assert_eq!(password.expose(), "correct horse 9");
    }
}
