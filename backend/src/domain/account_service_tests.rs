//! Tests for the account service.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    MockAuditRepository, MockPasswordHasher, MockUniversityRepository, MockUserRepository,
    StoredCredentials,
};
use crate::test_support::{MutableClock, TestWorld, quiet_notifier};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 2, 9, 0, 0)
        .single()
        .expect("fixture time")
}

fn stored(role: Role, is_active: bool) -> StoredCredentials {
    let mut user = User::register(
        EmailAddress::new("ada@example.org").expect("email"),
        FullName::new("Ada Obi").expect("name"),
        role,
        now(),
    );
    user.is_active = is_active;
    StoredCredentials {
        user,
        password_hash: "hash".into(),
    }
}

fn credentials(password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts("ada@example.org", password).expect("credentials")
}

fn login_service(
    users: MockUserRepository,
    universities: MockUniversityRepository,
    hasher: MockPasswordHasher,
) -> AccountService {
    let mut audit = MockAuditRepository::new();
    audit.expect_record().returning(|_| Ok(()));
    AccountService::new(
        Arc::new(users),
        Arc::new(universities),
        Arc::new(hasher),
        Arc::new(audit),
        quiet_notifier(),
        Arc::new(MutableClock::new(now())),
    )
}

fn accepting_hasher(matches: bool) -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().returning(move |_, _| Ok(matches));
    hasher
}

#[tokio::test]
async fn unknown_email_and_wrong_password_share_a_message() {
    let mut users = MockUserRepository::new();
    users.expect_find_credentials().return_once(|_| Ok(None));
    let missing = login_service(users, MockUniversityRepository::new(), accepting_hasher(true))
        .login(&credentials("secret1"))
        .await
        .expect_err("unknown email");

    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials()
        .return_once(|_| Ok(Some(stored(Role::Student, true))));
    let wrong = login_service(users, MockUniversityRepository::new(), accepting_hasher(false))
        .login(&credentials("wrong1"))
        .await
        .expect_err("wrong password");

    assert_eq!(missing.code(), ErrorCode::Unauthorized);
    assert_eq!(missing.message(), wrong.message());
}

#[tokio::test]
async fn deactivated_accounts_cannot_log_in() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials()
        .return_once(|_| Ok(Some(stored(Role::Student, false))));
    let err = login_service(users, MockUniversityRepository::new(), accepting_hasher(true))
        .login(&credentials("secret1"))
        .await
        .expect_err("inactive");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.message(), "account deactivated");
}

#[rstest]
#[case(VerificationStatus::Rejected, false)]
#[case(VerificationStatus::Pending, true)]
#[case(VerificationStatus::Verified, true)]
#[tokio::test]
async fn university_owner_login_depends_on_verification(
    #[case] status: VerificationStatus,
    #[case] allowed: bool,
) {
    let creds = stored(Role::University, true);
    let owner = creds.user.id;
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials()
        .return_once(move |_| Ok(Some(creds)));
    let mut universities = MockUniversityRepository::new();
    universities.expect_find_by_owner().return_once(move |_| {
        let mut profile =
            UniversityProfile::pending(owner, "Ashesi University", now()).expect("profile");
        profile.verification_status = status;
        Ok(Some(profile))
    });

    let result = login_service(users, universities, accepting_hasher(true))
        .login(&credentials("secret1"))
        .await;
    match result {
        Ok(session) => {
            assert!(allowed);
            assert_eq!(session.role, Role::University);
        }
        Err(err) => {
            assert!(!allowed);
            assert_eq!(err.message(), "university registration rejected");
        }
    }
}

#[tokio::test]
async fn reps_of_rejected_institutions_are_refused() {
    let creds = stored(Role::UniversityRep, true);
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials()
        .return_once(move |_| Ok(Some(creds)));
    let mut universities = MockUniversityRepository::new();
    universities.expect_find_by_rep().return_once(|_| {
        let mut profile = UniversityProfile::pending(UserId::random(), "Ashesi University", now())
            .expect("profile");
        profile.verification_status = VerificationStatus::Rejected;
        Ok(Some(profile))
    });
    let err = login_service(users, universities, accepting_hasher(true))
        .login(&credentials("secret1"))
        .await
        .expect_err("rejected rep");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let world = TestWorld::new(now());
    let registration = || StudentRegistration {
        email: EmailAddress::new("Amina@Example.org").expect("email"),
        password: NewPassword::new("passw0rd!").expect("password"),
        full_name: FullName::new("Amina Okafor").expect("name"),
    };
    world
        .services
        .accounts
        .register_student(registration())
        .await
        .expect("first registration");
    let err = world
        .services
        .accounts
        .register_student(registration())
        .await
        .expect_err("duplicate");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), "email is already registered");
}

#[tokio::test]
async fn university_registration_creates_pending_profile_and_welcome_email() {
    let world = TestWorld::new(now());
    let (user, university) = world
        .services
        .accounts
        .register_university(UniversityRegistration {
            email: EmailAddress::new("admissions@uni.example").expect("email"),
            password: NewPassword::new("passw0rd!").expect("password"),
            full_name: FullName::new("Kofi Mensah").expect("name"),
            institution_name: "  University of Ghana ".into(),
        })
        .await
        .expect("registration");

    assert_eq!(user.role, Role::University);
    assert_eq!(university.owner_user_id, user.id);
    assert_eq!(university.institution_name, "University of Ghana");
    assert_eq!(university.verification_status, VerificationStatus::Pending);
    let sent = world.email.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text_body.contains("University of Ghana"));

    let session = world
        .services
        .accounts
        .login(
            &LoginCredentials::try_from_parts("admissions@uni.example", "passw0rd!")
                .expect("credentials"),
        )
        .await
        .expect("pending universities may log in");
    assert_eq!(session.user_id, user.id);
}

#[tokio::test]
async fn current_user_treats_deactivated_accounts_as_signed_out() {
    let world = TestWorld::new(now());
    let student = world.seed_student("sam@example.org", "Sam Ade").await;
    world.db.deactivate(&student.id, now());
    let err = world
        .services
        .accounts
        .current_user(&student.id)
        .await
        .expect_err("inactive");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
