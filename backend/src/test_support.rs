//! Test utilities for the backend crate.
//!
//! In-memory adapters for every driven port plus [`TestWorld`], which wires
//! the real services onto them. Shared by unit tests in `src/` and the
//! HTTP integration tests in `tests/` (through the `test-support` feature).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::DefaultClock;

use crate::domain::ports::{
    AccountMembership, NewAccount, PasswordHasher, ProgramRepository, UserRepository,
};
use crate::domain::{
    DegreeLevel, EmailAddress, FullName, Notifier, Program, ProgramDraft, Role, ServicePorts,
    ServiceSettings, Services, UniversityId, UniversityProfile, User, VerificationStatus,
};

mod adapters;
mod clock;
mod memory;

pub use adapters::{InMemoryBlobStore, PlainTextHasher, RecordingEmailSender};
pub use clock::MutableClock;
pub use memory::InMemoryDatabase;

/// Password given to every account created by the `seed_*` helpers.
pub const TEST_PASSWORD: &str = "correct horse 1";

/// A notifier whose side effects land in throwaway in-memory adapters.
pub fn quiet_notifier() -> Notifier {
    let db = Arc::new(InMemoryDatabase::default());
    Notifier::new(
        db.clone(),
        Arc::new(RecordingEmailSender::default()),
        db,
        Arc::new(DefaultClock),
    )
}

/// Services wired onto in-memory adapters, with handles to inspect them.
pub struct TestWorld {
    pub db: Arc<InMemoryDatabase>,
    pub email: Arc<RecordingEmailSender>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub clock: Arc<MutableClock>,
    pub services: Services,
}

impl TestWorld {
    /// A fresh world whose clock reads `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_settings(now, &ServiceSettings::default())
    }

    pub fn with_settings(now: DateTime<Utc>, settings: &ServiceSettings) -> Self {
        let db = Arc::new(InMemoryDatabase::default());
        let email = Arc::new(RecordingEmailSender::default());
        let blobs = Arc::new(InMemoryBlobStore::default());
        let clock = Arc::new(MutableClock::new(now));
        let ports = ServicePorts {
            users: db.clone(),
            profiles: db.clone(),
            universities: db.clone(),
            programs: db.clone(),
            interests: db.clone(),
            availability: db.clone(),
            meetings: db.clone(),
            notifications: db.clone(),
            tickets: db.clone(),
            host_requests: db.clone(),
            audit: db.clone(),
            email: email.clone(),
            blobs: blobs.clone(),
            hasher: Arc::new(PlainTextHasher),
            clock: clock.clone(),
        };
        Self {
            services: Services::new(&ports, settings),
            db,
            email,
            blobs,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        mockable::Clock::utc(self.clock.as_ref())
    }

    async fn seed_account(
        &self,
        email: &str,
        name: &str,
        role: Role,
        membership: AccountMembership,
    ) -> User {
        let user = User::register(
            EmailAddress::new(email).expect("seed email"),
            FullName::new(name).expect("seed name"),
            role,
            self.now(),
        );
        let password_hash = PlainTextHasher.hash(TEST_PASSWORD).expect("seed hash");
        self.db
            .create(&NewAccount {
                user: user.clone(),
                password_hash,
                membership,
            })
            .await
            .expect("seed account");
        user
    }

    pub async fn seed_student(&self, email: &str, name: &str) -> User {
        self.seed_account(email, name, Role::Student, AccountMembership::None)
            .await
    }

    pub async fn seed_admin(&self, email: &str) -> User {
        self.seed_account(email, "Platform Admin", Role::Admin, AccountMembership::None)
            .await
    }

    /// A university owner and their institution in `status`.
    pub async fn seed_university(
        &self,
        email: &str,
        institution: &str,
        status: VerificationStatus,
    ) -> (User, UniversityProfile) {
        let owner_name = "Admissions Office";
        let owner = User::register(
            EmailAddress::new(email).expect("seed email"),
            FullName::new(owner_name).expect("seed name"),
            Role::University,
            self.now(),
        );
        let mut profile =
            UniversityProfile::pending(owner.id, institution, self.now()).expect("seed profile");
        profile.country = Some("Kenya".to_owned());
        match status {
            VerificationStatus::Pending => {}
            VerificationStatus::Verified => profile.verify(self.now()).expect("seed verify"),
            VerificationStatus::Rejected => profile.reject("seeded rejection").expect("seed reject"),
        }

        self.db
            .create(&NewAccount {
                user: owner.clone(),
                password_hash: PlainTextHasher.hash(TEST_PASSWORD).expect("seed hash"),
                membership: AccountMembership::Owner(profile.clone()),
            })
            .await
            .expect("seed university");
        (owner, profile)
    }

    pub async fn seed_rep(&self, university_id: UniversityId, email: &str, name: &str) -> User {
        self.seed_account(
            email,
            name,
            Role::UniversityRep,
            AccountMembership::Rep(university_id),
        )
        .await
    }

    /// An active bachelor's program in engineering.
    pub async fn seed_program(&self, university_id: UniversityId, name: &str) -> Program {
        let program = ProgramDraft {
            name: name.to_owned(),
            degree_level: DegreeLevel::Bachelors,
            field_category: "Engineering".to_owned(),
            tuition_fee_usd: Some(4_500),
            duration_months: 48,
            intakes: vec!["September".to_owned()],
        }
        .validate()
        .expect("seed program")
        .into_program(university_id, self.now());
        self.db.insert(&program).await.expect("seed program");
        program
    }
}

pub mod openapi {
    //! OpenAPI schema traversal helpers.
    //!
    //! Provides utilities for extracting and inspecting utoipa `Schema` types,
    //! particularly for resolving `RefOr<Schema>` wrappers to concrete `Object`
    //! schemas with diagnostic error messages on type mismatches.

    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::{Object, Schema};

    /// Extract an `Object` schema, panicking with a diagnostic if not an Object.
    pub fn unwrap_object_schema<'a>(schema: &'a RefOr<Schema>, name: &str) -> &'a Object {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj,
            RefOr::Ref(reference) => {
                panic!(
                    "schema '{name}' is a $ref to '{}'; resolve the reference first",
                    reference.ref_location
                );
            }
            _ => panic!("schema '{name}' is not an Object"),
        }
    }
}
