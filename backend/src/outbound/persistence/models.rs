//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Each row converts to its domain type with
//! `TryFrom`, validating stored text through the domain constructors so a
//! corrupt row surfaces as a query error instead of a panic.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, StoredCredentials};
use crate::domain::{
    EmailAddress, FullName, Interest, InterestedStudent, Program, ProgramId, StudentProfile,
    UniversityId, UniversityProfile, User, UserId,
};

use super::diesel_error_mapping::{decode, validated};
use super::schema::{
    interests, programs, student_profiles, universities, university_reps, users,
};

mod activity;
mod scheduling;

pub(crate) use activity::{
    AuditLogRow, HostRequestRow, NotificationRow, OutreachRow, SupportTicketRow, SystemLogRow,
};
pub(crate) use scheduling::{AvailabilityProfileRow, AvailabilitySlotRow, MeetingRow};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Full `users` row, password hash included.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub password_hash: String,
    pub is_active: bool,
    pub deletion_requested_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn new(user: &User, password_hash: &str) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.to_string(),
            full_name: user.full_name.to_string(),
            role: user.role.as_str().to_owned(),
            password_hash: password_hash.to_owned(),
            is_active: user.is_active,
            deletion_requested_at: user.deletion_requested_at,
            created_at: user.created_at,
        }
    }

    pub fn into_credentials(self) -> Result<StoredCredentials, RepositoryError> {
        let password_hash = self.password_hash.clone();
        Ok(StoredCredentials {
            user: User::try_from(self)?,
            password_hash,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::from_uuid(row.id),
            email: validated("users.email", EmailAddress::new(&row.email))?,
            full_name: validated("users.full_name", FullName::new(&row.full_name))?,
            role: decode("users.role", &row.role)?,
            is_active: row.is_active,
            deletion_requested_at: row.deletion_requested_at,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Student profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = student_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StudentProfileRow {
    pub user_id: Uuid,
    pub country: String,
    pub city: Option<String>,
    pub current_status: String,
    pub field_of_interest: String,
    pub preferred_degree: String,
    pub budget_range: Option<String>,
    pub phone: Option<String>,
    pub cv_key: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&StudentProfile> for StudentProfileRow {
    fn from(profile: &StudentProfile) -> Self {
        Self {
            user_id: *profile.user_id.as_uuid(),
            country: profile.country.clone(),
            city: profile.city.clone(),
            current_status: profile.current_status.as_str().to_owned(),
            field_of_interest: profile.field_of_interest.clone(),
            preferred_degree: profile.preferred_degree.as_str().to_owned(),
            budget_range: profile.budget_range.clone(),
            phone: profile.phone.clone(),
            cv_key: profile.cv_key.clone(),
            updated_at: profile.updated_at,
        }
    }
}

impl TryFrom<StudentProfileRow> for StudentProfile {
    type Error = RepositoryError;

    fn try_from(row: StudentProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_uuid(row.user_id),
            country: row.country,
            city: row.city,
            current_status: decode("student_profiles.current_status", &row.current_status)?,
            field_of_interest: row.field_of_interest,
            preferred_degree: decode("student_profiles.preferred_degree", &row.preferred_degree)?,
            budget_range: row.budget_range,
            phone: row.phone,
            cv_key: row.cv_key,
            updated_at: row.updated_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Universities and representatives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = universities)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UniversityRow {
    pub id: Uuid,
    pub owner_user_id: Uuid,
    pub institution_name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub logo_key: Option<String>,
    pub brochure_key: Option<String>,
    pub verification_status: String,
    pub rejection_reason: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&UniversityProfile> for UniversityRow {
    fn from(profile: &UniversityProfile) -> Self {
        Self {
            id: *profile.id.as_uuid(),
            owner_user_id: *profile.owner_user_id.as_uuid(),
            institution_name: profile.institution_name.clone(),
            country: profile.country.clone(),
            city: profile.city.clone(),
            website: profile.website.clone(),
            description: profile.description.clone(),
            logo_key: profile.logo_key.clone(),
            brochure_key: profile.brochure_key.clone(),
            verification_status: profile.verification_status.as_str().to_owned(),
            rejection_reason: profile.rejection_reason.clone(),
            verified_at: profile.verified_at,
            created_at: profile.created_at,
        }
    }
}

impl TryFrom<UniversityRow> for UniversityProfile {
    type Error = RepositoryError;

    fn try_from(row: UniversityRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UniversityId::from_uuid(row.id),
            owner_user_id: UserId::from_uuid(row.owner_user_id),
            institution_name: row.institution_name,
            country: row.country,
            city: row.city,
            website: row.website,
            description: row.description,
            logo_key: row.logo_key,
            brochure_key: row.brochure_key,
            verification_status: decode(
                "universities.verification_status",
                &row.verification_status,
            )?,
            rejection_reason: row.rejection_reason,
            verified_at: row.verified_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = university_reps)]
pub(crate) struct NewRepLinkRow {
    pub user_id: Uuid,
    pub university_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = programs)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProgramRow {
    pub id: Uuid,
    pub university_id: Uuid,
    pub name: String,
    pub degree_level: String,
    pub field_category: String,
    pub tuition_fee_usd: Option<i32>,
    pub duration_months: i32,
    pub intakes: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Program> for ProgramRow {
    fn from(program: &Program) -> Self {
        Self {
            id: *program.id.as_uuid(),
            university_id: *program.university_id.as_uuid(),
            name: program.name.clone(),
            degree_level: program.degree_level.as_str().to_owned(),
            field_category: program.field_category.clone(),
            tuition_fee_usd: program.tuition_fee_usd,
            duration_months: program.duration_months,
            intakes: program.intakes.clone(),
            status: program.status.as_str().to_owned(),
            created_at: program.created_at,
        }
    }
}

impl TryFrom<ProgramRow> for Program {
    type Error = RepositoryError;

    fn try_from(row: ProgramRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProgramId::from_uuid(row.id),
            university_id: UniversityId::from_uuid(row.university_id),
            name: row.name,
            degree_level: decode("programs.degree_level", &row.degree_level)?,
            field_category: row.field_category,
            tuition_fee_usd: row.tuition_fee_usd,
            duration_months: row.duration_months,
            intakes: row.intakes,
            status: decode("programs.status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Interests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = interests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct InterestRow {
    pub student_id: Uuid,
    pub university_id: Uuid,
    pub program_id: Option<Uuid>,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Interest> for InterestRow {
    fn from(interest: &Interest) -> Self {
        Self {
            student_id: *interest.student_id.as_uuid(),
            university_id: *interest.university_id.as_uuid(),
            program_id: interest.program_id.map(|id| *id.as_uuid()),
            note: interest.note.clone(),
            status: interest.status.as_str().to_owned(),
            created_at: interest.created_at,
            updated_at: interest.updated_at,
        }
    }
}

impl TryFrom<InterestRow> for Interest {
    type Error = RepositoryError;

    fn try_from(row: InterestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: UserId::from_uuid(row.student_id),
            university_id: UniversityId::from_uuid(row.university_id),
            program_id: row.program_id.map(ProgramId::from_uuid),
            note: row.note,
            status: decode("interests.status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// An interest joined with the student's account and optional profile.
pub(crate) type InterestedStudentRow = (InterestRow, UserRow, Option<StudentProfileRow>);

pub(crate) fn interested_student(
    (interest, user, profile): InterestedStudentRow,
) -> Result<InterestedStudent, RepositoryError> {
    let user = User::try_from(user)?;
    let profile = profile.map(StudentProfile::try_from).transpose()?;
    Ok(InterestedStudent {
        student_id: user.id,
        full_name: user.full_name,
        email: user.email,
        country: profile.as_ref().map(|p| p.country.clone()),
        current_status: profile.as_ref().map(|p| p.current_status),
        field_of_interest: profile.as_ref().map(|p| p.field_of_interest.clone()),
        preferred_degree: profile.as_ref().map(|p| p.preferred_degree),
        program_id: interest.program_id.map(ProgramId::from_uuid),
        note: interest.note,
        interested_since: interest.updated_at,
    })
}

/// Convert a batch of rows, failing on the first corrupt one.
pub(crate) fn collect_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{Role, VerificationStatus};
    use rstest::rstest;

    fn user_row() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "amina@example.org".into(),
            full_name: "Amina Okafor".into(),
            role: "STUDENT".into(),
            password_hash: "$argon2id$v=19$stub".into(),
            is_active: true,
            deletion_requested_at: None,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn user_rows_keep_the_hash_out_of_the_domain() {
        let credentials = user_row().into_credentials().expect("valid row");
        assert_eq!(credentials.user.role, Role::Student);
        assert_eq!(credentials.password_hash, "$argon2id$v=19$stub");
        let back = UserRow::new(&credentials.user, &credentials.password_hash);
        assert_eq!(back.email, "amina@example.org");
    }

    #[rstest]
    #[case::role(UserRow { role: "ROOT".into(), ..user_row() })]
    #[case::email(UserRow { email: "not-an-email".into(), ..user_row() })]
    fn corrupt_user_rows_are_query_errors(#[case] row: UserRow) {
        let err = User::try_from(row).expect_err("corrupt row");
        assert!(matches!(err, RepositoryError::Query { .. }));
    }

    #[rstest]
    fn university_status_is_stored_upper_case() {
        let now = Utc::now();
        let profile =
            UniversityProfile::pending(UserId::random(), "Strathmore University", now)
                .expect("profile");
        let row = UniversityRow::from(&profile);
        assert_eq!(row.verification_status, "PENDING");
        let back = UniversityProfile::try_from(row).expect("round trip");
        assert_eq!(back.verification_status, VerificationStatus::Pending);
    }
}
