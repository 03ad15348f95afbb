//! Student interest in a university.
//!
//! One row exists per (student, university) pair. Withdrawing keeps the row so
//! a later expression of interest revives it instead of duplicating it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum::text_enum;
use super::{
    CurrentStatus, DegreeLevel, EmailAddress, FullName, ProgramId, UniversityId, UserId,
};

text_enum! {
    /// Whether the student currently wants to hear from the university.
    pub enum InterestStatus {
        Interested => "interested",
        Withdrawn => "withdrawn",
    }
}

/// A student's interest in one university.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
    pub student_id: UserId,
    pub university_id: UniversityId,
    pub program_id: Option<ProgramId>,
    pub note: Option<String>,
    pub status: InterestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of expressing interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestChange {
    /// No row existed; one was created.
    Created,
    /// A withdrawn row was reactivated.
    Revived,
    /// The student was already interested; nothing changed.
    Unchanged,
}

impl InterestChange {
    /// Created and revived interests notify the university.
    #[must_use]
    pub const fn notifies_university(self) -> bool {
        matches!(self, Self::Created | Self::Revived)
    }
}

impl Interest {
    /// Apply an expression of interest to the existing row, if any.
    pub fn express(
        existing: Option<Interest>,
        student_id: UserId,
        university_id: UniversityId,
        program_id: Option<ProgramId>,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> (Self, InterestChange) {
        match existing {
            Some(current) if current.status == InterestStatus::Interested => {
                (current, InterestChange::Unchanged)
            }
            Some(current) => (
                Self {
                    program_id,
                    note,
                    status: InterestStatus::Interested,
                    updated_at: now,
                    ..current
                },
                InterestChange::Revived,
            ),
            None => (
                Self {
                    student_id,
                    university_id,
                    program_id,
                    note,
                    status: InterestStatus::Interested,
                    created_at: now,
                    updated_at: now,
                },
                InterestChange::Created,
            ),
        }
    }
}

/// Student summary shown to university staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterestedStudent {
    pub student_id: UserId,
    pub full_name: FullName,
    pub email: EmailAddress,
    pub country: Option<String>,
    pub current_status: Option<CurrentStatus>,
    pub field_of_interest: Option<String>,
    pub preferred_degree: Option<DegreeLevel>,
    pub program_id: Option<ProgramId>,
    pub note: Option<String>,
    pub interested_since: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn express_creates_revives_and_is_idempotent() {
        let student = UserId::random();
        let university = UniversityId::random();
        let t0 = Utc::now();
        let (created, change) = Interest::express(None, student, university, None, None, t0);
        assert_eq!(change, InterestChange::Created);

        let t1 = t0 + chrono::Duration::minutes(5);
        let (same, change) =
            Interest::express(Some(created.clone()), student, university, None, None, t1);
        assert_eq!(change, InterestChange::Unchanged);
        assert_eq!(same, created);

        let withdrawn = Interest {
            status: InterestStatus::Withdrawn,
            ..created
        };
        let (revived, change) = Interest::express(
            Some(withdrawn),
            student,
            university,
            None,
            Some("Scholarships?".into()),
            t1,
        );
        assert_eq!(change, InterestChange::Revived);
        assert_eq!(revived.status, InterestStatus::Interested);
        assert_eq!(revived.created_at, t0);
        assert_eq!(revived.updated_at, t1);
        assert!(change.notifies_university());
    }
}
