//! Student profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum::text_enum;
use super::validation::{field_error, optional_text, required_text};
use super::{Error, UserId};

text_enum! {
    /// What the student is doing today.
    pub enum CurrentStatus {
        HighSchool => "high_school",
        Undergraduate => "undergraduate",
        Graduate => "graduate",
        Working => "working",
    }
}

text_enum! {
    /// Degree levels offered by programs and sought by students.
    pub enum DegreeLevel {
        Foundation => "foundation",
        Diploma => "diploma",
        Bachelors => "bachelors",
        Masters => "masters",
        Phd => "phd",
    }
}

/// Profile details a student fills in after registering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub user_id: UserId,
    pub country: String,
    pub city: Option<String>,
    pub current_status: CurrentStatus,
    pub field_of_interest: String,
    pub preferred_degree: DegreeLevel,
    pub budget_range: Option<String>,
    pub phone: Option<String>,
    pub cv_key: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Editable part of a student profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentProfileDraft {
    pub country: String,
    pub city: Option<String>,
    pub current_status: CurrentStatus,
    pub field_of_interest: String,
    pub preferred_degree: DegreeLevel,
    pub budget_range: Option<String>,
    pub phone: Option<String>,
}

const SHORT_TEXT_MAX: usize = 120;
const PHONE_MAX: usize = 32;

impl StudentProfileDraft {
    /// Trim free text and enforce field lengths.
    pub fn validate(self) -> Result<Self, Error> {
        Ok(Self {
            country: required_text("country", &self.country, SHORT_TEXT_MAX)?,
            city: optional_text("city", self.city.as_deref(), SHORT_TEXT_MAX)?,
            current_status: self.current_status,
            field_of_interest: required_text(
                "fieldOfInterest",
                &self.field_of_interest,
                SHORT_TEXT_MAX,
            )?,
            preferred_degree: self.preferred_degree,
            budget_range: optional_text("budgetRange", self.budget_range.as_deref(), SHORT_TEXT_MAX)?,
            phone: optional_phone(self.phone.as_deref())?,
        })
    }

    /// Apply the draft onto an existing profile, keeping the uploaded CV.
    #[must_use]
    pub fn into_profile(
        self,
        user_id: UserId,
        existing: Option<&StudentProfile>,
        now: DateTime<Utc>,
    ) -> StudentProfile {
        StudentProfile {
            user_id,
            country: self.country,
            city: self.city,
            current_status: self.current_status,
            field_of_interest: self.field_of_interest,
            preferred_degree: self.preferred_degree,
            budget_range: self.budget_range,
            phone: self.phone,
            cv_key: existing.and_then(|profile| profile.cv_key.clone()),
            updated_at: now,
        }
    }
}

fn optional_phone(raw: Option<&str>) -> Result<Option<String>, Error> {
    let Some(phone) = optional_text("phone", raw, PHONE_MAX)? else {
        return Ok(None);
    };
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    if !allowed || !phone.chars().any(|c| c.is_ascii_digit()) {
        return Err(field_error(
            "phone",
            "invalid_phone",
            "phone may only contain digits, spaces and + - ( )",
        ));
    }
    Ok(Some(phone))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> StudentProfileDraft {
        StudentProfileDraft {
            country: "  Kenya ".into(),
            city: Some("".into()),
            current_status: CurrentStatus::HighSchool,
            field_of_interest: "Computer Science".into(),
            preferred_degree: DegreeLevel::Bachelors,
            budget_range: None,
            phone: Some("+254 700 000000".into()),
        }
    }

    #[rstest]
    fn validate_trims_and_drops_blank_optionals(draft: StudentProfileDraft) {
        let valid = draft.validate().expect("valid draft");
        assert_eq!(valid.country, "Kenya");
        assert_eq!(valid.city, None);
        assert_eq!(valid.phone.as_deref(), Some("+254 700 000000"));
    }

    #[rstest]
    #[case("", "fieldOfInterest")]
    fn missing_field_is_reported(
        mut draft: StudentProfileDraft,
        #[case] field_of_interest: &str,
        #[case] field: &str,
    ) {
        draft.field_of_interest = field_of_interest.into();
        let err = draft.validate().expect_err("blank field");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], field);
    }

    #[rstest]
    #[case("call me")]
    #[case("+-()")]
    fn rejects_bad_phone(mut draft: StudentProfileDraft, #[case] phone: &str) {
        draft.phone = Some(phone.into());
        let err = draft.validate().expect_err("bad phone");
        assert_eq!(err.details().expect("details")["code"], "invalid_phone");
    }

    #[rstest]
    fn into_profile_keeps_existing_cv(draft: StudentProfileDraft) {
        let user_id = UserId::random();
        let now = Utc::now();
        let existing = draft
            .clone()
            .validate()
            .expect("valid")
            .into_profile(user_id, None, now);
        let existing = StudentProfile {
            cv_key: Some("cv/key.pdf".into()),
            ..existing
        };
        let updated = draft
            .validate()
            .expect("valid")
            .into_profile(user_id, Some(&existing), now);
        assert_eq!(updated.cv_key.as_deref(), Some("cv/key.pdf"));
    }
}
