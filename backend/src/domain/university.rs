//! University profiles and their verification lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::text_enum::text_enum;
use super::validation::{field_error, optional_text, required_text, text_between};
use super::{DegreeLevel, Error, Program, UniversityId, UserId};

text_enum! {
    /// Admin review state of a university.
    pub enum VerificationStatus {
        Pending => "PENDING",
        Verified => "VERIFIED",
        Rejected => "REJECTED",
    }
}

impl VerificationStatus {
    /// Whether an admin may move a university from `self` to `next`.
    ///
    /// Rejected universities can be re-reviewed and verified; a verified
    /// university stays verified.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Verified)
                | (Self::Pending, Self::Rejected)
                | (Self::Rejected, Self::Verified)
        )
    }
}

/// Public and administrative view of an institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniversityProfile {
    pub id: UniversityId,
    pub owner_user_id: UserId,
    pub institution_name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub logo_key: Option<String>,
    pub brochure_key: Option<String>,
    pub verification_status: VerificationStatus,
    pub rejection_reason: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub(crate) const INSTITUTION_NAME_MAX: usize = 150;
const LOCATION_MAX: usize = 120;
const DESCRIPTION_MAX: usize = 5000;
const REJECTION_REASON_MAX: usize = 1000;

impl UniversityProfile {
    /// Profile created alongside a university registration.
    pub fn pending(
        owner_user_id: UserId,
        institution_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        Ok(Self {
            id: UniversityId::random(),
            owner_user_id,
            institution_name: text_between("institutionName", institution_name, 2, INSTITUTION_NAME_MAX)?,
            country: None,
            city: None,
            website: None,
            description: None,
            logo_key: None,
            brochure_key: None,
            verification_status: VerificationStatus::Pending,
            rejection_reason: None,
            verified_at: None,
            created_at: now,
        })
    }

    /// Verified institutions are visible to students and may use
    /// programs, availability and outreach.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verification_status == VerificationStatus::Verified
    }

    /// Fail with `forbidden` unless the institution is verified.
    pub fn ensure_verified(&self) -> Result<(), Error> {
        if self.is_verified() {
            Ok(())
        } else {
            Err(Error::forbidden("university is not verified yet"))
        }
    }

    /// Mark the university as verified.
    pub fn verify(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        self.transition(VerificationStatus::Verified)?;
        self.rejection_reason = None;
        self.verified_at = Some(now);
        Ok(())
    }

    /// Mark the university as rejected with a reason shown to the owner.
    pub fn reject(&mut self, reason: &str) -> Result<(), Error> {
        let reason = required_text("reason", reason, REJECTION_REASON_MAX)?;
        self.transition(VerificationStatus::Rejected)?;
        self.rejection_reason = Some(reason);
        self.verified_at = None;
        Ok(())
    }

    fn transition(&mut self, next: VerificationStatus) -> Result<(), Error> {
        if !self.verification_status.can_transition_to(next) {
            return Err(Error::invalid_request(format!(
                "cannot change verification status from {} to {next}",
                self.verification_status
            )));
        }
        self.verification_status = next;
        Ok(())
    }
}

/// Fields the owner may edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversityProfileDraft {
    pub institution_name: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
}

impl UniversityProfileDraft {
    /// Validate the draft and apply it to `profile`.
    pub fn apply_to(self, profile: &mut UniversityProfile) -> Result<(), Error> {
        profile.institution_name =
            text_between("institutionName", &self.institution_name, 2, INSTITUTION_NAME_MAX)?;
        profile.country = optional_text("country", self.country.as_deref(), LOCATION_MAX)?;
        profile.city = optional_text("city", self.city.as_deref(), LOCATION_MAX)?;
        profile.website = validate_website(self.website.as_deref())?;
        profile.description =
            optional_text("description", self.description.as_deref(), DESCRIPTION_MAX)?;
        Ok(())
    }
}

fn validate_website(raw: Option<&str>) -> Result<Option<String>, Error> {
    let Some(raw) = optional_text("website", raw, 2048)? else {
        return Ok(None);
    };
    let parsed = Url::parse(&raw)
        .map_err(|_| field_error("website", "invalid_url", "website must be a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(field_error(
            "website",
            "invalid_url",
            "website must be an http or https URL",
        ));
    }
    Ok(Some(parsed.to_string()))
}

/// Student-facing browse filters; every filter is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniversityFilter {
    pub country: Option<String>,
    pub field: Option<String>,
    pub degree_level: Option<DegreeLevel>,
    pub query: Option<String>,
}

impl UniversityFilter {
    /// Drop blank text filters so adapters only see meaningful values.
    #[must_use]
    pub fn normalised(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        }
        Self {
            country: clean(self.country),
            field: clean(self.field),
            degree_level: self.degree_level,
            query: clean(self.query),
        }
    }
}

/// University page shown to students: the profile plus active programs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniversityDetail {
    pub university: UniversityProfile,
    pub programs: Vec<Program>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn profile() -> UniversityProfile {
        UniversityProfile::pending(UserId::random(), " Strathmore University ", Utc::now())
            .expect("valid profile")
    }

    #[rstest]
    #[case(VerificationStatus::Pending, VerificationStatus::Verified, true)]
    #[case(VerificationStatus::Pending, VerificationStatus::Rejected, true)]
    #[case(VerificationStatus::Rejected, VerificationStatus::Verified, true)]
    #[case(VerificationStatus::Verified, VerificationStatus::Rejected, false)]
    #[case(VerificationStatus::Verified, VerificationStatus::Pending, false)]
    #[case(VerificationStatus::Rejected, VerificationStatus::Rejected, false)]
    fn verification_transitions(
        #[case] from: VerificationStatus,
        #[case] to: VerificationStatus,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_transition_to(to), allowed);
    }

    #[rstest]
    fn pending_profile_trims_name(profile: UniversityProfile) {
        assert_eq!(profile.institution_name, "Strathmore University");
        assert_eq!(profile.verification_status, VerificationStatus::Pending);
        assert!(profile.ensure_verified().is_err());
    }

    #[rstest]
    fn reject_then_verify_clears_reason(mut profile: UniversityProfile) {
        profile.reject("missing accreditation").expect("reject");
        assert_eq!(profile.rejection_reason.as_deref(), Some("missing accreditation"));
        let now = Utc::now();
        profile.verify(now).expect("re-review");
        assert!(profile.is_verified());
        assert_eq!(profile.rejection_reason, None);
        assert_eq!(profile.verified_at, Some(now));
    }

    #[rstest]
    fn verified_cannot_be_rejected(mut profile: UniversityProfile) {
        profile.verify(Utc::now()).expect("verify");
        let err = profile.reject("late change").expect_err("invalid transition");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn reject_requires_reason(mut profile: UniversityProfile) {
        let err = profile.reject("  ").expect_err("blank reason");
        assert_eq!(err.details().expect("details")["field"], "reason");
        assert_eq!(profile.verification_status, VerificationStatus::Pending);
    }

    #[rstest]
    #[case(Some("ftp://files.example.org"), false)]
    #[case(Some("not a url"), false)]
    #[case(Some("https://www.strathmore.edu"), true)]
    #[case(Some("   "), true)]
    #[case(None, true)]
    fn website_validation(
        mut profile: UniversityProfile,
        #[case] website: Option<&str>,
        #[case] ok: bool,
    ) {
        let draft = UniversityProfileDraft {
            institution_name: "Strathmore University".into(),
            country: Some("Kenya".into()),
            city: None,
            website: website.map(str::to_owned),
            description: None,
        };
        assert_eq!(draft.apply_to(&mut profile).is_ok(), ok);
    }

    #[rstest]
    fn filter_drops_blank_values() {
        let filter = UniversityFilter {
            country: Some("  ".into()),
            field: Some(" Engineering ".into()),
            degree_level: None,
            query: None,
        }
        .normalised();
        assert_eq!(filter.country, None);
        assert_eq!(filter.field.as_deref(), Some("Engineering"));
    }
}
