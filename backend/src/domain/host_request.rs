//! Campus fair host requests and the outreach sent to universities.
//!
//! An organisation (typically a school) asks to host a fair. Once an admin
//! approves the request, verified universities are invited; each invitation
//! is answered once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum::text_enum;
use super::validation::{in_range, optional_text, required_text, text_between};
use super::{
    EmailAddress, Error, FullName, HostRequestId, OutreachId, UniversityId, UserId,
};

text_enum! {
    /// Admin handling state of a host request.
    pub enum HostRequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Completed => "completed",
    }
}

impl HostRequestStatus {
    /// Allowed admin transitions.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Approved, Self::Completed)
        )
    }
}

text_enum! {
    /// Answer state of an outreach invitation.
    pub enum OutreachStatus {
        Sent => "sent",
        Accepted => "accepted",
        Declined => "declined",
    }
}

/// A request to host a campus fair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HostRequest {
    pub id: HostRequestId,
    pub organization_name: String,
    pub contact_name: FullName,
    pub contact_email: EmailAddress,
    pub city: String,
    pub country: String,
    pub expected_students: i32,
    pub preferred_dates: Option<String>,
    pub message: Option<String>,
    pub status: HostRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRequestDraft {
    pub organization_name: String,
    pub contact_name: FullName,
    pub contact_email: EmailAddress,
    pub city: String,
    pub country: String,
    pub expected_students: i32,
    pub preferred_dates: Option<String>,
    pub message: Option<String>,
}

impl HostRequest {
    /// Validate and record a new pending request.
    pub fn submit(draft: HostRequestDraft, now: DateTime<Utc>) -> Result<Self, Error> {
        Ok(Self {
            id: HostRequestId::random(),
            organization_name: text_between("organizationName", &draft.organization_name, 2, 150)?,
            contact_name: draft.contact_name,
            contact_email: draft.contact_email,
            city: required_text("city", &draft.city, 120)?,
            country: required_text("country", &draft.country, 120)?,
            expected_students: in_range("expectedStudents", draft.expected_students, 1, 100_000)?,
            preferred_dates: optional_text("preferredDates", draft.preferred_dates.as_deref(), 500)?,
            message: optional_text("message", draft.message.as_deref(), 5000)?,
            status: HostRequestStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Admin status change.
    pub fn transition(&mut self, next: HostRequestStatus, now: DateTime<Utc>) -> Result<(), Error> {
        if !self.status.can_transition_to(next) {
            return Err(Error::invalid_request(format!(
                "cannot move a {} host request to {next}",
                self.status
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

/// An invitation for one university to join a campus fair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HostRequestOutreach {
    pub id: OutreachId,
    pub host_request_id: HostRequestId,
    pub university_id: UniversityId,
    pub status: OutreachStatus,
    pub message: Option<String>,
    pub response_note: Option<String>,
    pub sent_by: UserId,
    pub sent_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl HostRequestOutreach {
    /// New invitation in `sent`.
    #[must_use]
    pub fn send(
        host_request_id: HostRequestId,
        university_id: UniversityId,
        message: Option<String>,
        sent_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OutreachId::random(),
            host_request_id,
            university_id,
            status: OutreachStatus::Sent,
            message,
            response_note: None,
            sent_by,
            sent_at: now,
            responded_at: None,
        }
    }

    /// Record the university's answer; only possible once.
    pub fn respond(&mut self, accept: bool, note: Option<&str>, now: DateTime<Utc>) -> Result<(), Error> {
        if self.status != OutreachStatus::Sent {
            return Err(Error::conflict("this invitation has already been answered"));
        }
        self.response_note = optional_text("note", note, 2000)?;
        self.status = if accept {
            OutreachStatus::Accepted
        } else {
            OutreachStatus::Declined
        };
        self.responded_at = Some(now);
        Ok(())
    }
}

/// Outreach joined with its host request, as shown to a university.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutreachInvitation {
    pub outreach: HostRequestOutreach,
    pub host_request: HostRequest,
}
