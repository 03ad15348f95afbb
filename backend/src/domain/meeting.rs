//! Meetings between students and universities.
//!
//! A booking request is a meeting in `PENDING`. Staff confirm it, either side
//! may cancel it, and staff mark it completed once it has ended.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum::text_enum;
use super::validation::{optional_text, required_text};
use super::{Error, MeetingId, ProgramId, UniversityId, UserId};

text_enum! {
    /// Meeting lifecycle state.
    pub enum MeetingStatus {
        Pending => "PENDING",
        Confirmed => "CONFIRMED",
        Cancelled => "CANCELLED",
        Completed => "COMPLETED",
    }
}

impl MeetingStatus {
    /// Pending and confirmed meetings hold their time slot.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Allowed lifecycle moves.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
        )
    }
}

text_enum! {
    /// Why the student asked for the meeting.
    pub enum MeetingPurpose {
        Admissions => "admissions",
        Scholarships => "scholarships",
        ProgramInfo => "program_info",
        Visa => "visa",
        Other => "other",
    }
}

/// Half-open UTC interval `[starts_at, ends_at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, rejecting empty or inverted intervals.
    pub fn new(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> Result<Self, Error> {
        if starts_at >= ends_at {
            return Err(Error::invalid_request("meeting must end after it starts"));
        }
        Ok(Self { starts_at, ends_at })
    }

    /// Whether the two windows share any instant. Touching windows do not
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.starts_at < other.ends_at && other.starts_at < self.ends_at
    }

    /// The window extended by `margin` on both sides.
    #[must_use]
    pub fn widened(&self, margin: Duration) -> Self {
        Self {
            starts_at: self.starts_at - margin,
            ends_at: self.ends_at + margin,
        }
    }
}

/// A meeting between a student and a university.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: MeetingId,
    pub student_id: UserId,
    pub university_id: UniversityId,
    /// Staff member who confirmed the meeting.
    pub rep_id: Option<UserId>,
    pub program_id: Option<ProgramId>,
    #[serde(flatten)]
    pub window: TimeWindow,
    pub status: MeetingStatus,
    pub purpose: MeetingPurpose,
    pub student_note: Option<String>,
    pub meeting_link: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Booking details supplied by the student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub university_id: UniversityId,
    pub starts_at: DateTime<Utc>,
    pub purpose: MeetingPurpose,
    pub program_id: Option<ProgramId>,
    pub note: Option<String>,
}

const NOTE_MAX: usize = 1000;
const LINK_MAX: usize = 500;
const REASON_MAX: usize = 500;

impl Meeting {
    /// New pending meeting for a validated open slot.
    pub fn request(
        student_id: UserId,
        request: BookingRequest,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        Ok(Self {
            id: MeetingId::random(),
            student_id,
            university_id: request.university_id,
            rep_id: None,
            program_id: request.program_id,
            window,
            status: MeetingStatus::Pending,
            purpose: request.purpose,
            student_note: optional_text("note", request.note.as_deref(), NOTE_MAX)?,
            meeting_link: None,
            cancellation_reason: None,
            cancelled_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Staff accept the request.
    pub fn confirm(
        &mut self,
        rep_id: UserId,
        meeting_link: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let link = optional_text("meetingLink", meeting_link, LINK_MAX)?;
        self.transition(MeetingStatus::Confirmed, now)?;
        self.rep_id = Some(rep_id);
        self.meeting_link = link;
        Ok(())
    }

    /// Either party cancels.
    pub fn cancel(&mut self, by: UserId, reason: &str, now: DateTime<Utc>) -> Result<(), Error> {
        let reason = required_text("reason", reason, REASON_MAX)?;
        self.transition(MeetingStatus::Cancelled, now)?;
        self.cancellation_reason = Some(reason);
        self.cancelled_by = Some(by);
        Ok(())
    }

    /// Staff record that the meeting took place.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), Error> {
        if now < self.window.ends_at {
            return Err(Error::invalid_request(
                "a meeting can only be completed after it has ended",
            ));
        }
        self.transition(MeetingStatus::Completed, now)
    }

    fn transition(&mut self, next: MeetingStatus, now: DateTime<Utc>) -> Result<(), Error> {
        if !self.status.can_transition_to(next) {
            return Err(Error::invalid_request(format!(
                "cannot move a {} meeting to {next}",
                self.status
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}
