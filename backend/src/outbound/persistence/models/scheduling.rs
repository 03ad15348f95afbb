//! Rows for availability profiles and meetings.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::RepositoryError;
use crate::domain::{
    AvailabilityProfile, AvailabilitySlot, Meeting, MeetingId, ProgramId, TimeWindow,
    UniversityId, UserId, Weekday,
};

use super::super::diesel_error_mapping::{decode, validated};
use super::super::schema::{availability_profiles, availability_slots, meetings};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = availability_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AvailabilityProfileRow {
    pub university_id: Uuid,
    pub meeting_duration_minutes: i32,
    pub buffer_minutes: i32,
    pub min_notice_hours: i32,
    pub booking_window_days: i32,
    pub utc_offset_minutes: i32,
    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = availability_slots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AvailabilitySlotRow {
    pub university_id: Uuid,
    pub weekday: String,
    pub start_minute: i32,
    pub end_minute: i32,
}

impl AvailabilityProfileRow {
    /// Split a profile into its header row and slot rows.
    pub fn split(profile: &AvailabilityProfile) -> (Self, Vec<AvailabilitySlotRow>) {
        let university_id = *profile.university_id.as_uuid();
        let slots = profile
            .slots
            .iter()
            .map(|slot| AvailabilitySlotRow {
                university_id,
                weekday: slot.weekday.as_str().to_owned(),
                start_minute: slot.start_minute,
                end_minute: slot.end_minute,
            })
            .collect();
        let header = Self {
            university_id,
            meeting_duration_minutes: profile.meeting_duration_minutes,
            buffer_minutes: profile.buffer_minutes,
            min_notice_hours: profile.min_notice_hours,
            booking_window_days: profile.booking_window_days,
            utc_offset_minutes: profile.utc_offset_minutes,
            is_active: profile.is_active,
            updated_at: profile.updated_at,
        };
        (header, slots)
    }

    /// Reassemble a profile; slots come back ordered by weekday and start.
    pub fn join(
        self,
        slot_rows: Vec<AvailabilitySlotRow>,
    ) -> Result<AvailabilityProfile, RepositoryError> {
        let mut slots = slot_rows
            .into_iter()
            .map(|row| {
                Ok(AvailabilitySlot {
                    weekday: decode("availability_slots.weekday", &row.weekday)?,
                    start_minute: row.start_minute,
                    end_minute: row.end_minute,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        slots.sort_by_key(|slot| {
            let day = Weekday::ALL.iter().position(|d| *d == slot.weekday);
            (day, slot.start_minute)
        });
        Ok(AvailabilityProfile {
            university_id: UniversityId::from_uuid(self.university_id),
            meeting_duration_minutes: self.meeting_duration_minutes,
            buffer_minutes: self.buffer_minutes,
            min_notice_hours: self.min_notice_hours,
            booking_window_days: self.booking_window_days,
            utc_offset_minutes: self.utc_offset_minutes,
            is_active: self.is_active,
            slots,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = meetings)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MeetingRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub university_id: Uuid,
    pub rep_id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: String,
    pub purpose: String,
    pub student_note: Option<String>,
    pub meeting_link: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Meeting> for MeetingRow {
    fn from(meeting: &Meeting) -> Self {
        Self {
            id: *meeting.id.as_uuid(),
            student_id: *meeting.student_id.as_uuid(),
            university_id: *meeting.university_id.as_uuid(),
            rep_id: meeting.rep_id.map(|id| *id.as_uuid()),
            program_id: meeting.program_id.map(|id| *id.as_uuid()),
            starts_at: meeting.window.starts_at,
            ends_at: meeting.window.ends_at,
            status: meeting.status.as_str().to_owned(),
            purpose: meeting.purpose.as_str().to_owned(),
            student_note: meeting.student_note.clone(),
            meeting_link: meeting.meeting_link.clone(),
            cancellation_reason: meeting.cancellation_reason.clone(),
            cancelled_by: meeting.cancelled_by.map(|id| *id.as_uuid()),
            created_at: meeting.created_at,
            updated_at: meeting.updated_at,
        }
    }
}

impl TryFrom<MeetingRow> for Meeting {
    type Error = RepositoryError;

    fn try_from(row: MeetingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MeetingId::from_uuid(row.id),
            student_id: UserId::from_uuid(row.student_id),
            university_id: UniversityId::from_uuid(row.university_id),
            rep_id: row.rep_id.map(UserId::from_uuid),
            program_id: row.program_id.map(ProgramId::from_uuid),
            window: validated("meetings window", TimeWindow::new(row.starts_at, row.ends_at))?,
            status: decode("meetings.status", &row.status)?,
            purpose: decode("meetings.purpose", &row.purpose)?,
            student_note: row.student_note,
            meeting_link: row.meeting_link,
            cancellation_reason: row.cancellation_reason,
            cancelled_by: row.cancelled_by.map(UserId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
