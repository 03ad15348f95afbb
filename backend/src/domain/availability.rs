//! Weekly availability of a university and the open-slot calculation.
//!
//! Availability is expressed in the university's local time as weekly
//! windows. Open slots are computed on demand: each window is walked in steps
//! of `duration + buffer`, candidates inside the notice period or beyond the
//! booking window are dropped, and candidates colliding with a live meeting
//! (widened by the buffer) are skipped.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum::text_enum;
use super::validation::{field_error, in_range};
use super::{Error, TimeWindow, UniversityId};

text_enum! {
    /// Day of the week in the university's local time.
    pub enum Weekday {
        Monday => "monday",
        Tuesday => "tuesday",
        Wednesday => "wednesday",
        Thursday => "thursday",
        Friday => "friday",
        Saturday => "saturday",
        Sunday => "sunday",
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// Minutes in a day; a window may end exactly at midnight.
pub const MINUTES_PER_DAY: i32 = 24 * 60;
/// Largest span a client may request open slots for.
pub const MAX_SLOT_QUERY_DAYS: i64 = 31;
const MAX_WINDOWS: usize = 50;

/// A weekly recurring window, `[start_minute, end_minute)` after local
/// midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub weekday: Weekday,
    pub start_minute: i32,
    pub end_minute: i32,
}

/// Booking rules and weekly windows of one university.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityProfile {
    pub university_id: UniversityId,
    pub meeting_duration_minutes: i32,
    pub buffer_minutes: i32,
    pub min_notice_hours: i32,
    pub booking_window_days: i32,
    pub utc_offset_minutes: i32,
    pub is_active: bool,
    pub slots: Vec<AvailabilitySlot>,
    pub updated_at: DateTime<Utc>,
}

/// Settings submitted by university staff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityDraft {
    pub meeting_duration_minutes: i32,
    pub buffer_minutes: i32,
    pub min_notice_hours: i32,
    pub booking_window_days: i32,
    pub utc_offset_minutes: i32,
    pub is_active: bool,
    pub slots: Vec<AvailabilitySlot>,
}

impl AvailabilityDraft {
    /// Validate limits and windows, producing the stored profile.
    pub fn validate(
        self,
        university_id: UniversityId,
        now: DateTime<Utc>,
    ) -> Result<AvailabilityProfile, Error> {
        let duration = in_range("meetingDurationMinutes", self.meeting_duration_minutes, 15, 240)?;
        let buffer = in_range("bufferMinutes", self.buffer_minutes, 0, 120)?;
        let notice = in_range("minNoticeHours", self.min_notice_hours, 0, 168)?;
        let window = in_range("bookingWindowDays", self.booking_window_days, 1, 90)?;
        let offset = in_range("utcOffsetMinutes", self.utc_offset_minutes, -720, 840)?;
        let slots = validate_slots(self.slots, duration)?;
        Ok(AvailabilityProfile {
            university_id,
            meeting_duration_minutes: duration,
            buffer_minutes: buffer,
            min_notice_hours: notice,
            booking_window_days: window,
            utc_offset_minutes: offset,
            is_active: self.is_active,
            slots,
            updated_at: now,
        })
    }
}

fn validate_slots(
    mut slots: Vec<AvailabilitySlot>,
    duration: i32,
) -> Result<Vec<AvailabilitySlot>, Error> {
    if slots.len() > MAX_WINDOWS {
        return Err(field_error(
            "slots",
            "too_many",
            format!("at most {MAX_WINDOWS} availability windows are allowed"),
        ));
    }
    for slot in &slots {
        if slot.start_minute < 0
            || slot.end_minute > MINUTES_PER_DAY
            || slot.start_minute >= slot.end_minute
        {
            return Err(field_error(
                "slots",
                "invalid_window",
                "each window must start before it ends and stay within one day",
            ));
        }
        if slot.end_minute - slot.start_minute < duration {
            return Err(field_error(
                "slots",
                "window_too_short",
                "each window must fit at least one meeting",
            ));
        }
    }
    slots.sort_by_key(|slot| (weekday_index(slot.weekday), slot.start_minute));
    for pair in slots.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if a.weekday == b.weekday && b.start_minute < a.end_minute {
            return Err(field_error(
                "slots",
                "overlapping_windows",
                format!("windows on {} overlap", a.weekday),
            ));
        }
    }
    Ok(slots)
}

fn weekday_index(day: Weekday) -> usize {
    Weekday::ALL.iter().position(|d| *d == day).unwrap_or(0)
}

impl AvailabilityProfile {
    fn offset(&self) -> Result<FixedOffset, Error> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .ok_or_else(|| Error::internal("stored UTC offset is out of range"))
    }

    /// Local calendar date of `instant` in the university's offset.
    pub fn local_date(&self, instant: DateTime<Utc>) -> Result<NaiveDate, Error> {
        Ok(instant.with_timezone(&self.offset()?).date_naive())
    }

    /// Bookable meeting windows for local dates `from..=to`, in UTC, sorted by
    /// start.
    ///
    /// `booked` holds the university's live meetings; candidates overlapping
    /// any of them widened by the buffer are excluded.
    pub fn open_slots(
        &self,
        booked: &[TimeWindow],
        now: DateTime<Utc>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeWindow>, Error> {
        if !self.is_active || self.slots.is_empty() || from > to {
            return Ok(Vec::new());
        }
        let offset = self.offset()?;
        let duration = Duration::minutes(i64::from(self.meeting_duration_minutes));
        let buffer = Duration::minutes(i64::from(self.buffer_minutes));
        let step = self.meeting_duration_minutes + self.buffer_minutes;
        let earliest = now + Duration::hours(i64::from(self.min_notice_hours));
        let latest = now + Duration::days(i64::from(self.booking_window_days));
        let blocked: Vec<TimeWindow> = booked.iter().map(|m| m.widened(buffer)).collect();

        let mut open = Vec::new();
        for date in from.iter_days().take_while(|d| *d <= to) {
            let weekday = Weekday::from(date.weekday());
            for slot in self.slots.iter().filter(|s| s.weekday == weekday) {
                let mut minute = slot.start_minute;
                while minute + self.meeting_duration_minutes <= slot.end_minute {
                    let starts_at = local_instant(&offset, date, minute)?;
                    minute += step;
                    if starts_at < earliest || starts_at > latest {
                        continue;
                    }
                    let candidate = TimeWindow::new(starts_at, starts_at + duration)?;
                    if blocked.iter().any(|b| b.overlaps(&candidate)) {
                        continue;
                    }
                    open.push(candidate);
                }
            }
        }
        open.sort_by_key(|w| w.starts_at);
        open.dedup();
        Ok(open)
    }

    /// The open slot starting exactly at `starts_at`, if any.
    pub fn find_open_slot(
        &self,
        booked: &[TimeWindow],
        now: DateTime<Utc>,
        starts_at: DateTime<Utc>,
    ) -> Result<Option<TimeWindow>, Error> {
        let date = self.local_date(starts_at)?;
        Ok(self
            .open_slots(booked, now, date, date)?
            .into_iter()
            .find(|w| w.starts_at == starts_at))
    }
}

fn local_instant(
    offset: &FixedOffset,
    date: NaiveDate,
    minute: i32,
) -> Result<DateTime<Utc>, Error> {
    let naive = date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute));
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| Error::internal("local time is not representable"))
}
