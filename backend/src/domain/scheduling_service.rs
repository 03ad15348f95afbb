//! Availability management and the meeting lifecycle.
//!
//! Booking re-derives the open slots for the requested day, so only a start
//! time the calculator would offer is accepted. The repository insert is the
//! authority on double bookings: it re-checks overlap atomically and reports
//! a conflict when another request won the race.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::email_templates;
use crate::domain::ports::{
    AuditRepository, AvailabilityRepository, MeetingRepository, ProgramRepository,
    RepositoryError, UniversityRepository, UserRepository,
};
use crate::domain::{
    AuditAction, AuditEntry, AuthenticatedUser, AvailabilityDraft, AvailabilityProfile,
    BookingRequest, Error, MAX_SLOT_QUERY_DAYS, Meeting, MeetingId, MeetingStatus,
    NotificationContent, NotificationKind, Notifier, ProgramStatus, Role, TimeWindow,
    UniversityId, UniversityProfile, UniversityStaff, UserId,
};

const SLOT_TAKEN: &str = "this slot has already been booked";

/// Start of `date` at UTC midnight, widened by a day so every local offset
/// is covered.
fn search_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc() - Duration::days(1)
}

fn search_end(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc() + Duration::days(2)
}

/// Scheduling service for availability and meetings.
#[derive(Clone)]
pub struct SchedulingService {
    users: Arc<dyn UserRepository>,
    universities: Arc<dyn UniversityRepository>,
    programs: Arc<dyn ProgramRepository>,
    availability: Arc<dyn AvailabilityRepository>,
    meetings: Arc<dyn MeetingRepository>,
    audit: Arc<dyn AuditRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl SchedulingService {
    /// Wire the service onto its ports.
    #[expect(
        clippy::too_many_arguments,
        reason = "flat constructor taking one port per field"
    )]
    pub fn new(
        users: Arc<dyn UserRepository>,
        universities: Arc<dyn UniversityRepository>,
        programs: Arc<dyn ProgramRepository>,
        availability: Arc<dyn AvailabilityRepository>,
        meetings: Arc<dyn MeetingRepository>,
        audit: Arc<dyn AuditRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            universities,
            programs,
            availability,
            meetings,
            audit,
            notifier,
            clock,
        }
    }

    /// The caller's availability profile, if configured.
    pub async fn get_availability(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<Option<AvailabilityProfile>, Error> {
        let staff = UniversityStaff::resolve(self.universities.as_ref(), user).await?;
        Ok(self.availability.find(&staff.university.id).await?)
    }

    /// Replace the caller's availability profile and weekly windows.
    pub async fn set_availability(
        &self,
        user: &AuthenticatedUser,
        draft: AvailabilityDraft,
    ) -> Result<AvailabilityProfile, Error> {
        let staff = UniversityStaff::resolve_verified(self.universities.as_ref(), user).await?;
        let profile = draft.validate(staff.university.id, self.clock.utc())?;
        self.availability.save(&profile).await?;
        Ok(profile)
    }

    async fn verified_university(&self, id: &UniversityId) -> Result<UniversityProfile, Error> {
        match self.universities.find(id).await? {
            Some(university) if university.is_verified() => Ok(university),
            _ => Err(Error::not_found("university not found")),
        }
    }

    /// Bookable windows between two local dates, inclusive.
    pub async fn open_slots(
        &self,
        university_id: &UniversityId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TimeWindow>, Error> {
        if to < from {
            return Err(Error::invalid_request("from must not be after to"));
        }
        if (to - from).num_days() >= MAX_SLOT_QUERY_DAYS {
            return Err(Error::invalid_request(format!(
                "slot queries may span at most {MAX_SLOT_QUERY_DAYS} days"
            )));
        }
        self.verified_university(university_id).await?;
        let Some(profile) = self.availability.find(university_id).await? else {
            return Ok(Vec::new());
        };
        let booked = self
            .meetings
            .live_windows(university_id, search_start(from), search_end(to))
            .await?;
        profile.open_slots(&booked, self.clock.utc(), from, to)
    }

    /// Book an open slot as a pending meeting.
    pub async fn book(&self, student_id: UserId, request: BookingRequest) -> Result<Meeting, Error> {
        let now = self.clock.utc();
        let university = self.verified_university(&request.university_id).await?;
        if let Some(program_id) = request.program_id {
            match self.programs.find(&program_id).await? {
                Some(program)
                    if program.university_id == university.id
                        && program.status == ProgramStatus::Active => {}
                _ => {
                    return Err(Error::invalid_request(
                        "program does not belong to this university",
                    ));
                }
            }
        }
        let profile = match self.availability.find(&university.id).await? {
            Some(profile) if profile.is_active => profile,
            _ => return Err(Error::invalid_request("university is not accepting bookings")),
        };
        let day = profile.local_date(request.starts_at)?;
        let booked = self
            .meetings
            .live_windows(&university.id, search_start(day), search_end(day))
            .await?;
        let Some(window) = profile.find_open_slot(&booked, now, request.starts_at)? else {
            return Err(
                if profile.find_open_slot(&[], now, request.starts_at)?.is_some() {
                    Error::conflict(SLOT_TAKEN)
                } else {
                    Error::invalid_request("requested time is not an available slot")
                },
            );
        };

        let meeting = Meeting::request(student_id, request, window, now)?;
        self.meetings
            .insert_if_free(&meeting)
            .await
            .map_err(|error| match error {
                RepositoryError::Conflict { .. } => Error::conflict(SLOT_TAKEN),
                other => other.into(),
            })?;
        info!(meeting_id = %meeting.id, university_id = %university.id, "meeting requested");
        self.record(student_id, AuditAction::MeetingBooked, &meeting)
            .await?;

        let student = self.users.find_by_id(&student_id).await?;
        let owner = self.users.find_by_id(&university.owner_user_id).await?;
        self.notifier
            .notify(
                university.owner_user_id,
                NotificationContent::new(
                    NotificationKind::MeetingRequested,
                    "New meeting request",
                    "A student requested a meeting with your institution.",
                )
                .with_link("/university/meetings"),
            )
            .await?;
        if let (Some(student), Some(owner)) = (student, owner) {
            self.notifier
                .email(email_templates::meeting_requested(
                    &owner.email,
                    &student.full_name,
                    &meeting,
                ))
                .await;
        }
        Ok(meeting)
    }

    async fn staff_meeting(
        &self,
        user: &AuthenticatedUser,
        id: &MeetingId,
    ) -> Result<(UniversityStaff, Meeting), Error> {
        let staff = UniversityStaff::resolve(self.universities.as_ref(), user).await?;
        match self.meetings.find(id).await? {
            Some(meeting) if meeting.university_id == staff.university.id => Ok((staff, meeting)),
            _ => Err(Error::not_found("meeting not found")),
        }
    }

    async fn record(
        &self,
        actor: UserId,
        action: AuditAction,
        meeting: &Meeting,
    ) -> Result<(), Error> {
        let entry = AuditEntry::new(
            Some(actor),
            action,
            "meeting",
            Some(meeting.id.to_string()),
            self.clock.utc(),
        )
        .with_details(json!({ "status": meeting.status }));
        self.audit.record(&entry).await?;
        Ok(())
    }

    /// Staff accept a pending meeting.
    pub async fn confirm(
        &self,
        user: &AuthenticatedUser,
        id: &MeetingId,
        meeting_link: Option<&str>,
    ) -> Result<Meeting, Error> {
        let (staff, mut meeting) = self.staff_meeting(user, id).await?;
        meeting.confirm(staff.user_id, meeting_link, self.clock.utc())?;
        self.meetings.update(&meeting).await?;
        self.record(staff.user_id, AuditAction::MeetingConfirmed, &meeting)
            .await?;
        self.notifier
            .notify(
                meeting.student_id,
                NotificationContent::new(
                    NotificationKind::MeetingConfirmed,
                    "Meeting confirmed",
                    format!(
                        "{} confirmed your meeting.",
                        staff.university.institution_name
                    ),
                )
                .with_link("/student/meetings"),
            )
            .await?;
        if let Some(student) = self.users.find_by_id(&meeting.student_id).await? {
            self.notifier
                .email(email_templates::meeting_confirmed(
                    &student.email,
                    &staff.university.institution_name,
                    &meeting,
                ))
                .await;
        }
        Ok(meeting)
    }

    /// Cancel a live meeting. Students cancel their own meetings, staff
    /// those of their institution; the other side is told.
    pub async fn cancel(
        &self,
        user: &AuthenticatedUser,
        id: &MeetingId,
        reason: &str,
    ) -> Result<Meeting, Error> {
        let (mut meeting, counterpart) = match user.role {
            Role::Student => {
                let meeting = match self.meetings.find(id).await? {
                    Some(meeting) if meeting.student_id == user.user_id => meeting,
                    _ => return Err(Error::not_found("meeting not found")),
                };
                let owner = self
                    .universities
                    .find(&meeting.university_id)
                    .await?
                    .map(|university| university.owner_user_id);
                (meeting, owner)
            }
            Role::University | Role::UniversityRep => {
                let (_, meeting) = self.staff_meeting(user, id).await?;
                let student = meeting.student_id;
                (meeting, Some(student))
            }
            Role::Admin => return Err(Error::forbidden("admins cannot cancel meetings")),
        };
        meeting.cancel(user.user_id, reason, self.clock.utc())?;
        self.meetings.update(&meeting).await?;
        self.record(user.user_id, AuditAction::MeetingCancelled, &meeting)
            .await?;
        if let Some(counterpart) = counterpart {
            self.notify_cancellation(counterpart, &meeting).await?;
        }
        Ok(meeting)
    }

    pub(crate) async fn notify_cancellation(
        &self,
        recipient: UserId,
        meeting: &Meeting,
    ) -> Result<(), Error> {
        self.notifier
            .notify(
                recipient,
                NotificationContent::new(
                    NotificationKind::MeetingCancelled,
                    "Meeting cancelled",
                    meeting
                        .cancellation_reason
                        .clone()
                        .unwrap_or_else(|| "A meeting was cancelled.".to_owned()),
                ),
            )
            .await?;
        if let Some(user) = self.users.find_by_id(&recipient).await? {
            self.notifier
                .email(email_templates::meeting_cancelled(&user.email, meeting))
                .await;
        }
        Ok(())
    }

    /// Staff mark a confirmed meeting as held once it has ended.
    pub async fn complete(&self, user: &AuthenticatedUser, id: &MeetingId) -> Result<Meeting, Error> {
        let (staff, mut meeting) = self.staff_meeting(user, id).await?;
        meeting.complete(self.clock.utc())?;
        self.meetings.update(&meeting).await?;
        self.record(staff.user_id, AuditAction::MeetingCompleted, &meeting)
            .await?;
        self.notifier
            .notify(
                meeting.student_id,
                NotificationContent::new(
                    NotificationKind::MeetingCompleted,
                    "Meeting completed",
                    format!(
                        "Your meeting with {} has been marked as completed.",
                        staff.university.institution_name
                    ),
                ),
            )
            .await?;
        Ok(meeting)
    }

    /// The student's meetings, soonest first, optionally filtered by status.
    pub async fn list_for_student(
        &self,
        student_id: &UserId,
        status: Option<MeetingStatus>,
    ) -> Result<Vec<Meeting>, Error> {
        Ok(self.meetings.list_for_student(student_id, status).await?)
    }

    /// Meetings of the caller's institution; owners and reps see the same
    /// list.
    pub async fn list_for_university(
        &self,
        user: &AuthenticatedUser,
        status: Option<MeetingStatus>,
    ) -> Result<Vec<Meeting>, Error> {
        let staff = UniversityStaff::resolve(self.universities.as_ref(), user).await?;
        Ok(self
            .meetings
            .list_for_university(&staff.university.id, status)
            .await?)
    }
}

#[cfg(test)]
#[path = "scheduling_service_tests.rs"]
mod tests;
