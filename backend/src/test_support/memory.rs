//! One in-memory store implementing every repository port.
//!
//! Rows live in a single mutex-guarded state so cascades and overlap checks
//! see a consistent snapshot, mirroring the foreign keys and transactions of
//! the PostgreSQL adapters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AccountMembership, AuditRepository, AvailabilityRepository, HostRequestRepository,
    InterestRepository, MeetingRepository, NewAccount, NotificationRepository, ProgramRepository,
    RepositoryError, StoredCredentials, StudentProfileRepository, SupportTicketRepository,
    UniversityRepository, UserRepository,
};
use crate::domain::{
    AuditAction, AuditEntry, AvailabilityProfile, EmailAddress, HostRequest, HostRequestId,
    HostRequestOutreach, HostRequestStatus, Interest, InterestStatus, InterestedStudent, Meeting,
    MeetingId, MeetingStatus, Notification, NotificationId, OutreachId, OutreachInvitation,
    Program, ProgramId, ProgramStatus, Role, StudentProfile, SupportTicket, SystemLogEntry,
    TicketId, TicketStatus, TimeWindow, UniversityFilter, UniversityId, UniversityProfile, User,
    UserId, VerificationStatus,
};

#[derive(Default)]
struct State {
    users: HashMap<UserId, (User, String)>,
    profiles: HashMap<UserId, StudentProfile>,
    universities: HashMap<UniversityId, UniversityProfile>,
    reps: HashMap<UserId, UniversityId>,
    programs: Vec<Program>,
    interests: Vec<Interest>,
    availability: HashMap<UniversityId, AvailabilityProfile>,
    meetings: Vec<Meeting>,
    notifications: Vec<Notification>,
    tickets: Vec<SupportTicket>,
    host_requests: Vec<HostRequest>,
    outreach: Vec<HostRequestOutreach>,
    audit: Vec<AuditEntry>,
    system_logs: Vec<SystemLogEntry>,
}

impl State {
    fn remove_university(&mut self, id: UniversityId) {
        self.universities.remove(&id);
        self.reps.retain(|_, university| *university != id);
        self.programs.retain(|p| p.university_id != id);
        self.interests.retain(|i| i.university_id != id);
        self.availability.remove(&id);
        self.meetings.retain(|m| m.university_id != id);
        self.outreach.retain(|o| o.university_id != id);
    }

    fn remove_user(&mut self, id: UserId) -> bool {
        if self.users.remove(&id).is_none() {
            return false;
        }
        self.profiles.remove(&id);
        self.reps.remove(&id);
        self.interests.retain(|i| i.student_id != id);
        self.meetings.retain(|m| m.student_id != id);
        for meeting in &mut self.meetings {
            if meeting.rep_id == Some(id) {
                meeting.rep_id = None;
            }
            if meeting.cancelled_by == Some(id) {
                meeting.cancelled_by = None;
            }
        }
        self.notifications.retain(|n| n.user_id != id);
        self.tickets.retain(|t| t.user_id != Some(id));
        let owned: Vec<UniversityId> = self
            .universities
            .values()
            .filter(|u| u.owner_user_id == id)
            .map(|u| u.id)
            .collect();
        for university in owned {
            self.remove_university(university);
        }
        true
    }
}

fn page<T>(items: impl Iterator<Item = T>, offset: u64, limit: u32) -> Vec<T> {
    items
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect()
}

fn count<T>(items: impl Iterator<Item = T>) -> u64 {
    u64::try_from(items.count()).unwrap_or(u64::MAX)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// In-memory stand-in for the PostgreSQL repositories.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl InMemoryDatabase {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Notifications addressed to `user_id`, oldest first.
    pub fn notifications_for(&self, user_id: &UserId) -> Vec<Notification> {
        self.state()
            .notifications
            .iter()
            .filter(|n| n.user_id == *user_id)
            .cloned()
            .collect()
    }

    /// Flip an account to inactive without going through the services.
    pub fn deactivate(&self, user_id: &UserId, at: DateTime<Utc>) {
        if let Some((user, _)) = self.state().users.get_mut(user_id) {
            user.is_active = false;
            user.deletion_requested_at = Some(at);
        }
    }

    /// Every stored meeting, in booking order.
    pub fn meetings(&self) -> Vec<Meeting> {
        self.state().meetings.clone()
    }

    /// Audit entries in insertion order.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.state().audit.clone()
    }

    /// System log rows in insertion order.
    pub fn system_logs(&self) -> Vec<SystemLogEntry> {
        self.state().system_logs.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryDatabase {
    async fn create(&self, account: &NewAccount) -> Result<(), RepositoryError> {
        let mut state = self.state();
        if state
            .users
            .values()
            .any(|(user, _)| user.email == account.user.email)
        {
            return Err(RepositoryError::conflict("users_email_key"));
        }
        match &account.membership {
            AccountMembership::None => {}
            AccountMembership::Owner(profile) => {
                state.universities.insert(profile.id, profile.clone());
            }
            AccountMembership::Rep(university_id) => {
                if !state.universities.contains_key(university_id) {
                    return Err(RepositoryError::query("university does not exist"));
                }
                state.reps.insert(account.user.id, *university_id);
            }
        }
        state.users.insert(
            account.user.id,
            (account.user.clone(), account.password_hash.clone()),
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.state().users.get(id).map(|(user, _)| user.clone()))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, RepositoryError> {
        Ok(self
            .state()
            .users
            .values()
            .find(|(user, _)| user.email == *email)
            .map(|(user, hash)| StoredCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn mark_deletion_requested(
        &self,
        id: &UserId,
        requested_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.deactivate(id, requested_at);
        Ok(())
    }

    async fn list_deletion_due(&self, cutoff: DateTime<Utc>) -> Result<Vec<User>, RepositoryError> {
        let mut due: Vec<User> = self
            .state()
            .users
            .values()
            .filter(|(user, _)| user.deletion_requested_at.is_some_and(|at| at <= cutoff))
            .map(|(user, _)| user.clone())
            .collect();
        due.sort_by_key(|user| user.deletion_requested_at);
        Ok(due)
    }

    async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError> {
        Ok(self.state().remove_user(*id))
    }

    async fn count_by_role(&self, role: Role) -> Result<u64, RepositoryError> {
        Ok(count(
            self.state()
                .users
                .values()
                .filter(|(user, _)| user.role == role),
        ))
    }

    async fn list_students_without_profile(
        &self,
        registered_before: DateTime<Utc>,
    ) -> Result<Vec<User>, RepositoryError> {
        let state = self.state();
        let mut students: Vec<User> = state
            .users
            .values()
            .filter(|(user, _)| {
                user.role == Role::Student
                    && user.is_active
                    && user.created_at <= registered_before
                    && !state.profiles.contains_key(&user.id)
            })
            .map(|(user, _)| user.clone())
            .collect();
        students.sort_by_key(|user| user.created_at);
        Ok(students)
    }
}

#[async_trait]
impl StudentProfileRepository for InMemoryDatabase {
    async fn find(&self, user_id: &UserId) -> Result<Option<StudentProfile>, RepositoryError> {
        Ok(self.state().profiles.get(user_id).cloned())
    }

    async fn upsert(&self, profile: &StudentProfile) -> Result<(), RepositoryError> {
        let mut state = self.state();
        if !state.users.contains_key(&profile.user_id) {
            return Err(RepositoryError::query("user does not exist"));
        }
        state.profiles.insert(profile.user_id, profile.clone());
        Ok(())
    }
}

#[async_trait]
impl UniversityRepository for InMemoryDatabase {
    async fn find(&self, id: &UniversityId) -> Result<Option<UniversityProfile>, RepositoryError> {
        Ok(self.state().universities.get(id).cloned())
    }

    async fn find_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Option<UniversityProfile>, RepositoryError> {
        Ok(self
            .state()
            .universities
            .values()
            .find(|u| u.owner_user_id == *owner)
            .cloned())
    }

    async fn find_by_rep(&self, rep: &UserId) -> Result<Option<UniversityProfile>, RepositoryError> {
        let state = self.state();
        Ok(state
            .reps
            .get(rep)
            .and_then(|id| state.universities.get(id))
            .cloned())
    }

    async fn update(&self, profile: &UniversityProfile) -> Result<(), RepositoryError> {
        let mut state = self.state();
        match state.universities.get_mut(&profile.id) {
            Some(stored) => {
                *stored = profile.clone();
                Ok(())
            }
            None => Err(RepositoryError::query("university does not exist")),
        }
    }

    async fn browse(
        &self,
        filter: &UniversityFilter,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<UniversityProfile>, RepositoryError> {
        let state = self.state();
        let has_matching_program = |university: &UniversityProfile| {
            if filter.field.is_none() && filter.degree_level.is_none() {
                return true;
            }
            state.programs.iter().any(|program| {
                program.university_id == university.id
                    && program.status == ProgramStatus::Active
                    && filter
                        .field
                        .as_deref()
                        .is_none_or(|field| contains_ignore_case(&program.field_category, field))
                    && filter
                        .degree_level
                        .is_none_or(|level| program.degree_level == level)
            })
        };
        let mut matches: Vec<&UniversityProfile> = state
            .universities
            .values()
            .filter(|u| u.verification_status == VerificationStatus::Verified)
            .filter(|u| {
                filter.country.as_deref().is_none_or(|country| {
                    u.country
                        .as_deref()
                        .is_some_and(|c| c.eq_ignore_ascii_case(country))
                })
            })
            .filter(|u| {
                filter
                    .query
                    .as_deref()
                    .is_none_or(|query| contains_ignore_case(&u.institution_name, query))
            })
            .filter(|u| has_matching_program(u))
            .collect();
        matches.sort_by(|a, b| a.institution_name.cmp(&b.institution_name));
        Ok(page(matches.into_iter().cloned(), offset, limit))
    }

    async fn list_by_status(
        &self,
        status: Option<VerificationStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<UniversityProfile>, RepositoryError> {
        let state = self.state();
        let mut matches: Vec<&UniversityProfile> = state
            .universities
            .values()
            .filter(|u| status.is_none_or(|s| u.verification_status == s))
            .collect();
        matches.sort_by_key(|u| u.created_at);
        Ok(page(matches.into_iter().cloned(), offset, limit))
    }

    async fn count_by_status(&self, status: VerificationStatus) -> Result<u64, RepositoryError> {
        Ok(count(
            self.state()
                .universities
                .values()
                .filter(|u| u.verification_status == status),
        ))
    }

    async fn list_reps(&self, id: &UniversityId) -> Result<Vec<User>, RepositoryError> {
        let state = self.state();
        let mut reps: Vec<User> = state
            .reps
            .iter()
            .filter(|(_, university)| *university == id)
            .filter_map(|(user_id, _)| state.users.get(user_id).map(|(user, _)| user.clone()))
            .collect();
        reps.sort_by_key(|user| user.created_at);
        Ok(reps)
    }
}

#[async_trait]
impl ProgramRepository for InMemoryDatabase {
    async fn list(
        &self,
        university_id: &UniversityId,
        include_archived: bool,
    ) -> Result<Vec<Program>, RepositoryError> {
        let mut programs: Vec<Program> = self
            .state()
            .programs
            .iter()
            .filter(|p| p.university_id == *university_id)
            .filter(|p| include_archived || p.status == ProgramStatus::Active)
            .cloned()
            .collect();
        programs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(programs)
    }

    async fn find(&self, id: &ProgramId) -> Result<Option<Program>, RepositoryError> {
        Ok(self.state().programs.iter().find(|p| p.id == *id).cloned())
    }

    async fn insert(&self, program: &Program) -> Result<(), RepositoryError> {
        let mut state = self.state();
        if !state.universities.contains_key(&program.university_id) {
            return Err(RepositoryError::query("university does not exist"));
        }
        state.programs.push(program.clone());
        Ok(())
    }

    async fn update(&self, program: &Program) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let Some(stored) = state.programs.iter_mut().find(|p| p.id == program.id) else {
            return Err(RepositoryError::query("program does not exist"));
        };
        *stored = program.clone();
        Ok(())
    }
}

#[async_trait]
impl InterestRepository for InMemoryDatabase {
    async fn find(
        &self,
        student_id: &UserId,
        university_id: &UniversityId,
    ) -> Result<Option<Interest>, RepositoryError> {
        Ok(self
            .state()
            .interests
            .iter()
            .find(|i| i.student_id == *student_id && i.university_id == *university_id)
            .cloned())
    }

    async fn upsert(&self, interest: &Interest) -> Result<(), RepositoryError> {
        let mut state = self.state();
        match state.interests.iter_mut().find(|i| {
            i.student_id == interest.student_id && i.university_id == interest.university_id
        }) {
            Some(stored) => *stored = interest.clone(),
            None => state.interests.push(interest.clone()),
        }
        Ok(())
    }

    async fn list_for_student(&self, student_id: &UserId) -> Result<Vec<Interest>, RepositoryError> {
        let mut interests: Vec<Interest> = self
            .state()
            .interests
            .iter()
            .filter(|i| i.student_id == *student_id)
            .cloned()
            .collect();
        interests.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(interests)
    }

    async fn list_interested_students(
        &self,
        university_id: &UniversityId,
    ) -> Result<Vec<InterestedStudent>, RepositoryError> {
        let state = self.state();
        let mut students: Vec<InterestedStudent> = state
            .interests
            .iter()
            .filter(|i| i.university_id == *university_id && i.status == InterestStatus::Interested)
            .filter_map(|interest| {
                let (user, _) = state
                    .users
                    .get(&interest.student_id)
                    .filter(|(user, _)| user.is_active)?;
                let profile = state.profiles.get(&interest.student_id);
                Some(InterestedStudent {
                    student_id: user.id,
                    full_name: user.full_name.clone(),
                    email: user.email.clone(),
                    country: profile.map(|p| p.country.clone()),
                    current_status: profile.map(|p| p.current_status),
                    field_of_interest: profile.map(|p| p.field_of_interest.clone()),
                    preferred_degree: profile.map(|p| p.preferred_degree),
                    program_id: interest.program_id,
                    note: interest.note.clone(),
                    interested_since: interest.updated_at,
                })
            })
            .collect();
        students.sort_by(|a, b| b.interested_since.cmp(&a.interested_since));
        Ok(students)
    }
}

#[async_trait]
impl AvailabilityRepository for InMemoryDatabase {
    async fn find(
        &self,
        university_id: &UniversityId,
    ) -> Result<Option<AvailabilityProfile>, RepositoryError> {
        Ok(self.state().availability.get(university_id).cloned())
    }

    async fn save(&self, profile: &AvailabilityProfile) -> Result<(), RepositoryError> {
        self.state()
            .availability
            .insert(profile.university_id, profile.clone());
        Ok(())
    }
}

fn sorted_by_start(mut meetings: Vec<Meeting>) -> Vec<Meeting> {
    meetings.sort_by_key(|m| m.window.starts_at);
    meetings
}

#[async_trait]
impl MeetingRepository for InMemoryDatabase {
    async fn insert_if_free(&self, meeting: &Meeting) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let collides = state.meetings.iter().any(|existing| {
            existing.status.is_live()
                && (existing.university_id == meeting.university_id
                    || existing.student_id == meeting.student_id)
                && existing.window.overlaps(&meeting.window)
        });
        if collides {
            return Err(RepositoryError::conflict("meeting overlaps a live meeting"));
        }
        state.meetings.push(meeting.clone());
        Ok(())
    }

    async fn find(&self, id: &MeetingId) -> Result<Option<Meeting>, RepositoryError> {
        Ok(self.state().meetings.iter().find(|m| m.id == *id).cloned())
    }

    async fn update(&self, meeting: &Meeting) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let Some(stored) = state.meetings.iter_mut().find(|m| m.id == meeting.id) else {
            return Err(RepositoryError::query("meeting does not exist"));
        };
        *stored = meeting.clone();
        Ok(())
    }

    async fn list_for_student(
        &self,
        student_id: &UserId,
        status: Option<MeetingStatus>,
    ) -> Result<Vec<Meeting>, RepositoryError> {
        Ok(sorted_by_start(
            self.state()
                .meetings
                .iter()
                .filter(|m| m.student_id == *student_id && status.is_none_or(|s| m.status == s))
                .cloned()
                .collect(),
        ))
    }

    async fn list_for_university(
        &self,
        university_id: &UniversityId,
        status: Option<MeetingStatus>,
    ) -> Result<Vec<Meeting>, RepositoryError> {
        Ok(sorted_by_start(
            self.state()
                .meetings
                .iter()
                .filter(|m| {
                    m.university_id == *university_id && status.is_none_or(|s| m.status == s)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn live_windows(
        &self,
        university_id: &UniversityId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimeWindow>, RepositoryError> {
        Ok(self
            .state()
            .meetings
            .iter()
            .filter(|m| {
                m.university_id == *university_id
                    && m.status.is_live()
                    && m.window.starts_at < to
                    && m.window.ends_at > from
            })
            .map(|m| m.window)
            .collect())
    }

    async fn list_confirmed_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, RepositoryError> {
        Ok(sorted_by_start(
            self.state()
                .meetings
                .iter()
                .filter(|m| {
                    m.status == MeetingStatus::Confirmed
                        && m.window.starts_at >= from
                        && m.window.starts_at < to
                })
                .cloned()
                .collect(),
        ))
    }

    async fn list_stale_pending(
        &self,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Meeting>, RepositoryError> {
        Ok(sorted_by_start(
            self.state()
                .meetings
                .iter()
                .filter(|m| {
                    m.status == MeetingStatus::Pending
                        && m.created_at <= cutoff
                        && m.window.starts_at > now
                })
                .cloned()
                .collect(),
        ))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(count(self.state().meetings.iter()))
    }
}

#[async_trait]
impl NotificationRepository for InMemoryDatabase {
    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError> {
        self.state().notifications.push(notification.clone());
        Ok(())
    }

    async fn list(
        &self,
        user_id: &UserId,
        unread_only: bool,
        limit: u32,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let state = self.state();
        let newest_first = state
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == *user_id && (!unread_only || n.read_at.is_none()))
            .cloned();
        Ok(page(newest_first, 0, limit))
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        Ok(count(
            self.state()
                .notifications
                .iter()
                .filter(|n| n.user_id == *user_id && n.read_at.is_none()),
        ))
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
        read_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.state();
        let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|n| n.id == *id && n.user_id == *user_id)
        else {
            return Ok(false);
        };
        notification.read_at.get_or_insert(read_at);
        Ok(true)
    }

    async fn mark_all_read(
        &self,
        user_id: &UserId,
        read_at: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut state = self.state();
        let mut updated = 0;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == *user_id && n.read_at.is_none())
        {
            notification.read_at = Some(read_at);
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl SupportTicketRepository for InMemoryDatabase {
    async fn insert(&self, ticket: &SupportTicket) -> Result<(), RepositoryError> {
        self.state().tickets.push(ticket.clone());
        Ok(())
    }

    async fn find(&self, id: &TicketId) -> Result<Option<SupportTicket>, RepositoryError> {
        Ok(self.state().tickets.iter().find(|t| t.id == *id).cloned())
    }

    async fn update(&self, ticket: &SupportTicket) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let Some(stored) = state.tickets.iter_mut().find(|t| t.id == ticket.id) else {
            return Err(RepositoryError::query("ticket does not exist"));
        };
        *stored = ticket.clone();
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<SupportTicket>, RepositoryError> {
        Ok(self
            .state()
            .tickets
            .iter()
            .rev()
            .filter(|t| t.user_id == Some(*user_id))
            .cloned()
            .collect())
    }

    async fn list(
        &self,
        status: Option<TicketStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<SupportTicket>, RepositoryError> {
        let state = self.state();
        let newest_first = state
            .tickets
            .iter()
            .rev()
            .filter(|t| status.is_none_or(|s| t.status == s))
            .cloned();
        Ok(page(newest_first, offset, limit))
    }

    async fn count_by_status(&self, status: TicketStatus) -> Result<u64, RepositoryError> {
        Ok(count(
            self.state().tickets.iter().filter(|t| t.status == status),
        ))
    }
}

#[async_trait]
impl HostRequestRepository for InMemoryDatabase {
    async fn insert(&self, request: &HostRequest) -> Result<(), RepositoryError> {
        self.state().host_requests.push(request.clone());
        Ok(())
    }

    async fn find(&self, id: &HostRequestId) -> Result<Option<HostRequest>, RepositoryError> {
        Ok(self
            .state()
            .host_requests
            .iter()
            .find(|r| r.id == *id)
            .cloned())
    }

    async fn update(&self, request: &HostRequest) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let Some(stored) = state.host_requests.iter_mut().find(|r| r.id == request.id) else {
            return Err(RepositoryError::query("host request does not exist"));
        };
        *stored = request.clone();
        Ok(())
    }

    async fn list(
        &self,
        status: Option<HostRequestStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<HostRequest>, RepositoryError> {
        let state = self.state();
        let newest_first = state
            .host_requests
            .iter()
            .rev()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned();
        Ok(page(newest_first, offset, limit))
    }

    async fn count_by_status(&self, status: HostRequestStatus) -> Result<u64, RepositoryError> {
        Ok(count(
            self.state()
                .host_requests
                .iter()
                .filter(|r| r.status == status),
        ))
    }

    async fn insert_outreach(&self, rows: &[HostRequestOutreach]) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let duplicate = rows.iter().any(|row| {
            state.outreach.iter().any(|existing| {
                existing.host_request_id == row.host_request_id
                    && existing.university_id == row.university_id
            })
        });
        if duplicate {
            return Err(RepositoryError::conflict("university already invited"));
        }
        state.outreach.extend_from_slice(rows);
        Ok(())
    }

    async fn list_outreach_for_request(
        &self,
        id: &HostRequestId,
    ) -> Result<Vec<HostRequestOutreach>, RepositoryError> {
        Ok(self
            .state()
            .outreach
            .iter()
            .filter(|o| o.host_request_id == *id)
            .cloned()
            .collect())
    }

    async fn list_outreach_for_university(
        &self,
        university_id: &UniversityId,
    ) -> Result<Vec<OutreachInvitation>, RepositoryError> {
        let state = self.state();
        let mut invitations: Vec<OutreachInvitation> = state
            .outreach
            .iter()
            .filter(|o| o.university_id == *university_id)
            .filter_map(|outreach| {
                let request = state
                    .host_requests
                    .iter()
                    .find(|r| r.id == outreach.host_request_id)?;
                Some(OutreachInvitation {
                    outreach: outreach.clone(),
                    host_request: request.clone(),
                })
            })
            .collect();
        invitations.sort_by(|a, b| b.outreach.sent_at.cmp(&a.outreach.sent_at));
        Ok(invitations)
    }

    async fn find_outreach(
        &self,
        id: &OutreachId,
    ) -> Result<Option<HostRequestOutreach>, RepositoryError> {
        Ok(self.state().outreach.iter().find(|o| o.id == *id).cloned())
    }

    async fn update_outreach(&self, outreach: &HostRequestOutreach) -> Result<(), RepositoryError> {
        let mut state = self.state();
        let Some(stored) = state.outreach.iter_mut().find(|o| o.id == outreach.id) else {
            return Err(RepositoryError::query("outreach does not exist"));
        };
        *stored = outreach.clone();
        Ok(())
    }

    async fn count_responses_since(&self, since: DateTime<Utc>) -> Result<u64, RepositoryError> {
        Ok(count(
            self.state()
                .outreach
                .iter()
                .filter(|o| o.responded_at.is_some_and(|at| at >= since)),
        ))
    }
}

#[async_trait]
impl AuditRepository for InMemoryDatabase {
    async fn record(&self, entry: &AuditEntry) -> Result<(), RepositoryError> {
        self.state().audit.push(entry.clone());
        Ok(())
    }

    async fn has_marker(
        &self,
        action: AuditAction,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<bool, RepositoryError> {
        Ok(self.state().audit.iter().any(|entry| {
            entry.action == action
                && entry.entity_type == entity_type
                && entry.entity_id.as_deref() == Some(entity_id)
        }))
    }

    async fn list(&self, limit: u32) -> Result<Vec<AuditEntry>, RepositoryError> {
        Ok(page(self.state().audit.iter().rev().cloned(), 0, limit))
    }

    async fn record_system(&self, entry: &SystemLogEntry) -> Result<(), RepositoryError> {
        self.state().system_logs.push(entry.clone());
        Ok(())
    }

    async fn list_system(&self, limit: u32) -> Result<Vec<SystemLogEntry>, RepositoryError> {
        Ok(page(self.state().system_logs.iter().rev().cloned(), 0, limit))
    }
}
