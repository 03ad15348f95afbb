//! Deletion requests and the hard-delete sweep.
//!
//! A request deactivates the account at once and cancels its upcoming
//! meetings. The sweep removes rows and blobs once the grace period has
//! passed; it only ever sees accounts that still exist, so re-running it
//! after a completed pass does nothing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::email_templates;
use crate::domain::ports::{
    AuditRepository, BlobStore, MeetingRepository, StudentProfileRepository,
    UniversityRepository, UserRepository,
};
use crate::domain::{
    AuditAction, AuditEntry, AuthenticatedUser, DeletionSchedule, Error, LogLevel, Meeting,
    Notifier, Role, SchedulingService, SweepReport, SystemLogEntry, User, deletion_cutoff,
};

const CANCELLATION_REASON: &str = "account deleted";

/// Account deletion service.
#[derive(Clone)]
pub struct AccountDeletionService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn StudentProfileRepository>,
    universities: Arc<dyn UniversityRepository>,
    meetings: Arc<dyn MeetingRepository>,
    blobs: Arc<dyn BlobStore>,
    audit: Arc<dyn AuditRepository>,
    scheduling: SchedulingService,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    grace_days: u32,
}

impl AccountDeletionService {
    #[expect(
        clippy::too_many_arguments,
        reason = "flat constructor taking one port per field"
    )]
    pub fn new(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn StudentProfileRepository>,
        universities: Arc<dyn UniversityRepository>,
        meetings: Arc<dyn MeetingRepository>,
        blobs: Arc<dyn BlobStore>,
        audit: Arc<dyn AuditRepository>,
        scheduling: SchedulingService,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
        grace_days: u32,
    ) -> Self {
        Self {
            users,
            profiles,
            universities,
            meetings,
            blobs,
            audit,
            scheduling,
            notifier,
            clock,
            grace_days,
        }
    }

    /// Grace period applied by this service.
    #[must_use]
    pub const fn grace_days(&self) -> u32 {
        self.grace_days
    }

    /// Deactivate the caller's account and schedule the hard delete.
    ///
    /// Repeating the request returns the original schedule.
    pub async fn request_deletion(
        &self,
        session: &AuthenticatedUser,
    ) -> Result<DeletionSchedule, Error> {
        if session.role == Role::Admin {
            return Err(Error::forbidden(
                "administrator accounts cannot be deleted from the API",
            ));
        }
        let user = self
            .users
            .find_by_id(&session.user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))?;
        if let Some(requested_at) = user.deletion_requested_at {
            return DeletionSchedule::new(requested_at, self.grace_days);
        }

        let now = self.clock.utc();
        let schedule = DeletionSchedule::new(now, self.grace_days)?;
        // The flag short-circuits retries, so it is set only once every
        // upcoming meeting is cancelled.
        let cancelled = self.cancel_upcoming_meetings(&user, now).await?;
        self.users.mark_deletion_requested(&user.id, now).await?;

        self.audit
            .record(
                &AuditEntry::new(
                    Some(user.id),
                    AuditAction::AccountDeletionRequested,
                    "user",
                    Some(user.id.to_string()),
                    now,
                )
                .with_details(json!({
                    "hardDeleteAfter": schedule.hard_delete_after,
                    "cancelledMeetings": cancelled,
                })),
            )
            .await?;
        info!(user_id = %user.id, cancelled, "account deletion requested");

        self.notifier
            .email(email_templates::deletion_confirmation(
                &user.email,
                &user.full_name,
                schedule.hard_delete_after,
            ))
            .await;
        Ok(schedule)
    }

    async fn upcoming_meetings(&self, user: &User, now: DateTime<Utc>) -> Result<Vec<Meeting>, Error> {
        let meetings = match user.role {
            Role::Student => self.meetings.list_for_student(&user.id, None).await?,
            Role::University => match self.universities.find_by_owner(&user.id).await? {
                Some(university) => {
                    self.meetings
                        .list_for_university(&university.id, None)
                        .await?
                }
                None => Vec::new(),
            },
            Role::UniversityRep | Role::Admin => Vec::new(),
        };
        Ok(meetings
            .into_iter()
            .filter(|meeting| meeting.status.is_live() && meeting.window.starts_at > now)
            .collect())
    }

    async fn cancel_upcoming_meetings(&self, user: &User, now: DateTime<Utc>) -> Result<usize, Error> {
        let meetings = self.upcoming_meetings(user, now).await?;
        let count = meetings.len();
        for mut meeting in meetings {
            meeting.cancel(user.id, CANCELLATION_REASON, now)?;
            self.meetings.update(&meeting).await?;
            let counterpart = if meeting.student_id == user.id {
                self.universities
                    .find(&meeting.university_id)
                    .await?
                    .map(|university| university.owner_user_id)
            } else {
                Some(meeting.student_id)
            };
            if let Some(counterpart) = counterpart {
                self.scheduling
                    .notify_cancellation(counterpart, &meeting)
                    .await?;
            }
        }
        Ok(count)
    }

    async fn blob_keys(&self, user: &User) -> Result<Vec<String>, Error> {
        let keys = match user.role {
            Role::Student => self
                .profiles
                .find(&user.id)
                .await?
                .and_then(|profile| profile.cv_key)
                .into_iter()
                .collect(),
            Role::University => self
                .universities
                .find_by_owner(&user.id)
                .await?
                .map(|university| {
                    [university.logo_key, university.brochure_key]
                        .into_iter()
                        .flatten()
                        .collect()
                })
                .unwrap_or_default(),
            Role::UniversityRep | Role::Admin => Vec::new(),
        };
        Ok(keys)
    }

    /// Remove the account and its blobs. `false` when another sweep got
    /// there first.
    async fn hard_delete(&self, user: &User, now: DateTime<Utc>) -> Result<bool, Error> {
        let keys = self.blob_keys(user).await?;
        if !self.users.delete(&user.id).await? {
            return Ok(false);
        }
        for key in keys {
            if let Err(error) = self.blobs.delete(&key).await {
                warn!(%error, key, "failed to remove blob of deleted account");
            }
        }
        self.audit
            .record(&AuditEntry::new(
                None,
                AuditAction::AccountHardDeleted,
                "user",
                Some(user.id.to_string()),
                now,
            ))
            .await?;
        Ok(true)
    }

    /// Hard-delete every account whose grace period has elapsed.
    ///
    /// Failures are counted and logged; the sweep carries on with the next
    /// account.
    pub async fn sweep(&self, dry_run: bool) -> Result<SweepReport, Error> {
        let now = self.clock.utc();
        let due = self
            .users
            .list_deletion_due(deletion_cutoff(now, self.grace_days)?)
            .await?;
        let mut report = SweepReport {
            candidates: due.len(),
            dry_run,
            ..SweepReport::default()
        };
        if dry_run || due.is_empty() {
            info!(candidates = report.candidates, dry_run, "deletion sweep finished");
            return Ok(report);
        }

        for user in &due {
            match self.hard_delete(user, now).await {
                Ok(true) => report.deleted += 1,
                Ok(false) => info!(user_id = %user.id, "account already removed"),
                Err(error) => {
                    report.failed += 1;
                    warn!(user_id = %user.id, %error, "hard delete failed");
                }
            }
        }

        let level = if report.failed == 0 {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };
        let entry = SystemLogEntry::new(
            level,
            "deletion_sweep",
            format!(
                "deleted {} of {} accounts past the grace period",
                report.deleted, report.candidates
            ),
            Some(json!(report)),
            now,
        );
        if let Err(error) = self.audit.record_system(&entry).await {
            warn!(%error, "failed to record deletion sweep summary");
        }
        info!(
            candidates = report.candidates,
            deleted = report.deleted,
            failed = report.failed,
            "deletion sweep finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "account_deletion_service_tests.rs"]
mod tests;
