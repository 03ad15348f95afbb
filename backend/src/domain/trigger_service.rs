//! Hourly reminder emails.
//!
//! Each trigger lists its candidates and skips those with a `TRIGGER_SENT`
//! marker for the same trigger kind and entity. The marker is written only
//! after the provider accepts the email, so failed sends are retried on the
//! next run.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::email_templates;
use crate::domain::ports::{
    AuditRepository, MeetingRepository, UniversityRepository, UserRepository,
};
use crate::domain::text_enum::text_enum;
use crate::domain::{
    AuditAction, AuditEntry, EmailMessage, Error, LogLevel, Notifier, SystemLogEntry,
};

const REMINDER_LOOKAHEAD_HOURS: i64 = 24;
const PENDING_NUDGE_AFTER_HOURS: i64 = 48;
const INCOMPLETE_PROFILE_AFTER_HOURS: i64 = 72;

text_enum! {
    /// Reminder emails sent by the trigger run.
    pub enum TriggerKind {
        MeetingReminder => "meeting_reminder",
        PendingRequestNudge => "pending_request_nudge",
        IncompleteProfile => "incomplete_profile",
    }
}

/// Emails sent by one trigger run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriggerReport {
    pub meeting_reminders: u32,
    pub pending_request_nudges: u32,
    pub incomplete_profile_nudges: u32,
}

/// Shared secret guarding the trigger endpoint.
///
/// Only the SHA-256 digest is kept; presented tokens are hashed and compared
/// without early exit.
#[derive(Clone)]
pub struct CronSecret {
    digest: [u8; 32],
}

impl CronSecret {
    /// Returns `None` for a blank secret.
    #[must_use]
    pub fn new(secret: &str) -> Option<Self> {
        let secret = Zeroizing::new(secret.trim().to_owned());
        if secret.is_empty() {
            return None;
        }
        Some(Self {
            digest: Sha256::digest(secret.as_bytes()).into(),
        })
    }

    /// Whether `presented` matches the configured secret.
    #[must_use]
    pub fn verify(&self, presented: &str) -> bool {
        let presented: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
        self.digest
            .iter()
            .zip(presented.iter())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for CronSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CronSecret(..)")
    }
}

/// Runs the reminder triggers.
#[derive(Clone)]
pub struct TriggerService {
    users: Arc<dyn UserRepository>,
    universities: Arc<dyn UniversityRepository>,
    meetings: Arc<dyn MeetingRepository>,
    audit: Arc<dyn AuditRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl TriggerService {
    /// Wire the service onto its ports.
    pub fn new(
        users: Arc<dyn UserRepository>,
        universities: Arc<dyn UniversityRepository>,
        meetings: Arc<dyn MeetingRepository>,
        audit: Arc<dyn AuditRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            universities,
            meetings,
            audit,
            notifier,
            clock,
        }
    }

    /// Run every trigger once.
    pub async fn run(&self) -> Result<TriggerReport, Error> {
        let report = TriggerReport {
            meeting_reminders: self.meeting_reminders().await?,
            pending_request_nudges: self.pending_request_nudges().await?,
            incomplete_profile_nudges: self.incomplete_profiles().await?,
        };
        info!(
            meeting_reminders = report.meeting_reminders,
            pending_request_nudges = report.pending_request_nudges,
            incomplete_profile_nudges = report.incomplete_profile_nudges,
            "trigger run finished"
        );
        let summary = SystemLogEntry::new(
            LogLevel::Info,
            "cron_triggers",
            format!(
                "sent {} reminders, {} pending nudges, {} profile nudges",
                report.meeting_reminders,
                report.pending_request_nudges,
                report.incomplete_profile_nudges
            ),
            Some(json!(report)),
            self.clock.utc(),
        );
        if let Err(error) = self.audit.record_system(&summary).await {
            warn!(%error, "failed to record trigger run summary");
        }
        Ok(report)
    }

    async fn already_sent(&self, kind: TriggerKind, entity_id: &str) -> Result<bool, Error> {
        Ok(self
            .audit
            .has_marker(AuditAction::TriggerSent, kind.as_str(), entity_id)
            .await?)
    }

    /// Send and, on success, write the marker.
    async fn deliver(
        &self,
        kind: TriggerKind,
        entity_id: String,
        message: EmailMessage,
    ) -> Result<bool, Error> {
        if !self.notifier.email(message).await {
            warn!(%kind, entity_id, "trigger email not delivered; will retry");
            return Ok(false);
        }
        self.audit
            .record(&AuditEntry::new(
                None,
                AuditAction::TriggerSent,
                kind.as_str(),
                Some(entity_id),
                self.clock.utc(),
            ))
            .await?;
        Ok(true)
    }

    async fn meeting_reminders(&self) -> Result<u32, Error> {
        let kind = TriggerKind::MeetingReminder;
        let now = self.clock.utc();
        let upcoming = self
            .meetings
            .list_confirmed_starting_between(now, now + Duration::hours(REMINDER_LOOKAHEAD_HOURS))
            .await?;
        let mut sent = 0;
        for meeting in upcoming {
            let entity_id = meeting.id.to_string();
            if self.already_sent(kind, &entity_id).await? {
                continue;
            }
            let Some(student) = self.users.find_by_id(&meeting.student_id).await? else {
                continue;
            };
            let institution = self
                .universities
                .find(&meeting.university_id)
                .await?
                .map(|university| university.institution_name)
                .unwrap_or_default();
            let message = email_templates::meeting_reminder(&student.email, &institution, &meeting);
            if self.deliver(kind, entity_id, message).await? {
                sent += 1;
            }
        }
        Ok(sent)
    }

    async fn pending_request_nudges(&self) -> Result<u32, Error> {
        let kind = TriggerKind::PendingRequestNudge;
        let now = self.clock.utc();
        let stale = self
            .meetings
            .list_stale_pending(now - Duration::hours(PENDING_NUDGE_AFTER_HOURS), now)
            .await?;
        let mut sent = 0;
        for meeting in stale {
            let entity_id = meeting.id.to_string();
            if self.already_sent(kind, &entity_id).await? {
                continue;
            }
            let Some(university) = self.universities.find(&meeting.university_id).await? else {
                continue;
            };
            let Some(owner) = self.users.find_by_id(&university.owner_user_id).await? else {
                continue;
            };
            let message = email_templates::pending_request_nudge(&owner.email, &meeting);
            if self.deliver(kind, entity_id, message).await? {
                sent += 1;
            }
        }
        Ok(sent)
    }

    async fn incomplete_profiles(&self) -> Result<u32, Error> {
        let kind = TriggerKind::IncompleteProfile;
        let cutoff = self.clock.utc() - Duration::hours(INCOMPLETE_PROFILE_AFTER_HOURS);
        let students = self.users.list_students_without_profile(cutoff).await?;
        let mut sent = 0;
        for student in students {
            let entity_id = student.id.to_string();
            if self.already_sent(kind, &entity_id).await? {
                continue;
            }
            let message = email_templates::incomplete_profile(&student.email, &student.full_name);
            if self.deliver(kind, entity_id, message).await? {
                sent += 1;
            }
        }
        Ok(sent)
    }
}

#[cfg(test)]
#[path = "trigger_service_tests.rs"]
mod tests;
