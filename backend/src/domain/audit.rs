//! Audit trail and system log entries.
//!
//! Audit entries record who did what to which entity. They double as
//! idempotency markers for batch jobs: a `TRIGGER_SENT` entry keyed by trigger
//! kind and entity id means that email has already gone out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use super::UserId;
use super::text_enum::text_enum;

text_enum! {
    /// Audited actions.
    pub enum AuditAction {
        UserRegistered => "USER_REGISTERED",
        UserLogin => "USER_LOGIN",
        UniversityVerified => "UNIVERSITY_VERIFIED",
        UniversityRejected => "UNIVERSITY_REJECTED",
        RepCreated => "REP_CREATED",
        RepRemoved => "REP_REMOVED",
        MeetingBooked => "MEETING_BOOKED",
        MeetingConfirmed => "MEETING_CONFIRMED",
        MeetingCancelled => "MEETING_CANCELLED",
        MeetingCompleted => "MEETING_COMPLETED",
        HostRequestUpdated => "HOST_REQUEST_UPDATED",
        OutreachSent => "OUTREACH_SENT",
        OutreachResponded => "OUTREACH_RESPONDED",
        SupportTicketUpdated => "SUPPORT_TICKET_UPDATED",
        DataExported => "DATA_EXPORTED",
        AccountDeletionRequested => "ACCOUNT_DELETION_REQUESTED",
        AccountHardDeleted => "ACCOUNT_HARD_DELETED",
        TriggerSent => "TRIGGER_SENT",
    }
}

/// One audit trail row. `actor_id` is kept without a foreign key so entries
/// survive the deletion of the acting user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor_id: Option<UserId>,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// New entry stamped `now`.
    #[must_use]
    pub fn new(
        actor_id: Option<UserId>,
        action: AuditAction,
        entity_type: impl Into<String>,
        entity_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id,
            action,
            entity_type: entity_type.into(),
            entity_id,
            details: None,
            created_at: now,
        }
    }

    /// Attach structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

text_enum! {
    /// Severity of a system log row.
    pub enum LogLevel {
        Info => "info",
        Warn => "warn",
        Error => "error",
    }
}

/// Operational event persisted for admins (email failures, job summaries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemLogEntry {
    pub id: Uuid,
    pub level: LogLevel,
    pub source: String,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub context: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl SystemLogEntry {
    /// New entry stamped `now`.
    #[must_use]
    pub fn new(
        level: LogLevel,
        source: impl Into<String>,
        message: impl Into<String>,
        context: Option<Value>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            source: source.into(),
            message: message.into(),
            context,
            created_at: now,
        }
    }
}

/// Largest number of log rows returned by the admin endpoints.
pub const LOG_LIST_MAX: u32 = 500;
