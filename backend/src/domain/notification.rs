//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum::text_enum;
use super::{NotificationId, UserId};

text_enum! {
    /// What triggered a notification; clients pick an icon from it.
    pub enum NotificationKind {
        InterestReceived => "interest_received",
        MeetingRequested => "meeting_requested",
        MeetingConfirmed => "meeting_confirmed",
        MeetingCancelled => "meeting_cancelled",
        MeetingCompleted => "meeting_completed",
        VerificationApproved => "verification_approved",
        VerificationRejected => "verification_rejected",
        OutreachReceived => "outreach_received",
        OutreachResponded => "outreach_responded",
        SupportUpdate => "support_update",
        System => "system",
    }
}

/// A notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Unread notification created now.
    #[must_use]
    pub fn new(
        user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        link: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::random(),
            user_id,
            kind,
            title: title.into(),
            message: message.into(),
            link,
            read_at: None,
            created_at: now,
        }
    }
}

/// Largest page of notifications returned at once.
pub const NOTIFICATION_LIST_MAX: u32 = 100;
