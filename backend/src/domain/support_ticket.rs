//! Support tickets raised by users or anonymous visitors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum::text_enum;
use super::validation::{optional_text, text_between};
use super::{EmailAddress, Error, TicketId, UserId};

text_enum! {
    /// Area the ticket concerns.
    pub enum TicketCategory {
        Account => "account",
        Meetings => "meetings",
        Verification => "verification",
        Technical => "technical",
        Other => "other",
    }
}

text_enum! {
    /// Handling state maintained by admins.
    pub enum TicketStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    pub id: TicketId,
    pub user_id: Option<UserId>,
    pub email: EmailAddress,
    pub subject: String,
    pub message: String,
    pub category: TicketCategory,
    pub status: TicketStatus,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Ticket contents submitted by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub subject: String,
    pub message: String,
    pub category: TicketCategory,
}

impl SupportTicket {
    /// Open a new ticket after validating its contents.
    pub fn open(
        user_id: Option<UserId>,
        email: EmailAddress,
        draft: TicketDraft,
        now: DateTime<Utc>,
    ) -> Result<Self, Error> {
        Ok(Self {
            id: TicketId::random(),
            user_id,
            email,
            subject: text_between("subject", &draft.subject, 3, 120)?,
            message: text_between("message", &draft.message, 10, 5000)?,
            category: draft.category,
            status: TicketStatus::Open,
            admin_note: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Admin status change; any status may follow any other.
    pub fn update_status(
        &mut self,
        status: TicketStatus,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        if let Some(note) = optional_text("adminNote", note, 2000)? {
            self.admin_note = Some(note);
        }
        self.status = status;
        self.updated_at = now;
        Ok(())
    }
}
