//! Rows for notifications, support tickets, campus fair outreach and logs.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::RepositoryError;
use crate::domain::{
    AuditEntry, EmailAddress, FullName, HostRequest, HostRequestId, HostRequestOutreach,
    Notification, NotificationId, OutreachId, SupportTicket, SystemLogEntry, TicketId,
    UniversityId, UserId,
};

use super::super::diesel_error_mapping::{decode, validated};
use super::super::schema::{
    audit_logs, host_request_outreach, host_requests, notifications, support_tickets, system_logs,
};

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: *n.id.as_uuid(),
            user_id: *n.user_id.as_uuid(),
            kind: n.kind.as_str().to_owned(),
            title: n.title.clone(),
            message: n.message.clone(),
            link: n.link.clone(),
            read_at: n.read_at,
            created_at: n.created_at,
        }
    }
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RepositoryError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NotificationId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            kind: decode("notifications.kind", &row.kind)?,
            title: row.title,
            message: row.message,
            link: row.link,
            read_at: row.read_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = support_tickets)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SupportTicketRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub category: String,
    pub status: String,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SupportTicket> for SupportTicketRow {
    fn from(ticket: &SupportTicket) -> Self {
        Self {
            id: *ticket.id.as_uuid(),
            user_id: ticket.user_id.map(|id| *id.as_uuid()),
            email: ticket.email.to_string(),
            subject: ticket.subject.clone(),
            message: ticket.message.clone(),
            category: ticket.category.as_str().to_owned(),
            status: ticket.status.as_str().to_owned(),
            admin_note: ticket.admin_note.clone(),
            created_at: ticket.created_at,
            updated_at: ticket.updated_at,
        }
    }
}

impl TryFrom<SupportTicketRow> for SupportTicket {
    type Error = RepositoryError;

    fn try_from(row: SupportTicketRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TicketId::from_uuid(row.id),
            user_id: row.user_id.map(UserId::from_uuid),
            email: validated("support_tickets.email", EmailAddress::new(&row.email))?,
            subject: row.subject,
            message: row.message,
            category: decode("support_tickets.category", &row.category)?,
            status: decode("support_tickets.status", &row.status)?,
            admin_note: row.admin_note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = host_requests)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HostRequestRow {
    pub id: Uuid,
    pub organization_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub city: String,
    pub country: String,
    pub expected_students: i32,
    pub preferred_dates: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&HostRequest> for HostRequestRow {
    fn from(request: &HostRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            organization_name: request.organization_name.clone(),
            contact_name: request.contact_name.to_string(),
            contact_email: request.contact_email.to_string(),
            city: request.city.clone(),
            country: request.country.clone(),
            expected_students: request.expected_students,
            preferred_dates: request.preferred_dates.clone(),
            message: request.message.clone(),
            status: request.status.as_str().to_owned(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

impl TryFrom<HostRequestRow> for HostRequest {
    type Error = RepositoryError;

    fn try_from(row: HostRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: HostRequestId::from_uuid(row.id),
            organization_name: row.organization_name,
            contact_name: validated("host_requests.contact_name", FullName::new(&row.contact_name))?,
            contact_email: validated(
                "host_requests.contact_email",
                EmailAddress::new(&row.contact_email),
            )?,
            city: row.city,
            country: row.country,
            expected_students: row.expected_students,
            preferred_dates: row.preferred_dates,
            message: row.message,
            status: decode("host_requests.status", &row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = host_request_outreach)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OutreachRow {
    pub id: Uuid,
    pub host_request_id: Uuid,
    pub university_id: Uuid,
    pub status: String,
    pub message: Option<String>,
    pub response_note: Option<String>,
    pub sent_by: Uuid,
    pub sent_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<&HostRequestOutreach> for OutreachRow {
    fn from(outreach: &HostRequestOutreach) -> Self {
        Self {
            id: *outreach.id.as_uuid(),
            host_request_id: *outreach.host_request_id.as_uuid(),
            university_id: *outreach.university_id.as_uuid(),
            status: outreach.status.as_str().to_owned(),
            message: outreach.message.clone(),
            response_note: outreach.response_note.clone(),
            sent_by: *outreach.sent_by.as_uuid(),
            sent_at: outreach.sent_at,
            responded_at: outreach.responded_at,
        }
    }
}

impl TryFrom<OutreachRow> for HostRequestOutreach {
    type Error = RepositoryError;

    fn try_from(row: OutreachRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OutreachId::from_uuid(row.id),
            host_request_id: HostRequestId::from_uuid(row.host_request_id),
            university_id: UniversityId::from_uuid(row.university_id),
            status: decode("host_request_outreach.status", &row.status)?,
            message: row.message,
            response_note: row.response_note,
            sent_by: UserId::from_uuid(row.sent_by),
            sent_at: row.sent_at,
            responded_at: row.responded_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = audit_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuditLogRow {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub details: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<&AuditEntry> for AuditLogRow {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            id: entry.id,
            actor_id: entry.actor_id.map(|id| *id.as_uuid()),
            action: entry.action.as_str().to_owned(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id.clone(),
            details: entry.details.clone(),
            created_at: entry.created_at,
        }
    }
}

impl TryFrom<AuditLogRow> for AuditEntry {
    type Error = RepositoryError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            actor_id: row.actor_id.map(UserId::from_uuid),
            action: decode("audit_logs.action", &row.action)?,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            details: row.details,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = system_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SystemLogRow {
    pub id: Uuid,
    pub level: String,
    pub source: String,
    pub message: String,
    pub context: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<&SystemLogEntry> for SystemLogRow {
    fn from(entry: &SystemLogEntry) -> Self {
        Self {
            id: entry.id,
            level: entry.level.as_str().to_owned(),
            source: entry.source.clone(),
            message: entry.message.clone(),
            context: entry.context.clone(),
            created_at: entry.created_at,
        }
    }
}

impl TryFrom<SystemLogRow> for SystemLogEntry {
    type Error = RepositoryError;

    fn try_from(row: SystemLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            level: decode("system_logs.level", &row.level)?,
            source: row.source,
            message: row.message,
            context: row.context,
            created_at: row.created_at,
        })
    }
}
