//! Personal data export.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    AuditRepository, InterestRepository, MeetingRepository, NotificationRepository,
    StudentProfileRepository, SupportTicketRepository, UniversityRepository, UserRepository,
};
use crate::domain::{AuditAction, AuditEntry, DataExport, Error, Role, UserId};

/// Exports cover every notification a user has, not just the recent page.
const EXPORT_NOTIFICATION_LIMIT: u32 = 10_000;

/// Builds [`DataExport`] documents.
#[derive(Clone)]
pub struct DataExportService {
    users: Arc<dyn UserRepository>,
    profiles: Arc<dyn StudentProfileRepository>,
    universities: Arc<dyn UniversityRepository>,
    interests: Arc<dyn InterestRepository>,
    meetings: Arc<dyn MeetingRepository>,
    notifications: Arc<dyn NotificationRepository>,
    tickets: Arc<dyn SupportTicketRepository>,
    audit: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
}

impl DataExportService {
    #[expect(
        clippy::too_many_arguments,
        reason = "flat constructor taking one port per field"
    )]
    pub fn new(
        users: Arc<dyn UserRepository>,
        profiles: Arc<dyn StudentProfileRepository>,
        universities: Arc<dyn UniversityRepository>,
        interests: Arc<dyn InterestRepository>,
        meetings: Arc<dyn MeetingRepository>,
        notifications: Arc<dyn NotificationRepository>,
        tickets: Arc<dyn SupportTicketRepository>,
        audit: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            profiles,
            universities,
            interests,
            meetings,
            notifications,
            tickets,
            audit,
            clock,
        }
    }

    /// Everything stored about `user_id`.
    ///
    /// Staff exports include their institution and the meetings they
    /// confirmed; student exports include interests and booked meetings.
    pub async fn export(&self, user_id: &UserId) -> Result<DataExport, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::unauthorized("login required"))?;

        let (student_profile, interests, meetings, university) = match user.role {
            Role::Student => (
                self.profiles.find(user_id).await?,
                self.interests.list_for_student(user_id).await?,
                self.meetings.list_for_student(user_id, None).await?,
                None,
            ),
            Role::University | Role::UniversityRep => {
                let university = if user.role == Role::University {
                    self.universities.find_by_owner(user_id).await?
                } else {
                    self.universities.find_by_rep(user_id).await?
                };
                let meetings = match &university {
                    Some(university) => self
                        .meetings
                        .list_for_university(&university.id, None)
                        .await?
                        .into_iter()
                        .filter(|meeting| meeting.rep_id.as_ref() == Some(user_id))
                        .collect(),
                    None => Vec::new(),
                };
                (None, Vec::new(), meetings, university)
            }
            Role::Admin => (None, Vec::new(), Vec::new(), None),
        };

        let now = self.clock.utc();
        let export = DataExport {
            exported_at: now,
            student_profile,
            university,
            interests,
            meetings,
            notifications: self
                .notifications
                .list(user_id, false, EXPORT_NOTIFICATION_LIMIT)
                .await?,
            support_tickets: self.tickets.list_for_user(user_id).await?,
            user,
        };

        self.audit
            .record(&AuditEntry::new(
                Some(*user_id),
                AuditAction::DataExported,
                "user",
                Some(user_id.to_string()),
                now,
            ))
            .await?;
        info!(user_id = %user_id, "personal data exported");
        Ok(export)
    }
}
