//! Support tickets.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{AuditRepository, SupportTicketRepository, UserRepository};
use crate::domain::{
    AuditAction, AuditEntry, AuthenticatedUser, EmailAddress, Error, NotificationContent,
    NotificationKind, Notifier, SupportTicket, TicketDraft, TicketId, TicketStatus, UserId,
};

/// Support ticket service.
#[derive(Clone)]
pub struct SupportService {
    tickets: Arc<dyn SupportTicketRepository>,
    users: Arc<dyn UserRepository>,
    audit: Arc<dyn AuditRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl SupportService {
    pub fn new(
        tickets: Arc<dyn SupportTicketRepository>,
        users: Arc<dyn UserRepository>,
        audit: Arc<dyn AuditRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tickets,
            users,
            audit,
            notifier,
            clock,
        }
    }

    /// Open a ticket.
    ///
    /// Signed-in users default to their account email; anonymous visitors
    /// must supply one.
    pub async fn submit(
        &self,
        requester: Option<&AuthenticatedUser>,
        email: Option<EmailAddress>,
        draft: TicketDraft,
    ) -> Result<SupportTicket, Error> {
        let (user_id, email) = match requester {
            Some(session) => {
                let email = match email {
                    Some(email) => email,
                    None => self
                        .users
                        .find_by_id(&session.user_id)
                        .await?
                        .map(|user| user.email)
                        .ok_or_else(|| Error::unauthorized("login required"))?,
                };
                (Some(session.user_id), email)
            }
            None => (
                None,
                email.ok_or_else(|| Error::invalid_request("email is required"))?,
            ),
        };
        let ticket = SupportTicket::open(user_id, email, draft, self.clock.utc())?;
        self.tickets.insert(&ticket).await?;
        Ok(ticket)
    }

    pub async fn list_mine(&self, user_id: &UserId) -> Result<Vec<SupportTicket>, Error> {
        Ok(self.tickets.list_for_user(user_id).await?)
    }

    /// Admin listing, newest first.
    pub async fn list(
        &self,
        status: Option<TicketStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<SupportTicket>, Error> {
        Ok(self.tickets.list(status, offset, limit).await?)
    }

    /// Admin status change; the ticket owner is notified when known.
    pub async fn update_status(
        &self,
        admin_id: UserId,
        id: &TicketId,
        status: TicketStatus,
        note: Option<&str>,
    ) -> Result<SupportTicket, Error> {
        let now = self.clock.utc();
        let mut ticket = self
            .tickets
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("ticket not found"))?;
        ticket.update_status(status, note, now)?;
        self.tickets.update(&ticket).await?;
        let entry = AuditEntry::new(
            Some(admin_id),
            AuditAction::SupportTicketUpdated,
            "support_ticket",
            Some(ticket.id.to_string()),
            now,
        )
        .with_details(json!({ "status": status }));
        self.audit.record(&entry).await?;
        if let Some(owner) = ticket.user_id {
            self.notifier
                .notify(
                    owner,
                    NotificationContent::new(
                        NotificationKind::SupportUpdate,
                        "Support ticket updated",
                        format!("Your ticket \"{}\" is now {status}.", ticket.subject),
                    ),
                )
                .await?;
        }
        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{ErrorCode, TicketCategory};
    use crate::test_support::TestWorld;
    use chrono::Utc;

    fn draft() -> TicketDraft {
        TicketDraft {
            subject: "Cannot book".into(),
            message: "The booking page shows no slots at all.".into(),
            category: TicketCategory::Meetings,
        }
    }

    #[tokio::test]
    async fn anonymous_tickets_need_an_email() {
        let world = TestWorld::new(Utc::now());
        let err = world
            .services
            .support
            .submit(None, None, draft())
            .await
            .expect_err("missing email");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn signed_in_tickets_use_the_account_email_and_notify_on_update() {
        let world = TestWorld::new(Utc::now());
        let student = world.seed_student("tobi@example.org", "Tobi Bello").await;
        let admin = world.seed_admin("admin@edumeetup.example").await;
        let support = &world.services.support;

        let ticket = support
            .submit(Some(&student.authenticated()), None, draft())
            .await
            .expect("ticket");
        assert_eq!(ticket.email, student.email);
        assert_eq!(
            support.list_mine(&student.id).await.expect("mine").len(),
            1
        );

        let updated = support
            .update_status(admin.id, &ticket.id, TicketStatus::Resolved, Some("Fixed"))
            .await
            .expect("updated");
        assert_eq!(updated.admin_note.as_deref(), Some("Fixed"));
        let notifications = world.db.notifications_for(&student.id);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::SupportUpdate);
    }
}
