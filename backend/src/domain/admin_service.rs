//! Administrator moderation and dashboards.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::email_templates;
use crate::domain::ports::{
    AuditRepository, HostRequestRepository, MeetingRepository, SupportTicketRepository,
    UniversityRepository, UserRepository,
};
use crate::domain::{
    AuditAction, AuditEntry, DashboardAlert, DashboardCounts, Error, HostRequestStatus,
    LOG_LIST_MAX, NotificationContent, NotificationKind, Notifier, Role, SystemLogEntry,
    TicketStatus, UniversityId, UniversityProfile, UserId, VerificationStatus, build_alerts,
};

const OUTREACH_RESPONSE_WINDOW_DAYS: i64 = 7;

/// Admin-only operations.
#[derive(Clone)]
pub struct AdminService {
    users: Arc<dyn UserRepository>,
    universities: Arc<dyn UniversityRepository>,
    tickets: Arc<dyn SupportTicketRepository>,
    host_requests: Arc<dyn HostRequestRepository>,
    meetings: Arc<dyn MeetingRepository>,
    audit: Arc<dyn AuditRepository>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
}

impl AdminService {
    /// Wire the service onto its ports.
    #[expect(
        clippy::too_many_arguments,
        reason = "flat constructor taking one port per field"
    )]
    pub fn new(
        users: Arc<dyn UserRepository>,
        universities: Arc<dyn UniversityRepository>,
        tickets: Arc<dyn SupportTicketRepository>,
        host_requests: Arc<dyn HostRequestRepository>,
        meetings: Arc<dyn MeetingRepository>,
        audit: Arc<dyn AuditRepository>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            universities,
            tickets,
            host_requests,
            meetings,
            audit,
            notifier,
            clock,
        }
    }

    /// Universities in a verification state, oldest registration first.
    pub async fn list_universities(
        &self,
        status: Option<VerificationStatus>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<UniversityProfile>, Error> {
        Ok(self
            .universities
            .list_by_status(status, offset, limit)
            .await?)
    }

    async fn university(&self, id: &UniversityId) -> Result<UniversityProfile, Error> {
        self.universities
            .find(id)
            .await?
            .ok_or_else(|| Error::not_found("university not found"))
    }

    pub async fn verify_university(
        &self,
        admin_id: UserId,
        id: &UniversityId,
    ) -> Result<UniversityProfile, Error> {
        let now = self.clock.utc();
        let mut university = self.university(id).await?;
        university.verify(now)?;
        self.universities.update(&university).await?;
        self.record(admin_id, AuditAction::UniversityVerified, &university, None)
            .await?;
        info!(university_id = %university.id, "university verified");

        self.notifier
            .notify(
                university.owner_user_id,
                NotificationContent::new(
                    NotificationKind::VerificationApproved,
                    "Institution verified",
                    format!("{} is now verified.", university.institution_name),
                ),
            )
            .await?;
        if let Some(owner) = self.users.find_by_id(&university.owner_user_id).await? {
            self.notifier
                .email(email_templates::verification_approved(
                    &owner.email,
                    &university.institution_name,
                ))
                .await;
        }
        Ok(university)
    }

    pub async fn reject_university(
        &self,
        admin_id: UserId,
        id: &UniversityId,
        reason: &str,
    ) -> Result<UniversityProfile, Error> {
        let mut university = self.university(id).await?;
        university.reject(reason)?;
        self.universities.update(&university).await?;
        let reason = university.rejection_reason.clone().unwrap_or_default();
        self.record(
            admin_id,
            AuditAction::UniversityRejected,
            &university,
            Some(reason.as_str()),
        )
        .await?;
        info!(university_id = %university.id, "university rejected");

        self.notifier
            .notify(
                university.owner_user_id,
                NotificationContent::new(
                    NotificationKind::VerificationRejected,
                    "Verification rejected",
                    reason.clone(),
                ),
            )
            .await?;
        if let Some(owner) = self.users.find_by_id(&university.owner_user_id).await? {
            self.notifier
                .email(email_templates::verification_rejected(
                    &owner.email,
                    &university.institution_name,
                    &reason,
                ))
                .await;
        }
        Ok(university)
    }

    async fn record(
        &self,
        admin_id: UserId,
        action: AuditAction,
        university: &UniversityProfile,
        reason: Option<&str>,
    ) -> Result<(), Error> {
        let mut entry = AuditEntry::new(
            Some(admin_id),
            action,
            "university",
            Some(university.id.to_string()),
            self.clock.utc(),
        );
        if let Some(reason) = reason {
            entry = entry.with_details(json!({ "reason": reason }));
        }
        self.audit.record(&entry).await?;
        Ok(())
    }

    /// Counters feeding the dashboard alerts.
    pub async fn dashboard_counts(&self) -> Result<DashboardCounts, Error> {
        let since = self.clock.utc() - Duration::days(OUTREACH_RESPONSE_WINDOW_DAYS);
        Ok(DashboardCounts {
            pending_verifications: self
                .universities
                .count_by_status(VerificationStatus::Pending)
                .await?,
            open_support_tickets: self.tickets.count_by_status(TicketStatus::Open).await?,
            pending_host_requests: self
                .host_requests
                .count_by_status(HostRequestStatus::Pending)
                .await?,
            recent_outreach_responses: self.host_requests.count_responses_since(since).await?,
            total_students: self.users.count_by_role(Role::Student).await?,
            verified_universities: self
                .universities
                .count_by_status(VerificationStatus::Verified)
                .await?,
            booked_meetings: self.meetings.count().await?,
        })
    }

    /// Alerts and milestones for the admin dashboard.
    pub async fn dashboard_alerts(&self) -> Result<Vec<DashboardAlert>, Error> {
        Ok(build_alerts(&self.dashboard_counts().await?))
    }

    /// Newest audit entries first; `limit` is clamped to `1..=LOG_LIST_MAX`.
    pub async fn list_audit_logs(&self, limit: u32) -> Result<Vec<AuditEntry>, Error> {
        Ok(self.audit.list(limit.clamp(1, LOG_LIST_MAX)).await?)
    }

    /// Newest system log rows first, clamped like [`Self::list_audit_logs`].
    pub async fn list_system_logs(&self, limit: u32) -> Result<Vec<SystemLogEntry>, Error> {
        Ok(self.audit.list_system(limit.clamp(1, LOG_LIST_MAX)).await?)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{AlertKind, ErrorCode, LoginCredentials};
    use crate::test_support::{TestWorld, TEST_PASSWORD};
    use chrono::Utc;

    #[tokio::test]
    async fn verification_notifies_and_emails_the_owner() {
        let world = TestWorld::new(Utc::now());
        let admin = world.seed_admin("admin@edumeetup.example").await;
        let (owner, university) = world
            .seed_university("owner@uni.example", "Ashesi University", VerificationStatus::Pending)
            .await;

        let verified = world
            .services
            .admin
            .verify_university(admin.id, &university.id)
            .await
            .expect("verified");
        assert!(verified.is_verified());
        assert!(verified.verified_at.is_some());
        assert_eq!(
            world.db.notifications_for(&owner.id)[0].kind,
            NotificationKind::VerificationApproved
        );
        assert!(world.email.sent().iter().any(|m| m.to == owner.email));
        assert!(
            world
                .db
                .audit_entries()
                .iter()
                .any(|e| e.action == AuditAction::UniversityVerified)
        );
    }

    #[tokio::test]
    async fn rejected_owner_can_no_longer_log_in() {
        let world = TestWorld::new(Utc::now());
        let admin = world.seed_admin("admin@edumeetup.example").await;
        let (_, university) = world
            .seed_university("owner@uni.example", "Ashesi University", VerificationStatus::Pending)
            .await;
        world
            .services
            .admin
            .reject_university(admin.id, &university.id, "Accreditation not found")
            .await
            .expect("rejected");
        let err = world
            .services
            .accounts
            .login(
                &LoginCredentials::try_from_parts("owner@uni.example", TEST_PASSWORD)
                    .expect("credentials"),
            )
            .await
            .expect_err("rejected login");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn verifying_twice_is_invalid() {
        let world = TestWorld::new(Utc::now());
        let admin = world.seed_admin("admin@edumeetup.example").await;
        let (_, university) = world
            .seed_university("owner@uni.example", "Ashesi University", VerificationStatus::Verified)
            .await;
        let err = world
            .services
            .admin
            .verify_university(admin.id, &university.id)
            .await
            .expect_err("already verified");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn alerts_reflect_pending_work() {
        let world = TestWorld::new(Utc::now());
        for index in 0..2 {
            world
                .seed_university(
                    &format!("owner{index}@uni.example"),
                    "Pending University",
                    VerificationStatus::Pending,
                )
                .await;
        }
        let alerts = world
            .services
            .admin
            .dashboard_alerts()
            .await
            .expect("alerts");
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::PendingVerifications);
        assert_eq!(alerts[0].count, 2);
    }
}
