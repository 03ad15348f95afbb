//! Construction of every domain service from one set of driven ports.
//!
//! Both the HTTP server and the in-memory test world go through
//! [`Services::new`], so they share exactly the same wiring.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AuditRepository, AvailabilityRepository, BlobStore, EmailSender, HostRequestRepository,
    InterestRepository, MeetingRepository, NotificationRepository, PasswordHasher,
    ProgramRepository, StudentProfileRepository, SupportTicketRepository, UniversityRepository,
    UserRepository,
};
use crate::domain::{
    AccountDeletionService, AccountService, AdminService, DEFAULT_GRACE_DAYS, DataExportService,
    NotificationService, Notifier, OutreachService, SchedulingService, StudentService,
    SupportService, TriggerService, UniversityService, UploadService,
};

/// Adapters the services depend on.
#[derive(Clone)]
pub struct ServicePorts {
    pub users: Arc<dyn UserRepository>,
    pub profiles: Arc<dyn StudentProfileRepository>,
    pub universities: Arc<dyn UniversityRepository>,
    pub programs: Arc<dyn ProgramRepository>,
    pub interests: Arc<dyn InterestRepository>,
    pub availability: Arc<dyn AvailabilityRepository>,
    pub meetings: Arc<dyn MeetingRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub tickets: Arc<dyn SupportTicketRepository>,
    pub host_requests: Arc<dyn HostRequestRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub email: Arc<dyn EmailSender>,
    pub blobs: Arc<dyn BlobStore>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
}

/// Tunables shared by several services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Days between a deletion request and the hard delete.
    pub grace_days: u32,
    /// Public origin used in links inside emails, without a trailing slash.
    pub public_base_url: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            grace_days: DEFAULT_GRACE_DAYS,
            public_base_url: "http://localhost:8080".to_owned(),
        }
    }
}

impl ServiceSettings {
    fn login_url(&self) -> String {
        format!("{}/login", self.public_base_url.trim_end_matches('/'))
    }
}

/// Every domain service, ready to be shared across workers.
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub students: StudentService,
    pub universities: UniversityService,
    pub scheduling: SchedulingService,
    pub notifications: NotificationService,
    pub support: SupportService,
    pub outreach: OutreachService,
    pub admin: AdminService,
    pub data_export: DataExportService,
    pub deletion: AccountDeletionService,
    pub triggers: TriggerService,
    pub uploads: UploadService,
}

impl Services {
    /// Wire the services onto `ports`.
    #[must_use]
    pub fn new(ports: &ServicePorts, settings: &ServiceSettings) -> Self {
        let p = ports;
        let notifier = Notifier::new(
            p.notifications.clone(),
            p.email.clone(),
            p.audit.clone(),
            p.clock.clone(),
        );
        let scheduling = SchedulingService::new(
            p.users.clone(),
            p.universities.clone(),
            p.programs.clone(),
            p.availability.clone(),
            p.meetings.clone(),
            p.audit.clone(),
            notifier.clone(),
            p.clock.clone(),
        );
        Self {
            accounts: AccountService::new(
                p.users.clone(),
                p.universities.clone(),
                p.hasher.clone(),
                p.audit.clone(),
                notifier.clone(),
                p.clock.clone(),
            ),
            students: StudentService::new(
                p.profiles.clone(),
                p.universities.clone(),
                p.programs.clone(),
                p.interests.clone(),
                notifier.clone(),
                p.clock.clone(),
            ),
            universities: UniversityService::new(
                p.users.clone(),
                p.universities.clone(),
                p.programs.clone(),
                p.interests.clone(),
                p.hasher.clone(),
                p.audit.clone(),
                notifier.clone(),
                p.clock.clone(),
                settings.login_url(),
            ),
            notifications: NotificationService::new(p.notifications.clone(), p.clock.clone()),
            support: SupportService::new(
                p.tickets.clone(),
                p.users.clone(),
                p.audit.clone(),
                notifier.clone(),
                p.clock.clone(),
            ),
            outreach: OutreachService::new(
                p.host_requests.clone(),
                p.universities.clone(),
                p.users.clone(),
                p.audit.clone(),
                notifier.clone(),
                p.clock.clone(),
            ),
            admin: AdminService::new(
                p.users.clone(),
                p.universities.clone(),
                p.tickets.clone(),
                p.host_requests.clone(),
                p.meetings.clone(),
                p.audit.clone(),
                notifier.clone(),
                p.clock.clone(),
            ),
            data_export: DataExportService::new(
                p.users.clone(),
                p.profiles.clone(),
                p.universities.clone(),
                p.interests.clone(),
                p.meetings.clone(),
                p.notifications.clone(),
                p.tickets.clone(),
                p.audit.clone(),
                p.clock.clone(),
            ),
            deletion: AccountDeletionService::new(
                p.users.clone(),
                p.profiles.clone(),
                p.universities.clone(),
                p.meetings.clone(),
                p.blobs.clone(),
                p.audit.clone(),
                scheduling.clone(),
                notifier.clone(),
                p.clock.clone(),
                settings.grace_days,
            ),
            triggers: TriggerService::new(
                p.users.clone(),
                p.universities.clone(),
                p.meetings.clone(),
                p.audit.clone(),
                notifier,
                p.clock.clone(),
            ),
            uploads: UploadService::new(
                p.profiles.clone(),
                p.universities.clone(),
                p.blobs.clone(),
                p.clock.clone(),
            ),
            scheduling,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn login_url_ignores_trailing_slash() {
        let settings = ServiceSettings {
            grace_days: 30,
            public_base_url: "https://edumeetup.example/".into(),
        };
        assert_eq!(settings.login_url(), "https://edumeetup.example/login");
    }
}
