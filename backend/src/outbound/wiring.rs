//! Production adapter wiring shared by the server and the maintenance
//! binaries.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use crate::domain::ServicePorts;
use crate::domain::ports::EmailSender;
use crate::outbound::email::{HttpEmailConfig, HttpEmailSender, LoggingEmailSender};
use crate::outbound::persistence::{
    DbPool, DieselAuditRepository, DieselAvailabilityRepository, DieselHostRequestRepository,
    DieselInterestRepository, DieselMeetingRepository, DieselNotificationRepository,
    DieselProgramRepository, DieselStudentProfileRepository, DieselSupportTicketRepository,
    DieselUniversityRepository, DieselUserRepository,
};
use crate::outbound::security::Argon2PasswordHasher;
use crate::outbound::storage::FsBlobStore;
use crate::settings::{AppSettings, SettingsError};

/// Failure while constructing adapters.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to build email client: {0}")]
    EmailClient(#[from] reqwest::Error),
    #[error("failed to open upload directory: {0}")]
    UploadDir(#[from] std::io::Error),
}

fn email_sender(settings: &AppSettings) -> Result<Arc<dyn EmailSender>, WiringError> {
    match settings.email_api()? {
        Some(api) => {
            info!(endpoint = %api.endpoint, "sending email through the provider API");
            let config = HttpEmailConfig::new(api.endpoint, api.api_key, api.from);
            Ok(Arc::new(HttpEmailSender::new(config)?))
        }
        None => {
            warn!("email API not configured; outgoing mail is only logged");
            Ok(Arc::new(LoggingEmailSender))
        }
    }
}

/// Diesel repositories on `pool` plus the configured email, upload and
/// password hashing adapters.
pub fn postgres_service_ports(
    pool: &DbPool,
    settings: &AppSettings,
) -> Result<ServicePorts, WiringError> {
    let audit = Arc::new(DieselAuditRepository::new(pool.clone()));
    Ok(ServicePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        profiles: Arc::new(DieselStudentProfileRepository::new(pool.clone())),
        universities: Arc::new(DieselUniversityRepository::new(pool.clone())),
        programs: Arc::new(DieselProgramRepository::new(pool.clone())),
        interests: Arc::new(DieselInterestRepository::new(pool.clone())),
        availability: Arc::new(DieselAvailabilityRepository::new(pool.clone())),
        meetings: Arc::new(DieselMeetingRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        tickets: Arc::new(DieselSupportTicketRepository::new(pool.clone())),
        host_requests: Arc::new(DieselHostRequestRepository::new(pool.clone())),
        audit,
        email: email_sender(settings)?,
        blobs: Arc::new(FsBlobStore::open(settings.upload_dir())?),
        hasher: Arc::new(Argon2PasswordHasher::new()),
        clock: Arc::new(DefaultClock),
    })
}
