//! Driven ports for the hexagonal boundary.
//!
//! Repositories share [`RepositoryError`]; the email, blob and password ports
//! carry their own error enums generated by `define_port_error!`.

mod macros;
pub(crate) use macros::define_port_error;

mod audit_repository;
mod availability_repository;
mod blob_store;
mod email_sender;
mod host_request_repository;
mod interest_repository;
mod meeting_repository;
mod notification_repository;
mod password_hasher;
mod program_repository;
mod repository_error;
mod student_profile_repository;
mod support_ticket_repository;
mod university_repository;
mod user_repository;

pub use audit_repository::AuditRepository;
#[cfg(test)]
pub use audit_repository::MockAuditRepository;
pub use availability_repository::AvailabilityRepository;
#[cfg(test)]
pub use availability_repository::MockAvailabilityRepository;
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError};
#[cfg(test)]
pub use email_sender::MockEmailSender;
pub use email_sender::{EmailError, EmailSender};
pub use host_request_repository::HostRequestRepository;
#[cfg(test)]
pub use host_request_repository::MockHostRequestRepository;
pub use interest_repository::InterestRepository;
#[cfg(test)]
pub use interest_repository::MockInterestRepository;
pub use meeting_repository::MeetingRepository;
#[cfg(test)]
pub use meeting_repository::MockMeetingRepository;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::NotificationRepository;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use program_repository::MockProgramRepository;
pub use program_repository::ProgramRepository;
pub use repository_error::RepositoryError;
#[cfg(test)]
pub use student_profile_repository::MockStudentProfileRepository;
pub use student_profile_repository::StudentProfileRepository;
#[cfg(test)]
pub use support_ticket_repository::MockSupportTicketRepository;
pub use support_ticket_repository::SupportTicketRepository;
#[cfg(test)]
pub use university_repository::MockUniversityRepository;
pub use university_repository::UniversityRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{AccountMembership, NewAccount, StoredCredentials, UserRepository};
