//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types. Business rules live in the services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: pool and Diesel failures map to `RepositoryError`;
//!   unique violations become conflicts.
//!
//! # Example
//!
//! ```ignore
//! use edumeetup::outbound::persistence::{DbPool, PoolConfig, DieselUserRepository};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/edumeetup")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_audit_repository;
mod diesel_availability_repository;
mod diesel_error_mapping;
mod diesel_host_request_repository;
mod diesel_interest_repository;
mod diesel_meeting_repository;
mod diesel_notification_repository;
mod diesel_program_repository;
mod diesel_student_profile_repository;
mod diesel_support_ticket_repository;
mod diesel_university_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_audit_repository::DieselAuditRepository;
pub use diesel_availability_repository::DieselAvailabilityRepository;
pub use diesel_host_request_repository::DieselHostRequestRepository;
pub use diesel_interest_repository::DieselInterestRepository;
pub use diesel_meeting_repository::DieselMeetingRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_program_repository::DieselProgramRepository;
pub use diesel_student_profile_repository::DieselStudentProfileRepository;
pub use diesel_support_ticket_repository::DieselSupportTicketRepository;
pub use diesel_university_repository::DieselUniversityRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
