//! Domain primitives, aggregates and services.
//!
//! Purpose: define the strongly typed entities shared by the HTTP and
//! persistence layers, and the services that enforce the matchmaking rules.
//! Entities are plain data; every state change goes through a method that
//! checks its transition.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User, StudentProfile, UniversityProfile, Program, Interest, Meeting,
//!   AvailabilityProfile, Notification, SupportTicket, HostRequest,
//!   AuditEntry — the persisted aggregates.
//! - `Services` — every service wired onto one set of [`ports`].

pub mod account_deletion_service;
pub mod account_service;
pub mod admin_alerts;
pub mod admin_service;
pub mod audit;
pub mod auth;
pub mod availability;
pub mod data_export_service;
pub mod email_templates;
pub mod error;
pub mod host_request;
pub mod ids;
pub mod interest;
pub mod meeting;
pub mod notification;
pub mod notification_service;
pub mod notifier;
pub mod outreach_service;
pub mod ports;
pub mod privacy;
pub mod program;
pub mod scheduling_service;
pub mod services;
pub mod staff;
pub mod student;
pub mod student_service;
pub mod support_service;
pub mod support_ticket;
pub mod trace_id;
pub mod trigger_service;
pub mod university;
pub mod university_service;
pub mod upload;
pub mod upload_service;
pub mod user;

mod text_enum;
pub(crate) mod validation;

pub use self::account_deletion_service::AccountDeletionService;
pub use self::account_service::{AccountService, StudentRegistration, UniversityRegistration};
pub use self::admin_alerts::{
    AlertKind, AlertSeverity, DashboardAlert, DashboardCounts, MILESTONES, build_alerts,
    highest_milestone,
};
pub use self::admin_service::AdminService;
pub use self::audit::{AuditAction, AuditEntry, LOG_LIST_MAX, LogLevel, SystemLogEntry};
pub use self::auth::{
    AuthenticatedUser, LoginCredentials, LoginValidationError, NewPassword, PasswordPolicyError,
};
pub use self::availability::{
    AvailabilityDraft, AvailabilityProfile, AvailabilitySlot, MAX_SLOT_QUERY_DAYS, Weekday,
};
pub use self::data_export_service::DataExportService;
pub use self::email_templates::EmailMessage;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::host_request::{
    HostRequest, HostRequestDraft, HostRequestOutreach, HostRequestStatus, OutreachInvitation,
    OutreachStatus,
};
pub use self::ids::{
    HostRequestId, InvalidIdError, MeetingId, NotificationId, OutreachId, ProgramId, TicketId,
    UniversityId, UserId,
};
pub use self::interest::{Interest, InterestChange, InterestStatus, InterestedStudent};
pub use self::meeting::{
    BookingRequest, Meeting, MeetingPurpose, MeetingStatus, TimeWindow,
};
pub use self::notification::{NOTIFICATION_LIST_MAX, Notification, NotificationKind};
pub use self::notification_service::NotificationService;
pub use self::notifier::{NotificationContent, Notifier};
pub use self::outreach_service::OutreachService;
pub use self::privacy::{
    DEFAULT_GRACE_DAYS, DataExport, DeletionSchedule, MAX_GRACE_DAYS, SweepReport,
    deletion_cutoff,
};
pub use self::program::{Program, ProgramDraft, ProgramStatus};
pub use self::scheduling_service::SchedulingService;
pub use self::services::{ServicePorts, ServiceSettings, Services};
pub use self::staff::UniversityStaff;
pub use self::student::{CurrentStatus, DegreeLevel, StudentProfile, StudentProfileDraft};
pub use self::student_service::StudentService;
pub use self::support_service::SupportService;
pub use self::support_ticket::{SupportTicket, TicketCategory, TicketDraft, TicketStatus};
pub use self::text_enum::ParseTextEnumError;
pub use self::trace_id::TraceId;
pub use self::trigger_service::{CronSecret, TriggerKind, TriggerReport, TriggerService};
pub use self::university::{
    UniversityDetail, UniversityFilter, UniversityProfile, UniversityProfileDraft,
    VerificationStatus,
};
pub use self::university_service::{CreatedRep, UniversityService};
pub use self::upload::{MAX_UPLOAD_BYTES, StoredUpload, UploadKind};
pub use self::upload_service::UploadService;
pub use self::user::{EmailAddress, FullName, Role, User, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use edumeetup::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
