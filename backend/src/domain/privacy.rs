//! Personal data export and account deletion types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    Error, Interest, Meeting, Notification, StudentProfile, SupportTicket, UniversityProfile, User,
};

/// Default interval between a deletion request and the hard delete.
pub const DEFAULT_GRACE_DAYS: u32 = 30;
/// Longest grace period the settings accept (about ten years).
pub const MAX_GRACE_DAYS: u32 = 3650;

/// Everything stored about a user, returned by `GET /api/my-data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataExport {
    pub exported_at: DateTime<Utc>,
    pub user: User,
    pub student_profile: Option<StudentProfile>,
    pub university: Option<UniversityProfile>,
    pub interests: Vec<Interest>,
    pub meetings: Vec<Meeting>,
    pub notifications: Vec<Notification>,
    pub support_tickets: Vec<SupportTicket>,
}

/// When a requested deletion becomes final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletionSchedule {
    pub requested_at: DateTime<Utc>,
    pub hard_delete_after: DateTime<Utc>,
}

impl DeletionSchedule {
    /// Schedule derived from the request time and grace period.
    ///
    /// # Errors
    /// Returns an internal error when the end of the grace period is not a
    /// representable timestamp.
    pub fn new(requested_at: DateTime<Utc>, grace_days: u32) -> Result<Self, Error> {
        let hard_delete_after = grace_period(grace_days)
            .and_then(|grace| requested_at.checked_add_signed(grace))
            .ok_or_else(|| out_of_range(grace_days))?;
        Ok(Self {
            requested_at,
            hard_delete_after,
        })
    }
}

/// Accounts requested before this instant are due for hard deletion.
///
/// # Errors
/// Returns an internal error when the cutoff is not a representable
/// timestamp.
pub fn deletion_cutoff(now: DateTime<Utc>, grace_days: u32) -> Result<DateTime<Utc>, Error> {
    grace_period(grace_days)
        .and_then(|grace| now.checked_sub_signed(grace))
        .ok_or_else(|| out_of_range(grace_days))
}

fn grace_period(grace_days: u32) -> Option<Duration> {
    Duration::try_days(i64::from(grace_days))
}

fn out_of_range(grace_days: u32) -> Error {
    Error::internal(format!("deletion grace period of {grace_days} days is out of range"))
}

/// Summary of one deletion sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub candidates: usize,
    pub deleted: usize,
    pub failed: usize,
    pub dry_run: bool,
}
