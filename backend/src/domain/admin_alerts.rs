//! Admin dashboard alerts derived from platform counters.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::text_enum::text_enum;

/// Thresholds reported as milestones.
pub const MILESTONES: [u64; 10] = [10, 25, 50, 100, 250, 500, 1000, 2500, 5000, 10000];

text_enum! {
    /// How urgently an admin should look at an alert.
    pub enum AlertSeverity {
        ActionRequired => "action_required",
        Info => "info",
        Milestone => "milestone",
    }
}

impl AlertSeverity {
    const fn rank(self) -> u8 {
        match self {
            Self::ActionRequired => 0,
            Self::Info => 1,
            Self::Milestone => 2,
        }
    }
}

text_enum! {
    /// What the alert is about.
    pub enum AlertKind {
        PendingVerifications => "pending_verifications",
        OpenSupportTickets => "open_support_tickets",
        PendingHostRequests => "pending_host_requests",
        OutreachResponses => "outreach_responses",
        StudentMilestone => "student_milestone",
        UniversityMilestone => "university_milestone",
        MeetingMilestone => "meeting_milestone",
    }
}

/// Raw counters gathered by the admin service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardCounts {
    pub pending_verifications: u64,
    pub open_support_tickets: u64,
    pub pending_host_requests: u64,
    /// Outreach answers received in the last seven days.
    pub recent_outreach_responses: u64,
    pub total_students: u64,
    pub verified_universities: u64,
    pub booked_meetings: u64,
}

/// One dashboard alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAlert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub count: u64,
    pub message: String,
}

/// Highest milestone reached by `value`, if any.
#[must_use]
pub fn highest_milestone(value: u64) -> Option<u64> {
    MILESTONES.iter().copied().take_while(|m| *m <= value).last()
}

/// Alerts for the given counters, action-required first. Zero counts and
/// unreached milestones are omitted.
#[must_use]
pub fn build_alerts(counts: &DashboardCounts) -> Vec<DashboardAlert> {
    let mut alerts = Vec::new();
    let mut push = |kind, severity, count: u64, message: String| {
        if count > 0 {
            alerts.push(DashboardAlert {
                kind,
                severity,
                count,
                message,
            });
        }
    };

    push(
        AlertKind::PendingVerifications,
        AlertSeverity::ActionRequired,
        counts.pending_verifications,
        format!("{} universities awaiting verification", counts.pending_verifications),
    );
    push(
        AlertKind::OpenSupportTickets,
        AlertSeverity::ActionRequired,
        counts.open_support_tickets,
        format!("{} open support tickets", counts.open_support_tickets),
    );
    push(
        AlertKind::PendingHostRequests,
        AlertSeverity::ActionRequired,
        counts.pending_host_requests,
        format!("{} campus fair requests to review", counts.pending_host_requests),
    );
    push(
        AlertKind::OutreachResponses,
        AlertSeverity::Info,
        counts.recent_outreach_responses,
        format!(
            "{} outreach responses in the last 7 days",
            counts.recent_outreach_responses
        ),
    );
    for (kind, value, noun) in [
        (AlertKind::StudentMilestone, counts.total_students, "students registered"),
        (
            AlertKind::UniversityMilestone,
            counts.verified_universities,
            "verified universities",
        ),
        (AlertKind::MeetingMilestone, counts.booked_meetings, "meetings booked"),
    ] {
        if let Some(milestone) = highest_milestone(value) {
            push(
                kind,
                AlertSeverity::Milestone,
                milestone,
                format!("{milestone}+ {noun}"),
            );
        }
    }

    alerts.sort_by_key(|alert| alert.severity.rank());
    alerts
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, None)]
    #[case(9, None)]
    #[case(10, Some(10))]
    #[case(99, Some(50))]
    #[case(10_000, Some(10_000))]
    #[case(123_456, Some(10_000))]
    fn milestone_lookup(#[case] value: u64, #[case] expected: Option<u64>) {
        assert_eq!(highest_milestone(value), expected);
    }

    #[rstest]
    fn zero_counts_produce_no_alerts() {
        assert!(build_alerts(&DashboardCounts::default()).is_empty());
    }

    #[rstest]
    fn action_required_alerts_come_first() {
        let counts = DashboardCounts {
            pending_verifications: 2,
            recent_outreach_responses: 1,
            total_students: 30,
            booked_meetings: 5,
            ..DashboardCounts::default()
        };
        let alerts = build_alerts(&counts);
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AlertKind::PendingVerifications,
                AlertKind::OutreachResponses,
                AlertKind::StudentMilestone,
            ]
        );
        assert_eq!(alerts[2].count, 25);
        assert_eq!(alerts[2].message, "25+ students registered");
    }
}
