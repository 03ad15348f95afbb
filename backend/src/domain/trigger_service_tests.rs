//! Tests for the reminder triggers.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};

use crate::domain::{
    AuditAction, AvailabilityDraft, AvailabilitySlot, BookingRequest, CronSecret, Meeting,
    MeetingPurpose, TriggerReport, UniversityProfile, User, VerificationStatus, Weekday,
};
use crate::test_support::TestWorld;

/// Monday 2 March 2026, 06:00 UTC.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0)
        .single()
        .expect("fixture time")
}

struct Scenario {
    world: TestWorld,
    owner: User,
    university: UniversityProfile,
    student: User,
}

/// A UTC university open on Tuesdays 09:00-10:00.
#[fixture]
async fn scenario() -> Scenario {
    let world = TestWorld::new(now());
    let (owner, university) = world
        .seed_university("owner@uni.example", "Makerere University", VerificationStatus::Verified)
        .await;
    world
        .services
        .scheduling
        .set_availability(
            &owner.authenticated(),
            AvailabilityDraft {
                meeting_duration_minutes: 30,
                buffer_minutes: 0,
                min_notice_hours: 1,
                booking_window_days: 14,
                utc_offset_minutes: 0,
                is_active: true,
                slots: vec![AvailabilitySlot {
                    weekday: Weekday::Tuesday,
                    start_minute: 9 * 60,
                    end_minute: 10 * 60,
                }],
            },
        )
        .await
        .expect("availability");
    let student = world.seed_student("zawadi@example.org", "Zawadi Njeri").await;
    Scenario {
        world,
        owner,
        university,
        student,
    }
}

async fn book(s: &Scenario, day: u32) -> Meeting {
    s.world
        .services
        .scheduling
        .book(
            s.student.id,
            BookingRequest {
                university_id: s.university.id,
                starts_at: Utc
                    .with_ymd_and_hms(2026, 3, day, 9, 0, 0)
                    .single()
                    .expect("slot"),
                purpose: MeetingPurpose::Scholarships,
                program_id: None,
                note: None,
            },
        )
        .await
        .expect("booked")
}

fn markers(world: &TestWorld, kind: &str) -> usize {
    world
        .db
        .audit_entries()
        .iter()
        .filter(|e| e.action == AuditAction::TriggerSent && e.entity_type == kind)
        .count()
}

#[rstest]
#[tokio::test]
async fn nothing_is_due_right_after_booking(#[future] scenario: Scenario) {
    let s = scenario.await;
    book(&s, 3).await;
    let report = s.world.services.triggers.run().await.expect("run");
    assert_eq!(report, TriggerReport::default());
}

#[rstest]
#[tokio::test]
async fn confirmed_meetings_get_one_reminder(#[future] scenario: Scenario) {
    let s = scenario.await;
    let meeting = book(&s, 3).await;
    s.world
        .services
        .scheduling
        .confirm(&s.owner.authenticated(), &meeting.id, None)
        .await
        .expect("confirmed");
    s.world.clock.advance(Duration::hours(4));

    let first = s.world.services.triggers.run().await.expect("run");
    assert_eq!(first.meeting_reminders, 1);
    assert!(
        s.world
            .email
            .sent()
            .iter()
            .any(|m| m.to == s.student.email && m.subject.starts_with("Reminder"))
    );

    let second = s.world.services.triggers.run().await.expect("rerun");
    assert_eq!(second.meeting_reminders, 0);
    assert_eq!(markers(&s.world, "meeting_reminder"), 1);
}

#[rstest]
#[tokio::test]
async fn each_run_records_a_summary(#[future] scenario: Scenario) {
    let s = scenario.await;
    s.world.clock.advance(Duration::hours(73));
    s.world.services.triggers.run().await.expect("run");
    s.world.services.triggers.run().await.expect("rerun");

    let summaries: Vec<_> = s
        .world
        .db
        .system_logs()
        .into_iter()
        .filter(|entry| entry.source == "cron_triggers")
        .collect();
    assert_eq!(summaries.len(), 2);
    let nudges: Vec<_> = summaries
        .iter()
        .filter_map(|entry| entry.context.as_ref())
        .map(|context| context["incompleteProfileNudges"].clone())
        .collect();
    assert_eq!(nudges, [serde_json::json!(1), serde_json::json!(0)]);
}

#[rstest]
#[tokio::test]
async fn stale_requests_nudge_the_owner(#[future] scenario: Scenario) {
    let s = scenario.await;
    book(&s, 10).await;
    s.world.clock.advance(Duration::hours(49));

    let report = s.world.services.triggers.run().await.expect("run");
    assert_eq!(report.pending_request_nudges, 1);
    assert!(s.world.email.sent().iter().any(|m| m.to == s.owner.email));
}

#[rstest]
#[tokio::test]
async fn failed_emails_are_retried_next_run(#[future] scenario: Scenario) {
    let s = scenario.await;
    s.world.clock.advance(Duration::hours(73));

    s.world.email.set_failing(true);
    let failed = s.world.services.triggers.run().await.expect("run");
    assert_eq!(failed.incomplete_profile_nudges, 0);
    assert_eq!(markers(&s.world, "incomplete_profile"), 0);

    s.world.email.set_failing(false);
    let retried = s.world.services.triggers.run().await.expect("rerun");
    assert_eq!(retried.incomplete_profile_nudges, 1);
    assert_eq!(markers(&s.world, "incomplete_profile"), 1);
}

#[rstest]
#[case("s3cret-token", true)]
#[case("s3cret-tokem", false)]
#[case("", false)]
fn cron_secret_comparison(#[case] presented: &str, #[case] expected: bool) {
    let secret = CronSecret::new("s3cret-token").expect("configured");
    assert_eq!(secret.verify(presented), expected);
}

#[rstest]
fn blank_cron_secret_is_unconfigured() {
    assert!(CronSecret::new("   ").is_none());
}
