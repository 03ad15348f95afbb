//! Tests for deletion requests and the sweep.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rstest::{fixture, rstest};

use crate::domain::ports::{
    MeetingRepository, MockMeetingRepository, MockUserRepository, RepositoryError, UserRepository,
};
use crate::domain::{
    AuditAction, AvailabilityDraft, AvailabilitySlot, BookingRequest, CurrentStatus,
    DegreeLevel, ErrorCode, Meeting, MeetingPurpose, MeetingStatus, NotificationKind,
    ServicePorts, ServiceSettings, Services, StudentProfileDraft, UploadKind, User,
    VerificationStatus, Weekday,
};
use crate::test_support::{PlainTextHasher, TestWorld};

/// Monday 2 March 2026, 06:00 UTC.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0)
        .single()
        .expect("fixture time")
}

struct Scenario {
    world: TestWorld,
    owner: User,
    student: User,
    meeting: Meeting,
}

/// A student with an uploaded CV and a pending meeting the next day.
#[fixture]
async fn scenario() -> Scenario {
    let world = TestWorld::new(now());
    let (owner, university) = world
        .seed_university("owner@uni.example", "Ashesi University", VerificationStatus::Verified)
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

    let student = world.seed_student("kofi@example.org", "Kofi Mensah").await;
    world
        .services
        .students
        .upsert_profile(
            student.id,
            StudentProfileDraft {
                country: "Ghana".into(),
                city: Some("Accra".into()),
                current_status: CurrentStatus::HighSchool,
                field_of_interest: "Computer science".into(),
                preferred_degree: DegreeLevel::Bachelors,
                budget_range: None,
                phone: None,
            },
        )
        .await
        .expect("profile");
    world
        .services
        .uploads
        .upload(
            &student.authenticated(),
            UploadKind::Cv,
            Some("application/pdf"),
            b"%PDF-1.7",
        )
        .await
        .expect("cv");

    let meeting = world
        .services
        .scheduling
        .book(
            student.id,
            BookingRequest {
                university_id: university.id,
                starts_at: Utc
                    .with_ymd_and_hms(2026, 3, 3, 9, 0, 0)
                    .single()
                    .expect("slot"),
                purpose: MeetingPurpose::Admissions,
                program_id: None,
                note: None,
            },
        )
        .await
        .expect("booked");
    Scenario {
        world,
        owner,
        student,
        meeting,
    }
}

#[rstest]
#[tokio::test]
async fn request_deactivates_and_cancels_upcoming_meetings(#[future] scenario: Scenario) {
    let s = scenario.await;
    let schedule = s
        .world
        .services
        .deletion
        .request_deletion(&s.student.authenticated())
        .await
        .expect("deletion requested");
    assert_eq!(schedule.requested_at, now());
    assert_eq!(schedule.hard_delete_after, now() + Duration::days(30));

    let user = s
        .world
        .db
        .find_by_id(&s.student.id)
        .await
        .expect("lookup")
        .expect("still present");
    assert!(!user.is_active);
    assert_eq!(user.deletion_requested_at, Some(now()));

    let meeting = s
        .world
        .db
        .find(&s.meeting.id)
        .await
        .expect("lookup")
        .expect("meeting");
    assert_eq!(meeting.status, MeetingStatus::Cancelled);
    assert_eq!(meeting.cancellation_reason.as_deref(), Some("account deleted"));
    assert!(
        s.world
            .db
            .notifications_for(&s.owner.id)
            .iter()
            .any(|n| n.kind == NotificationKind::MeetingCancelled)
    );
    assert!(
        s.world
            .email
            .sent()
            .iter()
            .any(|m| m.to == s.student.email && m.subject.contains("deletion"))
    );
}

/// Services on the world's adapters with the user and meeting ports swapped.
fn services_with(
    world: &TestWorld,
    users: Arc<dyn UserRepository>,
    meetings: Arc<dyn MeetingRepository>,
) -> Services {
    let ports = ServicePorts {
        users,
        profiles: world.db.clone(),
        universities: world.db.clone(),
        programs: world.db.clone(),
        interests: world.db.clone(),
        availability: world.db.clone(),
        meetings,
        notifications: world.db.clone(),
        tickets: world.db.clone(),
        host_requests: world.db.clone(),
        audit: world.db.clone(),
        email: world.email.clone(),
        blobs: world.blobs.clone(),
        hasher: Arc::new(PlainTextHasher),
        clock: world.clock.clone(),
    };
    Services::new(&ports, &ServiceSettings::default())
}

async fn book_second_slot(s: &Scenario) -> Meeting {
    s.world
        .services
        .scheduling
        .book(
            s.student.id,
            BookingRequest {
                university_id: s.meeting.university_id,
                starts_at: Utc
                    .with_ymd_and_hms(2026, 3, 3, 9, 30, 0)
                    .single()
                    .expect("slot"),
                purpose: MeetingPurpose::Scholarships,
                program_id: None,
                note: None,
            },
        )
        .await
        .expect("second booking")
}

#[rstest]
#[tokio::test]
async fn failed_cancellation_leaves_the_account_active_for_a_retry(
    #[future] scenario: Scenario,
) {
    let s = scenario.await;
    book_second_slot(&s).await;
    let live = s.world.db.meetings();
    assert_eq!(live.len(), 2);

    let mut meetings = MockMeetingRepository::new();
    meetings
        .expect_list_for_student()
        .returning(move |_, _| Ok(live.clone()));
    let updates = Arc::new(AtomicUsize::new(0));
    let counter = updates.clone();
    meetings.expect_update().returning(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(())
        } else {
            Err(RepositoryError::query("write failed"))
        }
    });
    let failing = services_with(&s.world, s.world.db.clone(), Arc::new(meetings));

    let err = failing
        .deletion
        .request_deletion(&s.student.authenticated())
        .await
        .expect_err("second cancellation fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(updates.load(Ordering::SeqCst), 2);
    let user = s
        .world
        .db
        .find_by_id(&s.student.id)
        .await
        .expect("lookup")
        .expect("present");
    assert!(user.is_active);
    assert!(user.deletion_requested_at.is_none());

    s.world
        .services
        .deletion
        .request_deletion(&s.student.authenticated())
        .await
        .expect("retry succeeds");
    assert!(
        s.world
            .db
            .meetings()
            .iter()
            .all(|meeting| meeting.status == MeetingStatus::Cancelled)
    );
    assert!(
        s.world
            .db
            .audit_entries()
            .iter()
            .any(|entry| entry.action == AuditAction::AccountDeletionRequested)
    );
}

#[rstest]
#[tokio::test]
async fn repeated_requests_keep_the_original_schedule(#[future] scenario: Scenario) {
    let s = scenario.await;
    let deletion = &s.world.services.deletion;
    let first = deletion
        .request_deletion(&s.student.authenticated())
        .await
        .expect("first");
    s.world.clock.advance(Duration::days(3));
    let second = deletion
        .request_deletion(&s.student.authenticated())
        .await
        .expect("second");
    assert_eq!(first, second);
}

#[rstest]
#[tokio::test]
async fn deactivated_accounts_cannot_log_in(#[future] scenario: Scenario) {
    let s = scenario.await;
    s.world
        .services
        .deletion
        .request_deletion(&s.student.authenticated())
        .await
        .expect("deletion requested");
    let err = s
        .world
        .services
        .accounts
        .current_user(&s.student.id)
        .await
        .expect_err("inactive session");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let world = TestWorld::new(now());
    let admin = world.seed_admin("admin@edumeetup.example").await;
    let err = world
        .services
        .deletion
        .request_deletion(&admin.authenticated())
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn sweep_waits_for_the_grace_period(#[future] scenario: Scenario) {
    let s = scenario.await;
    let deletion = &s.world.services.deletion;
    deletion
        .request_deletion(&s.student.authenticated())
        .await
        .expect("deletion requested");

    s.world.clock.advance(Duration::days(29));
    let early = deletion.sweep(false).await.expect("sweep");
    assert_eq!(early.candidates, 0);
    assert!(
        s.world
            .db
            .find_by_id(&s.student.id)
            .await
            .expect("lookup")
            .is_some()
    );

    s.world.clock.advance(Duration::days(2));
    let report = deletion.sweep(false).await.expect("sweep");
    assert_eq!((report.candidates, report.deleted, report.failed), (1, 1, 0));
    assert!(
        s.world
            .db
            .find_by_id(&s.student.id)
            .await
            .expect("lookup")
            .is_none()
    );
    assert!(s.world.blobs.keys().is_empty());
    assert!(s.world.db.audit_entries().iter().any(|e| {
        e.action == AuditAction::AccountHardDeleted
            && e.actor_id.is_none()
            && e.entity_id.as_deref() == Some(s.student.id.to_string().as_str())
    }));
    assert!(
        s.world
            .db
            .system_logs()
            .iter()
            .any(|entry| entry.source == "deletion_sweep")
    );

    let again = deletion.sweep(false).await.expect("second sweep");
    assert_eq!(again.candidates, 0);
}

#[rstest]
#[tokio::test]
async fn dry_run_reports_without_deleting(#[future] scenario: Scenario) {
    let s = scenario.await;
    let deletion = &s.world.services.deletion;
    deletion
        .request_deletion(&s.student.authenticated())
        .await
        .expect("deletion requested");
    s.world.clock.advance(Duration::days(31));

    let report = deletion.sweep(true).await.expect("dry run");
    assert!(report.dry_run);
    assert_eq!((report.candidates, report.deleted), (1, 0));
    assert_eq!(s.world.blobs.keys().len(), 1);
}

#[rstest]
#[tokio::test]
async fn sweep_counts_only_rows_it_removed(#[future] scenario: Scenario) {
    let s = scenario.await;
    s.world
        .services
        .deletion
        .request_deletion(&s.student.authenticated())
        .await
        .expect("deletion requested");
    s.world.clock.advance(Duration::days(31));

    let requested = s
        .world
        .db
        .find_by_id(&s.student.id)
        .await
        .expect("lookup")
        .expect("present");
    let mut users = MockUserRepository::new();
    users
        .expect_list_deletion_due()
        .returning(move |_| Ok(vec![requested.clone()]));
    users.expect_delete().returning(|_| Ok(false));
    let racing = services_with(&s.world, Arc::new(users), s.world.db.clone());

    let report = racing.deletion.sweep(false).await.expect("sweep");
    assert_eq!((report.candidates, report.deleted, report.failed), (1, 0, 0));
    assert!(
        !s.world
            .db
            .audit_entries()
            .iter()
            .any(|entry| entry.action == AuditAction::AccountHardDeleted)
    );
}
