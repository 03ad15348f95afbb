//! Tests for the scheduling service.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rstest::{fixture, rstest};

use crate::domain::{
    AvailabilityDraft, AvailabilitySlot, BookingRequest, ErrorCode, MeetingPurpose,
    MeetingStatus, NotificationKind, UniversityProfile, User, VerificationStatus, Weekday,
};
use crate::test_support::TestWorld;

/// Monday 2 March 2026, 06:00 UTC.
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0)
        .single()
        .expect("fixture time")
}

fn utc(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 3, hour, minute, 0)
        .single()
        .expect("fixture time")
}

fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 3).expect("date")
}

struct Scenario {
    world: TestWorld,
    owner: User,
    university: UniversityProfile,
    student: User,
}

/// A Nairobi university (UTC+3) open on Tuesdays 09:00-11:00 local with
/// 30 minute meetings and a 15 minute buffer.
#[fixture]
async fn scenario() -> Scenario {
    let world = TestWorld::new(now());
    let (owner, university) = world
        .seed_university("owner@uni.example", "Strathmore University", VerificationStatus::Verified)
        .await;
    world
        .services
        .scheduling
        .set_availability(
            &owner.authenticated(),
            AvailabilityDraft {
                meeting_duration_minutes: 30,
                buffer_minutes: 15,
                min_notice_hours: 24,
                booking_window_days: 14,
                utc_offset_minutes: 180,
                is_active: true,
                slots: vec![AvailabilitySlot {
                    weekday: Weekday::Tuesday,
                    start_minute: 9 * 60,
                    end_minute: 11 * 60,
                }],
            },
        )
        .await
        .expect("availability saved");
    let student = world.seed_student("tobi@example.org", "Tobi Bello").await;
    Scenario {
        world,
        owner,
        university,
        student,
    }
}

fn booking(university: &UniversityProfile, starts_at: DateTime<Utc>) -> BookingRequest {
    BookingRequest {
        university_id: university.id,
        starts_at,
        purpose: MeetingPurpose::Admissions,
        program_id: None,
        note: Some("Entry requirements".into()),
    }
}

#[rstest]
#[tokio::test]
async fn open_slots_are_walked_in_local_time(#[future] scenario: Scenario) {
    let s = scenario.await;
    let slots = s
        .world
        .services
        .scheduling
        .open_slots(&s.university.id, tuesday(), tuesday())
        .await
        .expect("slots");
    let starts: Vec<_> = slots.iter().map(|w| w.starts_at).collect();
    assert_eq!(starts, vec![utc(6, 0), utc(6, 45), utc(7, 30)]);
    assert!(slots.iter().all(|w| w.ends_at - w.starts_at == Duration::minutes(30)));
}

#[rstest]
#[tokio::test]
async fn booking_removes_the_slot_and_notifies_the_owner(#[future] scenario: Scenario) {
    let s = scenario.await;
    let scheduling = &s.world.services.scheduling;
    let meeting = scheduling
        .book(s.student.id, booking(&s.university, utc(6, 0)))
        .await
        .expect("booked");
    assert_eq!(meeting.status, MeetingStatus::Pending);

    let starts: Vec<_> = scheduling
        .open_slots(&s.university.id, tuesday(), tuesday())
        .await
        .expect("slots")
        .iter()
        .map(|w| w.starts_at)
        .collect();
    assert_eq!(starts, vec![utc(6, 45), utc(7, 30)]);

    let notifications = s.world.db.notifications_for(&s.owner.id);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::MeetingRequested);
    assert!(
        s.world
            .email
            .sent()
            .iter()
            .any(|m| m.to == s.owner.email && m.subject == "New meeting request")
    );
}

#[rstest]
#[tokio::test]
async fn a_live_slot_cannot_be_booked_twice(#[future] scenario: Scenario) {
    let s = scenario.await;
    let other = s.world.seed_student("ama@example.org", "Ama Serwaa").await;
    let scheduling = &s.world.services.scheduling;
    scheduling
        .book(s.student.id, booking(&s.university, utc(6, 45)))
        .await
        .expect("first booking");
    let err = scheduling
        .book(other.id, booking(&s.university, utc(6, 45)))
        .await
        .expect_err("double booking");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn cancelling_frees_the_slot(#[future] scenario: Scenario) {
    let s = scenario.await;
    let other = s.world.seed_student("ama@example.org", "Ama Serwaa").await;
    let scheduling = &s.world.services.scheduling;
    let meeting = scheduling
        .book(s.student.id, booking(&s.university, utc(7, 30)))
        .await
        .expect("booked");
    let cancelled = scheduling
        .cancel(&s.student.authenticated(), &meeting.id, "Exam clash")
        .await
        .expect("cancelled");
    assert_eq!(cancelled.cancelled_by, Some(s.student.id));

    scheduling
        .book(other.id, booking(&s.university, utc(7, 30)))
        .await
        .expect("slot free again");
}

#[rstest]
#[tokio::test]
async fn students_cannot_hold_overlapping_meetings(#[future] scenario: Scenario) {
    let s = scenario.await;
    let (other_owner, other_university) = s
        .world
        .seed_university("other@uni.example", "Other University", VerificationStatus::Verified)
        .await;
    let scheduling = &s.world.services.scheduling;
    scheduling
        .set_availability(
            &other_owner.authenticated(),
            AvailabilityDraft {
                meeting_duration_minutes: 30,
                buffer_minutes: 0,
                min_notice_hours: 0,
                booking_window_days: 14,
                utc_offset_minutes: 0,
                is_active: true,
                slots: vec![AvailabilitySlot {
                    weekday: Weekday::Tuesday,
                    start_minute: 6 * 60,
                    end_minute: 8 * 60,
                }],
            },
        )
        .await
        .expect("availability");
    scheduling
        .book(s.student.id, booking(&s.university, utc(6, 0)))
        .await
        .expect("first");
    let err = scheduling
        .book(s.student.id, booking(&other_university, utc(6, 0)))
        .await
        .expect_err("student overlap");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn off_grid_times_are_invalid(#[future] scenario: Scenario) {
    let s = scenario.await;
    let err = s
        .world
        .services
        .scheduling
        .book(s.student.id, booking(&s.university, utc(6, 10)))
        .await
        .expect_err("not a slot");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn slot_queries_are_capped(#[future] scenario: Scenario) {
    let s = scenario.await;
    let err = s
        .world
        .services
        .scheduling
        .open_slots(&s.university.id, tuesday(), tuesday() + Duration::days(31))
        .await
        .expect_err("too wide");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn confirm_then_complete_after_the_meeting_ends(#[future] scenario: Scenario) {
    let s = scenario.await;
    let scheduling = &s.world.services.scheduling;
    let meeting = scheduling
        .book(s.student.id, booking(&s.university, utc(6, 0)))
        .await
        .expect("booked");
    let confirmed = scheduling
        .confirm(
            &s.owner.authenticated(),
            &meeting.id,
            Some("https://meet.example.org/abc"),
        )
        .await
        .expect("confirmed");
    assert_eq!(confirmed.rep_id, Some(s.owner.id));

    let early = scheduling
        .complete(&s.owner.authenticated(), &meeting.id)
        .await
        .expect_err("too early");
    assert_eq!(early.code(), ErrorCode::InvalidRequest);

    s.world.clock.set(utc(7, 0));
    let completed = scheduling
        .complete(&s.owner.authenticated(), &meeting.id)
        .await
        .expect("completed");
    assert_eq!(completed.status, MeetingStatus::Completed);
    let kinds: Vec<_> = s
        .world
        .db
        .notifications_for(&s.student.id)
        .iter()
        .map(|n| n.kind)
        .collect();
    assert!(kinds.contains(&NotificationKind::MeetingConfirmed));
    assert!(kinds.contains(&NotificationKind::MeetingCompleted));
}

#[rstest]
#[tokio::test]
async fn staff_of_other_institutions_cannot_see_the_meeting(#[future] scenario: Scenario) {
    let s = scenario.await;
    let (other_owner, _) = s
        .world
        .seed_university("other@uni.example", "Other University", VerificationStatus::Verified)
        .await;
    let meeting = s
        .world
        .services
        .scheduling
        .book(s.student.id, booking(&s.university, utc(6, 0)))
        .await
        .expect("booked");
    let err = s
        .world
        .services
        .scheduling
        .confirm(&other_owner.authenticated(), &meeting.id, None)
        .await
        .expect_err("foreign meeting");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
