//! Tests for the outreach service.

use chrono::{TimeZone, Utc};

use crate::domain::{
    EmailAddress, ErrorCode, FullName, HostRequest, HostRequestDraft, HostRequestStatus,
    NotificationKind, OutreachStatus, User, VerificationStatus,
};
use crate::test_support::TestWorld;

fn world() -> TestWorld {
    TestWorld::new(
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0)
            .single()
            .expect("fixture time"),
    )
}

fn draft() -> HostRequestDraft {
    HostRequestDraft {
        organization_name: "Alliance High School".into(),
        contact_name: FullName::new("Grace Njeri").expect("name"),
        contact_email: EmailAddress::new("grace@alliance.example").expect("email"),
        city: "Kikuyu".into(),
        country: "Kenya".into(),
        expected_students: 400,
        preferred_dates: Some("Late September".into()),
        message: None,
    }
}

async fn approved_request(world: &TestWorld, admin: &User) -> HostRequest {
    let outreach = &world.services.outreach;
    let request = outreach
        .submit_host_request(draft())
        .await
        .expect("submitted");
    outreach
        .update_host_request_status(admin.id, &request.id, HostRequestStatus::Approved)
        .await
        .expect("approved")
}

#[tokio::test]
async fn outreach_requires_an_approved_request() {
    let world = world();
    let admin = world.seed_admin("admin@edumeetup.example").await;
    let (_, university) = world
        .seed_university("owner@uni.example", "Kenyatta University", VerificationStatus::Verified)
        .await;
    let request = world
        .services
        .outreach
        .submit_host_request(draft())
        .await
        .expect("submitted");
    let err = world
        .services
        .outreach
        .send_outreach(admin.id, &request.id, &[university.id], None)
        .await
        .expect_err("pending request");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn unverified_targets_are_named() {
    let world = world();
    let admin = world.seed_admin("admin@edumeetup.example").await;
    let request = approved_request(&world, &admin).await;
    let (_, verified) = world
        .seed_university("owner@uni.example", "Kenyatta University", VerificationStatus::Verified)
        .await;
    let (_, pending) = world
        .seed_university("p@uni.example", "Pending College", VerificationStatus::Pending)
        .await;
    let err = world
        .services
        .outreach
        .send_outreach(admin.id, &request.id, &[verified.id, pending.id], None)
        .await
        .expect_err("unverified target");
    let details = err.details().expect("details");
    assert_eq!(details["universityIds"][0], pending.id.to_string());
}

#[tokio::test]
async fn repeat_outreach_skips_invited_universities() {
    let world = world();
    let admin = world.seed_admin("admin@edumeetup.example").await;
    let request = approved_request(&world, &admin).await;
    let (owner, first) = world
        .seed_university("owner@uni.example", "Kenyatta University", VerificationStatus::Verified)
        .await;
    let (_, second) = world
        .seed_university("two@uni.example", "Moi University", VerificationStatus::Verified)
        .await;
    let outreach = &world.services.outreach;

    let sent = outreach
        .send_outreach(admin.id, &request.id, &[first.id], Some("Join us"))
        .await
        .expect("first batch");
    assert_eq!(sent.len(), 1);
    let again = outreach
        .send_outreach(admin.id, &request.id, &[first.id, second.id], None)
        .await
        .expect("second batch");
    assert_eq!(again.len(), 1);
    assert_eq!(again[0].university_id, second.id);

    let notifications = world.db.notifications_for(&owner.id);
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::OutreachReceived);
    assert!(
        world
            .email
            .sent()
            .iter()
            .any(|m| m.to == owner.email && m.text_body.contains("Join us"))
    );
}

#[tokio::test]
async fn invitations_are_answered_once_and_notify_the_sender() {
    let world = world();
    let admin = world.seed_admin("admin@edumeetup.example").await;
    let request = approved_request(&world, &admin).await;
    let (owner, university) = world
        .seed_university("owner@uni.example", "Kenyatta University", VerificationStatus::Verified)
        .await;
    let outreach = &world.services.outreach;
    outreach
        .send_outreach(admin.id, &request.id, &[university.id], None)
        .await
        .expect("sent");

    let invitations = outreach
        .list_outreach(&owner.authenticated())
        .await
        .expect("list");
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].host_request.id, request.id);
    let id = invitations[0].outreach.id;

    let answered = outreach
        .respond_outreach(&owner.authenticated(), &id, true, Some("We will attend"))
        .await
        .expect("accepted");
    assert_eq!(answered.status, OutreachStatus::Accepted);
    let err = outreach
        .respond_outreach(&owner.authenticated(), &id, false, None)
        .await
        .expect_err("second answer");
    assert_eq!(err.code(), ErrorCode::Conflict);

    let admin_notes = world.db.notifications_for(&admin.id);
    assert_eq!(admin_notes.len(), 1);
    assert_eq!(admin_notes[0].kind, NotificationKind::OutreachResponded);
}

#[tokio::test]
async fn host_request_transitions_are_enforced() {
    let world = world();
    let admin = world.seed_admin("admin@edumeetup.example").await;
    let request = world
        .services
        .outreach
        .submit_host_request(draft())
        .await
        .expect("submitted");
    let err = world
        .services
        .outreach
        .update_host_request_status(admin.id, &request.id, HostRequestStatus::Completed)
        .await
        .expect_err("pending cannot complete");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
