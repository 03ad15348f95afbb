//! Administrator moderation and the campus fair outreach flow over HTTP.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use edumeetup::domain::{AuditAction, VerificationStatus};

#[allow(dead_code)]
mod support;

use support::{login_request, session_cookie, test_app, world_and_state};

#[rstest]
#[case("/api/v1/admin/universities")]
#[case("/api/v1/admin/host-requests")]
#[case("/api/v1/admin/support/tickets")]
#[case("/api/v1/admin/alerts")]
#[case("/api/v1/admin/audit-logs")]
#[case("/api/v1/admin/system-logs")]
#[actix_web::test]
async fn admin_routes_reject_other_roles(#[case] uri: &str) {
    let (world, state) = world_and_state();
    world.seed_student("tobi@example.org", "Tobi Bello").await;
    let app = test::init_service(test_app(state)).await;

    let anonymous =
        test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let student = session_cookie(
        &test::call_service(&app, login_request("tobi@example.org").to_request()).await,
    );
    let res = test::call_service(
        &app,
        test::TestRequest::get().uri(uri).cookie(student).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_verifies_a_pending_university_and_it_is_audited() {
    let (world, state) = world_and_state();
    world.seed_admin("admin@edumeetup.example").await;
    let (_owner, university) = world
        .seed_university("owner@uni.example", "Lakeside University", VerificationStatus::Pending)
        .await;
    let app = test::init_service(test_app(state)).await;
    let admin = session_cookie(
        &test::call_service(&app, login_request("admin@edumeetup.example").to_request()).await,
    );

    let pending: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/universities?status=PENDING")
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    let items = pending["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], university.id.to_string());
    assert!(pending.get("nextCursor").is_none());

    let verified: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/admin/universities/{}/verify", university.id))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(verified["verificationStatus"], "VERIFIED");

    let again = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/admin/universities/{}/verify", university.id))
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::BAD_REQUEST);

    let logs: Vec<Value> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/admin/audit-logs?limit=10")
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert!(
        logs.iter()
            .any(|entry| entry["action"] == AuditAction::UniversityVerified.as_str())
    );
    assert!(
        world
            .db
            .audit_entries()
            .iter()
            .any(|entry| entry.action == AuditAction::UniversityVerified)
    );
}

#[actix_web::test]
async fn unknown_university_ids_are_not_found() {
    let (world, state) = world_and_state();
    world.seed_admin("admin@edumeetup.example").await;
    let app = test::init_service(test_app(state)).await;
    let admin = session_cookie(
        &test::call_service(&app, login_request("admin@edumeetup.example").to_request()).await,
    );

    let missing = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/universities/3fa85f64-5717-4562-b3fc-2c963f66afa6/verify")
            .cookie(admin.clone())
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let malformed = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/admin/universities/not-a-uuid/verify")
            .cookie(admin)
            .to_request(),
    )
    .await;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn host_request_flows_from_submission_to_accepted_outreach() {
    let (world, state) = world_and_state();
    world.seed_admin("admin@edumeetup.example").await;
    let (_owner, university) = world
        .seed_university("owner@uni.example", "Lakeside University", VerificationStatus::Verified)
        .await;
    let app = test::init_service(test_app(state)).await;

    let submitted = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/host-requests")
            .set_json(json!({
                "organizationName": "Nairobi Academy",
                "contactName": "Grace Mwangi",
                "contactEmail": "grace@academy.example",
                "city": "Nairobi",
                "country": "Kenya",
                "expectedStudents": 250,
                "preferredDates": "May 2026",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(submitted.status(), StatusCode::CREATED);
    let request: Value = test::read_body_json(submitted).await;
    assert_eq!(request["status"], "pending");
    let request_id = request["id"].as_str().expect("id").to_owned();

    let admin = session_cookie(
        &test::call_service(&app, login_request("admin@edumeetup.example").to_request()).await,
    );
    let early = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/admin/host-requests/{request_id}/outreach"))
            .cookie(admin.clone())
            .set_json(json!({ "universityIds": [university.id.to_string()] }))
            .to_request(),
    )
    .await;
    assert_eq!(early.status(), StatusCode::BAD_REQUEST);

    let approved: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/admin/host-requests/{request_id}/status"))
            .cookie(admin.clone())
            .set_json(json!({ "status": "approved" }))
            .to_request(),
    )
    .await;
    assert_eq!(approved["status"], "approved");

    let sent: Vec<Value> = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/admin/host-requests/{request_id}/outreach"))
            .cookie(admin)
            .set_json(json!({
                "universityIds": [university.id.to_string()],
                "message": "Would you like a stand?",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["status"], "sent");
    let outreach_id = sent[0]["id"].as_str().expect("outreach id").to_owned();

    let owner = session_cookie(
        &test::call_service(&app, login_request("owner@uni.example").to_request()).await,
    );
    let inbox: Vec<Value> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/university/outreach")
            .cookie(owner.clone())
            .to_request(),
    )
    .await;
    assert_eq!(inbox.len(), 1);

    let responded: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/university/outreach/{outreach_id}/respond"))
            .cookie(owner)
            .set_json(json!({ "accept": true, "note": "Count us in" }))
            .to_request(),
    )
    .await;
    assert_eq!(responded["status"], "accepted");
    assert_eq!(responded["responseNote"], "Count us in");
}
