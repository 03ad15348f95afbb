//! File uploads and support tickets over HTTP.

use actix_web::http::{StatusCode, header};
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use edumeetup::domain::{MAX_UPLOAD_BYTES, VerificationStatus};

#[allow(dead_code)]
mod support;

use support::{error_code, login_request, session_cookie, test_app, world_and_state};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

#[actix_web::test]
async fn owner_uploads_a_logo() {
    let (world, state) = world_and_state();
    let (_owner, university) = world
        .seed_university("owner@uni.example", "Lakeside University", VerificationStatus::Verified)
        .await;
    let app = test::init_service(test_app(state)).await;
    let cookie = session_cookie(
        &test::call_service(&app, login_request("owner@uni.example").to_request()).await,
    );

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/uploads/logo")
            .cookie(cookie)
            .insert_header((header::CONTENT_TYPE, "image/png"))
            .set_payload(PNG_MAGIC)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let stored: Value = test::read_body_json(res).await;
    let key = stored["key"].as_str().expect("key");
    assert!(key.starts_with(&format!("logo/{}/", university.id)));
    assert!(key.ends_with(".png"));
    assert_eq!(world.blobs.get(key).as_deref(), Some(PNG_MAGIC));
}

#[rstest]
#[case("cv", "application/pdf", StatusCode::FORBIDDEN)]
#[case("logo", "application/pdf", StatusCode::BAD_REQUEST)]
#[case("avatar", "image/png", StatusCode::BAD_REQUEST)]
#[actix_web::test]
async fn uploads_check_kind_and_content_type(
    #[case] kind: &str,
    #[case] content_type: &str,
    #[case] expected: StatusCode,
) {
    let (world, state) = world_and_state();
    world
        .seed_university("owner@uni.example", "Lakeside University", VerificationStatus::Verified)
        .await;
    let app = test::init_service(test_app(state)).await;
    let cookie = session_cookie(
        &test::call_service(&app, login_request("owner@uni.example").to_request()).await,
    );

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/uploads/{kind}"))
            .cookie(cookie)
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(PNG_MAGIC)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), expected);
    assert!(world.blobs.keys().is_empty());
}

#[actix_web::test]
async fn oversized_uploads_are_refused() {
    let (world, state) = world_and_state();
    world
        .seed_university("owner@uni.example", "Lakeside University", VerificationStatus::Verified)
        .await;
    let app = test::init_service(test_app(state)).await;
    let cookie = session_cookie(
        &test::call_service(&app, login_request("owner@uni.example").to_request()).await,
    );

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/uploads/brochure")
            .cookie(cookie)
            .insert_header((header::CONTENT_TYPE, "application/pdf"))
            .set_payload(vec![0_u8; MAX_UPLOAD_BYTES + 1])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(world.blobs.keys().is_empty());
}

#[actix_web::test]
async fn anonymous_tickets_need_an_email() {
    let (_world, state) = world_and_state();
    let app = test::init_service(test_app(state)).await;

    let missing = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/support/tickets")
            .set_json(json!({
                "subject": "Cannot sign in",
                "message": "The login page keeps reloading.",
                "category": "account",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(missing).await;
    assert_eq!(error_code(&body), "invalid_request");

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/support/tickets")
            .set_json(json!({
                "email": "visitor@example.org",
                "subject": "Cannot sign in",
                "message": "The login page keeps reloading.",
                "category": "account",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let ticket: Value = test::read_body_json(created).await;
    assert_eq!(ticket["status"], "open");
}

#[actix_web::test]
async fn signed_in_tickets_are_listed_and_resolved_by_admins() {
    let (world, state) = world_and_state();
    world.seed_student("tobi@example.org", "Tobi Bello").await;
    world.seed_admin("admin@edumeetup.example").await;
    let app = test::init_service(test_app(state)).await;
    let student = session_cookie(
        &test::call_service(&app, login_request("tobi@example.org").to_request()).await,
    );

    let ticket: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/support/tickets")
            .cookie(student.clone())
            .set_json(json!({
                "subject": "Meeting link missing",
                "message": "My confirmed meeting has no link.",
                "category": "meetings",
            }))
            .to_request(),
    )
    .await;
    let ticket_id = ticket["id"].as_str().expect("ticket id").to_owned();

    let admin = session_cookie(
        &test::call_service(&app, login_request("admin@edumeetup.example").to_request()).await,
    );
    let updated: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/admin/support/tickets/{ticket_id}"))
            .cookie(admin)
            .set_json(json!({ "status": "resolved", "adminNote": "Link re-sent" }))
            .to_request(),
    )
    .await;
    assert_eq!(updated["status"], "resolved");

    let mine: Vec<Value> = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/support/tickets/mine")
            .cookie(student)
            .to_request(),
    )
    .await;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["status"], "resolved");
    assert_eq!(mine[0]["email"], "tobi@example.org");
}
