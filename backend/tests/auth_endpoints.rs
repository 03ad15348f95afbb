//! Registration, login and session lifecycle over HTTP.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde_json::{Value, json};

use edumeetup::TraceId;
use edumeetup::domain::{TRACE_ID_HEADER, VerificationStatus};
use edumeetup::test_support::TEST_PASSWORD;

#[allow(dead_code)]
mod support;

use support::{error_code, login_request, session_cookie, test_app, world_and_state};

fn student_signup(email: &str) -> Value {
    json!({
        "email": email,
        "password": TEST_PASSWORD,
        "fullName": "Amina Yusuf",
    })
}

#[actix_web::test]
async fn student_registers_logs_in_and_out() {
    let (_world, state) = world_and_state();
    let app = test::init_service(test_app(state)).await;

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register/student")
            .set_json(student_signup("amina@example.org"))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let user: Value = test::read_body_json(created).await;
    assert_eq!(user["email"], "amina@example.org");
    assert_eq!(user["role"], "STUDENT");
    assert!(user.get("passwordHash").is_none());

    let login = test::call_service(&app, login_request("amina@example.org").to_request()).await;
    let cookie = session_cookie(&login);
    let identity: Value = test::read_body_json(login).await;
    assert_eq!(identity["role"], "STUDENT");
    assert_eq!(identity["userId"], user["id"]);

    let me: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(me["fullName"], "Amina Yusuf");

    let logout = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let cleared = logout
        .response()
        .cookies()
        .find(|c| c.name() == edumeetup::inbound::http::session_config::SESSION_COOKIE_NAME)
        .expect("removal cookie");

    let after = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cleared.into_owned())
            .to_request(),
    )
    .await;
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn duplicate_email_is_a_conflict() {
    let (world, state) = world_and_state();
    world.seed_student("taken@example.org", "First Owner").await;
    let app = test::init_service(test_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register/student")
            .set_json(student_signup("TAKEN@example.org"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(error_code(&body), "conflict");
}

#[rstest]
#[case(json!({ "email": "not-an-email", "password": TEST_PASSWORD, "fullName": "A B" }), "email")]
#[case(json!({ "email": "a@example.org", "password": "short", "fullName": "A B" }), "password")]
#[case(json!({ "email": "a@example.org", "password": TEST_PASSWORD, "fullName": " " }), "fullName")]
#[actix_web::test]
async fn invalid_signups_name_the_field(#[case] payload: Value, #[case] field: &str) {
    let (_world, state) = world_and_state();
    let app = test::init_service(test_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register/student")
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(error_code(&body), "invalid_request");
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn wrong_password_is_unauthorised_with_a_trace_id() {
    let (world, state) = world_and_state();
    world.seed_student("amina@example.org", "Amina Yusuf").await;
    let app = test::init_service(test_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "amina@example.org", "password": "wrong horse 2" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    assert!(header.parse::<TraceId>().is_ok());
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["traceId"], header.as_str());
}

#[actix_web::test]
async fn university_registration_starts_pending() {
    let (_world, state) = world_and_state();
    let app = test::init_service(test_app(state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/register/university")
            .set_json(json!({
                "email": "admissions@uni.example",
                "password": TEST_PASSWORD,
                "fullName": "Admissions Office",
                "institutionName": "Lakeside University",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["user"]["role"], "UNIVERSITY");
    assert_eq!(
        body["university"]["verificationStatus"],
        VerificationStatus::Pending.as_str()
    );
}

#[actix_web::test]
async fn rejected_institutions_cannot_sign_in() {
    let (world, state) = world_and_state();
    world
        .seed_university("owner@uni.example", "Closed College", VerificationStatus::Rejected)
        .await;
    let app = test::init_service(test_app(state)).await;

    let res = test::call_service(&app, login_request("owner@uni.example").to_request()).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
