//! Shared harness for the HTTP integration tests.
//!
//! Builds the same scope layout as the server binary on top of a
//! [`TestWorld`], so requests run through the real handlers, session
//! middleware and error mapping against in-memory adapters.

use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key, SameSite};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use edumeetup::Trace;
use edumeetup::domain::CronSecret;
use edumeetup::inbound::http::error::{json_config, path_config, query_config};
use edumeetup::inbound::http::session_config::{SESSION_COOKIE_NAME, SessionSettings};
use edumeetup::inbound::http::state::HttpState;
use edumeetup::inbound::http::{configure_unversioned, configure_v1};
use edumeetup::test_support::{TEST_PASSWORD, TestWorld};

pub const CRON_SECRET: &str = "integration-cron-secret";

/// Monday 2 March 2026, 06:00 UTC.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0)
        .single()
        .expect("fixture time")
}

/// A world on [`fixed_now`] and HTTP state with the cron secret set.
pub fn world_and_state() -> (TestWorld, HttpState) {
    let world = TestWorld::new(fixed_now());
    let state = HttpState::new(world.services.clone(), CronSecret::new(CRON_SECRET));
    (world, state)
}

/// The application as mounted by the server, minus health and docs.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionSettings {
        key: Key::generate(),
        cookie_secure: false,
        same_site: SameSite::Lax,
    };
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .wrap(Trace)
        .service(
            web::scope("/api/v1")
                .wrap(session.middleware())
                .configure(configure_v1),
        )
        .service(
            web::scope("/api")
                .wrap(session.middleware())
                .configure(configure_unversioned),
        )
}

/// Login request for an account seeded with [`TEST_PASSWORD`].
pub fn login_request(email: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({ "email": email, "password": TEST_PASSWORD }))
}

/// The session cookie set by a successful response.
pub fn session_cookie<B: MessageBody>(res: &ServiceResponse<B>) -> Cookie<'static> {
    assert!(res.status().is_success(), "unexpected status {}", res.status());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// The `code` field of an error body.
pub fn error_code(body: &Value) -> &str {
    body.get("code")
        .and_then(Value::as_str)
        .expect("error code present")
}
