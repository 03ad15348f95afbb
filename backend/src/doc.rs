//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every handler annotated in `inbound::http`. Schemas
//! referenced from request and response bodies are collected automatically;
//! the explicit list below only pins the shared error envelope and the
//! types clients most often generate code for.
//!
//! The document backs Swagger UI at `/docs` in debug builds and the
//! `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, Role, User};
use crate::inbound::http::session_config::SESSION_COOKIE_NAME;
use crate::inbound::http::{
    admin, auth, cron, health, host_requests, meetings, notifications, privacy, students, support,
    university, uploads,
};

/// Adds the session cookie and cron bearer security schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                SESSION_COOKIE_NAME,
                "Encrypted session cookie issued by POST /api/v1/auth/login.",
            ))),
        );
        components.add_security_scheme(
            "cronBearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Shared secret configured as EDUMEETUP_CRON_SECRET."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "edUmeetup API",
        description = "Matchmaking between prospective students and universities: discovery, interests, meetings and campus fairs."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        health::ready,
        health::live,
        auth::register_student,
        auth::register_university,
        auth::login,
        auth::logout,
        auth::current_user,
        students::get_profile,
        students::put_profile,
        students::browse_universities,
        students::university_detail,
        students::open_slots,
        students::list_interests,
        students::express_interest,
        students::withdraw_interest,
        university::get_profile,
        university::update_profile,
        university::list_programs,
        university::create_program,
        university::update_program,
        university::archive_program,
        university::list_reps,
        university::create_rep,
        university::remove_rep,
        university::interested_students,
        university::get_availability,
        university::set_availability,
        university::list_outreach,
        university::respond_outreach,
        meetings::book_meeting,
        meetings::list_meetings,
        meetings::confirm_meeting,
        meetings::cancel_meeting,
        meetings::complete_meeting,
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_read,
        notifications::mark_all_read,
        support::submit_ticket,
        support::list_own_tickets,
        host_requests::submit_host_request,
        admin::list_universities,
        admin::verify_university,
        admin::reject_university,
        admin::list_host_requests,
        admin::update_host_request_status,
        admin::send_outreach,
        admin::list_tickets,
        admin::update_ticket,
        admin::alerts,
        admin::audit_logs,
        admin::system_logs,
        uploads::upload,
        privacy::export_data,
        privacy::request_deletion,
        cron::run_triggers,
    ),
    components(schemas(Error, ErrorCode, User, Role)),
    tags(
        (name = "health", description = "Load balancer probes"),
        (name = "auth", description = "Registration and sessions"),
        (name = "students", description = "Student profile and interests"),
        (name = "universities", description = "University discovery"),
        (name = "university", description = "University staff workspace"),
        (name = "meetings", description = "Meeting booking and lifecycle"),
        (name = "notifications", description = "In-app notifications"),
        (name = "support", description = "Support tickets"),
        (name = "campus-fairs", description = "Campus fair host requests"),
        (name = "admin", description = "Administration"),
        (name = "uploads", description = "File uploads"),
        (name = "privacy", description = "Data export and account deletion"),
        (name = "cron", description = "Scheduled triggers")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::openapi::unwrap_object_schema;
    use rstest::rstest;

    fn object_fields(doc: &utoipa::openapi::OpenApi, name: &str) -> Vec<String> {
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).unwrap_or_else(|| panic!("{name} schema"));
        unwrap_object_schema(schema, name)
            .properties
            .keys()
            .cloned()
            .collect()
    }

    #[rstest]
    #[case("Error", &["code", "message", "traceId", "details"])]
    #[case("User", &["id", "email", "fullName", "role", "isActive"])]
    fn schemas_use_wire_field_names(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let present = object_fields(&doc, name);
        for field in fields {
            assert!(present.iter().any(|p| p == field), "{name} lacks {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/auth/login")]
    #[case("/api/v1/universities/{id}/slots")]
    #[case("/api/v1/meetings/{id}/confirm")]
    #[case("/api/v1/admin/host-requests/{id}/outreach")]
    #[case("/api/my-data/delete")]
    #[case("/api/cron/triggers")]
    #[case("/health/ready")]
    fn documents_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn registers_security_schemes() {
        let doc = ApiDoc::openapi();
        let schemes = &doc.components.as_ref().expect("components").security_schemes;
        assert!(schemes.contains_key("SessionCookie"));
        assert!(schemes.contains_key("cronBearer"));
    }
}
