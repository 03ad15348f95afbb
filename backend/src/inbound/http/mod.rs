//! HTTP inbound adapter exposing the REST endpoints.
//!
//! Handlers are grouped by audience. [`configure_v1`] mounts the versioned
//! API and [`configure_unversioned`] the stable `/api` routes (privacy and
//! cron); the binary and the integration tests share both.

pub mod admin;
pub mod auth;
pub mod cron;
pub mod error;
pub mod health;
pub mod host_requests;
pub mod meetings;
pub mod notifications;
pub mod privacy;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
pub mod students;
pub mod support;
#[cfg(test)]
pub mod test_utils;
pub mod university;
pub mod uploads;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`. Paths are relative to the
/// scope.
pub fn configure_v1(cfg: &mut web::ServiceConfig) {
    cfg.app_data(uploads::payload_config())
        .service(auth::register_student)
        .service(auth::register_university)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::current_user)
        .service(students::get_profile)
        .service(students::put_profile)
        .service(students::browse_universities)
        .service(students::university_detail)
        .service(students::open_slots)
        .service(students::list_interests)
        .service(students::express_interest)
        .service(students::withdraw_interest)
        .service(university::get_profile)
        .service(university::update_profile)
        .service(university::list_programs)
        .service(university::create_program)
        .service(university::update_program)
        .service(university::archive_program)
        .service(university::list_reps)
        .service(university::create_rep)
        .service(university::remove_rep)
        .service(university::interested_students)
        .service(university::get_availability)
        .service(university::set_availability)
        .service(university::list_outreach)
        .service(university::respond_outreach)
        .service(meetings::book_meeting)
        .service(meetings::list_meetings)
        .service(meetings::confirm_meeting)
        .service(meetings::cancel_meeting)
        .service(meetings::complete_meeting)
        .service(notifications::list_notifications)
        .service(notifications::unread_count)
        .service(notifications::mark_all_read)
        .service(notifications::mark_read)
        .service(support::submit_ticket)
        .service(support::list_own_tickets)
        .service(host_requests::submit_host_request)
        .service(admin::list_universities)
        .service(admin::verify_university)
        .service(admin::reject_university)
        .service(admin::list_host_requests)
        .service(admin::update_host_request_status)
        .service(admin::send_outreach)
        .service(admin::list_tickets)
        .service(admin::update_ticket)
        .service(admin::alerts)
        .service(admin::audit_logs)
        .service(admin::system_logs)
        .service(uploads::upload);
}

/// Register the unversioned `/api` handlers on `cfg`.
pub fn configure_unversioned(cfg: &mut web::ServiceConfig) {
    cfg.service(privacy::export_data)
        .service(privacy::request_deletion)
        .service(cron::run_triggers);
}
