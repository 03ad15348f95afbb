//! Scheduler entry point for the reminder emails.
//!
//! An external scheduler calls `POST /api/cron/triggers` hourly with
//! `Authorization: Bearer <secret>`.

use actix_web::{HttpRequest, http::header, post, web};

use crate::domain::{Error, TriggerReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

fn bearer_token(request: &HttpRequest) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Run every reminder trigger once.
#[utoipa::path(
    post,
    path = "/api/cron/triggers",
    responses(
        (status = 200, description = "Emails sent per trigger", body = TriggerReport),
        (status = 401, description = "Missing or wrong bearer token", body = Error),
        (status = 503, description = "Trigger secret not configured", body = Error)
    ),
    tags = ["cron"],
    operation_id = "runTriggers",
    security(("cronBearer" = []))
)]
#[post("/cron/triggers")]
pub async fn run_triggers(
    state: web::Data<HttpState>,
    request: HttpRequest,
) -> ApiResult<web::Json<TriggerReport>> {
    let secret = state
        .cron_secret
        .as_ref()
        .ok_or_else(|| Error::service_unavailable("cron triggers are not configured"))?;
    match bearer_token(&request) {
        Some(token) if secret.verify(token) => {}
        _ => return Err(Error::unauthorized("invalid cron token")),
    }
    let report = state.services.triggers.run().await?;
    Ok(web::Json(report))
}
