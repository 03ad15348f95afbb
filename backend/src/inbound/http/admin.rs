//! Administrator handlers: university verification, campus fair requests,
//! support queue, dashboard alerts and logs.
//!
//! Every route here requires an `ADMIN` session.

use actix_web::{get, post, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AuditEntry, DashboardAlert, Error, HostRequest, HostRequestId, HostRequestOutreach,
    HostRequestStatus, LOG_LIST_MAX, Role, SupportTicket, SystemLogEntry, TicketId, TicketStatus,
    UniversityId, UniversityProfile, UserId, VerificationStatus,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::PageSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_request, parse_id, parse_optional_choice,
};

const DEFAULT_LOG_LIMIT: u32 = 100;

fn require_admin(session: &SessionContext) -> Result<UserId, Error> {
    session.require(&[Role::Admin]).map(|user| user.user_id)
}

/// Status filter with paging, shared by the admin queues.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AdminListQuery {
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Log listing size.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogQuery {
    /// Defaults to 100, at most 500.
    pub limit: Option<u32>,
}

/// Reason shown to the university owner.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RejectUniversityRequest {
    pub reason: String,
}

/// New host request status.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct HostRequestStatusRequest {
    pub status: HostRequestStatus,
}

/// Universities to invite to an approved campus fair.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOutreachRequest {
    #[schema(value_type = Vec<String>)]
    pub university_ids: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Ticket status change with an optional note for the requester.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdateRequest {
    pub status: TicketStatus,
    #[serde(default)]
    pub admin_note: Option<String>,
}

/// Universities by verification status, oldest registration first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/universities",
    params(AdminListQuery),
    responses(
        (status = 200, description = "One page of universities", body = PageSchema<UniversityProfile>),
        (status = 400, description = "Invalid status or cursor", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListUniversities"
)]
#[get("/admin/universities")]
pub async fn list_universities(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AdminListQuery>,
) -> ApiResult<web::Json<Page<UniversityProfile>>> {
    require_admin(&session)?;
    let status: Option<VerificationStatus> =
        parse_optional_choice(query.status.as_deref(), FieldName::new("status"))?;
    let page = page_request(query.limit, query.cursor.as_deref())?;
    let rows = state
        .services
        .admin
        .list_universities(status, page.offset(), page.fetch_limit())
        .await?;
    Ok(web::Json(Page::from_overfetch(rows, &page)))
}

/// Approve a pending university.
#[utoipa::path(
    post,
    path = "/api/v1/admin/universities/{id}/verify",
    params(("id" = String, Path, description = "University id")),
    responses(
        (status = 200, description = "University verified", body = UniversityProfile),
        (status = 400, description = "University is not pending", body = Error),
        (status = 404, description = "University not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "verifyUniversity"
)]
#[post("/admin/universities/{id}/verify")]
pub async fn verify_university(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UniversityProfile>> {
    let admin_id = require_admin(&session)?;
    let id: UniversityId = parse_id(&path, FieldName::new("id"))?;
    let university = state
        .services
        .admin
        .verify_university(admin_id, &id)
        .await?;
    Ok(web::Json(university))
}

/// Reject a pending university with a reason.
#[utoipa::path(
    post,
    path = "/api/v1/admin/universities/{id}/reject",
    params(("id" = String, Path, description = "University id")),
    request_body = RejectUniversityRequest,
    responses(
        (status = 200, description = "University rejected", body = UniversityProfile),
        (status = 400, description = "University is not pending or reason missing", body = Error),
        (status = 404, description = "University not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "rejectUniversity"
)]
#[post("/admin/universities/{id}/reject")]
pub async fn reject_university(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<RejectUniversityRequest>,
) -> ApiResult<web::Json<UniversityProfile>> {
    let admin_id = require_admin(&session)?;
    let id: UniversityId = parse_id(&path, FieldName::new("id"))?;
    let university = state
        .services
        .admin
        .reject_university(admin_id, &id, &payload.reason)
        .await?;
    Ok(web::Json(university))
}

/// Campus fair host requests, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/host-requests",
    params(AdminListQuery),
    responses(
        (status = 200, description = "One page of host requests", body = PageSchema<HostRequest>),
        (status = 400, description = "Invalid status or cursor", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListHostRequests"
)]
#[get("/admin/host-requests")]
pub async fn list_host_requests(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AdminListQuery>,
) -> ApiResult<web::Json<Page<HostRequest>>> {
    require_admin(&session)?;
    let status: Option<HostRequestStatus> =
        parse_optional_choice(query.status.as_deref(), FieldName::new("status"))?;
    let page = page_request(query.limit, query.cursor.as_deref())?;
    let rows = state
        .services
        .outreach
        .list_host_requests(status, page.offset(), page.fetch_limit())
        .await?;
    Ok(web::Json(Page::from_overfetch(rows, &page)))
}

/// Move a host request through its review states.
#[utoipa::path(
    put,
    path = "/api/v1/admin/host-requests/{id}/status",
    params(("id" = String, Path, description = "Host request id")),
    request_body = HostRequestStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = HostRequest),
        (status = 400, description = "Transition not allowed", body = Error),
        (status = 404, description = "Host request not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateHostRequestStatus"
)]
#[put("/admin/host-requests/{id}/status")]
pub async fn update_host_request_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<HostRequestStatusRequest>,
) -> ApiResult<web::Json<HostRequest>> {
    let admin_id = require_admin(&session)?;
    let id: HostRequestId = parse_id(&path, FieldName::new("id"))?;
    let request = state
        .services
        .outreach
        .update_host_request_status(admin_id, &id, payload.status)
        .await?;
    Ok(web::Json(request))
}

/// Invite verified universities to an approved campus fair.
#[utoipa::path(
    post,
    path = "/api/v1/admin/host-requests/{id}/outreach",
    params(("id" = String, Path, description = "Host request id")),
    request_body = SendOutreachRequest,
    responses(
        (status = 200, description = "Invitations sent", body = [HostRequestOutreach]),
        (status = 400, description = "Request not approved or no universities given", body = Error),
        (status = 404, description = "Host request not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "sendOutreach"
)]
#[post("/admin/host-requests/{id}/outreach")]
pub async fn send_outreach(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SendOutreachRequest>,
) -> ApiResult<web::Json<Vec<HostRequestOutreach>>> {
    let admin_id = require_admin(&session)?;
    let id: HostRequestId = parse_id(&path, FieldName::new("id"))?;
    let SendOutreachRequest {
        university_ids,
        message,
    } = payload.into_inner();
    let university_ids = university_ids
        .iter()
        .map(|raw| parse_id::<UniversityId>(raw, FieldName::new("universityIds")))
        .collect::<Result<Vec<_>, _>>()?;
    let sent = state
        .services
        .outreach
        .send_outreach(admin_id, &id, &university_ids, message.as_deref())
        .await?;
    Ok(web::Json(sent))
}

/// Support tickets, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/support/tickets",
    params(AdminListQuery),
    responses(
        (status = 200, description = "One page of tickets", body = PageSchema<SupportTicket>),
        (status = 400, description = "Invalid status or cursor", body = Error),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminListTickets"
)]
#[get("/admin/support/tickets")]
pub async fn list_tickets(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AdminListQuery>,
) -> ApiResult<web::Json<Page<SupportTicket>>> {
    require_admin(&session)?;
    let status: Option<TicketStatus> =
        parse_optional_choice(query.status.as_deref(), FieldName::new("status"))?;
    let page = page_request(query.limit, query.cursor.as_deref())?;
    let rows = state
        .services
        .support
        .list(status, page.offset(), page.fetch_limit())
        .await?;
    Ok(web::Json(Page::from_overfetch(rows, &page)))
}

/// Change a ticket's status.
#[utoipa::path(
    put,
    path = "/api/v1/admin/support/tickets/{id}",
    params(("id" = String, Path, description = "Ticket id")),
    request_body = TicketUpdateRequest,
    responses(
        (status = 200, description = "Ticket updated", body = SupportTicket),
        (status = 404, description = "Ticket not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateTicket"
)]
#[put("/admin/support/tickets/{id}")]
pub async fn update_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<TicketUpdateRequest>,
) -> ApiResult<web::Json<SupportTicket>> {
    let admin_id = require_admin(&session)?;
    let id: TicketId = parse_id(&path, FieldName::new("id"))?;
    let TicketUpdateRequest { status, admin_note } = payload.into_inner();
    let ticket = state
        .services
        .support
        .update_status(admin_id, &id, status, admin_note.as_deref())
        .await?;
    Ok(web::Json(ticket))
}

/// Dashboard alerts derived from queue sizes and milestones.
#[utoipa::path(
    get,
    path = "/api/v1/admin/alerts",
    responses(
        (status = 200, description = "Alerts, most severe first", body = [DashboardAlert]),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminAlerts"
)]
#[get("/admin/alerts")]
pub async fn alerts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<DashboardAlert>>> {
    require_admin(&session)?;
    let alerts = state.services.admin.dashboard_alerts().await?;
    Ok(web::Json(alerts))
}

/// Most recent audit entries.
#[utoipa::path(
    get,
    path = "/api/v1/admin/audit-logs",
    params(LogQuery),
    responses(
        (status = 200, description = "Audit entries, newest first", body = [AuditEntry]),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminAuditLogs"
)]
#[get("/admin/audit-logs")]
pub async fn audit_logs(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<LogQuery>,
) -> ApiResult<web::Json<Vec<AuditEntry>>> {
    require_admin(&session)?;
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(LOG_LIST_MAX);
    let entries = state.services.admin.list_audit_logs(limit).await?;
    Ok(web::Json(entries))
}

/// Most recent system log rows.
#[utoipa::path(
    get,
    path = "/api/v1/admin/system-logs",
    params(LogQuery),
    responses(
        (status = 200, description = "System log rows, newest first", body = [SystemLogEntry]),
        (status = 403, description = "Not an admin", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminSystemLogs"
)]
#[get("/admin/system-logs")]
pub async fn system_logs(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<LogQuery>,
) -> ApiResult<web::Json<Vec<SystemLogEntry>>> {
    require_admin(&session)?;
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).min(LOG_LIST_MAX);
    let entries = state.services.admin.list_system_logs(limit).await?;
    Ok(web::Json(entries))
}
