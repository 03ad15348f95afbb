//! Meeting booking and lifecycle handlers.
//!
//! ```text
//! POST /api/v1/meetings                  student books an open slot
//! GET  /api/v1/meetings?status           own meetings (student or staff)
//! POST /api/v1/meetings/{id}/confirm     staff
//! POST /api/v1/meetings/{id}/cancel      student or staff
//! POST /api/v1/meetings/{id}/complete    staff
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    BookingRequest, Error, Meeting, MeetingId, MeetingPurpose, MeetingStatus, ProgramId, Role,
    UniversityId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_optional_choice};

/// Booking body. `startsAt` must match one of the open slots exactly.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookMeetingRequest {
    #[schema(format = Uuid)]
    pub university_id: String,
    pub starts_at: DateTime<Utc>,
    pub purpose: MeetingPurpose,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub program_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl TryFrom<BookMeetingRequest> for BookingRequest {
    type Error = Error;

    fn try_from(value: BookMeetingRequest) -> Result<Self, Self::Error> {
        let university_id: UniversityId =
            parse_id(&value.university_id, FieldName::new("universityId"))?;
        let program_id: Option<ProgramId> = value
            .program_id
            .as_deref()
            .map(|raw| parse_id(raw, FieldName::new("programId")))
            .transpose()?;
        Ok(Self {
            university_id,
            starts_at: value.starts_at,
            purpose: value.purpose,
            program_id,
            note: value.note,
        })
    }
}

/// Status filter for meeting lists.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MeetingListQuery {
    /// `PENDING`, `CONFIRMED`, `CANCELLED` or `COMPLETED`.
    pub status: Option<String>,
}

/// Optional video link shared with the student on confirmation.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmMeetingRequest {
    #[serde(default)]
    pub meeting_link: Option<String>,
}

/// Cancellation body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelMeetingRequest {
    pub reason: String,
}

/// Request a meeting in one of a university's open slots.
#[utoipa::path(
    post,
    path = "/api/v1/meetings",
    request_body = BookMeetingRequest,
    responses(
        (status = 201, description = "Meeting requested", body = Meeting),
        (status = 400, description = "Slot not open or invalid request", body = Error),
        (status = 403, description = "Not a student", body = Error),
        (status = 404, description = "Unknown or unverified university", body = Error),
        (status = 409, description = "Slot already taken", body = Error)
    ),
    tags = ["meetings"],
    operation_id = "bookMeeting"
)]
#[post("/meetings")]
pub async fn book_meeting(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<BookMeetingRequest>,
) -> ApiResult<HttpResponse> {
    let user = session.require(&[Role::Student])?;
    let request = BookingRequest::try_from(payload.into_inner())?;
    let meeting = state.services.scheduling.book(user.user_id, request).await?;
    Ok(HttpResponse::Created().json(meeting))
}

/// Meetings of the signed-in student, or of the staff member's institution.
#[utoipa::path(
    get,
    path = "/api/v1/meetings",
    params(MeetingListQuery),
    responses(
        (status = 200, description = "Meetings, soonest first", body = [Meeting]),
        (status = 400, description = "Unknown status", body = Error),
        (status = 403, description = "Admins have no meetings", body = Error)
    ),
    tags = ["meetings"],
    operation_id = "listMeetings"
)]
#[get("/meetings")]
pub async fn list_meetings(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<MeetingListQuery>,
) -> ApiResult<web::Json<Vec<Meeting>>> {
    let user = session.require(&[Role::Student, Role::University, Role::UniversityRep])?;
    let status: Option<MeetingStatus> =
        parse_optional_choice(query.status.as_deref(), FieldName::new("status"))?;
    let meetings = if user.role == Role::Student {
        state
            .services
            .scheduling
            .list_for_student(&user.user_id, status)
            .await?
    } else {
        state
            .services
            .scheduling
            .list_for_university(&user, status)
            .await?
    };
    Ok(web::Json(meetings))
}

/// Confirm a pending meeting.
#[utoipa::path(
    post,
    path = "/api/v1/meetings/{id}/confirm",
    params(("id" = String, Path, description = "Meeting id")),
    request_body = ConfirmMeetingRequest,
    responses(
        (status = 200, description = "Meeting confirmed", body = Meeting),
        (status = 400, description = "Meeting is not pending", body = Error),
        (status = 404, description = "Meeting not found", body = Error)
    ),
    tags = ["meetings"],
    operation_id = "confirmMeeting"
)]
#[post("/meetings/{id}/confirm")]
pub async fn confirm_meeting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: Option<web::Json<ConfirmMeetingRequest>>,
) -> ApiResult<web::Json<Meeting>> {
    let user = session.require(&[Role::University, Role::UniversityRep])?;
    let id: MeetingId = parse_id(&path, FieldName::new("id"))?;
    let ConfirmMeetingRequest { meeting_link } =
        payload.map(web::Json::into_inner).unwrap_or_default();
    let meeting = state
        .services
        .scheduling
        .confirm(&user, &id, meeting_link.as_deref())
        .await?;
    Ok(web::Json(meeting))
}

/// Cancel a pending or confirmed meeting.
#[utoipa::path(
    post,
    path = "/api/v1/meetings/{id}/cancel",
    params(("id" = String, Path, description = "Meeting id")),
    request_body = CancelMeetingRequest,
    responses(
        (status = 200, description = "Meeting cancelled", body = Meeting),
        (status = 400, description = "Meeting already closed or reason missing", body = Error),
        (status = 404, description = "Meeting not found", body = Error)
    ),
    tags = ["meetings"],
    operation_id = "cancelMeeting"
)]
#[post("/meetings/{id}/cancel")]
pub async fn cancel_meeting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CancelMeetingRequest>,
) -> ApiResult<web::Json<Meeting>> {
    let user = session.require(&[Role::Student, Role::University, Role::UniversityRep])?;
    let id: MeetingId = parse_id(&path, FieldName::new("id"))?;
    let meeting = state
        .services
        .scheduling
        .cancel(&user, &id, &payload.reason)
        .await?;
    Ok(web::Json(meeting))
}

/// Mark a confirmed meeting completed once it has ended.
#[utoipa::path(
    post,
    path = "/api/v1/meetings/{id}/complete",
    params(("id" = String, Path, description = "Meeting id")),
    responses(
        (status = 200, description = "Meeting completed", body = Meeting),
        (status = 400, description = "Meeting not confirmed or not over yet", body = Error),
        (status = 404, description = "Meeting not found", body = Error)
    ),
    tags = ["meetings"],
    operation_id = "completeMeeting"
)]
#[post("/meetings/{id}/complete")]
pub async fn complete_meeting(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Meeting>> {
    let user = session.require(&[Role::University, Role::UniversityRep])?;
    let id: MeetingId = parse_id(&path, FieldName::new("id"))?;
    let meeting = state.services.scheduling.complete(&user, &id).await?;
    Ok(web::Json(meeting))
}
