//! University staff handlers: institution profile, programs, representatives,
//! interested students, availability and campus fair outreach.
//!
//! Owners (`UNIVERSITY`) and representatives (`UNIVERSITY_REP`) share most
//! endpoints; the services enforce the owner-only operations.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    AvailabilityDraft, AvailabilityProfile, AvailabilitySlot, DegreeLevel, EmailAddress, Error,
    FullName, HostRequestOutreach, InterestedStudent, OutreachId, OutreachInvitation, Program,
    ProgramDraft, ProgramId, Role, UniversityProfile, UniversityProfileDraft, User, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field, parse_id};

const STAFF: &[Role] = &[Role::University, Role::UniversityRep];

/// Editable institution fields.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniversityProfileRequest {
    pub institution_name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Absolute `http` or `https` URL.
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UniversityProfileRequest> for UniversityProfileDraft {
    fn from(value: UniversityProfileRequest) -> Self {
        Self {
            institution_name: value.institution_name,
            country: value.country,
            city: value.city,
            website: value.website,
            description: value.description,
        }
    }
}

/// Program body for create and update.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRequest {
    pub name: String,
    pub degree_level: DegreeLevel,
    pub field_category: String,
    #[serde(default)]
    pub tuition_fee_usd: Option<i32>,
    pub duration_months: i32,
    #[serde(default)]
    pub intakes: Vec<String>,
}

impl From<ProgramRequest> for ProgramDraft {
    fn from(value: ProgramRequest) -> Self {
        Self {
            name: value.name,
            degree_level: value.degree_level,
            field_category: value.field_category,
            tuition_fee_usd: value.tuition_fee_usd,
            duration_months: value.duration_months,
            intakes: value.intakes,
        }
    }
}

/// New representative.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepRequest {
    pub email: String,
    pub full_name: String,
}

/// Created representative. The temporary password is only ever emailed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRepResponse {
    pub user: User,
    pub email_sent: bool,
}

/// Availability settings and weekly windows.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub meeting_duration_minutes: i32,
    pub buffer_minutes: i32,
    pub min_notice_hours: i32,
    pub booking_window_days: i32,
    /// Offset of the institution's local time from UTC.
    pub utc_offset_minutes: i32,
    pub is_active: bool,
    pub slots: Vec<AvailabilitySlot>,
}

impl From<AvailabilityRequest> for AvailabilityDraft {
    fn from(value: AvailabilityRequest) -> Self {
        Self {
            meeting_duration_minutes: value.meeting_duration_minutes,
            buffer_minutes: value.buffer_minutes,
            min_notice_hours: value.min_notice_hours,
            booking_window_days: value.booking_window_days,
            utc_offset_minutes: value.utc_offset_minutes,
            is_active: value.is_active,
            slots: value.slots,
        }
    }
}

/// Answer to a campus fair invitation.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutreachResponseRequest {
    pub accept: bool,
    #[serde(default)]
    pub note: Option<String>,
}

/// The signed-in staff member's institution.
#[utoipa::path(
    get,
    path = "/api/v1/university/profile",
    responses(
        (status = 200, description = "Institution profile", body = UniversityProfile),
        (status = 403, description = "Not university staff", body = Error)
    ),
    tags = ["university"],
    operation_id = "getOwnUniversity"
)]
#[get("/university/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UniversityProfile>> {
    let user = session.require(STAFF)?;
    let profile = state.services.universities.get_own_profile(&user).await?;
    Ok(web::Json(profile))
}

/// Update the institution profile (owner only).
#[utoipa::path(
    put,
    path = "/api/v1/university/profile",
    request_body = UniversityProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UniversityProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not the owner", body = Error)
    ),
    tags = ["university"],
    operation_id = "updateOwnUniversity"
)]
#[put("/university/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UniversityProfileRequest>,
) -> ApiResult<web::Json<UniversityProfile>> {
    let user = session.require(&[Role::University])?;
    let profile = state
        .services
        .universities
        .update_profile(&user, payload.into_inner().into())
        .await?;
    Ok(web::Json(profile))
}

/// Programs of the institution, archived ones included.
#[utoipa::path(
    get,
    path = "/api/v1/university/programs",
    responses(
        (status = 200, description = "Programs", body = [Program]),
        (status = 403, description = "Not university staff", body = Error)
    ),
    tags = ["university"],
    operation_id = "listOwnPrograms"
)]
#[get("/university/programs")]
pub async fn list_programs(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Program>>> {
    let user = session.require(STAFF)?;
    let programs = state.services.universities.list_programs(&user).await?;
    Ok(web::Json(programs))
}

/// Add a program; the institution must be verified.
#[utoipa::path(
    post,
    path = "/api/v1/university/programs",
    request_body = ProgramRequest,
    responses(
        (status = 201, description = "Program created", body = Program),
        (status = 400, description = "Invalid request or unverified institution", body = Error),
        (status = 403, description = "Not university staff", body = Error)
    ),
    tags = ["university"],
    operation_id = "createProgram"
)]
#[post("/university/programs")]
pub async fn create_program(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProgramRequest>,
) -> ApiResult<HttpResponse> {
    let user = session.require(STAFF)?;
    let program = state
        .services
        .universities
        .create_program(&user, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(program))
}

/// Replace a program's details.
#[utoipa::path(
    put,
    path = "/api/v1/university/programs/{id}",
    params(("id" = String, Path, description = "Program id")),
    request_body = ProgramRequest,
    responses(
        (status = 200, description = "Program updated", body = Program),
        (status = 404, description = "Program not found", body = Error)
    ),
    tags = ["university"],
    operation_id = "updateProgram"
)]
#[put("/university/programs/{id}")]
pub async fn update_program(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProgramRequest>,
) -> ApiResult<web::Json<Program>> {
    let user = session.require(STAFF)?;
    let id: ProgramId = parse_id(&path, FieldName::new("id"))?;
    let program = state
        .services
        .universities
        .update_program(&user, &id, payload.into_inner().into())
        .await?;
    Ok(web::Json(program))
}

/// Archive a program. Archived programs disappear from student pages.
#[utoipa::path(
    delete,
    path = "/api/v1/university/programs/{id}",
    params(("id" = String, Path, description = "Program id")),
    responses(
        (status = 200, description = "Program archived", body = Program),
        (status = 404, description = "Program not found", body = Error)
    ),
    tags = ["university"],
    operation_id = "archiveProgram"
)]
#[delete("/university/programs/{id}")]
pub async fn archive_program(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Program>> {
    let user = session.require(STAFF)?;
    let id: ProgramId = parse_id(&path, FieldName::new("id"))?;
    let program = state.services.universities.archive_program(&user, &id).await?;
    Ok(web::Json(program))
}

/// Representatives of the owner's institution.
#[utoipa::path(
    get,
    path = "/api/v1/university/reps",
    responses(
        (status = 200, description = "Representatives", body = [User]),
        (status = 403, description = "Not the owner", body = Error)
    ),
    tags = ["university"],
    operation_id = "listReps"
)]
#[get("/university/reps")]
pub async fn list_reps(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<User>>> {
    let user = session.require(&[Role::University])?;
    let reps = state.services.universities.list_reps(&user).await?;
    Ok(web::Json(reps))
}

/// Invite a representative; a temporary password is emailed to them.
#[utoipa::path(
    post,
    path = "/api/v1/university/reps",
    request_body = CreateRepRequest,
    responses(
        (status = 201, description = "Representative created", body = CreateRepResponse),
        (status = 400, description = "Invalid request or unverified institution", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["university"],
    operation_id = "createRep"
)]
#[post("/university/reps")]
pub async fn create_rep(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateRepRequest>,
) -> ApiResult<HttpResponse> {
    let user = session.require(&[Role::University])?;
    let CreateRepRequest { email, full_name } = payload.into_inner();
    let email = EmailAddress::new(&email).map_err(|err| invalid_field(FieldName::new("email"), err))?;
    let full_name =
        FullName::new(&full_name).map_err(|err| invalid_field(FieldName::new("fullName"), err))?;
    let created = state
        .services
        .universities
        .create_rep(&user, email, full_name)
        .await?;
    Ok(HttpResponse::Created().json(CreateRepResponse {
        user: created.user,
        email_sent: created.email_sent,
    }))
}

/// Remove a representative's account.
#[utoipa::path(
    delete,
    path = "/api/v1/university/reps/{id}",
    params(("id" = String, Path, description = "Representative user id")),
    responses(
        (status = 204, description = "Representative removed"),
        (status = 404, description = "Not a representative of this institution", body = Error)
    ),
    tags = ["university"],
    operation_id = "removeRep"
)]
#[delete("/university/reps/{id}")]
pub async fn remove_rep(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = session.require(&[Role::University])?;
    let rep_id: UserId = parse_id(&path, FieldName::new("id"))?;
    state.services.universities.remove_rep(&user, &rep_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Students who expressed interest in the institution.
#[utoipa::path(
    get,
    path = "/api/v1/university/interested-students",
    responses(
        (status = 200, description = "Interested students", body = [InterestedStudent]),
        (status = 403, description = "Not university staff", body = Error)
    ),
    tags = ["university"],
    operation_id = "listInterestedStudents"
)]
#[get("/university/interested-students")]
pub async fn interested_students(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<InterestedStudent>>> {
    let user = session.require(STAFF)?;
    let students = state.services.universities.interested_students(&user).await?;
    Ok(web::Json(students))
}

/// Current availability, or `null` when none is configured.
#[utoipa::path(
    get,
    path = "/api/v1/university/availability",
    responses(
        (status = 200, description = "Availability", body = Option<AvailabilityProfile>),
        (status = 403, description = "Not university staff", body = Error)
    ),
    tags = ["university"],
    operation_id = "getAvailability"
)]
#[get("/university/availability")]
pub async fn get_availability(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Option<AvailabilityProfile>>> {
    let user = session.require(STAFF)?;
    let profile = state.services.scheduling.get_availability(&user).await?;
    Ok(web::Json(profile))
}

/// Replace availability settings and windows.
#[utoipa::path(
    put,
    path = "/api/v1/university/availability",
    request_body = AvailabilityRequest,
    responses(
        (status = 200, description = "Saved availability", body = AvailabilityProfile),
        (status = 400, description = "Invalid settings or overlapping windows", body = Error),
        (status = 403, description = "Not university staff", body = Error)
    ),
    tags = ["university"],
    operation_id = "setAvailability"
)]
#[put("/university/availability")]
pub async fn set_availability(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AvailabilityRequest>,
) -> ApiResult<web::Json<AvailabilityProfile>> {
    let user = session.require(STAFF)?;
    let profile = state
        .services
        .scheduling
        .set_availability(&user, payload.into_inner().into())
        .await?;
    Ok(web::Json(profile))
}

/// Campus fair invitations sent to the institution.
#[utoipa::path(
    get,
    path = "/api/v1/university/outreach",
    responses(
        (status = 200, description = "Invitations", body = [OutreachInvitation]),
        (status = 403, description = "Not the owner", body = Error)
    ),
    tags = ["university"],
    operation_id = "listOutreach"
)]
#[get("/university/outreach")]
pub async fn list_outreach(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OutreachInvitation>>> {
    let user = session.require(&[Role::University])?;
    let invitations = state.services.outreach.list_outreach(&user).await?;
    Ok(web::Json(invitations))
}

/// Accept or decline an invitation; only possible once.
#[utoipa::path(
    post,
    path = "/api/v1/university/outreach/{id}/respond",
    params(("id" = String, Path, description = "Outreach id")),
    request_body = OutreachResponseRequest,
    responses(
        (status = 200, description = "Response recorded", body = HostRequestOutreach),
        (status = 400, description = "Already answered", body = Error),
        (status = 404, description = "Invitation not found", body = Error)
    ),
    tags = ["university"],
    operation_id = "respondOutreach"
)]
#[post("/university/outreach/{id}/respond")]
pub async fn respond_outreach(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<OutreachResponseRequest>,
) -> ApiResult<web::Json<HostRequestOutreach>> {
    let user = session.require(&[Role::University])?;
    let id: OutreachId = parse_id(&path, FieldName::new("id"))?;
    let OutreachResponseRequest { accept, note } = payload.into_inner();
    let outreach = state
        .services
        .outreach
        .respond_outreach(&user, &id, accept, note.as_deref())
        .await?;
    Ok(web::Json(outreach))
}
