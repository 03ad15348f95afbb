//! Student-facing handlers: profile, university discovery, open slots and
//! interests.
//!
//! ```text
//! GET|PUT    /api/v1/students/me/profile
//! GET        /api/v1/universities?country&field&degreeLevel&query&limit&cursor
//! GET        /api/v1/universities/{id}
//! GET        /api/v1/universities/{id}/slots?from&to
//! GET        /api/v1/students/me/interests
//! PUT|DELETE /api/v1/students/me/interests/{universityId}
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CurrentStatus, DegreeLevel, Error, Interest, ProgramId, Role, StudentProfile,
    StudentProfileDraft, TimeWindow, UniversityDetail, UniversityFilter, UniversityId,
    UniversityProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::PageSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, page_request, parse_date, parse_id, parse_optional_choice,
};

/// Profile body for `PUT /api/v1/students/me/profile`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfileRequest {
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    pub current_status: CurrentStatus,
    pub field_of_interest: String,
    pub preferred_degree: DegreeLevel,
    #[serde(default)]
    pub budget_range: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<StudentProfileRequest> for StudentProfileDraft {
    fn from(value: StudentProfileRequest) -> Self {
        Self {
            country: value.country,
            city: value.city,
            current_status: value.current_status,
            field_of_interest: value.field_of_interest,
            preferred_degree: value.preferred_degree,
            budget_range: value.budget_range,
            phone: value.phone,
        }
    }
}

/// Browse filters and paging parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BrowseQuery {
    /// Exact country, case-insensitive.
    pub country: Option<String>,
    /// Program field category, matched as a substring.
    pub field: Option<String>,
    /// Degree level offered by at least one active program.
    pub degree_level: Option<String>,
    /// Free text matched against the institution name.
    pub query: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

/// Date range for open slots, both inclusive.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlotsQuery {
    /// First local date, `YYYY-MM-DD`.
    pub from: String,
    /// Last local date, `YYYY-MM-DD`.
    pub to: String,
}

/// Body for `PUT /api/v1/students/me/interests/{universityId}`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InterestRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub program_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// The signed-in student's profile.
#[utoipa::path(
    get,
    path = "/api/v1/students/me/profile",
    responses(
        (status = 200, description = "Profile", body = StudentProfile),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not a student", body = Error),
        (status = 404, description = "Profile not filled in yet", body = Error)
    ),
    tags = ["students"],
    operation_id = "getStudentProfile"
)]
#[get("/students/me/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<StudentProfile>> {
    let user = session.require(&[Role::Student])?;
    let profile = state.services.students.get_profile(&user.user_id).await?;
    Ok(web::Json(profile))
}

/// Create or replace the signed-in student's profile.
#[utoipa::path(
    put,
    path = "/api/v1/students/me/profile",
    request_body = StudentProfileRequest,
    responses(
        (status = 200, description = "Saved profile", body = StudentProfile),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Not a student", body = Error)
    ),
    tags = ["students"],
    operation_id = "putStudentProfile"
)]
#[put("/students/me/profile")]
pub async fn put_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StudentProfileRequest>,
) -> ApiResult<web::Json<StudentProfile>> {
    let user = session.require(&[Role::Student])?;
    let profile = state
        .services
        .students
        .upsert_profile(user.user_id, payload.into_inner().into())
        .await?;
    Ok(web::Json(profile))
}

/// Verified universities, ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/universities",
    params(BrowseQuery),
    responses(
        (status = 200, description = "One page of universities", body = PageSchema<UniversityProfile>),
        (status = 400, description = "Invalid filter or cursor", body = Error),
        (status = 403, description = "Not a student or admin", body = Error)
    ),
    tags = ["universities"],
    operation_id = "browseUniversities"
)]
#[get("/universities")]
pub async fn browse_universities(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<BrowseQuery>,
) -> ApiResult<web::Json<Page<UniversityProfile>>> {
    session.require(&[Role::Student, Role::Admin])?;
    let BrowseQuery {
        country,
        field,
        degree_level,
        query,
        limit,
        cursor,
    } = query.into_inner();
    let page = page_request(limit, cursor.as_deref())?;
    let filter = UniversityFilter {
        country,
        field,
        degree_level: parse_optional_choice(degree_level.as_deref(), FieldName::new("degreeLevel"))?,
        query,
    };
    let rows = state
        .services
        .students
        .browse_universities(filter, page.offset(), page.fetch_limit())
        .await?;
    Ok(web::Json(Page::from_overfetch(rows, &page)))
}

/// A verified university with its active programs.
#[utoipa::path(
    get,
    path = "/api/v1/universities/{id}",
    params(("id" = String, Path, description = "University id")),
    responses(
        (status = 200, description = "University detail", body = UniversityDetail),
        (status = 404, description = "Unknown or unverified university", body = Error)
    ),
    tags = ["universities"],
    operation_id = "getUniversity"
)]
#[get("/universities/{id}")]
pub async fn university_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<UniversityDetail>> {
    session.require(&[Role::Student, Role::Admin])?;
    let id: UniversityId = parse_id(&path, FieldName::new("id"))?;
    let detail = state.services.students.university_detail(&id).await?;
    Ok(web::Json(detail))
}

/// Bookable meeting slots in a date range of at most 31 days.
#[utoipa::path(
    get,
    path = "/api/v1/universities/{id}/slots",
    params(("id" = String, Path, description = "University id"), SlotsQuery),
    responses(
        (status = 200, description = "Open slots in UTC, earliest first", body = [TimeWindow]),
        (status = 400, description = "Invalid range", body = Error),
        (status = 404, description = "Unknown or unverified university", body = Error)
    ),
    tags = ["universities"],
    operation_id = "listOpenSlots"
)]
#[get("/universities/{id}/slots")]
pub async fn open_slots(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<SlotsQuery>,
) -> ApiResult<web::Json<Vec<TimeWindow>>> {
    session.require(&[Role::Student])?;
    let id: UniversityId = parse_id(&path, FieldName::new("id"))?;
    let from = parse_date(&query.from, FieldName::new("from"))?;
    let to = parse_date(&query.to, FieldName::new("to"))?;
    let slots = state.services.scheduling.open_slots(&id, from, to).await?;
    Ok(web::Json(slots))
}

/// The signed-in student's interests, most recent first.
#[utoipa::path(
    get,
    path = "/api/v1/students/me/interests",
    responses(
        (status = 200, description = "Interests", body = [Interest]),
        (status = 403, description = "Not a student", body = Error)
    ),
    tags = ["students"],
    operation_id = "listInterests"
)]
#[get("/students/me/interests")]
pub async fn list_interests(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Interest>>> {
    let user = session.require(&[Role::Student])?;
    let interests = state.services.students.list_interests(&user.user_id).await?;
    Ok(web::Json(interests))
}

/// Express interest in a verified university. Repeating the call is safe.
#[utoipa::path(
    put,
    path = "/api/v1/students/me/interests/{universityId}",
    params(("universityId" = String, Path, description = "University id")),
    request_body = InterestRequest,
    responses(
        (status = 200, description = "Interest recorded", body = Interest),
        (status = 400, description = "Program does not belong to the university", body = Error),
        (status = 404, description = "Unknown or unverified university", body = Error)
    ),
    tags = ["students"],
    operation_id = "expressInterest"
)]
#[put("/students/me/interests/{university_id}")]
pub async fn express_interest(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: Option<web::Json<InterestRequest>>,
) -> ApiResult<web::Json<Interest>> {
    let user = session.require(&[Role::Student])?;
    let university_id: UniversityId = parse_id(&path, FieldName::new("universityId"))?;
    let InterestRequest { program_id, note } =
        payload.map(web::Json::into_inner).unwrap_or_default();
    let program_id: Option<ProgramId> = program_id
        .as_deref()
        .map(|raw| parse_id(raw, FieldName::new("programId")))
        .transpose()?;
    let interest = state
        .services
        .students
        .express_interest(user.user_id, university_id, program_id, note)
        .await?;
    Ok(web::Json(interest))
}

/// Withdraw interest in a university.
#[utoipa::path(
    delete,
    path = "/api/v1/students/me/interests/{universityId}",
    params(("universityId" = String, Path, description = "University id")),
    responses(
        (status = 200, description = "Interest withdrawn", body = Interest),
        (status = 404, description = "No interest recorded", body = Error)
    ),
    tags = ["students"],
    operation_id = "withdrawInterest"
)]
#[delete("/students/me/interests/{university_id}")]
pub async fn withdraw_interest(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = session.require(&[Role::Student])?;
    let university_id: UniversityId = parse_id(&path, FieldName::new("universityId"))?;
    let interest = state
        .services
        .students
        .withdraw_interest(user.user_id, university_id)
        .await?;
    Ok(HttpResponse::Ok().json(interest))
}
