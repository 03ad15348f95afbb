//! Account handlers: sign-up, login, logout and the current user.
//!
//! ```text
//! POST /api/v1/auth/register/student    {"email":..,"password":..,"fullName":..}
//! POST /api/v1/auth/register/university {"email":..,"password":..,"fullName":..,"institutionName":..}
//! POST /api/v1/auth/login               {"email":..,"password":..}
//! POST /api/v1/auth/logout
//! GET  /api/v1/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    AuthenticatedUser, EmailAddress, Error, ErrorCode, FullName, LoginCredentials,
    LoginValidationError, NewPassword, StudentRegistration, UniversityProfile,
    UniversityRegistration, User,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field};

/// Student sign-up body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentSignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// University sign-up body; the institution starts `PENDING`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniversitySignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub institution_name: String,
}

/// Login body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Result of a university sign-up.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UniversitySignupResponse {
    pub user: User,
    pub university: UniversityProfile,
}

fn account_fields(
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<(EmailAddress, NewPassword, FullName), Error> {
    Ok((
        EmailAddress::new(email).map_err(|err| invalid_field(FieldName::new("email"), err))?,
        NewPassword::new(password).map_err(|err| invalid_field(FieldName::new("password"), err))?,
        FullName::new(full_name).map_err(|err| invalid_field(FieldName::new("fullName"), err))?,
    ))
}

impl TryFrom<StudentSignupRequest> for StudentRegistration {
    type Error = Error;

    fn try_from(value: StudentSignupRequest) -> Result<Self, Self::Error> {
        let (email, password, full_name) =
            account_fields(&value.email, &value.password, &value.full_name)?;
        Ok(Self {
            email,
            password,
            full_name,
        })
    }
}

impl TryFrom<UniversitySignupRequest> for UniversityRegistration {
    type Error = Error;

    fn try_from(value: UniversitySignupRequest) -> Result<Self, Self::Error> {
        let (email, password, full_name) =
            account_fields(&value.email, &value.password, &value.full_name)?;
        Ok(Self {
            email,
            password,
            full_name,
            institution_name: value.institution_name,
        })
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail(inner) => Error::invalid_request(inner.to_string())
            .with_details(json!({ "field": "email", "code": "invalid_email" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Register a student account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register/student",
    request_body = StudentSignupRequest,
    responses(
        (status = 201, description = "Account created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["auth"],
    operation_id = "registerStudent",
    security([])
)]
#[post("/auth/register/student")]
pub async fn register_student(
    state: web::Data<HttpState>,
    payload: web::Json<StudentSignupRequest>,
) -> ApiResult<HttpResponse> {
    let registration = StudentRegistration::try_from(payload.into_inner())?;
    let user = state.services.accounts.register_student(registration).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Register a university owner; admins verify the institution later.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register/university",
    request_body = UniversitySignupRequest,
    responses(
        (status = 201, description = "Account created", body = UniversitySignupResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["auth"],
    operation_id = "registerUniversity",
    security([])
)]
#[post("/auth/register/university")]
pub async fn register_university(
    state: web::Data<HttpState>,
    payload: web::Json<UniversitySignupRequest>,
) -> ApiResult<HttpResponse> {
    let registration = UniversityRegistration::try_from(payload.into_inner())?;
    let (user, university) = state
        .services
        .accounts
        .register_university(registration)
        .await?;
    Ok(HttpResponse::Created().json(UniversitySignupResponse { user, university }))
}

/// Authenticate and establish a session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthenticatedUser,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 403, description = "Account deactivated or registration rejected", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthenticatedUser>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_login_validation_error)?;
    let user = state.services.accounts.login(&credentials).await?;
    session.persist(&user)?;
    Ok(web::Json(user))
}

/// End the session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// The signed-in user's account.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<User>> {
    let user = session.require_user()?;
    match state.services.accounts.current_user(&user.user_id).await {
        Ok(account) => Ok(web::Json(account)),
        Err(err) if err.code() == ErrorCode::Unauthorized => {
            session.purge();
            Err(err)
        }
        Err(err) => Err(err),
    }
}
