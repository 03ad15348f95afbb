//! Public campus fair host request submission.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EmailAddress, Error, FullName, HostRequest, HostRequestDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field};

/// Request to host a campus fair.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HostRequestBody {
    pub organization_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub city: String,
    pub country: String,
    pub expected_students: i32,
    #[serde(default)]
    pub preferred_dates: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TryFrom<HostRequestBody> for HostRequestDraft {
    type Error = Error;

    fn try_from(value: HostRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            contact_name: FullName::new(&value.contact_name)
                .map_err(|err| invalid_field(FieldName::new("contactName"), err))?,
            contact_email: EmailAddress::new(&value.contact_email)
                .map_err(|err| invalid_field(FieldName::new("contactEmail"), err))?,
            organization_name: value.organization_name,
            city: value.city,
            country: value.country,
            expected_students: value.expected_students,
            preferred_dates: value.preferred_dates,
            message: value.message,
        })
    }
}

/// Submit a host request; admins review it before any outreach.
#[utoipa::path(
    post,
    path = "/api/v1/host-requests",
    request_body = HostRequestBody,
    responses(
        (status = 201, description = "Request recorded", body = HostRequest),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["campus-fairs"],
    operation_id = "submitHostRequest",
    security([])
)]
#[post("/host-requests")]
pub async fn submit_host_request(
    state: web::Data<HttpState>,
    payload: web::Json<HostRequestBody>,
) -> ApiResult<HttpResponse> {
    let draft = HostRequestDraft::try_from(payload.into_inner())?;
    let request = state.services.outreach.submit_host_request(draft).await?;
    Ok(HttpResponse::Created().json(request))
}
