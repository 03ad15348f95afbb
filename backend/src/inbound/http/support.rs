//! Support ticket handlers for visitors and signed-in users.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EmailAddress, Error, SupportTicket, TicketCategory, TicketDraft};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field};

/// Ticket body. `email` is required unless the caller is signed in.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    #[serde(default)]
    pub email: Option<String>,
    pub subject: String,
    pub message: String,
    pub category: TicketCategory,
}

/// Open a support ticket.
#[utoipa::path(
    post,
    path = "/api/v1/support/tickets",
    request_body = TicketRequest,
    responses(
        (status = 201, description = "Ticket opened", body = SupportTicket),
        (status = 400, description = "Invalid request", body = Error)
    ),
    tags = ["support"],
    operation_id = "submitTicket",
    security([])
)]
#[post("/support/tickets")]
pub async fn submit_ticket(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<TicketRequest>,
) -> ApiResult<HttpResponse> {
    let requester = session.user()?;
    let TicketRequest {
        email,
        subject,
        message,
        category,
    } = payload.into_inner();
    let email = email
        .as_deref()
        .map(EmailAddress::new)
        .transpose()
        .map_err(|err| invalid_field(FieldName::new("email"), err))?;
    let ticket = state
        .services
        .support
        .submit(
            requester.as_ref(),
            email,
            TicketDraft {
                subject,
                message,
                category,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(ticket))
}

/// Tickets opened by the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/support/tickets/mine",
    responses(
        (status = 200, description = "Own tickets, newest first", body = [SupportTicket]),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["support"],
    operation_id = "listOwnTickets"
)]
#[get("/support/tickets/mine")]
pub async fn list_own_tickets(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<SupportTicket>>> {
    let user = session.require_user()?;
    let tickets = state.services.support.list_mine(&user.user_id).await?;
    Ok(web::Json(tickets))
}
