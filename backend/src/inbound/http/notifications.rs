//! In-app notification handlers.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, NOTIFICATION_LIST_MAX, Notification, NotificationId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

const DEFAULT_LIMIT: u32 = 50;

/// Listing options.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    /// Only unread notifications.
    #[serde(default)]
    pub unread_only: bool,
    /// Defaults to 50, at most 100.
    pub limit: Option<u32>,
}

/// Unread counter for the bell badge.
#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCount {
    pub count: u64,
}

/// Number of notifications marked read.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkedRead {
    pub updated: u64,
}

/// The signed-in user's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Notifications", body = [Notification]),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<NotificationQuery>,
) -> ApiResult<web::Json<Vec<Notification>>> {
    let user = session.require_user()?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, NOTIFICATION_LIST_MAX);
    let notifications = state
        .services
        .notifications
        .list(&user.user_id, query.unread_only, limit)
        .await?;
    Ok(web::Json(notifications))
}

/// Count of unread notifications.
#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    responses(
        (status = 200, description = "Unread count", body = UnreadCount),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "unreadNotificationCount"
)]
#[get("/notifications/unread-count")]
pub async fn unread_count(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UnreadCount>> {
    let user = session.require_user()?;
    let count = state.services.notifications.unread_count(&user.user_id).await?;
    Ok(web::Json(UnreadCount { count }))
}

/// Mark one notification read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 204, description = "Marked read"),
        (status = 404, description = "Notification not found", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/notifications/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user()?;
    let id: NotificationId = parse_id(&path, FieldName::new("id"))?;
    state
        .services
        .notifications
        .mark_read(&user.user_id, &id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mark every notification read.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/read-all",
    responses(
        (status = 200, description = "Notifications marked read", body = MarkedRead),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[post("/notifications/read-all")]
pub async fn mark_all_read(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<MarkedRead>> {
    let user = session.require_user()?;
    let updated = state
        .services
        .notifications
        .mark_all_read(&user.user_id)
        .await?;
    Ok(web::Json(MarkedRead { updated }))
}
