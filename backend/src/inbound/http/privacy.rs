//! Personal data export and account deletion requests.
//!
//! Mounted under `/api` rather than `/api/v1`; these URLs are linked from
//! the privacy policy and must stay stable across API versions.

use actix_web::{get, post, web};

use crate::domain::{DataExport, DeletionSchedule, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Everything stored about the signed-in user.
#[utoipa::path(
    get,
    path = "/api/my-data",
    responses(
        (status = 200, description = "Data export", body = DataExport),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["privacy"],
    operation_id = "exportMyData"
)]
#[get("/my-data")]
pub async fn export_data(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DataExport>> {
    let user = session.require_user()?;
    let export = state.services.data_export.export(&user.user_id).await?;
    Ok(web::Json(export))
}

/// Deactivate the account now and schedule its hard deletion. The session
/// ends with this request.
#[utoipa::path(
    post,
    path = "/api/my-data/delete",
    responses(
        (status = 200, description = "Deletion scheduled", body = DeletionSchedule),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Administrator accounts cannot be deleted here", body = Error)
    ),
    tags = ["privacy"],
    operation_id = "requestAccountDeletion"
)]
#[post("/my-data/delete")]
pub async fn request_deletion(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<DeletionSchedule>> {
    let user = session.require_user()?;
    let schedule = state.services.deletion.request_deletion(&user).await?;
    session.purge();
    Ok(web::Json(schedule))
}
