//! Raw file uploads: student CVs, university logos and brochures.

use actix_web::{HttpRequest, http::header, put, web};

use crate::domain::{Error, MAX_UPLOAD_BYTES, StoredUpload, UploadKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_choice};

/// Body limit for raw uploads. Larger bodies are refused by actix with
/// `413 Payload Too Large` before reaching the handler.
#[must_use]
pub fn payload_config() -> web::PayloadConfig {
    web::PayloadConfig::new(MAX_UPLOAD_BYTES)
}

/// Store a file for the signed-in account, replacing the previous one.
#[utoipa::path(
    put,
    path = "/api/v1/uploads/{kind}",
    params(("kind" = String, Path, description = "`cv`, `logo` or `brochure`")),
    request_body(content = Vec<u8>, description = "File contents", content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "File stored", body = StoredUpload),
        (status = 400, description = "Unsupported content type, empty body or unknown kind", body = Error),
        (status = 403, description = "Kind not available to this role", body = Error),
        (status = 413, description = "File larger than 5 MiB")
    ),
    tags = ["uploads"],
    operation_id = "upload"
)]
#[put("/uploads/{kind}")]
pub async fn upload(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<actix_web::HttpResponse> {
    let user = session.require_user()?;
    let kind: UploadKind = parse_choice(&path, FieldName::new("kind"))?;
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let stored = state
        .services
        .uploads
        .upload(&user, kind, content_type, &body)
        .await?;
    Ok(actix_web::HttpResponse::Created().json(stored))
}
