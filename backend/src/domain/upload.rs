//! Upload kinds and the rules each one enforces.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::text_enum::text_enum;
use super::{Error, Role};

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

text_enum! {
    /// What an upload is used for.
    pub enum UploadKind {
        Cv => "cv",
        Logo => "logo",
        Brochure => "brochure",
    }
}

impl UploadKind {
    /// Role allowed to upload this kind.
    #[must_use]
    pub const fn required_role(self) -> Role {
        match self {
            Self::Cv => Role::Student,
            Self::Logo | Self::Brochure => Role::University,
        }
    }

    /// File extension for an accepted content type, or `None` when the
    /// content type is not allowed for this kind.
    #[must_use]
    pub fn extension_for(self, content_type: &str) -> Option<&'static str> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match (self, essence.as_str()) {
            (Self::Cv | Self::Brochure, "application/pdf") => Some("pdf"),
            (Self::Logo, "image/png") => Some("png"),
            (Self::Logo, "image/jpeg") => Some("jpg"),
            _ => None,
        }
    }

    /// Validate size and content type, returning the storage extension.
    pub fn check(self, content_type: Option<&str>, len: usize) -> Result<&'static str, Error> {
        if len == 0 {
            return Err(Error::invalid_request("upload body is empty"));
        }
        if len > MAX_UPLOAD_BYTES {
            return Err(Error::invalid_request(format!(
                "uploads are limited to {} MiB",
                MAX_UPLOAD_BYTES / (1024 * 1024)
            )));
        }
        content_type
            .and_then(|ct| self.extension_for(ct))
            .ok_or_else(|| {
                Error::invalid_request(format!("unsupported content type for {self} upload"))
            })
    }

    /// Storage key `{kind}/{owner}/{uuid}.{ext}`.
    #[must_use]
    pub fn key_for(self, owner: &Uuid, extension: &str) -> String {
        format!("{self}/{owner}/{}.{extension}", Uuid::new_v4())
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredUpload {
    pub kind: UploadKind,
    pub key: String,
    pub size_bytes: usize,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(UploadKind::Cv, "application/pdf", Some("pdf"))]
    #[case(UploadKind::Cv, "image/png", None)]
    #[case(UploadKind::Logo, "image/JPEG", Some("jpg"))]
    #[case(UploadKind::Logo, "image/png; charset=binary", Some("png"))]
    #[case(UploadKind::Brochure, "application/msword", None)]
    fn content_types(
        #[case] kind: UploadKind,
        #[case] content_type: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(kind.extension_for(content_type), expected);
    }

    #[rstest]
    #[case(0)]
    #[case(MAX_UPLOAD_BYTES + 1)]
    fn size_limits(#[case] len: usize) {
        let err = UploadKind::Cv
            .check(Some("application/pdf"), len)
            .expect_err("size rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn key_layout() {
        let owner = Uuid::nil();
        let key = UploadKind::Logo.key_for(&owner, "png");
        assert!(key.starts_with("logo/00000000-0000-0000-0000-000000000000/"));
        assert!(key.ends_with(".png"));
    }
}
