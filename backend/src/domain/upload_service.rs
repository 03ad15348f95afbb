//! Profile file uploads.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};

use crate::domain::ports::{BlobStore, BlobStoreError, StudentProfileRepository, UniversityRepository};
use crate::domain::{AuthenticatedUser, Error, StoredUpload, UploadKind};

fn map_blob_error(error: BlobStoreError) -> Error {
    match error {
        BlobStoreError::InvalidKey { key } => {
            Error::internal(format!("invalid storage key generated: {key}"))
        }
        BlobStoreError::Io { message } => {
            Error::service_unavailable(format!("file storage unavailable: {message}"))
        }
    }
}

/// Stores uploads and points the owning profile at them.
#[derive(Clone)]
pub struct UploadService {
    profiles: Arc<dyn StudentProfileRepository>,
    universities: Arc<dyn UniversityRepository>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl UploadService {
    pub fn new(
        profiles: Arc<dyn StudentProfileRepository>,
        universities: Arc<dyn UniversityRepository>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            profiles,
            universities,
            blobs,
            clock,
        }
    }

    /// Validate and store `body`, replacing any previous file of the same
    /// kind.
    pub async fn upload(
        &self,
        session: &AuthenticatedUser,
        kind: UploadKind,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<StoredUpload, Error> {
        if session.role != kind.required_role() {
            return Err(Error::forbidden(format!(
                "{kind} uploads are limited to {} accounts",
                kind.required_role()
            )));
        }
        let extension = kind.check(content_type, body.len())?;

        let (key, previous) = match kind {
            UploadKind::Cv => {
                let mut profile = self
                    .profiles
                    .find(&session.user_id)
                    .await?
                    .ok_or_else(|| {
                        Error::invalid_request("complete your profile before uploading a CV")
                    })?;
                let key = kind.key_for(session.user_id.as_uuid(), extension);
                self.blobs.put(&key, body).await.map_err(map_blob_error)?;
                let previous = profile.cv_key.replace(key.clone());
                profile.updated_at = self.clock.utc();
                self.profiles.upsert(&profile).await?;
                (key, previous)
            }
            UploadKind::Logo | UploadKind::Brochure => {
                let mut university = self
                    .universities
                    .find_by_owner(&session.user_id)
                    .await?
                    .ok_or_else(|| Error::not_found("no university is linked to this account"))?;
                let key = kind.key_for(university.id.as_uuid(), extension);
                self.blobs.put(&key, body).await.map_err(map_blob_error)?;
                let slot = if kind == UploadKind::Logo {
                    &mut university.logo_key
                } else {
                    &mut university.brochure_key
                };
                let previous = slot.replace(key.clone());
                self.universities.update(&university).await?;
                (key, previous)
            }
        };

        if let Some(old) = previous.filter(|old| *old != key) {
            if let Err(error) = self.blobs.delete(&old).await {
                warn!(%error, key = old, "failed to remove replaced upload");
            }
        }
        info!(user_id = %session.user_id, %kind, key, "upload stored");
        Ok(StoredUpload {
            kind,
            key,
            size_bytes: body.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::{ErrorCode, VerificationStatus};
    use crate::test_support::TestWorld;
    use chrono::Utc;
    use rstest::rstest;

    #[tokio::test]
    async fn replacing_a_logo_removes_the_old_blob() {
        let world = TestWorld::new(Utc::now());
        let (owner, university) = world
            .seed_university("owner@uni.example", "Ashesi University", VerificationStatus::Pending)
            .await;
        let session = owner.authenticated();
        let first = world
            .services
            .uploads
            .upload(&session, UploadKind::Logo, Some("image/png"), b"png-1")
            .await
            .expect("first logo");
        let second = world
            .services
            .uploads
            .upload(&session, UploadKind::Logo, Some("image/jpeg"), b"jpg-2")
            .await
            .expect("second logo");

        assert_eq!(world.blobs.keys(), vec![second.key.clone()]);
        assert_ne!(first.key, second.key);
        let stored = UniversityRepository::find(&*world.db, &university.id)
            .await
            .expect("lookup")
            .expect("university");
        assert_eq!(stored.logo_key, Some(second.key));
    }

    #[rstest]
    #[case(UploadKind::Logo)]
    #[case(UploadKind::Brochure)]
    #[tokio::test]
    async fn students_cannot_upload_university_files(#[case] kind: UploadKind) {
        let world = TestWorld::new(Utc::now());
        let student = world.seed_student("kofi@example.org", "Kofi Mensah").await;
        let err = world
            .services
            .uploads
            .upload(&student.authenticated(), kind, Some("application/pdf"), b"x")
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn cv_requires_a_profile() {
        let world = TestWorld::new(Utc::now());
        let student = world.seed_student("kofi@example.org", "Kofi Mensah").await;
        let err = world
            .services
            .uploads
            .upload(
                &student.authenticated(),
                UploadKind::Cv,
                Some("application/pdf"),
                b"%PDF",
            )
            .await
            .expect_err("no profile");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(world.blobs.keys().is_empty());
    }
}
