//! Blob store rooted in a capability-scoped directory.
//!
//! Keys are slash-separated relative paths. Every access goes through a
//! `cap_std::fs::Dir` opened once at startup, so keys cannot escape the root.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{BlobStore, BlobStoreError};

/// Filesystem-backed [`BlobStore`].
#[derive(Clone)]
pub struct FsBlobStore {
    root: Arc<Dir>,
}

impl FsBlobStore {
    /// Open (creating when missing) the upload root.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the directory cannot be created or opened.
    pub fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, BlobStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> io::Result<T> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|err| BlobStoreError::io(err.to_string()))?
            .map_err(|err| BlobStoreError::io(err.to_string()))
    }
}

/// Convert a key into a relative path, rejecting anything but plain segments.
fn key_path(key: &str) -> Result<PathBuf, BlobStoreError> {
    let valid_segment = |segment: &str| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    if key.is_empty() || !key.split('/').all(valid_segment) {
        return Err(BlobStoreError::invalid_key(key));
    }
    Ok(key.split('/').collect())
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), BlobStoreError> {
        let path = key_path(key)?;
        let bytes = bytes.to_vec();
        let size = bytes.len();
        self.blocking(move |dir| {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                dir.create_dir_all(parent)?;
            }
            dir.write(&path, bytes)
        })
        .await?;
        debug!(key, size, "blob stored");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BlobStoreError> {
        let path = key_path(key)?;
        self.blocking(move |dir| match dir.remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("/etc/passwd")]
    #[case("cv/../secret")]
    #[case("cv//file.pdf")]
    #[case("cv/./file.pdf")]
    #[case("cv/file name.pdf")]
    #[case("cv\\file.pdf")]
    fn rejects_unsafe_keys(#[case] key: &str) {
        assert!(matches!(
            key_path(key),
            Err(BlobStoreError::InvalidKey { .. })
        ));
    }

    #[rstest]
    fn accepts_upload_keys() {
        let path = key_path("cv/00000000-0000-0000-0000-000000000000/a1.pdf").expect("valid");
        assert_eq!(path.components().count(), 3);
    }

    #[tokio::test]
    async fn put_then_delete() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = FsBlobStore::open(tmp.path()).expect("open store");

        store.put("logo/u1/a.png", b"png").await.expect("put");
        let stored = Dir::open_ambient_dir(tmp.path(), ambient_authority())
            .expect("root")
            .read("logo/u1/a.png")
            .expect("read back");
        assert_eq!(stored, b"png");

        store.delete("logo/u1/a.png").await.expect("delete");
        store.delete("logo/u1/a.png").await.expect("missing blob is fine");
    }

    #[tokio::test]
    async fn put_replaces_existing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = FsBlobStore::open(tmp.path()).expect("open store");
        store.put("cv/u/x.pdf", b"one").await.expect("first");
        store.put("cv/u/x.pdf", b"two").await.expect("second");
        let stored = Dir::open_ambient_dir(tmp.path(), ambient_authority())
            .expect("root")
            .read("cv/u/x.pdf")
            .expect("read back");
        assert_eq!(stored, b"two");
    }
}
