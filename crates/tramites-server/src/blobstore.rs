//! Local filesystem store for uploaded attachments.
//!
//! Files land under `{root}/{cedula}/{millis}_{filename}` and are served
//! back through the static file mount at the public base path. The owner
//! segment always comes from the authenticated session, never from the
//! request body.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Nombre de archivo inválido: {0}")]
    InvalidFilename(String),
}

/// Where a stored file ended up.
#[derive(Debug, Clone)]
pub struct StoredBlob {
    /// Path relative to the store root, recorded in the adjunto tables.
    pub path: String,
    /// URL the file is reachable at through the static mount.
    pub public_url: String,
}

/// Attachment storage seam. Handlers only see this trait, so the local
/// disk backend can be swapped without touching them.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write an upload under the owner's directory. `stamp_millis` comes
    /// from the adjusted server clock so stored names sort by upload time.
    async fn put(
        &self,
        owner_cedula: &str,
        filename: &str,
        stamp_millis: i64,
        bytes: &[u8],
    ) -> Result<StoredBlob, BlobError>;
}

pub struct LocalBlobStore {
    root: PathBuf,
    public_base: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: &str) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Strip path components and characters that have no business in a
    /// stored filename. An empty result is rejected rather than guessed.
    fn sanitize(filename: &str) -> Result<String, BlobError> {
        let base = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default();

        let clean: String = base
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if clean.is_empty() || clean.chars().all(|c| c == '.' || c == '_') {
            return Err(BlobError::InvalidFilename(filename.to_string()));
        }

        Ok(clean)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        owner_cedula: &str,
        filename: &str,
        stamp_millis: i64,
        bytes: &[u8],
    ) -> Result<StoredBlob, BlobError> {
        if owner_cedula.is_empty() || !owner_cedula.chars().all(char::is_alphanumeric) {
            return Err(BlobError::InvalidFilename(owner_cedula.to_string()));
        }

        let clean = Self::sanitize(filename)?;
        let relative = format!("{owner_cedula}/{stamp_millis}_{clean}");

        let full = self.root.join(owner_cedula);
        tokio::fs::create_dir_all(&full).await?;
        tokio::fs::write(self.root.join(&relative), bytes).await?;

        let public_url = format!("{}/{relative}", self.public_base);
        Ok(StoredBlob {
            path: relative,
            public_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_writes_under_owner_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/files");

        let stored = store
            .put("101110111", "receta.pdf", 1_718_100_000_000, b"%PDF-1.4")
            .await
            .unwrap();

        assert_eq!(stored.path, "101110111/1718100000000_receta.pdf");
        assert_eq!(stored.public_url, "/files/101110111/1718100000000_receta.pdf");

        let on_disk = std::fs::read(dir.path().join(&stored.path)).unwrap();
        assert_eq!(on_disk, b"%PDF-1.4");
    }

    #[tokio::test]
    async fn filenames_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/files");

        let stored = store
            .put("101", "../../etc/pass wd?.txt", 1, b"x")
            .await
            .unwrap();
        assert_eq!(stored.path, "101/1_pass_wd_.txt");
    }

    #[tokio::test]
    async fn empty_or_dot_only_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/files");

        assert!(store.put("101", "", 1, b"x").await.is_err());
        assert!(store.put("101", "..", 1, b"x").await.is_err());
        assert!(store.put("../101", "a.txt", 1, b"x").await.is_err());
    }

    #[tokio::test]
    async fn trailing_slash_in_base_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/files/");

        let stored = store.put("101", "a.txt", 1, b"x").await.unwrap();
        assert_eq!(stored.public_url, "/files/101/1_a.txt");
    }
}
