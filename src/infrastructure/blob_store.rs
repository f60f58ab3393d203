// Blob Store - durable storage for uploaded media, handing back public URLs

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Object storage collaborator. The returned URL must be publicly readable
/// as soon as `put` returns.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, bytes: Vec<u8>, content_type: &str, path_hint: &str) -> AppResult<String>;
}

/// An uploaded file as received from a request, before it reaches the store.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Path hint for storage: `{folder}/{uuid}{ext}`, keeping the client's extension.
    pub fn object_name(&self, folder: &str) -> String {
        let ext = Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default();
        format!("{}/{}{}", folder, Uuid::new_v4().simple(), ext)
    }
}

/// Upload a file under `folder` and return its public URL.
pub async fn upload_file(store: &dyn BlobStore, upload: Upload, folder: &str) -> AppResult<String> {
    let object_name = upload.object_name(folder);
    store
        .put(upload.bytes, &upload.content_type, &object_name)
        .await
}

/// Filesystem-backed blob store. Files are written below `root` and served
/// by the HTTP layer under `{public_base_url}/media/`.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, path_hint: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path_hint);
        let safe = relative
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)));
        if !safe || path_hint.is_empty() {
            return Err(AppError::Validation(format!("Invalid object name: {}", path_hint)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, bytes))]
    async fn put(&self, bytes: Vec<u8>, content_type: &str, path_hint: &str) -> AppResult<String> {
        let target = self.resolve(path_hint)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::StorageError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        tokio::fs::write(&target, &bytes).await.map_err(|e| {
            AppError::StorageError(format!("Failed to write {}: {}", target.display(), e))
        })?;

        info!("Stored {} ({})", path_hint, content_type);
        Ok(format!("{}/media/{}", self.public_base_url, path_hint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> Upload {
        Upload {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_object_name_keeps_extension() {
        let name = upload("Cover.PNG").object_name("thumbnails");
        assert!(name.starts_with("thumbnails/"));
        assert!(name.ends_with(".png"));

        let bare = upload("noext").object_name("media");
        assert!(!bare.contains('.'));
    }

    #[tokio::test]
    async fn test_put_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:3000/");

        let url = upload_file(&store, upload("a.jpg"), "media").await.unwrap();
        assert!(url.starts_with("http://localhost:3000/media/media/"));

        let relative = url.trim_start_matches("http://localhost:3000/media/");
        let written = tokio::fs::read(dir.path().join(relative)).await.unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_put_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:3000");
        let result = store.put(vec![0], "text/plain", "../evil.txt").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
