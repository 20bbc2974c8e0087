use crate::config::{MAX_FILE_SIZE, R2Config};
use crate::services::storage::StorageService;
use crate::utils::storage_key::generate_storage_key;
use crate::utils::validation::{content_type_for_key, validate_file_size, validate_mime_type};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Missing R2 configuration: {}", .missing.join(", "))]
    Configuration { missing: Vec<&'static str> },

    #[error("File size too large. Maximum size is {}MB (got {size} bytes)", .max / 1024 / 1024)]
    PayloadTooLarge { size: u64, max: u64 },

    #[error(
        "Invalid file type '{0}'. Allowed types: images, PDF, documents, text files, and archives"
    )]
    UnsupportedMediaType(String),

    #[error("Local file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("R2 upload failed: {0}")]
    Transfer(String),

    #[error("R2 delete failed: {0}")]
    Delete(String),
}

/// Identity of whoever triggered the upload. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Uploader {
    pub id: String,
    pub name: Option<String>,
}

/// A file already staged on local disk, waiting to be pushed to the bucket.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub local_path: PathBuf,
    pub original_name: String,
    /// Size reported by the staging step; not re-measured.
    pub declared_size: u64,
    pub declared_mime_type: String,
    pub folder: Option<String>,
    pub uploaded_by: Option<Uploader>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    #[schema(example = "https://files.example.com/uploads/1700000000000-123456789.jpg")]
    pub public_url: String,
    #[schema(example = "uploads/1700000000000-123456789.jpg")]
    pub key: String,
    #[schema(example = "document.pdf")]
    pub file_name: String,
    #[schema(example = 1024000)]
    pub file_size: u64,
    #[schema(example = "application/pdf")]
    pub mime_type: String,
    pub uploaded_by: Option<Uploader>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProbeResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct UploadService {
    storage: Arc<dyn StorageService>,
    config: R2Config,
    max_file_size: u64,
}

impl UploadService {
    pub fn new(storage: Arc<dyn StorageService>, config: R2Config) -> Self {
        Self {
            storage,
            config,
            max_file_size: MAX_FILE_SIZE,
        }
    }

    /// Validates the staged file, pushes it to the bucket and returns its public URL.
    ///
    /// The staged file is gone when this returns, whatever the outcome.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResult, UploadError> {
        if request.local_path.as_os_str().is_empty() {
            return Err(UploadError::InvalidArgument("No file provided".to_string()));
        }

        match self.try_upload(&request).await {
            Ok(result) => Ok(result),
            Err(e) => {
                remove_local_file(&request.local_path).await;
                Err(e)
            }
        }
    }

    async fn try_upload(&self, request: &UploadRequest) -> Result<UploadResult, UploadError> {
        self.config.validate()?;
        validate_file_size(request.declared_size, self.max_file_size)?;
        validate_mime_type(&request.declared_mime_type)?;

        let is_file = tokio::fs::metadata(&request.local_path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(UploadError::NotFound(request.local_path.clone()));
        }

        let key = generate_storage_key(request.folder.as_deref(), &request.original_name);
        let content_type = content_type_for_key(&key);

        if let Err(e) = self
            .storage
            .put_file(&key, &request.local_path, content_type)
            .await
        {
            error!("Error uploading to R2: {}", e);
            return Err(UploadError::Transfer(e.to_string()));
        }

        remove_local_file(&request.local_path).await;

        let public_url = self.config.public_url_for(&key);
        info!("File uploaded successfully to R2: {}", public_url);

        Ok(UploadResult {
            public_url,
            key,
            file_name: request.original_name.clone(),
            file_size: request.declared_size,
            mime_type: request.declared_mime_type.clone(),
            uploaded_by: request.uploaded_by.clone(),
        })
    }

    /// Deletes `key` from the bucket. Deleting a missing key is left to the backend.
    pub async fn remove(&self, key: &str) -> Result<bool, UploadError> {
        if key.is_empty() {
            return Err(UploadError::InvalidArgument(
                "Key (filename) is required".to_string(),
            ));
        }
        self.config.validate()?;

        self.storage.delete_object(key).await.map_err(|e| {
            error!("Error deleting file from R2: {}", e);
            UploadError::Delete(e.to_string())
        })?;

        info!("File deleted successfully from R2: {}", key);
        Ok(true)
    }

    /// Reachability check for health reporting. Never fails; problems land in the result.
    pub async fn probe(&self) -> ProbeResult {
        let outcome = match self.config.validate() {
            Ok(()) => self.storage.head_bucket().await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match outcome {
            Ok(()) => ProbeResult {
                success: true,
                message: "R2 connection successful".to_string(),
                error: None,
            },
            Err(msg) => {
                warn!("R2 connection test failed: {}", msg);
                ProbeResult {
                    success: false,
                    message: format!("R2 connection failed: {}", msg),
                    error: Some(msg),
                }
            }
        }
    }
}

/// Best-effort removal of a staged file. Failures are logged, never returned.
pub async fn remove_local_file(path: &Path) {
    if path.as_os_str().is_empty() {
        return;
    }
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!("Local file removed: {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove local file {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStorage {
        puts: Mutex<Vec<(String, String)>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl StorageService for RecordingStorage {
        async fn put_file(
            &self,
            key: &str,
            _local_path: &Path,
            content_type: &str,
        ) -> anyhow::Result<()> {
            if let Some(msg) = &self.fail_with {
                return Err(anyhow!(msg.clone()));
            }
            self.puts
                .lock()
                .unwrap()
                .push((key.to_string(), content_type.to_string()));
            Ok(())
        }

        async fn delete_object(&self, _key: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn head_bucket(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn r2_config() -> R2Config {
        R2Config {
            account_id: Some("acc".to_string()),
            access_key_id: Some("key".to_string()),
            secret_access_key: Some("secret".to_string()),
            bucket_name: Some("bucket".to_string()),
            endpoint: Some("http://localhost:9000".to_string()),
            public_url: Some("https://cdn.example.com".to_string()),
            region: "auto".to_string(),
        }
    }

    fn staged(dir: &tempfile::TempDir, name: &str, mime: &str, size: u64) -> UploadRequest {
        let path = dir.path().join(name);
        std::fs::write(&path, b"hello").unwrap();
        UploadRequest {
            local_path: path,
            original_name: name.to_string(),
            declared_size: size,
            declared_mime_type: mime.to_string(),
            folder: None,
            uploaded_by: None,
        }
    }

    #[tokio::test]
    async fn test_stored_content_type_follows_extension_not_declared_type() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(RecordingStorage::default());
        let service = UploadService::new(storage.clone(), r2_config());

        // Declared as plain text, but the key's extension says PNG.
        let request = staged(&dir, "image.png", "text/plain", 5);
        service.upload(request).await.unwrap();

        let puts = storage.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].1, "image/png");
    }

    #[tokio::test]
    async fn test_transfer_failure_cleans_up_and_wraps_message() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(RecordingStorage {
            fail_with: Some("connection reset".to_string()),
            ..Default::default()
        });
        let service = UploadService::new(storage, r2_config());

        let request = staged(&dir, "notes.txt", "text/plain", 5);
        let path = request.local_path.clone();
        let err = service.upload(request).await.unwrap_err();

        match err {
            UploadError::Transfer(msg) => assert!(msg.contains("connection reset")),
            other => panic!("expected transfer error, got {:?}", other),
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_empty_path_is_invalid_argument() {
        let service = UploadService::new(Arc::new(RecordingStorage::default()), r2_config());
        let request = UploadRequest {
            local_path: PathBuf::new(),
            original_name: "a.txt".to_string(),
            declared_size: 1,
            declared_mime_type: "text/plain".to_string(),
            folder: None,
            uploaded_by: None,
        };
        let err = service.upload(request).await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidArgument(_)));
        assert_eq!(err.to_string(), "No file provided");
    }

    #[tokio::test]
    async fn test_configuration_checked_before_size() {
        let dir = tempfile::tempdir().unwrap();
        let config = R2Config {
            endpoint: None,
            ..r2_config()
        };
        let service = UploadService::new(Arc::new(RecordingStorage::default()), config);

        let request = staged(&dir, "big.pdf", "application/pdf", MAX_FILE_SIZE + 1);
        let path = request.local_path.clone();
        let err = service.upload(request).await.unwrap_err();

        assert!(matches!(err, UploadError::Configuration { .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_directory_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(RecordingStorage::default());
        let service = UploadService::new(storage.clone(), r2_config());

        let request = UploadRequest {
            local_path: dir.path().to_path_buf(),
            original_name: "folder.txt".to_string(),
            declared_size: 1,
            declared_mime_type: "text/plain".to_string(),
            folder: None,
            uploaded_by: None,
        };
        let err = service.upload(request).await.unwrap_err();

        assert!(matches!(err, UploadError::NotFound(_)));
        assert!(storage.puts.lock().unwrap().is_empty());
        assert!(dir.path().is_dir());
    }

    #[test]
    fn test_error_messages() {
        let err = UploadError::Configuration {
            missing: vec!["R2_BUCKET_NAME", "R2_ENDPOINT"],
        };
        assert_eq!(
            err.to_string(),
            "Missing R2 configuration: R2_BUCKET_NAME, R2_ENDPOINT"
        );

        let err = UploadError::PayloadTooLarge {
            size: MAX_FILE_SIZE + 1,
            max: MAX_FILE_SIZE,
        };
        assert!(err.to_string().starts_with("File size too large. Maximum size is 10MB"));
    }
}
