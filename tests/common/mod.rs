#![allow(dead_code)]

use async_trait::async_trait;
use r2_file_backend::config::R2Config;
use r2_file_backend::services::storage::StorageService;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-memory bucket. `fail_puts` / `fail_deletes` / `unreachable` simulate backend outages.
#[derive(Default)]
pub struct MockStorageService {
    pub objects: Mutex<HashMap<String, StoredObject>>,
    pub fail_puts: bool,
    pub fail_deletes: bool,
    pub unreachable: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn put_file(&self, key: &str, local_path: &Path, content_type: &str) -> anyhow::Result<()> {
        if self.fail_puts {
            return Err(anyhow::anyhow!("simulated network failure"));
        }
        let data = tokio::fs::read(local_path).await?;
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        if self.fail_deletes {
            return Err(anyhow::anyhow!("access denied"));
        }
        // S3 semantics: deleting a missing key succeeds.
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn head_bucket(&self) -> anyhow::Result<()> {
        if self.unreachable {
            return Err(anyhow::anyhow!("dispatch failure: connection refused"));
        }
        Ok(())
    }
}

pub fn r2_config() -> R2Config {
    R2Config {
        account_id: Some("test-account".to_string()),
        access_key_id: Some("test-key".to_string()),
        secret_access_key: Some("test-secret".to_string()),
        bucket_name: Some("test-bucket".to_string()),
        endpoint: Some("http://127.0.0.1:9000".to_string()),
        public_url: Some("https://files.example.com".to_string()),
        region: "auto".to_string(),
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
