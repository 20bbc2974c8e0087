use crate::config::R2Config;
use crate::services::storage::S3StorageService;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the shared R2 client once at startup.
///
/// Missing settings do not stop the process: the client is still built and every
/// upload/delete/probe reports the gap as a configuration error.
pub async fn setup_storage(config: &R2Config) -> Arc<S3StorageService> {
    let missing = config.missing_settings();
    if !missing.is_empty() {
        warn!("⚠️  R2 storage is not fully configured, missing: {}", missing.join(", "));
    }

    let bucket = config.bucket_name.clone().unwrap_or_default();
    info!(
        "☁️  R2 Storage: {} (Bucket: {})",
        config.endpoint.as_deref().unwrap_or("<unset>"),
        bucket
    );

    Arc::new(S3StorageService::new(build_client(config).await, bucket))
}

pub async fn build_client(config: &R2Config) -> aws_sdk_s3::Client {
    let mut loader = aws_config::from_env()
        .region(Region::new(config.region.clone()))
        .credentials_provider(Credentials::new(
            config.access_key_id.clone().unwrap_or_default(),
            config.secret_access_key.clone().unwrap_or_default(),
            None,
            None,
            "static",
        ));
    if let Some(endpoint) = config.endpoint.as_deref() {
        loader = loader.endpoint_url(endpoint);
    }
    let aws_config = loader.load().await;

    // A failed transfer is reported once; the caller decides whether to try again.
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .retry_config(RetryConfig::disabled())
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
