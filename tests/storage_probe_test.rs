mod common;

use r2_file_backend::config::R2Config;
use r2_file_backend::infrastructure::storage::setup_storage;
use r2_file_backend::services::upload_service::UploadService;

#[tokio::test]
async fn test_probe_against_unreachable_endpoint_does_not_fail() {
    common::init_tracing();
    // Nothing listens on port 1; the connection is refused immediately.
    let r2 = R2Config {
        endpoint: Some("http://127.0.0.1:1".to_string()),
        ..common::r2_config()
    };

    let storage = setup_storage(&r2).await;
    let service = UploadService::new(storage, r2);

    let probe = service.probe().await;
    assert!(!probe.success);
    assert!(probe.message.starts_with("R2 connection failed"));
    assert!(probe.error.is_some());
}

#[tokio::test]
async fn test_client_builds_without_configuration() {
    let r2 = R2Config::default();
    let storage = setup_storage(&r2).await;
    let service = UploadService::new(storage, r2);

    let probe = service.probe().await;
    assert!(!probe.success);
    assert!(probe.message.contains("Missing R2 configuration"));
}
