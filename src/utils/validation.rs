use crate::services::upload_service::UploadError;
use validator::ValidationError;

/// MIME types accepted for upload, matched against the type the client declared.
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "application/zip",
    "application/x-zip-compressed",
    "application/vnd.rar",
    "application/x-rar-compressed",
];

/// Content types advertised to the object store, keyed by lowercase extension.
///
/// Independent of [`ALLOWED_MIME_TYPES`]: the stored object is tagged from the
/// key's extension, not from the declared type, so a `.zip` accepted as
/// `application/zip` is stored as `application/octet-stream`.
const EXTENSION_CONTENT_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("txt", "text/plain"),
];

/// Validates the declared file size against the maximum limit
pub fn validate_file_size(size: u64, max_size: u64) -> Result<(), UploadError> {
    if size > max_size {
        return Err(UploadError::PayloadTooLarge {
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Validates the declared MIME type against the allow-list. Exact match only.
pub fn validate_mime_type(content_type: &str) -> Result<(), UploadError> {
    if ALLOWED_MIME_TYPES.contains(&content_type) {
        return Ok(());
    }
    Err(UploadError::UnsupportedMediaType(content_type.to_string()))
}

/// Content type for a storage key, derived from the text after its last `.`.
pub fn content_type_for_key(key: &str) -> &'static str {
    let ext = key.rsplit('.').next().unwrap_or_default().to_lowercase();
    EXTENSION_CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
        .unwrap_or("application/octet-stream")
}

/// Folder names may only contain letters, digits, hyphens and underscores.
pub fn validate_folder_chars(folder: &str) -> Result<(), ValidationError> {
    if folder
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Ok(());
    }
    let mut err = ValidationError::new("folder_chars");
    err.message = Some(
        "Folder name can only contain letters, numbers, hyphens, and underscores".into(),
    );
    Err(err)
}
