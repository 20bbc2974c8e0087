use crate::AppState;
use crate::api::error::AppError;
use crate::api::response::ApiResponse;
use crate::services::upload_service::{
    UploadRequest, UploadResult, Uploader, remove_local_file,
};
use axum::{
    extract::{
        Multipart, Path, State,
        multipart::{Field, MultipartError},
    },
    http::{HeaderMap, StatusCode},
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;
use utoipa::ToSchema;
use validator::Validate;

/// Multipart form accepted by the upload endpoint. Documentation only.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// File to upload (max 10MB)
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    /// Optional folder name to organize files, e.g. pdf, images
    #[schema(example = "documents", max_length = 50, pattern = r"^[a-zA-Z0-9\-_]+$")]
    folder: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResult {
    #[schema(example = "uploads/1700000000000-123456789.jpg")]
    pub key: String,
    pub deleted: bool,
}

#[derive(Debug, Validate)]
struct FolderField {
    #[validate(
        length(min = 1, max = 50, message = "Folder name must not exceed 50 characters"),
        custom(function = "crate::utils::validation::validate_folder_chars")
    )]
    folder: String,
}

/// A file part written to the staging directory.
struct StagedFile {
    path: PathBuf,
    original_name: String,
    size: u64,
    mime_type: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/file/upload-file",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded successfully", body = UploadEnvelope),
        (status = 400, description = "No file provided, invalid file type, file too large or invalid folder name"),
        (status = 404, description = "Staged file disappeared before transfer"),
        (status = 500, description = "Storage misconfigured or upload failed")
    ),
    tag = "File-Upload"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<ApiResponse<UploadResult>, AppError> {
    let mut staged: Option<StagedFile> = None;
    let mut folder: Option<String> = None;

    let form = async {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    if staged.is_some() {
                        return Err(AppError::bad_request(
                            "Validation failed",
                            "Only one file may be uploaded per request",
                        ));
                    }
                    staged = Some(stage_field(&state, field).await?);
                }
                "folder" => {
                    let text = field.text().await.map_err(multipart_error)?;
                    folder = Some(text.trim().to_string()).filter(|f| !f.is_empty());
                }
                _ => {}
            }
        }

        if let Some(folder) = &folder {
            FolderField {
                folder: folder.clone(),
            }
            .validate()
            .map_err(|e| AppError::BadRequest {
                message: "Validation failed".to_string(),
                errors: validation_messages(&e),
            })?;
        }
        Ok::<(), AppError>(())
    }
    .await;

    if let Err(e) = form {
        if let Some(staged) = &staged {
            remove_local_file(&staged.path).await;
        }
        tracing::warn!("Upload rejected before transfer: {}", e);
        return Err(e);
    }

    let staged = staged.ok_or_else(|| AppError::bad_request("No file provided", "File is required"))?;

    let result = state
        .upload_service
        .upload(UploadRequest {
            local_path: staged.path,
            original_name: staged.original_name,
            declared_size: staged.size,
            declared_mime_type: staged.mime_type,
            folder,
            uploaded_by: uploader_from_headers(&headers),
        })
        .await?;

    Ok(ApiResponse::ok(result, "File uploaded successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/file/delete-file/{key}",
    params(
        ("key" = String, Path, description = "Storage key returned by the upload endpoint")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteEnvelope),
        (status = 400, description = "Missing key"),
        (status = 500, description = "Storage misconfigured or delete failed")
    ),
    tag = "File-Upload"
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<DeleteResult>, AppError> {
    let key = key.trim_start_matches('/').to_string();
    let deleted = state.upload_service.remove(&key).await?;
    Ok(ApiResponse::ok(
        DeleteResult { key, deleted },
        "File deleted successfully",
    ))
}

/// Streams a multipart file part to a fresh file under the staging directory.
async fn stage_field(state: &AppState, field: Field<'_>) -> Result<StagedFile, AppError> {
    let original_name = field.file_name().unwrap_or_default().to_string();
    let mime_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

    let upload_dir = &state.config.upload_dir;
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create staging directory: {}", e)))?;

    let (file, path) = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(upload_dir)
        .and_then(|f| f.keep().map_err(|e| e.error))
        .map_err(|e| AppError::Internal(format!("Failed to create staging file: {}", e)))?;
    let mut file = tokio::fs::File::from_std(file);

    let mut reader = StreamReader::new(field.map_err(std::io::Error::other));
    let copied = match tokio::io::copy(&mut reader, &mut file).await {
        Ok(size) => file.flush().await.map(|()| size),
        Err(e) => Err(e),
    };
    let size = match copied {
        Ok(size) => size,
        Err(e) => {
            drop(file);
            remove_local_file(&path).await;
            // The multipart error travels inside the io::Error built by the reader.
            let body_too_large = e
                .get_ref()
                .and_then(|inner| inner.downcast_ref::<MultipartError>())
                .is_some_and(|m| m.status() == StatusCode::PAYLOAD_TOO_LARGE);
            if body_too_large {
                return Err(file_too_large());
            }
            return Err(AppError::bad_request(
                "Upload interrupted",
                format!("Failed to read file: {}", e),
            ));
        }
    };

    tracing::debug!(
        "Staged '{}' ({} bytes, {}) at {}",
        original_name,
        size,
        mime_type,
        path.display()
    );

    Ok(StagedFile {
        path,
        original_name,
        size,
        mime_type,
    })
}

/// Identity forwarded by an upstream gateway, if any.
fn uploader_from_headers(headers: &HeaderMap) -> Option<Uploader> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    header("x-user-id").map(|id| Uploader {
        id,
        name: header("x-user-name"),
    })
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        file_too_large()
    } else {
        AppError::bad_request("Invalid multipart body", e.body_text())
    }
}

fn file_too_large() -> AppError {
    AppError::bad_request("File too large", "File size must not exceed 10MB")
}

fn validation_messages(e: &validator::ValidationErrors) -> Vec<String> {
    e.field_errors()
        .values()
        .flat_map(|errors| errors.iter())
        .map(|err| {
            err.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_uploader_requires_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-name", HeaderValue::from_static("Jane"));
        assert_eq!(uploader_from_headers(&headers), None);

        headers.insert("x-user-id", HeaderValue::from_static("42"));
        assert_eq!(
            uploader_from_headers(&headers),
            Some(Uploader {
                id: "42".to_string(),
                name: Some("Jane".to_string()),
            })
        );
    }

    #[test]
    fn test_folder_rules() {
        let ok = FolderField {
            folder: "invoices".to_string(),
        };
        assert!(ok.validate().is_ok());

        let too_long = FolderField {
            folder: "a".repeat(51),
        };
        let errors = validation_messages(&too_long.validate().unwrap_err());
        assert_eq!(errors, vec!["Folder name must not exceed 50 characters"]);

        let bad_chars = FolderField {
            folder: "a/b".to_string(),
        };
        let errors = validation_messages(&bad_chars.validate().unwrap_err());
        assert_eq!(
            errors,
            vec!["Folder name can only contain letters, numbers, hyphens, and underscores"]
        );
    }
}
