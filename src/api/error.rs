use crate::services::upload_service::UploadError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad Request: {message}")]
    BadRequest {
        message: String,
        errors: Vec<String>,
    },

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, error: impl Into<String>) -> Self {
        AppError::BadRequest {
            message: message.into(),
            errors: vec![error.into()],
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::InvalidArgument(msg) => AppError::bad_request(msg, "File is required"),
            UploadError::PayloadTooLarge { max, .. } => AppError::bad_request(
                "File too large",
                format!("File size must not exceed {}MB", max / 1024 / 1024),
            ),
            UploadError::UnsupportedMediaType(_) => {
                AppError::bad_request("Invalid file type", "File type not allowed")
            }
            UploadError::NotFound(_) => AppError::NotFound(e.to_string()),
            UploadError::Configuration { .. }
            | UploadError::Transfer(_)
            | UploadError::Delete(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            AppError::BadRequest { message, errors } => (message, errors),
            AppError::NotFound(msg) => (msg, Vec::new()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (msg, Vec::new())
            }
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "message": message,
            "errors": errors,
            "timestamp": Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}
