use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope shared by every JSON endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    HealthEnvelope = ApiResponse<crate::api::handlers::health::HealthReport>,
    UploadEnvelope = ApiResponse<crate::services::upload_service::UploadResult>,
    DeleteEnvelope = ApiResponse<crate::api::handlers::files::DeleteResult>
)]
pub struct ApiResponse<T> {
    #[schema(example = 200)]
    pub status: u16,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            data,
            message: message.into(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
