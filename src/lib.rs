pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::upload_service::UploadService;
use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Extra room on top of the file limit for multipart boundaries and form fields.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "R2 File Backend API",
        description = "Health check and file upload endpoints backed by PostgreSQL and Cloudflare R2"
    ),
    paths(
        api::handlers::health::root,
        api::handlers::health::about,
        api::handlers::health::health_check,
        api::handlers::files::upload_file,
        api::handlers::files::delete_file,
    ),
    components(
        schemas(
            api::handlers::health::HealthReport,
            api::handlers::files::UploadForm,
            api::handlers::files::DeleteResult,
            api::response::HealthEnvelope,
            api::response::UploadEnvelope,
            api::response::DeleteEnvelope,
            services::upload_service::UploadResult,
            services::upload_service::Uploader,
        )
    ),
    tags(
        (name = "Health", description = "API health check endpoints"),
        (name = "File-Upload", description = "File upload and management endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub upload_service: Arc<UploadService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_file_size as usize + MULTIPART_OVERHEAD;

    Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::health::root))
        .route("/about", get(api::handlers::health::about))
        .route("/api/v1/health-check", get(api::handlers::health::health_check))
        .route(
            "/api/v1/file/upload-file",
            post(api::handlers::files::upload_file)
                .layer(axum::extract::DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/v1/file/delete-file/*key", delete(api::handlers::files::delete_file))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
