use crate::AppState;
use crate::api::response::ApiResponse;
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    #[schema(example = true)]
    pub backend: bool,
    #[schema(example = true)]
    pub postgres: bool,
    #[schema(example = false)]
    pub r2: bool,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "development")]
    pub environment: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/health-check",
    responses(
        (status = 200, description = "Health check completed", body = HealthEnvelope)
    ),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthReport> {
    let postgres = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            error!("PostgreSQL health check failed: {}", e);
            false
        }
    };

    let r2 = state.upload_service.probe().await.success;

    ApiResponse::ok(
        HealthReport {
            backend: true,
            postgres,
            r2,
            timestamp: Utc::now(),
            environment: state.config.environment.clone(),
        },
        "Health check completed",
    )
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Server is up")),
    tag = "Health"
)]
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "data": null,
        "message": "Server is up and running 🚀",
        "route": "/",
        "description": "This is the root route of the server",
        "environment": state.config.environment,
    }))
}

#[utoipa::path(
    get,
    path = "/about",
    responses((status = 200, description = "About page")),
    tag = "Health"
)]
pub async fn about() -> Json<Value> {
    Json(json!({
        "data": null,
        "message": "You have landed on about page route",
        "route": "/about",
        "description": "This is the about route of the server",
    }))
}
