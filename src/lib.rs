pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::UploadPolicy;
use crate::services::notifier::Notifier;
use crate::services::storage::StorageBackend;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::attachments::upload_batch,
        api::handlers::attachments::delete_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::StorageKey,
            models::RejectReason,
            models::FailureKind,
            models::UploadFailure,
            api::handlers::attachments::UploadResponse,
            api::handlers::attachments::DeleteRequest,
            api::handlers::attachments::DeleteResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "attachments", description = "Batch upload and removal of stored files"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageBackend>,
    pub notifier: Arc<dyn Notifier>,
    pub policy: UploadPolicy,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/upload", post(api::handlers::attachments::upload_batch))
        .route("/files", delete(api::handlers::attachments::delete_file))
        .with_state(state)
}
