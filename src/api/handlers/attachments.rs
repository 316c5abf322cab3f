use crate::api::error::AppError;
use crate::models::{FileDescriptor, StorageKey, UploadFailure};
use crate::services::uploader::BatchUploader;
use axum::{
    Json,
    extract::{Multipart, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UploadResponse {
    /// Full canonical list after the batch: pre-existing keys plus the new
    /// ones, order preserved.
    pub keys: Vec<StorageKey>,
    /// Keys stored by this batch, in submission order.
    pub uploaded: Vec<StorageKey>,
    pub failures: Vec<UploadFailure>,
    /// Set when a backend fault cut the batch short.
    pub fault: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct DeleteRequest {
    pub key: StorageKey,
    /// Canonical list the caller currently holds; returned updated.
    #[serde(default)]
    pub existing: Vec<StorageKey>,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub keys: Vec<StorageKey>,
    /// False when the key was deleted in the backend but absent from `existing`.
    pub removed: bool,
}

/// The service holds no list state of its own: every request seeds an
/// uploader from the caller-supplied `existing` keys and hands the updated
/// canonical list back in the response.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = Multipart, description = "owner_id field, optional context_id and existing (JSON array of keys), one or more file parts"),
    responses(
        (status = 200, description = "Batch settled, canonical list returned", body = UploadResponse),
        (status = 400, description = "Malformed multipart request"),
        (status = 409, description = "Batch would exceed the file limit")
    ),
    tag = "attachments"
)]
pub async fn upload_batch(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut owner_id: Option<String> = None;
    let mut context_id: Option<String> = None;
    let mut existing: Vec<StorageKey> = Vec::new();
    let mut files: Vec<FileDescriptor> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "owner_id" => {
                owner_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            "context_id" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !value.is_empty() {
                    context_id = Some(value);
                }
            }
            "existing" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                existing = serde_json::from_str(&raw)
                    .map_err(|e| AppError::BadRequest(format!("Invalid existing list: {e}")))?;
            }
            "file" => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                files.push(FileDescriptor::new(filename, content));
            }
            _ => {}
        }
    }

    let owner_id = owner_id
        .filter(|o| !o.is_empty())
        .ok_or_else(|| AppError::BadRequest("owner_id field is required".to_string()))?;

    if files.is_empty() {
        return Err(AppError::BadRequest("No file parts in request".to_string()));
    }

    let uploader = BatchUploader::new(
        state.storage.clone(),
        state.notifier.clone(),
        state.policy.clone(),
        owner_id,
        context_id,
        existing,
    );

    let result = uploader.submit_batch(files).await?;

    Ok(Json(UploadResponse {
        keys: uploader.stored_keys(),
        uploaded: result.keys,
        failures: result.failures,
        fault: result.fault,
    }))
}

#[utoipa::path(
    delete,
    path = "/files",
    request_body = DeleteRequest,
    responses(
        (status = 200, description = "Key deleted, updated list returned", body = DeleteResponse),
        (status = 502, description = "Backend delete failed; list unchanged")
    ),
    tag = "attachments"
)]
pub async fn delete_file(
    State(state): State<crate::AppState>,
    Json(req): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, AppError> {
    // Removal never touches the namer; the owner segment is only carried so
    // the uploader can be constructed.
    let owner_id = req
        .key
        .as_str()
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string();

    let uploader = BatchUploader::new(
        state.storage.clone(),
        state.notifier.clone(),
        state.policy.clone(),
        owner_id,
        None,
        req.existing,
    );

    let removed = uploader.remove(&req.key).await?;

    Ok(Json(DeleteResponse {
        keys: uploader.stored_keys(),
        removed,
    }))
}
