//! HTTP API for the xref-api binary.
//!
//! Mirrors the interactive workflow: upload a cross reference, pick SCP
//! engines from the returned list, then fetch previews or the export for
//! that selection. Uploads live in the router state, keyed by upload id.

use crate::config::XrefConfig;
use crate::document::{KeyReport, XrefDocument};
use crate::error::XrefError;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

/// Message shown for any upload that cannot be processed
pub const FILE_ERROR_MESSAGE: &str = "There was an error processing this file.";

/// Router state: configuration plus the uploads of this server instance
pub struct AppState {
    pub config: XrefConfig,
    uploads: RwLock<HashMap<Uuid, XrefDocument>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: XrefConfig) -> SharedState {
        Arc::new(Self {
            config,
            uploads: RwLock::new(HashMap::new()),
        })
    }

    pub async fn upload_count(&self) -> usize {
        self.uploads.read().await.len()
    }

    /// Store a document, evicting the oldest uploads beyond `max_uploads`
    async fn insert(&self, document: XrefDocument) {
        let mut uploads = self.uploads.write().await;
        let capacity = self.config.server.max_uploads.max(1);

        while uploads.len() >= capacity {
            let oldest = uploads
                .values()
                .min_by_key(|d| d.uploaded_at)
                .map(|d| d.id);
            match oldest {
                Some(id) => {
                    tracing::debug!("Evicting upload {}", id);
                    uploads.remove(&id);
                }
                None => break,
            }
        }

        uploads.insert(document.id, document);
    }

    /// Generate on a blocking thread from a snapshot of the upload, so the
    /// store is not locked while keys and the export are built
    async fn report(
        self: Arc<Self>,
        upload_id: Uuid,
        engines: Vec<String>,
    ) -> Result<(KeyReport, String), ApiError> {
        let document = self
            .uploads
            .read()
            .await
            .get(&upload_id)
            .cloned()
            .ok_or(ApiError::NotFound(upload_id))?;

        let state = self;
        let report = tokio::task::spawn_blocking(move || {
            document
                .generate(&engines, &state.config)
                .map(|report| (report, document.export_filename()))
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Key generation task failed: {}", e)))??;

        Ok(report)
    }
}

/// Build the API router
pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/api/example", get(example_report))
        .route("/api/uploads", post(create_upload))
        .route("/api/uploads/:upload_id", delete(delete_upload))
        .route("/api/uploads/:upload_id/keys", post(generate_keys))
        .route("/api/uploads/:upload_id/export", post(export_keys))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Request / response types

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub upload_id: Uuid,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub engines: Vec<String>,
    pub analog_rows: usize,
    pub digital_rows: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub engines: Vec<String>,
}

// Handlers

/// Health check endpoint (liveness)
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "xref-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Keys for the bundled example with its default engines
pub async fn example_report(
    State(state): State<SharedState>,
) -> Result<Json<KeyReport>, ApiError> {
    let document = XrefDocument::example()?;
    let report = document.generate(&XrefDocument::EXAMPLE_ENGINES, &state.config)?;
    Ok(Json(report))
}

/// Decode an uploaded file (raw request body) and list its engines
pub async fn create_upload(
    State(state): State<SharedState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let config = state.config.clone();
    let filename = params.filename;

    let document = tokio::task::spawn_blocking(move || {
        XrefDocument::load(&body, &filename, &config)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Upload task failed: {}", e)))??;

    let response = UploadResponse {
        upload_id: document.id,
        filename: document.filename.clone(),
        uploaded_at: document.uploaded_at,
        engines: document.engines().iter().cloned().collect(),
        analog_rows: document.analog().len(),
        digital_rows: document.digital().len(),
    };

    state.insert(document).await;
    tracing::info!("Upload {} stored ({})", response.upload_id, response.filename);

    Ok((StatusCode::CREATED, Json(response)))
}

/// Previews and key count for an engine selection
pub async fn generate_keys(
    State(state): State<SharedState>,
    Path(upload_id): Path<Uuid>,
    Json(selection): Json<SelectionRequest>,
) -> Result<Json<KeyReport>, ApiError> {
    let (report, _) = state.report(upload_id, selection.engines).await?;
    Ok(Json(report))
}

/// Downloadable CSV for an engine selection
pub async fn export_keys(
    State(state): State<SharedState>,
    Path(upload_id): Path<Uuid>,
    Json(selection): Json<SelectionRequest>,
) -> Result<Response, ApiError> {
    let (report, export_filename) = state.report(upload_id, selection.engines).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_filename),
            ),
        ],
        report.export,
    )
        .into_response())
}

/// Forget an upload
pub async fn delete_upload(
    State(state): State<SharedState>,
    Path(upload_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .uploads
        .write()
        .await
        .remove(&upload_id)
        .ok_or(ApiError::NotFound(upload_id))?;

    Ok(StatusCode::NO_CONTENT)
}

// Error handling

#[derive(Debug)]
pub enum ApiError {
    /// The uploaded file could not be processed
    InvalidFile(XrefError),
    NotFound(Uuid),
    Internal(String),
}

impl From<XrefError> for ApiError {
    fn from(err: XrefError) -> Self {
        if err.is_file_error() {
            ApiError::InvalidFile(err)
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidFile(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({
                    "error": FILE_ERROR_MESSAGE,
                    "detail": err.to_string(),
                }),
            ),
            ApiError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({
                    "error": format!("Upload {} not found", id),
                }),
            ),
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": message }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
