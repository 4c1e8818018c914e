//! Route definitions for the contacts service
//!
//! - GET /health - Health check
//! - GET /config, PUT /config - Read or replace the schema document
//! - GET /config/layout - Display summary of the schema
//! - GET /contact, POST /contact - List or create contacts
//! - PUT /contact/:id, DELETE /contact/:id - Update or delete a contact
//! - POST /upload - Store an uploaded file
//! - GET /uploads/* - Serve uploaded files

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{Map, Value};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use contacts_core::{validate_schema_document, SchemaLayout, SYSTEM_ID_FIELD};

use super::{AppState, HealthResponse, HealthStatus, UploadResponse};
use crate::error::ApiError;

/// Multipart part carrying the uploaded file
pub const UPLOAD_PART: &str = "file";

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let upload_dir = state.config.upload_dir.clone();
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/config", get(get_config).put(put_config))
        .route("/config/layout", get(get_layout))
        .route("/contact", get(list_contacts).post(create_contact))
        .route("/contact/:id", put(update_contact).delete(delete_contact))
        .route("/upload", post(upload_file))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Contact infos from a request body
///
/// The id is assigned by the store, so any `id` sent by the client is dropped.
fn contact_infos(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    let Value::Object(mut infos) = json_body(body)? else {
        return Err(ApiError::bad_request("Contact must be a JSON object"));
    };
    infos.remove(SYSTEM_ID_FIELD);
    if infos.is_empty() {
        return Err(ApiError::bad_request("Missing data"));
    }
    Ok(infos)
}

fn contact_id(id: Result<Path<u64>, PathRejection>) -> Result<u64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ApiError::not_found(rejection.body_text()))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let schema_loaded = state.load_schema().await.is_ok();
    let status = if schema_loaded {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    Json(HealthResponse {
        status,
        schema_loaded,
        uptime_seconds: state.start_time.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /config - The stored schema document, `{}` when none was set
pub async fn get_config(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.documents.load().await?))
}

/// PUT /config - Validate and replace the schema document
pub async fn put_config(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let document = json_body(body)?;
    validate_schema_document(&document)?;
    state.documents.save(&document).await?;

    let fields = document.as_object().map_or(0, Map::len);
    tracing::info!(fields, "schema document replaced");
    Ok(Json(document))
}

/// GET /config/layout
pub async fn get_layout(State(state): State<AppState>) -> Result<Json<SchemaLayout>, ApiError> {
    Ok(Json(state.load_schema().await?.layout()))
}

/// GET /contact
pub async fn list_contacts(State(state): State<AppState>) -> Result<Json<Vec<Value>>, ApiError> {
    let records = state.records.list().await?;
    Ok(Json(records.iter().map(|r| r.format_infos()).collect()))
}

/// POST /contact
pub async fn create_contact(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let infos = contact_infos(body)?;
    let schema = state.load_schema().await?;
    schema.check(&infos, &[SYSTEM_ID_FIELD])?;

    let record = state.records.create(infos).await?;
    tracing::info!(id = record.id, "contact created");
    Ok(Json(record.format_infos()))
}

/// PUT /contact/:id - Merge the body into the stored infos
///
/// The merged record is what gets checked, so a partial update of a valid
/// contact only has to be valid for the fields it touches.
pub async fn update_contact(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = contact_id(id)?;
    let record = state
        .records
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Contact {} not found", id)))?;
    let changes = contact_infos(body)?;

    let mut infos = record.infos;
    infos.extend(changes);

    let schema = state.load_schema().await?;
    schema.check(&infos, &[SYSTEM_ID_FIELD])?;

    let record = state.records.update(id, infos).await?;
    tracing::info!(id, "contact updated");
    Ok(Json(record.format_infos()))
}

/// DELETE /contact/:id - Delete a contact and the files it references
pub async fn delete_contact(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = contact_id(id)?;
    let record = state
        .records
        .delete(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Contact {} not found", id)))?;
    tracing::info!(id, "contact deleted");

    let schema = match state.load_schema().await {
        Ok(schema) => schema,
        Err(e) => {
            tracing::warn!(id, error = %e, "skipping upload cleanup");
            return Ok(StatusCode::OK);
        }
    };
    for filename in schema.file_references(&record.infos) {
        if let Err(e) = state.uploads.remove(&filename).await {
            tracing::warn!(id, %filename, error = %e, "could not remove upload");
        }
    }
    Ok(StatusCode::OK)
}

/// POST /upload - Store the `file` part of a multipart body
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.to_string()))?
    {
        if part.name() != Some(UPLOAD_PART) {
            continue;
        }
        let original_name = part.file_name().unwrap_or_default().to_string();
        let bytes = part
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }

        let filename = state.uploads.save(&original_name, &bytes).await?;
        return Ok(Json(UploadResponse { filename }));
    }

    Err(ApiError::bad_request(format!(
        "Missing multipart part '{}'",
        UPLOAD_PART
    )))
}
