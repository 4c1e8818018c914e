//! HTTP handler layer
//!
//! Routes live in [`routes`]; this module holds the shared [`AppState`] and
//! the response bodies that are not plain records or schema documents.
//!
//! Every request that needs the schema re-reads the stored document and
//! rebuilds it, so a `PUT /config` takes effect on the next request.

pub mod routes;

pub use routes::create_router;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use contacts_core::Schema;

use crate::config::AppConfig;
use crate::error::{ApiError, ServerResult};
use crate::storage::{
    DocumentStore, FileDocumentStore, FsUploadStore, RecordStore, SledRecordStore, UploadStore,
};

/// State shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub documents: Arc<dyn DocumentStore>,
    pub records: Arc<dyn RecordStore>,
    pub uploads: Arc<dyn UploadStore>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        documents: Arc<dyn DocumentStore>,
        records: Arc<dyn RecordStore>,
        uploads: Arc<dyn UploadStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            documents,
            records,
            uploads,
            start_time: Instant::now(),
        }
    }

    /// Open the default file, sled and directory backends named by `config`
    pub async fn open(config: AppConfig) -> ServerResult<Self> {
        let documents = FileDocumentStore::new(&config.schema_path);
        documents.ensure_exists().await?;

        let uploads = FsUploadStore::new(&config.upload_dir);
        uploads.ensure_exists().await?;

        let records = SledRecordStore::open(&config.database_path)?;

        tracing::info!(
            schema = %config.schema_path.display(),
            uploads = %config.upload_dir.display(),
            database = %config.database_path.display(),
            "storage ready"
        );

        Ok(Self::new(
            config,
            Arc::new(documents),
            Arc::new(records),
            Arc::new(uploads),
        ))
    }

    /// Current schema, rebuilt from the stored document
    pub async fn load_schema(&self) -> Result<Schema, ApiError> {
        let document = self.documents.load().await?;
        let schema = Schema::load(&document).map_err(|e| {
            tracing::error!(error = %e, field = %e.field, "stored schema document is unusable");
            ApiError::Internal(format!("Stored schema is invalid: {}", e))
        })?;
        Ok(schema.with_options(self.config.check_options()))
    }
}

/// Health status of the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// `GET /health` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Whether the stored schema document loads
    pub schema_loaded: bool,
    pub uptime_seconds: u64,
    pub timestamp: String,
    pub version: String,
}

/// `POST /upload` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Name to store in a file-backed field
    pub filename: String,
}
