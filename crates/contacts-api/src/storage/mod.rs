//! Storage collaborators of the API
//!
//! The schema engine never touches storage itself. These traits describe what
//! the HTTP layer needs around it:
//!
//! - [`DocumentStore`]: the raw schema document
//! - [`RecordStore`]: contact records keyed by a generated id
//! - [`UploadStore`]: uploaded files keyed by file name
//!
//! Implementations are runtime-selectable behind `Arc<dyn ...>`.

pub mod document;
pub mod records;
pub mod uploads;

pub use document::FileDocumentStore;
pub use records::SledRecordStore;
pub use uploads::FsUploadStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use contacts_core::SYSTEM_ID_FIELD;

/// Errors raised by storage backends
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Record {0} not found")]
    NotFound(u64),

    #[error("Invalid file name: {0}")]
    InvalidName(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A stored contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub infos: Map<String, Value>,
    pub inserted_timestamp: DateTime<Utc>,
}

impl Record {
    /// The record as returned to API consumers: its infos plus its id
    pub fn format_infos(&self) -> Value {
        let mut infos = self.infos.clone();
        infos.insert(SYSTEM_ID_FIELD.to_string(), Value::from(self.id));
        Value::Object(infos)
    }
}

/// Source of truth for the schema document
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Current document; an empty object when none was saved yet
    async fn load(&self) -> StorageResult<Value>;

    /// Replace the document
    async fn save(&self, document: &Value) -> StorageResult<()>;
}

/// Contact record persistence
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list(&self) -> StorageResult<Vec<Record>>;

    async fn get(&self, id: u64) -> StorageResult<Option<Record>>;

    /// Store new infos under a freshly generated id
    async fn create(&self, infos: Map<String, Value>) -> StorageResult<Record>;

    /// Replace the infos of an existing record
    async fn update(&self, id: u64, infos: Map<String, Value>) -> StorageResult<Record>;

    /// Remove a record, returning it if it existed
    async fn delete(&self, id: u64) -> StorageResult<Option<Record>>;
}

/// Uploaded file storage
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Store bytes under a generated name keeping the original extension
    async fn save(&self, original_name: &str, bytes: &[u8]) -> StorageResult<String>;

    /// Delete a stored file; `false` when it did not exist
    async fn remove(&self, filename: &str) -> StorageResult<bool>;
}
