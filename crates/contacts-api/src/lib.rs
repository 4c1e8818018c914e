//! Contacts API
//!
//! HTTP service and CLI around [`contacts_core`]. The administrator edits the
//! schema document through `/config`; contacts posted to `/contact` are checked
//! against it before they are stored.
//!
//! ## Components
//!
//! - **Storage** (`storage`): schema document file, sled record store,
//!   upload directory
//! - **Handler** (`handler`): axum router and shared state
//! - **CLI** (`cli`): `serve`, `check-schema` and `check-record`
//! - **Config** (`config`): TOML configuration with CLI/env overrides

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod storage;

pub use config::AppConfig;
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::{create_router, AppState};
pub use storage::{
    DocumentStore, FileDocumentStore, FsUploadStore, Record, RecordStore, SledRecordStore,
    StorageError, UploadStore,
};
