//! Contacts Core
//!
//! Schema validation engine for dynamically-defined contact records. An
//! administrator describes the record fields in a JSON document; this crate
//! validates that document and then checks records against it before they are
//! persisted.
//!
//! ## Components
//!
//! - **Registry** (`registry`): the closed set of field kinds and their checkers
//! - **Field** (`field`): a named, typed, optionally required slot
//! - **Schema** (`schema`): ordered fields loaded from a document, and the
//!   record check
//! - **Validator** (`validator`): structural validation of raw schema documents
//!
//! Everything here is pure and synchronous: no I/O, no shared mutable state.
//!
//! ## Example
//!
//! ```rust
//! use contacts_core::{Schema, Violation};
//! use serde_json::json;
//!
//! let document = json!({
//!     "id": {"type": "integer", "primary_key": true, "required": true},
//!     "firstname": {"type": "str", "required": true}
//! });
//! let schema = Schema::validated(&document).unwrap();
//!
//! let record = json!({"firstname": "Luke"});
//! assert!(schema.check(record.as_object().unwrap(), &["id"]).is_ok());
//!
//! let record = json!({"firstname": 42});
//! assert!(matches!(
//!     schema.check(record.as_object().unwrap(), &["id"]),
//!     Err(Violation::WrongType { .. })
//! ));
//! ```

pub mod error;
pub mod field;
pub mod params;
pub mod registry;
pub mod schema;
pub mod validator;

pub use error::{CheckResult, InvalidSchema, Names, SchemaResult, TypeMismatch, Violation};
pub use field::{is_empty_value, Field};
pub use registry::{CheckOptions, Constraints, FieldKind, UntypedListPolicy, FILE_BACKED_KINDS};
pub use schema::{Schema, SchemaLayout};
pub use validator::validate_schema_document;

/// Field assigned by the record store rather than by users
pub const SYSTEM_ID_FIELD: &str = "id";
