//! Violation types for instance and schema validation
//!
//! Instance checks fail with a [`Violation`]; schema documents fail with an
//! [`InvalidSchema`]. Both serialize to the payload shape surfaced verbatim
//! to API consumers.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::registry::FieldKind;

/// A single name or a list of names carried by a violation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Names {
    One(String),
    Many(Vec<String>),
}

impl Names {
    /// All names as a slice
    pub fn as_slice(&self) -> &[String] {
        match self {
            Names::One(name) => std::slice::from_ref(name),
            Names::Many(names) => names,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.as_slice().iter().any(|n| n == name)
    }
}

impl From<&str> for Names {
    fn from(name: &str) -> Self {
        Names::One(name.to_string())
    }
}

impl From<String> for Names {
    fn from(name: String) -> Self {
        Names::One(name)
    }
}

impl From<Vec<String>> for Names {
    fn from(names: Vec<String>) -> Self {
        Names::Many(names)
    }
}

impl From<Vec<&str>> for Names {
    fn from(names: Vec<&str>) -> Self {
        Names::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Names {
    fn from(names: [&str; N]) -> Self {
        Names::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl fmt::Display for Names {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_slice().join(", "))
    }
}

/// Failure of an instance check
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Violation {
    /// A required field has no (or an empty) value
    #[error("Missing value for required field '{field}'")]
    MissingRequiredValue { field: String },

    /// A value does not satisfy its field's type
    #[error("Wrong type for field '{field}', expected {expected_type}")]
    WrongType { field: String, expected_type: String },
}

impl Violation {
    /// Name of the field that failed
    pub fn field(&self) -> &str {
        match self {
            Violation::MissingRequiredValue { field } | Violation::WrongType { field, .. } => field,
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Violation::MissingRequiredValue { .. } => "missing_required_value",
            Violation::WrongType { .. } => "wrong_type",
        }
    }
}

/// Type checker failure, not yet attributed to a field
///
/// Checkers do not know which field invoked them; [`crate::Field`] turns this
/// into a [`Violation::WrongType`] carrying its own name.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("value is not a valid {}", .expected.display_name())]
pub struct TypeMismatch {
    pub expected: FieldKind,
}

impl TypeMismatch {
    pub fn new(expected: FieldKind) -> Self {
        Self { expected }
    }

    /// Attach the name of the field whose value failed
    pub fn for_field(self, field: &str) -> Violation {
        Violation::WrongType {
            field: field.to_string(),
            expected_type: self.expected.display_name().to_string(),
        }
    }
}

/// Rejection of a raw schema document
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct InvalidSchema {
    /// Offending field name(s); empty when the rule is document-wide
    pub field: Names,
    /// Offending parameter name(s)
    pub param: Names,
    /// Human-readable explanation
    pub message: String,
}

impl InvalidSchema {
    pub const CODE: &'static str = "invalid_schema";

    pub fn new(field: impl Into<Names>, param: impl Into<Names>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            param: param.into(),
            message: message.into(),
        }
    }
}

/// Result of an instance check
pub type CheckResult = std::result::Result<(), Violation>;

/// Result of schema validation or loading
pub type SchemaResult<T> = std::result::Result<T, InvalidSchema>;
