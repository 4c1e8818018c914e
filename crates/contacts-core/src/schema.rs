//! Record schemas
//!
//! A [`Schema`] is the ordered list of [`Field`]s described by a schema
//! document. It is cheap to rebuild and holds no state of its own: the
//! document stays the source of truth, so callers that cache a `Schema` must
//! drop it whenever the document changes.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CheckResult, InvalidSchema, SchemaResult};
use crate::field::Field;
use crate::registry::{CheckOptions, FieldKind};
use crate::validator::validate_schema_document;

/// Ordered collection of fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
    options: CheckOptions,
}

/// Display-oriented summary of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaLayout {
    /// Name of the primary key field
    pub primary_key: Option<String>,
    /// All field names, by `sort_key` first, then in document order
    pub attributes: Vec<String>,
    /// Fields with a `main_attribute`, ordered by its value
    pub main_attributes: Vec<String>,
}

impl Schema {
    /// Load a schema from a document that already passed
    /// [`validate_schema_document`]
    ///
    /// Fails only when the document cannot be turned into fields at all.
    pub fn load(document: &Value) -> SchemaResult<Self> {
        let entries = document.as_object().ok_or_else(|| {
            InvalidSchema::new("", "", "Schema document must be a JSON object")
        })?;

        let fields = entries
            .iter()
            .map(|(name, params)| Field::from_params(name, params))
            .collect::<SchemaResult<Vec<_>>>()?;

        Ok(Self::from_fields(fields))
    }

    /// Validate a raw document, then load it
    pub fn validated(document: &Value) -> SchemaResult<Self> {
        validate_schema_document(document)?;
        Self::load(document)
    }

    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self {
            fields,
            options: CheckOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> CheckOptions {
        self.options
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_primary_key())
    }

    /// Check a record, skipping system-assigned fields
    ///
    /// Fields are checked in document order and the first violation is
    /// returned.
    pub fn check(&self, instance: &Map<String, Value>, fields_to_skip: &[&str]) -> CheckResult {
        self.fields
            .iter()
            .filter(|field| !fields_to_skip.iter().any(|skip| *skip == field.name()))
            .try_for_each(|field| field.check_with(instance.get(field.name()), self.options))
            .map_err(|violation| {
                tracing::debug!(
                    field = violation.field(),
                    code = violation.code(),
                    "record rejected by schema"
                );
                violation
            })
    }

    /// File names referenced by the file-backed fields of a record
    ///
    /// Covers file-backed fields and lists whose `inner_type` is file-backed.
    pub fn file_references(&self, instance: &Map<String, Value>) -> Vec<String> {
        let mut files = Vec::new();
        for field in &self.fields {
            let Some(value) = instance.get(field.name()) else {
                continue;
            };
            if field.kind().is_file_backed() {
                files.extend(value.as_str().map(str::to_string));
            } else if field.inner_kind().is_some_and(FieldKind::is_file_backed) {
                let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
                files.extend(items.iter().filter_map(Value::as_str).map(str::to_string));
            }
        }
        files
    }

    pub fn layout(&self) -> SchemaLayout {
        let mut attributes: Vec<&Field> = self.fields.iter().collect();
        // stable: fields without a sort key keep document order after the others
        attributes.sort_by_key(|f| (f.sort_key().is_none(), f.sort_key()));

        let mut main_attributes: Vec<&Field> = self
            .fields
            .iter()
            .filter(|f| f.main_attribute().is_some())
            .collect();
        main_attributes.sort_by_key(|f| f.main_attribute());

        SchemaLayout {
            primary_key: self.primary_key().map(|f| f.name().to_string()),
            attributes: attributes.iter().map(|f| f.name().to_string()).collect(),
            main_attributes: main_attributes.iter().map(|f| f.name().to_string()).collect(),
        }
    }
}
