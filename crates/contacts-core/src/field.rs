//! Schema fields
//!
//! A [`Field`] is one named, typed slot of a schema, built from one entry of a
//! schema document. Fields are immutable once loaded.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CheckResult, InvalidSchema, SchemaResult, Violation};
use crate::params::{
    ADDITIONAL_TYPE_PARAMETERS, DISPLAY_NAME, FORM_HELP_TEXT, MAIN_ATTRIBUTE, PRIMARY_KEY,
    REQUIRED, SORT_KEY, TYPE,
};
use crate::registry::{CheckOptions, Constraints, FieldKind};

/// A named, typed constraint over one value of a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    form_help_text: Option<String>,
    #[serde(rename = "type")]
    kind: FieldKind,
    required: bool,
    primary_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    main_attribute: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_key: Option<i64>,
    #[serde(rename = "additional_type_parameters")]
    constraints: Constraints,
}

impl Field {
    /// Create an optional field with no metadata
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            form_help_text: None,
            kind,
            required: false,
            primary_key: false,
            main_attribute: None,
            sort_key: None,
            constraints: Constraints::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn with_sort_key(mut self, sort_key: i64) -> Self {
        self.sort_key = Some(sort_key);
        self
    }

    pub fn with_main_attribute(mut self, main_attribute: i64) -> Self {
        self.main_attribute = Some(main_attribute);
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Build a field from its entry in a schema document
    ///
    /// Only the `type` is strictly required here. Other parameters with an
    /// unexpected JSON type are ignored: rejecting them is the schema
    /// validator's job.
    pub fn from_params(name: &str, params: &Value) -> SchemaResult<Self> {
        let params = params.as_object().ok_or_else(|| {
            InvalidSchema::new(name, TYPE, format!("Parameters of field '{}' must be an object", name))
        })?;

        let type_name = params.get(TYPE).and_then(Value::as_str).ok_or_else(|| {
            InvalidSchema::new(name, TYPE, format!("Field '{}' has no valid 'type'", name))
        })?;
        let kind = FieldKind::from_name(type_name).ok_or_else(|| {
            InvalidSchema::new(
                name,
                TYPE,
                format!("Unknown type '{}' for field '{}'", type_name, name),
            )
        })?;

        Ok(Self {
            name: name.to_string(),
            display_name: string_param(params, DISPLAY_NAME),
            form_help_text: string_param(params, FORM_HELP_TEXT),
            kind,
            required: params.get(REQUIRED).and_then(Value::as_bool).unwrap_or(false),
            primary_key: params.get(PRIMARY_KEY).and_then(Value::as_bool).unwrap_or(false),
            main_attribute: params.get(MAIN_ATTRIBUTE).and_then(Value::as_i64),
            sort_key: params.get(SORT_KEY).and_then(Value::as_i64),
            constraints: params
                .get(ADDITIONAL_TYPE_PARAMETERS)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name, falling back to the field name
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn form_help_text(&self) -> Option<&str> {
        self.form_help_text.as_deref()
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn main_attribute(&self) -> Option<i64> {
        self.main_attribute
    }

    pub fn sort_key(&self) -> Option<i64> {
        self.sort_key
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Kind of the list elements, for `list` fields with an `inner_type`
    pub fn inner_kind(&self) -> Option<FieldKind> {
        match self.kind {
            FieldKind::List => self
                .constraints
                .get(crate::params::INNER_TYPE)
                .and_then(Value::as_str)
                .and_then(FieldKind::from_name),
            _ => None,
        }
    }

    /// Check a value with the default options
    pub fn check(&self, value: Option<&Value>) -> CheckResult {
        self.check_with(value, CheckOptions::default())
    }

    /// Check a value; an absent or empty value only fails required fields
    pub fn check_with(&self, value: Option<&Value>, options: CheckOptions) -> CheckResult {
        match value.filter(|v| !is_empty_value(v)) {
            None if self.required => Err(Violation::MissingRequiredValue {
                field: self.name.clone(),
            }),
            None => Ok(()),
            Some(value) => self
                .kind
                .check(value, &self.constraints, options)
                .map_err(|mismatch| mismatch.for_field(&self.name)),
        }
    }
}

/// `null`, `""`, `[]` and `{}` count as no value
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn string_param(params: &Map<String, Value>, key: &str) -> Option<String> {
    params.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Names;
    use serde_json::json;

    #[test]
    fn test_from_params() {
        let field = Field::from_params(
            "photo",
            &json!({
                "type": "image",
                "display_name": "Photo",
                "required": true,
                "sort_key": 3,
                "additional_type_parameters": {"accepted_types": ["png"]}
            }),
        )
        .unwrap();

        assert_eq!(field.name(), "photo");
        assert_eq!(field.label(), "Photo");
        assert_eq!(field.kind(), FieldKind::Image);
        assert!(field.is_required());
        assert!(!field.is_primary_key());
        assert_eq!(field.sort_key(), Some(3));
        assert_eq!(field.main_attribute(), None);
        assert_eq!(field.constraints().get("accepted_types"), Some(&json!(["png"])));
    }

    #[test]
    fn test_from_params_defaults() {
        let field = Field::from_params("nickname", &json!({"type": "str"})).unwrap();
        assert_eq!(field.label(), "nickname");
        assert!(!field.is_required());
        assert!(field.constraints().is_empty());
    }

    #[test]
    fn test_from_params_unknown_type() {
        let err = Field::from_params("x", &json!({"type": "float"})).unwrap_err();
        assert_eq!(err.field, Names::from("x"));
        assert_eq!(err.param, Names::from("type"));

        assert!(Field::from_params("x", &json!({})).is_err());
        assert!(Field::from_params("x", &json!("str")).is_err());
    }

    #[test]
    fn test_required_missing() {
        let field = Field::new("firstname", FieldKind::Str).required(true);
        let expected = Err(Violation::MissingRequiredValue {
            field: "firstname".to_string(),
        });

        assert_eq!(field.check(None), expected);
        assert_eq!(field.check(Some(&json!(null))), expected);
        assert_eq!(field.check(Some(&json!(""))), expected);
        assert!(field.check(Some(&json!("Luke"))).is_ok());
    }

    #[test]
    fn test_optional_absent_passes() {
        let field = Field::new("age", FieldKind::Integer);
        assert!(field.check(None).is_ok());
        assert!(field.check(Some(&json!(null))).is_ok());
        assert!(field.check(Some(&json!(0))).is_ok());
    }

    #[test]
    fn test_wrong_type_carries_field_name() {
        let field = Field::new("active", FieldKind::Toggle);
        assert_eq!(
            field.check(Some(&json!("yes"))),
            Err(Violation::WrongType {
                field: "active".to_string(),
                expected_type: "boolean".to_string(),
            })
        );
    }

    #[test]
    fn test_required_zero_and_false_are_values() {
        let count = Field::new("count", FieldKind::Integer).required(true);
        assert!(count.check(Some(&json!(0))).is_ok());

        let flag = Field::new("flag", FieldKind::Toggle).required(true);
        assert!(flag.check(Some(&json!(false))).is_ok());
    }

    #[test]
    fn test_inner_kind() {
        let mut constraints = Constraints::new();
        constraints.insert("inner_type".to_string(), json!("image"));
        let field = Field::new("gallery", FieldKind::List).with_constraints(constraints);
        assert_eq!(field.inner_kind(), Some(FieldKind::Image));
        assert_eq!(Field::new("x", FieldKind::Str).inner_kind(), None);
    }

    #[test]
    fn test_is_empty_value() {
        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!(false)));
        assert!(!is_empty_value(&json!(" ")));
    }
}
