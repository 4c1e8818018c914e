//! Schema document validation
//!
//! Validates a raw schema document before it is trusted to build a
//! [`crate::Schema`]. Works on the JSON document only and fails fast on the
//! first violation, in a fixed order:
//!
//! 1. document shape (an object of objects, non-empty field names)
//! 2. primary key cardinality, then primary key requiredness
//! 3. per field, in document order: parameter types, type name, and the
//!    constraint shape of `list`, `select`, `image` and `toggle`
//! 4. `display_name` / `form_help_text` typing
//! 5. `sort_key` uniqueness, then `main_attribute` uniqueness

use serde_json::{Map, Value};

use crate::error::{InvalidSchema, SchemaResult};
use crate::params::{
    ACCEPTED_TYPES, ADDITIONAL_TYPE_PARAMETERS, ALLOWED_VALUES, DISPLAY_NAME, FORM_HELP_TEXT,
    INNER_TYPE, MAIN_ATTRIBUTE, PRIMARY_KEY, REQUIRED, SORT_KEY, TYPE, VALUE_FALSE, VALUE_TRUE,
};
use crate::registry::FieldKind;

type Params = Map<String, Value>;

/// JSON type expected for a schema parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expected {
    String,
    Boolean,
    Integer,
    Object,
}

impl Expected {
    fn matches(self, value: &Value) -> bool {
        match self {
            Expected::String => value.is_string(),
            Expected::Boolean => value.is_boolean(),
            Expected::Integer => value.is_i64() || value.is_u64(),
            Expected::Object => value.is_object(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Expected::String => "string",
            Expected::Boolean => "boolean",
            Expected::Integer => "integer",
            Expected::Object => "object",
        }
    }
}

/// Optional parameters and their JSON types
const OPTIONAL_PARAMS: &[(&str, Expected)] = &[
    (DISPLAY_NAME, Expected::String),
    (FORM_HELP_TEXT, Expected::String),
    (REQUIRED, Expected::Boolean),
    (PRIMARY_KEY, Expected::Boolean),
    (MAIN_ATTRIBUTE, Expected::Integer),
    (SORT_KEY, Expected::Integer),
    (ADDITIONAL_TYPE_PARAMETERS, Expected::Object),
];

/// Validate a raw schema document
pub fn validate_schema_document(document: &Value) -> SchemaResult<()> {
    let result = validate_entries(document);
    if let Err(err) = &result {
        tracing::debug!(field = %err.field, param = %err.param, "schema document rejected: {}", err);
    }
    result
}

fn validate_entries(document: &Value) -> SchemaResult<()> {
    let document = document.as_object().ok_or_else(|| {
        InvalidSchema::new(
            "",
            "",
            "Schema document must be a JSON object mapping field names to their parameters",
        )
    })?;

    let mut entries = Vec::with_capacity(document.len());
    for (name, params) in document {
        if name.is_empty() {
            return Err(InvalidSchema::new("", "name", "Field names must not be empty"));
        }
        let params = params.as_object().ok_or_else(|| {
            InvalidSchema::new(
                name.as_str(),
                TYPE,
                format!("Parameters of field '{}' must be an object", name),
            )
        })?;
        entries.push((name.as_str(), params));
    }

    check_primary_key(&entries)?;
    for (name, params) in &entries {
        check_field(name, params)?;
    }
    check_texts(&entries)?;
    check_unique(&entries, SORT_KEY)?;
    check_unique(&entries, MAIN_ATTRIBUTE)?;
    Ok(())
}

/// A parameter value, with `null` treated as absent
fn param<'a>(params: &'a Params, key: &str) -> Option<&'a Value> {
    params.get(key).filter(|value| !value.is_null())
}

fn is_true(params: &Params, key: &str) -> bool {
    params.get(key) == Some(&Value::Bool(true))
}

fn check_primary_key(entries: &[(&str, &Params)]) -> SchemaResult<()> {
    let keys: Vec<&(&str, &Params)> = entries
        .iter()
        .filter(|(_, params)| is_true(params, PRIMARY_KEY))
        .collect();

    match keys.as_slice() {
        [] => Err(InvalidSchema::new(
            "",
            PRIMARY_KEY,
            "Exactly one field must be marked as primary key, none found",
        )),
        [(name, params)] if !is_true(params, REQUIRED) => Err(InvalidSchema::new(
            *name,
            [PRIMARY_KEY, REQUIRED],
            format!("Primary key field '{}' must also be required", name),
        )),
        [_] => Ok(()),
        many => {
            let names: Vec<String> = many.iter().map(|(name, _)| name.to_string()).collect();
            let message = format!(
                "Only one field can be marked as primary key, found {}: {}",
                names.len(),
                names.join(", ")
            );
            Err(InvalidSchema::new(names, PRIMARY_KEY, message))
        }
    }
}

fn check_field(name: &str, params: &Params) -> SchemaResult<()> {
    let type_name = match param(params, TYPE) {
        Some(Value::String(type_name)) => type_name,
        Some(other) => {
            return Err(InvalidSchema::new(
                name,
                TYPE,
                format!("Parameter 'type' of field '{}' must be a string, got {}", name, other),
            ))
        }
        None => {
            return Err(InvalidSchema::new(
                name,
                TYPE,
                format!("Missing parameter 'type' for field '{}'", name),
            ))
        }
    };

    for (key, expected) in OPTIONAL_PARAMS {
        if let Some(value) = param(params, key) {
            if !expected.matches(value) {
                return Err(InvalidSchema::new(
                    name,
                    *key,
                    format!(
                        "Parameter '{}' of field '{}' must be a {}, got {}",
                        key,
                        name,
                        expected.name(),
                        value
                    ),
                ));
            }
        }
    }

    let kind = FieldKind::from_name(type_name).ok_or_else(|| {
        InvalidSchema::new(
            name,
            TYPE,
            format!("Unknown type '{}' for field '{}'", type_name, name),
        )
    })?;

    let constraints = param(params, ADDITIONAL_TYPE_PARAMETERS).and_then(Value::as_object);
    match kind {
        FieldKind::List => check_list(name, constraints),
        FieldKind::Select => check_select(name, constraints),
        FieldKind::Image => constraints.map_or(Ok(()), |c| check_image(name, c)),
        FieldKind::Toggle => constraints.map_or(Ok(()), |c| check_toggle(name, c)),
        _ => Ok(()),
    }
}

fn require_constraints<'a>(
    name: &str,
    kind: FieldKind,
    constraints: Option<&'a Params>,
) -> SchemaResult<&'a Params> {
    constraints.ok_or_else(|| {
        InvalidSchema::new(
            name,
            ADDITIONAL_TYPE_PARAMETERS,
            format!(
                "Field '{}' of type '{}' requires '{}'",
                name,
                kind.name(),
                ADDITIONAL_TYPE_PARAMETERS
            ),
        )
    })
}

fn check_list(name: &str, constraints: Option<&Params>) -> SchemaResult<()> {
    let constraints = require_constraints(name, FieldKind::List, constraints)?;

    let inner = match param(constraints, INNER_TYPE) {
        Some(Value::String(inner)) => inner,
        Some(other) => {
            return Err(InvalidSchema::new(
                name,
                INNER_TYPE,
                format!("'inner_type' of field '{}' must be a type name, got {}", name, other),
            ))
        }
        None => {
            return Err(InvalidSchema::new(
                name,
                INNER_TYPE,
                format!("Field '{}' of type 'list' must declare an 'inner_type'", name),
            ))
        }
    };

    match FieldKind::from_name(inner) {
        None => Err(InvalidSchema::new(
            name,
            INNER_TYPE,
            format!("Unknown inner type '{}' for field '{}'", inner, name),
        )),
        Some(FieldKind::List) => Err(InvalidSchema::new(
            name,
            INNER_TYPE,
            format!("Field '{}' cannot be a list of lists", name),
        )),
        Some(_) => Ok(()),
    }
}

fn check_select(name: &str, constraints: Option<&Params>) -> SchemaResult<()> {
    let constraints = require_constraints(name, FieldKind::Select, constraints)?;

    let all_strings = param(constraints, ALLOWED_VALUES)
        .and_then(Value::as_array)
        .map(|values| values.iter().all(Value::is_string));

    match all_strings {
        Some(true) => Ok(()),
        Some(false) => Err(InvalidSchema::new(
            name,
            ALLOWED_VALUES,
            format!("'allowed_values' of field '{}' must only contain strings", name),
        )),
        None => Err(InvalidSchema::new(
            name,
            ALLOWED_VALUES,
            format!("Field '{}' of type 'select' requires a list of 'allowed_values'", name),
        )),
    }
}

fn check_image(name: &str, constraints: &Params) -> SchemaResult<()> {
    let valid = param(constraints, ACCEPTED_TYPES)
        .and_then(Value::as_array)
        .is_some_and(|types| !types.is_empty() && types.iter().all(Value::is_string));

    if valid {
        Ok(())
    } else {
        Err(InvalidSchema::new(
            name,
            ACCEPTED_TYPES,
            format!(
                "'accepted_types' of field '{}' must be a non-empty list of extensions",
                name
            ),
        ))
    }
}

fn check_toggle(name: &str, constraints: &Params) -> SchemaResult<()> {
    let value_true = param(constraints, VALUE_TRUE);
    let value_false = param(constraints, VALUE_FALSE);

    if value_true.is_none() && value_false.is_none() {
        return Err(InvalidSchema::new(
            name,
            [VALUE_TRUE, VALUE_FALSE],
            format!(
                "Field '{}' of type 'toggle' must define 'value_true' or 'value_false'",
                name
            ),
        ));
    }

    for (key, value) in [(VALUE_TRUE, value_true), (VALUE_FALSE, value_false)] {
        if let Some(value) = value {
            if !value.is_string() {
                return Err(InvalidSchema::new(
                    name,
                    key,
                    format!("'{}' of field '{}' must be a string, got {}", key, name, value),
                ));
            }
        }
    }

    let is_empty = |value: Option<&Value>| value.and_then(Value::as_str) == Some("");
    if is_empty(value_true) != is_empty(value_false) {
        return Err(InvalidSchema::new(
            name,
            [VALUE_TRUE, VALUE_FALSE],
            format!(
                "'value_true' and 'value_false' of field '{}' must both be empty or both be set",
                name
            ),
        ));
    }

    Ok(())
}

fn check_texts(entries: &[(&str, &Params)]) -> SchemaResult<()> {
    for (name, params) in entries {
        for key in [DISPLAY_NAME, FORM_HELP_TEXT] {
            if let Some(value) = param(params, key) {
                if !value.is_string() {
                    return Err(InvalidSchema::new(
                        *name,
                        key,
                        format!("'{}' of field '{}' must be a string, got {}", key, name, value),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Values of `key` must be pairwise distinct across fields
fn check_unique(entries: &[(&str, &Params)], key: &str) -> SchemaResult<()> {
    let mut groups: Vec<(&Value, Vec<String>)> = Vec::new();
    for (name, params) in entries {
        let Some(value) = param(params, key) else {
            continue;
        };
        match groups.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, names)) => names.push(name.to_string()),
            None => groups.push((value, vec![name.to_string()])),
        }
    }

    match groups.into_iter().find(|(_, names)| names.len() > 1) {
        Some((value, names)) => {
            let message = format!(
                "Fields {} share the same '{}' value {}",
                names.join(", "),
                key,
                value
            );
            Err(InvalidSchema::new(names, key, message))
        }
        None => Ok(()),
    }
}
