//! Field type registry
//!
//! Maps the type names accepted in a schema document to a closed set of
//! [`FieldKind`]s. Each kind is bound to a checker through a static dispatch
//! table; adding a type means adding a variant, a name and a table entry.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::TypeMismatch;
use crate::params::{ACCEPTED_TYPES, INNER_TYPE};

/// Type-specific parameters of a field (`additional_type_parameters`)
pub type Constraints = Map<String, Value>;

/// Checking strategy of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Integer,
    Str,
    LongStr,
    Url,
    Email,
    Select,
    List,
    Image,
    Toggle,
}

/// Kinds whose values reference uploaded files
pub const FILE_BACKED_KINDS: &[FieldKind] = &[FieldKind::Image];

/// Accepted type names, aliases included
const NAMES: &[(&str, FieldKind)] = &[
    ("integer", FieldKind::Integer),
    ("str", FieldKind::Str),
    ("string", FieldKind::Str),
    ("long_str", FieldKind::LongStr),
    ("url", FieldKind::Url),
    ("email", FieldKind::Email),
    ("select", FieldKind::Select),
    ("list", FieldKind::List),
    ("image", FieldKind::Image),
    ("toggle", FieldKind::Toggle),
    ("boolean", FieldKind::Toggle),
];

type Checker = fn(FieldKind, &Value, &Constraints, CheckOptions) -> Result<(), TypeMismatch>;

impl FieldKind {
    pub const ALL: [FieldKind; 9] = [
        FieldKind::Integer,
        FieldKind::Str,
        FieldKind::LongStr,
        FieldKind::Url,
        FieldKind::Email,
        FieldKind::Select,
        FieldKind::List,
        FieldKind::Image,
        FieldKind::Toggle,
    ];

    /// Look up a kind by any of its registered names
    pub fn from_name(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, kind)| *kind)
    }

    /// Every name accepted as a `type`
    pub fn names() -> impl Iterator<Item = &'static str> {
        NAMES.iter().map(|(name, _)| *name)
    }

    /// Canonical registry name
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Integer => "integer",
            FieldKind::Str => "str",
            FieldKind::LongStr => "long_str",
            FieldKind::Url => "url",
            FieldKind::Email => "email",
            FieldKind::Select => "select",
            FieldKind::List => "list",
            FieldKind::Image => "image",
            FieldKind::Toggle => "toggle",
        }
    }

    /// Name used in `WrongType` messages
    pub fn display_name(self) -> &'static str {
        match self {
            FieldKind::Toggle => "boolean",
            other => other.name(),
        }
    }

    pub fn is_file_backed(self) -> bool {
        FILE_BACKED_KINDS.contains(&self)
    }

    fn checker(self) -> Checker {
        match self {
            FieldKind::Integer => check_integer,
            FieldKind::Str
            | FieldKind::LongStr
            | FieldKind::Url
            | FieldKind::Email
            | FieldKind::Select => check_str,
            FieldKind::List => check_list,
            FieldKind::Image => check_image,
            FieldKind::Toggle => check_toggle,
        }
    }

    /// Check a non-empty value against this kind
    pub fn check(
        self,
        value: &Value,
        constraints: &Constraints,
        options: CheckOptions,
    ) -> Result<(), TypeMismatch> {
        (self.checker())(self, value, constraints, options)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for FieldKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// What a `list` without `inner_type` means at check time
///
/// Earlier revisions accepted such lists unchecked; the current default
/// rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UntypedListPolicy {
    #[default]
    Reject,
    Accept,
}

/// Knobs for instance checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CheckOptions {
    pub untyped_lists: UntypedListPolicy,
}

impl CheckOptions {
    pub fn with_untyped_lists(mut self, policy: UntypedListPolicy) -> Self {
        self.untyped_lists = policy;
        self
    }
}

fn check_integer(
    kind: FieldKind,
    value: &Value,
    _constraints: &Constraints,
    _options: CheckOptions,
) -> Result<(), TypeMismatch> {
    if value.is_i64() || value.is_u64() {
        Ok(())
    } else {
        Err(TypeMismatch::new(kind))
    }
}

fn check_str(
    kind: FieldKind,
    value: &Value,
    _constraints: &Constraints,
    _options: CheckOptions,
) -> Result<(), TypeMismatch> {
    if value.is_string() {
        Ok(())
    } else {
        Err(TypeMismatch::new(kind))
    }
}

fn check_toggle(
    kind: FieldKind,
    value: &Value,
    _constraints: &Constraints,
    _options: CheckOptions,
) -> Result<(), TypeMismatch> {
    if value.is_boolean() {
        Ok(())
    } else {
        Err(TypeMismatch::new(kind))
    }
}

/// Elements are checked against `inner_type` with the same constraints object.
fn check_list(
    kind: FieldKind,
    value: &Value,
    constraints: &Constraints,
    options: CheckOptions,
) -> Result<(), TypeMismatch> {
    let items = value.as_array().ok_or(TypeMismatch::new(kind))?;

    let inner = match constraints.get(INNER_TYPE).and_then(Value::as_str) {
        Some(name) => FieldKind::from_name(name).ok_or(TypeMismatch::new(kind))?,
        None => {
            return match options.untyped_lists {
                UntypedListPolicy::Accept => Ok(()),
                UntypedListPolicy::Reject => Err(TypeMismatch::new(kind)),
            }
        }
    };

    items
        .iter()
        .try_for_each(|item| inner.check(item, constraints, options))
}

/// A path with an extension, optionally restricted to `accepted_types`.
fn check_image(
    kind: FieldKind,
    value: &Value,
    constraints: &Constraints,
    _options: CheckOptions,
) -> Result<(), TypeMismatch> {
    let path = value.as_str().ok_or(TypeMismatch::new(kind))?;
    let (_, extension) = path.rsplit_once('.').ok_or(TypeMismatch::new(kind))?;

    let accepted = match constraints.get(ACCEPTED_TYPES).and_then(Value::as_array) {
        Some(accepted) if !accepted.is_empty() => accepted,
        _ => return Ok(()),
    };

    let extension = extension.to_lowercase();
    if accepted
        .iter()
        .filter_map(Value::as_str)
        .any(|accepted| accepted.to_lowercase() == extension)
    {
        Ok(())
    } else {
        Err(TypeMismatch::new(kind))
    }
}
