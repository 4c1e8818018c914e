//! Parameter names recognised in a schema document

pub const TYPE: &str = "type";
pub const DISPLAY_NAME: &str = "display_name";
pub const FORM_HELP_TEXT: &str = "form_help_text";
pub const REQUIRED: &str = "required";
pub const PRIMARY_KEY: &str = "primary_key";
pub const MAIN_ATTRIBUTE: &str = "main_attribute";
pub const SORT_KEY: &str = "sort_key";
pub const ADDITIONAL_TYPE_PARAMETERS: &str = "additional_type_parameters";

// Keys inside `additional_type_parameters`
pub const INNER_TYPE: &str = "inner_type";
pub const ALLOWED_VALUES: &str = "allowed_values";
pub const ACCEPTED_TYPES: &str = "accepted_types";
pub const VALUE_TRUE: &str = "value_true";
pub const VALUE_FALSE: &str = "value_false";
