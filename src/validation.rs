//! Schema validation helpers.
//!
//! Checks a `serde_json::Value` configuration block against a [`Schema`] before
//! anything is sent to the API.
//!
//! # Example
//!
//! ```
//! use logzio_provider::schema::{Attribute, Schema};
//! use logzio_provider::validation::validate;
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::optional_computed_string())
//!     .with_attribute("token_id", Attribute::optional_computed_int64());
//!
//! let diagnostics = validate(&schema, &json!({"name": "shipper"}));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(&schema, &json!({"token_id": "seven"}));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("token_id".to_string()));
//! ```

use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};
use serde_json::Value;

/// Validate a JSON value against a schema.
///
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - The value must be an object (null counts as an empty block)
/// - Required attributes must be present and non-null
/// - Computed-only attributes cannot be set
/// - Attribute types must match the schema
/// - Attributes not in the schema are rejected
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match value {
        Value::Object(map) => map,
        Value::Null => {
            for (name, attr) in &schema.attributes {
                check_attribute(name, attr, None, &mut diagnostics);
            }
            return diagnostics;
        },
        other => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", value_type_name(other))),
            );
            return diagnostics;
        },
    };

    for (name, attr) in &schema.attributes {
        check_attribute(name, attr, obj.get(name), &mut diagnostics);
    }

    for key in obj.keys() {
        if schema.attribute(key).is_none() {
            diagnostics.push(
                Diagnostic::error(format!("Unsupported attribute '{}'", key))
                    .with_detail("This attribute is not part of the schema")
                    .with_attribute(key.as_str()),
            );
        }
    }

    diagnostics
}

/// Validate a JSON value against a schema, returning Ok if valid or Err with diagnostics.
pub fn validate_result(schema: &Schema, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a JSON value is valid against a schema.
pub fn is_valid(schema: &Schema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

fn check_attribute(
    name: &str,
    attr: &Attribute,
    value: Option<&Value>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", name))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(name),
                );
            }
        },
        Some(_) if attr.flags.is_computed_only() => {
            diagnostics.push(
                Diagnostic::error(format!("Attribute '{}' is read-only", name))
                    .with_detail("This value is computed by the provider and cannot be set")
                    .with_attribute(name),
            );
        },
        Some(v) => {
            if !matches_type(attr.attr_type, v) {
                diagnostics.push(type_error(name, attr.attr_type, v));
            }
        },
    }
}

fn matches_type(attr_type: AttributeType, value: &Value) -> bool {
    match attr_type {
        AttributeType::String => value.is_string(),
        AttributeType::Int64 => is_int64(value),
        AttributeType::Bool => value.is_boolean(),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            if n.is_i64() {
                true
            } else if let Some(f) = n.as_f64() {
                // 42.0 is an integer for our purposes
                f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64
            } else {
                false
            }
        },
        _ => false,
    }
}

fn type_error(name: &str, expected: AttributeType, got: &Value) -> Diagnostic {
    Diagnostic::error(format!("Invalid type for attribute '{}'", name))
        .with_detail(format!(
            "Expected {}, got {}",
            expected.name(),
            value_type_name(got)
        ))
        .with_attribute(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup_schema() -> Schema {
        Schema::v0()
            .with_attribute("token_id", Attribute::optional_computed_int64())
            .with_attribute("name", Attribute::optional_computed_string())
            .with_attribute("enabled", Attribute::optional_computed_bool())
            .with_attribute("token", Attribute::computed_string().sensitive())
    }

    #[test]
    fn test_validate_required_string() {
        let schema = Schema::v0().with_attribute("api_token", Attribute::required_string());

        assert!(validate(&schema, &json!({"api_token": "abc"})).is_empty());

        let diagnostics = validate(&schema, &json!({}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Missing required"));

        let diagnostics = validate(&schema, &json!({"api_token": null}));
        assert_eq!(diagnostics.len(), 1);

        let diagnostics = validate(&schema, &Value::Null);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_validate_optional_attributes() {
        let schema = lookup_schema();
        assert!(validate(&schema, &json!({})).is_empty());
        assert!(validate(&schema, &json!({"name": "shipper", "enabled": false})).is_empty());
        assert!(validate(&schema, &Value::Null).is_empty());
    }

    #[test]
    fn test_validate_computed_attribute_rejected() {
        let diagnostics = validate(&lookup_schema(), &json!({"token": "secret"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("read-only"));
        assert_eq!(diagnostics[0].attribute, Some("token".to_string()));
    }

    #[test]
    fn test_validate_int64() {
        let schema = lookup_schema();
        assert!(is_valid(&schema, &json!({"token_id": 42})));
        assert!(is_valid(&schema, &json!({"token_id": -1})));
        assert!(is_valid(&schema, &json!({"token_id": 42.0})));

        let diagnostics = validate(&schema, &json!({"token_id": 4.5}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].detail,
            Some("Expected int64, got number".to_string())
        );
    }

    #[test]
    fn test_validate_bool() {
        let diagnostics = validate(&lookup_schema(), &json!({"enabled": "true"}));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].detail,
            Some("Expected bool, got string".to_string())
        );
    }

    #[test]
    fn test_validate_unknown_attribute() {
        let diagnostics = validate(&lookup_schema(), &json!({"nmae": "typo"}));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].summary.contains("Unsupported attribute 'nmae'"));
    }

    #[test]
    fn test_validate_multiple_errors() {
        let diagnostics = validate(
            &lookup_schema(),
            &json!({"token_id": "x", "name": 1, "enabled": 0}),
        );
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn test_validate_root_not_object() {
        let diagnostics = validate(&lookup_schema(), &json!([1, 2]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Expected object");
        assert_eq!(diagnostics[0].detail, Some("Got array".to_string()));
    }

    #[test]
    fn test_validate_result_helper() {
        let schema = lookup_schema();
        assert!(validate_result(&schema, &json!({"name": "a"})).is_ok());
        assert_eq!(
            validate_result(&schema, &json!({"name": true}))
                .unwrap_err()
                .len(),
            1
        );
    }
}
