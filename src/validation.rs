//! Schema-backed validation of untyped records
//!
//! Input is checked against the entity's compiled JSON Schema first so that
//! every offending field is reported at once. Only a record that passes is
//! handed to serde, which applies the defaults.

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{Constraint, FieldViolation, Result, SchemaError, ValidationFailure};
use crate::formats::{is_timestamp, TIMESTAMP_FORMAT};

/// Compiled schema for a single entity
pub struct EntityValidator {
    entity: &'static str,
    schema: Value,
    compiled: JSONSchema,
    /// Cap on reported violations; 0 reports all of them
    max_violations: usize,
}

impl std::fmt::Debug for EntityValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityValidator")
            .field("entity", &self.entity)
            .field("max_violations", &self.max_violations)
            .finish()
    }
}

impl EntityValidator {
    /// Compile an entity schema
    pub fn compile(entity: &'static str, schema: Value) -> Result<Self> {
        let compiled = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .with_format(TIMESTAMP_FORMAT, is_timestamp)
            .compile(&schema)
            .map_err(|e| SchemaError::InvalidSchema {
                name: entity.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            entity,
            schema,
            compiled,
            max_violations: 0,
        })
    }

    /// Limit how many violations a failure reports
    pub fn with_max_violations(mut self, max_violations: usize) -> Self {
        self.max_violations = max_violations;
        self
    }

    /// Entity name this validator checks
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// The schema document this validator was compiled from
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Check a record against the schema, collecting every violation
    pub fn check(&self, instance: &Value) -> std::result::Result<(), ValidationFailure> {
        let errors = match self.compiled.validate(instance) {
            Ok(()) => return Ok(()),
            Err(errors) => errors,
        };

        let mut violations: Vec<FieldViolation> =
            errors.flat_map(|error| self.describe(error)).collect();

        // Report in field order regardless of keyword evaluation order
        violations.sort_by(|a, b| a.path.cmp(&b.path));
        violations.dedup();
        if self.max_violations > 0 {
            violations.truncate(self.max_violations);
        }

        debug!(
            entity = self.entity,
            violations = violations.len(),
            "record rejected"
        );
        Err(ValidationFailure::new(self.entity, violations))
    }

    /// Check a record and decode it into its typed form
    pub fn decode<T: DeserializeOwned>(&self, instance: &Value) -> std::result::Result<T, ValidationFailure> {
        self.check(instance)?;

        T::deserialize(instance).map_err(|e| {
            let path = locate_decode_failure::<T>(instance).unwrap_or_default();
            debug!(entity = self.entity, path = %path, error = %e, "record failed to decode");
            ValidationFailure::new(
                self.entity,
                vec![FieldViolation::new(
                    path,
                    Constraint::Malformed {
                        message: e.to_string(),
                    },
                )],
            )
        })
    }

    /// Translate one schema error into field violations
    fn describe(&self, error: ValidationError<'_>) -> Vec<FieldViolation> {
        let message = error.to_string();
        let base = pointer_to_path(&error.instance_path.to_string());
        let schema_path = error.schema_path.to_string();

        match error.kind {
            ValidationErrorKind::Required { property } => {
                let field = property.as_str().unwrap_or_default();
                vec![FieldViolation::new(join_path(&base, field), Constraint::Missing)]
            }
            ValidationErrorKind::Type { .. } => {
                let expected = self
                    .schema
                    .pointer(&schema_path)
                    .map(describe_types)
                    .unwrap_or(message);
                vec![FieldViolation::new(base, Constraint::WrongType { expected })]
            }
            ValidationErrorKind::Minimum { limit } => vec![FieldViolation::new(
                base,
                Constraint::BelowMinimum {
                    minimum: limit.as_f64().unwrap_or_default(),
                },
            )],
            ValidationErrorKind::Maximum { limit } => vec![FieldViolation::new(
                base,
                Constraint::AboveMaximum {
                    maximum: limit.as_f64().unwrap_or_default(),
                },
            )],
            ValidationErrorKind::Enum { options } => vec![FieldViolation::new(
                base,
                Constraint::NotInEnum {
                    allowed: enum_literals(&options),
                },
            )],
            ValidationErrorKind::Format { format } => vec![FieldViolation::new(
                base,
                Constraint::InvalidFormat {
                    format: format.to_string(),
                },
            )],
            // The only patterns in entity schemas guard http(s) URLs
            ValidationErrorKind::Pattern { .. } => vec![FieldViolation::new(
                base,
                Constraint::InvalidFormat {
                    format: "http-url".to_string(),
                },
            )],
            ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
                .iter()
                .map(|field| FieldViolation::new(join_path(&base, field), Constraint::UnknownField))
                .collect(),
            _ => vec![FieldViolation::new(base, Constraint::Malformed { message })],
        }
    }
}

/// Check and decode in one step, wrapping failures in `SchemaError`
pub fn validate_with<T: DeserializeOwned>(validator: &EntityValidator, instance: &Value) -> Result<T> {
    Ok(validator.decode(instance)?)
}

/// Find the top-level field whose value the decoder rejects
///
/// Each field decodes independently, so the record decodes once the
/// offending field is dropped. Required fields cannot be found this way; the
/// schema already pins down their type.
fn locate_decode_failure<T: DeserializeOwned>(instance: &Value) -> Option<String> {
    let fields = instance.as_object()?;
    fields.keys().find_map(|field| {
        let mut trimmed = fields.clone();
        trimmed.remove(field);
        T::deserialize(&Value::Object(trimmed))
            .is_ok()
            .then(|| field.clone())
    })
}

/// "/a/b" -> "a.b"
fn pointer_to_path(pointer: &str) -> String {
    pointer
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect::<Vec<_>>()
        .join(".")
}

fn join_path(base: &str, field: &str) -> String {
    if base.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", base, field)
    }
}

/// `"string"` -> "string", `["integer", "null"]` -> "integer or null"
fn describe_types(types: &Value) -> String {
    match types {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" or "),
        other => other.to_string(),
    }
}

fn enum_literals(options: &Value) -> Vec<String> {
    options
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> EntityValidator {
        EntityValidator::compile(
            "Sample",
            json!({
                "type": "object",
                "required": ["title"],
                "properties": {
                    "title": { "type": "string" },
                    "price": { "type": "number", "minimum": 0 },
                    "seats": { "type": ["integer", "null"], "minimum": 0 },
                    "level": { "enum": ["low", "high"] }
                }
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_pointer_to_path() {
        assert_eq!(pointer_to_path(""), "");
        assert_eq!(pointer_to_path("/price"), "price");
        assert_eq!(pointer_to_path("/a/b"), "a.b");
    }

    #[test]
    fn test_valid_record_passes() {
        let v = validator();
        assert!(v.check(&json!({"title": "x", "price": 0, "seats": null, "level": "low"})).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let v = validator();
        let failure = v
            .check(&json!({"price": -1, "seats": 2.5, "level": "mid"}))
            .unwrap_err();

        assert_eq!(failure.entity, "Sample");
        assert_eq!(failure.paths(), vec!["level", "price", "seats", "title"]);
        assert!(failure
            .violations_for("title")
            .any(|v| v.constraint == Constraint::Missing));
        assert!(failure
            .violations_for("price")
            .any(|v| v.constraint == Constraint::BelowMinimum { minimum: 0.0 }));
        assert!(failure.violations_for("level").any(|v| v.constraint
            == Constraint::NotInEnum {
                allowed: vec!["low".into(), "high".into()]
            }));
        assert!(failure.violations_for("seats").any(|v| v.constraint
            == Constraint::WrongType {
                expected: "integer or null".into()
            }));
    }

    #[test]
    fn test_root_type_error() {
        let failure = validator().check(&json!(["not", "an", "object"])).unwrap_err();
        assert_eq!(
            failure.violations,
            vec![FieldViolation::new(
                "",
                Constraint::WrongType {
                    expected: "object".into()
                }
            )]
        );
    }

    #[test]
    fn test_max_violations() {
        let v = validator().with_max_violations(1);
        let failure = v.check(&json!({"price": -1, "level": "mid"})).unwrap_err();
        assert_eq!(failure.violations.len(), 1);
    }

    #[test]
    fn test_timestamp_format_is_registered() {
        let v = EntityValidator::compile(
            "Dated",
            json!({
                "type": "object",
                "properties": { "at": { "type": ["string", "null"], "format": "timestamp" } }
            }),
        )
        .unwrap();

        for ok in ["2025-06-01T18:00:00Z", "2025-06-01T18:00:00", "2025-06-01"] {
            assert!(v.check(&json!({ "at": ok })).is_ok(), "{ok} should pass");
        }
        let failure = v.check(&json!({ "at": "soon" })).unwrap_err();
        assert_eq!(
            failure.violations,
            vec![FieldViolation::new(
                "at",
                Constraint::InvalidFormat {
                    format: "timestamp".into()
                }
            )]
        );
    }

    #[test]
    fn test_maximum_is_reported_at_field() {
        let v = EntityValidator::compile(
            "Bounded",
            json!({
                "type": "object",
                "properties": { "seats": { "type": "integer", "maximum": 10 } }
            }),
        )
        .unwrap();
        let failure = v.check(&json!({ "seats": 11 })).unwrap_err();
        assert_eq!(
            failure.violations,
            vec![FieldViolation::new("seats", Constraint::AboveMaximum { maximum: 10.0 })]
        );
    }

    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct Narrow {
        title: String,
        #[serde(default)]
        seats: Option<u8>,
    }

    #[test]
    fn test_decode_failure_names_the_field() {
        // The schema allows any integer; u8 does not
        let failure = validator().decode::<Narrow>(&json!({"title": "x", "seats": 300})).unwrap_err();
        assert_eq!(failure.paths(), vec!["seats"]);
        assert!(matches!(failure.violations[0].constraint, Constraint::Malformed { .. }));
    }

    #[test]
    fn test_invalid_schema_is_reported() {
        let err = EntityValidator::compile("Broken", json!({"type": 12})).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidSchema { ref name, .. } if name == "Broken"));
    }
}
