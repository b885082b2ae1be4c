//! Error types for entity validation

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// The constraint a field failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Constraint {
    /// A required field was not present
    Missing,
    /// The value has the wrong JSON type
    WrongType { expected: String },
    /// A numeric value is below its lower bound
    BelowMinimum { minimum: f64 },
    /// A numeric value is above its upper bound
    AboveMaximum { maximum: f64 },
    /// The value is not one of the allowed literals
    NotInEnum { allowed: Vec<String> },
    /// A string does not match its declared format (uri, timestamp)
    InvalidFormat { format: String },
    /// The field is not part of the schema (strict mode only)
    UnknownField,
    /// The value passed the schema but could not be decoded
    Malformed { message: String },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Missing => write!(f, "field required"),
            Constraint::WrongType { expected } => write!(f, "expected {}", expected),
            Constraint::BelowMinimum { minimum } => {
                write!(f, "must be greater than or equal to {}", minimum)
            }
            Constraint::AboveMaximum { maximum } => {
                write!(f, "must be less than or equal to {}", maximum)
            }
            Constraint::NotInEnum { allowed } => {
                write!(f, "must be one of: {}", allowed.join(", "))
            }
            Constraint::InvalidFormat { format } => write!(f, "invalid {}", format),
            Constraint::UnknownField => write!(f, "unknown field"),
            Constraint::Malformed { message } => write!(f, "{}", message),
        }
    }
}

/// One offending field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Dotted path of the field; empty for the record itself
    pub path: String,
    pub constraint: Constraint,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            path: path.into(),
            constraint,
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "<record>: {}", self.constraint)
        } else {
            write!(f, "{}: {}", self.path, self.constraint)
        }
    }
}

/// A record failed validation against its entity schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Entity the record was validated as (e.g. "Event")
    pub entity: String,
    pub violations: Vec<FieldViolation>,
}

impl ValidationFailure {
    pub fn new(entity: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        Self {
            entity: entity.into(),
            violations,
        }
    }

    /// Whether any violation points at `path`
    pub fn has_violation(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }

    /// All violations for a single field
    pub fn violations_for<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldViolation> {
        self.violations.iter().filter(move |v| v.path == path)
    }

    /// Paths of the offending fields, in reported order and without duplicates
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for v in &self.violations {
            if !paths.contains(&v.path.as_str()) {
                paths.push(&v.path);
            }
        }
        paths
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation failed with {} violation(s)",
            self.entity,
            self.violations.len()
        )?;
        for v in &self.violations {
            write!(f, "\n  {}", v)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

/// Schema crate errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error("Unknown entity: {name}{}", did_you_mean(.suggestion))]
    UnknownEntity {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Invalid schema for {name}: {message}")]
    InvalidSchema { name: String, message: String },

    #[error("Checksum mismatch for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(s) => format!(" (did you mean {}?)", s),
        None => String::new(),
    }
}

impl SchemaError {
    /// The validation failure, if this is one
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            SchemaError::Validation(failure) => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_display_lists_fields() {
        let failure = ValidationFailure::new(
            "Event",
            vec![
                FieldViolation::new("price", Constraint::BelowMinimum { minimum: 0.0 }),
                FieldViolation::new("title", Constraint::Missing),
            ],
        );
        let text = failure.to_string();
        assert!(text.starts_with("Event validation failed with 2 violation(s)"));
        assert!(text.contains("price: must be greater than or equal to 0"));
        assert!(text.contains("title: field required"));
    }

    #[test]
    fn test_paths_are_deduplicated() {
        let failure = ValidationFailure::new(
            "User",
            vec![
                FieldViolation::new("avatar_url", Constraint::InvalidFormat { format: "uri".into() }),
                FieldViolation::new("avatar_url", Constraint::InvalidFormat { format: "http url".into() }),
                FieldViolation::new("email", Constraint::Missing),
            ],
        );
        assert_eq!(failure.paths(), vec!["avatar_url", "email"]);
        assert_eq!(failure.violations_for("avatar_url").count(), 2);
    }

    #[test]
    fn test_unknown_entity_message() {
        let err = SchemaError::UnknownEntity {
            name: "usr".into(),
            suggestion: Some("User".into()),
        };
        assert_eq!(err.to_string(), "Unknown entity: usr (did you mean User?)");
    }

    #[test]
    fn test_constraint_serializes_tagged() {
        let json = serde_json::to_value(Constraint::NotInEnum {
            allowed: vec!["a".into()],
        })
        .unwrap();
        assert_eq!(json["kind"], "not_in_enum");
        assert_eq!(json["allowed"][0], "a");
    }
}
