//! The `Entity` contract and the building blocks of entity schemas
//!
//! Every entity is described twice: once as a typed Rust record (serde
//! derive, defaults applied on decode) and once as a Draft 7 JSON Schema
//! document. The schema is what untyped input is checked against; the typed
//! record is what callers get back once the check passes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::catalog::{Catalog, EntityKind};
use crate::error::Result;
use crate::formats::{MAX_WHOLE_NUMBER, TIMESTAMP_FORMAT};

/// Base URI for schema `$id`s
pub const SCHEMA_ID_BASE: &str = "https://schemas.dgardn.dev";

/// JSON Schema draft every entity schema is written against
pub const SCHEMA_DIALECT: &str = "http://json-schema.org/draft-07/schema#";

/// A validated record shape with its own collection
pub trait Entity: Serialize + DeserializeOwned + Sized {
    /// Class name, e.g. "TeamMembership"
    const NAME: &'static str;

    /// Catalog entry for this entity
    const KIND: EntityKind;

    /// The JSON Schema document for this entity
    fn json_schema() -> Value;

    /// Collection name: the lowercased class name
    fn collection() -> String {
        Self::NAME.to_lowercase()
    }

    /// Validate untyped input and decode it, applying defaults
    fn from_value(value: &Value) -> Result<Self> {
        Catalog::global().validate_as::<Self>(value)
    }

    /// Parse a JSON document and validate it
    fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(&value)
    }

    /// Re-check a record that was built in code rather than decoded
    fn validate(&self) -> Result<()> {
        let value = serde_json::to_value(self)?;
        Catalog::global().check(Self::KIND, &value)
    }
}

/// A string enumeration restricted to a literal set
pub trait Literal: Copy + Sized + 'static {
    /// Every allowed value, in declaration order
    const ALL: &'static [Self];

    /// The wire literal
    fn as_str(&self) -> &'static str;

    /// All wire literals
    fn literals() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.as_str()).collect()
    }
}

/// A string that is not part of a literal set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not one of: {}", join_literals(.allowed))]
pub struct UnknownLiteral {
    pub value: String,
    pub allowed: Vec<&'static str>,
}

fn join_literals(allowed: &[&'static str]) -> String {
    allowed.join(", ")
}

/// Declares a literal enumeration with its serde names, `Literal`,
/// `Display` and `FromStr`.
macro_rules! literal_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $lit:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $($(#[$vmeta])* #[serde(rename = $lit)] $variant),+
        }

        impl $crate::entity::Literal for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $lit),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::entity::Literal::as_str(self))
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::entity::UnknownLiteral;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($lit => Ok($name::$variant),)+
                    other => Err($crate::entity::UnknownLiteral {
                        value: other.to_string(),
                        allowed: <$name as $crate::entity::Literal>::literals(),
                    }),
                }
            }
        }
    };
}

pub(crate) use literal_enum;

// ============================================================================
// Schema fragments
// ============================================================================

/// Root object schema for an entity
pub(crate) fn object_schema(
    name: &str,
    description: &str,
    required: &[&str],
    properties: Vec<(&str, Value)>,
) -> Value {
    let collection = name.to_lowercase();
    let mut props = Map::new();
    for (field, schema) in properties {
        props.insert(field.to_string(), schema);
    }

    json!({
        "$schema": SCHEMA_DIALECT,
        "$id": format!("{}/{}.schema.json", SCHEMA_ID_BASE, collection),
        "title": name,
        "description": description,
        "type": "object",
        "required": required,
        "properties": props,
        "x-dgardn-collection": collection,
    })
}

/// Attach a description to a field schema
pub(crate) fn described(mut schema: Value, description: &str) -> Value {
    if let Some(obj) = schema.as_object_mut() {
        obj.insert("description".to_string(), json!(description));
    }
    schema
}

pub(crate) fn required_string() -> Value {
    json!({ "type": "string" })
}

pub(crate) fn optional_string() -> Value {
    json!({ "type": ["string", "null"] })
}

/// Optional absolute http(s) URL
pub(crate) fn http_url() -> Value {
    json!({
        "type": ["string", "null"],
        "format": "uri",
        "pattern": "^https?://[^\\s/]+",
    })
}

/// Optional date or date-time; see `formats::parse_timestamp`
pub(crate) fn date_time() -> Value {
    json!({ "type": ["string", "null"], "format": TIMESTAMP_FORMAT })
}

/// Non-negative number defaulting to zero
pub(crate) fn amount() -> Value {
    json!({ "type": "number", "minimum": 0, "default": 0 })
}

/// Optional non-negative integer
pub(crate) fn count() -> Value {
    json!({ "type": ["integer", "null"], "minimum": 0, "maximum": MAX_WHOLE_NUMBER })
}

pub(crate) fn boolean(default: bool) -> Value {
    json!({ "type": "boolean", "default": default })
}

/// Required-or-defaulted literal set
pub(crate) fn literal<L: Literal>(default: Option<L>) -> Value {
    let mut schema = json!({ "enum": L::literals() });
    if let Some(default) = default {
        schema["default"] = json!(default.as_str());
    }
    schema
}

/// Literal set that also accepts an explicit null
pub(crate) fn nullable_literal<L: Literal>(default: Option<L>) -> Value {
    let mut options: Vec<Value> = L::literals().into_iter().map(Value::from).collect();
    options.push(Value::Null);
    let mut schema = json!({ "enum": options });
    if let Some(default) = default {
        schema["default"] = json!(default.as_str());
    }
    schema
}
