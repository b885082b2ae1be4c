//! Dgardn Entity Schemas
//!
//! Record shapes for the Dgardn social/organization platform and their
//! validation at API boundaries.
//!
//! ## Features
//!
//! - **Typed Records**: one serde record per entity, defaults applied on decode
//! - **JSON Schema Contracts**: every entity publishes a Draft 7 schema
//! - **Complete Failures**: validation reports every offending field at once
//! - **Collections**: each entity maps to its lowercased class name
//! - **Checksummed Export**: schemas export with a SHA256 manifest
//!
//! ## Example
//!
//! ```
//! use dgardn_schemas::{Entity, User};
//! use serde_json::json;
//!
//! let user = User::from_value(&json!({"email": "a@b.com", "name": "A"})).unwrap();
//! assert_eq!(user.bio, None);
//! assert_eq!(User::collection(), "user");
//! ```

pub mod catalog;
pub mod checksum;
pub mod config;
pub mod entities;
pub mod entity;
pub mod error;
pub mod formats;
pub mod manifest;
pub mod validation;

pub use catalog::{Catalog, EntityKind, Record};
pub use checksum::Checksum;
pub use config::{ExportConfig, OutputFormat, SchemaConfig, ValidationConfig};
pub use entities::*;
pub use entity::{Entity, Literal, UnknownLiteral};
pub use error::{Constraint, FieldViolation, Result, SchemaError, ValidationFailure};
pub use manifest::{Manifest, ManifestEntry};
pub use validation::EntityValidator;
