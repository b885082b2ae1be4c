//! Exportable manifest of entity schemas
//!
//! ## Export layout
//!
//! ```text
//! out/
//! ├── schemas/
//! │   ├── user.schema.json
//! │   ├── organization.schema.json
//! │   └── ...
//! ├── manifest.json
//! └── checksums.sha256
//! ```

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::catalog::EntityKind;
use crate::checksum::Checksum;
use crate::config::{ExportConfig, OutputFormat};
use crate::error::{Result, SchemaError};

/// Directory (under the export root) holding the schema documents
pub const SCHEMAS_DIR: &str = "schemas";

/// sha256sum-format listing written next to the schemas
pub const CHECKSUMS_FILE: &str = "checksums.sha256";

/// A single entity schema in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Class name (e.g., "SavedItem")
    pub name: String,
    /// Collection name (e.g., "saveditem")
    pub collection: String,
    /// SHA256 checksum of the schema document
    pub checksum: Checksum,
    /// The schema document
    pub schema: Value,
}

impl ManifestEntry {
    pub fn new(kind: EntityKind, schema: Value) -> Self {
        Self {
            name: kind.name().to_string(),
            collection: kind.collection(),
            checksum: Checksum::from_json(&schema),
            schema,
        }
    }

    /// Verify the checksum matches the schema
    pub fn verify_checksum(&self) -> bool {
        self.checksum.verify_json(&self.schema)
    }

    /// File name of the exported schema document
    pub fn filename(&self) -> String {
        format!("{}.schema.json", self.collection)
    }
}

/// Manifest containing every entity schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Crate version the schemas were generated from
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub entities: Vec<ManifestEntry>,
    /// Checksum over all entry checksums
    pub manifest_checksum: Checksum,
}

impl Manifest {
    pub fn new(schemas: Vec<(EntityKind, Value)>) -> Self {
        let entities: Vec<ManifestEntry> = schemas
            .into_iter()
            .map(|(kind, schema)| ManifestEntry::new(kind, schema))
            .collect();
        let manifest_checksum = combined_checksum(&entities);

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            entities,
            manifest_checksum,
        }
    }

    /// Manifest of the built-in schemas
    pub fn builtin() -> Self {
        Self::new(
            EntityKind::ALL
                .iter()
                .map(|kind| (*kind, kind.json_schema()))
                .collect(),
        )
    }

    /// Verify every entry and the combined checksum
    pub fn verify_all(&self) -> bool {
        self.entities.iter().all(|e| e.verify_checksum())
            && combined_checksum(&self.entities) == self.manifest_checksum
    }

    /// Get an entry by class or collection name
    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        let wanted = name.to_lowercase();
        self.entities.iter().find(|e| e.collection == wanted)
    }

    /// Contents of `checksums.sha256` (sha256sum format)
    pub fn checksums_file(&self) -> String {
        self.entities
            .iter()
            .map(|e| format!("{}  {}/{}", e.checksum, SCHEMAS_DIR, e.filename()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write schemas, manifest and checksums to `output_dir`
    pub fn export(&self, output_dir: impl AsRef<Path>, config: &ExportConfig) -> Result<()> {
        let output = output_dir.as_ref();
        let schemas_dir = output.join(SCHEMAS_DIR);
        fs::create_dir_all(&schemas_dir)?;

        for entry in &self.entities {
            let content = render(&entry.schema, config.output_format)?;
            fs::write(schemas_dir.join(entry.filename()), content)?;
        }

        if config.include_manifest {
            let content = render(&serde_json::to_value(self)?, config.output_format)?;
            fs::write(output.join("manifest.json"), content)?;
        }

        if config.include_checksums {
            fs::write(output.join(CHECKSUMS_FILE), self.checksums_file())?;
        }

        info!(
            entities = self.entities.len(),
            path = %output.display(),
            "exported entity schemas"
        );
        Ok(())
    }

    /// Compare the schema documents in an export directory to this manifest
    pub fn verify_export(&self, output_dir: impl AsRef<Path>) -> Result<()> {
        let output = output_dir.as_ref();
        let schemas_dir = output.join(SCHEMAS_DIR);

        for entry in &self.entities {
            let path = schemas_dir.join(entry.filename());
            let exported: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
            let actual = Checksum::from_json(&exported);
            if actual != entry.checksum {
                warn!(entity = %entry.name, path = %path.display(), "exported schema drifted");
                return Err(SchemaError::ChecksumMismatch {
                    name: entry.name.clone(),
                    expected: entry.checksum.to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        // The checksums listing is optional, but when present it must agree too
        let listing = output.join(CHECKSUMS_FILE);
        if listing.exists() {
            let recorded = parse_checksums_file(&fs::read_to_string(&listing)?);
            for entry in &self.entities {
                let file = format!("{}/{}", SCHEMAS_DIR, entry.filename());
                let actual = recorded.iter().find(|(name, _)| *name == file).map(|(_, c)| c);
                if actual != Some(&entry.checksum) {
                    warn!(entity = %entry.name, path = %listing.display(), "checksums listing drifted");
                    return Err(SchemaError::ChecksumMismatch {
                        name: entry.name.clone(),
                        expected: entry.checksum.to_string(),
                        actual: actual
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "missing".to_string()),
                    });
                }
            }
        }
        Ok(())
    }
}

/// `<hex>  <file>` lines, as written by `checksums_file` and `sha256sum`
fn parse_checksums_file(content: &str) -> Vec<(String, Checksum)> {
    content
        .lines()
        .filter_map(|line| {
            let (hex, file) = line.split_once("  ")?;
            Some((file.trim().to_string(), Checksum::from(hex.trim().to_string())))
        })
        .collect()
}

fn combined_checksum(entries: &[ManifestEntry]) -> Checksum {
    let checksums: Vec<&str> = entries.iter().map(|e| e.checksum.as_str()).collect();
    Checksum::of_str(&checksums.join(","))
}

fn render(value: &Value, format: OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_manifest_covers_all_entities() {
        let manifest = Manifest::builtin();
        assert_eq!(manifest.entities.len(), EntityKind::ALL.len());
        assert!(manifest.verify_all());
        assert_eq!(manifest.get("SavedItem").unwrap().filename(), "saveditem.schema.json");
    }

    #[test]
    fn test_tampered_entry_fails_verification() {
        let mut manifest = Manifest::builtin();
        manifest.entities[0].schema["required"] = serde_json::json!([]);
        assert!(!manifest.verify_all());
    }

    #[test]
    fn test_export_and_verify() {
        let dir = tempdir().unwrap();
        let manifest = Manifest::builtin();
        manifest.export(dir.path(), &ExportConfig::default()).unwrap();

        assert!(dir.path().join("manifest.json").exists());
        assert!(dir.path().join("checksums.sha256").exists());
        assert!(dir.path().join("schemas/event.schema.json").exists());
        manifest.verify_export(dir.path()).unwrap();
    }

    #[test]
    fn test_verify_export_detects_drift() {
        let dir = tempdir().unwrap();
        let manifest = Manifest::builtin();
        manifest.export(dir.path(), &ExportConfig::default()).unwrap();

        fs::write(dir.path().join("schemas/job.schema.json"), "{}").unwrap();
        let err = manifest.verify_export(dir.path()).unwrap_err();
        assert!(matches!(err, SchemaError::ChecksumMismatch { ref name, .. } if name == "Job"));
    }

    #[test]
    fn test_verify_export_reads_checksums_listing() {
        let dir = tempdir().unwrap();
        let manifest = Manifest::builtin();
        manifest.export(dir.path(), &ExportConfig::default()).unwrap();

        let listing = dir.path().join(CHECKSUMS_FILE);
        let recorded = parse_checksums_file(&fs::read_to_string(&listing).unwrap());
        assert_eq!(recorded.len(), EntityKind::ALL.len());
        assert_eq!(recorded[0].0, "schemas/user.schema.json");
        assert_eq!(recorded[0].1, manifest.get("User").unwrap().checksum);

        // Schemas untouched, listing edited
        let tampered = manifest.checksums_file().replacen(
            manifest.get("User").unwrap().checksum.as_str(),
            &"0".repeat(64),
            1,
        );
        fs::write(&listing, tampered).unwrap();
        let err = manifest.verify_export(dir.path()).unwrap_err();
        assert!(matches!(err, SchemaError::ChecksumMismatch { ref name, ref actual, .. }
            if name == "User" && *actual == "0".repeat(64)));
    }

    #[test]
    fn test_verify_export_without_listing() {
        let dir = tempdir().unwrap();
        let manifest = Manifest::builtin();
        let config = ExportConfig {
            include_checksums: false,
            ..ExportConfig::default()
        };
        manifest.export(dir.path(), &config).unwrap();

        assert!(!dir.path().join(CHECKSUMS_FILE).exists());
        manifest.verify_export(dir.path()).unwrap();
    }

    #[test]
    fn test_checksums_file_format() {
        let manifest = Manifest::builtin();
        let first = manifest.checksums_file().lines().next().unwrap().to_string();
        assert!(first.ends_with("  schemas/user.schema.json"));
        assert_eq!(first.split_whitespace().next().unwrap().len(), 64);
    }
}
