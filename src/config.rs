//! Configuration for validation and schema export
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schemas.toml)
//! - Environment variables (DGARDN_SCHEMAS__*)
//!
//! ## Example config file (schemas.toml):
//! ```toml
//! [validation]
//! reject_unknown_fields = false
//! max_violations = 0
//!
//! [export]
//! output_format = "pretty"
//! include_checksums = true
//! include_manifest = true
//! output_dir = "./generated"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject fields that are not part of an entity schema.
    /// Off by default: unknown fields are ignored.
    #[serde(default)]
    pub reject_unknown_fields: bool,

    /// Maximum violations reported per record (0 = all)
    #[serde(default)]
    pub max_violations: usize,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Include checksums file
    #[serde(default = "default_true")]
    pub include_checksums: bool,

    /// Include manifest file
    #[serde(default = "default_true")]
    pub include_manifest: bool,

    /// Where exported schemas go
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
            include_checksums: true,
            include_manifest: true,
            output_dir: default_output_dir(),
        }
    }
}

impl SchemaConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["schemas.toml", ".schemas.toml", "config/schemas.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "dgardn", "schemas") {
            let xdg_config = config_dir.config_dir().join("schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // DGARDN_SCHEMAS__VALIDATION__REJECT_UNKNOWN_FIELDS=true
        builder = builder.add_source(
            Environment::with_prefix("DGARDN_SCHEMAS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = SchemaConfig::default();
        assert!(!config.validation.reject_unknown_fields);
        assert_eq!(config.validation.max_violations, 0);
        assert_eq!(config.export.output_format, OutputFormat::Pretty);
        assert!(config.export.include_checksums);
    }

    #[test]
    fn test_serialize_config() {
        let config = SchemaConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[validation]"));
        assert!(toml_str.contains("[export]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[validation]\nreject_unknown_fields = true\nmax_violations = 3\n\n[export]\noutput_format = \"compact\"\n",
        )
        .unwrap();

        let config = SchemaConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert!(config.validation.reject_unknown_fields);
        assert_eq!(config.validation.max_violations, 3);
        assert_eq!(config.export.output_format, OutputFormat::Compact);
        assert!(config.export.include_manifest);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = SchemaConfig::default();
        config.validation.max_violations = 5;
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = SchemaConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.validation.max_violations, 5);
    }
}
