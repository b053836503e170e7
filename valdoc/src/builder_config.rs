//! Builder configuration from valdoc.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::brackets::BracketMappings;

/// Main builder configuration from valdoc.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Identifier of the VAL document being built
    pub val_id: i64,

    /// Human-readable document title
    pub document_title: String,

    /// Optional plan name shown alongside the title
    pub plan_name: Option<String>,

    /// Values for bracket placeholders (e.g. "Company Name" = "Acme Corp")
    #[serde(default)]
    pub brackets: BracketMappings,
}

impl BuilderConfig {
    /// Load configuration from a valdoc.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the valdoc.toml configuration file
    ///
    /// # Returns
    /// * `Ok(BuilderConfig)` - Successfully loaded configuration
    /// * `Err(ConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path)?;
        let config: BuilderConfig = toml::from_str(&content)?;
        log::debug!(
            "Loaded config for document {} with {} bracket mappings",
            config.val_id,
            config.brackets.len()
        );
        Ok(config)
    }

    /// Save configuration to a valdoc.toml file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// Errors that can occur when loading or saving builder configuration
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
    /// IO error when reading or writing file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing TOML
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Error serializing to TOML
    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_example_toml() {
        let toml_content = r#"
val_id = 4021
document_title = "2024 Actuarial Valuation"
plan_name = "Acme Retirement Plan"

[brackets]
"Company Name" = "Acme Corp"
"Plan.Year" = "2024"
"#;

        let config: BuilderConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.val_id, 4021);
        assert_eq!(config.plan_name.as_deref(), Some("Acme Retirement Plan"));
        assert_eq!(
            config.brackets.get("Company Name").map(String::as_str),
            Some("Acme Corp")
        );
    }

    #[test]
    fn test_brackets_default_to_empty() {
        let config: BuilderConfig =
            toml::from_str("val_id = 1\ndocument_title = \"Untitled\"\n").unwrap();
        assert!(config.brackets.is_empty());
        assert_eq!(config.plan_name, None);
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = BuilderConfig {
            val_id: 7,
            document_title: "Funding Report".to_string(),
            plan_name: None,
            brackets: BracketMappings::new(),
        };
        config
            .brackets
            .insert("Trustee".to_string(), "J. Smith".to_string());

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: BuilderConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_then_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valdoc.toml");
        let config = BuilderConfig {
            val_id: 12,
            document_title: "Valuation Report".to_string(),
            plan_name: Some("Acme Pension Plan".to_string()),
            brackets: BracketMappings::from([(
                "Company Name".to_string(),
                "Acme Corp".to_string(),
            )]),
        };

        config.save(&path).unwrap();
        let loaded = BuilderConfig::load(&path).unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valdoc.toml");
        std::fs::write(&path, "val_id = \"not a number\"\n").unwrap();

        let err = BuilderConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BuilderConfig::load(dir.path().join("valdoc.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
