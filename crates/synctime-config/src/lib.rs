//! Configuration parsing and validation for sync-at-time
//!
//! Supports TOML (or JSON) module configuration with:
//! - Versioned schema
//! - Component definitions (name, API, model, attributes)
//! - Time-window attributes and their required-field validation
//! - Validation with clear error messages

mod module;
mod schema;
mod validation;

pub use module::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a file.
///
/// Files ending in `.json` are parsed as JSON; everything else as TOML.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<ModuleConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        parse_config_json(&content)
    } else {
        parse_config(&content)
    }
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<ModuleConfig> {
    let raw: RawModuleConfig = toml::from_str(content)?;
    finish(raw)
}

/// Parse and validate configuration from a JSON string
pub fn parse_config_json(content: &str) -> ConfigResult<ModuleConfig> {
    let raw: RawModuleConfig = serde_json::from_str(content)?;
    finish(raw)
}

fn finish(raw: RawModuleConfig) -> ConfigResult<ModuleConfig> {
    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(ModuleConfig::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1

            [[components]]
            name = "office-hours"
            model = "naomi:sync-at-time:timesyncsensor"

            [components.attributes]
            start = "08:00:00"
            end = "20:00:00"
            zone = "UTC"
        "#;

        let config = parse_config(config).unwrap();
        assert_eq!(config.components.len(), 1);
        assert_eq!(config.module.poll_interval, DEFAULT_POLL_INTERVAL);

        let component = config.get_component("office-hours").unwrap();
        assert_eq!(component.api, synctime_util::Api::sensor());
        assert_eq!(component.model.name, "timesyncsensor");

        let window = WindowConfig::from_attributes(&component.attributes, "components.0").unwrap();
        assert_eq!(window, WindowConfig::new("08:00:00", "20:00:00", "UTC"));
    }

    #[test]
    fn component_without_attributes_gets_empty_table() {
        let config = r#"
            config_version = 1

            [[components]]
            name = "bare"
            model = "naomi:sync-at-time:timesyncsensor"
        "#;

        let config = parse_config(config).unwrap();
        assert!(config.components[0].attributes.as_object().unwrap().is_empty());
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_structural_errors() {
        let config = r#"
            config_version = 1

            [[components]]
            name = "a"
            model = "timesyncsensor"
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::ValidationFailed { .. })));
    }

    #[test]
    fn parse_json_config() {
        let config = r#"{
            "config_version": 1,
            "module": { "poll_interval_secs": 5 },
            "components": [{
                "name": "nightly",
                "api": "rdk:component:sensor",
                "model": "naomi:sync-at-time:timesyncsensor",
                "attributes": { "start": "01:00:00", "end": "05:00:00", "zone": "America/New_York" }
            }]
        }"#;

        let config = parse_config_json(config).unwrap();
        assert_eq!(config.module.poll_interval, Duration::from_secs(5));
        assert_eq!(config.components[0].resource_name().as_str(), "nightly");
    }

    #[test]
    fn load_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("config.json");
        let mut f = std::fs::File::create(&json_path).unwrap();
        write!(f, r#"{{ "config_version": 1 }}"#).unwrap();
        assert!(load_config(&json_path).unwrap().components.is_empty());

        let toml_path = dir.path().join("config.toml");
        std::fs::write(&toml_path, "config_version = 1\n").unwrap();
        assert!(load_config(&toml_path).unwrap().components.is_empty());
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
