//! Configuration validation

use crate::schema::{RawComponent, RawModuleConfig, WindowConfig};
use std::collections::HashSet;
use synctime_util::{Api, Model};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Error validating. Path: \"{path}\" Error: \"{field}\" is required")]
    FieldRequired { path: String, field: &'static str },

    #[error("Error validating. Path: \"{path}\" Error: {message}")]
    InvalidAttributes { path: String, message: String },

    #[error("Duplicate component name: {0}")]
    DuplicateComponentName(String),

    #[error("Invalid model '{value}' at {path}: expected namespace:family:name")]
    InvalidModel { path: String, value: String },

    #[error("Invalid API '{value}' at {path}: expected namespace:type:subtype")]
    InvalidApi { path: String, value: String },

    #[error("Module config error: {0}")]
    ModuleError(String),
}

/// Implicit dependencies declared by a validated component:
/// required (first) and optional (second).
pub type Dependencies = (Vec<String>, Vec<String>);

impl WindowConfig {
    /// Decode window attributes from a component's attribute map.
    pub fn from_attributes(
        attributes: &serde_json::Value,
        path: &str,
    ) -> Result<Self, ValidationError> {
        serde_json::from_value(attributes.clone()).map_err(|e| {
            ValidationError::InvalidAttributes {
                path: path.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Ensure every required field is present.
    ///
    /// Only presence is checked here; whether `start`/`end` parse as times
    /// and `zone` names a real timezone is decided when the window is
    /// evaluated. Fields are checked in order and the first missing one is
    /// reported. A window sensor depends on no other component, so both
    /// dependency lists are always empty.
    ///
    /// `path` locates the component in the host configuration, e.g.
    /// `"components.0"`.
    pub fn validate(&self, path: &str) -> Result<Dependencies, ValidationError> {
        let required = [
            ("start", &self.start),
            ("end", &self.end),
            ("zone", &self.zone),
        ];

        for (field, value) in required {
            if value.is_empty() {
                return Err(ValidationError::FieldRequired {
                    path: path.to_string(),
                    field,
                });
            }
        }

        Ok((Vec::new(), Vec::new()))
    }
}

/// Validate the structure of a raw module configuration.
///
/// Model-specific attributes are left to the model's own validator.
pub fn validate_config(config: &RawModuleConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.module.poll_interval_secs == Some(0) {
        errors.push(ValidationError::ModuleError(
            "poll_interval_secs must be greater than zero".into(),
        ));
    }

    let mut seen_names = HashSet::new();
    for component in &config.components {
        if !component.name.is_empty() && !seen_names.insert(&component.name) {
            errors.push(ValidationError::DuplicateComponentName(
                component.name.clone(),
            ));
        }
    }

    for (index, component) in config.components.iter().enumerate() {
        errors.extend(validate_component(component, &component_path(index)));
    }

    errors
}

/// Path of a component within the module configuration
pub fn component_path(index: usize) -> String {
    format!("components.{}", index)
}

fn validate_component(component: &RawComponent, path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if component.name.is_empty() {
        errors.push(ValidationError::FieldRequired {
            path: path.to_string(),
            field: "name",
        });
    }

    if component.model.is_empty() {
        errors.push(ValidationError::FieldRequired {
            path: path.to_string(),
            field: "model",
        });
    } else if component.model.parse::<Model>().is_err() {
        errors.push(ValidationError::InvalidModel {
            path: path.to_string(),
            value: component.model.clone(),
        });
    }

    if let Some(api) = &component.api
        && api.parse::<Api>().is_err()
    {
        errors.push(ValidationError::InvalidApi {
            path: path.to_string(),
            value: api.clone(),
        });
    }

    if !component.attributes.is_object() {
        errors.push(ValidationError::InvalidAttributes {
            path: path.to_string(),
            message: "attributes must be a table".into(),
        });
    }

    errors
}
