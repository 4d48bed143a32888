//! Validated module configuration

use crate::schema::{RawComponent, RawModuleConfig, RawModuleSettings};
use std::time::Duration;
use synctime_util::{Api, Model, ResourceName};

/// Default interval between readings taken by the module's poll loop
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Validated module configuration ready for the bootstrap
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    /// Module-level settings
    pub module: ModuleSettings,

    /// Components to construct, in file order
    pub components: Vec<ComponentConfig>,
}

impl ModuleConfig {
    /// Convert from raw config (after validation)
    pub(crate) fn from_raw(raw: RawModuleConfig) -> Self {
        Self {
            module: ModuleSettings::from_raw(raw.module),
            components: raw
                .components
                .into_iter()
                .filter_map(ComponentConfig::from_raw)
                .collect(),
        }
    }

    /// Get component by name
    pub fn get_component(&self, name: &str) -> Option<&ComponentConfig> {
        self.components.iter().find(|c| c.name == name)
    }
}

/// Module-level settings
#[derive(Debug, Clone)]
pub struct ModuleSettings {
    pub poll_interval: Duration,
}

impl ModuleSettings {
    fn from_raw(raw: RawModuleSettings) -> Self {
        Self {
            poll_interval: raw
                .poll_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
        }
    }
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// A single component as handed to a model constructor
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentConfig {
    pub name: String,
    pub api: Api,
    pub model: Model,
    pub attributes: serde_json::Value,
}

impl ComponentConfig {
    pub fn new(name: impl Into<String>, model: Model, attributes: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            api: Api::sensor(),
            model,
            attributes,
        }
    }

    pub fn with_api(mut self, api: Api) -> Self {
        self.api = api;
        self
    }

    pub fn resource_name(&self) -> ResourceName {
        ResourceName::new(self.api.clone(), self.name.clone())
    }

    // Validation has already rejected malformed triples, so nothing is dropped here.
    fn from_raw(raw: RawComponent) -> Option<Self> {
        let api = match raw.api {
            Some(api) => api.parse().ok()?,
            None => Api::sensor(),
        };
        let model = raw.model.parse().ok()?;

        Some(Self {
            name: raw.name,
            api,
            model,
            attributes: raw.attributes,
        })
    }
}
