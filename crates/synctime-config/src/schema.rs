//! Raw configuration schema (as parsed from TOML or JSON)

use serde::{Deserialize, Deserializer, Serialize};

/// Raw module configuration as parsed from disk
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawModuleConfig {
    /// Config schema version
    pub config_version: u32,

    /// Module-level settings
    #[serde(default)]
    pub module: RawModuleSettings,

    /// Components this module should serve
    #[serde(default)]
    pub components: Vec<RawComponent>,
}

/// Module-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawModuleSettings {
    /// How often the bootstrap loop takes readings (default: 60)
    pub poll_interval_secs: Option<u64>,
}

/// Raw component definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawComponent {
    /// Component name, unique within the module
    pub name: String,

    /// API triple (default: rdk:component:sensor)
    pub api: Option<String>,

    /// Model triple, e.g. naomi:sync-at-time:timesyncsensor
    pub model: String,

    /// Model-specific attributes, interpreted by the model's validator
    #[serde(default = "empty_attributes")]
    pub attributes: serde_json::Value,
}

pub(crate) fn empty_attributes() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// Attributes of a time-window sync sensor.
///
/// Missing and `null` fields deserialize to empty strings so that
/// validation can report them by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window start, `HH:MM:SS`
    #[serde(deserialize_with = "null_as_empty")]
    pub start: String,

    /// Window end, `HH:MM:SS`
    #[serde(deserialize_with = "null_as_empty")]
    pub end: String,

    /// IANA timezone name the window is expressed in
    #[serde(deserialize_with = "null_as_empty")]
    pub zone: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl WindowConfig {
    pub fn new(start: impl Into<String>, end: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            zone: zone.into(),
        }
    }
}
