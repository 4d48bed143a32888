//! Strongly-typed identifiers for components hosted by the module

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error parsing a `namespace:family:name` triple
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid triple '{value}': expected namespace:family:name")]
pub struct TripleParseError {
    pub value: String,
}

fn split_triple(s: &str) -> Result<(String, String, String), TripleParseError> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [a, b, c] if !a.is_empty() && !b.is_empty() && !c.is_empty() => {
            Ok((a.to_string(), b.to_string(), c.to_string()))
        }
        _ => Err(TripleParseError { value: s.to_string() }),
    }
}

/// Capability API a component implements, e.g. `rdk:component:sensor`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Api {
    pub namespace: String,
    pub kind: String,
    pub subtype: String,
}

impl Api {
    pub fn new(
        namespace: impl Into<String>,
        kind: impl Into<String>,
        subtype: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            kind: kind.into(),
            subtype: subtype.into(),
        }
    }

    /// The generic sensor API
    pub fn sensor() -> Self {
        Self::new("rdk", "component", "sensor")
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.kind, self.subtype)
    }
}

impl FromStr for Api {
    type Err = TripleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, kind, subtype) = split_triple(s)?;
        Ok(Self { namespace, kind, subtype })
    }
}

impl TryFrom<String> for Api {
    type Error = TripleParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Api> for String {
    fn from(api: Api) -> Self {
        api.to_string()
    }
}

/// Concrete model implementing an API, e.g. `naomi:sync-at-time:timesyncsensor`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Model {
    pub namespace: String,
    pub family: String,
    pub name: String,
}

impl Model {
    pub fn new(
        namespace: impl Into<String>,
        family: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            family: family.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.family, self.name)
    }
}

impl FromStr for Model {
    type Err = TripleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, family, name) = split_triple(s)?;
        Ok(Self { namespace, family, name })
    }
}

impl TryFrom<String> for Model {
    type Error = TripleParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        model.to_string()
    }
}

/// Identity of a configured component: the API it serves plus its name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceName {
    pub api: Api,
    pub name: String,
}

impl ResourceName {
    pub fn new(api: Api, name: impl Into<String>) -> Self {
        Self {
            api,
            name: name.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api, self.name)
    }
}
