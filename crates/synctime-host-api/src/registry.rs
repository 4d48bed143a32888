//! Explicit model registry
//!
//! The bootstrap builds a [`Registry`], hands it to each model crate's
//! `register` function, and then asks it to validate and construct the
//! components named in the configuration. There is no process-wide registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use synctime_config::{ComponentConfig, Dependencies, ValidationError};
use synctime_util::{Api, Model};
use thiserror::Error;
use tracing::debug;

use crate::{Sensor, SensorError};

/// Errors from registry lookups and construction
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Model {model} already registered for {api}")]
    AlreadyRegistered { api: Api, model: Model },

    #[error("No model {model} registered for {api}")]
    UnknownModel { api: Api, model: Model },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to construct {name}: {source}")]
    Construct {
        name: String,
        #[source]
        source: SensorError,
    },
}

pub type RegistryResult<T> = Result<T, RegistryError>;

type ValidateFn = dyn Fn(&ComponentConfig, &str) -> Result<Dependencies, ValidationError> + Send + Sync;
type ConstructFn = dyn Fn(&ComponentConfig, &str) -> Result<Arc<dyn Sensor>, SensorError> + Send + Sync;

/// How to validate and build one model
pub struct Registration {
    validate: Box<ValidateFn>,
    construct: Box<ConstructFn>,
}

impl Registration {
    pub fn new<V, C>(validate: V, construct: C) -> Self
    where
        V: Fn(&ComponentConfig, &str) -> Result<Dependencies, ValidationError> + Send + Sync + 'static,
        C: Fn(&ComponentConfig, &str) -> Result<Arc<dyn Sensor>, SensorError> + Send + Sync + 'static,
    {
        Self {
            validate: Box::new(validate),
            construct: Box::new(construct),
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration").finish_non_exhaustive()
    }
}

/// Models this process can construct, keyed by API and model
#[derive(Debug, Default)]
pub struct Registry {
    models: HashMap<(Api, Model), Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model factory
    pub fn register(
        &mut self,
        api: Api,
        model: Model,
        registration: Registration,
    ) -> RegistryResult<()> {
        let key = (api, model);
        if self.models.contains_key(&key) {
            let (api, model) = key;
            return Err(RegistryError::AlreadyRegistered { api, model });
        }

        debug!(api = %key.0, model = %key.1, "Model registered");
        self.models.insert(key, registration);
        Ok(())
    }

    pub fn is_registered(&self, api: &Api, model: &Model) -> bool {
        self.models.contains_key(&(api.clone(), model.clone()))
    }

    /// Registered (api, model) pairs
    pub fn models(&self) -> impl Iterator<Item = &(Api, Model)> {
        self.models.keys()
    }

    fn lookup(&self, config: &ComponentConfig) -> RegistryResult<&Registration> {
        self.models
            .get(&(config.api.clone(), config.model.clone()))
            .ok_or_else(|| RegistryError::UnknownModel {
                api: config.api.clone(),
                model: config.model.clone(),
            })
    }

    /// Run the model's validator against a component
    pub fn validate(&self, config: &ComponentConfig, path: &str) -> RegistryResult<Dependencies> {
        let registration = self.lookup(config)?;
        Ok((registration.validate)(config, path)?)
    }

    /// Build a component with its model's constructor. `path` is the same
    /// location passed to [`Registry::validate`].
    pub fn construct(&self, config: &ComponentConfig, path: &str) -> RegistryResult<Arc<dyn Sensor>> {
        let registration = self.lookup(config)?;
        (registration.construct)(config, path).map_err(|source| RegistryError::Construct {
            name: config.name.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockSensor;
    use serde_json::json;

    fn mock_model() -> Model {
        Model::new("acme", "testing", "mock")
    }

    fn mock_registration() -> Registration {
        Registration::new(
            |config, path| {
                if config.attributes.get("fail").is_some() {
                    return Err(ValidationError::FieldRequired {
                        path: path.to_string(),
                        field: "fail",
                    });
                }
                Ok((vec![], vec![]))
            },
            |config, _path| Ok(Arc::new(MockSensor::new(config.resource_name())) as Arc<dyn Sensor>),
        )
    }

    #[test]
    fn register_and_construct() {
        let mut registry = Registry::new();
        registry
            .register(Api::sensor(), mock_model(), mock_registration())
            .unwrap();
        assert!(registry.is_registered(&Api::sensor(), &mock_model()));

        let config = ComponentConfig::new("widget", mock_model(), json!({}));
        registry.validate(&config, "components.0").unwrap();
        let sensor = registry.construct(&config, "components.0").unwrap();
        assert_eq!(sensor.name().as_str(), "widget");
    }

    #[test]
    fn models_lists_registrations() {
        let mut registry = Registry::new();
        assert_eq!(registry.models().count(), 0);

        let generic = Api::new("rdk", "component", "generic");
        registry
            .register(Api::sensor(), mock_model(), mock_registration())
            .unwrap();
        registry
            .register(generic.clone(), mock_model(), mock_registration())
            .unwrap();

        let mut apis: Vec<String> = registry.models().map(|(api, _)| api.to_string()).collect();
        apis.sort();
        assert_eq!(apis, vec![generic.to_string(), Api::sensor().to_string()]);
        assert!(registry.models().all(|(_, model)| *model == mock_model()));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = Registry::new();
        registry
            .register(Api::sensor(), mock_model(), mock_registration())
            .unwrap();
        let err = registry
            .register(Api::sensor(), mock_model(), mock_registration())
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));
    }

    #[test]
    fn unknown_model_rejected() {
        let registry = Registry::new();
        let config = ComponentConfig::new("widget", mock_model(), json!({}));
        assert!(matches!(
            registry.validate(&config, "components.0"),
            Err(RegistryError::UnknownModel { .. })
        ));
        assert!(matches!(
            registry.construct(&config, "components.0"),
            Err(RegistryError::UnknownModel { .. })
        ));
    }

    #[test]
    fn same_model_under_other_api_is_distinct() {
        let mut registry = Registry::new();
        registry
            .register(Api::sensor(), mock_model(), mock_registration())
            .unwrap();

        let config = ComponentConfig::new("widget", mock_model(), json!({}))
            .with_api(Api::new("rdk", "component", "generic"));
        assert!(matches!(
            registry.construct(&config, "components.0"),
            Err(RegistryError::UnknownModel { .. })
        ));
    }

    #[test]
    fn validator_errors_surface() {
        let mut registry = Registry::new();
        registry
            .register(Api::sensor(), mock_model(), mock_registration())
            .unwrap();

        let config = ComponentConfig::new("widget", mock_model(), json!({ "fail": true }));
        assert!(matches!(
            registry.validate(&config, "components.7"),
            Err(RegistryError::Validation(ValidationError::FieldRequired { field: "fail", .. }))
        ));
    }
}
