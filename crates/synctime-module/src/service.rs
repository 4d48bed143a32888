//! Component bookkeeping for the module process

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use synctime_config::{component_path, load_config, ComponentConfig, ModuleConfig};
use synctime_host_api::{Readings, Registry, Sensor};
use tracing::{debug, error, info, warn};

/// A constructed component and the last decision it reported
struct Component {
    config: ComponentConfig,
    sensor: Arc<dyn Sensor>,
    last_should_sync: Option<bool>,
}

/// Every component this process serves, built from one config file
pub struct Service {
    registry: Registry,
    config_path: PathBuf,
    poll_interval: Duration,
    components: Vec<Component>,
}

impl Service {
    /// Load `config_path` and construct every component it names
    pub fn load(registry: Registry, config_path: &Path) -> Result<Self> {
        let config = load_config(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))?;

        info!(
            config_path = %config_path.display(),
            component_count = config.components.len(),
            "Configuration loaded"
        );

        Self::from_config(registry, config_path.to_path_buf(), config)
    }

    pub fn from_config(
        registry: Registry,
        config_path: PathBuf,
        config: ModuleConfig,
    ) -> Result<Self> {
        let mut service = Self {
            registry,
            config_path,
            poll_interval: config.module.poll_interval,
            components: Vec::new(),
        };

        for (index, component) in config.components.iter().enumerate() {
            let built = service.build(component, &component_path(index))?;
            service.components.push(built);
        }

        Ok(service)
    }

    fn build(&self, config: &ComponentConfig, path: &str) -> Result<Component> {
        self.registry
            .validate(config, path)
            .with_context(|| format!("Invalid component {}", config.name))?;

        let sensor = self
            .registry
            .construct(config, path)
            .with_context(|| format!("Failed to construct component {}", config.name))?;

        info!(name = %config.name, model = %config.model, "Component constructed");

        Ok(Component {
            config: config.clone(),
            sensor,
            last_should_sync: None,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn component_names(&self) -> Vec<String> {
        self.components.iter().map(|c| c.config.name.clone()).collect()
    }

    #[cfg(test)]
    pub fn sensor(&self, name: &str) -> Option<Arc<dyn Sensor>> {
        self.components
            .iter()
            .find(|c| c.config.name == name)
            .map(|c| c.sensor.clone())
    }

    /// Take one reading from every component, logging decision changes
    pub fn poll(&mut self) {
        for component in &mut self.components {
            let name = &component.config.name;
            match component.sensor.readings(&Readings::new()) {
                Ok(readings) => {
                    let should_sync = readings.get("should_sync").and_then(Value::as_bool);
                    if should_sync != component.last_should_sync {
                        info!(
                            name = %name,
                            should_sync = ?should_sync,
                            time = ?readings.get("time"),
                            "Sync decision changed"
                        );
                        component.last_should_sync = should_sync;
                    } else {
                        debug!(name = %name, should_sync = ?should_sync, "Reading taken");
                    }
                }
                Err(e) => {
                    warn!(name = %name, error = %e, "Reading failed");
                    component.last_should_sync = None;
                }
            }
        }
    }

    /// One reading per component, keyed by name
    pub fn snapshot(&self) -> Value {
        let mut out = serde_json::Map::new();
        for component in &self.components {
            let value = match component.sensor.readings(&Readings::new()) {
                Ok(readings) => Value::Object(readings),
                Err(e) => json!({ "error": e.to_string() }),
            };
            out.insert(component.config.name.clone(), value);
        }
        Value::Object(out)
    }

    /// Re-read the config file and bring components in line with it.
    ///
    /// Components whose name, API and model are unchanged are reconfigured in
    /// place; others are built fresh. Components missing from the new file
    /// are closed. If the file cannot be loaded the current set is kept.
    pub fn reload(&mut self) -> Result<()> {
        let config = load_config(&self.config_path)
            .with_context(|| format!("Failed to reload config from {:?}", self.config_path))?;
        self.apply(config);
        Ok(())
    }

    pub fn apply(&mut self, config: ModuleConfig) {
        self.poll_interval = config.module.poll_interval;

        let mut previous = std::mem::take(&mut self.components);
        let mut next = Vec::with_capacity(config.components.len());

        for (index, new_config) in config.components.into_iter().enumerate() {
            let path = component_path(index);
            let existing = previous
                .iter()
                .position(|c| c.config.name == new_config.name)
                .map(|i| previous.swap_remove(i));

            match existing {
                Some(mut current)
                    if current.config.api == new_config.api
                        && current.config.model == new_config.model =>
                {
                    if let Err(e) = self.registry.validate(&new_config, &path) {
                        warn!(name = %new_config.name, error = %e, "Keeping previous configuration");
                    } else {
                        match current.sensor.reconfigure(&new_config, &path) {
                            Ok(()) => {
                                info!(name = %new_config.name, "Component reconfigured");
                                current.config = new_config;
                            }
                            Err(e) => {
                                warn!(name = %new_config.name, error = %e, "Keeping previous configuration")
                            }
                        }
                    }
                    next.push(current);
                }
                existing => {
                    if let Some(old) = existing {
                        Self::close_component(&old);
                    }
                    match self.build(&new_config, &path) {
                        Ok(component) => next.push(component),
                        Err(e) => error!(name = %new_config.name, error = %e, "Failed to build component"),
                    }
                }
            }
        }

        for removed in previous {
            Self::close_component(&removed);
        }

        self.components = next;
    }

    fn close_component(component: &Component) {
        if let Err(e) = component.sensor.close() {
            warn!(name = %component.config.name, error = %e, "Failed to close component");
        } else {
            info!(name = %component.config.name, "Component closed");
        }
    }

    /// Close every component
    pub fn shutdown(&mut self) {
        for component in self.components.drain(..) {
            Self::close_component(&component);
        }
    }
}
