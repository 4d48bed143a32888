//! Time-window sync decision engine
//!
//! This crate contains:
//! - Window evaluation (is "now" inside today's start/end in a timezone?)
//! - The time-sync sensor that holds the window, swaps it on
//!   reconfiguration and reports the decision as a reading
//! - Registration of the sensor model with a host registry

mod sensor;
mod window;

pub use sensor::*;
pub use window::*;

use std::sync::Arc;
use synctime_config::WindowConfig;
use synctime_host_api::{Registration, Registry, RegistryResult, Sensor};
use synctime_util::{Api, Clock, SystemClock};

/// Register the time-sync sensor model, reading the system clock
pub fn register(registry: &mut Registry) -> RegistryResult<()> {
    register_with_clock(registry, Arc::new(SystemClock))
}

/// Register the time-sync sensor model with a specific clock
pub fn register_with_clock(registry: &mut Registry, clock: Arc<dyn Clock>) -> RegistryResult<()> {
    registry.register(
        Api::sensor(),
        model(),
        Registration::new(
            |config, path| WindowConfig::from_attributes(&config.attributes, path)?.validate(path),
            move |config, path| {
                let sensor = TimeSyncSensor::from_component(config, path, clock.clone())?;
                Ok(Arc::new(sensor) as Arc<dyn Sensor>)
            },
        ),
    )
}
