//! Sensor component traits

use synctime_config::{ComponentConfig, ValidationError};
use synctime_util::ResourceName;
use thiserror::Error;

/// Key/value map returned by a reading, and passed as extra parameters
pub type Readings = serde_json::Map<String, serde_json::Value>;

/// Free-form command payload for [`Sensor::do_command`]
pub type Command = serde_json::Map<String, serde_json::Value>;

/// Errors from sensor operations
#[derive(Debug, Error)]
pub enum SensorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Reading failed: {0}")]
    Readings(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("unimplemented")]
    Unimplemented,

    #[error("Component {0} is closed")]
    Closed(ResourceName),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SensorError {
    pub fn readings(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Readings(Box::new(err))
    }
}

pub type SensorResult<T> = Result<T, SensorError>;

/// A sensor-like component served by this module.
///
/// Every call is synchronous; the host serializes nothing on the
/// component's behalf, so implementations must be safe to call from
/// several threads at once.
pub trait Sensor: Send + Sync {
    /// Current identity of the component
    fn name(&self) -> ResourceName;

    /// Take a reading. `extra` carries caller-specific parameters.
    fn readings(&self, extra: &Readings) -> SensorResult<Readings>;

    /// Apply a new configuration in place. `path` locates the component in
    /// the host configuration (e.g. `components.0`) for error messages.
    fn reconfigure(&self, config: &ComponentConfig, path: &str) -> SensorResult<()>;

    /// Model-specific extension point
    fn do_command(&self, _cmd: &Command) -> SensorResult<Command> {
        Err(SensorError::Unimplemented)
    }

    /// Release the component. Calling it more than once is allowed.
    fn close(&self) -> SensorResult<()>;
}
