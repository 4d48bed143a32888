//! Time-window sync sensor
//!
//! Reports `should_sync = true` while the current time lies inside a daily
//! window, so a host's data manager can gate uploads on it.

use std::sync::{Arc, RwLock};
use synctime_config::{ComponentConfig, WindowConfig};
use synctime_host_api::{Readings, Sensor, SensorError, SensorResult};
use synctime_util::{CancelToken, Clock, Model, ResourceName};
use tracing::{debug, error, info, info_span, warn};

use crate::{Evaluation, SyncWindow, WindowError};

/// Model triple this sensor is registered under
pub fn model() -> Model {
    Model::new("naomi", "sync-at-time", "timesyncsensor")
}

/// Everything reconfiguration replaces, swapped as one value
#[derive(Debug, Clone)]
struct WindowState {
    name: ResourceName,
    window: WindowConfig,
}

/// Sensor whose reading says whether "now" is inside the configured window.
///
/// The window is parsed on every reading, so a malformed window is accepted
/// by construction and reconfiguration and reported by the next reading.
/// Closing cancels the sensor's [`CancelToken`]; the sensor runs no tasks of
/// its own. Readings and reconfiguration after close fail with
/// [`SensorError::Closed`]. `do_command` is not supported.
pub struct TimeSyncSensor {
    state: RwLock<WindowState>,
    clock: Arc<dyn Clock>,
    cancel: CancelToken,
    span: tracing::Span,
}

impl TimeSyncSensor {
    /// Validate `window` and build an active sensor.
    ///
    /// `path` locates the component in the host configuration and prefixes
    /// validation errors.
    pub fn new(
        name: ResourceName,
        window: WindowConfig,
        path: &str,
        clock: Arc<dyn Clock>,
    ) -> SensorResult<Self> {
        window.validate(path)?;

        let span = info_span!("timesyncsensor", name = %name.name);
        let sensor = Self {
            state: RwLock::new(WindowState { name, window }),
            clock,
            cancel: CancelToken::new(),
            span,
        };
        sensor.log_window();
        Ok(sensor)
    }

    /// Build from a host component configuration
    pub fn from_component(
        config: &ComponentConfig,
        path: &str,
        clock: Arc<dyn Clock>,
    ) -> SensorResult<Self> {
        let window = WindowConfig::from_attributes(&config.attributes, path)?;
        Self::new(config.resource_name(), window, path, clock)
    }

    /// Snapshot of the current window configuration
    pub fn window(&self) -> WindowConfig {
        self.snapshot().window
    }

    /// Token cancelled when the sensor closes
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Evaluate the window against the sensor's clock
    pub fn evaluate(&self) -> SensorResult<Evaluation> {
        self.evaluate_at(self.clock.now())
    }

    /// Evaluate the window against a given instant
    pub fn evaluate_at(&self, now: chrono::DateTime<chrono::Utc>) -> SensorResult<Evaluation> {
        let state = self.snapshot();
        if self.is_closed() {
            return Err(SensorError::Closed(state.name));
        }

        let _enter = self.span.enter();
        let evaluation = SyncWindow::parse(&state.window)
            .map(|window| window.evaluate(now))
            .map_err(|e| {
                match &e {
                    WindowError::InvalidTime { boundary, value, .. } => {
                        error!(%boundary, %value, "{} time is not in the format HH:MM:SS.", boundary)
                    }
                    WindowError::UnknownTimeZone(zone) => {
                        error!(%zone, "Time zone cannot be loaded")
                    }
                }
                SensorError::readings(e)
            })?;

        if evaluation.should_sync {
            debug!(time = %evaluation.observed_time, "Syncing");
        } else {
            debug!(
                time = %evaluation.observed_time,
                "Not syncing. Current time not in sync window"
            );
        }

        Ok(evaluation)
    }

    fn snapshot(&self) -> WindowState {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Log the configured window, warning about windows that cannot work
    fn log_window(&self) {
        let state = self.snapshot();
        let _enter = self.span.enter();

        info!(
            start = %state.window.start,
            end = %state.window.end,
            zone = %state.window.zone,
            "Sync window configured"
        );

        match SyncWindow::parse(&state.window) {
            Ok(window) if window.is_degenerate() => warn!(
                start = %window.start,
                end = %window.end,
                "Window end is not after its start; it will never report should_sync"
            ),
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Window will fail to evaluate until reconfigured"),
        }
    }
}

/// Build the readings map reported to the host
pub fn readings_from(evaluation: &Evaluation) -> Readings {
    let mut readings = Readings::new();
    readings.insert("should_sync".into(), evaluation.should_sync.into());
    readings.insert("time".into(), evaluation.observed_time.to_rfc3339().into());
    readings
}

impl Sensor for TimeSyncSensor {
    fn name(&self) -> ResourceName {
        self.snapshot().name
    }

    fn readings(&self, _extra: &Readings) -> SensorResult<Readings> {
        self.evaluate().map(|evaluation| readings_from(&evaluation))
    }

    fn reconfigure(&self, config: &ComponentConfig, path: &str) -> SensorResult<()> {
        if self.is_closed() {
            return Err(SensorError::Closed(self.name()));
        }

        let window = WindowConfig::from_attributes(&config.attributes, path)?;
        if let Err(e) = window.validate(path) {
            let _enter = self.span.enter();
            warn!(error = %e, "Error reconfiguring module");
            return Err(e.into());
        }

        let name = config.resource_name();
        self.span.record("name", name.name.as_str());
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = WindowState { name, window };

        self.log_window();
        Ok(())
    }

    fn close(&self) -> SensorResult<()> {
        if self.cancel.cancel() {
            let _enter = self.span.enter();
            info!("Sync window sensor closed");
        }
        Ok(())
    }
}
