//! Mock sensor for testing host-side code

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use synctime_config::ComponentConfig;
use synctime_util::ResourceName;

use crate::{Readings, Sensor, SensorError, SensorResult};

/// Sensor that returns canned readings and counts calls
#[derive(Debug)]
pub struct MockSensor {
    name: Mutex<ResourceName>,
    readings: Mutex<Readings>,
    closed: AtomicBool,
    read_count: AtomicU64,
    reconfigure_count: AtomicU64,

    /// Configure readings to fail
    pub fail_readings: AtomicBool,
}

impl MockSensor {
    pub fn new(name: ResourceName) -> Self {
        Self {
            name: Mutex::new(name),
            readings: Mutex::new(Readings::new()),
            closed: AtomicBool::new(false),
            read_count: AtomicU64::new(0),
            reconfigure_count: AtomicU64::new(0),
            fail_readings: AtomicBool::new(false),
        }
    }

    /// Set what subsequent readings return
    pub fn set_readings(&self, readings: Readings) {
        *self.readings.lock().unwrap() = readings;
    }

    pub fn read_count(&self) -> u64 {
        self.read_count.load(Ordering::SeqCst)
    }

    pub fn reconfigure_count(&self) -> u64 {
        self.reconfigure_count.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Sensor for MockSensor {
    fn name(&self) -> ResourceName {
        self.name.lock().unwrap().clone()
    }

    fn readings(&self, _extra: &Readings) -> SensorResult<Readings> {
        if self.is_closed() {
            return Err(SensorError::Closed(self.name()));
        }
        self.read_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_readings.load(Ordering::SeqCst) {
            return Err(SensorError::Internal("Mock readings failure".into()));
        }
        Ok(self.readings.lock().unwrap().clone())
    }

    fn reconfigure(&self, config: &ComponentConfig, _path: &str) -> SensorResult<()> {
        if self.is_closed() {
            return Err(SensorError::Closed(self.name()));
        }
        *self.name.lock().unwrap() = config.resource_name();
        self.reconfigure_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> SensorResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
