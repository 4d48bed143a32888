//! Integration tests for sync-at-time
//!
//! These exercise the path the module process takes: config file on disk,
//! explicit registration, construction through the registry and readings.

use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use synctime_config::{component_path, load_config, ComponentConfig, ConfigError};
use synctime_core::{model, register_with_clock, TimeSyncSensor, WindowError};
use synctime_host_api::{Readings, Registry, Sensor, SensorError};
use synctime_util::{FixedClock, ResourceName};

const CONFIG: &str = r#"
    config_version = 1

    [module]
    poll_interval_secs = 30

    [[components]]
    name = "office"
    api = "rdk:component:sensor"
    model = "naomi:sync-at-time:timesyncsensor"

    [components.attributes]
    start = "09:00:00"
    end = "17:00:00"
    zone = "America/New_York"

    [[components]]
    name = "overnight"
    model = "naomi:sync-at-time:timesyncsensor"
    attributes = { start = "01:00:00", end = "05:00:00", zone = "UTC" }
"#;

fn registry_with(clock: Arc<FixedClock>) -> Registry {
    let mut registry = Registry::new();
    register_with_clock(&mut registry, clock).unwrap();
    registry
}

fn write_config(contents: &str, file_name: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(file_name);
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn test_config_file_to_readings() {
    let (_dir, path) = write_config(CONFIG, "config.toml");
    let config = load_config(&path).unwrap();
    assert_eq!(config.module.poll_interval, Duration::from_secs(30));
    assert_eq!(config.components.len(), 2);

    // 14:00 UTC is 09:00 EST: exactly the start, so not yet inside
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap()));
    let registry = registry_with(clock.clone());

    let mut sensors = Vec::new();
    for (index, component) in config.components.iter().enumerate() {
        registry.validate(component, &component_path(index)).unwrap();
        sensors.push(registry.construct(component, &component_path(index)).unwrap());
    }

    let office = &sensors[0];
    assert_eq!(office.name().to_string(), "rdk:component:sensor/office");

    let readings = office.readings(&Readings::new()).unwrap();
    assert_eq!(readings["should_sync"], json!(false));
    assert_eq!(readings["time"], json!("2024-01-15T09:00:00-05:00"));

    clock.set(Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 1).unwrap());
    let readings = office.readings(&Readings::new()).unwrap();
    assert_eq!(readings["should_sync"], json!(true));

    let overnight = sensors[1].readings(&Readings::new()).unwrap();
    assert_eq!(overnight["should_sync"], json!(false));
    assert_eq!(overnight["time"], json!("2024-01-15T14:00:01+00:00"));

    for sensor in &sensors {
        sensor.close().unwrap();
    }
}

#[test]
fn test_json_config_is_accepted() {
    let contents = json!({
        "config_version": 1,
        "components": [{
            "name": "lab",
            "model": "naomi:sync-at-time:timesyncsensor",
            "attributes": { "start": "00:00:00", "end": "23:59:59", "zone": "Asia/Tokyo" }
        }]
    });
    let (_dir, path) = write_config(&contents.to_string(), "config.json");

    let config = load_config(&path).unwrap();
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap()));
    let sensor = registry_with(clock)
        .construct(&config.components[0], &component_path(0))
        .unwrap();

    let readings = sensor.readings(&Readings::new()).unwrap();
    assert_eq!(readings["should_sync"], json!(true));
    assert_eq!(readings["time"], json!("2024-06-01T12:00:00+09:00"));
}

#[test]
fn test_missing_zone_is_reported_with_path() {
    let (_dir, path) = write_config(
        r#"
        config_version = 1

        [[components]]
        name = "office"
        model = "naomi:sync-at-time:timesyncsensor"
        attributes = { start = "09:00:00", end = "17:00:00" }

        [[components]]
        name = "lab"
        model = "naomi:sync-at-time:timesyncsensor"
        attributes = { end = "17:00:00", zone = "UTC" }
        "#,
        "config.toml",
    );
    let config = load_config(&path).unwrap();
    let registry = registry_with(Arc::new(FixedClock::new(Utc::now())));

    let first = registry.validate(&config.components[0], &component_path(0)).unwrap_err();
    assert_eq!(
        first.to_string(),
        r#"Error validating. Path: "components.0" Error: "zone" is required"#
    );

    let second = registry.validate(&config.components[1], &component_path(1)).unwrap_err();
    assert!(second.to_string().contains(r#""start" is required"#));
}

#[test]
fn test_unsupported_version_rejected() {
    let (_dir, path) = write_config("config_version = 7\n", "config.toml");
    assert!(matches!(
        load_config(&path),
        Err(ConfigError::UnsupportedVersion(7))
    ));
}

#[test]
fn test_bad_window_fails_each_reading_but_not_construction() {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
    let sensor = TimeSyncSensor::from_component(
        &ComponentConfig::new(
            "office",
            model(),
            json!({ "start": "09:00:00", "end": "17:00:00", "zone": "Mars/Olympus_Mons" }),
        ),
        &component_path(0),
        clock,
    )
    .unwrap();

    for _ in 0..2 {
        let err = sensor.readings(&Readings::new()).unwrap_err();
        let SensorError::Readings(source) = &err else {
            panic!("expected a readings error, got {err:?}");
        };
        assert!(matches!(
            source.downcast_ref::<WindowError>(),
            Some(WindowError::UnknownTimeZone(zone)) if zone == "Mars/Olympus_Mons"
        ));
    }

    // Fixing the window through reconfigure makes readings succeed again
    let fixed = ComponentConfig::new(
        "office",
        model(),
        json!({ "start": "09:00:00", "end": "17:00:00", "zone": "UTC" }),
    );
    sensor.reconfigure(&fixed, &component_path(0)).unwrap();
    assert_eq!(sensor.readings(&Readings::new()).unwrap()["should_sync"], json!(true));
}

#[test]
fn test_reconfigure_renames_component() {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
    let registry = registry_with(clock);
    let window = json!({ "start": "09:00:00", "end": "17:00:00", "zone": "UTC" });

    let sensor = registry
        .construct(&ComponentConfig::new("office", model(), window.clone()), &component_path(0))
        .unwrap();
    sensor
        .reconfigure(&ComponentConfig::new("office-2", model(), window), &component_path(0))
        .unwrap();

    assert_eq!(
        sensor.name(),
        ResourceName::new(synctime_util::Api::sensor(), "office-2")
    );
}

#[tokio::test]
async fn test_close_wakes_cancel_watchers() {
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()));
    let sensor = Arc::new(
        TimeSyncSensor::from_component(
            &ComponentConfig::new(
                "office",
                model(),
                json!({ "start": "09:00:00", "end": "17:00:00", "zone": "UTC" }),
            ),
            &component_path(0),
            clock,
        )
        .unwrap(),
    );

    let token = sensor.cancel_token();
    let watcher = tokio::spawn(async move {
        token.cancelled().await;
    });

    sensor.close().unwrap();
    tokio::time::timeout(Duration::from_secs(1), watcher)
        .await
        .expect("watcher should observe close")
        .unwrap();

    assert!(sensor.is_closed());
    assert!(matches!(
        sensor.readings(&Readings::new()),
        Err(SensorError::Closed(_))
    ));
    assert!(sensor.close().is_ok());
}
