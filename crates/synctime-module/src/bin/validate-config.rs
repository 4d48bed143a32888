//! Config validation CLI tool
//!
//! Validates a sync-at-time configuration file against the registered
//! models and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;
use synctime_config::{component_path, ConfigError, CURRENT_CONFIG_VERSION};
use synctime_core::SyncWindow;
use synctime_host_api::Registry;
use synctime_util::default_config_path;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a sync-at-time configuration file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    let mut registry = Registry::new();
    if let Err(e) = synctime_core::register(&mut registry) {
        eprintln!("Error: {}", e);
        return ExitCode::from(1);
    }

    let config = match synctime_config::load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::JsonError(parse_err) => {
                    eprintln!("JSON parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            return ExitCode::from(1);
        }
    };

    let mut failures = Vec::new();
    for (index, component) in config.components.iter().enumerate() {
        if let Err(e) = registry.validate(component, &component_path(index)) {
            failures.push(e.to_string());
        }
    }

    if !failures.is_empty() {
        eprintln!("✗ Configuration validation failed");
        eprintln!();
        eprintln!("Component errors ({}):", failures.len());
        for failure in &failures {
            eprintln!("  - {}", failure);
        }
        return ExitCode::from(1);
    }

    println!("✓ Configuration is valid");
    println!();
    println!("Summary:");
    println!("  Config version: {}", CURRENT_CONFIG_VERSION);
    println!("  Poll interval: {}s", config.module.poll_interval.as_secs());
    println!("  Components: {}", config.components.len());

    let mut models: Vec<String> = registry
        .models()
        .map(|(api, model)| format!("{} ({})", model, api))
        .collect();
    models.sort();
    println!();
    println!("Registered models:");
    for model in &models {
        println!("  - {}", model);
    }

    if !config.components.is_empty() {
        println!();
        println!("Components:");
        for (index, component) in config.components.iter().enumerate() {
            println!("  - {} [{}]", component.name, component.model);

            // Format problems only surface when a reading is taken; flag them here too.
            let Ok(window) =
                synctime_config::WindowConfig::from_attributes(&component.attributes, &component_path(index))
            else {
                continue;
            };
            match SyncWindow::parse(&window) {
                Ok(parsed) if parsed.is_degenerate() => println!(
                    "      warning: end {} is not after start {}; this window never opens",
                    parsed.end, parsed.start
                ),
                Ok(parsed) => println!(
                    "      window: {} - {} ({})",
                    parsed.start, parsed.end, window.zone
                ),
                Err(e) => println!("      warning: {}", e),
            }
        }
    }

    ExitCode::SUCCESS
}
