//! Shared utilities for sync-at-time
//!
//! This crate provides:
//! - Resource identifiers (Api, Model, ResourceName)
//! - Wall-clock access with debug-build mock time
//! - Time-of-day parsing for window boundaries
//! - A cancellation token for component lifecycles
//! - Default paths for the module configuration

mod cancel;
mod ids;
mod paths;
mod time;

pub use cancel::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
