//! Host-facing component interfaces for sync-at-time
//!
//! This crate defines the sensor capability the host runtime drives and the
//! explicit registry through which the bootstrap wires models in. It
//! contains no model logic itself.

mod mock;
mod registry;
mod traits;

pub use mock::*;
pub use registry::*;
pub use traits::*;
