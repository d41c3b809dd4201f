//! Servo driver implementations.
//!
//! - [`simulation`] - Software simulation driver and camera for development and testing
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `ServoDriver` trait from `cubot_common::hal::driver`
//! 3. Register the driver in [`register_all_drivers`]

pub mod simulation;

use crate::driver_registry::DriverRegistry;
use cubot_common::hal::driver::DriverFactory;
use tracing::warn;

const BUILTIN: [(&str, DriverFactory); 1] = [("simulation", simulation::create_driver)];

/// Register all built-in drivers. Names already taken keep their factory.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    for (name, factory) in BUILTIN {
        if let Err(e) = registry.register(name, factory) {
            warn!("Skipping built-in driver: {e}");
        }
    }
}
