//! Servo driver selection by name.
//!
//! The controller builds one [`DriverRegistry`] at startup and asks it for
//! the driver named in `cubot.toml` (or on the command line).

use cubot_common::hal::driver::{DriverFactory, HalError, ServoDriver};
use std::collections::BTreeMap;
use tracing::info;

/// Named servo driver factories, kept in name order.
#[derive(Default)]
pub struct DriverRegistry {
    factories: BTreeMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Registry without any driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every driver shipped with this crate.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::drivers::register_all_drivers(&mut registry);
        registry
    }

    /// Add a factory under `name`. A second factory for the same name is
    /// refused and the first one stays registered.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) -> Result<(), HalError> {
        if self.factories.contains_key(name) {
            return Err(HalError::ConfigError(format!(
                "servo driver '{name}' registered twice"
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Factory registered under `name`.
    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Instantiate the driver called `name`. The driver still needs `init`.
    ///
    /// # Errors
    /// `HalError::DriverNotFound` naming the available drivers.
    pub fn create_driver(&self, name: &str) -> Result<Box<dyn ServoDriver>, HalError> {
        let Some(factory) = self.get_factory(name) else {
            return Err(HalError::DriverNotFound(format!(
                "{name} (available: {})",
                self.list_drivers().join(", ")
            )));
        };
        let driver = factory();
        info!(driver = driver.name(), version = driver.version(), "Servo driver created");
        Ok(driver)
    }

    /// Registered names in alphabetical order.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
