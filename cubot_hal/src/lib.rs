//! # Cubot HAL Library
//!
//! Servo drivers behind a pluggable driver architecture.
//!
//! Drivers implement the `ServoDriver` trait defined in
//! `cubot_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations (simulation servos and camera)
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     cubot_hal                             │
//! │  ┌──────────────────┐        ┌─────────────────────────┐  │
//! │  │  DriverRegistry  │──────► │  ServoDriver            │  │
//! │  │  (name → factory)│        │  (trait object)         │  │
//! │  └──────────────────┘        └─────────────────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod driver_registry;
pub mod drivers;

// Re-export key types for convenience
pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::simulation::{SimulatedCamera, SimulationDriver, SimulationProbe};
