//! Simulation driver module.
//!
//! Software stand-ins for the servo board and the camera, for development
//! and testing without physical hardware.

mod camera;
mod driver;

pub use camera::SimulatedCamera;
pub use driver::{ServoMove, SimulationDriver, SimulationProbe};

use cubot_common::hal::driver::ServoDriver;

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn ServoDriver> {
    Box::new(SimulationDriver::new())
}
