//! The servo board contract.
//!
//! Everything that moves an arm goes through [`ServoDriver::set_angle`].
//! Backends are picked by name through a registry of [`DriverFactory`]
//! functions.

use crate::hal::config::ArmsConfig;
use thiserror::Error;

/// Servo board failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HalError {
    /// The board could not be brought up.
    #[error("servo board init failed: {0}")]
    InitFailed(String),

    /// Servo set or driver setup rejected.
    #[error("servo driver setup: {0}")]
    ConfigError(String),

    /// A command did not reach the board.
    #[error("servo bus I/O: {0}")]
    CommunicationError(String),

    /// No driver registered under the requested name.
    #[error("no servo driver named {0}")]
    DriverNotFound(String),

    /// Channel not part of the configured arms.
    #[error("servo channel {0} is not configured")]
    UnknownServo(u8),

    /// Command issued before `init()`.
    #[error("servo driver used before init")]
    NotInitialized,
}

/// Builds an uninitialised driver.
pub type DriverFactory = fn() -> Box<dyn ServoDriver>;

/// Counters a driver may expose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverDiagnostics {
    /// Accepted `set_angle` calls.
    pub commands_sent: u64,
    /// Failed `set_angle` calls.
    pub faults: u64,
}

/// Trait defining the interface for servo drivers.
///
/// The control side addresses hardware only through this trait, enabling
/// pluggable backends (simulation, PWM boards, serial controllers).
///
/// # Lifecycle
///
/// 1. `init()` - Called once before any command, and again after a
///    configuration update changes the servo set
/// 2. `set_angle()` - Called for every compiled servo command
/// 3. `shutdown()` - Called when the controller is stopping
///
/// A driver is owned by exactly one thread at a time; it is moved between
/// the orchestrator and its worker, never shared.
pub trait ServoDriver: Send {
    /// Registry name, e.g. `"simulation"`.
    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    /// Initialize the driver for the configured servo channels.
    ///
    /// # Errors
    /// Return `HalError::InitFailed` if the hardware cannot be reached.
    fn init(&mut self, arms: &ArmsConfig) -> Result<(), HalError>;

    /// Drive one servo to an absolute angle in degrees.
    ///
    /// Returns as soon as the command is issued; the caller waits for the
    /// travel time itself.
    ///
    /// # Errors
    /// `HalError::UnknownServo` for unconfigured channels,
    /// `HalError::CommunicationError` for I/O faults.
    fn set_angle(&mut self, servo: u8, angle: f64) -> Result<(), HalError>;

    /// Cut power to every servo so the arms can be moved by hand.
    fn release_all(&mut self) -> Result<(), HalError>;

    /// Last call before the process exits.
    fn shutdown(&mut self) -> Result<(), HalError>;

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        None
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::config::{ArmConfig, ServoCalibration};

    /// Minimal driver relying on the default `diagnostics`.
    struct NullDriver {
        initialized: bool,
    }

    impl ServoDriver for NullDriver {
        fn name(&self) -> &'static str {
            "null"
        }

        fn version(&self) -> &'static str {
            "0.0.1"
        }

        fn init(&mut self, _arms: &ArmsConfig) -> Result<(), HalError> {
            self.initialized = true;
            Ok(())
        }

        fn set_angle(&mut self, _servo: u8, _angle: f64) -> Result<(), HalError> {
            if self.initialized {
                Ok(())
            } else {
                Err(HalError::NotInitialized)
            }
        }

        fn release_all(&mut self) -> Result<(), HalError> {
            Ok(())
        }

        fn shutdown(&mut self) -> Result<(), HalError> {
            self.initialized = false;
            Ok(())
        }
    }

    #[test]
    fn errors_name_the_servo() {
        assert_eq!(
            HalError::UnknownServo(12).to_string(),
            "servo channel 12 is not configured"
        );
        assert!(HalError::CommunicationError("nack".into()).to_string().ends_with("nack"));
    }

    #[test]
    fn commands_need_init() {
        let mut driver = NullDriver { initialized: false };
        assert!(driver.diagnostics().is_none());
        assert_eq!(driver.set_angle(0, 90.0), Err(HalError::NotInitialized));

        let arm = ArmConfig {
            linear_servo: 0,
            rotational_servo: 1,
            linear: ServoCalibration { low: 0.0, high: 90.0 },
            rotational: ServoCalibration { low: 0.0, high: 90.0 },
            initial_linear: None,
            initial_rotational: None,
        };
        let arms = ArmsConfig {
            up: arm.clone(),
            right: arm.clone(),
            down: arm.clone(),
            left: arm,
        };
        driver.init(&arms).unwrap();
        assert_eq!(driver.set_angle(0, 90.0), Ok(()));
        driver.shutdown().unwrap();
        assert_eq!(driver.set_angle(0, 90.0), Err(HalError::NotInitialized));
    }
}
