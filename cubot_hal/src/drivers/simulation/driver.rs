//! Simulation driver implementation.
//!
//! The `SimulationDriver` implements the `ServoDriver` trait by recording
//! every commanded angle. A cloneable [`SimulationProbe`] exposes the
//! recorded state to observers and can inject per-servo I/O faults.

use cubot_common::hal::config::ArmsConfig;
use cubot_common::hal::driver::{DriverDiagnostics, HalError, ServoDriver};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One accepted `set_angle` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServoMove {
    /// Servo channel.
    pub servo: u8,
    /// Commanded angle in degrees.
    pub angle: f64,
}

#[derive(Debug, Default)]
struct SimState {
    angles: HashMap<u8, f64>,
    history: Vec<ServoMove>,
    faulty: HashSet<u8>,
    powered: bool,
    commands_sent: u64,
    faults: u64,
}

/// Shared view into a simulation driver's servo state.
#[derive(Debug, Clone, Default)]
pub struct SimulationProbe {
    state: Arc<Mutex<SimState>>,
}

impl SimulationProbe {
    /// Last angle commanded to `servo`.
    pub fn angle(&self, servo: u8) -> Option<f64> {
        self.state.lock().angles.get(&servo).copied()
    }

    /// Every accepted command, oldest first.
    pub fn history(&self) -> Vec<ServoMove> {
        self.state.lock().history.clone()
    }

    /// Number of accepted commands.
    pub fn command_count(&self) -> usize {
        self.state.lock().history.len()
    }

    /// Whether the servos currently hold position.
    pub fn is_powered(&self) -> bool {
        self.state.lock().powered
    }

    /// Make every following command to `servo` fail with an I/O fault.
    pub fn inject_fault(&self, servo: u8) {
        self.state.lock().faulty.insert(servo);
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        self.state.lock().faulty.clear();
    }
}

/// Simulation driver implementing the `ServoDriver` trait.
pub struct SimulationDriver {
    /// Driver name
    name: &'static str,
    /// Driver version
    version: &'static str,
    /// Initialized flag
    initialized: bool,
    /// Channels configured by the last `init()`
    servos: HashSet<u8>,
    /// Recorded servo state
    probe: SimulationProbe,
}

impl SimulationDriver {
    /// Create a new simulation driver instance.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            initialized: false,
            servos: HashSet::new(),
            probe: SimulationProbe::default(),
        }
    }

    /// A probe observing this driver.
    pub fn probe(&self) -> SimulationProbe {
        self.probe.clone()
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn init(&mut self, arms: &ArmsConfig) -> Result<(), HalError> {
        self.servos = arms.servo_ids().into_iter().collect();
        self.initialized = true;
        info!(
            "Simulation driver initialized with {} servo channels",
            self.servos.len()
        );
        Ok(())
    }

    fn set_angle(&mut self, servo: u8, angle: f64) -> Result<(), HalError> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        if !self.servos.contains(&servo) {
            return Err(HalError::UnknownServo(servo));
        }

        let mut state = self.probe.state.lock();
        if state.faulty.contains(&servo) {
            state.faults += 1;
            return Err(HalError::CommunicationError(format!(
                "simulated bus fault on servo {servo}"
            )));
        }

        debug!(servo, angle, "Simulated servo move");
        state.angles.insert(servo, angle);
        state.history.push(ServoMove { servo, angle });
        state.powered = true;
        state.commands_sent += 1;
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), HalError> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        self.probe.state.lock().powered = false;
        info!("Simulated servos released");
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        info!("Shutting down simulation driver");
        if !self.initialized {
            warn!("Simulation driver shut down before init");
        }
        self.probe.state.lock().powered = false;
        self.initialized = false;
        Ok(())
    }

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        let state = self.probe.state.lock();
        Some(DriverDiagnostics {
            commands_sent: state.commands_sent,
            faults: state.faults,
        })
    }
}
