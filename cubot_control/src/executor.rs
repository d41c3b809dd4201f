//! Plays a compiled sequence against a servo driver.
//!
//! Runs synchronously on the calling thread: each command is issued and the
//! executor then sleeps for the command's duration before the next step.

use crate::arm::Axis;
use crate::compiler::{Marker, MotionCompiler, Step};
use crate::session::CancelToken;
use cubot_common::hal::config::ArmSide;
use cubot_common::hal::driver::{HalError, ServoDriver};
use std::collections::BTreeMap;
use std::thread;
use tracing::{debug, error, info, warn};

/// Outcome of one [`execute`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Servo commands the driver accepted.
    pub executed: usize,
    /// Servo commands the driver rejected.
    pub faults: usize,
    /// Stopped early because the token was cancelled.
    pub cancelled: bool,
}

/// The arm models together with the driver that moves the real arms.
///
/// Only one thread holds the rig at a time, which keeps the models and the
/// hardware in step without a lock.
pub struct Rig {
    pub compiler: MotionCompiler,
    pub driver: Box<dyn ServoDriver>,
    /// Last angle sent to each servo.
    sent: BTreeMap<u8, f64>,
}

impl Rig {
    /// Take the compiler's current poses as the angles the servos hold.
    pub fn new(compiler: MotionCompiler, driver: Box<dyn ServoDriver>) -> Self {
        let mut sent = BTreeMap::new();
        for side in ArmSide::GRIP_ORDER {
            let arm = compiler.arm(side);
            sent.insert(arm.linear_servo(), arm.angle(Axis::Linear));
            sent.insert(arm.rotational_servo(), arm.angle(Axis::Rotational));
        }
        Self {
            compiler,
            driver,
            sent,
        }
    }

    /// Angle last sent to `servo`.
    pub fn sent_angle(&self, servo: u8) -> Option<f64> {
        self.sent.get(&servo).copied()
    }

    /// Execute everything compiled so far and clear the sequence.
    ///
    /// The compiler has already moved its arm models to the end of the
    /// sequence. When execution stops early the models are moved back to
    /// the angles actually sent.
    pub fn run<E>(
        &mut self,
        cancel: &CancelToken,
        on_marker: impl FnMut(Marker) -> Result<(), E>,
        mut on_step: impl FnMut(usize, usize),
    ) -> Result<ExecutionReport, E> {
        let steps = self.compiler.take_sequence();
        let sent = &mut self.sent;
        let mut done = 0;
        let result = execute(self.driver.as_mut(), &steps, cancel, on_marker, |n, total| {
            if let Some(cmd) = steps[n - 1].as_command() {
                sent.insert(cmd.servo_id, cmd.position);
            }
            done = n;
            on_step(n, total);
        });
        if done < steps.len() {
            warn!(done, total = steps.len(), "Sequence stopped early, resyncing arm models");
            self.compiler.resync(|servo| self.sent.get(&servo).copied());
        }
        result
    }

    /// Send `servo` straight to `angle`, outside any compiled sequence.
    pub fn jog(&mut self, servo: u8, angle: f64) -> Result<(), HalError> {
        self.driver.set_angle(servo, angle)?;
        self.sent.insert(servo, angle);
        self.compiler.resync(|id| (id == servo).then_some(angle));
        Ok(())
    }
}

/// Execute `steps` in order.
///
/// The cancellation token is checked before every step. A driver fault is
/// logged and execution moves on to the next step. Markers are handed to
/// `on_marker`; an error from it aborts execution. `on_step` is called with
/// `(done, total)` after every step.
pub fn execute<E>(
    driver: &mut dyn ServoDriver,
    steps: &[Step],
    cancel: &CancelToken,
    mut on_marker: impl FnMut(Marker) -> Result<(), E>,
    mut on_step: impl FnMut(usize, usize),
) -> Result<ExecutionReport, E> {
    let mut report = ExecutionReport::default();
    let total = steps.len();

    for (i, step) in steps.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(done = i, total, "Execution cancelled");
            report.cancelled = true;
            break;
        }

        match step {
            Step::Servo(cmd) => {
                debug!(
                    servo = cmd.servo_id,
                    angle = cmd.position,
                    wait_ms = cmd.duration.as_millis() as u64,
                    "Servo command"
                );
                match driver.set_angle(cmd.servo_id, cmd.position) {
                    Ok(()) => report.executed += 1,
                    Err(e) => {
                        error!(servo = cmd.servo_id, step = i, "Servo command failed: {e}");
                        report.faults += 1;
                    }
                }
                if !cmd.duration.is_zero() {
                    thread::sleep(cmd.duration);
                }
            }
            Step::Marker(marker) => on_marker(*marker)?,
        }

        on_step(i + 1, total);
    }

    Ok(report)
}

// ─── Tests ──────────────────────────────────────────────────────────
