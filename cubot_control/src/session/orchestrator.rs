//! Session orchestrator.
//!
//! A cooperative poll loop on one thread: each [`Orchestrator::step`]
//! drains the bus without blocking, checks the worker, and fires state
//! machine triggers. Scans and solves run on a single worker thread that
//! takes ownership of the [`Rig`] for its lifetime and hands it back when
//! joined, so only one thread ever drives the servos.
//!
//! The only blocking operation on the orchestrator thread is joining a
//! cancelled worker, which returns after the step in flight.

use super::cancel::CancelToken;
use super::machine::{Effect, Guard, SessionHooks, SessionMachine, SessionState, Trigger, TransitionResult};
use crate::arm::ArmError;
use crate::bus::{ControlEvent, JogEvent, MessageBus, ProgressRecord, percent};
use crate::compiler::MotionCompiler;
use crate::executor::{ExecutionReport, Rig};
use crate::moves::{MoveToken, format_move_list};
use crate::scan::{GRIP_SETTLE, ScanTools, scan_cube};
use cubot_common::config::{ConfigError, RobotConfig};
use cubot_common::hal::driver::{HalError, ServoDriver};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that prevent an orchestrator from starting.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("arm model: {0}")]
    Arm(#[from] ArmError),

    #[error("servo driver: {0}")]
    Hal(#[from] HalError),
}

/// Reflexive action executed synchronously at Rest.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Grip,
    Release,
    CutPower,
    Jog(JogEvent),
}

type ScanOutcome = (Rig, ScanTools, Option<Vec<MoveToken>>);
type SolveOutcome = (Rig, ExecutionReport);

enum Worker {
    Scan(JoinHandle<ScanOutcome>),
    Solve(JoinHandle<SolveOutcome>),
}

/// Everything the transition effects operate on.
struct Session {
    bus: Arc<MessageBus>,
    config: RobotConfig,
    /// Update received while a session was active.
    pending_config: Option<RobotConfig>,
    /// `None` while a worker owns it.
    rig: Option<Rig>,
    /// `None` while the scan worker owns them.
    tools: Option<ScanTools>,
    worker: Option<Worker>,
    cancel: CancelToken,
    solution: Option<Vec<MoveToken>>,
    action: Option<Action>,
}

impl Session {
    fn join_worker(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        match worker {
            Worker::Scan(handle) => match handle.join() {
                Ok((rig, tools, solution)) => {
                    self.rig = Some(rig);
                    self.tools = Some(tools);
                    self.solution = solution;
                }
                Err(_) => error!("Scan worker panicked, arms and camera are unavailable"),
            },
            Worker::Solve(handle) => match handle.join() {
                Ok((rig, report)) => {
                    info!(
                        executed = report.executed,
                        faults = report.faults,
                        cancelled = report.cancelled,
                        "Solve worker finished"
                    );
                    self.rig = Some(rig);
                }
                Err(_) => error!("Solve worker panicked, arms are unavailable"),
            },
        }
    }

    fn start_scan(&mut self) {
        self.bus.progress.publish(ProgressRecord::started());
        self.solution = None;
        self.cancel = CancelToken::new();

        if self.rig.is_none() || self.tools.is_none() {
            error!("Cannot scan: arms or camera unavailable");
            return;
        }
        let (Some(mut rig), Some(mut tools)) = (self.rig.take(), self.tools.take()) else {
            return;
        };

        let bus = Arc::clone(&self.bus);
        let cancel = self.cancel.clone();
        let roi = self.config.camera;
        let spawned = thread::Builder::new()
            .name("cubot-scan".to_string())
            .spawn(move || {
                let result = scan_cube(&mut rig, &mut tools, &roi, GRIP_SETTLE, &cancel, |p| {
                    bus.progress.publish(ProgressRecord::reading(p))
                });
                let solution = match result {
                    Ok(moves) => Some(moves),
                    Err(e) => {
                        warn!("Scan failed: {e}");
                        None
                    }
                };
                (rig, tools, solution)
            });

        match spawned {
            Ok(handle) => self.worker = Some(Worker::Scan(handle)),
            Err(e) => error!("Failed to spawn scan worker: {e}"),
        }
    }

    fn start_solve(&mut self) {
        // Collect a scan that finished since the last poll.
        if matches!(self.worker, Some(Worker::Scan(_))) {
            self.join_worker();
        }
        let Some(moves) = self.solution.take() else {
            warn!("No solution to execute");
            return;
        };
        let Some(mut rig) = self.rig.take() else {
            error!("Cannot solve: arms unavailable");
            return;
        };

        self.bus.progress.publish(ProgressRecord::solving(0));
        self.cancel = CancelToken::new();
        let bus = Arc::clone(&self.bus);
        let cancel = self.cancel.clone();
        let spawned = thread::Builder::new()
            .name("cubot-solve".to_string())
            .spawn(move || {
                rig.compiler.reset();
                let compiled = rig.compiler.solution(&moves);
                info!(moves = %format_move_list(&compiled), "Executing solution");
                let Ok(report) = rig.run::<Infallible>(
                    &cancel,
                    |_| Ok(()),
                    |done, total| bus.progress.publish(ProgressRecord::solving(percent(done, total))),
                );
                (rig, report)
            });

        match spawned {
            Ok(handle) => self.worker = Some(Worker::Solve(handle)),
            Err(e) => error!("Failed to spawn solve worker: {e}"),
        }
    }

    fn finish_solve(&mut self) {
        self.join_worker();
        self.back_to_rest();
    }

    fn stop_session(&mut self) {
        self.cancel.cancel();
        self.join_worker();
        self.solution = None;
        if let Some(rig) = self.rig.as_mut() {
            rig.compiler.reset();
        }
        self.back_to_rest();
    }

    fn back_to_rest(&mut self) {
        self.bus.progress.publish(ProgressRecord::at_rest());
        if let Some(config) = self.pending_config.take() {
            self.apply_config(config);
        }
    }

    fn run_command(&mut self) {
        let Some(action) = self.action.take() else {
            return;
        };
        let Some(rig) = self.rig.as_mut() else {
            error!(?action, "Arms unavailable");
            return;
        };

        match action {
            Action::Grip => {
                rig.compiler.reset();
                rig.compiler.fix();
                run_reflex(rig);
            }
            Action::Release => {
                rig.compiler.reset();
                rig.compiler.release();
                run_reflex(rig);
            }
            Action::CutPower => {
                if let Err(e) = rig.driver.release_all() {
                    error!("Failed to cut servo power: {e}");
                }
            }
            Action::Jog(jog) => {
                if let Err(e) = rig.jog(jog.servo, jog.angle) {
                    warn!(servo = jog.servo, angle = jog.angle, "Jog failed: {e}");
                }
            }
        }
    }

    fn offer_config(&mut self, config: RobotConfig, state: SessionState) {
        if let Err(e) = config.validate() {
            warn!("Rejected configuration update: {e}");
            return;
        }
        if state == SessionState::Rest && self.worker.is_none() {
            self.apply_config(config);
        } else {
            info!(?state, "Session active, configuration update deferred");
            self.pending_config = Some(config);
        }
    }

    fn apply_config(&mut self, config: RobotConfig) {
        if config.driver != self.config.driver {
            warn!(
                current = %self.config.driver,
                requested = %config.driver,
                "Driver changes take effect after restart"
            );
        }
        if let Some(rig) = self.rig.as_mut() {
            rig.compiler.recalibrate(&config.arms, &config.motion);
            if let Err(e) = rig.driver.init(&config.arms) {
                error!("Driver re-initialisation failed: {e}");
            }
            // Physically resync the servos with the new calibration.
            rig.compiler.reset();
            rig.compiler.reposition_arms(Duration::ZERO);
            run_reflex(rig);
        }
        self.config = config;
        info!("Configuration applied");
    }
}

fn run_reflex(rig: &mut Rig) {
    let Ok(report) = rig.run::<Infallible>(&CancelToken::new(), |_| Ok(()), |_, _| {});
    debug!(executed = report.executed, faults = report.faults, "Reflexive sequence done");
}

impl SessionHooks for Session {
    fn check(&self, guard: Guard) -> bool {
        match (guard, &self.worker) {
            (_, None) => true,
            (Guard::ScanFinished, Some(Worker::Scan(handle))) => handle.is_finished(),
            (Guard::SolveFinished, Some(Worker::Solve(handle))) => handle.is_finished(),
            _ => false,
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::StartScan => self.start_scan(),
            Effect::StartSolve => self.start_solve(),
            Effect::FinishSolve => self.finish_solve(),
            Effect::StopSession => self.stop_session(),
            Effect::RunCommand => self.run_command(),
        }
    }
}

/// Drives scan and solve sessions from bus events.
pub struct Orchestrator {
    machine: SessionMachine,
    session: Session,
}

impl Orchestrator {
    /// Build the arm models and initialise the driver.
    ///
    /// # Errors
    /// Invalid configuration, arm start angles off calibration, or a driver
    /// that fails to initialise.
    pub fn new(
        bus: Arc<MessageBus>,
        config: RobotConfig,
        mut driver: Box<dyn ServoDriver>,
        tools: ScanTools,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let compiler = MotionCompiler::new(&config.arms, &config.motion)?;
        driver.init(&config.arms)?;
        info!(
            driver = driver.name(),
            version = driver.version(),
            "Orchestrator ready"
        );

        Ok(Self {
            machine: SessionMachine::new(),
            session: Session {
                bus,
                config,
                pending_config: None,
                rig: Some(Rig::new(compiler, driver)),
                tools: Some(tools),
                worker: None,
                cancel: CancelToken::new(),
                solution: None,
                action: None,
            },
        })
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.machine.state()
    }

    /// Move list found by the last scan, until a solve consumes it.
    pub fn solution(&self) -> Option<&[MoveToken]> {
        self.session.solution.as_deref()
    }

    /// Arm models, while no worker holds them.
    pub fn compiler(&self) -> Option<&MotionCompiler> {
        self.session.rig.as_ref().map(|rig| &rig.compiler)
    }

    /// Configuration currently in effect.
    pub fn config(&self) -> &RobotConfig {
        &self.session.config
    }

    /// Whether a configuration update waits for the session to end.
    pub fn has_pending_config(&self) -> bool {
        self.session.pending_config.is_some()
    }

    /// Fire a trigger directly.
    pub fn fire(&mut self, trigger: Trigger) -> TransitionResult {
        self.machine.fire(trigger, &mut self.session)
    }

    /// One loop iteration. Returns `false` once shutdown was requested.
    pub fn step(&mut self) -> bool {
        for config in self.session.bus.config.drain() {
            self.session.offer_config(config, self.machine.state());
        }

        self.check_worker();

        for event in self.session.bus.control.drain() {
            if !self.handle_control(event) {
                return false;
            }
        }
        for jog in self.session.bus.jog.drain() {
            self.command(Action::Jog(jog));
        }
        true
    }

    /// Poll until `running` clears or shutdown is requested, then stop.
    pub fn run(mut self, running: &AtomicBool) {
        info!(
            poll_ms = self.session.config.session.poll_interval_ms,
            "Orchestrator loop started"
        );
        while running.load(Ordering::SeqCst) && self.step() {
            thread::sleep(self.session.config.session.poll_interval());
        }
        self.shutdown();
    }

    /// Stop any session and shut the driver down.
    pub fn shutdown(&mut self) {
        if self.machine.state() != SessionState::Rest {
            self.fire(Trigger::Stop);
        }
        if let Some(rig) = self.session.rig.as_mut() {
            if let Err(e) = rig.driver.shutdown() {
                error!("Driver shutdown failed: {e}");
            }
        }
        info!("Orchestrator stopped");
    }

    fn check_worker(&mut self) {
        match self.machine.state() {
            SessionState::Reading => {
                let scan_done =
                    matches!(&self.session.worker, Some(Worker::Scan(h)) if h.is_finished());
                if scan_done {
                    self.session.join_worker();
                    if let Some(moves) = self.session.solution.as_deref() {
                        info!(moves = %format_move_list(moves), "Scan complete");
                        self.session.bus.progress.publish(ProgressRecord::reading(100));
                        if self.session.config.session.auto_solve {
                            self.fire(Trigger::Solve);
                            return;
                        }
                    }
                }
                if self.session.worker.is_none() && self.session.solution.is_none() {
                    info!("Scan produced no solution, returning to rest");
                    self.fire(Trigger::Stop);
                }
            }
            SessionState::Solving => {
                if self.session.check(Guard::SolveFinished) {
                    self.fire(Trigger::Success);
                }
            }
            SessionState::Rest => {}
        }
    }

    fn handle_control(&mut self, event: ControlEvent) -> bool {
        debug!(?event, "Control event");
        match event {
            ControlEvent::Read => {
                self.fire(Trigger::Read);
            }
            ControlEvent::Solve => {
                self.fire(Trigger::Solve);
            }
            ControlEvent::Stop => {
                self.fire(Trigger::Stop);
            }
            ControlEvent::Grip => self.command(Action::Grip),
            ControlEvent::Release => self.command(Action::Release),
            ControlEvent::CutPower => self.command(Action::CutPower),
            ControlEvent::Shutdown => return false,
        }
        true
    }

    fn command(&mut self, action: Action) {
        self.session.action = Some(action);
        if let TransitionResult::Rejected(_) = self.fire(Trigger::Command) {
            self.session.action = None;
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
