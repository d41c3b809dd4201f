//! Message bus between the session orchestrator and its surroundings.
//!
//! The bus is created once at startup and shared as `Arc<MessageBus>`. Each
//! named channel is an unbounded multi-producer, multi-consumer queue:
//!
//! | channel    | direction            | payload             |
//! |------------|----------------------|---------------------|
//! | `control`  | frontend → session   | [`ControlEvent`]    |
//! | `jog`      | frontend → session   | [`JogEvent`]        |
//! | `config`   | frontend → session   | `RobotConfig`       |
//! | `progress` | session → frontend   | [`ProgressRecord`]  |
//!
//! Every message is an owned snapshot; nothing behind the bus is shared
//! mutably.

use crossbeam_channel::{Receiver, Sender, unbounded};
use cubot_common::config::RobotConfig;
use serde::Serialize;
use std::fmt;

/// Commands from a frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Grip the cube and scan it.
    Read,
    /// Execute the solution found by the last scan.
    Solve,
    /// Abort the active session.
    Stop,
    /// Close the arms on the cube.
    Grip,
    /// Open the arms.
    Release,
    /// Cut power to every servo.
    CutPower,
    /// Stop the session and leave the orchestrator loop.
    Shutdown,
}

/// Drive one servo directly, for calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JogEvent {
    pub servo: u8,
    /// Absolute angle in degrees.
    pub angle: f64,
}

/// Session progress snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressRecord {
    /// `true` while no session is running and new sessions may start.
    pub locked: bool,
    /// Scan progress, 0..=100.
    pub read_progress: u8,
    /// Solve progress, 0..=100.
    pub solve_progress: u8,
}

impl ProgressRecord {
    /// A session just started.
    pub const fn started() -> Self {
        Self {
            locked: false,
            read_progress: 0,
            solve_progress: 0,
        }
    }

    /// Back at rest, progress cleared.
    pub const fn at_rest() -> Self {
        Self {
            locked: true,
            read_progress: 0,
            solve_progress: 0,
        }
    }

    pub const fn reading(read_progress: u8) -> Self {
        Self {
            locked: false,
            read_progress,
            solve_progress: 0,
        }
    }

    pub const fn solving(solve_progress: u8) -> Self {
        Self {
            locked: false,
            read_progress: 100,
            solve_progress,
        }
    }
}

/// Integer percentage of `done` out of `total`, 100 for an empty job.
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (done.min(total) * 100 / total) as u8
}

/// One named queue.
pub struct Channel<T> {
    name: &'static str,
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> Channel<T> {
    fn new(name: &'static str) -> Self {
        let (tx, rx) = unbounded();
        Self { name, tx, rx }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Queue a message. Never blocks.
    pub fn publish(&self, message: T) {
        // The channel owns a receiver, so it cannot be disconnected.
        let _ = self.tx.send(message);
    }

    /// Sender handle for producers on other threads.
    pub fn sender(&self) -> Sender<T> {
        self.tx.clone()
    }

    /// Receiver handle for consumers on other threads.
    ///
    /// Messages are delivered to exactly one receiver.
    pub fn subscribe(&self) -> Receiver<T> {
        self.rx.clone()
    }

    /// Next queued message, without blocking.
    pub fn try_next(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Every message queued right now, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("queued", &self.rx.len())
            .finish()
    }
}

/// The process-wide set of channels.
#[derive(Debug)]
pub struct MessageBus {
    pub control: Channel<ControlEvent>,
    pub jog: Channel<JogEvent>,
    pub config: Channel<RobotConfig>,
    pub progress: Channel<ProgressRecord>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            control: Channel::new("control"),
            jog: Channel::new("jog"),
            config: Channel::new("config"),
            progress: Channel::new("progress"),
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
