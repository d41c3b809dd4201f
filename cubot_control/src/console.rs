//! Line-oriented operator console.
//!
//! Each line on standard input is one command:
//!
//! ```text
//! read | solve | stop | grip | release | cutpower
//! jog <servo> <angle>
//! reload
//! help
//! quit
//! ```
//!
//! The controller keeps running when standard input reaches end of file,
//! so it can run detached; it then stops on Ctrl-C only.

use crate::bus::{ControlEvent, JogEvent};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

pub const HELP: &str = "\
commands:
  read              grip the cube and scan it
  solve             execute the solution of the last scan
  stop              abort the running session
  grip | release    close or open the arms (at rest)
  cutpower          cut power to every servo (at rest)
  jog <servo> <deg> move one servo to an absolute angle (at rest)
  reload            re-read the configuration file
  quit              stop and exit";

/// Parsed console line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Control(ControlEvent),
    Jog(JogEvent),
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("usage: jog <servo> <angle>")]
    JogUsage,

    #[error("invalid servo '{0}'")]
    InvalidServo(String),

    #[error("invalid angle '{0}'")]
    InvalidAngle(String),
}

impl FromStr for ConsoleCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(ConsoleError::Empty);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "read" => Self::Control(ControlEvent::Read),
            "solve" => Self::Control(ControlEvent::Solve),
            "stop" => Self::Control(ControlEvent::Stop),
            "grip" => Self::Control(ControlEvent::Grip),
            "release" => Self::Control(ControlEvent::Release),
            "cutpower" => Self::Control(ControlEvent::CutPower),
            "reload" => Self::Reload,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "jog" => {
                let (Some(servo), Some(angle)) = (words.next(), words.next()) else {
                    return Err(ConsoleError::JogUsage);
                };
                let servo = servo
                    .parse()
                    .map_err(|_| ConsoleError::InvalidServo(servo.to_string()))?;
                let angle: f64 = angle
                    .parse()
                    .ok()
                    .filter(|a: &f64| a.is_finite())
                    .ok_or_else(|| ConsoleError::InvalidAngle(angle.to_string()))?;
                Self::Jog(JogEvent { servo, angle })
            }
            other => return Err(ConsoleError::Unknown(other.to_string())),
        };

        if words.next().is_some() {
            return Err(match command {
                Self::Jog(_) => ConsoleError::JogUsage,
                _ => ConsoleError::Unknown(line.trim().to_string()),
            });
        }
        Ok(command)
    }
}

/// Lines forwarded from standard input by a reader thread.
pub struct ConsoleLines {
    rx: Option<Receiver<String>>,
}

impl ConsoleLines {
    pub fn new(rx: Receiver<String>) -> Self {
        Self { rx: Some(rx) }
    }

    /// Whether input can still arrive.
    pub fn is_open(&self) -> bool {
        self.rx.is_some()
    }

    /// Next line, waiting at most `timeout`. Once input has ended this only
    /// waits out the timeout.
    pub fn next_line(&mut self, timeout: Duration) -> Option<String> {
        let Some(rx) = &self.rx else {
            thread::sleep(timeout);
            return None;
        };
        match rx.recv_timeout(timeout) {
            Ok(line) => Some(line),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                info!("Console input closed, running until interrupted");
                self.rx = None;
                None
            }
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
