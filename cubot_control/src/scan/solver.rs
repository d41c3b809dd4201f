//! Cube solver seam.
//!
//! The solving algorithm lives outside this crate. [`ProcessSolver`] runs an
//! external program, e.g. the `kociemba` command line tool:
//!
//! ```text
//! $ kociemba DRLUUBFBRBLURRLRUBLRDDFDLFUFUFFDBRDUBRUFLLFDDBFLUBLRBD
//! D2 R' D' F2 B D R2 D2 R' F2 D' F2 U' B2 L2 U2 D R2 U
//! ```

use crate::moves::{MoveParseError, MoveToken, parse_move_list};
use cubot_common::config::SolverConfig;
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Solver failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("failed to run solver '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("solver exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("solver rejected the cube state: {0}")]
    Rejected(String),

    #[error("unparsable solver output: {0}")]
    Output(#[from] MoveParseError),
}

/// Turns a 54-facelet state string (faces U, R, F, D, L, B) into moves.
pub trait CubeSolver: Send {
    fn solve(&self, state: &str) -> Result<Vec<MoveToken>, SolverError>;
}

impl<F> CubeSolver for F
where
    F: Fn(&str) -> Result<Vec<MoveToken>, SolverError> + Send,
{
    fn solve(&self, state: &str) -> Result<Vec<MoveToken>, SolverError> {
        self(state)
    }
}

/// Runs an external solver with the state string as last argument and
/// parses its standard output as a move list.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    program: String,
    args: Vec<String>,
}

impl ProcessSolver {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

impl CubeSolver for ProcessSolver {
    fn solve(&self, state: &str) -> Result<Vec<MoveToken>, SolverError> {
        debug!(program = %self.program, state, "Running solver");
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(state)
            .output()
            .map_err(|e| SolverError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SolverError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        if text.contains("Error") {
            return Err(SolverError::Rejected(text.to_string()));
        }
        Ok(parse_move_list(text)?)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
