//! System-wide constants for the cubot workspace.
//!
//! Single source of truth for numeric limits and default paths.

/// Number of arms gripping the cube.
pub const ARM_COUNT: usize = 4;

/// Servos per arm (one linear, one rotational).
pub const SERVOS_PER_ARM: usize = 2;

/// Number of servo channels addressable by a driver board.
pub const MAX_SERVOS: u8 = 16;

/// Faces on a cube.
pub const FACE_COUNT: usize = 6;

/// Facelets on one face.
pub const FACELETS_PER_FACE: usize = 9;

/// Facelets on the whole cube (length of a solver state string).
pub const FACELET_COUNT: usize = FACE_COUNT * FACELETS_PER_FACE;

/// Default orchestrator poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Default driver name.
pub const DEFAULT_DRIVER: &str = "simulation";

/// Default solver executable.
pub const DEFAULT_SOLVER_PROGRAM: &str = "kociemba";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/cubot.toml";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facelet_count_matches_state_string() {
        assert_eq!(FACELET_COUNT, 54);
    }

    #[test]
    fn servo_budget_fits_board() {
        assert!(ARM_COUNT * SERVOS_PER_ARM <= MAX_SERVOS as usize);
    }
}
