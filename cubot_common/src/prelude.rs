//! Prelude module for common re-exports.
//!
//! ```rust
//! use cubot_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, RobotConfig, SharedConfig};
pub use crate::hal::config::{ArmConfig, ArmSide, ArmsConfig, MotionConfig, ServoCalibration};

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hal::driver::{HalError, ServoDriver};
pub use crate::vision::{Camera, CameraError, Frame, Rgb, Roi, RoiConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_CONFIG_PATH, FACELET_COUNT, MAX_SERVOS};
