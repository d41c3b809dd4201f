//! Robot configuration (`cubot.toml`).
//!
//! Every section is plain serde data plus a `validate()` pass. Loading goes
//! through [`ConfigLoader`], implemented for every deserialisable type.
//!
//! ```rust,no_run
//! use cubot_common::config::{ConfigError, RobotConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = RobotConfig::load_validated(Path::new("config/cubot.toml"))?;
//!     println!("{} drives {}", config.shared.service_name, config.driver);
//!     Ok(())
//! }
//! ```

use crate::consts::{DEFAULT_DRIVER, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SOLVER_PROGRAM};
use crate::hal::config::{ArmsConfig, MotionConfig};
use crate::vision::RoiConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Why a configuration could not be used.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("configuration file not found")]
    FileNotFound,

    /// Unreadable file or malformed TOML.
    #[error("cannot parse configuration: {0}")]
    ParseError(String),

    /// Well-formed but unusable values.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Default log filter, written in lowercase in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Every servo command and capture.
    Trace,
    /// Compiled routines and bus events.
    Debug,
    /// Session transitions and configuration changes.
    #[default]
    Info,
    /// Rejected triggers, failed scans.
    Warn,
    /// Servo faults.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "cubot-bench-01"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Robot name shown in logs.
    pub service_name: String,
}

impl SharedConfig {
    /// The robot needs a non-blank name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "shared.service_name must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

/// Session orchestration settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sleep between orchestrator loop iterations, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Start solving as soon as a scan produced a solution.
    #[serde(default)]
    pub auto_solve: bool,
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            auto_solve: false,
        }
    }
}

fn default_solver_program() -> String {
    DEFAULT_SOLVER_PROGRAM.to_string()
}

/// External solver invocation.
///
/// The cube state string is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Executable to run.
    #[serde(default = "default_solver_program")]
    pub program: String,

    /// Arguments placed before the state string.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            program: default_solver_program(),
            args: Vec::new(),
        }
    }
}

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

/// Complete robot configuration loaded from `cubot.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Service identity and log level.
    pub shared: SharedConfig,

    /// Servo driver to load.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Servo timing.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Calibration of the four arms.
    pub arms: ArmsConfig,

    /// Facelet regions of interest.
    pub camera: RoiConfig,

    /// Orchestrator settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// External solver.
    #[serde(default)]
    pub solver: SolverConfig,
}

impl RobotConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        if self.driver.is_empty() {
            return Err(ConfigError::ValidationError(
                "driver cannot be empty".to_string(),
            ));
        }
        self.motion.validate()?;
        self.arms.validate()?;
        self.camera.validate()?;
        if self.session.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "session.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.solver.program.is_empty() {
            return Err(ConfigError::ValidationError(
                "solver.program cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file and validate it.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Reads a TOML file into any deserialisable section.
///
/// A missing file is `FileNotFound`; anything else that goes wrong before
/// validation is `ParseError`. Validation is left to the caller.
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::FileNotFound);
            }
            Err(e) => return Err(ConfigError::ParseError(format!("{}: {e}", path.display()))),
        };
        toml::from_str(&text).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

// ─── Tests ──────────────────────────────────────────────────────────
