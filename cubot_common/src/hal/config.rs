//! HAL configuration types.
//!
//! This module contains the calibration types for the four gripper arms:
//! - `ServoCalibration` - The two calibrated extremes of one servo
//! - `ArmConfig` - Servo channels and calibration of one arm
//! - `ArmsConfig` - The four arms, keyed by their physical side
//! - `MotionConfig` - Servo speed and inter-command pause

use crate::config::ConfigError;
use crate::consts::{ARM_COUNT, MAX_SERVOS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Physical side of the cube an arm is mounted on.
///
/// Up, down, left and right hold the U, D, L and R faces; the front and
/// back faces have no dedicated arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmSide {
    /// Arm holding the top face.
    Up,
    /// Arm holding the bottom face.
    Down,
    /// Arm holding the left face.
    Left,
    /// Arm holding the right face.
    Right,
}

impl ArmSide {
    /// All sides, in the order grip/release routines address them.
    pub const GRIP_ORDER: [ArmSide; ARM_COUNT] =
        [ArmSide::Up, ArmSide::Right, ArmSide::Down, ArmSide::Left];

    /// Lowercase name used in config tables and log fields.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ArmSide::Up => "up",
            ArmSide::Down => "down",
            ArmSide::Left => "left",
            ArmSide::Right => "right",
        }
    }
}

impl fmt::Display for ArmSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two calibrated extremes of a servo, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServoCalibration {
    /// Angle of the retracted / home extreme.
    pub low: f64,
    /// Angle of the engaged / turned extreme.
    pub high: f64,
}

impl ServoCalibration {
    /// Distance travelled between the two extremes.
    #[inline]
    pub fn travel(&self) -> f64 {
        (self.high - self.low).abs()
    }

    fn validate(&self, what: &str) -> Result<(), ConfigError> {
        if !self.low.is_finite() || !self.high.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "{what}: calibration angles must be finite"
            )));
        }
        if self.low == self.high {
            return Err(ConfigError::ValidationError(format!(
                "{what}: low and high calibration are both {}",
                self.low
            )));
        }
        Ok(())
    }
}

/// Configuration of one arm: servo channels and calibration.
///
/// # TOML Example
///
/// ```toml
/// [arms.up]
/// linear_servo = 0
/// rotational_servo = 1
/// linear = { low = 20.0, high = 110.0 }
/// rotational = { low = 10.0, high = 100.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    /// Channel of the servo sliding the gripper towards the cube.
    pub linear_servo: u8,
    /// Channel of the servo turning the gripper.
    pub rotational_servo: u8,
    /// Linear servo calibration.
    pub linear: ServoCalibration,
    /// Rotational servo calibration.
    pub rotational: ServoCalibration,
    /// Believed linear angle at power-up. Defaults to `linear.low`.
    #[serde(default)]
    pub initial_linear: Option<f64>,
    /// Believed rotational angle at power-up. Defaults to `rotational.low`.
    #[serde(default)]
    pub initial_rotational: Option<f64>,
}

impl ArmConfig {
    /// Linear angle the arm model starts from.
    pub fn start_linear(&self) -> f64 {
        self.initial_linear.unwrap_or(self.linear.low)
    }

    /// Rotational angle the arm model starts from.
    pub fn start_rotational(&self) -> f64 {
        self.initial_rotational.unwrap_or(self.rotational.low)
    }

    /// Both servo channels of this arm.
    pub fn servos(&self) -> [u8; 2] {
        [self.linear_servo, self.rotational_servo]
    }
}

/// The four arms of the robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmsConfig {
    /// Arm on the top face.
    pub up: ArmConfig,
    /// Arm on the bottom face.
    pub down: ArmConfig,
    /// Arm on the left face.
    pub left: ArmConfig,
    /// Arm on the right face.
    pub right: ArmConfig,
}

impl ArmsConfig {
    /// Configuration of the arm on the given side.
    pub fn arm(&self, side: ArmSide) -> &ArmConfig {
        match side {
            ArmSide::Up => &self.up,
            ArmSide::Down => &self.down,
            ArmSide::Left => &self.left,
            ArmSide::Right => &self.right,
        }
    }

    /// Iterate over `(side, config)` pairs in grip order.
    pub fn iter(&self) -> impl Iterator<Item = (ArmSide, &ArmConfig)> {
        ArmSide::GRIP_ORDER.into_iter().map(move |side| (side, self.arm(side)))
    }

    /// Every configured servo channel.
    pub fn servo_ids(&self) -> Vec<u8> {
        self.iter().flat_map(|(_, arm)| arm.servos()).collect()
    }

    /// Validate the arm configuration.
    ///
    /// # Validation Rules
    /// 1. Every calibration has finite, distinct extremes
    /// 2. Every servo channel is below `MAX_SERVOS`
    /// 3. No servo channel is used twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (side, arm) in self.iter() {
            arm.linear.validate(&format!("arms.{side}.linear"))?;
            arm.rotational.validate(&format!("arms.{side}.rotational"))?;

            for servo in arm.servos() {
                if servo >= MAX_SERVOS {
                    return Err(ConfigError::ValidationError(format!(
                        "arms.{side}: servo {servo} out of range (max {})",
                        MAX_SERVOS - 1
                    )));
                }
                if !seen.insert(servo) {
                    return Err(ConfigError::ValidationError(format!(
                        "arms.{side}: servo {servo} assigned twice"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Servo timing shared by all arms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Servo speed in seconds per degree.
    pub rotation_speed: f64,
    /// Pause added after a command, in seconds.
    pub command_delay: f64,
}

impl MotionConfig {
    /// Validate the timing values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("rotation_speed", self.rotation_speed),
            ("command_delay", self.command_delay),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "motion.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 0.004,
            command_delay: 0.05,
        }
    }
}
