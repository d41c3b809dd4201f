//! Two-axis gripper arm model.
//!
//! Each arm has a linear servo (slides the gripper onto the cube) and a
//! rotational servo (turns the gripper). Both servos only ever rest at one of
//! their two calibrated extremes, so the model tracks a logical [`Position`]
//! per axis and derives the angle from the calibration:
//!
//! | axis       | `Back`            | `Forward`          |
//! |------------|-------------------|--------------------|
//! | linear     | `linear.low`      | `linear.high`      |
//! | rotational | `rotational.low`  | `rotational.high`  |
//!
//! A move that cannot be performed from the current position (sliding
//! forward when already forward) yields no [`Command`] and leaves the arm
//! untouched.

use cubot_common::hal::config::{ArmConfig, ArmSide, MotionConfig, ServoCalibration};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Servo axis of an arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Slides the gripper towards or away from the cube.
    Linear,
    /// Turns the gripper.
    Rotational,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Linear => "linear",
            Axis::Rotational => "rotational",
        })
    }
}

/// Logical position of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// At the low calibrated extreme.
    Back,
    /// At the high calibrated extreme.
    Forward,
}

impl Position {
    #[inline]
    const fn flipped(self) -> Self {
        match self {
            Position::Back => Position::Forward,
            Position::Forward => Position::Back,
        }
    }
}

/// Any direction an arm can be asked to move in.
///
/// Only `Back`/`Forward` belong to the linear axis and only
/// `Clockwise`/`Anticlockwise` to the rotational axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Back,
    Forward,
    Clockwise,
    Anticlockwise,
}

impl Direction {
    /// Axis this direction belongs to.
    pub const fn axis(&self) -> Axis {
        match self {
            Direction::Back | Direction::Forward => Axis::Linear,
            Direction::Clockwise | Direction::Anticlockwise => Axis::Rotational,
        }
    }
}

/// Rotational direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    Clockwise,
    Anticlockwise,
}

impl Rotation {
    /// The opposite rotation.
    #[inline]
    pub const fn inverse(self) -> Self {
        match self {
            Rotation::Clockwise => Rotation::Anticlockwise,
            Rotation::Anticlockwise => Rotation::Clockwise,
        }
    }
}

impl From<Rotation> for Direction {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Clockwise => Direction::Clockwise,
            Rotation::Anticlockwise => Direction::Anticlockwise,
        }
    }
}

/// Linear direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Travel {
    Back,
    Forward,
}

impl From<Travel> for Direction {
    fn from(travel: Travel) -> Self {
        match travel {
            Travel::Back => Direction::Back,
            Travel::Forward => Direction::Forward,
        }
    }
}

/// Degree-of-freedom check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dof {
    /// Already at the requested extreme.
    NoTurn,
    /// The axis can travel to the other extreme.
    Turn,
}

/// Timing flags applied to a generated command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pace {
    /// Wait for the servo to complete its travel.
    pub servo_delay: bool,
    /// Add the configured pause after the command.
    pub command_delay: bool,
}

impl Pace {
    /// Wait for travel and pause afterwards.
    pub const FULL: Pace = Pace {
        servo_delay: true,
        command_delay: true,
    };

    /// Issue the command and continue at once, so the next command moves
    /// in parallel.
    pub const IMMEDIATE: Pace = Pace {
        servo_delay: false,
        command_delay: false,
    };
}

/// One servo command: drive `servo_id` to `position` and wait `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    pub servo_id: u8,
    pub axis: Axis,
    /// Target angle in degrees.
    pub position: f64,
    /// Time to wait after issuing the command.
    pub duration: Duration,
}

/// Arm model errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArmError {
    /// Initial angle is not one of the calibrated extremes.
    #[error("{side} arm: {axis} angle {angle} is neither calibrated extreme ({low} / {high})")]
    OffCalibration {
        side: ArmSide,
        axis: Axis,
        angle: f64,
        low: f64,
        high: f64,
    },

    /// Direction used with an axis it does not belong to.
    #[error("direction {direction:?} is not valid for the {axis} axis")]
    InvalidDirection { axis: Axis, direction: Direction },
}

/// One gripper arm.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    side: ArmSide,
    linear_servo: u8,
    rotational_servo: u8,
    linear: ServoCalibration,
    rotational: ServoCalibration,
    linear_position: Position,
    rotational_position: Position,
    /// Seconds per degree.
    rotation_speed: f64,
    /// Seconds.
    command_delay: f64,
}

impl Arm {
    /// Build an arm from its calibration and believed power-up angles.
    ///
    /// # Errors
    /// `ArmError::OffCalibration` if a start angle is not one of the two
    /// calibrated extremes of its servo.
    pub fn new(side: ArmSide, config: &ArmConfig, motion: &MotionConfig) -> Result<Self, ArmError> {
        let linear = position_of(side, Axis::Linear, &config.linear, config.start_linear())?;
        let rotational = position_of(
            side,
            Axis::Rotational,
            &config.rotational,
            config.start_rotational(),
        )?;
        Ok(Self::with_positions(side, config, motion, linear, rotational))
    }

    /// Build an arm at known logical positions.
    ///
    /// Used when recalibrating: the physical arm has not moved, only the
    /// angles its extremes map to.
    pub fn with_positions(
        side: ArmSide,
        config: &ArmConfig,
        motion: &MotionConfig,
        linear: Position,
        rotational: Position,
    ) -> Self {
        Self {
            side,
            linear_servo: config.linear_servo,
            rotational_servo: config.rotational_servo,
            linear: config.linear,
            rotational: config.rotational,
            linear_position: linear,
            rotational_position: rotational,
            rotation_speed: motion.rotation_speed,
            command_delay: motion.command_delay,
        }
    }

    pub fn side(&self) -> ArmSide {
        self.side
    }

    pub fn linear_servo(&self) -> u8 {
        self.linear_servo
    }

    pub fn rotational_servo(&self) -> u8 {
        self.rotational_servo
    }

    /// Current logical position of `axis`.
    #[inline]
    pub fn check_position(&self, axis: Axis) -> Position {
        match axis {
            Axis::Linear => self.linear_position,
            Axis::Rotational => self.rotational_position,
        }
    }

    /// Current angle of `axis`, always one of its calibrated extremes.
    pub fn angle(&self, axis: Axis) -> f64 {
        let calibration = self.calibration(axis);
        match self.check_position(axis) {
            Position::Back => calibration.low,
            Position::Forward => calibration.high,
        }
    }

    /// Whether `axis` can move in `direction` from where it is now.
    ///
    /// Clockwise takes the rotational axis from `Back` to `Forward`,
    /// anticlockwise the other way round.
    ///
    /// # Errors
    /// `ArmError::InvalidDirection` if `direction` belongs to the other axis.
    pub fn check_dof(&self, axis: Axis, direction: Direction) -> Result<Dof, ArmError> {
        if direction.axis() != axis {
            return Err(ArmError::InvalidDirection { axis, direction });
        }
        let target = match direction {
            Direction::Forward | Direction::Clockwise => Position::Forward,
            Direction::Back | Direction::Anticlockwise => Position::Back,
        };
        Ok(if self.check_position(axis) == target {
            Dof::NoTurn
        } else {
            Dof::Turn
        })
    }

    /// Turn the gripper. Returns `None` if it is already turned that way.
    pub fn rotate(&mut self, rotation: Rotation, pace: Pace) -> Option<Command> {
        self.step(Axis::Rotational, rotation.into(), pace)
    }

    /// Slide the gripper. Returns `None` if it is already there.
    pub fn slide(&mut self, travel: Travel, pace: Pace) -> Option<Command> {
        self.step(Axis::Linear, travel.into(), pace)
    }

    /// Re-issue the current linear angle.
    pub fn reposition_linear(&self, delay: Duration) -> Command {
        self.command(Axis::Linear, delay)
    }

    /// Re-issue the current rotational angle.
    pub fn reposition_rotational(&self, delay: Duration) -> Command {
        self.command(Axis::Rotational, delay)
    }

    /// Take the logical position of `axis` from an angle the servo was
    /// last sent. Angles between the extremes count as the nearer one.
    pub fn sync_to_angle(&mut self, axis: Axis, angle: f64) {
        let calibration = self.calibration(axis);
        let position = if (angle - calibration.low).abs() <= (angle - calibration.high).abs() {
            Position::Back
        } else {
            Position::Forward
        };
        match axis {
            Axis::Linear => self.linear_position = position,
            Axis::Rotational => self.rotational_position = position,
        }
    }

    fn step(&mut self, axis: Axis, direction: Direction, pace: Pace) -> Option<Command> {
        // Direction is derived from the axis, so the check cannot fail here.
        if self.check_dof(axis, direction).ok()? == Dof::NoTurn {
            return None;
        }

        match axis {
            Axis::Linear => self.linear_position = self.linear_position.flipped(),
            Axis::Rotational => self.rotational_position = self.rotational_position.flipped(),
        }

        let mut secs = 0.0;
        if pace.servo_delay {
            secs += self.calibration(axis).travel() * self.rotation_speed;
        }
        if pace.command_delay {
            secs += self.command_delay;
        }
        Some(self.command(axis, Duration::try_from_secs_f64(secs).unwrap_or_default()))
    }

    fn command(&self, axis: Axis, duration: Duration) -> Command {
        let servo_id = match axis {
            Axis::Linear => self.linear_servo,
            Axis::Rotational => self.rotational_servo,
        };
        Command {
            servo_id,
            axis,
            position: self.angle(axis),
            duration,
        }
    }

    fn calibration(&self, axis: Axis) -> &ServoCalibration {
        match axis {
            Axis::Linear => &self.linear,
            Axis::Rotational => &self.rotational,
        }
    }
}

fn position_of(
    side: ArmSide,
    axis: Axis,
    calibration: &ServoCalibration,
    angle: f64,
) -> Result<Position, ArmError> {
    if angle == calibration.low {
        Ok(Position::Back)
    } else if angle == calibration.high {
        Ok(Position::Forward)
    } else {
        Err(ArmError::OffCalibration {
            side,
            axis,
            angle,
            low: calibration.low,
            high: calibration.high,
        })
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ArmConfig {
        ArmConfig {
            linear_servo: 0,
            rotational_servo: 1,
            linear: ServoCalibration { low: 20.0, high: 110.0 },
            rotational: ServoCalibration { low: 10.0, high: 100.0 },
            initial_linear: None,
            initial_rotational: None,
        }
    }

    fn motion() -> MotionConfig {
        MotionConfig {
            rotation_speed: 0.004,
            command_delay: 0.05,
        }
    }

    fn arm() -> Arm {
        Arm::new(ArmSide::Up, &config(), &motion()).unwrap()
    }

    #[test]
    fn starts_at_low_extremes() {
        let arm = arm();
        assert_eq!(arm.check_position(Axis::Linear), Position::Back);
        assert_eq!(arm.check_position(Axis::Rotational), Position::Back);
        assert_eq!(arm.angle(Axis::Linear), 20.0);
    }

    #[test]
    fn off_calibration_start_rejected() {
        let mut cfg = config();
        cfg.initial_rotational = Some(55.0);
        let err = Arm::new(ArmSide::Left, &cfg, &motion()).unwrap_err();
        assert!(matches!(
            err,
            ArmError::OffCalibration {
                side: ArmSide::Left,
                axis: Axis::Rotational,
                ..
            }
        ));
    }

    #[test]
    fn high_start_maps_to_forward() {
        let mut cfg = config();
        cfg.initial_linear = Some(110.0);
        let arm = Arm::new(ArmSide::Up, &cfg, &motion()).unwrap();
        assert_eq!(arm.check_position(Axis::Linear), Position::Forward);
    }

    #[test]
    fn sync_to_angle_picks_nearer_extreme() {
        let mut arm = arm();
        arm.sync_to_angle(Axis::Rotational, 100.0);
        assert_eq!(arm.check_position(Axis::Rotational), Position::Forward);
        arm.sync_to_angle(Axis::Rotational, 40.0);
        assert_eq!(arm.check_position(Axis::Rotational), Position::Back);
        arm.sync_to_angle(Axis::Linear, 90.0);
        assert_eq!(arm.check_position(Axis::Linear), Position::Forward);
        assert_eq!(arm.check_position(Axis::Rotational), Position::Back);
    }

    #[test]
    fn check_dof_rejects_foreign_direction() {
        let arm = arm();
        assert_eq!(
            arm.check_dof(Axis::Linear, Direction::Clockwise),
            Err(ArmError::InvalidDirection {
                axis: Axis::Linear,
                direction: Direction::Clockwise
            })
        );
        assert!(arm.check_dof(Axis::Rotational, Direction::Forward).is_err());
    }

    #[test]
    fn check_dof_follows_position() {
        let arm = arm();
        assert_eq!(arm.check_dof(Axis::Linear, Direction::Forward), Ok(Dof::Turn));
        assert_eq!(arm.check_dof(Axis::Linear, Direction::Back), Ok(Dof::NoTurn));
        assert_eq!(arm.check_dof(Axis::Rotational, Direction::Clockwise), Ok(Dof::Turn));
        assert_eq!(
            arm.check_dof(Axis::Rotational, Direction::Anticlockwise),
            Ok(Dof::NoTurn)
        );
    }

    #[test]
    fn rotate_flips_and_times_command() {
        let mut arm = arm();
        let cmd = arm.rotate(Rotation::Clockwise, Pace::FULL).unwrap();
        assert_eq!(cmd.servo_id, 1);
        assert_eq!(cmd.axis, Axis::Rotational);
        assert_eq!(cmd.position, 100.0);
        // 90 deg * 0.004 s/deg + 0.05 s
        assert!((cmd.duration.as_secs_f64() - 0.41).abs() < 1e-9);
        assert_eq!(arm.check_position(Axis::Rotational), Position::Forward);

        assert_eq!(arm.rotate(Rotation::Clockwise, Pace::FULL), None);
        assert_eq!(arm.check_position(Axis::Rotational), Position::Forward);
    }

    #[test]
    fn pace_flags_shape_duration() {
        let mut arm = arm();
        let cmd = arm.slide(Travel::Forward, Pace::IMMEDIATE).unwrap();
        assert_eq!(cmd.duration, Duration::ZERO);
        assert_eq!(cmd.position, 110.0);

        let cmd = arm
            .slide(
                Travel::Back,
                Pace {
                    servo_delay: false,
                    command_delay: true,
                },
            )
            .unwrap();
        assert!((cmd.duration.as_secs_f64() - 0.05).abs() < 1e-9);
        assert_eq!(cmd.position, 20.0);
    }

    #[test]
    fn reposition_reissues_current_angle() {
        let mut arm = arm();
        arm.slide(Travel::Forward, Pace::IMMEDIATE);
        let delay = Duration::from_millis(300);
        let lin = arm.reposition_linear(delay);
        let rot = arm.reposition_rotational(Duration::ZERO);
        assert_eq!((lin.servo_id, lin.position, lin.duration), (0, 110.0, delay));
        assert_eq!((rot.servo_id, rot.position), (1, 10.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone, Copy)]
        enum Op {
            Rotate(Rotation),
            Slide(Travel),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                Just(Op::Rotate(Rotation::Clockwise)),
                Just(Op::Rotate(Rotation::Anticlockwise)),
                Just(Op::Slide(Travel::Forward)),
                Just(Op::Slide(Travel::Back)),
            ]
        }

        proptest! {
            /// Angles stay on a calibrated extreme after any move sequence
            #[test]
            fn angles_stay_on_extremes(ops in prop::collection::vec(op_strategy(), 0..64)) {
                let mut arm = arm();
                for op in ops {
                    let (axis, dof, cmd) = match op {
                        Op::Rotate(r) => {
                            let dof = arm.check_dof(Axis::Rotational, r.into()).unwrap();
                            (Axis::Rotational, dof, arm.rotate(r, Pace::FULL))
                        }
                        Op::Slide(t) => {
                            let dof = arm.check_dof(Axis::Linear, t.into()).unwrap();
                            (Axis::Linear, dof, arm.slide(t, Pace::FULL))
                        }
                    };
                    // A command is produced iff the dof check allowed it.
                    prop_assert_eq!(cmd.is_some(), dof == Dof::Turn);
                    if let Some(cmd) = cmd {
                        prop_assert_eq!(cmd.position, arm.angle(axis));
                    }

                    let lin = arm.angle(Axis::Linear);
                    let rot = arm.angle(Axis::Rotational);
                    prop_assert!(lin == 20.0 || lin == 110.0);
                    prop_assert!(rot == 10.0 || rot == 100.0);
                }
            }

            /// check_dof never changes the arm
            #[test]
            fn check_dof_is_pure(forward in any::<bool>(), clockwise in any::<bool>()) {
                let mut arm = arm();
                if forward {
                    arm.slide(Travel::Forward, Pace::IMMEDIATE);
                }
                if clockwise {
                    arm.rotate(Rotation::Clockwise, Pace::IMMEDIATE);
                }
                let before = arm.clone();
                for direction in [
                    Direction::Back,
                    Direction::Forward,
                    Direction::Clockwise,
                    Direction::Anticlockwise,
                ] {
                    let _ = arm.check_dof(Axis::Linear, direction);
                    let _ = arm.check_dof(Axis::Rotational, direction);
                }
                prop_assert_eq!(arm, before);
            }
        }
    }
}
