//! Motion compiler.
//!
//! Translates cube moves into ordered servo command sequences for the four
//! arms. The front and back faces have no arm: `F` and `B` turn the whole
//! cube towards the right first and are then executed by the left and right
//! arms, after which every pending move is renamed to match the new
//! orientation.
//!
//! Between routines every arm rests gripped: rotational axis `Back`, linear
//! axis `Forward`. Each routine below starts and ends in that pose. The
//! order of commands inside a routine keeps the grippers from colliding and
//! must not be changed.

use crate::arm::{Arm, ArmError, Axis, Command, Pace, Rotation, Travel};
use crate::moves::{Face, MoveToken, TurnCount};
use cubot_common::consts::ARM_COUNT;
use cubot_common::hal::config::{ArmSide, ArmsConfig, MotionConfig};
use std::time::Duration;
use tracing::debug;

/// Opaque entry interleaved with servo commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Capture the face currently in front of the camera.
    Capture(Face),
}

/// One entry of a compiled sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Servo(Command),
    Marker(Marker),
}

impl Step {
    pub fn as_command(&self) -> Option<&Command> {
        match self {
            Step::Servo(cmd) => Some(cmd),
            Step::Marker(_) => None,
        }
    }
}

/// Compiles routines for four arms into a [`Step`] sequence.
#[derive(Debug, Clone)]
pub struct MotionCompiler {
    up: Arm,
    down: Arm,
    left: Arm,
    right: Arm,
    steps: Vec<Step>,
    /// Arms `fix()` turned, in grip order. `None` when not gripped.
    grip: Option<[bool; ARM_COUNT]>,
}

impl MotionCompiler {
    /// Build the four arm models.
    ///
    /// # Errors
    /// `ArmError::OffCalibration` if an arm's start angles are off its
    /// calibration.
    pub fn new(arms: &ArmsConfig, motion: &MotionConfig) -> Result<Self, ArmError> {
        Ok(Self {
            up: Arm::new(ArmSide::Up, &arms.up, motion)?,
            down: Arm::new(ArmSide::Down, &arms.down, motion)?,
            left: Arm::new(ArmSide::Left, &arms.left, motion)?,
            right: Arm::new(ArmSide::Right, &arms.right, motion)?,
            steps: Vec::new(),
            grip: None,
        })
    }

    /// Apply new calibration and timing, keeping every arm's logical pose.
    pub fn recalibrate(&mut self, arms: &ArmsConfig, motion: &MotionConfig) {
        for side in ArmSide::GRIP_ORDER {
            let arm = self.arm_mut(side);
            let linear = arm.check_position(Axis::Linear);
            let rotational = arm.check_position(Axis::Rotational);
            *arm = Arm::with_positions(side, arms.arm(side), motion, linear, rotational);
        }
    }

    pub fn arm(&self, side: ArmSide) -> &Arm {
        match side {
            ArmSide::Up => &self.up,
            ArmSide::Down => &self.down,
            ArmSide::Left => &self.left,
            ArmSide::Right => &self.right,
        }
    }

    fn arm_mut(&mut self, side: ArmSide) -> &mut Arm {
        match side {
            ArmSide::Up => &mut self.up,
            ArmSide::Down => &mut self.down,
            ArmSide::Left => &mut self.left,
            ArmSide::Right => &mut self.right,
        }
    }

    /// Whether the arms are currently closed on the cube.
    pub fn is_gripped(&self) -> bool {
        self.grip.is_some()
    }

    /// Compiled sequence so far.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Discard the compiled sequence. Arm poses are kept.
    pub fn reset(&mut self) {
        self.steps.clear();
    }

    /// Hand out the compiled sequence and start a new one.
    pub fn take_sequence(&mut self) -> Vec<Step> {
        std::mem::take(&mut self.steps)
    }

    /// Insert a marker at the current end of the sequence.
    pub fn append_marker(&mut self, marker: Marker) {
        self.steps.push(Step::Marker(marker));
    }

    fn push(&mut self, command: Option<Command>) {
        if let Some(cmd) = command {
            self.steps.push(Step::Servo(cmd));
        }
    }

    fn turn_arm(&mut self, side: ArmSide, rotation: Rotation, pace: Pace) {
        let cmd = self.arm_mut(side).rotate(rotation, pace);
        self.push(cmd);
    }

    fn slide_arm(&mut self, side: ArmSide, travel: Travel, pace: Pace) {
        let cmd = self.arm_mut(side).slide(travel, pace);
        self.push(cmd);
    }

    /// Pace for the `i`th arm of a four-arm burst: all move together and
    /// only the last one waits.
    fn burst_pace(i: usize) -> Pace {
        if i + 1 == ARM_COUNT {
            Pace::FULL
        } else {
            Pace::IMMEDIATE
        }
    }

    // ─── Grip routines ──────────────────────────────────────────────

    /// Close all four arms on the cube.
    ///
    /// Turns every arm anticlockwise, then slides all of them forward, in
    /// the order up, right, down, left.
    pub fn fix(&mut self) {
        let mut turned = [false; ARM_COUNT];
        for (i, side) in ArmSide::GRIP_ORDER.into_iter().enumerate() {
            let cmd = self.arm_mut(side).rotate(Rotation::Anticlockwise, Self::burst_pace(i));
            turned[i] = cmd.is_some();
            self.push(cmd);
        }
        for (i, side) in ArmSide::GRIP_ORDER.into_iter().enumerate() {
            self.slide_arm(side, Travel::Forward, Self::burst_pace(i));
        }
        // A repeated grip turns nothing new but must not forget earlier turns.
        let mut record = self.grip.unwrap_or_default();
        for (kept, now) in record.iter_mut().zip(turned) {
            *kept |= now;
        }
        self.grip = Some(record);
        debug!(?turned, ?record, "Compiled grip");
    }

    /// Open all four arms, undoing the turns recorded since the arms were
    /// last released.
    ///
    /// Without a grip record only the slides are emitted: the rotational
    /// axes stay where they are.
    pub fn release(&mut self) {
        for (i, side) in ArmSide::GRIP_ORDER.into_iter().enumerate() {
            self.slide_arm(side, Travel::Back, Self::burst_pace(i));
        }
        let turned = self.grip.take().unwrap_or_default();
        for (i, side) in ArmSide::GRIP_ORDER.into_iter().enumerate() {
            if turned[i] {
                self.turn_arm(side, Rotation::Clockwise, Self::burst_pace(i));
            }
        }
    }

    /// Align every arm model with the angles its servos were last sent.
    ///
    /// Servos `angle_of` has no angle for keep their modelled position.
    pub fn resync(&mut self, angle_of: impl Fn(u8) -> Option<f64>) {
        for side in ArmSide::GRIP_ORDER {
            let arm = self.arm_mut(side);
            for (axis, servo) in [
                (Axis::Linear, arm.linear_servo()),
                (Axis::Rotational, arm.rotational_servo()),
            ] {
                if let Some(angle) = angle_of(servo) {
                    arm.sync_to_angle(axis, angle);
                }
            }
        }
        debug!("Arm models resynchronised");
    }

    /// Re-send every servo's current angle, waiting `delay` after the last.
    pub fn reposition_arms(&mut self, delay: Duration) {
        for (i, side) in ArmSide::GRIP_ORDER.into_iter().enumerate() {
            let arm = self.arm(side);
            let last = i + 1 == ARM_COUNT;
            let linear = arm.reposition_linear(Duration::ZERO);
            let rotational = arm.reposition_rotational(if last { delay } else { Duration::ZERO });
            self.steps.push(Step::Servo(linear));
            self.steps.push(Step::Servo(rotational));
        }
    }

    // ─── Face turns ─────────────────────────────────────────────────

    /// Compile one move token against the current cube orientation.
    pub fn rotate(&mut self, token: MoveToken) {
        let (count, rotation) = token.turns();
        match token.face {
            Face::U => self.turn_face(ArmSide::Up, count, rotation),
            Face::D => self.turn_face(ArmSide::Down, count, rotation),
            Face::L => self.turn_face(ArmSide::Left, count, rotation),
            Face::R => self.turn_face(ArmSide::Right, count, rotation),
            Face::F => {
                self.rotate_cube_towards_right();
                self.turn_face(ArmSide::Left, count, rotation);
            }
            Face::B => {
                self.rotate_cube_towards_right();
                self.turn_face(ArmSide::Right, count, rotation);
            }
        }
    }

    fn turn_face(&mut self, side: ArmSide, count: TurnCount, rotation: Rotation) {
        let repeats = match count {
            TurnCount::Single => 1,
            TurnCount::Double => 2,
        };
        for _ in 0..repeats {
            match side {
                ArmSide::Down => self.quarter_turn_down(rotation),
                _ => self.quarter_turn(side, rotation),
            }
        }
    }

    /// Quarter turn of the face held by `side` (up, left or right arm).
    fn quarter_turn(&mut self, side: ArmSide, rotation: Rotation) {
        use Travel::{Back, Forward};
        let full = Pace::FULL;
        match rotation {
            Rotation::Clockwise => {
                self.turn_arm(side, rotation, full);
                self.slide_arm(side, Back, full);
                self.turn_arm(side, rotation.inverse(), full);
                self.slide_arm(side, Forward, full);
            }
            Rotation::Anticlockwise => {
                self.slide_arm(side, Back, full);
                self.turn_arm(side, rotation.inverse(), full);
                self.slide_arm(side, Forward, full);
                self.turn_arm(side, rotation, full);
            }
        }
    }

    /// Quarter turn of the bottom face.
    ///
    /// The down arm shares its travel with the left and right grippers, so
    /// those two step out of the way around every down-arm move.
    fn quarter_turn_down(&mut self, rotation: Rotation) {
        use ArmSide::{Down, Left, Right};
        use Travel::{Back, Forward};
        let (full, now) = (Pace::FULL, Pace::IMMEDIATE);

        if rotation == Rotation::Anticlockwise {
            self.slide_arm(Down, Back, full);
            self.turn_arm(Down, Rotation::Clockwise, full);
            self.slide_arm(Down, Forward, full);
        }

        self.slide_arm(Right, Back, now);
        self.slide_arm(Left, Back, full);

        self.slide_arm(Down, Back, full);
        self.slide_arm(Right, Forward, now);
        self.slide_arm(Left, Forward, full);

        self.turn_arm(Down, rotation, full);
        self.slide_arm(Right, Back, now);
        self.slide_arm(Left, Back, full);
        self.slide_arm(Down, Forward, full);

        self.slide_arm(Right, Forward, now);
        self.slide_arm(Left, Forward, full);

        if rotation == Rotation::Clockwise {
            self.slide_arm(Down, Back, full);
            self.turn_arm(Down, Rotation::Anticlockwise, full);
            self.slide_arm(Down, Forward, full);
        }
    }

    // ─── Whole-cube reorientation ───────────────────────────────────

    /// Turn the whole cube a quarter towards the right (about the U-D axis).
    ///
    /// Afterwards the former front face sits on the left arm.
    pub fn rotate_cube_towards_right(&mut self) {
        use ArmSide::{Down, Left, Right, Up};
        use Rotation::{Anticlockwise, Clockwise};
        use Travel::{Back, Forward};
        let (full, now) = (Pace::FULL, Pace::IMMEDIATE);

        self.slide_arm(Down, Back, full);
        self.turn_arm(Down, Clockwise, full);
        self.slide_arm(Down, Forward, full);

        self.slide_arm(Right, Back, now);
        self.slide_arm(Left, Back, full);

        self.turn_arm(Up, Clockwise, now);
        self.turn_arm(Down, Anticlockwise, full);

        self.slide_arm(Right, Forward, now);
        self.slide_arm(Left, Forward, full);

        self.slide_arm(Up, Back, full);
        self.turn_arm(Up, Anticlockwise, full);
        self.slide_arm(Up, Forward, full);
    }

    /// Turn the whole cube a quarter upwards (about the L-R axis).
    ///
    /// Afterwards the former front face is on top.
    pub fn rotate_cube_upwards(&mut self) {
        use ArmSide::{Down, Left, Right, Up};
        use Rotation::{Anticlockwise, Clockwise};
        use Travel::{Back, Forward};
        let (full, now) = (Pace::FULL, Pace::IMMEDIATE);

        self.slide_arm(Left, Back, full);
        self.turn_arm(Left, Clockwise, full);
        self.slide_arm(Left, Forward, full);

        self.slide_arm(Up, Back, now);
        self.slide_arm(Down, Back, full);

        self.turn_arm(Right, Clockwise, now);
        self.turn_arm(Left, Anticlockwise, full);

        self.slide_arm(Up, Forward, now);
        self.slide_arm(Down, Forward, full);

        self.slide_arm(Right, Back, full);
        self.turn_arm(Right, Anticlockwise, full);
        self.slide_arm(Right, Forward, full);
    }

    // ─── Move lists ─────────────────────────────────────────────────

    /// Compile a solver move list.
    ///
    /// After every `F` or `B` the cube has been turned towards the right,
    /// so every later token is renamed with
    /// [`Face::after_towards_right`]. Renames accumulate.
    ///
    /// Returns the tokens as they were actually compiled.
    pub fn solution(&mut self, moves: &[MoveToken]) -> Vec<MoveToken> {
        let mut pending = moves.to_vec();
        for i in 0..pending.len() {
            let token = pending[i];
            self.rotate(token);
            if token.face.needs_reorientation() {
                for later in &mut pending[i + 1..] {
                    *later = later.with_face(later.face.after_towards_right());
                }
            }
        }
        debug!(moves = pending.len(), steps = self.steps.len(), "Compiled move list");
        pending
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::Position;
    use crate::moves::parse_move_list;
    use cubot_common::hal::config::{ArmConfig, ServoCalibration};

    fn arm_config(linear_servo: u8, rotational_servo: u8) -> ArmConfig {
        ArmConfig {
            linear_servo,
            rotational_servo,
            linear: ServoCalibration { low: 20.0, high: 110.0 },
            rotational: ServoCalibration { low: 10.0, high: 100.0 },
            initial_linear: None,
            initial_rotational: None,
        }
    }

    fn arms() -> ArmsConfig {
        ArmsConfig {
            up: arm_config(0, 1),
            right: arm_config(2, 3),
            down: arm_config(4, 5),
            left: arm_config(6, 7),
        }
    }

    fn compiler() -> MotionCompiler {
        MotionCompiler::new(&arms(), &MotionConfig::default()).unwrap()
    }

    fn gripped() -> MotionCompiler {
        let mut c = compiler();
        c.fix();
        c.reset();
        c
    }

    fn servo_trace(steps: &[Step]) -> Vec<(u8, f64)> {
        steps
            .iter()
            .filter_map(Step::as_command)
            .map(|c| (c.servo_id, c.position))
            .collect()
    }

    fn assert_rest_pose(c: &MotionCompiler) {
        for side in ArmSide::GRIP_ORDER {
            let arm = c.arm(side);
            assert_eq!(arm.check_position(Axis::Linear), Position::Forward, "{side}");
            assert_eq!(arm.check_position(Axis::Rotational), Position::Back, "{side}");
        }
    }

    #[test]
    fn fix_from_rest_only_slides() {
        let mut c = compiler();
        c.fix();
        assert_eq!(
            servo_trace(c.steps()),
            vec![(0, 110.0), (2, 110.0), (4, 110.0), (6, 110.0)]
        );
        // Only the left arm waits.
        let durations: Vec<_> = c
            .steps()
            .iter()
            .filter_map(Step::as_command)
            .map(|cmd| cmd.duration.is_zero())
            .collect();
        assert_eq!(durations, vec![true, true, true, false]);
        assert!(c.is_gripped());
    }

    #[test]
    fn release_undoes_fix_turns() {
        let mut cfg = arms();
        cfg.right.initial_rotational = Some(100.0);
        let mut c = MotionCompiler::new(&cfg, &MotionConfig::default()).unwrap();
        let before: Vec<_> = ArmSide::GRIP_ORDER.iter().map(|&s| c.arm(s).clone()).collect();

        c.fix();
        assert_eq!(c.steps().len(), 5);
        c.release();
        // Release retracts all four and turns the right arm back.
        assert_eq!(c.steps().len(), 10);
        assert_eq!(servo_trace(&c.steps()[9..]), vec![(3, 100.0)]);

        let after: Vec<_> = ArmSide::GRIP_ORDER.iter().map(|&s| c.arm(s).clone()).collect();
        assert_eq!(before, after);
        assert!(!c.is_gripped());
    }

    #[test]
    fn repeated_fix_keeps_grip_record() {
        let mut cfg = arms();
        cfg.right.initial_rotational = Some(100.0);
        let mut c = MotionCompiler::new(&cfg, &MotionConfig::default()).unwrap();

        c.fix();
        c.fix();
        c.release();
        assert_eq!(c.arm(ArmSide::Right).check_position(Axis::Rotational), Position::Forward);
        assert_eq!(c.arm(ArmSide::Right).angle(Axis::Rotational), 100.0);
    }

    #[test]
    fn release_without_grip_only_slides() {
        // Powered up closed on the cube with the right gripper turned.
        let mut cfg = arms();
        for arm in [&mut cfg.up, &mut cfg.right, &mut cfg.down, &mut cfg.left] {
            arm.initial_linear = Some(110.0);
        }
        cfg.right.initial_rotational = Some(100.0);
        let mut c = MotionCompiler::new(&cfg, &MotionConfig::default()).unwrap();
        assert!(!c.is_gripped());

        c.release();
        assert_eq!(
            servo_trace(c.steps()),
            vec![(0, 20.0), (2, 20.0), (4, 20.0), (6, 20.0)]
        );
        assert_eq!(c.arm(ArmSide::Right).check_position(Axis::Rotational), Position::Forward);
    }

    #[test]
    fn resync_follows_sent_angles() {
        let mut c = gripped();
        c.rotate("D".parse().unwrap());
        c.reset();
        // Hardware stopped after the down arm turned clockwise.
        let sent = [(2, 110.0), (4, 20.0), (5, 100.0), (6, 110.0)];
        c.resync(|servo| sent.iter().find(|(id, _)| *id == servo).map(|&(_, a)| a));

        let down = c.arm(ArmSide::Down);
        assert_eq!(down.check_position(Axis::Linear), Position::Back);
        assert_eq!(down.check_position(Axis::Rotational), Position::Forward);
        // Servos without a sent angle keep their pose.
        assert_eq!(c.arm(ArmSide::Up).check_position(Axis::Linear), Position::Forward);
    }

    #[test]
    fn up_clockwise_sequence() {
        let mut c = gripped();
        c.rotate("U".parse().unwrap());
        assert_eq!(
            servo_trace(c.steps()),
            vec![(1, 100.0), (0, 20.0), (1, 10.0), (0, 110.0)]
        );
        assert_rest_pose(&c);
    }

    #[test]
    fn right_anticlockwise_sequence() {
        let mut c = gripped();
        c.rotate("R'".parse().unwrap());
        assert_eq!(
            servo_trace(c.steps()),
            vec![(2, 20.0), (3, 100.0), (2, 110.0), (3, 10.0)]
        );
        assert_rest_pose(&c);
    }

    #[test]
    fn down_turns_keep_rest_pose() {
        for token in ["D", "D'", "D2"] {
            let mut c = gripped();
            c.rotate(token.parse().unwrap());
            let expected = if token == "D2" { 28 } else { 14 };
            assert_eq!(c.steps().len(), expected, "{token}");
            assert_rest_pose(&c);
        }
    }

    /// Indices of the steps issued without waiting.
    fn immediate_steps(steps: &[Step]) -> Vec<usize> {
        steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.as_command().is_some_and(|c| c.duration.is_zero()))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn down_clockwise_sequence() {
        let mut c = gripped();
        c.rotate("D".parse().unwrap());
        assert_eq!(
            servo_trace(c.steps()),
            vec![
                (2, 20.0),
                (6, 20.0),
                (4, 20.0),
                (2, 110.0),
                (6, 110.0),
                (5, 100.0),
                (2, 20.0),
                (6, 20.0),
                (4, 110.0),
                (2, 110.0),
                (6, 110.0),
                (4, 20.0),
                (5, 10.0),
                (4, 110.0),
            ]
        );
        // The right arm always moves together with the left one.
        assert_eq!(immediate_steps(c.steps()), vec![0, 3, 6, 9]);
    }

    #[test]
    fn down_anticlockwise_sequence() {
        let mut c = gripped();
        c.rotate("D'".parse().unwrap());
        assert_eq!(
            servo_trace(c.steps()),
            vec![
                (4, 20.0),
                (5, 100.0),
                (4, 110.0),
                (2, 20.0),
                (6, 20.0),
                (4, 20.0),
                (2, 110.0),
                (6, 110.0),
                (5, 10.0),
                (2, 20.0),
                (6, 20.0),
                (4, 110.0),
                (2, 110.0),
                (6, 110.0),
            ]
        );
        assert_eq!(immediate_steps(c.steps()), vec![3, 6, 9, 12]);
    }

    #[test]
    fn towards_right_sequence() {
        let mut c = gripped();
        c.rotate_cube_towards_right();
        assert_eq!(
            servo_trace(c.steps()),
            vec![
                (4, 20.0),
                (5, 100.0),
                (4, 110.0),
                (2, 20.0),
                (6, 20.0),
                (1, 100.0),
                (5, 10.0),
                (2, 110.0),
                (6, 110.0),
                (0, 20.0),
                (1, 10.0),
                (0, 110.0),
            ]
        );
        assert_eq!(immediate_steps(c.steps()), vec![3, 5, 7]);
    }

    #[test]
    fn upwards_sequence() {
        let mut c = gripped();
        c.rotate_cube_upwards();
        assert_eq!(
            servo_trace(c.steps()),
            vec![
                (6, 20.0),
                (7, 100.0),
                (6, 110.0),
                (0, 20.0),
                (4, 20.0),
                (3, 100.0),
                (7, 10.0),
                (0, 110.0),
                (4, 110.0),
                (2, 20.0),
                (3, 10.0),
                (2, 110.0),
            ]
        );
        assert_eq!(immediate_steps(c.steps()), vec![3, 5, 7]);
    }

    #[test]
    fn double_turn_is_single_twice() {
        let mut single = gripped();
        single.rotate("L".parse().unwrap());
        single.rotate("L".parse().unwrap());
        let mut double = gripped();
        double.rotate("L2".parse().unwrap());
        assert_eq!(single.steps(), double.steps());
    }

    #[test]
    fn reorientations_keep_rest_pose() {
        let mut c = gripped();
        c.rotate_cube_towards_right();
        assert_eq!(c.steps().len(), 12);
        assert_rest_pose(&c);
        c.rotate_cube_upwards();
        assert_eq!(c.steps().len(), 24);
        assert_rest_pose(&c);
    }

    #[test]
    fn front_is_reorientation_then_left() {
        let mut expected = gripped();
        expected.rotate_cube_towards_right();
        expected.rotate("L'".parse().unwrap());

        let mut c = gripped();
        c.rotate("F'".parse().unwrap());
        assert_eq!(c.steps(), expected.steps());
    }

    #[test]
    fn solution_renames_after_front() {
        let mut c = gripped();
        let compiled = c.solution(&parse_move_list("F R").unwrap());
        assert_eq!(compiled, parse_move_list("F F").unwrap());

        let mut expected = gripped();
        expected.rotate("F".parse().unwrap());
        expected.rotate("F".parse().unwrap());
        assert_eq!(c.steps(), expected.steps());
    }

    #[test]
    fn solution_renames_accumulate() {
        let mut c = gripped();
        let compiled = c.solution(&parse_move_list("B L2 U F'").unwrap());
        // B: L -> B.  Then B2 remaps U unchanged, F' -> L' -> B'.
        assert_eq!(compiled, parse_move_list("B B2 U B'").unwrap());
    }

    #[test]
    fn empty_solution_is_empty() {
        let mut c = gripped();
        assert!(c.solution(&[]).is_empty());
        assert!(c.take_sequence().is_empty());
    }

    #[test]
    fn reposition_covers_all_servos() {
        let mut c = compiler();
        c.reposition_arms(Duration::from_millis(500));
        let ids: Vec<_> = servo_trace(c.steps()).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        let last = c.steps()[7].as_command().unwrap();
        assert_eq!(last.duration, Duration::from_millis(500));
        assert!(c.steps()[..7]
            .iter()
            .all(|s| s.as_command().unwrap().duration.is_zero()));
    }

    #[test]
    fn markers_keep_their_place() {
        let mut c = gripped();
        c.append_marker(Marker::Capture(Face::F));
        c.rotate_cube_towards_right();
        c.append_marker(Marker::Capture(Face::R));
        let steps = c.take_sequence();
        assert_eq!(steps[0], Step::Marker(Marker::Capture(Face::F)));
        assert_eq!(steps[13], Step::Marker(Marker::Capture(Face::R)));
        assert!(c.steps().is_empty());
    }

    #[test]
    fn recalibrate_keeps_pose() {
        let mut c = gripped();
        let mut cfg = arms();
        cfg.up.linear = ServoCalibration { low: 30.0, high: 120.0 };
        c.recalibrate(&cfg, &MotionConfig::default());
        assert_eq!(c.arm(ArmSide::Up).angle(Axis::Linear), 120.0);
        assert_rest_pose(&c);
    }
}
