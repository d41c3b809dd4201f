//! Motion compiler integration tests on the shipped calibration.
//!
//! Verifies:
//! 1. Every compiled command drives a configured servo to a calibrated extreme.
//! 2. Solutions start and end in the gripped rest pose.
//! 3. Grip followed by release returns the arms to where they started.
//! 4. The scan routine and a solution compile back to back.

use cubot_common::config::RobotConfig;
use cubot_common::hal::config::ArmSide;
use cubot_control::arm::{Axis, Position};
use cubot_control::compiler::{MotionCompiler, Step};
use cubot_control::moves::{Face, Modifier, MoveToken, parse_move_list};
use cubot_control::scan::{GRIP_SETTLE, plan_scan};
use proptest::prelude::*;
use std::collections::HashMap;
use std::path::Path;

// ─── Helpers ────────────────────────────────────────────────────────

fn shipped_config() -> RobotConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/cubot.toml");
    RobotConfig::load_validated(&path).expect("shipped config must load")
}

fn compiler() -> MotionCompiler {
    let config = shipped_config();
    MotionCompiler::new(&config.arms, &config.motion).unwrap()
}

fn gripped() -> MotionCompiler {
    let mut c = compiler();
    c.fix();
    c.reset();
    c
}

/// (linear, rotational) position of every arm.
fn pose(c: &MotionCompiler) -> Vec<(Position, Position)> {
    ArmSide::GRIP_ORDER
        .iter()
        .map(|&side| {
            let arm = c.arm(side);
            (arm.check_position(Axis::Linear), arm.check_position(Axis::Rotational))
        })
        .collect()
}

fn move_token() -> impl Strategy<Value = MoveToken> {
    (
        prop::sample::select(vec![Face::U, Face::D, Face::L, Face::R, Face::F, Face::B]),
        prop::sample::select(vec![Modifier::None, Modifier::Prime, Modifier::Double]),
    )
        .prop_map(|(face, modifier)| MoveToken::new(face, modifier))
}

// ─── Test 1: commands hit calibrated extremes ───────────────────────

#[test]
fn test_commands_use_calibrated_extremes() {
    let config = shipped_config();
    let mut extremes = HashMap::new();
    for (_, arm) in config.arms.iter() {
        extremes.insert(arm.linear_servo, arm.linear);
        extremes.insert(arm.rotational_servo, arm.rotational);
    }

    let mut c = compiler();
    c.reposition_arms(GRIP_SETTLE);
    c.fix();
    c.solution(&parse_move_list("D2 R' D' F2 B D R2 D2 R' F2 D' F2 U' B2 L2 U2 D R2 U").unwrap());
    c.release();

    let steps = c.take_sequence();
    assert!(!steps.is_empty());
    for cmd in steps.iter().filter_map(Step::as_command) {
        let cal = extremes
            .get(&cmd.servo_id)
            .unwrap_or_else(|| panic!("unconfigured servo {}", cmd.servo_id));
        assert!(
            cmd.position == cal.low || cmd.position == cal.high,
            "servo {} commanded to {}",
            cmd.servo_id,
            cmd.position
        );
    }
}

// ─── Test 2: rest pose is preserved ─────────────────────────────────

#[test]
fn test_gripped_pose() {
    let c = gripped();
    assert!(c.is_gripped());
    for (linear, rotational) in pose(&c) {
        assert_eq!(linear, Position::Forward);
        assert_eq!(rotational, Position::Back);
    }
}

proptest! {
    #[test]
    fn solutions_return_to_gripped_pose(moves in prop::collection::vec(move_token(), 0..25)) {
        let mut c = gripped();
        let before = pose(&c);
        let compiled = c.solution(&moves);
        prop_assert_eq!(compiled.len(), moves.len());
        prop_assert_eq!(pose(&c), before);
    }
}

// ─── Test 3: grip and release ───────────────────────────────────────

#[test]
fn test_fix_release_round_trip() {
    let mut c = compiler();
    let start = pose(&c);
    c.fix();
    c.release();
    assert_eq!(pose(&c), start);
    assert!(!c.is_gripped());
}

// ─── Test 4: scan then solve ────────────────────────────────────────

#[test]
fn test_scan_then_solution() {
    let mut c = compiler();
    plan_scan(&mut c, GRIP_SETTLE);
    let scan_steps = c.take_sequence().len();
    assert!(scan_steps > 0);

    let before = pose(&c);
    let compiled = c.solution(&parse_move_list("F R B L").unwrap());
    assert_eq!(compiled.len(), 4);
    assert_eq!(pose(&c), before);
    assert!(!c.steps().is_empty());
}
