//! Robot configuration loading tests.
//!
//! Tests for `RobotConfig`: full file loading, defaults for optional
//! sections, and semantic validation failures.

use cubot_common::config::{ConfigError, RobotConfig};
use cubot_common::hal::config::ArmSide;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ARMS: &str = r#"
[arms.up]
linear_servo = 0
rotational_servo = 1
linear = { low = 20.0, high = 110.0 }
rotational = { low = 10.0, high = 100.0 }

[arms.right]
linear_servo = 2
rotational_servo = 3
linear = { low = 21.0, high = 117.0 }
rotational = { low = 14.0, high = 120.0 }

[arms.down]
linear_servo = 4
rotational_servo = 5
linear = { low = 22.0, high = 114.0 }
rotational = { low = 15.0, high = 130.0 }

[arms.left]
linear_servo = 6
rotational_servo = 7
linear = { low = 23.0, high = 111.0 }
rotational = { low = 16.0, high = 124.0 }
"#;

/// Write a config file with the given extra sections prepended to the arms.
fn write_config(dir: &Path, head: &str) -> std::path::PathBuf {
    let path = dir.join("cubot.toml");
    let content = format!(
        r#"{head}

[shared]
service_name = "test-cubot"

[camera]
x_offset = 10
y_offset = 20
size = 30
pad = 4
{ARMS}"#
    );
    fs::write(&path, content).unwrap();
    path
}

// ─── Tests ──────────────────────────────────────────────────────────

#[test]
fn load_minimal_config_applies_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "");

    let config = RobotConfig::load_validated(&path).expect("should load");
    assert_eq!(config.driver, "simulation");
    assert_eq!(config.session.poll_interval_ms, 10);
    assert!(!config.session.auto_solve);
    assert_eq!(config.solver.program, "kociemba");
    assert_eq!(config.motion.rotation_speed, 0.004);
    assert_eq!(config.camera.quarter_turns, 0);
    assert_eq!(config.arms.arm(ArmSide::Down).linear_servo, 4);
}

#[test]
fn load_explicit_sections() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(
        tmp.path(),
        r#"driver = "pwm"

[motion]
rotation_speed = 0.0
command_delay = 0.1

[session]
poll_interval_ms = 25
auto_solve = true

[solver]
program = "/usr/local/bin/kociemba"
args = ["--quiet"]"#,
    );

    let config = RobotConfig::load_validated(&path).expect("should load");
    assert_eq!(config.driver, "pwm");
    assert_eq!(config.motion.command_delay, 0.1);
    assert_eq!(config.session.poll_interval_ms, 25);
    assert!(config.session.auto_solve);
    assert_eq!(config.solver.args, vec!["--quiet".to_string()]);
}

#[test]
fn missing_file_reported() {
    let result = RobotConfig::load_validated(Path::new("/nonexistent/cubot.toml"));
    assert_eq!(result.unwrap_err(), ConfigError::FileNotFound);
}

#[test]
fn missing_arm_is_parse_error() {
    let content = r#"
[shared]
service_name = "x"

[camera]
x_offset = 0
y_offset = 0
size = 1
pad = 0

[arms.up]
linear_servo = 0
rotational_servo = 1
linear = { low = 20.0, high = 110.0 }
rotational = { low = 10.0, high = 100.0 }
"#;
    assert!(matches!(
        RobotConfig::from_toml(content),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn zero_poll_interval_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "[session]\npoll_interval_ms = 0");
    let err = RobotConfig::load_validated(&path).unwrap_err();
    assert!(err.to_string().contains("poll_interval_ms"));
}

#[test]
fn shared_servo_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write_config(tmp.path(), "");
    let content = fs::read_to_string(&path)
        .unwrap()
        .replace("linear_servo = 6", "linear_servo = 0");
    fs::write(&path, content).unwrap();

    let err = RobotConfig::load_validated(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

#[test]
fn shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/cubot.toml");
    let config = RobotConfig::load_validated(&path).expect("shipped config should load");
    assert_eq!(config.arms.servo_ids().len(), 8);
}
