//! # Cubot Controller Binary
//!
//! Runs the session orchestrator against the configured servo driver and
//! takes operator commands on standard input. Progress snapshots are
//! printed to standard output as JSON lines; logs go to standard error.
//! Closing standard input leaves the controller running until Ctrl-C.
//!
//! # Usage
//!
//! ```bash
//! # Simulated robot with the default configuration
//! cubot_control
//!
//! # Specific configuration file and driver
//! cubot_control --config /etc/cubot/cubot.toml --driver simulation
//!
//! # Verbose JSON logs
//! cubot_control -v --json
//! ```

#![deny(warnings)]

use clap::Parser;
use crossbeam_channel::unbounded;
use cubot_common::prelude::*;
use cubot_control::bus::{ControlEvent, MessageBus};
use cubot_control::console::{ConsoleCommand, ConsoleLines, HELP};
use cubot_control::scan::{NearestCenterClassifier, ProcessSolver, ScanTools};
use cubot_control::session::Orchestrator;
use cubot_hal::{DriverRegistry, SimulatedCamera};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Resolution of the simulated camera.
const CAMERA_WIDTH: u32 = 640;
const CAMERA_HEIGHT: u32 = 480;

/// Cubot controller - scan and solve sessions for a four-arm cube robot
#[derive(Parser, Debug)]
#[command(name = "cubot_control")]
#[command(version)]
#[command(about = "Scan and solve sessions for a four-arm Rubik's cube robot")]
#[command(long_about = None)]
struct Args {
    /// Path to the robot configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Servo driver, overriding the configuration file
    #[arg(short, long)]
    driver: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Cubot controller failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let loaded = load_config(&args.config, args.driver.as_deref());

    let level = loaded
        .as_ref()
        .map(|c| c.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    info!("Cubot controller v{} starting...", env!("CARGO_PKG_VERSION"));
    let config = loaded?;
    info!(
        service = %config.shared.service_name,
        driver = %config.driver,
        "Loaded configuration from {}",
        args.config.display()
    );

    let registry = DriverRegistry::with_builtin();
    let driver = registry.create_driver(&config.driver)?;
    let tools = ScanTools::new(
        Box::new(SimulatedCamera::new(CAMERA_WIDTH, CAMERA_HEIGHT)),
        Box::new(NearestCenterClassifier),
        Box::new(ProcessSolver::new(&config.solver)),
    );
    let poll = config.session.poll_interval();

    let bus = Arc::new(MessageBus::new());
    let orchestrator = Orchestrator::new(Arc::clone(&bus), config, driver, tools)?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })?;
    }

    let session = {
        let running = Arc::clone(&running);
        thread::Builder::new()
            .name("cubot-session".to_string())
            .spawn(move || orchestrator.run(&running))?
    };

    let progress = bus.progress.subscribe();
    thread::Builder::new()
        .name("cubot-progress".to_string())
        .spawn(move || {
            for record in progress.iter() {
                match serde_json::to_string(&record) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!("Failed to encode progress: {e}"),
                }
            }
        })?;

    // Standard input blocks, so lines are forwarded from their own thread
    // and the main loop stays responsive to Ctrl-C.
    let (line_tx, line_rx) = unbounded();
    thread::Builder::new()
        .name("cubot-console".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        })?;

    let mut console = ConsoleLines::new(line_rx);
    while running.load(Ordering::SeqCst) && !session.is_finished() {
        let Some(line) = console.next_line(poll) else {
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Control(event)) => bus.control.publish(event),
            Ok(ConsoleCommand::Jog(jog)) => bus.jog.publish(jog),
            Ok(ConsoleCommand::Reload) => match load_config(&args.config, args.driver.as_deref()) {
                Ok(config) => {
                    info!("Configuration reloaded from {}", args.config.display());
                    bus.config.publish(config);
                }
                Err(e) => warn!("Reload failed: {e}"),
            },
            Ok(ConsoleCommand::Help) => eprintln!("{HELP}"),
            Ok(ConsoleCommand::Quit) => {
                bus.control.publish(ControlEvent::Shutdown);
                break;
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    session
        .join()
        .map_err(|_| "session thread panicked")?;
    info!("Cubot controller shutdown complete");
    Ok(())
}

/// Load and validate the configuration, applying the CLI driver override.
fn load_config(
    path: &Path,
    driver: Option<&str>,
) -> Result<RobotConfig, ConfigError> {
    let mut config = RobotConfig::load_validated(path)?;
    if let Some(driver) = driver {
        config.driver = driver.to_string();
    }
    Ok(config)
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
