//! # Cubot Control Library
//!
//! Motion compiler and session controller for a four-arm Rubik's cube robot.
//!
//! ## Layers
//!
//! 1. **Arm**: two-axis binary-position model of one gripper arm
//! 2. **MotionCompiler**: cube moves → ordered servo command sequences
//! 3. **Executor**: plays a compiled sequence against a `ServoDriver`
//! 4. **Session**: Rest/Reading/Solving state machine driving scan and
//!    solve workers, fed by the [`bus::MessageBus`]
//!
//! ## Threading
//!
//! One orchestrator thread polls the bus. At most one worker thread owns the
//! arms and the servo driver at any time; ownership moves into the worker at
//! spawn and back to the orchestrator on join.

pub mod arm;
pub mod bus;
pub mod compiler;
pub mod console;
pub mod executor;
pub mod moves;
pub mod scan;
pub mod session;
