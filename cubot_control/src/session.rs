//! Scan and solve sessions.
//!
//! - [`machine`] - Rest/Reading/Solving transition table
//! - [`orchestrator`] - Poll loop driving the machine from the message bus
//! - [`cancel`] - Cooperative cancellation token for workers

pub mod cancel;
pub mod machine;
pub mod orchestrator;

pub use cancel::CancelToken;
pub use machine::{SessionMachine, SessionState, Trigger, TransitionResult};
pub use orchestrator::{Orchestrator, SessionError};
