//! Cubot Common Library
//!
//! Shared constants, configuration loading and hardware contracts for all
//! cubot workspace crates.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading trait and the robot configuration
//! - [`consts`] - System-wide limits and defaults
//! - [`hal`] - Servo calibration types and the `ServoDriver` contract
//! - [`vision`] - Frames, regions of interest and the `Camera` contract
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use cubot_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
pub mod vision;
