//! Hardware abstraction layer contracts and configuration.
//!
//! This module contains the servo calibration types and the driver trait
//! implemented by every servo backend.

pub mod config;
pub mod driver;
