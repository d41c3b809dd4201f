//! Simulated camera.
//!
//! Produces uniform frames so that a full scan of the simulated robot sees
//! six solid faces, i.e. a solved cube.

use cubot_common::vision::{Camera, CameraError, Frame, Rgb};
use tracing::debug;

/// Face colours in the order the scan routine presents faces to the lens
/// (front, right, back, left, down, up).
const PALETTE: [Rgb; 6] = [
    Rgb::new(20, 160, 60),   // green
    Rgb::new(200, 30, 30),   // red
    Rgb::new(30, 60, 200),   // blue
    Rgb::new(240, 130, 20),  // orange
    Rgb::new(230, 220, 40),  // yellow
    Rgb::new(240, 240, 240), // white
];

/// Camera returning pre-rendered frames in a fixed cycle.
pub struct SimulatedCamera {
    frames: Vec<Frame>,
    next: usize,
}

impl SimulatedCamera {
    /// Camera showing one solid colour per capture, cycling through a
    /// six-colour palette.
    pub fn new(width: u32, height: u32) -> Self {
        let frames = PALETTE
            .iter()
            .map(|&color| Frame::filled(width, height, color))
            .collect();
        Self::scripted(frames)
    }

    /// Camera replaying the given frames in order, wrapping around.
    pub fn scripted(frames: Vec<Frame>) -> Self {
        Self { frames, next: 0 }
    }

    /// Number of captures taken so far.
    pub fn captures(&self) -> usize {
        self.next
    }
}

impl Camera for SimulatedCamera {
    fn capture(&mut self) -> Result<Frame, CameraError> {
        if self.frames.is_empty() {
            return Err(CameraError::CaptureFailed(
                "simulated camera has no frames".to_string(),
            ));
        }
        let frame = self.frames[self.next % self.frames.len()].clone();
        self.next += 1;
        debug!(capture = self.next, "Simulated capture");
        Ok(frame)
    }
}
