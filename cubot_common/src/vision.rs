//! Camera contract and image sampling types.
//!
//! The robot photographs one cube face at a time. Each face is sampled in
//! nine square regions of interest laid out on a grid:
//!
//! ```text
//! x = x_offset + col * (size + pad)
//! y = y_offset + row * (size + pad)
//! ```
//!
//! Capture itself is delegated to a [`Camera`] implementation.

use crate::config::ConfigError;
use crate::consts::FACELETS_PER_FACE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image capture.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CameraError {
    /// The device did not deliver an image.
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// Pixel buffer does not match the declared dimensions.
    #[error("Invalid frame: expected {expected} bytes, got {actual}")]
    InvalidFrame { expected: usize, actual: usize },
}

/// An 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Squared euclidean distance in RGB space.
    #[inline]
    pub fn distance_sq(&self, other: &Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Camera calibration: where the nine facelets of the visible face are.
///
/// # TOML Example
///
/// ```toml
/// [camera]
/// x_offset = 120
/// y_offset = 40
/// size = 60
/// pad = 20
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiConfig {
    /// Left edge of the top-left cell.
    pub x_offset: u32,
    /// Top edge of the top-left cell.
    pub y_offset: u32,
    /// Side length of one cell.
    pub size: u32,
    /// Gap between neighbouring cells.
    pub pad: u32,
    /// Clockwise quarter turns that bring a captured grid upright.
    #[serde(default)]
    pub quarter_turns: u8,
}

impl RoiConfig {
    /// Region of the cell at `row`, `col` (both 0..3).
    pub fn cell(&self, row: u32, col: u32) -> Roi {
        let stride = self.size + self.pad;
        Roi {
            x: self.x_offset + col * stride,
            y: self.y_offset + row * stride,
            width: self.size,
            height: self.size,
        }
    }

    /// All nine cells in row-major order.
    pub fn cells(&self) -> [Roi; FACELETS_PER_FACE] {
        std::array::from_fn(|i| self.cell(i as u32 / 3, i as u32 % 3))
    }

    /// Validate the camera calibration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::ValidationError(
                "camera.size must be greater than 0".to_string(),
            ));
        }
        if self.quarter_turns > 3 {
            return Err(ConfigError::ValidationError(format!(
                "camera.quarter_turns must be 0..=3, got {}",
                self.quarter_turns
            )));
        }
        Ok(())
    }
}

/// A captured RGB8 image, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// Wrap a raw RGB8 buffer.
    ///
    /// # Errors
    /// `CameraError::InvalidFrame` if the buffer length is not `width * height * 3`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CameraError> {
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(CameraError::InvalidFrame {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A frame of one solid colour.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let pixels = [color.r, color.g, color.b].repeat(width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Colour at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        Some(Rgb::new(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
        ))
    }

    /// Paint a rectangle, clipped to the frame.
    pub fn fill(&mut self, roi: &Roi, color: Rgb) {
        let x_end = roi.x.saturating_add(roi.width).min(self.width);
        let y_end = roi.y.saturating_add(roi.height).min(self.height);
        for y in roi.y..y_end {
            for x in roi.x..x_end {
                let idx = (y as usize * self.width as usize + x as usize) * 3;
                self.pixels[idx] = color.r;
                self.pixels[idx + 1] = color.g;
                self.pixels[idx + 2] = color.b;
            }
        }
    }

    /// Mean colour of a rectangle, clipped to the frame.
    ///
    /// Returns `None` if the rectangle lies entirely outside the frame.
    pub fn mean_color(&self, roi: &Roi) -> Option<Rgb> {
        let x_end = roi.x.saturating_add(roi.width).min(self.width);
        let y_end = roi.y.saturating_add(roi.height).min(self.height);
        if roi.x >= x_end || roi.y >= y_end {
            return None;
        }

        let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
        for y in roi.y..y_end {
            for x in roi.x..x_end {
                let idx = (y as usize * self.width as usize + x as usize) * 3;
                r += self.pixels[idx] as u64;
                g += self.pixels[idx + 1] as u64;
                b += self.pixels[idx + 2] as u64;
            }
        }
        let n = (x_end - roi.x) as u64 * (y_end - roi.y) as u64;
        Some(Rgb::new((r / n) as u8, (g / n) as u8, (b / n) as u8))
    }
}

/// Rotate a row-major 3×3 grid clockwise by `quarter_turns`.
pub fn rotate_grid<T: Copy>(grid: [T; FACELETS_PER_FACE], quarter_turns: u8) -> [T; FACELETS_PER_FACE] {
    let mut out = grid;
    for _ in 0..quarter_turns % 4 {
        let prev = out;
        // Clockwise: new[row][col] = old[2 - col][row]
        out = std::array::from_fn(|i| {
            let (row, col) = (i / 3, i % 3);
            prev[(2 - col) * 3 + row]
        });
    }
    out
}

/// Source of cube face images.
pub trait Camera: Send {
    /// Capture one image of the face currently in front of the lens.
    fn capture(&mut self) -> Result<Frame, CameraError>;
}
