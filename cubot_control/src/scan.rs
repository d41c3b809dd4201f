//! Cube scanning.
//!
//! The scan grips the cube and shows each face to the camera in turn:
//!
//! ```text
//! F  →(towards right)→ R → B → L →(towards right)→ F
//!    →(upwards)→ D →(upwards ×2)→ U →(upwards)→ F
//! ```
//!
//! Every face is sampled in nine regions, the 54 colours are classified into
//! six labels, validated, and handed to the solver as a state string in face
//! order U, R, F, D, L, B.

pub mod classify;
pub mod solver;

pub use classify::{FaceletClassifier, NearestCenterClassifier};
pub use solver::{CubeSolver, ProcessSolver, SolverError};

use crate::bus::percent;
use crate::compiler::{Marker, MotionCompiler};
use crate::executor::Rig;
use crate::moves::{Face, MoveToken};
use crate::session::CancelToken;
use cubot_common::consts::{FACE_COUNT, FACELET_COUNT, FACELETS_PER_FACE};
use cubot_common::vision::{Camera, CameraError, Frame, Rgb, RoiConfig, rotate_grid};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Pause after the initial reposition, letting the servos reach their start
/// angles before gripping.
pub const GRIP_SETTLE: Duration = Duration::from_millis(500);

/// Scan failures. All of them leave the session without a solution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("camera: {0}")]
    Camera(#[from] CameraError),

    #[error("region of interest lies outside the {width}x{height} frame")]
    RoiOutOfFrame { width: u32, height: u32 },

    #[error("face {0} was never captured")]
    MissingFace(Face),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("invalid cube state: {0}")]
    InvalidCubeState(String),

    #[error("solver: {0}")]
    Solver(#[from] SolverError),

    #[error("scan cancelled")]
    Cancelled,
}

/// Collaborators a scan needs besides the rig.
pub struct ScanTools {
    pub camera: Box<dyn Camera>,
    pub classifier: Box<dyn FaceletClassifier>,
    pub solver: Box<dyn CubeSolver>,
}

impl ScanTools {
    pub fn new(
        camera: Box<dyn Camera>,
        classifier: Box<dyn FaceletClassifier>,
        solver: Box<dyn CubeSolver>,
    ) -> Self {
        Self {
            camera,
            classifier,
            solver,
        }
    }
}

/// Compile the full scan: reposition, grip, then every reorientation with a
/// capture marker whenever a new face is in front of the camera.
pub fn plan_scan(compiler: &mut MotionCompiler, settle: Duration) {
    compiler.reposition_arms(settle);
    compiler.fix();
    compiler.append_marker(Marker::Capture(Face::F));

    for face in [Face::R, Face::B, Face::L] {
        compiler.rotate_cube_towards_right();
        compiler.append_marker(Marker::Capture(face));
    }
    compiler.rotate_cube_towards_right();

    compiler.rotate_cube_upwards();
    compiler.append_marker(Marker::Capture(Face::D));
    compiler.rotate_cube_upwards();
    compiler.rotate_cube_upwards();
    compiler.append_marker(Marker::Capture(Face::U));
    compiler.rotate_cube_upwards();
}

/// Mean colour of the nine facelet regions, rotated upright.
pub fn sample_face(frame: &Frame, roi: &RoiConfig) -> Result<[Rgb; FACELETS_PER_FACE], ScanError> {
    let mut samples = [Rgb::default(); FACELETS_PER_FACE];
    for (sample, cell) in samples.iter_mut().zip(roi.cells()) {
        *sample = frame.mean_color(&cell).ok_or(ScanError::RoiOutOfFrame {
            width: frame.width(),
            height: frame.height(),
        })?;
    }
    Ok(rotate_grid(samples, roi.quarter_turns))
}

/// Concatenate six sampled faces into solver face order.
pub fn assemble_facelets(
    faces: &HashMap<Face, [Rgb; FACELETS_PER_FACE]>,
) -> Result<Vec<Rgb>, ScanError> {
    let mut facelets = Vec::with_capacity(FACELET_COUNT);
    for face in Face::SOLVER_ORDER {
        let samples = faces.get(&face).ok_or(ScanError::MissingFace(face))?;
        facelets.extend_from_slice(samples);
    }
    Ok(facelets)
}

/// Check a labelling and turn it into a solver state string.
///
/// Requires six distinct center labels with nine facelets each. Labels are
/// renamed to the letter of the face whose center carries them.
pub fn validate_labels(labels: &[char]) -> Result<String, ScanError> {
    if labels.len() != FACELET_COUNT {
        return Err(ScanError::InvalidCubeState(format!(
            "expected {FACELET_COUNT} labels, got {}",
            labels.len()
        )));
    }

    let mut face_of = HashMap::with_capacity(FACE_COUNT);
    for (k, face) in Face::SOLVER_ORDER.iter().enumerate() {
        let center = labels[k * FACELETS_PER_FACE + 4];
        if face_of.insert(center, face.letter()).is_some() {
            return Err(ScanError::InvalidCubeState(format!(
                "center label '{center}' appears on more than one face"
            )));
        }
    }

    let mut counts: HashMap<char, usize> = HashMap::with_capacity(FACE_COUNT);
    for label in labels {
        *counts.entry(*label).or_default() += 1;
    }
    for (label, count) in &counts {
        if !face_of.contains_key(label) {
            return Err(ScanError::InvalidCubeState(format!(
                "label '{label}' is not a center colour"
            )));
        }
        if *count != FACELETS_PER_FACE {
            return Err(ScanError::InvalidCubeState(format!(
                "label '{label}' covers {count} facelets"
            )));
        }
    }

    // Every label is a center key, checked above.
    Ok(labels.iter().filter_map(|l| face_of.get(l)).collect())
}

/// Run a complete scan on the rig and return the solver's move list.
///
/// `progress` receives the scan percentage while the arms move. It does not
/// reach 100; the caller reports completion.
pub fn scan_cube(
    rig: &mut Rig,
    tools: &mut ScanTools,
    roi: &RoiConfig,
    settle: Duration,
    cancel: &CancelToken,
    mut progress: impl FnMut(u8),
) -> Result<Vec<MoveToken>, ScanError> {
    rig.compiler.reset();
    plan_scan(&mut rig.compiler, settle);

    let mut faces = HashMap::with_capacity(FACE_COUNT);
    let camera = &mut tools.camera;
    let report = rig.run(
        cancel,
        |Marker::Capture(face)| {
            let frame = camera.capture()?;
            let samples = sample_face(&frame, roi)?;
            debug!(%face, "Captured face");
            faces.insert(face, samples);
            Ok::<(), ScanError>(())
        },
        |done, total| progress(percent(done, total).min(99)),
    )?;
    if report.cancelled {
        return Err(ScanError::Cancelled);
    }

    let facelets = assemble_facelets(&faces)?;
    let labels = tools.classifier.classify(&facelets)?;
    let state = validate_labels(&labels)?;
    info!(%state, "Cube state read");

    let moves = tools.solver.solve(&state)?;
    info!(moves = moves.len(), "Solution found");
    Ok(moves)
}

// ─── Tests ──────────────────────────────────────────────────────────
