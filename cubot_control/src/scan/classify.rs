//! Facelet colour classification.

use super::ScanError;
use crate::moves::Face;
use cubot_common::consts::{FACELETS_PER_FACE, FACELET_COUNT};
use cubot_common::vision::Rgb;

/// Groups 54 sampled colours into six labels.
pub trait FaceletClassifier: Send {
    /// Label every facelet. `facelets` is in solver face order, nine per
    /// face in row-major order.
    ///
    /// Labels are arbitrary characters; facelets of one colour must share a
    /// label.
    fn classify(&self, facelets: &[Rgb]) -> Result<Vec<char>, ScanError>;
}

/// Labels each facelet with the face whose center colour is nearest.
///
/// Centers never move on a cube, so the six center facelets define the six
/// colours. Two centers of the same colour both map to the first face, which
/// later fails validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestCenterClassifier;

impl FaceletClassifier for NearestCenterClassifier {
    fn classify(&self, facelets: &[Rgb]) -> Result<Vec<char>, ScanError> {
        if facelets.len() != FACELET_COUNT {
            return Err(ScanError::Classification(format!(
                "expected {FACELET_COUNT} facelets, got {}",
                facelets.len()
            )));
        }

        let centers: Vec<(Rgb, char)> = Face::SOLVER_ORDER
            .iter()
            .enumerate()
            .map(|(k, face)| (facelets[k * FACELETS_PER_FACE + 4], face.letter()))
            .collect();

        Ok(facelets
            .iter()
            .map(|color| {
                centers
                    .iter()
                    .min_by_key(|(center, _)| center.distance_sq(color))
                    .map_or('?', |&(_, label)| label)
            })
            .collect())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
