use crate::mask::{BinaryMask, ProbabilityMask};
use ndarray::ArrayView2;

/// Classify each pixel as foreground when its probability is at least `threshold`
///
/// The threshold is clamped to [0, 1]; NaN probabilities count as background.
pub fn threshold(mask: &ProbabilityMask, threshold: f32) -> BinaryMask {
    threshold_view(mask.view(), threshold)
}

/// [`threshold`] over a borrowed `(height, width)` grid
pub fn threshold_view(probabilities: ArrayView2<'_, f32>, threshold: f32) -> BinaryMask {
    let _span = tracing::debug_span!("threshold").entered();

    let cutoff = if threshold.is_nan() {
        1.0
    } else {
        threshold.clamp(0.0, 1.0)
    };

    BinaryMask::from_array(probabilities.mapv(|p| p >= cutoff))
}
