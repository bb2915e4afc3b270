use crate::mask::BinaryMask;

/// Fraction of the frame covered by foreground, 0.0 for an empty frame
pub fn foreground_ratio(mask: &BinaryMask) -> f32 {
    if mask.is_empty() {
        return 0.0;
    }
    mask.count() as f32 / mask.len() as f32
}

/// Clear the mask when foreground covers less than `min_ratio` of the frame
///
/// The bound is inclusive: a ratio exactly equal to `min_ratio` passes.
/// Returns true when the mask was cleared.
pub fn gate(mask: &mut BinaryMask, min_ratio: f32) -> bool {
    let _span = tracing::debug_span!("area_gate").entered();

    let ratio = foreground_ratio(mask);
    if ratio >= min_ratio {
        return false;
    }

    tracing::debug!(
        "Foreground ratio {:.4} below minimum {:.4}, treating frame as empty",
        ratio,
        min_ratio
    );
    mask.clear();
    true
}
