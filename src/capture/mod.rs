mod image_sequence;

pub use image_sequence::ImageSequence;

use anyhow::Result;
use mattefx::ProbabilityMask;

/// Trait for per-frame probability mask sources
pub trait MaskSource {
    /// Read the next frame's mask, or `None` once the source is exhausted
    fn capture_frame(&mut self) -> Result<Option<ProbabilityMask>>;

    /// Frames not yet delivered, if known
    fn remaining(&self) -> Option<usize> {
        None
    }
}
