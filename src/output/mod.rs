mod png_sequence;

pub use png_sequence::PngSequenceOutput;

use anyhow::Result;
use mattefx::Matte;

/// Trait for refined matte destinations
pub trait OutputSink {
    /// Write one frame's matte
    fn write_frame(&mut self, matte: &Matte) -> Result<()>;

    /// Number of frames written so far
    fn frames_written(&self) -> u64;
}
