//! Real-time person-mask refinement for background effects.
//!
//! Turns the noisy per-frame probability mask of a segmentation model into a
//! stable alpha matte suitable for background blur or replacement.

pub mod config;
pub mod error;
pub mod mask;
pub mod refine;

pub use config::{Connectivity, KernelShape, MaskSettings, PipelineConfig, QualityPreset};
pub use error::{MaskError, Result};
pub use mask::{BinaryMask, Matte, ProbabilityMask};
pub use refine::{refine, FrameReport, MaskPipeline, Phase, PipelineState, Refined};
