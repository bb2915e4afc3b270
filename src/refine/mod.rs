//! Mask refinement stages and the per-track pipeline that chains them.
//!
//! Data flows: probability mask -> [`threshold`] -> [`morphology`] ->
//! [`components`] -> [`area`] -> [`temporal`] -> matte.

pub mod area;
pub mod components;
pub mod morphology;
mod pipeline;
pub mod temporal;
pub mod threshold;

pub use components::LabelGrid;
pub use pipeline::{refine, FrameReport, MaskPipeline, Phase, PipelineState, Refined};
pub use temporal::TemporalSmoother;
