use super::{area, components, morphology, temporal::TemporalSmoother, threshold};
use crate::config::PipelineConfig;
use crate::error::MaskError;
use crate::mask::{frame_len, Matte, ProbabilityMask};
use ndarray::ArrayView2;

/// Lifecycle phase of a [`PipelineState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No frame seen since creation or the last explicit reset
    Uninitialized,
    /// Frame size known; a previous mask may or may not be held
    Ready,
}

/// State carried from one frame to the next
///
/// Owned by exactly one pipeline (or caller) per video track. Calls that
/// mutate it must be serialized; the type is `Send` but deliberately not
/// shared.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    dimensions: Option<(usize, usize)>,
    smoother: TemporalSmoother,
    frames: u64,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match self.dimensions {
            Some(_) => Phase::Ready,
            None => Phase::Uninitialized,
        }
    }

    /// (width, height) of the frames currently being processed
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.dimensions
    }

    /// Refined output of the previous frame
    pub fn previous(&self) -> Option<&Matte> {
        self.smoother.previous()
    }

    /// Frames processed since the last explicit reset
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Discard everything, returning to [`Phase::Uninitialized`]
    pub fn reset(&mut self) {
        tracing::debug!("Resetting mask pipeline state");
        *self = Self::default();
    }

    /// Adopt the incoming frame size. Returns true if held state was dropped.
    fn prepare(&mut self, dimensions: (usize, usize)) -> bool {
        match self.dimensions {
            Some(current) if current != dimensions => {
                tracing::info!(
                    "Frame size changed from {}x{} to {}x{}, resetting mask state",
                    current.0,
                    current.1,
                    dimensions.0,
                    dimensions.1
                );
                self.smoother.reset();
                self.dimensions = Some(dimensions);
                true
            }
            Some(_) => false,
            None => {
                self.dimensions = Some(dimensions);
                false
            }
        }
    }
}

/// Per-frame diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub width: usize,
    pub height: usize,
    /// Foreground pixels after thresholding
    pub thresholded: usize,
    /// Foreground pixels after opening, if morphology ran
    pub after_morphology: Option<usize>,
    /// Components found, if component selection ran
    pub components: Option<usize>,
    /// Foreground ratio entering the area gate
    pub foreground_ratio: f32,
    /// Area gate cleared the frame
    pub gated: bool,
    /// Output was blended with the previous frame
    pub blended: bool,
    /// Frame size changed and held state was dropped
    pub state_reset: bool,
}

/// Refined matte plus diagnostics for one frame
#[derive(Debug, Clone)]
pub struct Refined {
    pub matte: Matte,
    pub report: FrameReport,
}

/// Run every enabled refinement stage on one frame
///
/// Stages run in a fixed order: threshold, opening, largest component,
/// area gate, temporal smoothing. Threshold and area gate always run.
/// Never fails: degenerate input produces an all-background matte.
pub fn refine(mask: &ProbabilityMask, config: &PipelineConfig, state: &mut PipelineState) -> Refined {
    refine_view(mask.view(), config, state)
}

/// [`refine`] over a borrowed `(height, width)` probability grid
fn refine_view(
    probabilities: ArrayView2<'_, f32>,
    config: &PipelineConfig,
    state: &mut PipelineState,
) -> Refined {
    let _span = tracing::debug_span!("refine_frame", frame = state.frames).entered();

    let (height, width) = probabilities.dim();
    let state_reset = state.prepare((width, height));

    let mut report = FrameReport {
        width,
        height,
        state_reset,
        ..FrameReport::default()
    };

    let mut binary = threshold::threshold_view(probabilities, config.confidence_threshold());
    report.thresholded = binary.count();

    if config.morphology_enabled() {
        binary = morphology::open(&binary, config.kernel_size(), config.kernel_shape());
        report.after_morphology = Some(binary.count());
    }

    if config.keep_largest_component_only() {
        let (kept, count) = components::keep_largest(&binary, config.connectivity());
        report.components = Some(count);
        binary = kept;
    }

    report.foreground_ratio = area::foreground_ratio(&binary);
    report.gated = area::gate(&mut binary, config.min_area_ratio());

    let current = Matte::from_binary(&binary);
    let matte = if config.temporal_smoothing_enabled() {
        report.blended = state.smoother.previous().is_some();
        state.smoother.smooth(current, config.smoothing_factor())
    } else {
        state.smoother.remember(&current);
        current
    };

    state.frames += 1;
    Refined { matte, report }
}

/// Mask refinement pipeline for one video track
///
/// Created when a background effect is enabled and dropped when it is
/// disabled or the track is replaced. `process` is synchronous and must not
/// be called concurrently for the same instance.
#[derive(Debug, Default)]
pub struct MaskPipeline {
    state: PipelineState,
}

impl MaskPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refine one frame's probability mask into a compositing matte
    pub fn process(&mut self, mask: &ProbabilityMask, config: &PipelineConfig) -> Matte {
        self.process_frame(mask, config).matte
    }

    pub fn process_frame(&mut self, mask: &ProbabilityMask, config: &PipelineConfig) -> Refined {
        refine(mask, config, &mut self.state)
    }

    /// Refine a raw row-major buffer straight from the segmenter
    ///
    /// A buffer whose length does not match `width * height` yields an
    /// all-background matte and leaves the carried state untouched.
    pub fn process_raw(
        &mut self,
        data: &[f32],
        width: usize,
        height: usize,
        config: &PipelineConfig,
    ) -> Matte {
        let declared = frame_len(width, height);
        if declared == Some(data.len()) {
            if let Ok(view) = ArrayView2::from_shape((height, width), data) {
                return refine_view(view, config, &mut self.state).matte;
            }
        }

        tracing::warn!(
            "Dropping malformed mask frame: {}",
            MaskError::dimension_mismatch(width, height, data.len())
        );
        match declared {
            Some(_) => Matte::zeros(width, height),
            None => Matte::zeros(0, 0),
        }
    }

    /// Explicit restart, e.g. when the effect is toggled off and on
    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }
}
