use crate::mask::Matte;
use ndarray::Zip;

/// Low-pass filter across frames to suppress mask flicker
///
/// Output is `factor * previous + (1 - factor) * current`. The blended output
/// (not the raw input) becomes the next frame's `previous`, so smoothing
/// compounds across frames.
#[derive(Debug, Clone, Default)]
pub struct TemporalSmoother {
    previous: Option<Matte>,
}

impl TemporalSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask the next frame will be blended against
    pub fn previous(&self) -> Option<&Matte> {
        self.previous.as_ref()
    }

    /// Forget the previous frame
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Blend `current` with the previous output and remember the result
    ///
    /// On the first frame, or if the previous mask has other dimensions,
    /// `current` passes through unchanged.
    pub fn smooth(&mut self, current: Matte, factor: f32) -> Matte {
        let _span = tracing::debug_span!("temporal").entered();

        let output = match &self.previous {
            Some(previous) if previous.dimensions() == current.dimensions() => {
                Matte::from_array(
                    Zip::from(current.view())
                        .and(previous.view())
                        .map_collect(|&c, &p| factor * p + (1.0 - factor) * c),
                )
            }
            Some(previous) => {
                tracing::debug!(
                    "Previous mask is {:?}, current is {:?}; not blending",
                    previous.dimensions(),
                    current.dimensions()
                );
                current
            }
            None => current,
        };

        self.previous = Some(output.clone());
        output
    }

    /// Record `output` as the previous frame without blending
    pub fn remember(&mut self, output: &Matte) {
        self.previous = Some(output.clone());
    }
}
