use super::MaskSource;
use anyhow::{bail, Context, Result};
use mattefx::ProbabilityMask;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Grayscale mask images read one per frame, in order
pub struct ImageSequence {
    frames: VecDeque<PathBuf>,
}

impl ImageSequence {
    pub fn new(frames: Vec<PathBuf>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Expand directories into their image files, sorted by name
    pub fn from_inputs(inputs: &[PathBuf]) -> Result<Self> {
        let mut frames = Vec::new();
        for input in inputs {
            if input.is_dir() {
                frames.extend(Self::list_dir(input)?);
            } else {
                frames.push(input.clone());
            }
        }

        if frames.is_empty() {
            bail!("No mask images found in inputs");
        }

        tracing::info!("Found {} mask frames", frames.len());
        Ok(Self::new(frames))
    }

    fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut frames = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?
        {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if path.is_file() && is_image {
                frames.push(path);
            }
        }
        frames.sort();
        Ok(frames)
    }
}

impl MaskSource for ImageSequence {
    fn capture_frame(&mut self) -> Result<Option<ProbabilityMask>> {
        let Some(path) = self.frames.pop_front() else {
            return Ok(None);
        };

        let _span = tracing::debug_span!("capture", path = %path.display()).entered();
        let image = image::open(&path)
            .with_context(|| format!("Failed to open mask image {}", path.display()))?
            .to_luma8();

        Ok(Some(ProbabilityMask::from_luma(&image)))
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.frames.len())
    }
}
