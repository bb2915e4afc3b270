use super::OutputSink;
use anyhow::{Context, Result};
use mattefx::Matte;
use std::path::{Path, PathBuf};

/// Writes each matte as an 8-bit grayscale PNG named `matte_NNNNN.png`
pub struct PngSequenceOutput {
    dir: PathBuf,
    frames: u64,
    rgb: bool,
}

impl PngSequenceOutput {
    /// `rgb` writes a 3-channel silhouette instead of single-channel gray
    pub fn new<P: AsRef<Path>>(dir: P, rgb: bool) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        tracing::info!("Writing mattes to {}", dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            frames: 0,
            rgb,
        })
    }

    fn frame_path(&self) -> PathBuf {
        self.dir.join(format!("matte_{:05}.png", self.frames))
    }
}

impl OutputSink for PngSequenceOutput {
    fn write_frame(&mut self, matte: &Matte) -> Result<()> {
        let path = self.frame_path();
        let saved = if self.rgb {
            matte.to_rgb().save(&path)
        } else {
            matte.to_luma().save(&path)
        };
        saved.with_context(|| format!("Failed to write matte {}", path.display()))?;

        self.frames += 1;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mattefx::{BinaryMask, Matte};

    #[test]
    fn test_writes_numbered_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut output = PngSequenceOutput::new(dir.path().join("out"), false).unwrap();
        let matte = Matte::from_binary(&BinaryMask::from_fn(4, 2, |x, _| x < 2));

        output.write_frame(&matte).unwrap();
        output.write_frame(&matte).unwrap();
        assert_eq!(output.frames_written(), 2);

        let written = image::open(dir.path().join("out/matte_00001.png"))
            .unwrap()
            .to_luma8();
        assert_eq!(written.dimensions(), (4, 2));
        assert_eq!(written.get_pixel(0, 0)[0], 255);
        assert_eq!(written.get_pixel(3, 1)[0], 0);
    }
}
