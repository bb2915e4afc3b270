//! Mask grids exchanged with the segmenter and the compositor.
//!
//! All grids are row-major `ndarray::Array2` values with shape
//! `(height, width)`, origin at the top-left pixel.

use crate::error::{MaskError, Result};
use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::{Array2, ArrayView2};

/// Per-pixel foreground confidence in [0, 1], one value per pixel
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityMask {
    data: Array2<f32>,
}

impl ProbabilityMask {
    /// Wrap a flat row-major buffer of `width * height` values
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Result<Self> {
        if frame_len(width, height) != Some(data.len()) {
            return Err(MaskError::dimension_mismatch(width, height, data.len()));
        }
        let actual = data.len();
        let data = Array2::from_shape_vec((height, width), data)
            .map_err(|_| MaskError::dimension_mismatch(width, height, actual))?;
        Ok(Self { data })
    }

    pub fn from_array(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// Mask with every pixel set to `value`
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            data: Array2::from_elem((height, width), value),
        }
    }

    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f32,
    {
        Self {
            data: Array2::from_shape_fn((height, width), |(y, x)| f(x, y)),
        }
    }

    /// Read an 8-bit grayscale image, mapping 0..=255 onto 0.0..=1.0
    pub fn from_luma(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self::from_fn(width as usize, height as usize, |x, y| {
            f32::from(image.get_pixel(x as u32, y as u32)[0]) / 255.0
        })
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// (width, height)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.data.get((y, x)).copied()
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }
}

/// Foreground/background classification, one bool per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    data: Array2<bool>,
}

impl BinaryMask {
    /// All-background mask
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: Array2::from_elem((height, width), false),
        }
    }

    pub fn from_array(data: Array2<bool>) -> Self {
        Self { data }
    }

    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> bool,
    {
        Self {
            data: Array2::from_shape_fn((height, width), |(y, x)| f(x, y)),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Total number of pixels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of foreground pixels
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data.get((y, x)).copied().unwrap_or(false)
    }

    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if let Some(pixel) = self.data.get_mut((y, x)) {
            *pixel = value;
        }
    }

    /// Set every pixel to background
    pub fn clear(&mut self) {
        self.data.fill(false);
    }

    /// True when every foreground pixel of `self` is also foreground in `other`
    pub fn is_subset_of(&self, other: &BinaryMask) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(&a, &b)| !a || b)
    }

    pub fn view(&self) -> ArrayView2<'_, bool> {
        self.data.view()
    }
}

/// Refined alpha mask in [0, 1] handed to the compositor
///
/// Values are continuous once temporal smoothing has run, even though the
/// earlier stages are binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Matte {
    data: Array2<f32>,
}

impl Matte {
    /// All-background matte
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            data: Array2::zeros((height, width)),
        }
    }

    pub fn from_binary(mask: &BinaryMask) -> Self {
        Self {
            data: mask.data.mapv(|v| if v { 1.0 } else { 0.0 }),
        }
    }

    pub fn from_array(data: Array2<f32>) -> Self {
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.data.get((y, x)).copied()
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    /// Flatten to row-major order
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    /// True when no pixel carries any foreground weight
    pub fn is_background(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }

    /// Convert to an 8-bit grayscale image
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            Luma([to_byte(self.data[[y as usize, x as usize]])])
        })
    }

    /// Grayscale silhouette for visualization
    pub fn to_rgb(&self) -> RgbImage {
        RgbImage::from_fn(self.width() as u32, self.height() as u32, |x, y| {
            let value = to_byte(self.data[[y as usize, x as usize]]);
            Rgb([value, value, value])
        })
    }

    /// Alpha-blend `foreground` over `background`
    ///
    /// Each channel becomes `mask * fg + (1 - mask) * bg`. Both images must
    /// match the matte dimensions.
    pub fn composite(&self, foreground: &RgbImage, background: &RgbImage) -> Result<RgbImage> {
        let (width, height) = (self.width() as u32, self.height() as u32);
        for image in [foreground, background] {
            if image.dimensions() != (width, height) {
                let (w, h) = image.dimensions();
                return Err(MaskError::dimension_mismatch(
                    self.width(),
                    self.height(),
                    (w as usize) * (h as usize),
                ));
            }
        }

        Ok(RgbImage::from_fn(width, height, |x, y| {
            let alpha = self.data[[y as usize, x as usize]].clamp(0.0, 1.0);
            let fg = foreground.get_pixel(x, y);
            let bg = background.get_pixel(x, y);
            let blend = |c: usize| {
                (alpha * f32::from(fg[c]) + (1.0 - alpha) * f32::from(bg[c]))
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
            Rgb([blend(0), blend(1), blend(2)])
        }))
    }
}

/// Pixel count of a `width` × `height` f32 grid, or `None` if it cannot be allocated
pub(crate) fn frame_len(width: usize, height: usize) -> Option<usize> {
    let len = width.checked_mul(height)?;
    let bytes = len.checked_mul(std::mem::size_of::<f32>())?;
    (bytes <= isize::MAX as usize).then_some(len)
}

fn to_byte(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}
