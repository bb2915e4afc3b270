//! Error types for the mask boundary layers
//!
//! The per-frame refinement path never returns these. They only surface
//! when building masks from raw buffers, loading settings, or doing image I/O.

use thiserror::Error;

/// Result type alias for mask operations
pub type Result<T> = std::result::Result<T, MaskError>;

#[derive(Error, Debug)]
pub enum MaskError {
    /// Raw buffer length does not match the declared frame size
    #[error("buffer holds {actual} values, expected {width}x{height} = {expected}")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Settings document could not be parsed
    #[error("Settings parse error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl MaskError {
    pub fn invalid_settings<S: Into<String>>(msg: S) -> Self {
        Self::InvalidSettings(msg.into())
    }

    pub(crate) fn dimension_mismatch(width: usize, height: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            width,
            height,
            expected: width.checked_mul(height).unwrap_or(usize::MAX),
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_message() {
        let err = MaskError::dimension_mismatch(4, 3, 10);
        assert_eq!(
            err.to_string(),
            "buffer holds 10 values, expected 4x3 = 12"
        );
    }

    #[test]
    fn dimension_mismatch_overflow_saturates() {
        let err = MaskError::dimension_mismatch(usize::MAX, 2, 0);
        assert!(matches!(
            err,
            MaskError::DimensionMismatch {
                expected: usize::MAX,
                ..
            }
        ));
    }

    #[test]
    fn json_errors_convert() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: MaskError = parse.unwrap_err().into();
        assert!(matches!(err, MaskError::Settings(_)));
    }
}
