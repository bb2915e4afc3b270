//! Mask refinement settings and the sanitized per-session configuration.

use crate::error::{MaskError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Neighborhood used by erosion and dilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelShape {
    /// Full k×k square
    #[default]
    Square,
    /// Plus-shaped: the center row and center column of the k×k square
    Cross,
}

/// Pixel adjacency used when labeling connected components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Horizontal and vertical neighbors only
    #[default]
    Four,
    /// Diagonal neighbors as well
    Eight,
}

/// Named quality presets offered to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    /// Threshold, area gate and light smoothing only
    Performance,
    #[default]
    Balanced,
    Quality,
}

impl QualityPreset {
    pub fn settings(self) -> MaskSettings {
        match self {
            QualityPreset::Performance => MaskSettings {
                confidence_threshold: 0.5,
                morphology_enabled: false,
                morphology_kernel_size: 3,
                keep_largest_component_only: false,
                min_mask_area_ratio: 0.005,
                temporal_smoothing_enabled: true,
                temporal_smoothing_factor: 0.3,
                ..MaskSettings::default()
            },
            QualityPreset::Balanced => MaskSettings::default(),
            QualityPreset::Quality => MaskSettings {
                confidence_threshold: 0.6,
                morphology_enabled: true,
                morphology_kernel_size: 5,
                keep_largest_component_only: true,
                min_mask_area_ratio: 0.01,
                temporal_smoothing_enabled: true,
                temporal_smoothing_factor: 0.6,
                ..MaskSettings::default()
            },
        }
    }
}

impl std::str::FromStr for QualityPreset {
    type Err = MaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "performance" => Ok(QualityPreset::Performance),
            "balanced" => Ok(QualityPreset::Balanced),
            "quality" => Ok(QualityPreset::Quality),
            other => Err(MaskError::invalid_settings(format!(
                "unknown quality preset '{}'",
                other
            ))),
        }
    }
}

/// Raw settings record as supplied by presets or user settings
///
/// Field names follow the external settings surface (camelCase in JSON).
/// Values are not validated here; see [`PipelineConfig::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaskSettings {
    pub confidence_threshold: f32,
    pub morphology_enabled: bool,
    pub morphology_kernel_size: i32,
    pub morphology_shape: KernelShape,
    pub keep_largest_component_only: bool,
    pub component_connectivity: Connectivity,
    pub min_mask_area_ratio: f32,
    pub temporal_smoothing_enabled: bool,
    pub temporal_smoothing_factor: f32,
}

impl Default for MaskSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            morphology_enabled: true,
            morphology_kernel_size: 3,
            morphology_shape: KernelShape::Square,
            keep_largest_component_only: true,
            component_connectivity: Connectivity::Four,
            min_mask_area_ratio: 0.01,
            temporal_smoothing_enabled: true,
            temporal_smoothing_factor: 0.5,
        }
    }
}

impl MaskSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading mask settings from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Sanitized, immutable configuration for one pipeline session
///
/// Built once from [`MaskSettings`]; the refinement stages trust these
/// values and do not re-validate per frame. Swap configurations between
/// frames by passing a different instance to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    confidence_threshold: f32,
    morphology_enabled: bool,
    kernel_size: usize,
    kernel_shape: KernelShape,
    keep_largest_component_only: bool,
    connectivity: Connectivity,
    min_area_ratio: f32,
    temporal_smoothing_enabled: bool,
    smoothing_factor: f32,
}

impl PipelineConfig {
    /// Sanitize raw settings
    ///
    /// Ratios are clamped to [0, 1] (NaN falls back to the default), and the
    /// kernel size is forced odd and at least 3.
    pub fn new(settings: MaskSettings) -> Self {
        let defaults = MaskSettings::default();

        let config = Self {
            confidence_threshold: unit_interval(
                settings.confidence_threshold,
                defaults.confidence_threshold,
            ),
            morphology_enabled: settings.morphology_enabled,
            kernel_size: odd_kernel(settings.morphology_kernel_size),
            kernel_shape: settings.morphology_shape,
            keep_largest_component_only: settings.keep_largest_component_only,
            connectivity: settings.component_connectivity,
            min_area_ratio: unit_interval(
                settings.min_mask_area_ratio,
                defaults.min_mask_area_ratio,
            ),
            temporal_smoothing_enabled: settings.temporal_smoothing_enabled,
            smoothing_factor: unit_interval(
                settings.temporal_smoothing_factor,
                defaults.temporal_smoothing_factor,
            ),
        };

        if config.kernel_size as i64 != i64::from(settings.morphology_kernel_size) {
            tracing::warn!(
                "Morphology kernel size {} adjusted to {}",
                settings.morphology_kernel_size,
                config.kernel_size
            );
        }

        config
    }

    pub fn from_preset(preset: QualityPreset) -> Self {
        Self::new(preset.settings())
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn morphology_enabled(&self) -> bool {
        self.morphology_enabled
    }

    /// Odd kernel side length, at least 3
    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    pub fn kernel_shape(&self) -> KernelShape {
        self.kernel_shape
    }

    pub fn keep_largest_component_only(&self) -> bool {
        self.keep_largest_component_only
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn min_area_ratio(&self) -> f32 {
        self.min_area_ratio
    }

    pub fn temporal_smoothing_enabled(&self) -> bool {
        self.temporal_smoothing_enabled
    }

    /// Weight of the previous frame in the temporal blend
    pub fn smoothing_factor(&self) -> f32 {
        self.smoothing_factor
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(MaskSettings::default())
    }
}

impl From<MaskSettings> for PipelineConfig {
    fn from(settings: MaskSettings) -> Self {
        Self::new(settings)
    }
}

fn unit_interval(value: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn odd_kernel(size: i32) -> usize {
    let size = size.max(3) as usize;
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamps_ratios() {
        let config = PipelineConfig::new(MaskSettings {
            confidence_threshold: 1.7,
            min_mask_area_ratio: -0.2,
            temporal_smoothing_factor: f32::NAN,
            ..MaskSettings::default()
        });

        assert_eq!(config.confidence_threshold(), 1.0);
        assert_eq!(config.min_area_ratio(), 0.0);
        assert_eq!(config.smoothing_factor(), 0.5);
    }

    #[test]
    fn test_kernel_size_forced_odd() {
        let kernel = |k| {
            PipelineConfig::new(MaskSettings {
                morphology_kernel_size: k,
                ..MaskSettings::default()
            })
            .kernel_size()
        };

        assert_eq!(kernel(3), 3);
        assert_eq!(kernel(4), 5);
        assert_eq!(kernel(7), 7);
        assert_eq!(kernel(1), 3);
        assert_eq!(kernel(-5), 3);
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = r#"{
            "confidenceThreshold": 0.7,
            "morphologyEnabled": false,
            "morphologyKernelSize": 5,
            "keepLargestComponentOnly": false,
            "minMaskAreaRatio": 0.02,
            "temporalSmoothingEnabled": true,
            "temporalSmoothingFactor": 0.25
        }"#;
        let settings = MaskSettings::from_json_str(json).unwrap();

        assert_eq!(settings.confidence_threshold, 0.7);
        assert!(!settings.morphology_enabled);
        assert_eq!(settings.morphology_kernel_size, 5);
        assert!(!settings.keep_largest_component_only);
        assert_eq!(settings.min_mask_area_ratio, 0.02);
        assert_eq!(settings.temporal_smoothing_factor, 0.25);
        // Omitted fields take defaults
        assert_eq!(settings.morphology_shape, KernelShape::Square);
        assert_eq!(settings.component_connectivity, Connectivity::Four);
    }

    #[test]
    fn test_json_enum_fields() {
        let json = r#"{ "morphologyShape": "cross", "componentConnectivity": "eight" }"#;
        let settings = MaskSettings::from_json_str(json).unwrap();

        assert_eq!(settings.morphology_shape, KernelShape::Cross);
        assert_eq!(settings.component_connectivity, Connectivity::Eight);
    }

    #[test]
    fn test_json_file_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mask.json");
        let settings = QualityPreset::Quality.settings();
        std::fs::write(&path, serde_json::to_string(&settings).unwrap()).unwrap();

        assert_eq!(MaskSettings::from_json_file(&path).unwrap(), settings);
        assert!(matches!(
            MaskSettings::from_json_file(dir.path().join("missing.json")),
            Err(MaskError::Io(_))
        ));
    }

    #[test]
    fn test_performance_preset_disables_heavy_stages() {
        let config = PipelineConfig::from_preset(QualityPreset::Performance);
        assert!(!config.morphology_enabled());
        assert!(!config.keep_largest_component_only());
        assert!(config.temporal_smoothing_enabled());
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("Quality".parse::<QualityPreset>().unwrap(), QualityPreset::Quality);
        assert!("ultra".parse::<QualityPreset>().is_err());
    }
}
