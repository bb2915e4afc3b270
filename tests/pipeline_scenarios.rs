use mattefx::{
    BinaryMask, MaskPipeline, MaskSettings, Matte, Phase, PipelineConfig, ProbabilityMask,
    QualityPreset,
};

fn settings_all_off() -> MaskSettings {
    MaskSettings {
        confidence_threshold: 0.5,
        morphology_enabled: false,
        keep_largest_component_only: false,
        min_mask_area_ratio: 0.0,
        temporal_smoothing_enabled: false,
        ..MaskSettings::default()
    }
}

fn all_equal(matte: &Matte, value: f32) -> bool {
    matte.view().iter().all(|&v| v == value)
}

#[test]
fn full_subject_passes_unfiltered() {
    let config = PipelineConfig::new(settings_all_off());
    let mut pipeline = MaskPipeline::new();

    let matte = pipeline.process(&ProbabilityMask::filled(4, 4, 1.0), &config);

    assert_eq!(matte.dimensions(), (4, 4));
    assert!(all_equal(&matte, 1.0));
}

#[test]
fn isolated_pixel_is_dropped_by_component_selection() {
    let config = PipelineConfig::new(MaskSettings {
        keep_largest_component_only: true,
        ..settings_all_off()
    });
    let mask = ProbabilityMask::from_fn(10, 10, |x, y| {
        if (x < 3 && y < 3) || (x == 7 && y == 6) {
            0.9
        } else {
            0.0
        }
    });

    let matte = MaskPipeline::new().process(&mask, &config);

    for y in 0..10 {
        for x in 0..10 {
            let expected = if x < 3 && y < 3 { 1.0 } else { 0.0 };
            assert_eq!(matte.get(x, y), Some(expected), "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn small_foreground_is_gated_out() {
    let config = PipelineConfig::new(MaskSettings {
        min_mask_area_ratio: 0.01,
        ..settings_all_off()
    });
    // 50 of 10_000 pixels: 0.5% coverage
    let mask = ProbabilityMask::from_fn(100, 100, |x, y| if y == 0 && x < 50 { 1.0 } else { 0.0 });

    let refined = MaskPipeline::new().process_frame(&mask, &config);

    assert!(refined.report.gated);
    assert!(refined.matte.is_background());
}

#[test]
fn stable_full_coverage_survives_smoothing() {
    let config = PipelineConfig::new(MaskSettings {
        temporal_smoothing_enabled: true,
        temporal_smoothing_factor: 0.5,
        ..settings_all_off()
    });
    let mut pipeline = MaskPipeline::new();
    let mask = ProbabilityMask::filled(4, 4, 1.0);

    pipeline.process(&mask, &config);
    let second = pipeline.process(&mask, &config);

    assert!(all_equal(&second, 1.0));
}

#[test]
fn frame_size_change_restarts_without_blending() {
    let config = PipelineConfig::new(MaskSettings {
        temporal_smoothing_enabled: true,
        temporal_smoothing_factor: 0.9,
        ..settings_all_off()
    });
    let mut pipeline = MaskPipeline::new();

    pipeline.process(&ProbabilityMask::filled(100, 100, 1.0), &config);
    let refined = pipeline.process_frame(&ProbabilityMask::filled(200, 150, 0.0), &config);

    assert!(refined.report.state_reset);
    assert!(!refined.report.blended);
    assert_eq!(refined.matte.dimensions(), (200, 150));
    assert!(refined.matte.is_background());
    assert_eq!(pipeline.state().phase(), Phase::Ready);
    assert_eq!(pipeline.state().dimensions(), Some((200, 150)));
}

#[test]
fn smoothing_factor_extremes() {
    let frozen = PipelineConfig::new(frozen_settings());
    let snappy = PipelineConfig::new(MaskSettings {
        temporal_smoothing_factor: 0.0,
        ..frozen_settings()
    });

    let mut pipeline = MaskPipeline::new();
    let first = pipeline.process(&ProbabilityMask::filled(3, 3, 1.0), &frozen);
    let held = pipeline.process(&ProbabilityMask::filled(3, 3, 0.0), &frozen);
    assert_eq!(held, first);

    let current = pipeline.process(&ProbabilityMask::filled(3, 3, 0.0), &snappy);
    assert!(all_equal(&current, 0.0));
    assert_eq!(pipeline.state().previous(), Some(&current));
}

fn frozen_settings() -> MaskSettings {
    MaskSettings {
        temporal_smoothing_enabled: true,
        temporal_smoothing_factor: 1.0,
        ..settings_all_off()
    }
}

#[test]
fn degenerate_inputs_yield_background() {
    let config = PipelineConfig::from_preset(QualityPreset::Quality);
    let mut pipeline = MaskPipeline::new();

    assert!(pipeline
        .process(&ProbabilityMask::filled(16, 16, 0.0), &config)
        .is_background());

    let empty = pipeline.process(&ProbabilityMask::filled(0, 0, 0.0), &config);
    assert_eq!(empty.dimensions(), (0, 0));

    let nan = pipeline.process(&ProbabilityMask::filled(8, 8, f32::NAN), &config);
    assert!(nan.is_background());
}

#[test]
fn output_stays_within_unit_interval() {
    let config = PipelineConfig::from_preset(QualityPreset::Quality);
    let mut pipeline = MaskPipeline::new();

    for frame in 0..10usize {
        let mask = ProbabilityMask::from_fn(32, 24, |x, y| {
            let cx = 12 + frame % 4;
            let inside = x.abs_diff(cx) < 8 && y.abs_diff(12) < 9;
            if inside { 0.95 } else if (x + y + frame) % 11 == 0 { 0.7 } else { 0.1 }
        });
        let matte = pipeline.process(&mask, &config);
        assert!(matte.view().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}

#[test]
fn quality_preset_cleans_noisy_subject() {
    let config = PipelineConfig::new(MaskSettings {
        temporal_smoothing_enabled: false,
        ..QualityPreset::Quality.settings()
    });
    // Large subject block, a speckle, and a separate 6x6 "lamp"
    let mask = ProbabilityMask::from_fn(40, 30, |x, y| {
        let subject = (10..26).contains(&x) && (8..30).contains(&y);
        let lamp = (32..38).contains(&x) && (2..8).contains(&y);
        let speckle = x == 3 && y == 3;
        if subject || lamp || speckle { 0.9 } else { 0.2 }
    });

    let refined = MaskPipeline::new().process_frame(&mask, &config);
    let expected = BinaryMask::from_fn(40, 30, |x, y| (10..26).contains(&x) && (8..30).contains(&y));

    // Speckle is opened away; subject and lamp remain as two components
    assert_eq!(refined.report.components, Some(2));
    let kept = BinaryMask::from_fn(40, 30, |x, y| refined.matte.get(x, y) == Some(1.0));
    assert_eq!(kept, expected);
}
