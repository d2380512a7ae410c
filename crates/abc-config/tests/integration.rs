//! Integration tests for abc-config.
//!
//! Rig files all the way to running processors: TOML in, validated rig,
//! built decoder and diffusion stage chained behind an encoder.

use abc_config::{ConfigError, RigConfig, ValidationError, factory_rigs, get_factory_rig};
use abc_core::{FrameProcessor, FrameProcessorExt};
use abc_spatial::{CircularEncoder, OptimMode};

#[test]
fn rig_toml_drives_full_chain() {
    let rig = RigConfig::from_toml(
        r#"
        name = "Studio"
        order = 2
        optimization = "max_re"

        [layout]
        angles = [45.0, 135.0, 225.0, 315.0, 0.0]

        [diffusion]
        kind = "delay"
        factor = 0.4
        feedback = 0.2
        max_delay_samples = 480
        "#,
    )
    .unwrap();

    let order = rig.ambisonic_order().unwrap();
    let mut chain = CircularEncoder::new(order, 0.0)
        .chain(rig.build_diffusion().unwrap())
        .chain(rig.build_decoder().unwrap());
    assert_eq!(chain.input_channels(), 1);
    assert_eq!(chain.output_channels(), 5);

    let mut feeds = [0.0; 5];
    let mut energy = [0.0f32; 5];
    for n in 0..4800 {
        let x = if n == 0 { 1.0 } else { 0.0 };
        chain.process_frame(&[x], &mut feeds);
        for (e, f) in energy.iter_mut().zip(&feeds) {
            assert!(f.is_finite());
            *e += f * f;
        }
    }
    // Speaker at 0° listed last.
    let loudest = energy
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i);
    assert_eq!(loudest, Some(4), "{energy:?}");
}

#[test]
fn every_factory_rig_round_trips() {
    for rig in factory_rigs() {
        let text = rig.to_toml().unwrap();
        let back = RigConfig::from_toml(&text).unwrap();
        assert_eq!(back, rig, "{}", rig.name);
    }
}

#[test]
fn optimizer_mode_follows_rig() {
    let rig = get_factory_rig("octagon").unwrap();
    assert_eq!(rig.optim_mode().unwrap(), OptimMode::InPhase);
    let opt = rig.build_optimizer().unwrap();
    assert_eq!(opt.mode(), OptimMode::InPhase);
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = RigConfig::from_toml("order = \"three\"").unwrap_err();
    assert!(matches!(err, ConfigError::TomlParse(_)));
}

#[test]
fn validation_reports_every_problem() {
    let rig = RigConfig::from_toml(
        r#"
        order = 17
        sample_rate = 0
        optimization = "loud"

        [layout]
        angles = [10.0]
        direction = 2
        "#,
    )
    .unwrap();
    match rig.validate() {
        Err(ValidationError::Multiple(errors)) => {
            assert_eq!(errors.len(), 5, "{errors:?}");
        }
        other => panic!("expected multiple errors, got {other:?}"),
    }
    assert!(matches!(
        rig.build_decoder(),
        Err(ConfigError::Validation(ValidationError::Multiple(_)))
    ));
}
