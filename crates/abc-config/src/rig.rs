//! Rig description: order, loudspeaker layout, optimizer and diffusion.

use abc_spatial::{
    AmbisonicOrder, DiffusionConfig, DiffusionEngine, DiffusionKind, DiffusionSource, Dimension,
    Direction, Distribution, FieldOptimizer, FieldRotator, GeneralDecoder, OptimMode,
    circular::DEFAULT_ROTATION_SMOOTHING_MS, diffusion::DEFAULT_GATE_SMOOTHING_MS,
    diffusion::MAX_FEEDBACK, optimizer::DEFAULT_OPTIM_SMOOTHING_MS,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::validation::{Problems, ValidationError, ValidationResult};

/// A complete spatial rig.
///
/// Everything needed to build the decoder, optimizer and diffusion engine of
/// one installation. Every field has a default, so a rig file only lists
/// what differs.
///
/// # TOML Format
///
/// ```toml
/// name = "ITU 5.0"
/// order = 3
/// sample_rate = 48000
/// optimization = "max_re"
///
/// [layout]
/// angles = [-30.0, 0.0, 30.0, 110.0, 250.0]
/// direction = 1
/// shift = 0.0
///
/// [diffusion]
/// kind = "delay"
/// distribution = "cubic_out"
/// factor = 0.5
/// feedback = 0.3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RigConfig {
    /// Name of the rig.
    #[serde(default = "default_name")]
    pub name: String,

    /// Optional description of the rig.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Ambisonic order.
    #[serde(default = "default_order")]
    pub order: usize,

    /// `"planar"` or `"spherical"`.
    #[serde(default = "default_dimension")]
    pub dimension: String,

    /// Sample rate in Hz.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Optimizer mode: `"basic"`, `"max_re"` or `"in_phase"`.
    #[serde(default = "default_optimization")]
    pub optimization: String,

    /// Time constant of the optimizer mode cross-fade.
    #[serde(default = "default_optim_smoothing_ms")]
    pub optim_smoothing_ms: f32,

    /// Time constant of the static-angle fallback of rotations.
    #[serde(default = "default_rotation_smoothing_ms")]
    pub rotation_smoothing_ms: f32,

    /// Loudspeaker layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutConfig>,

    /// Diffusion settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diffusion: Option<DiffusionSettings>,
}

/// Loudspeaker ring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    /// Loudspeaker azimuths in degrees.
    pub angles: Vec<f32>,

    /// `1` lays the virtual ring out counter-clockwise, `-1` clockwise.
    #[serde(default = "default_direction")]
    pub direction: i64,

    /// Rotation of the virtual ring in degrees.
    #[serde(default)]
    pub shift: f32,
}

/// Diffusion engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffusionSettings {
    /// `"fx"` (field input) or `"syn"` (mono input).
    #[serde(default = "default_source")]
    pub source: String,

    /// `"delay"` or `"ring_mod"`.
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Distribution curve name, e.g. `"linear"` or `"cubic_out"`.
    #[serde(default = "default_distribution")]
    pub distribution: String,

    /// Diffusion amount in `[0, 1]`.
    #[serde(default)]
    pub factor: f32,

    /// Longest delay in samples.
    #[serde(default = "default_max_delay_samples")]
    pub max_delay_samples: usize,

    /// Delay feedback in `[0, 0.99]`.
    #[serde(default)]
    pub feedback: f32,

    /// Delay-time pick-up rate; zero or below reads directly.
    #[serde(default = "default_window_hz")]
    pub window_hz: f32,

    /// Carrier frequency of the last channel in Hz.
    #[serde(default = "default_mod_frequency_hz")]
    pub mod_frequency_hz: f32,

    /// Time constant of the per-channel gates.
    #[serde(default = "default_gate_ms")]
    pub gate_ms: f32,
}

fn default_name() -> String {
    "Untitled".to_string()
}

fn default_order() -> usize {
    1
}

fn default_dimension() -> String {
    "planar".to_string()
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_optimization() -> String {
    OptimMode::Basic.name().to_string()
}

fn default_optim_smoothing_ms() -> f32 {
    DEFAULT_OPTIM_SMOOTHING_MS
}

fn default_rotation_smoothing_ms() -> f32 {
    DEFAULT_ROTATION_SMOOTHING_MS
}

fn default_direction() -> i64 {
    1
}

fn default_source() -> String {
    "fx".to_string()
}

fn default_kind() -> String {
    "delay".to_string()
}

fn default_distribution() -> String {
    Distribution::Linear.name().to_string()
}

fn default_max_delay_samples() -> usize {
    4800
}

fn default_window_hz() -> f32 {
    20.0
}

fn default_mod_frequency_hz() -> f32 {
    100.0
}

fn default_gate_ms() -> f32 {
    DEFAULT_GATE_SMOOTHING_MS
}

/// Parse a dimension name.
pub fn parse_dimension(name: &str) -> Option<Dimension> {
    match name {
        "planar" | "2d" => Some(Dimension::Planar),
        "spherical" | "3d" => Some(Dimension::Spherical),
        _ => None,
    }
}

/// Parse a diffusion source name.
pub fn parse_source(name: &str) -> Option<DiffusionSource> {
    match name {
        "fx" => Some(DiffusionSource::Fx),
        "syn" => Some(DiffusionSource::Syn),
        _ => None,
    }
}

/// Parse a diffusion kind name.
pub fn parse_kind(name: &str) -> Option<DiffusionKind> {
    match name {
        "delay" => Some(DiffusionKind::Delay),
        "ring_mod" | "ringmod" => Some(DiffusionKind::RingMod),
        _ => None,
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            angles: vec![0.0, 90.0, 180.0, 270.0],
            direction: default_direction(),
            shift: 0.0,
        }
    }
}

impl Default for DiffusionSettings {
    fn default() -> Self {
        Self {
            source: default_source(),
            kind: default_kind(),
            distribution: default_distribution(),
            factor: 0.0,
            max_delay_samples: default_max_delay_samples(),
            feedback: 0.0,
            window_hz: default_window_hz(),
            mod_frequency_hz: default_mod_frequency_hz(),
            gate_ms: default_gate_ms(),
        }
    }
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: None,
            order: default_order(),
            dimension: default_dimension(),
            sample_rate: default_sample_rate(),
            optimization: default_optimization(),
            optim_smoothing_ms: default_optim_smoothing_ms(),
            rotation_smoothing_ms: default_rotation_smoothing_ms(),
            layout: None,
            diffusion: None,
        }
    }
}

impl RigConfig {
    /// Create a rig with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the ambisonic order.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Set the loudspeaker layout.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Set the diffusion settings.
    pub fn with_diffusion(mut self, diffusion: DiffusionSettings) -> Self {
        self.diffusion = Some(diffusion);
        self
    }

    /// Load a rig from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the rig to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field, reporting all problems together.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut p = Problems::default();

        p.range("order", self.order as f64, 0.0, AmbisonicOrder::MAX as f64);
        if self.sample_rate == 0 {
            p.push(ValidationError::invalid("sample_rate", 0, "must be positive"));
        }
        let dimension = parse_dimension(&self.dimension);
        if dimension.is_none() {
            p.push(ValidationError::invalid(
                "dimension",
                &self.dimension,
                "expected planar or spherical",
            ));
        }
        if OptimMode::from_name(&self.optimization).is_none() {
            p.push(ValidationError::invalid(
                "optimization",
                &self.optimization,
                "expected basic, max_re or in_phase",
            ));
        }
        p.range("optim_smoothing_ms", f64::from(self.optim_smoothing_ms), 0.0, 10_000.0);
        p.range(
            "rotation_smoothing_ms",
            f64::from(self.rotation_smoothing_ms),
            0.0,
            10_000.0,
        );

        if let Some(layout) = &self.layout {
            validate_layout(layout, &mut p);
        }
        if let Some(diffusion) = &self.diffusion {
            if dimension == Some(Dimension::Spherical) {
                p.push(ValidationError::invalid(
                    "diffusion",
                    &self.dimension,
                    "diffusion runs on planar fields only",
                ));
            }
            validate_diffusion(diffusion, &mut p);
        }

        p.finish()
    }

    /// Validated ambisonic order.
    pub fn ambisonic_order(&self) -> Result<AmbisonicOrder, ConfigError> {
        Ok(AmbisonicOrder::new(self.order)?)
    }

    /// Validated field dimension.
    pub fn field_dimension(&self) -> Result<Dimension, ConfigError> {
        parse_dimension(&self.dimension).ok_or_else(|| {
            ValidationError::invalid("dimension", &self.dimension, "expected planar or spherical")
                .into()
        })
    }

    /// Validated optimizer mode.
    pub fn optim_mode(&self) -> Result<OptimMode, ConfigError> {
        OptimMode::from_name(&self.optimization).ok_or_else(|| {
            ValidationError::invalid(
                "optimization",
                &self.optimization,
                "expected basic, max_re or in_phase",
            )
            .into()
        })
    }

    /// Build the loudspeaker decoder: a stereo fold-down for two speakers,
    /// otherwise an optimized irregular decoder.
    pub fn build_decoder(&self) -> Result<GeneralDecoder, ConfigError> {
        self.validate()?;
        let layout = self.layout.as_ref().ok_or(ConfigError::MissingSection("layout"))?;
        let direction = Direction::try_from(layout.direction)?;
        let mut decoder = GeneralDecoder::new(
            self.ambisonic_order()?,
            &layout.angles,
            direction,
            layout.shift,
            self.optim_mode()?,
            self.sample_rate as f32,
        )?;
        decoder.set_smoothing_time_ms(self.optim_smoothing_ms);

        tracing::debug!(rig = %self.name, stereo = decoder.is_stereo(), "decoder built");
        Ok(decoder)
    }

    /// Build a stand-alone field optimizer for the rig's dimension.
    pub fn build_optimizer(&self) -> Result<FieldOptimizer, ConfigError> {
        self.validate()?;
        let mut optimizer = FieldOptimizer::new(
            self.ambisonic_order()?,
            self.field_dimension()?,
            self.optim_mode()?,
            self.sample_rate as f32,
        )?;
        optimizer.set_smoothing_time_ms(self.optim_smoothing_ms);
        Ok(optimizer)
    }

    /// Build a yaw rotator spinning at `speed` turns per second, falling back
    /// to `static_angle` radians when stopped.
    pub fn build_rotator(&self, speed: f32, static_angle: f32) -> Result<FieldRotator, ConfigError> {
        self.validate()?;
        let mut rotator = FieldRotator::new(
            self.ambisonic_order()?,
            self.field_dimension()?,
            self.sample_rate as f32,
            speed,
            static_angle,
        )?;
        rotator.set_smoothing_time_ms(self.rotation_smoothing_ms);
        Ok(rotator)
    }

    /// Build the diffusion engine described by the `[diffusion]` section.
    pub fn build_diffusion(&self) -> Result<DiffusionEngine, ConfigError> {
        self.validate()?;
        let d = self
            .diffusion
            .as_ref()
            .ok_or(ConfigError::MissingSection("diffusion"))?;
        let config = d.to_engine_config(self.ambisonic_order()?, self.sample_rate as f32)?;
        let engine = DiffusionEngine::new(config)?;

        tracing::debug!(rig = %self.name, kind = %d.kind, source = %d.source, "diffusion built");
        Ok(engine)
    }
}

impl DiffusionSettings {
    /// Engine configuration for a field of `order` at `sample_rate`.
    pub fn to_engine_config(
        &self,
        order: AmbisonicOrder,
        sample_rate: f32,
    ) -> Result<DiffusionConfig, ConfigError> {
        let source = parse_source(&self.source).ok_or_else(|| {
            ValidationError::invalid("diffusion.source", &self.source, "expected fx or syn")
        })?;
        let kind = parse_kind(&self.kind).ok_or_else(|| {
            ValidationError::invalid("diffusion.kind", &self.kind, "expected delay or ring_mod")
        })?;
        let distribution = Distribution::from_name(&self.distribution).ok_or_else(|| {
            ValidationError::invalid(
                "diffusion.distribution",
                &self.distribution,
                "unknown distribution curve",
            )
        })?;
        Ok(DiffusionConfig {
            order,
            sample_rate,
            source,
            kind,
            distribution,
            factor: self.factor,
            max_delay_samples: self.max_delay_samples,
            feedback: self.feedback,
            window_frequency_hz: self.window_hz,
            mod_frequency_hz: self.mod_frequency_hz,
            gate_time_ms: self.gate_ms,
        })
    }
}

fn validate_layout(layout: &LayoutConfig, p: &mut Problems) {
    if layout.angles.len() < 2 {
        p.push(ValidationError::invalid(
            "layout.angles",
            format!("{:?}", layout.angles),
            "needs at least two loudspeakers",
        ));
    }
    for (i, a) in layout.angles.iter().enumerate() {
        p.finite(&format!("layout.angles[{i}]"), f64::from(*a));
    }
    if Direction::try_from(layout.direction).is_err() {
        p.push(ValidationError::invalid(
            "layout.direction",
            layout.direction,
            "expected 1 or -1",
        ));
    }
    p.finite("layout.shift", f64::from(layout.shift));
}

fn validate_diffusion(d: &DiffusionSettings, p: &mut Problems) {
    if parse_source(&d.source).is_none() {
        p.push(ValidationError::invalid("diffusion.source", &d.source, "expected fx or syn"));
    }
    let kind = parse_kind(&d.kind);
    if kind.is_none() {
        p.push(ValidationError::invalid(
            "diffusion.kind",
            &d.kind,
            "expected delay or ring_mod",
        ));
    }
    if Distribution::from_name(&d.distribution).is_none() {
        p.push(ValidationError::invalid(
            "diffusion.distribution",
            &d.distribution,
            "unknown distribution curve",
        ));
    }
    p.range("diffusion.factor", f64::from(d.factor), 0.0, 1.0);
    p.range("diffusion.feedback", f64::from(d.feedback), 0.0, f64::from(MAX_FEEDBACK));
    if kind == Some(DiffusionKind::Delay) && d.max_delay_samples == 0 {
        p.push(ValidationError::invalid(
            "diffusion.max_delay_samples",
            0,
            "delay diffusion needs at least one sample",
        ));
    }
    p.finite("diffusion.window_hz", f64::from(d.window_hz));
    p.finite("diffusion.mod_frequency_hz", f64::from(d.mod_frequency_hz));
    p.range("diffusion.gate_ms", f64::from(d.gate_ms), 0.0, 10_000.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use abc_core::FrameProcessor;

    fn quad() -> RigConfig {
        RigConfig::new("Quad").with_layout(LayoutConfig::default())
    }

    #[test]
    fn defaults_from_empty_toml() {
        let rig = RigConfig::from_toml("").unwrap();
        assert_eq!(rig, RigConfig::default());
        assert_eq!(rig.order, 1);
        assert_eq!(rig.sample_rate, 48000);
        assert_eq!(rig.optimization, "basic");
        assert!(rig.layout.is_none());
        assert!(rig.diffusion.is_none());
    }

    #[test]
    fn parses_documented_format() {
        let rig = RigConfig::from_toml(
            r#"
            name = "ITU 5.0"
            order = 3
            optimization = "max_re"

            [layout]
            angles = [-30.0, 0.0, 30.0, 110.0, 250.0]

            [diffusion]
            kind = "ring_mod"
            distribution = "cubic_out"
            factor = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(rig.order, 3);
        let layout = rig.layout.as_ref().unwrap();
        assert_eq!(layout.angles.len(), 5);
        assert_eq!(layout.direction, 1);
        let d = rig.diffusion.as_ref().unwrap();
        assert_eq!(d.kind, "ring_mod");
        assert_eq!(d.gate_ms, DEFAULT_GATE_SMOOTHING_MS);
        assert!(rig.validate().is_ok());
    }

    #[test]
    fn toml_round_trip() {
        let rig = quad()
            .with_order(2)
            .with_diffusion(DiffusionSettings {
                factor: 0.25,
                feedback: 0.5,
                ..DiffusionSettings::default()
            });
        let text = rig.to_toml().unwrap();
        let back = RigConfig::from_toml(&text).unwrap();
        assert_eq!(back, rig);
    }

    #[test]
    fn rejects_unknown_field_values() {
        let mut rig = quad();
        rig.dimension = "cubic".to_string();
        let err = rig.validate().unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { ref field, .. } if field == "dimension"));
    }

    #[test]
    fn collects_every_layout_problem() {
        let rig = RigConfig::new("broken").with_layout(LayoutConfig {
            angles: vec![f32::NAN],
            direction: 0,
            shift: f32::INFINITY,
        });
        let err = rig.validate().unwrap_err();
        // too few speakers, NaN angle, bad direction, infinite shift
        assert_eq!(err.count(), 4, "{err}");
    }

    #[test]
    fn diffusion_ranges_are_checked() {
        let rig = quad().with_diffusion(DiffusionSettings {
            factor: 1.5,
            feedback: 1.0,
            max_delay_samples: 0,
            distribution: "wobbly".to_string(),
            ..DiffusionSettings::default()
        });
        assert_eq!(rig.validate().unwrap_err().count(), 4);
    }

    #[test]
    fn spherical_diffusion_is_rejected() {
        let mut rig = RigConfig::default().with_diffusion(DiffusionSettings::default());
        rig.dimension = "spherical".to_string();
        assert!(rig.validate().is_err());
    }

    #[test]
    fn builds_quad_decoder() {
        let mut decoder = quad().build_decoder().unwrap();
        assert!(!decoder.is_stereo());
        assert_eq!(decoder.output_channels(), 4);
        let mut feeds = [0.0; 4];
        decoder.process_frame(&[1.0, 1.0, 0.0], &mut feeds);
        assert!((feeds[0] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn two_speakers_build_stereo_fold() {
        let rig = RigConfig::new("stereo").with_layout(LayoutConfig {
            angles: vec![30.0, -30.0],
            ..LayoutConfig::default()
        });
        assert!(rig.build_decoder().unwrap().is_stereo());
    }

    #[test]
    fn decoder_needs_layout() {
        let err = RigConfig::default().build_decoder().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("layout")));
    }

    #[test]
    fn invalid_rig_does_not_build() {
        let err = quad().with_order(99).build_decoder().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn builds_spherical_optimizer() {
        let mut rig = RigConfig::default().with_order(2);
        rig.dimension = "spherical".to_string();
        rig.optimization = "in_phase".to_string();
        let opt = rig.build_optimizer().unwrap();
        assert_eq!(opt.input_channels(), 9);
        assert_eq!(opt.mode(), OptimMode::InPhase);
    }

    #[test]
    fn builds_rotator_for_dimension() {
        let mut rig = RigConfig::default().with_order(3);
        let planar = rig.build_rotator(0.0, 1.0).unwrap();
        assert_eq!(planar.output_channels(), 7);
        rig.dimension = "spherical".to_string();
        let spherical = rig.build_rotator(0.5, 0.0).unwrap();
        assert_eq!(spherical.output_channels(), 16);
        assert_eq!(spherical.speed(), 0.5);
    }

    #[test]
    fn builds_diffusion_engine() {
        let rig = quad().with_order(3).with_diffusion(DiffusionSettings {
            source: "syn".to_string(),
            kind: "ring_mod".to_string(),
            factor: 1.0,
            ..DiffusionSettings::default()
        });
        let engine = rig.build_diffusion().unwrap();
        assert_eq!(engine.input_channels(), 1);
        assert_eq!(engine.output_channels(), 7);
        assert_eq!(engine.kind(), DiffusionKind::RingMod);
        assert_eq!(engine.factor(), 1.0);
    }

    #[test]
    fn diffusion_needs_section() {
        let err = quad().build_diffusion().unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection("diffusion")));
    }

    #[test]
    fn name_parsers() {
        assert_eq!(parse_dimension("3d"), Some(Dimension::Spherical));
        assert_eq!(parse_source("syn"), Some(DiffusionSource::Syn));
        assert_eq!(parse_kind("ringmod"), Some(DiffusionKind::RingMod));
        assert_eq!(parse_kind("chorus"), None);
    }
}
