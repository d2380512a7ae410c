//! Spatial diffusion: per-channel decorrelation of a circular field.
//!
//! Every one of the `P = 2n + 1` channels owns a voice, either an
//! overlapped feedback delay or a ring modulator, whose setting is spread
//! over the field by a [`Distribution`] curve. A single `factor` in `[0, 1]`
//! opens the channels one by one, starting from the highest:
//!
//! ```text
//! τ(i)  = (P - i - 1) / P
//! env1  = smooth(factor > τ(i))
//! out_i = wet_i · env1 + x_i · (1 - env1)
//! ```
//!
//! In [`DiffusionSource::Syn`] the engine takes a mono input, copies it to
//! every channel and rescales each output so the omni channel hands its
//! energy over to the higher channels as `factor` grows.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use abc_core::{CosineOscillator, FrameProcessor, OverlappedDelay, SmoothedGate, crossfade};
use libm::sqrtf;

use crate::easing::Distribution;
use crate::error::{SpatialError, SpatialResult, check_sample_rate};
use crate::order::AmbisonicOrder;

/// Default time constant of the per-channel gates, in milliseconds.
pub const DEFAULT_GATE_SMOOTHING_MS: f32 = 50.0;

/// Largest accepted feedback amount.
pub const MAX_FEEDBACK: f32 = 0.99;

/// What the engine is fed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiffusionSource {
    /// An encoded field of `2n + 1` channels.
    #[default]
    Fx,
    /// A mono signal, spread over the field by the engine itself.
    Syn,
}

/// Per-channel processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiffusionKind {
    /// Time-varying feedback delay.
    #[default]
    Delay,
    /// Ring modulation by a cosine carrier.
    RingMod,
}

/// Construction parameters of a [`DiffusionEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionConfig {
    /// Order of the circular field.
    pub order: AmbisonicOrder,
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Field or mono input.
    pub source: DiffusionSource,
    /// Delay or ring modulation.
    pub kind: DiffusionKind,
    /// Curve spreading delay times / carrier frequencies over the channels.
    pub distribution: Distribution,
    /// Diffusion amount in `[0, 1]`.
    pub factor: f32,
    /// Longest delay, reached by the last channel at `factor = 1`.
    pub max_delay_samples: usize,
    /// Delay feedback in `[0, 0.99]`.
    pub feedback: f32,
    /// Rate at which the delay heads may pick up a new delay time.
    /// Zero or below reads the requested delay directly.
    pub window_frequency_hz: f32,
    /// Carrier frequency of the last channel.
    pub mod_frequency_hz: f32,
    /// Time constant of the per-channel gates.
    pub gate_time_ms: f32,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            order: AmbisonicOrder::default(),
            sample_rate: 48000.0,
            source: DiffusionSource::Fx,
            kind: DiffusionKind::Delay,
            distribution: Distribution::Linear,
            factor: 0.0,
            max_delay_samples: 4800,
            feedback: 0.0,
            window_frequency_hz: 20.0,
            mod_frequency_hz: 100.0,
            gate_time_ms: DEFAULT_GATE_SMOOTHING_MS,
        }
    }
}

/// Opening threshold of channel `i` of `p`: `(p - i - 1) / p`.
#[inline]
pub fn channel_threshold(i: usize, p: usize) -> f32 {
    (p - i - 1) as f32 / p as f32
}

/// Ring-modulation depth of channel `i`: `clamp((factor - τ(i)) · p, 0, 1)`.
#[inline]
pub fn ring_depth(factor: f32, i: usize, p: usize) -> f32 {
    ((factor - channel_threshold(i, p)) * p as f32).clamp(0.0, 1.0)
}

/// Output scaling of channel `i` in [`DiffusionSource::Syn`].
///
/// ```text
/// env2(0)     = sqrt(P) · (1 - (P - sqrt(P)) · min(factor, 1/P))
/// env2(i > 0) = P · min(factor, 1/P)
/// ```
#[inline]
pub fn syn_compensation(factor: f32, i: usize, p: usize) -> f32 {
    let pf = p as f32;
    let f = factor.min(1.0 / pf);
    if i == 0 {
        let root = sqrtf(pf);
        root * (1.0 - (pf - root) * f)
    } else {
        pf * f
    }
}

#[derive(Debug, Clone)]
enum Voice {
    Delay(OverlappedDelay),
    RingMod(CosineOscillator),
}

#[derive(Debug, Clone)]
struct Channel {
    voice: Voice,
    gate: SmoothedGate,
    threshold: f32,
    /// Distribution curve at this channel.
    spread: f32,
}

/// Per-channel delay / ring-modulation diffuser.
///
/// ```rust
/// use abc_core::FrameProcessor;
/// use abc_spatial::{DiffusionConfig, DiffusionEngine};
///
/// let mut engine = DiffusionEngine::new(DiffusionConfig::default()).unwrap();
/// let mut out = [0.0; 3];
/// engine.process_frame(&[0.5, 0.25, -0.25], &mut out);
/// assert_eq!(out, [0.5, 0.25, -0.25]);
/// ```
#[derive(Debug, Clone)]
pub struct DiffusionEngine {
    source: DiffusionSource,
    kind: DiffusionKind,
    distribution: Distribution,
    factor: f32,
    feedback: f32,
    max_delay: f32,
    mod_frequency_hz: f32,
    channels: Vec<Channel>,
}

impl DiffusionEngine {
    /// Build an engine, allocating one delay line or oscillator per channel.
    pub fn new(config: DiffusionConfig) -> SpatialResult<Self> {
        let sample_rate = check_sample_rate(config.sample_rate)?;
        if config.max_delay_samples == 0 && config.kind == DiffusionKind::Delay {
            return Err(SpatialError::InvalidDelay);
        }
        let p = config.order.circular_channels();
        let factor = clamp_unit(config.factor);

        let channels = (0..p)
            .map(|i| {
                let threshold = channel_threshold(i, p);
                let voice = match config.kind {
                    DiffusionKind::Delay => Voice::Delay(OverlappedDelay::new(
                        config.max_delay_samples + 1,
                        sample_rate,
                        config.window_frequency_hz,
                    )),
                    DiffusionKind::RingMod => {
                        Voice::RingMod(CosineOscillator::new(sample_rate, 0.0))
                    }
                };
                Channel {
                    voice,
                    gate: SmoothedGate::new(
                        factor > threshold,
                        sample_rate,
                        config.gate_time_ms,
                    ),
                    threshold,
                    spread: config.distribution.at(i, p),
                }
            })
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            order = config.order.get(),
            source = ?config.source,
            kind = ?config.kind,
            distribution = config.distribution.name(),
            "diffusion engine"
        );

        let mut engine = Self {
            source: config.source,
            kind: config.kind,
            distribution: config.distribution,
            factor,
            feedback: 0.0,
            max_delay: config.max_delay_samples as f32,
            mod_frequency_hz: config.mod_frequency_hz,
            channels,
        };
        engine.set_feedback(config.feedback);
        engine.set_mod_frequency(config.mod_frequency_hz);
        Ok(engine)
    }

    /// Number of field channels, `2n + 1`.
    pub fn field_channels(&self) -> usize {
        self.channels.len()
    }

    /// Input kind.
    pub fn source(&self) -> DiffusionSource {
        self.source
    }

    /// Voice kind.
    pub fn kind(&self) -> DiffusionKind {
        self.kind
    }

    /// Diffusion amount, clamped to `[0, 1]`.
    pub fn set_factor(&mut self, factor: f32) {
        self.factor = clamp_unit(factor);
    }

    /// Current diffusion amount.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Delay feedback, clamped to `[0, 0.99]`.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = if feedback.is_nan() {
            0.0
        } else {
            feedback.clamp(0.0, MAX_FEEDBACK)
        };
    }

    /// Current feedback.
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Longest delay in samples, clamped to the allocated capacity. NaN
    /// sets a zero delay.
    pub fn set_max_delay_samples(&mut self, samples: f32) {
        let capacity = self
            .channels
            .iter()
            .find_map(|c| match &c.voice {
                Voice::Delay(d) => Some((d.capacity() - 1) as f32),
                Voice::RingMod(_) => None,
            })
            .unwrap_or(0.0);
        self.max_delay = if samples.is_nan() {
            0.0
        } else {
            samples.clamp(0.0, capacity)
        };
    }

    /// Current longest delay in samples.
    pub fn max_delay_samples(&self) -> f32 {
        self.max_delay
    }

    /// Carrier frequency of the last channel in Hz.
    pub fn set_mod_frequency(&mut self, freq_hz: f32) {
        self.mod_frequency_hz = freq_hz;
        for ch in &mut self.channels {
            if let Voice::RingMod(osc) = &mut ch.voice {
                osc.set_frequency(freq_hz * ch.spread);
            }
        }
    }

    /// Current carrier frequency of the last channel.
    pub fn mod_frequency(&self) -> f32 {
        self.mod_frequency_hz
    }

    /// Change the distribution curve.
    pub fn set_distribution(&mut self, distribution: Distribution) {
        self.distribution = distribution;
        let p = self.channels.len();
        for (i, ch) in self.channels.iter_mut().enumerate() {
            ch.spread = distribution.at(i, p);
        }
        self.set_mod_frequency(self.mod_frequency_hz);
    }

    /// Current distribution curve.
    pub fn distribution(&self) -> Distribution {
        self.distribution
    }

    /// Rate at which the delay heads latch new delay times.
    pub fn set_window_frequency(&mut self, window_hz: f32) {
        for ch in &mut self.channels {
            if let Voice::Delay(d) = &mut ch.voice {
                d.set_window_frequency(window_hz);
            }
        }
    }

    /// Time constant of the per-channel gates.
    pub fn set_gate_time_ms(&mut self, time_ms: f32) {
        for ch in &mut self.channels {
            ch.gate.set_smoothing_time_ms(time_ms);
        }
    }

    /// Current gate weight of every channel.
    pub fn gate_weights(&self, out: &mut [f32]) {
        for (o, ch) in out.iter_mut().zip(&self.channels) {
            *o = ch.gate.weight();
        }
    }

    #[inline]
    fn process_channel(&mut self, i: usize, x: f32) -> f32 {
        let p = self.channels.len();
        let factor = self.factor;
        let feedback = self.feedback;
        let max_delay = self.max_delay;
        let ch = &mut self.channels[i];
        let env1 = ch.gate.advance(factor > ch.threshold);
        let wet = match &mut ch.voice {
            Voice::Delay(line) => line.process(x, factor * max_delay * ch.spread, feedback),
            Voice::RingMod(osc) => {
                let depth = ring_depth(factor, i, p);
                x * (1.0 - depth + depth * osc.next())
            }
        };
        crossfade(x, wet, env1)
    }
}

#[inline]
fn clamp_unit(x: f32) -> f32 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

impl FrameProcessor for DiffusionEngine {
    fn input_channels(&self) -> usize {
        match self.source {
            DiffusionSource::Fx => self.channels.len(),
            DiffusionSource::Syn => 1,
        }
    }

    fn output_channels(&self) -> usize {
        self.channels.len()
    }

    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        let p = self.channels.len();
        match self.source {
            DiffusionSource::Fx => {
                for i in 0..p {
                    output[i] = self.process_channel(i, input[i]);
                }
            }
            DiffusionSource::Syn => {
                let x = input[0];
                let factor = self.factor;
                for i in 0..p {
                    output[i] = self.process_channel(i, x) * syn_compensation(factor, i, p);
                }
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        for ch in &mut self.channels {
            ch.gate.set_sample_rate(sample_rate);
            match &mut ch.voice {
                Voice::Delay(d) => d.set_sample_rate(sample_rate),
                Voice::RingMod(osc) => osc.set_sample_rate(sample_rate),
            }
        }
    }

    fn reset(&mut self) {
        let factor = self.factor;
        for ch in &mut self.channels {
            ch.gate.snap(factor > ch.threshold);
            match &mut ch.voice {
                Voice::Delay(d) => d.reset(),
                Voice::RingMod(osc) => osc.reset(),
            }
        }
    }
}
