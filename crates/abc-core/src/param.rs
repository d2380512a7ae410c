//! Parameter smoothing for click-free control changes.
//!
//! Spatial controls change discretely (a mode selector flips, a rotation
//! speed crosses zero, a decorrelation factor passes a channel threshold).
//! Applying those steps directly to a harmonic field produces audible clicks,
//! so every such control goes through a one-pole smoother.
//!
//! - [`SmoothedParam`] - Exponential (RC-like) smoothing of a scalar
//! - [`SmoothedGate`] - A boolean condition smoothed into a 0..1 weight
//!
//! ## Usage
//!
//! ```rust
//! use abc_core::SmoothedParam;
//!
//! let mut gain = SmoothedParam::with_config(1.0, 48000.0, 10.0);
//!
//! // Set new target - smoothing happens automatically
//! gain.set_target(0.5);
//!
//! for _ in 0..480 { // 10ms at 48kHz
//!     let smoothed_gain = gain.advance();
//!     assert!(smoothed_gain <= 1.0);
//! }
//! ```

use libm::expf;

use crate::math::ms_to_samples;

/// A parameter with built-in one-pole smoothing.
///
/// `y[n] = y[n-1] + coeff * (target - y[n-1])`, with
/// `coeff = 1 - exp(-1 / (tau * sample_rate))`.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    /// Current smoothed value
    current: f32,
    /// Target value we're smoothing towards
    target: f32,
    /// Smoothing coefficient (1 = instant, ~0 = very slow)
    coeff: f32,
    /// Sample rate in Hz
    sample_rate: f32,
    /// Smoothing time in milliseconds
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create a new smoothed parameter with initial value.
    ///
    /// Smoothing is disabled (instant changes) until a sample rate and a
    /// smoothing time are configured.
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a smoothed parameter with full configuration.
    ///
    /// # Arguments
    /// * `initial` - Initial parameter value
    /// * `sample_rate` - Sample rate in Hz
    /// * `smoothing_time_ms` - Smoothing time constant in milliseconds
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Set the target value (parameter will smooth towards this).
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and immediately snap to it (no smoothing).
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update sample rate and recalculate smoothing coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Set smoothing time in milliseconds.
    ///
    /// 0.0 ms disables smoothing.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.smoothing_time_ms = time_ms;
        self.recalculate_coeff();
    }

    /// One-pole coefficient currently in use.
    ///
    /// The largest possible per-sample step of [`advance`](Self::advance) is
    /// `coeff * |target - current|`.
    #[inline]
    pub fn coefficient(&self) -> f32 {
        self.coeff
    }

    /// Get the next smoothed value (advances by one sample).
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Get the current smoothed value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// `coeff = 1 - exp(-1 / (tau * sample_rate))`, or 1.0 when smoothing is off.
    fn recalculate_coeff(&mut self) {
        if self.smoothing_time_ms <= 0.0 || self.sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = ms_to_samples(self.smoothing_time_ms, self.sample_rate);
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A boolean condition smoothed into a continuous weight in [0, 1].
///
/// Used wherever a discrete switch selects between two signal paths: the
/// gate's weight cross-fades them instead of hard switching.
///
/// ```rust
/// use abc_core::SmoothedGate;
///
/// let mut gate = SmoothedGate::new(false, 48000.0, 5.0);
/// let first = gate.advance(true);
/// assert!(first > 0.0 && first < 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct SmoothedGate {
    weight: SmoothedParam,
}

impl SmoothedGate {
    /// Create a gate starting fully open (`true`) or closed (`false`).
    pub fn new(initial: bool, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        Self {
            weight: SmoothedParam::with_config(
                if initial { 1.0 } else { 0.0 },
                sample_rate,
                smoothing_time_ms,
            ),
        }
    }

    /// Feed the current condition and return the smoothed weight.
    #[inline]
    pub fn advance(&mut self, condition: bool) -> f32 {
        self.weight.set_target(if condition { 1.0 } else { 0.0 });
        self.weight.advance()
    }

    /// Current weight without advancing.
    #[inline]
    pub fn weight(&self) -> f32 {
        self.weight.get()
    }

    /// Jump straight to the given state.
    pub fn snap(&mut self, condition: bool) {
        self.weight.set_immediate(if condition { 1.0 } else { 0.0 });
    }

    /// Update the sample rate, keeping the smoothing time.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.weight.set_sample_rate(sample_rate);
    }

    /// Set the smoothing time constant in milliseconds.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.weight.set_smoothing_time_ms(time_ms);
    }

    /// One-pole coefficient of the underlying smoother.
    pub fn coefficient(&self) -> f32 {
        self.weight.coefficient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothed_param_instant_when_no_smoothing() {
        let mut param = SmoothedParam::new(1.0);
        param.set_sample_rate(48000.0);
        param.set_smoothing_time_ms(0.0);

        param.set_target(0.5);
        let val = param.advance();
        assert!((val - 0.5).abs() < 1e-6, "Should snap instantly");
    }

    #[test]
    fn smoothed_param_converges() {
        let mut param = SmoothedParam::with_config(0.0, 48000.0, 10.0);
        param.set_target(1.0);

        // 5x the time constant
        for _ in 0..(48000 * 50 / 1000) {
            param.advance();
        }

        assert!(
            (param.get() - 1.0).abs() < 0.01,
            "Should converge to target, got {}",
            param.get()
        );
    }

    #[test]
    fn smoothed_param_gradual_approach() {
        let mut param = SmoothedParam::with_config(0.0, 48000.0, 10.0);
        param.set_target(1.0);

        let samples_for_time_constant = (48000.0 * 0.010) as usize;
        for _ in 0..samples_for_time_constant {
            param.advance();
        }

        let expected = 1.0 - expf(-1.0);
        assert!(
            (param.get() - expected).abs() < 0.05,
            "After one time constant, expected ~{}, got {}",
            expected,
            param.get()
        );
    }

    #[test]
    fn coefficient_tracks_time_and_rate() {
        let mut param = SmoothedParam::with_config(0.0, 48000.0, 10.0);
        let expected = 1.0 - expf(-1.0 / 480.0);
        assert!((param.coefficient() - expected).abs() < 1e-7);

        param.set_sample_rate(96000.0);
        let expected = 1.0 - expf(-1.0 / 960.0);
        assert!((param.coefficient() - expected).abs() < 1e-7);

        param.set_smoothing_time_ms(0.0);
        assert_eq!(param.coefficient(), 1.0);
    }

    #[test]
    fn step_never_exceeds_coefficient() {
        let mut param = SmoothedParam::with_config(0.0, 48000.0, 10.0);
        param.set_target(1.0);
        let mut prev = param.get();
        for _ in 0..2000 {
            let next = param.advance();
            assert!(next - prev <= param.coefficient() + 1e-7);
            prev = next;
        }
    }

    #[test]
    fn gate_crossfades_between_states() {
        let mut gate = SmoothedGate::new(false, 48000.0, 5.0);
        let mut last = 0.0;
        for _ in 0..4800 {
            last = gate.advance(true);
            assert!((0.0..=1.0).contains(&last));
        }
        assert!(last > 0.99);

        gate.snap(false);
        assert_eq!(gate.weight(), 0.0);
    }
}
