//! Phase accumulators and the cosine carrier built on them.
//!
//! A [`Phasor`] holds a phase in turns, `[0.0, 1.0)`, and may run backwards
//! (negative frequency), which rotating encoders rely on. Changing the
//! frequency never resets the phase, so carriers stay continuous.

use core::f32::consts::TAU;
use libm::{cosf, floorf};

/// Phase accumulator in turns.
///
/// ```rust
/// use abc_core::Phasor;
///
/// let mut phasor = Phasor::new(4.0, 1.0);
/// assert_eq!(phasor.advance(), 0.0);
/// assert_eq!(phasor.advance(), 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct Phasor {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample (turns)
    phase_inc: f32,
    /// Sample rate in Hz
    sample_rate: f32,
}

impl Default for Phasor {
    fn default() -> Self {
        Self::new(48000.0, 0.0)
    }
}

impl Phasor {
    /// Create a phasor at the given sample rate and frequency.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz / sample_rate,
            sample_rate,
        }
    }

    /// Set frequency in Hz. Negative values run the phase backwards.
    #[inline]
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.phase_inc * self.sample_rate
    }

    /// Set the phase (wrapped into `[0, 1)`).
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = wrap_turns(phase);
    }

    /// Current phase in turns.
    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Return the current phase, then step it by one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let out = self.phase;
        self.phase += self.phase_inc;
        if self.phase >= 1.0 || self.phase < 0.0 {
            self.phase = wrap_turns(self.phase);
        }
        out
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Update the sample rate, keeping the frequency in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.frequency();
        self.sample_rate = sample_rate;
        self.set_frequency(freq);
    }
}

/// Cosine oscillator: `cos(2π·φ)` over a [`Phasor`].
#[derive(Debug, Clone, Default)]
pub struct CosineOscillator {
    phasor: Phasor,
}

impl CosineOscillator {
    /// Create an oscillator at the given sample rate and frequency.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phasor: Phasor::new(sample_rate, freq_hz),
        }
    }

    /// Set frequency in Hz without touching the phase.
    #[inline]
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phasor.set_frequency(freq_hz);
    }

    /// Next carrier value in [-1, 1].
    #[inline]
    pub fn next(&mut self) -> f32 {
        cosf(TAU * self.phasor.advance())
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phasor.reset();
    }

    /// Update the sample rate, keeping the frequency.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.phasor.set_sample_rate(sample_rate);
    }
}

/// Wrap a phase in turns into `[0, 1)`.
#[inline]
pub fn wrap_turns(phase: f32) -> f32 {
    let wrapped = phase - floorf(phase);
    // floorf can round a tiny negative phase up to exactly 1.0
    if wrapped >= 1.0 { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_accumulation_one_cycle() {
        let mut phasor = Phasor::new(44100.0, 1.0);
        for _ in 0..44100 {
            phasor.advance();
        }
        let phase_error = phasor.phase().min((phasor.phase() - 1.0).abs());
        assert!(phase_error < 0.01);
    }

    #[test]
    fn negative_frequency_wraps_backwards() {
        let mut phasor = Phasor::new(8.0, -1.0);
        phasor.advance();
        let p = phasor.advance();
        assert!((p - 0.875).abs() < 1e-6, "got {p}");
        for _ in 0..100 {
            let p = phasor.advance();
            assert!((0.0..1.0).contains(&p));
        }
    }

    #[test]
    fn frequency_change_keeps_phase() {
        let mut osc = CosineOscillator::new(48000.0, 100.0);
        for _ in 0..123 {
            osc.next();
        }
        let before = osc.phasor.phase();
        osc.set_frequency(300.0);
        assert_eq!(osc.phasor.phase(), before);
    }

    #[test]
    fn cosine_starts_at_one() {
        let mut osc = CosineOscillator::new(48000.0, 440.0);
        assert_eq!(osc.next(), 1.0);
        for _ in 0..1000 {
            let v = osc.next();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn sample_rate_change_keeps_frequency() {
        let mut phasor = Phasor::new(44100.0, 440.0);
        phasor.set_sample_rate(48000.0);
        assert!((phasor.frequency() - 440.0).abs() < 1e-3);
    }
}
