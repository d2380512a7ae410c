//! Delay lines for decorrelation and diffusion.
//!
//! # Types
//!
//! - [`InterpolatedDelay`] - Heap-allocated circular buffer with linear
//!   fractional reads
//! - [`OverlappedDelay`] - Feedback delay whose delay time may jump freely:
//!   two windowed read heads take turns latching the new time while their
//!   window is silent
//!
//! [`OverlappedDelay`] writes before it reads, so a delay of `d` samples
//! returns the input from exactly `d` samples ago. The feedback path carries
//! the previous wet sample, which keeps the loop causal at `d = 0`.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f32::consts::PI;
use libm::sinf;

use crate::math::flush_denormal;

/// Variable-length delay line with linear interpolation.
///
/// The buffer is allocated once in [`new`](Self::new) and never reallocated.
///
/// ```rust
/// use abc_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::new(64);
/// delay.write(1.0);
/// delay.write(0.0);
/// assert_eq!(delay.read(1.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl InterpolatedDelay {
    /// Creates a new delay line holding `max_delay_samples` of history.
    ///
    /// # Panics
    ///
    /// Panics if `max_delay_samples` is 0.
    pub fn new(max_delay_samples: usize) -> Self {
        assert!(max_delay_samples > 0, "Delay size must be > 0");

        Self {
            buffer: vec![0.0; max_delay_samples],
            write_pos: 0,
        }
    }

    /// Reads a delayed sample. Fractional delays are linearly interpolated;
    /// delays beyond the capacity are clamped and a non-finite delay reads
    /// the newest sample.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay_samples = if delay_samples.is_finite() { delay_samples } else { 0.0 };
        let delay_clamped = delay_samples.clamp(0.0, (len - 1) as f32);

        let delay_int = delay_clamped as usize;
        let frac = delay_clamped - delay_int as f32;

        let read_pos = (self.write_pos + len - delay_int - 1) % len;
        let next_pos = (read_pos + len - 1) % len;

        let a = self.buffer[read_pos];
        let b = self.buffer[next_pos];
        a + (b - a) * frac
    }

    /// Writes a sample and advances the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Clears the history.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Maximum delay capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

/// Feedback delay line with two cross-faded read heads.
///
/// A window phasor running at `window_hz` drives two heads half a period
/// apart. Head A is weighted by `sin²(π·φ)`, head B by `cos²(π·φ)`, so the
/// weights always sum to one. Each head only picks up a new delay time at
/// the instant its own weight is zero, which hides every discontinuity of a
/// time-varying delay.
///
/// With `window_hz <= 0` the line degrades to a single head following the
/// requested delay directly.
#[derive(Debug, Clone)]
pub struct OverlappedDelay {
    line: InterpolatedDelay,
    sample_rate: f32,
    window_inc: f32,
    window_phase: f32,
    delay_a: f32,
    delay_b: f32,
    last_wet: f32,
}

impl OverlappedDelay {
    /// Create an overlapped delay with `max_delay_samples` of history.
    ///
    /// # Panics
    ///
    /// Panics if `max_delay_samples` is 0.
    pub fn new(max_delay_samples: usize, sample_rate: f32, window_hz: f32) -> Self {
        let mut delay = Self {
            line: InterpolatedDelay::new(max_delay_samples),
            sample_rate,
            window_inc: 0.0,
            window_phase: 0.0,
            delay_a: 0.0,
            delay_b: 0.0,
            last_wet: 0.0,
        };
        delay.set_window_frequency(window_hz);
        delay
    }

    /// Set the window rate in Hz. Clamped below a quarter of the sample rate
    /// so that each head is latched at most once per sample.
    pub fn set_window_frequency(&mut self, window_hz: f32) {
        let max_hz = self.sample_rate * 0.25;
        self.window_inc = if window_hz > 0.0 {
            window_hz.min(max_hz) / self.sample_rate
        } else {
            0.0
        };
    }

    /// Update the sample rate, keeping the window rate in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let window_hz = self.window_inc * self.sample_rate;
        self.sample_rate = sample_rate;
        self.set_window_frequency(window_hz);
    }

    /// Process one sample.
    ///
    /// * `delay_samples` - requested delay; picked up at the next window zero
    /// * `feedback` - amount of the previous wet output written back into
    ///   the line along with `input`
    ///
    /// Returns the wet (delayed) signal. A delay of 0 passes `input` through.
    #[inline]
    pub fn process(&mut self, input: f32, delay_samples: f32, feedback: f32) -> f32 {
        self.line.write(flush_denormal(input + feedback * self.last_wet));

        let wet = if self.window_inc == 0.0 {
            self.delay_a = delay_samples;
            self.line.read(delay_samples)
        } else {
            let s = sinf(PI * self.window_phase);
            let weight_a = s * s;
            let weight_b = 1.0 - weight_a;
            let out = weight_a * self.line.read(self.delay_a)
                + weight_b * self.line.read(self.delay_b);
            self.advance_window(delay_samples);
            out
        };

        self.last_wet = wet;
        wet
    }

    fn advance_window(&mut self, delay_samples: f32) {
        let prev = self.window_phase;
        self.window_phase += self.window_inc;
        if self.window_phase >= 1.0 {
            self.window_phase -= 1.0;
            self.delay_a = delay_samples;
        }
        if prev < 0.5 && self.window_phase >= 0.5 {
            self.delay_b = delay_samples;
        }
    }

    /// Clear the history, rewind the window and return both heads to a
    /// zero delay.
    pub fn reset(&mut self) {
        self.line.clear();
        self.window_phase = 0.0;
        self.delay_a = 0.0;
        self.delay_b = 0.0;
        self.last_wet = 0.0;
    }

    /// Delay times currently used by the two heads.
    pub fn head_delays(&self) -> (f32, f32) {
        (self.delay_a, self.delay_b)
    }

    /// Maximum delay in samples.
    pub fn capacity(&self) -> usize {
        self.line.capacity()
    }
}
