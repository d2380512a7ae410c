//! Circular (2D) harmonic encoding and regular-array decoding.
//!
//! A circular field of order `n` has `2n + 1` channels: channel 0 is the
//! omnidirectional component and channels `2k - 1`, `2k` hold the cosine
//! and sine of degree `k`.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use abc_core::{FrameProcessor, Phasor, SmoothedGate, crossfade};
use core::f32::consts::TAU;
use libm::{cosf, sinf};

use crate::error::{SpatialError, SpatialResult, check_sample_rate};
use crate::order::AmbisonicOrder;

/// Default time constant for the static-angle fallback, in milliseconds.
pub const DEFAULT_ROTATION_SMOOTHING_MS: f32 = 20.0;

/// Encode `x` at angle `theta` (radians) into `out` (`2n + 1` samples).
#[inline]
pub fn encode_circular(order: usize, x: f32, theta: f32, out: &mut [f32]) {
    debug_assert_eq!(out.len(), 2 * order + 1);
    out[0] = x;
    for k in 1..=order {
        let a = k as f32 * theta;
        out[2 * k - 1] = x * cosf(a);
        out[2 * k] = x * sinf(a);
    }
}

/// Mono to circular-harmonic encoder at a fixed angle.
#[derive(Debug, Clone)]
pub struct CircularEncoder {
    order: AmbisonicOrder,
    azimuth: f32,
    basis: Vec<f32>,
}

impl CircularEncoder {
    /// Create an encoder at `azimuth` radians.
    pub fn new(order: AmbisonicOrder, azimuth: f32) -> Self {
        let mut enc = Self {
            order,
            azimuth,
            basis: vec![0.0; order.circular_channels()],
        };
        enc.set_azimuth(azimuth);
        enc
    }

    /// Move the source.
    pub fn set_azimuth(&mut self, azimuth: f32) {
        self.azimuth = azimuth;
        encode_circular(self.order.get(), 1.0, azimuth, &mut self.basis);
    }

    /// Current azimuth in radians.
    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }
}

impl FrameProcessor for CircularEncoder {
    fn input_channels(&self) -> usize {
        1
    }

    fn output_channels(&self) -> usize {
        self.basis.len()
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        let x = input[0];
        for (o, b) in output.iter_mut().zip(&self.basis) {
            *o = x * b;
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

/// Decoder for `p` loudspeakers evenly spaced on a circle.
///
/// Speaker `i` sits at `2πi / p`. Its feed is the dot product of the field
/// (with the omni channel halved) and the encoding of gain `2/p` at the
/// speaker angle.
///
/// ```rust
/// use abc_core::FrameProcessor;
/// use abc_spatial::{AmbisonicOrder, CircularDecoder};
///
/// let mut dec = CircularDecoder::new(AmbisonicOrder::new(1).unwrap(), 4).unwrap();
/// let mut feeds = [0.0; 4];
/// dec.process_frame(&[1.0, 1.0, 0.0], &mut feeds);
/// assert!((feeds[0] - 0.75).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct CircularDecoder {
    order: AmbisonicOrder,
    speakers: usize,
    /// `speakers × (2n + 1)`, row-major.
    matrix: Vec<f32>,
}

impl CircularDecoder {
    /// Build a decoder for `speakers` loudspeakers.
    pub fn new(order: AmbisonicOrder, speakers: usize) -> SpatialResult<Self> {
        if speakers < 2 {
            return Err(SpatialError::LayoutTooSmall {
                len: speakers,
                min: 2,
            });
        }
        let channels = order.circular_channels();
        let mut matrix = vec![0.0; speakers * channels];
        let gain = 2.0 / speakers as f32;
        for (i, row) in matrix.chunks_exact_mut(channels).enumerate() {
            encode_circular(order.get(), gain, TAU * i as f32 / speakers as f32, row);
            row[0] *= 0.5;
        }
        Ok(Self {
            order,
            speakers,
            matrix,
        })
    }

    /// Order of the decoded field.
    pub fn order(&self) -> AmbisonicOrder {
        self.order
    }

    /// Number of loudspeakers.
    pub fn speakers(&self) -> usize {
        self.speakers
    }

    /// Decoding row of speaker `i`.
    pub fn row(&self, i: usize) -> &[f32] {
        let channels = self.order.circular_channels();
        &self.matrix[i * channels..(i + 1) * channels]
    }

    /// Decode one field frame.
    #[inline]
    pub fn decode(&self, field: &[f32], feeds: &mut [f32]) {
        let channels = self.order.circular_channels();
        debug_assert_eq!(field.len(), channels);
        debug_assert_eq!(feeds.len(), self.speakers);
        for (feed, row) in feeds.iter_mut().zip(self.matrix.chunks_exact(channels)) {
            *feed = row.iter().zip(field).map(|(r, c)| r * c).sum();
        }
    }
}

impl FrameProcessor for CircularDecoder {
    fn input_channels(&self) -> usize {
        self.order.circular_channels()
    }

    fn output_channels(&self) -> usize {
        self.speakers
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        self.decode(input, output);
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

/// Circular encoder whose angle spins at `speed` turns per second.
///
/// When the speed is exactly zero the encoder falls back to a static angle.
/// The switch between the two is a smoothed gate, so stopping or starting
/// the rotation never clicks:
///
/// ```text
/// out = (1 - w) · encode(θ_rot) + w · encode(θ_static),   w = smooth(speed == 0)
/// ```
#[derive(Debug, Clone)]
pub struct RotatingEncoder {
    order: AmbisonicOrder,
    phasor: Phasor,
    fallback: SmoothedGate,
    speed: f32,
    static_angle: f32,
    rotating: Vec<f32>,
    fixed: Vec<f32>,
}

impl RotatingEncoder {
    /// Create a rotating encoder.
    ///
    /// * `speed` - rotation rate in turns per second (negative runs clockwise)
    /// * `static_angle` - fallback angle in radians
    pub fn new(
        order: AmbisonicOrder,
        sample_rate: f32,
        speed: f32,
        static_angle: f32,
    ) -> SpatialResult<Self> {
        let sample_rate = check_sample_rate(sample_rate)?;
        let channels = order.circular_channels();
        let mut fixed = vec![0.0; channels];
        encode_circular(order.get(), 1.0, static_angle, &mut fixed);
        Ok(Self {
            order,
            phasor: Phasor::new(sample_rate, speed),
            fallback: SmoothedGate::new(
                speed == 0.0,
                sample_rate,
                DEFAULT_ROTATION_SMOOTHING_MS,
            ),
            speed,
            static_angle,
            rotating: vec![0.0; channels],
            fixed,
        })
    }

    /// Rotation rate in turns per second.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
        self.phasor.set_frequency(speed);
    }

    /// Rotation rate in turns per second.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Angle used while the rotation is stopped (radians).
    pub fn set_static_angle(&mut self, angle: f32) {
        self.static_angle = angle;
        encode_circular(self.order.get(), 1.0, angle, &mut self.fixed);
    }

    /// Static fallback angle in radians.
    pub fn static_angle(&self) -> f32 {
        self.static_angle
    }

    /// Time constant of the static fallback cross-fade.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.fallback.set_smoothing_time_ms(time_ms);
    }

    /// Current weight of the static angle.
    pub fn static_weight(&self) -> f32 {
        self.fallback.weight()
    }
}

impl FrameProcessor for RotatingEncoder {
    fn input_channels(&self) -> usize {
        1
    }

    fn output_channels(&self) -> usize {
        self.order.circular_channels()
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        let x = input[0];
        let theta = TAU * self.phasor.advance();
        let w = self.fallback.advance(self.speed == 0.0);
        encode_circular(self.order.get(), 1.0, theta, &mut self.rotating);
        for ((o, r), s) in output.iter_mut().zip(&self.rotating).zip(&self.fixed) {
            *o = x * crossfade(*r, *s, w);
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.phasor.set_sample_rate(sample_rate);
        self.fallback.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.phasor.reset();
        self.fallback.snap(self.speed == 0.0);
    }
}
