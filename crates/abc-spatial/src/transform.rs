//! Field transforms: rotation about the vertical axis and mirroring.
//!
//! Both work directly on the harmonic channels. A yaw rotation by `α` only
//! mixes the two channels of each `(|m|, -|m|)` pair; a mirror only flips
//! signs.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use abc_core::{FrameProcessor, Phasor, SmoothedGate, crossfade};
use core::f32::consts::TAU;
use libm::{cosf, sinf};

use crate::circular::DEFAULT_ROTATION_SMOOTHING_MS;
use crate::error::{SpatialResult, check_sample_rate};
use crate::order::{AmbisonicOrder, Dimension, acn_index, acn_to_degree_order, circular_degree};

/// Channels of one rotating pair: the cosine-like and sine-like channel of
/// multiple `m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RotationPair {
    multiple: usize,
    cos_channel: usize,
    sin_channel: usize,
}

fn rotation_pairs(order: AmbisonicOrder, dimension: Dimension) -> Vec<RotationPair> {
    let n = order.get();
    match dimension {
        Dimension::Planar => (1..=n)
            .map(|k| RotationPair {
                multiple: k,
                cos_channel: 2 * k - 1,
                sin_channel: 2 * k,
            })
            .collect(),
        Dimension::Spherical => (1..=n)
            .flat_map(|l| {
                (1..=l).map(move |m| RotationPair {
                    multiple: m,
                    cos_channel: acn_index(l, m as i32),
                    sin_channel: acn_index(l, -(m as i32)),
                })
            })
            .collect(),
    }
}

/// Rotate `field` by `angle` radians into `out`.
///
/// `trig[m - 1]` must hold `(cos mα, sin mα)`.
#[inline]
fn rotate_pairs(pairs: &[RotationPair], trig: &[(f32, f32)], field: &[f32], out: &mut [f32]) {
    for pair in pairs {
        let (c, s) = trig[pair.multiple - 1];
        let x = field[pair.cos_channel];
        let y = field[pair.sin_channel];
        out[pair.cos_channel] = x * c - y * s;
        out[pair.sin_channel] = y * c + x * s;
    }
}

fn fill_trig(angle: f32, trig: &mut [(f32, f32)]) {
    for (m, t) in trig.iter_mut().enumerate() {
        let a = (m + 1) as f32 * angle;
        *t = (cosf(a), sinf(a));
    }
}

/// Yaw rotation of a circular or spherical field.
///
/// The angle spins at `speed` turns per second and falls back to a static
/// angle when the speed is zero, with the same smoothed switch as
/// [`RotatingEncoder`](crate::RotatingEncoder).
#[derive(Debug, Clone)]
pub struct FieldRotator {
    order: AmbisonicOrder,
    dimension: Dimension,
    pairs: Vec<RotationPair>,
    phasor: Phasor,
    fallback: SmoothedGate,
    speed: f32,
    static_angle: f32,
    static_trig: Vec<(f32, f32)>,
    rotating_trig: Vec<(f32, f32)>,
    rotating: Vec<f32>,
    fixed: Vec<f32>,
}

impl FieldRotator {
    /// Build a rotator.
    ///
    /// * `speed` - turns per second
    /// * `static_angle` - fallback angle in radians
    pub fn new(
        order: AmbisonicOrder,
        dimension: Dimension,
        sample_rate: f32,
        speed: f32,
        static_angle: f32,
    ) -> SpatialResult<Self> {
        let sample_rate = check_sample_rate(sample_rate)?;
        let n = order.get();
        let channels = order.channels(dimension);
        let mut static_trig = vec![(1.0, 0.0); n];
        fill_trig(static_angle, &mut static_trig);
        Ok(Self {
            order,
            dimension,
            pairs: rotation_pairs(order, dimension),
            phasor: Phasor::new(sample_rate, speed),
            fallback: SmoothedGate::new(speed == 0.0, sample_rate, DEFAULT_ROTATION_SMOOTHING_MS),
            speed,
            static_angle,
            static_trig,
            rotating_trig: vec![(1.0, 0.0); n],
            rotating: vec![0.0; channels],
            fixed: vec![0.0; channels],
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
        fill_trig(angle, &mut self.static_trig);
    }

    /// Static fallback angle in radians.
    pub fn static_angle(&self) -> f32 {
        self.static_angle
    }

    /// Time constant of the static fallback cross-fade.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.fallback.set_smoothing_time_ms(time_ms);
    }

    /// Rotate `field` by a fixed `angle` into `out`, outside the audio path.
    pub fn rotate(&mut self, field: &[f32], angle: f32, out: &mut [f32]) {
        fill_trig(angle, &mut self.rotating_trig);
        out.copy_from_slice(field);
        rotate_pairs(&self.pairs, &self.rotating_trig, field, out);
    }
}

impl FrameProcessor for FieldRotator {
    fn input_channels(&self) -> usize {
        self.order.channels(self.dimension)
    }

    fn output_channels(&self) -> usize {
        self.order.channels(self.dimension)
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        let angle = TAU * self.phasor.advance();
        let w = self.fallback.advance(self.speed == 0.0);
        fill_trig(angle, &mut self.rotating_trig);

        self.rotating.copy_from_slice(input);
        self.fixed.copy_from_slice(input);
        rotate_pairs(&self.pairs, &self.rotating_trig, input, &mut self.rotating);
        rotate_pairs(&self.pairs, &self.static_trig, input, &mut self.fixed);
        for ((o, r), s) in output.iter_mut().zip(&self.rotating).zip(&self.fixed) {
            *o = crossfade(*r, *s, w);
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

/// Mirror plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirrorAxis {
    /// Azimuth `θ → -θ`.
    LeftRight,
    /// Azimuth `θ → π - θ`.
    FrontBack,
    /// Elevation `φ → -φ`. No effect on a circular field.
    UpDown,
}

/// Sign-flip mirroring of a field across any combination of axes.
#[derive(Debug, Clone)]
pub struct Mirror {
    order: AmbisonicOrder,
    dimension: Dimension,
    left_right: bool,
    front_back: bool,
    up_down: bool,
    signs: Vec<f32>,
}

impl Mirror {
    /// A mirror with every axis disabled.
    pub fn new(order: AmbisonicOrder, dimension: Dimension) -> Self {
        Self {
            order,
            dimension,
            left_right: false,
            front_back: false,
            up_down: false,
            signs: vec![1.0; order.channels(dimension)],
        }
    }

    /// Enable or disable mirroring across `axis`.
    pub fn set_axis(&mut self, axis: MirrorAxis, enabled: bool) {
        match axis {
            MirrorAxis::LeftRight => self.left_right = enabled,
            MirrorAxis::FrontBack => self.front_back = enabled,
            MirrorAxis::UpDown => self.up_down = enabled,
        }
        self.rebuild();
    }

    /// Builder form of [`set_axis`](Self::set_axis).
    #[must_use]
    pub fn with_axis(mut self, axis: MirrorAxis) -> Self {
        self.set_axis(axis, true);
        self
    }

    /// Whether `axis` is enabled.
    pub fn axis(&self, axis: MirrorAxis) -> bool {
        match axis {
            MirrorAxis::LeftRight => self.left_right,
            MirrorAxis::FrontBack => self.front_back,
            MirrorAxis::UpDown => self.up_down,
        }
    }

    /// Per-channel sign applied by the mirror.
    pub fn signs(&self) -> &[f32] {
        &self.signs
    }

    fn rebuild(&mut self) {
        let dimension = self.dimension;
        let (lr, fb, ud) = (self.left_right, self.front_back, self.up_down);
        for (c, sign) in self.signs.iter_mut().enumerate() {
            let (l, m) = match dimension {
                Dimension::Planar => {
                    let k = circular_degree(c) as i32;
                    // Odd channels carry cos(kθ), even ones sin(kθ).
                    (k as usize, if c % 2 == 1 || c == 0 { k } else { -k })
                }
                Dimension::Spherical => acn_to_degree_order(c),
            };
            let am = m.unsigned_abs() as usize;
            let mut s = 1.0;
            if lr && m < 0 {
                s = -s;
            }
            if fb {
                let flips = if m < 0 { am + 1 } else { am };
                if flips % 2 == 1 {
                    s = -s;
                }
            }
            if ud && dimension == Dimension::Spherical && (l + am) % 2 == 1 {
                s = -s;
            }
            *sign = s;
        }
    }
}

impl FrameProcessor for Mirror {
    fn input_channels(&self) -> usize {
        self.order.channels(self.dimension)
    }

    fn output_channels(&self) -> usize {
        self.order.channels(self.dimension)
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        for ((o, x), s) in output.iter_mut().zip(input).zip(&self.signs) {
            *o = x * s;
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}
