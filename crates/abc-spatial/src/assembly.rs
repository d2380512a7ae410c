//! Ready-made encoders and decoders assembled from the building blocks.
//!
//! - [`encode_harmonics`] - picks a circular or spherical mono encoder
//! - [`IDecoder`] - field optimizer followed by the irregular decoder
//! - [`GeneralDecoder`] - [`IDecoder`], or a stereo fold-down for two speakers
//! - [`StereoEncoder`] / [`MultiEncoder`] - several sources on one circular field

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use abc_core::{Chain, FrameProcessor, FrameProcessorExt};
use core::f32::consts::{FRAC_PI_2, TAU};
use libm::{cosf, sinf};

use crate::circular::{CircularDecoder, CircularEncoder, encode_circular};
use crate::error::{SpatialError, SpatialResult};
use crate::harmonics::HarmonicEncoder;
use crate::optimizer::{FieldOptimizer, OptimMode};
use crate::order::{AmbisonicOrder, Dimension};
use crate::vbap::{Direction, IrregularDecoder};

/// Mono encoder of either dimension.
#[derive(Debug, Clone)]
pub enum Encoder {
    /// `2n + 1` circular channels; elevation is ignored.
    Circular(CircularEncoder),
    /// `(n + 1)²` spherical channels.
    Spherical(HarmonicEncoder),
}

impl Encoder {
    /// Move the source (radians).
    pub fn set_direction(&mut self, azimuth: f32, elevation: f32) {
        match self {
            Encoder::Circular(enc) => enc.set_azimuth(azimuth),
            Encoder::Spherical(enc) => enc.set_direction(azimuth, elevation),
        }
    }

    /// Dimension of the produced field.
    pub fn dimension(&self) -> Dimension {
        match self {
            Encoder::Circular(_) => Dimension::Planar,
            Encoder::Spherical(_) => Dimension::Spherical,
        }
    }
}

impl FrameProcessor for Encoder {
    fn input_channels(&self) -> usize {
        1
    }

    fn output_channels(&self) -> usize {
        match self {
            Encoder::Circular(enc) => enc.output_channels(),
            Encoder::Spherical(enc) => enc.output_channels(),
        }
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        match self {
            Encoder::Circular(enc) => enc.process_frame(input, output),
            Encoder::Spherical(enc) => enc.process_frame(input, output),
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

/// Mono encoder for `order`: spherical when `elevation_supported`, circular
/// otherwise. Angles in radians.
pub fn encode_harmonics(
    order: AmbisonicOrder,
    elevation_supported: bool,
    azimuth: f32,
    elevation: f32,
) -> Encoder {
    if elevation_supported {
        Encoder::Spherical(HarmonicEncoder::new(order, azimuth, elevation))
    } else {
        Encoder::Circular(CircularEncoder::new(order, azimuth))
    }
}

/// Optimized irregular-array decoder: circular field in, one feed per
/// loudspeaker out.
#[derive(Debug)]
pub struct IDecoder {
    chain: Chain<FieldOptimizer, IrregularDecoder>,
}

impl IDecoder {
    /// Build the decoder. Layout angles and `shift` are in degrees.
    pub fn new(
        order: AmbisonicOrder,
        angles: &[f32],
        direction: Direction,
        shift: f32,
        mode: OptimMode,
        sample_rate: f32,
    ) -> SpatialResult<Self> {
        let optimizer = FieldOptimizer::new(order, Dimension::Planar, mode, sample_rate)?;
        let decoder = IrregularDecoder::new(order, angles, direction, shift)?;
        Ok(Self {
            chain: optimizer.try_chain(decoder)?,
        })
    }

    /// The optimizer stage.
    pub fn optimizer(&self) -> &FieldOptimizer {
        self.chain.first()
    }

    /// The optimizer stage, mutably.
    pub fn optimizer_mut(&mut self) -> &mut FieldOptimizer {
        self.chain.first_mut()
    }

    /// The decoding stage.
    pub fn decoder(&self) -> &IrregularDecoder {
        self.chain.second()
    }

    /// The decoding stage, mutably.
    pub fn decoder_mut(&mut self) -> &mut IrregularDecoder {
        self.chain.second_mut()
    }
}

impl FrameProcessor for IDecoder {
    fn input_channels(&self) -> usize {
        self.chain.input_channels()
    }

    fn output_channels(&self) -> usize {
        self.chain.output_channels()
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        self.chain.process_frame(input, output);
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.chain.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.chain.reset();
    }
}

/// Stereo fold-down of a circular field.
///
/// The field is decoded onto `2n + 2` virtual speakers, and each virtual
/// speaker at angle `a` is panned at position `(1 + sin a) / 2` with a
/// constant-power law: `L = sin(π/2 · pos)`, `R = cos(π/2 · pos)`.
#[derive(Debug, Clone)]
pub struct StereoFold {
    regular: CircularDecoder,
    /// `(left, right)` per virtual speaker.
    pans: Vec<(f32, f32)>,
    virtual_feeds: Vec<f32>,
}

impl StereoFold {
    /// Build a fold-down for a field of `order`.
    pub fn new(order: AmbisonicOrder) -> SpatialResult<Self> {
        let q = 2 * order.get() + 2;
        let regular = CircularDecoder::new(order, q)?;
        let pans = (0..q)
            .map(|v| {
                let a = TAU * v as f32 / q as f32;
                let pos = 0.5 * (1.0 + sinf(a));
                (sinf(FRAC_PI_2 * pos), cosf(FRAC_PI_2 * pos))
            })
            .collect();
        Ok(Self {
            regular,
            pans,
            virtual_feeds: vec![0.0; q],
        })
    }

    /// `(left, right)` gains of every virtual speaker.
    pub fn pans(&self) -> &[(f32, f32)] {
        &self.pans
    }
}

impl FrameProcessor for StereoFold {
    fn input_channels(&self) -> usize {
        self.regular.order().circular_channels()
    }

    fn output_channels(&self) -> usize {
        2
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        self.regular.decode(input, &mut self.virtual_feeds);
        let (mut left, mut right) = (0.0, 0.0);
        for (v, (l, r)) in self.virtual_feeds.iter().zip(&self.pans) {
            left += v * l;
            right += v * r;
        }
        output[0] = left;
        output[1] = right;
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {
        self.virtual_feeds.fill(0.0);
    }
}

/// Decoder for any layout of two or more loudspeakers.
///
/// A two-entry layout is treated as a stereo pair: the field goes through
/// a [`StereoFold`] and the two angles are not used. Anything larger goes
/// through an [`IDecoder`]. The optimizer applies in both cases.
#[derive(Debug)]
pub enum GeneralDecoder {
    /// Two loudspeakers.
    Stereo(Chain<FieldOptimizer, StereoFold>),
    /// Three or more loudspeakers.
    Irregular(IDecoder),
}

impl GeneralDecoder {
    /// Build the decoder. Layout angles and `shift` are in degrees.
    pub fn new(
        order: AmbisonicOrder,
        angles: &[f32],
        direction: Direction,
        shift: f32,
        mode: OptimMode,
        sample_rate: f32,
    ) -> SpatialResult<Self> {
        if angles.len() == 2 {
            if let Some(index) = angles.iter().position(|a| !a.is_finite()) {
                return Err(SpatialError::NonFiniteAngle { index });
            }
            let optimizer = FieldOptimizer::new(order, Dimension::Planar, mode, sample_rate)?;

            #[cfg(feature = "tracing")]
            tracing::debug!(order = order.get(), "stereo fold-down");

            Ok(GeneralDecoder::Stereo(
                optimizer.try_chain(StereoFold::new(order)?)?,
            ))
        } else {
            IDecoder::new(order, angles, direction, shift, mode, sample_rate)
                .map(GeneralDecoder::Irregular)
        }
    }

    /// Whether the stereo fold-down is in use.
    pub fn is_stereo(&self) -> bool {
        matches!(self, GeneralDecoder::Stereo(_))
    }

    /// Change the optimizer mode.
    pub fn set_mode(&mut self, mode: OptimMode) {
        match self {
            GeneralDecoder::Stereo(chain) => chain.first_mut().set_mode(mode),
            GeneralDecoder::Irregular(dec) => dec.optimizer_mut().set_mode(mode),
        }
    }

    /// Time constant of the optimizer mode cross-fade.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        match self {
            GeneralDecoder::Stereo(chain) => chain.first_mut().set_smoothing_time_ms(time_ms),
            GeneralDecoder::Irregular(dec) => dec.optimizer_mut().set_smoothing_time_ms(time_ms),
        }
    }
}

impl FrameProcessor for GeneralDecoder {
    fn input_channels(&self) -> usize {
        match self {
            GeneralDecoder::Stereo(chain) => chain.input_channels(),
            GeneralDecoder::Irregular(dec) => dec.input_channels(),
        }
    }

    fn output_channels(&self) -> usize {
        match self {
            GeneralDecoder::Stereo(chain) => chain.output_channels(),
            GeneralDecoder::Irregular(dec) => dec.output_channels(),
        }
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        match self {
            GeneralDecoder::Stereo(chain) => chain.process_frame(input, output),
            GeneralDecoder::Irregular(dec) => dec.process_frame(input, output),
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        match self {
            GeneralDecoder::Stereo(chain) => chain.set_sample_rate(sample_rate),
            GeneralDecoder::Irregular(dec) => dec.set_sample_rate(sample_rate),
        }
    }

    fn reset(&mut self) {
        match self {
            GeneralDecoder::Stereo(chain) => chain.reset(),
            GeneralDecoder::Irregular(dec) => dec.reset(),
        }
    }
}

/// Two inputs placed at `centre ± spread / 2` on a circular field.
///
/// Input 0 (left) sits at `centre + spread / 2`, input 1 (right) at
/// `centre - spread / 2`. Angles in radians.
#[derive(Debug, Clone)]
pub struct StereoEncoder {
    order: AmbisonicOrder,
    centre: f32,
    spread: f32,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl StereoEncoder {
    /// Build the encoder.
    pub fn new(order: AmbisonicOrder, centre: f32, spread: f32) -> Self {
        let channels = order.circular_channels();
        let mut enc = Self {
            order,
            centre,
            spread,
            left: vec![0.0; channels],
            right: vec![0.0; channels],
        };
        enc.rebuild();
        enc
    }

    /// Centre azimuth of the pair.
    pub fn set_centre(&mut self, centre: f32) {
        self.centre = centre;
        self.rebuild();
    }

    /// Angle between the two inputs.
    pub fn set_spread(&mut self, spread: f32) {
        self.spread = spread;
        self.rebuild();
    }

    /// `(centre, spread)` in radians.
    pub fn placement(&self) -> (f32, f32) {
        (self.centre, self.spread)
    }

    fn rebuild(&mut self) {
        let n = self.order.get();
        let half = 0.5 * self.spread;
        encode_circular(n, 1.0, self.centre + half, &mut self.left);
        encode_circular(n, 1.0, self.centre - half, &mut self.right);
    }
}

impl FrameProcessor for StereoEncoder {
    fn input_channels(&self) -> usize {
        2
    }

    fn output_channels(&self) -> usize {
        self.left.len()
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        let (l, r) = (input[0], input[1]);
        for ((o, bl), br) in output.iter_mut().zip(&self.left).zip(&self.right) {
            *o = l * bl + r * br;
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

/// `k` inputs evenly spaced around a circular field.
///
/// Input `j` sits at `2πj / k + offset` radians.
#[derive(Debug, Clone)]
pub struct MultiEncoder {
    order: AmbisonicOrder,
    inputs: usize,
    offset: f32,
    /// `inputs × (2n + 1)`, row-major.
    bases: Vec<f32>,
}

impl MultiEncoder {
    /// Build an encoder for `inputs` sources.
    pub fn new(order: AmbisonicOrder, inputs: usize, offset: f32) -> SpatialResult<Self> {
        if inputs == 0 {
            return Err(SpatialError::LayoutTooSmall { len: 0, min: 1 });
        }
        let mut enc = Self {
            order,
            inputs,
            offset,
            bases: vec![0.0; inputs * order.circular_channels()],
        };
        enc.rebuild();
        Ok(enc)
    }

    /// Rotate every source by `offset` radians.
    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
        self.rebuild();
    }

    /// Azimuth of input `j` in radians.
    pub fn source_angle(&self, j: usize) -> f32 {
        TAU * j as f32 / self.inputs as f32 + self.offset
    }

    fn rebuild(&mut self) {
        let n = self.order.get();
        let channels = self.order.circular_channels();
        for j in 0..self.inputs {
            let angle = self.source_angle(j);
            encode_circular(n, 1.0, angle, &mut self.bases[j * channels..(j + 1) * channels]);
        }
    }
}

impl FrameProcessor for MultiEncoder {
    fn input_channels(&self) -> usize {
        self.inputs
    }

    fn output_channels(&self) -> usize {
        self.order.circular_channels()
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        let channels = output.len();
        output.fill(0.0);
        for (x, basis) in input.iter().zip(self.bases.chunks_exact(channels)) {
            for (o, b) in output.iter_mut().zip(basis) {
                *o += x * b;
            }
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}
