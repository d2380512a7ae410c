//! Pairwise VBAP and the irregular-array decoder built on it.
//!
//! Angles in this module are in degrees. A layout is an ordered list of
//! loudspeaker azimuths; speaker `j` forms a pair with speaker
//! `(j + 1) mod p`. Layouts need not be sorted, but every consecutive gap
//! should stay below 180° for a target to land in exactly one pair.
//!
//! For a pair `(t1, t2)` and a target `t`:
//!
//! ```text
//! s  = sign(sin(t2 - t1))
//! gl = s · sin(t2 - t),   gr = s · sin(t - t1)
//! (gl, gr) /= sqrt(gl² + gr²)
//! active  ⇔  gl > 0  and  gr ≥ 0
//! ```
//!
//! The thresholds are asymmetric: a target sitting exactly on a
//! speaker belongs to the pair that starts at that speaker, never to the pair
//! that ends there.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use abc_core::{FrameProcessor, sign};
use core::f32::consts::PI;
use libm::{sinf, sqrtf};

use crate::circular::CircularDecoder;
use crate::error::{SpatialError, SpatialResult};
use crate::order::AmbisonicOrder;

/// `sin((v - u) · π / 180)`.
#[inline]
pub fn diff_sin(u: f32, v: f32) -> f32 {
    sinf((v - u) * PI / 180.0)
}

/// Normalised gains of one speaker pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairGains {
    /// Gain of the first speaker of the pair.
    pub left: f32,
    /// Gain of the second speaker of the pair.
    pub right: f32,
    /// Whether the target falls inside this pair.
    pub active: bool,
}

/// Gains of the pair `(t1, t2)` for target `t`, all in degrees.
#[inline]
pub fn pair_gains(t1: f32, t2: f32, t: f32) -> PairGains {
    let s = -sign(diff_sin(t2, t1));
    let mut left = s * diff_sin(t, t2);
    let mut right = s * diff_sin(t1, t);
    let norm = sqrtf(left * left + right * right);
    if norm > 0.0 {
        left /= norm;
        right /= norm;
    } else {
        left = 0.0;
        right = 0.0;
    }
    PairGains {
        left,
        right,
        active: left > 0.0 && right >= 0.0,
    }
}

/// Direction in which virtual speakers are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Increasing angles (+1).
    #[default]
    CounterClockwise,
    /// Decreasing angles (-1).
    Clockwise,
}

impl Direction {
    /// +1.0 or -1.0.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::CounterClockwise => 1.0,
            Direction::Clockwise => -1.0,
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = SpatialError;

    fn try_from(value: i64) -> SpatialResult<Self> {
        match value {
            1 => Ok(Direction::CounterClockwise),
            -1 => Ok(Direction::Clockwise),
            other => Err(SpatialError::InvalidDirection(other)),
        }
    }
}

/// Amplitude panning over an arbitrary loudspeaker ring.
#[derive(Debug, Clone)]
pub struct VbapCompensator {
    angles: Vec<f32>,
}

impl VbapCompensator {
    /// Build a compensator for a layout in degrees.
    pub fn new(angles: &[f32]) -> SpatialResult<Self> {
        check_layout(angles)?;
        Ok(Self {
            angles: angles.to_vec(),
        })
    }

    /// Loudspeaker azimuths in degrees.
    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    /// Number of loudspeakers.
    pub fn speakers(&self) -> usize {
        self.angles.len()
    }

    /// Gains of the pair starting at speaker `j`.
    #[inline]
    pub fn pair(&self, j: usize, target: f32) -> PairGains {
        let p = self.angles.len();
        pair_gains(self.angles[j % p], self.angles[(j + 1) % p], target)
    }

    /// Fill `out` with one gain per speaker for `target` degrees.
    ///
    /// Speaker `j` receives the left gain of its own pair and the right gain
    /// of the pair ending at it, each only when that pair is active.
    pub fn gains(&self, target: f32, out: &mut [f32]) {
        let p = self.angles.len();
        debug_assert_eq!(out.len(), p);
        let mut prev = self.pair(p - 1, target);
        for (j, g) in out.iter_mut().enumerate() {
            let cur = self.pair(j, target);
            let own = if cur.active { cur.left } else { 0.0 };
            let carried = if prev.active { prev.right } else { 0.0 };
            *g = own + carried;
            prev = cur;
        }
    }
}

fn check_layout(angles: &[f32]) -> SpatialResult<()> {
    if angles.len() < 2 {
        return Err(SpatialError::LayoutTooSmall {
            len: angles.len(),
            min: 2,
        });
    }
    if let Some(index) = angles.iter().position(|a| !a.is_finite()) {
        return Err(SpatialError::NonFiniteAngle { index });
    }
    Ok(())
}

/// Decoder for an irregular loudspeaker ring.
///
/// The field is first decoded onto `q = max(2n + 2, p)` evenly spaced
/// virtual speakers, which are then panned onto the real layout:
///
/// ```text
/// feed_j = Σ_v vbap_j(direction · 360 · v / q + shift) · virtual_v
/// ```
///
/// The `p × q` panning matrix is rebuilt in place when the direction or
/// shift change.
#[derive(Debug, Clone)]
pub struct IrregularDecoder {
    regular: CircularDecoder,
    vbap: VbapCompensator,
    direction: Direction,
    shift: f32,
    /// `p × q`, row-major.
    matrix: Vec<f32>,
    column: Vec<f32>,
    virtual_feeds: Vec<f32>,
}

impl IrregularDecoder {
    /// Build a decoder.
    ///
    /// * `angles` - loudspeaker azimuths in degrees, at least two
    /// * `shift` - rotation of the virtual ring in degrees
    pub fn new(
        order: AmbisonicOrder,
        angles: &[f32],
        direction: Direction,
        shift: f32,
    ) -> SpatialResult<Self> {
        let vbap = VbapCompensator::new(angles)?;
        let p = vbap.speakers();
        let q = (2 * order.get() + 2).max(p);
        let regular = CircularDecoder::new(order, q)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            order = order.get(),
            speakers = p,
            virtual_speakers = q,
            "irregular decoder"
        );

        let mut dec = Self {
            regular,
            vbap,
            direction,
            shift,
            matrix: vec![0.0; p * q],
            column: vec![0.0; p],
            virtual_feeds: vec![0.0; q],
        };
        dec.rebuild();
        Ok(dec)
    }

    /// Order of the decoded field.
    pub fn order(&self) -> AmbisonicOrder {
        self.regular.order()
    }

    /// Number of virtual speakers.
    pub fn virtual_speakers(&self) -> usize {
        self.regular.speakers()
    }

    /// Real loudspeaker layout in degrees.
    pub fn angles(&self) -> &[f32] {
        self.vbap.angles()
    }

    /// Layout direction of the virtual ring.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Change the layout direction of the virtual ring.
    pub fn set_direction(&mut self, direction: Direction) {
        if direction != self.direction {
            self.direction = direction;
            self.rebuild();
        }
    }

    /// Rotation of the virtual ring in degrees.
    pub fn shift(&self) -> f32 {
        self.shift
    }

    /// Rotate the virtual ring.
    pub fn set_shift(&mut self, shift: f32) {
        if shift != self.shift {
            self.shift = shift;
            self.rebuild();
        }
    }

    /// Angle of virtual speaker `v` in degrees.
    pub fn virtual_angle(&self, v: usize) -> f32 {
        let q = self.regular.speakers();
        self.direction.sign() * 360.0 * v as f32 / q as f32 + self.shift
    }

    /// Panning gains of virtual speaker `v`, one per real speaker.
    pub fn panning_column(&self, v: usize, out: &mut [f32]) {
        let q = self.regular.speakers();
        for (o, row) in out.iter_mut().zip(self.matrix.chunks_exact(q)) {
            *o = row[v];
        }
    }

    fn rebuild(&mut self) {
        let q = self.regular.speakers();
        for v in 0..q {
            let angle = self.virtual_angle(v);
            self.vbap.gains(angle, &mut self.column);
            for (row, g) in self.matrix.chunks_exact_mut(q).zip(&self.column) {
                row[v] = *g;
            }
        }
    }
}

impl FrameProcessor for IrregularDecoder {
    fn input_channels(&self) -> usize {
        self.regular.order().circular_channels()
    }

    fn output_channels(&self) -> usize {
        self.vbap.speakers()
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        self.regular.decode(input, &mut self.virtual_feeds);
        let q = self.virtual_feeds.len();
        for (o, row) in output.iter_mut().zip(self.matrix.chunks_exact(q)) {
            *o = row.iter().zip(&self.virtual_feeds).map(|(g, v)| g * v).sum();
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {
        self.virtual_feeds.fill(0.0);
    }
}
