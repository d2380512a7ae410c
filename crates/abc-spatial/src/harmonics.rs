//! Real spherical harmonics in ACN order.
//!
//! Channel `i` carries degree `l = floor(sqrt(i))` and order
//! `m = i - l(l + 1)`. Its weight for a source at azimuth `θ` and elevation
//! `φ` is
//!
//! ```text
//! Y(l, m) = e(m, θ) · k(l, m) · P(l, |m|, x),   x = cos(φ + π/2)
//! ```
//!
//! where `e` is `cos(mθ)` for `m > 0`, `sin(|m|θ)` for `m < 0` and 1 for
//! `m = 0`, `k` is the semi-normalisation factor and `P` the associated
//! Legendre function with the Condon-Shortley phase.
//!
//! Elevations past a pole are handled by flipping the azimuth by π whenever
//! `cos φ < 0`, so a source can travel over the top of the sphere without a
//! discontinuity.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use abc_core::FrameProcessor;
use core::f32::consts::{FRAC_PI_2, PI, SQRT_2};
use libm::{cosf, sinf, sqrtf};

use crate::order::{AmbisonicOrder, acn_to_degree_order};

/// Semi-normalisation factor `k(l, m)`.
///
/// 1 for `m = 0`, otherwise `sqrt(2 · (l - |m|)! / (l + |m|)!)`, evaluated as
/// a telescoping product so no factorial is ever formed.
pub fn normalization(l: usize, m: i32) -> f32 {
    let am = m.unsigned_abs() as usize;
    if am == 0 {
        return 1.0;
    }
    debug_assert!(am <= l);
    let mut k = SQRT_2;
    for j in (l - am + 1)..=(l + am) {
        k /= sqrtf(j as f32);
    }
    k
}

/// Associated Legendre function `P(l, |m|, x)` with the Condon-Shortley phase.
///
/// Walks the diagonal up to `P(|m|, |m|)` and then climbs in degree, the
/// same recurrences [`SphericalHarmonics`] uses to fill its table.
pub fn associated_legendre(l: usize, m: i32, x: f32) -> f32 {
    let am = m.unsigned_abs() as usize;
    if am > l {
        return 0.0;
    }
    let s = sqrtf((1.0 - x * x).max(0.0));

    let mut diag = 1.0;
    for d in 1..=am {
        diag *= -((2 * d - 1) as f32) * s;
    }
    if l == am {
        return diag;
    }

    let mut prev = diag;
    let mut cur = x * (2 * am + 1) as f32 * diag;
    for d in (am + 2)..=l {
        let next = ((2 * d - 1) as f32 * x * cur - (d - 1 + am) as f32 * prev)
            / (d - am) as f32;
        prev = cur;
        cur = next;
    }
    cur
}

#[inline]
fn legendre_index(l: usize, am: usize) -> usize {
    l * (l + 1) / 2 + am
}

/// Coefficient engine for one order.
///
/// All tables are sized in [`new`](Self::new); [`compute`](Self::compute)
/// only writes into them.
///
/// ```rust
/// use abc_spatial::{AmbisonicOrder, SphericalHarmonics};
///
/// let mut sh = SphericalHarmonics::new(AmbisonicOrder::new(1).unwrap());
/// let y = sh.compute(0.0, 0.0);
/// assert_eq!(y.len(), 4);
/// assert!((y[0] - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct SphericalHarmonics {
    order: AmbisonicOrder,
    norms: Vec<f32>,
    legendre: Vec<f32>,
    coeffs: Vec<f32>,
}

impl SphericalHarmonics {
    /// Allocate the tables for `order`.
    pub fn new(order: AmbisonicOrder) -> Self {
        let n = order.get();
        let channels = order.spherical_channels();
        let norms = (0..channels)
            .map(|i| {
                let (l, m) = acn_to_degree_order(i);
                normalization(l, m)
            })
            .collect();
        Self {
            order,
            norms,
            legendre: vec![0.0; legendre_index(n, n) + 1],
            coeffs: vec![0.0; channels],
        }
    }

    /// Order of the expansion.
    pub fn order(&self) -> AmbisonicOrder {
        self.order
    }

    /// Number of coefficients, `(n + 1)²`.
    pub fn channels(&self) -> usize {
        self.coeffs.len()
    }

    /// Evaluate every coefficient for a direction (radians).
    pub fn compute(&mut self, azimuth: f32, elevation: f32) -> &[f32] {
        let x = cosf(elevation + FRAC_PI_2);
        let theta = if cosf(elevation) < 0.0 { azimuth + PI } else { azimuth };
        self.fill_legendre(x);

        for (i, c) in self.coeffs.iter_mut().enumerate() {
            let (l, m) = acn_to_degree_order(i);
            let am = m.unsigned_abs() as usize;
            let e = match m {
                m if m > 0 => cosf(m as f32 * theta),
                m if m < 0 => sinf(am as f32 * theta),
                _ => 1.0,
            };
            *c = e * self.norms[i] * self.legendre[legendre_index(l, am)];
        }
        &self.coeffs
    }

    /// Coefficients from the last [`compute`](Self::compute).
    pub fn coefficients(&self) -> &[f32] {
        &self.coeffs
    }

    /// Encode `x` at a direction into `out`.
    pub fn encode(&mut self, x: f32, azimuth: f32, elevation: f32, out: &mut [f32]) {
        debug_assert_eq!(out.len(), self.coeffs.len());
        self.compute(azimuth, elevation);
        for (o, c) in out.iter_mut().zip(&self.coeffs) {
            *o = x * c;
        }
    }

    fn fill_legendre(&mut self, x: f32) {
        let n = self.order.get();
        let s = sqrtf((1.0 - x * x).max(0.0));
        let p = &mut self.legendre;
        p[0] = 1.0;
        for l in 1..=n {
            let two_l_minus_one = (2 * l - 1) as f32;
            let diag = p[legendre_index(l - 1, l - 1)];
            p[legendre_index(l, l)] = -two_l_minus_one * s * diag;
            p[legendre_index(l, l - 1)] = x * two_l_minus_one * diag;
            for am in 0..l.saturating_sub(1) {
                p[legendre_index(l, am)] = (two_l_minus_one * x * p[legendre_index(l - 1, am)]
                    - (l - 1 + am) as f32 * p[legendre_index(l - 2, am)])
                    / (l - am) as f32;
            }
        }
    }
}

/// Mono to spherical-harmonic encoder.
///
/// One input, `(n + 1)²` outputs. The direction is fixed between calls to
/// [`set_direction`](Self::set_direction).
#[derive(Debug, Clone)]
pub struct HarmonicEncoder {
    harmonics: SphericalHarmonics,
    azimuth: f32,
    elevation: f32,
}

impl HarmonicEncoder {
    /// Create an encoder pointing at `azimuth`, `elevation` (radians).
    pub fn new(order: AmbisonicOrder, azimuth: f32, elevation: f32) -> Self {
        let mut harmonics = SphericalHarmonics::new(order);
        harmonics.compute(azimuth, elevation);

        #[cfg(feature = "tracing")]
        tracing::debug!(order = order.get(), azimuth, elevation, "harmonic encoder");

        Self {
            harmonics,
            azimuth,
            elevation,
        }
    }

    /// Move the source (radians).
    pub fn set_direction(&mut self, azimuth: f32, elevation: f32) {
        self.azimuth = azimuth;
        self.elevation = elevation;
        self.harmonics.compute(azimuth, elevation);
    }

    /// Current `(azimuth, elevation)`.
    pub fn direction(&self) -> (f32, f32) {
        (self.azimuth, self.elevation)
    }

    /// Coefficients for the current direction.
    pub fn coefficients(&self) -> &[f32] {
        self.harmonics.coefficients()
    }
}

impl FrameProcessor for HarmonicEncoder {
    fn input_channels(&self) -> usize {
        1
    }

    fn output_channels(&self) -> usize {
        self.harmonics.channels()
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        let x = input[0];
        for (o, c) in output.iter_mut().zip(self.harmonics.coefficients()) {
            *o = x * c;
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}
