//! Easing curves used to distribute a parameter across harmonic channels.
//!
//! Each [`Distribution`] maps a normalised position `r ∈ [0, 1]` to
//! `[0, 1]`, monotone non-decreasing. The diffusion engine evaluates the
//! selected curve at `r = i / (P - 1)` for channel `i` of `P` to spread
//! delay times or carrier frequencies over the field.
//!
//! | Selector | Curve | Selector | Curve |
//! |----------|-------|----------|-------|
//! | 0 | linear | 11 | quintic out |
//! | 1 | quadratic in | 12 | quintic in-out |
//! | 2 | quadratic out | 13 | sinusoidal in |
//! | 3 | quadratic in-out | 14 | sinusoidal out |
//! | 4 | cubic in | 15 | sinusoidal in-out |
//! | 5 | cubic out | 16 | logarithmic |
//! | 6 | cubic in-out | 17 | square root |
//! | 7 | quartic in | 18 | exponential in |
//! | 8 | quartic out | 19 | exponential out |
//! | 9 | quartic in-out | 20 | circular in |
//! | 10 | quintic in | 21 | circular out |

use core::f32::consts::{FRAC_PI_2, LN_10, PI};
use libm::{cosf, exp2f, logf, sinf, sqrtf};

use crate::error::{SpatialError, SpatialResult};

/// One of the 22 channel-distribution curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Distribution {
    /// `r`
    #[default]
    Linear,
    /// `r²`
    QuadraticIn,
    /// `1 - (1 - r)²`
    QuadraticOut,
    /// Quadratic ease in, then out.
    QuadraticInOut,
    /// `r³`
    CubicIn,
    /// `1 - (1 - r)³`
    CubicOut,
    /// Cubic ease in, then out.
    CubicInOut,
    /// `r⁴`
    QuarticIn,
    /// `1 - (1 - r)⁴`
    QuarticOut,
    /// Quartic ease in, then out.
    QuarticInOut,
    /// `r⁵`
    QuinticIn,
    /// `1 - (1 - r)⁵`
    QuinticOut,
    /// Quintic ease in, then out.
    QuinticInOut,
    /// `1 - cos(rπ/2)`
    SinusoidalIn,
    /// `sin(rπ/2)`
    SinusoidalOut,
    /// `(1 - cos(rπ)) / 2`
    SinusoidalInOut,
    /// `log10(1 + 9r)`
    Logarithmic,
    /// `sqrt(r)`
    SquareRoot,
    /// `(2^(10r) - 1) / 1023`
    ExponentialIn,
    /// `(1 - 2^(-10r)) / (1 - 2^-10)`
    ExponentialOut,
    /// `1 - sqrt(1 - r²)`
    CircularIn,
    /// `sqrt(1 - (1 - r)²)`
    CircularOut,
}

impl Distribution {
    /// Every curve, in selector order.
    pub const ALL: [Distribution; 22] = [
        Distribution::Linear,
        Distribution::QuadraticIn,
        Distribution::QuadraticOut,
        Distribution::QuadraticInOut,
        Distribution::CubicIn,
        Distribution::CubicOut,
        Distribution::CubicInOut,
        Distribution::QuarticIn,
        Distribution::QuarticOut,
        Distribution::QuarticInOut,
        Distribution::QuinticIn,
        Distribution::QuinticOut,
        Distribution::QuinticInOut,
        Distribution::SinusoidalIn,
        Distribution::SinusoidalOut,
        Distribution::SinusoidalInOut,
        Distribution::Logarithmic,
        Distribution::SquareRoot,
        Distribution::ExponentialIn,
        Distribution::ExponentialOut,
        Distribution::CircularIn,
        Distribution::CircularOut,
    ];

    /// Look up a curve by selector.
    pub fn from_index(selector: i64) -> SpatialResult<Self> {
        usize::try_from(selector)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(SpatialError::InvalidDistribution(selector))
    }

    /// Selector of this curve.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short snake_case name, as used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Distribution::Linear => "linear",
            Distribution::QuadraticIn => "quadratic_in",
            Distribution::QuadraticOut => "quadratic_out",
            Distribution::QuadraticInOut => "quadratic_in_out",
            Distribution::CubicIn => "cubic_in",
            Distribution::CubicOut => "cubic_out",
            Distribution::CubicInOut => "cubic_in_out",
            Distribution::QuarticIn => "quartic_in",
            Distribution::QuarticOut => "quartic_out",
            Distribution::QuarticInOut => "quartic_in_out",
            Distribution::QuinticIn => "quintic_in",
            Distribution::QuinticOut => "quintic_out",
            Distribution::QuinticInOut => "quintic_in_out",
            Distribution::SinusoidalIn => "sinusoidal_in",
            Distribution::SinusoidalOut => "sinusoidal_out",
            Distribution::SinusoidalInOut => "sinusoidal_in_out",
            Distribution::Logarithmic => "logarithmic",
            Distribution::SquareRoot => "square_root",
            Distribution::ExponentialIn => "exponential_in",
            Distribution::ExponentialOut => "exponential_out",
            Distribution::CircularIn => "circular_in",
            Distribution::CircularOut => "circular_out",
        }
    }

    /// Inverse of [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.name() == name)
    }

    /// Evaluate the curve at `r`, clamped to `[0, 1]` on both sides.
    /// NaN evaluates as 0.
    pub fn apply(self, r: f32) -> f32 {
        let r = if r.is_nan() { 0.0 } else { r.clamp(0.0, 1.0) };
        let y = match self {
            Distribution::Linear => r,
            Distribution::QuadraticIn => ease_in(r, 2),
            Distribution::QuadraticOut => ease_out(r, 2),
            Distribution::QuadraticInOut => ease_in_out(r, 2),
            Distribution::CubicIn => ease_in(r, 3),
            Distribution::CubicOut => ease_out(r, 3),
            Distribution::CubicInOut => ease_in_out(r, 3),
            Distribution::QuarticIn => ease_in(r, 4),
            Distribution::QuarticOut => ease_out(r, 4),
            Distribution::QuarticInOut => ease_in_out(r, 4),
            Distribution::QuinticIn => ease_in(r, 5),
            Distribution::QuinticOut => ease_out(r, 5),
            Distribution::QuinticInOut => ease_in_out(r, 5),
            Distribution::SinusoidalIn => 1.0 - cosf(r * FRAC_PI_2),
            Distribution::SinusoidalOut => sinf(r * FRAC_PI_2),
            Distribution::SinusoidalInOut => 0.5 * (1.0 - cosf(r * PI)),
            Distribution::Logarithmic => logf(1.0 + 9.0 * r) / LN_10,
            Distribution::SquareRoot => sqrtf(r),
            Distribution::ExponentialIn => (exp2f(10.0 * r) - 1.0) / 1023.0,
            Distribution::ExponentialOut => {
                (1.0 - exp2f(-10.0 * r)) / (1.0 - 1.0 / 1024.0)
            }
            Distribution::CircularIn => 1.0 - sqrtf((1.0 - r * r).max(0.0)),
            Distribution::CircularOut => {
                let s = 1.0 - r;
                sqrtf((1.0 - s * s).max(0.0))
            }
        };
        y.clamp(0.0, 1.0)
    }

    /// Value for channel `i` of `p`: the curve at `i / (p - 1)`.
    ///
    /// A single channel (`p <= 1`) sits at `r = 0`.
    pub fn at(self, i: usize, p: usize) -> f32 {
        self.apply(position_ratio(i, p))
    }
}

/// Normalised position of channel `i` among `p`.
#[inline]
pub fn position_ratio(i: usize, p: usize) -> f32 {
    if p <= 1 {
        0.0
    } else {
        (i as f32 / (p - 1) as f32).min(1.0)
    }
}

/// Validated table lookup: curve `selector` at channel `i` of `p`.
pub fn curve(selector: i64, i: usize, p: usize) -> SpatialResult<f32> {
    Ok(Distribution::from_index(selector)?.at(i, p))
}

#[inline]
fn powi(x: f32, n: u32) -> f32 {
    let mut acc = 1.0;
    for _ in 0..n {
        acc *= x;
    }
    acc
}

#[inline]
fn ease_in(r: f32, n: u32) -> f32 {
    powi(r, n)
}

#[inline]
fn ease_out(r: f32, n: u32) -> f32 {
    1.0 - powi(1.0 - r, n)
}

#[inline]
fn ease_in_out(r: f32, n: u32) -> f32 {
    if r < 0.5 {
        powi(2.0, n - 1) * powi(r, n)
    } else {
        1.0 - 0.5 * powi(2.0 - 2.0 * r, n)
    }
}
