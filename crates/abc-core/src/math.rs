//! Small numeric helpers shared by the spatial processors.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! - [`flush_denormal`] - Denormal protection for feedback paths
//! - [`crossfade`] - Two-signal blend
//! - [`sign`] - Three-valued sign (0 for 0)
//! - [`dot`] / [`l2_norm`] / [`normalize`] - Channel-vector operations
//! - [`ms_to_samples`] - Time conversion

use libm::sqrtf;

/// Flush denormals to zero.
///
/// Values below 1e-20 are replaced with zero, well before the IEEE 754
/// subnormal range where many CPUs slow down drastically.
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

/// Blend two signals: `a * (1 - weight) + b * weight`, computed as
/// `a + (b - a) * weight`.
#[inline]
pub fn crossfade(a: f32, b: f32, weight: f32) -> f32 {
    a + (b - a) * weight
}

/// Sign of `x` as -1, 0 or 1.
///
/// Unlike [`f32::signum`], zero (of either sign) maps to 0.
#[inline]
pub fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Dot product of two equally long channel vectors.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean norm of a channel vector.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    sqrtf(v.iter().map(|x| x * x).sum())
}

/// Write `v / |v|` into `out`; a zero vector yields all zeros.
///
/// Returns the norm of `v`.
pub fn normalize(v: &[f32], out: &mut [f32]) -> f32 {
    debug_assert_eq!(v.len(), out.len());
    let norm = l2_norm(v);
    if norm > 0.0 {
        let inv = 1.0 / norm;
        for (o, x) in out.iter_mut().zip(v) {
            *o = x * inv;
        }
    } else {
        out.fill(0.0);
    }
    norm
}

/// Convert milliseconds to samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}
