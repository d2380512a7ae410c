//! Field scope: projects a harmonic field onto a 2D display trace.
//!
//! A reference direction sweeps the horizon at the scan rate. Each sample
//! the field and the encoding of that direction are both normalised and
//! correlated; the correlation `ρ` becomes the radius of a point drawn at
//! the sweep angle. Negative correlation is drawn on the opposite side.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use abc_core::{FrameProcessor, Phasor, dot, normalize};
use core::f32::consts::{PI, TAU};
use libm::{cosf, sinf};

use crate::circular::encode_circular;
use crate::error::{SpatialResult, check_sample_rate};
use crate::harmonics::SphericalHarmonics;
use crate::order::{AmbisonicOrder, Dimension};

/// Default sweep rate in Hz.
pub const DEFAULT_SCAN_RATE_HZ: f32 = 1.0;

#[derive(Debug, Clone)]
enum Basis {
    Circular,
    Spherical(SphericalHarmonics),
}

/// Field to `(x, y)` projector.
///
/// Input: a circular or spherical field. Output: two channels, `x` and `y`.
#[derive(Debug, Clone)]
pub struct ScopeProjector {
    order: AmbisonicOrder,
    basis: Basis,
    sweep: Phasor,
    reference: Vec<f32>,
    field_unit: Vec<f32>,
    reference_unit: Vec<f32>,
}

impl ScopeProjector {
    /// Build a projector sweeping at [`DEFAULT_SCAN_RATE_HZ`].
    pub fn new(
        order: AmbisonicOrder,
        dimension: Dimension,
        sample_rate: f32,
    ) -> SpatialResult<Self> {
        let sample_rate = check_sample_rate(sample_rate)?;
        let channels = order.channels(dimension);
        let basis = match dimension {
            Dimension::Planar => Basis::Circular,
            Dimension::Spherical => Basis::Spherical(SphericalHarmonics::new(order)),
        };
        Ok(Self {
            order,
            basis,
            sweep: Phasor::new(sample_rate, DEFAULT_SCAN_RATE_HZ),
            reference: vec![0.0; channels],
            field_unit: vec![0.0; channels],
            reference_unit: vec![0.0; channels],
        })
    }

    /// Sweep rate in Hz.
    pub fn set_scan_rate(&mut self, hz: f32) {
        self.sweep.set_frequency(hz);
    }

    /// Current sweep rate in Hz.
    pub fn scan_rate(&self) -> f32 {
        self.sweep.frequency()
    }

    /// Project one frame at sweep angle `angle` (radians) without advancing.
    pub fn project(&mut self, field: &[f32], angle: f32) -> (f32, f32) {
        match &mut self.basis {
            Basis::Circular => encode_circular(self.order.get(), 1.0, angle, &mut self.reference),
            Basis::Spherical(sh) => {
                self.reference.copy_from_slice(sh.compute(angle, 0.0));
            }
        }
        normalize(field, &mut self.field_unit);
        normalize(&self.reference, &mut self.reference_unit);
        let rho = dot(&self.field_unit, &self.reference_unit);
        let a = if rho < 0.0 { angle + PI } else { angle };
        let r = rho.abs();
        (r * sinf(a), r * cosf(a))
    }
}

impl FrameProcessor for ScopeProjector {
    fn input_channels(&self) -> usize {
        self.reference.len()
    }

    fn output_channels(&self) -> usize {
        2
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        let angle = TAU * self.sweep.advance();
        let (x, y) = self.project(input, angle);
        output[0] = x;
        output[1] = y;
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sweep.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.sweep.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(n: usize) -> AmbisonicOrder {
        AmbisonicOrder::new(n).unwrap()
    }

    #[test]
    fn silent_field_draws_origin() {
        let mut scope = ScopeProjector::new(order(2), Dimension::Planar, 48000.0).unwrap();
        let mut out = [1.0; 2];
        scope.process_frame(&[0.0; 5], &mut out);
        assert_eq!(out, [0.0, 0.0]);
    }

    #[test]
    fn matching_direction_has_unit_radius() {
        let mut scope = ScopeProjector::new(order(2), Dimension::Planar, 48000.0).unwrap();
        let mut field = [0.0; 5];
        encode_circular(2, 0.3, 1.0, &mut field);
        let (x, y) = scope.project(&field, 1.0);
        assert!((x - sinf(1.0)).abs() < 1e-5);
        assert!((y - cosf(1.0)).abs() < 1e-5);
    }

    #[test]
    fn negative_correlation_flips_side() {
        let mut scope = ScopeProjector::new(order(1), Dimension::Spherical, 48000.0).unwrap();
        let mut sh = SphericalHarmonics::new(order(1));
        let field: Vec<f32> = sh.compute(0.5, 0.0).iter().map(|c| -c).collect();
        let (x, y) = scope.project(&field, 0.5);
        assert!((x - sinf(0.5 + PI)).abs() < 1e-5);
        assert!((y - cosf(0.5 + PI)).abs() < 1e-5);
    }

    #[test]
    fn radius_never_exceeds_one() {
        let mut scope = ScopeProjector::new(order(3), Dimension::Planar, 1000.0).unwrap();
        scope.set_scan_rate(7.0);
        let mut field = [0.0; 7];
        encode_circular(3, 2.0, 0.4, &mut field);
        let mut out = [0.0; 2];
        for _ in 0..1000 {
            scope.process_frame(&field, &mut out);
            assert!(out[0].hypot(out[1]) <= 1.0 + 1e-5);
        }
    }
}
