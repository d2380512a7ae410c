//! Property-based tests for abc-core DSP primitives.
//!
//! Tests smoother convergence, delay line integrity, feedback stability and
//! vector normalisation using proptest for randomized input generation.

use abc_core::{
    CosineOscillator, InterpolatedDelay, OverlappedDelay, Phasor, SmoothedGate, SmoothedParam,
    crossfade, l2_norm, normalize, wrap_turns,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// SmoothedParam converges toward its target value.
    ///
    /// f32 precision limits exact convergence for large values: the step
    /// `coeff * (target - current)` rounds to zero once the remaining gap is
    /// about `ULP(target) / coeff`.
    #[test]
    fn smoothed_param_convergence(
        initial in -100.0f32..100.0f32,
        target in -100.0f32..100.0f32,
    ) {
        let mut param = SmoothedParam::with_config(initial, 48000.0, 10.0);
        param.set_target(target);

        for _ in 0..10000 {
            param.advance();
        }

        let ulp_estimate = target.abs() * f32::EPSILON;
        let precision_floor = ulp_estimate / 0.002 + 1e-4;
        let diff = (param.get() - target).abs();
        prop_assert!(
            diff < precision_floor,
            "SmoothedParam did not converge: initial={}, target={}, got={}, diff={}, tol={}",
            initial, target, param.get(), diff, precision_floor
        );
    }

    /// A smoothed gate always stays inside [0, 1], whatever the condition
    /// sequence.
    #[test]
    fn gate_weight_stays_in_unit_range(
        conditions in prop::collection::vec(any::<bool>(), 1..512),
        time_ms in 0.0f32..100.0f32,
    ) {
        let mut gate = SmoothedGate::new(false, 48000.0, time_ms);
        for c in conditions {
            let w = gate.advance(c);
            prop_assert!((0.0..=1.0).contains(&w), "weight {} out of range", w);
        }
    }

    /// Write N random samples to InterpolatedDelay and read them back at
    /// integer delays; integer reads are exact.
    #[test]
    fn delay_line_integrity(
        samples in prop::collection::vec(-1.0f32..=1.0f32, 1..=64),
    ) {
        let n = samples.len();
        let mut delay = InterpolatedDelay::new(n + 1);
        for &s in &samples {
            delay.write(s);
        }
        for (i, &expected) in samples.iter().rev().enumerate() {
            let got = delay.read(i as f32);
            prop_assert!(
                (got - expected).abs() < 1e-6,
                "Delay mismatch at delay={}: expected {}, got {}",
                i, expected, got
            );
        }
    }

    /// With feedback below one, the overlapped delay stays bounded for any
    /// delay-time trajectory.
    #[test]
    fn overlapped_delay_is_stable(
        delays in prop::collection::vec(0.0f32..500.0f32, 1..16),
        feedback in 0.0f32..0.99f32,
        window_hz in 0.0f32..100.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut delay = OverlappedDelay::new(501, 48000.0, window_hz);
        let bound = 1.0 / (1.0 - feedback) + 1e-3;
        for (k, &x) in input.iter().cycle().take(4096).enumerate() {
            let d = delays[(k / 256) % delays.len()];
            let y = delay.process(x, d, feedback);
            prop_assert!(y.is_finite());
            prop_assert!(y.abs() <= bound, "output {} exceeds {}", y, bound);
        }
    }

    /// Phasor output is always a valid phase, forwards or backwards.
    #[test]
    fn phasor_stays_wrapped(freq in -20000.0f32..20000.0f32) {
        let mut phasor = Phasor::new(48000.0, freq);
        for _ in 0..1000 {
            let p = phasor.advance();
            prop_assert!((0.0..1.0).contains(&p), "phase {} at {} Hz", p, freq);
        }
    }

    /// Cosine carrier is bounded.
    #[test]
    fn cosine_is_bounded(freq in 0.0f32..20000.0f32) {
        let mut osc = CosineOscillator::new(48000.0, freq);
        for _ in 0..1000 {
            let c = osc.next();
            prop_assert!((-1.0..=1.0).contains(&c));
        }
    }

    /// wrap_turns lands in [0, 1) and preserves the fractional part.
    #[test]
    fn wrap_turns_range(x in -1000.0f32..1000.0f32) {
        let w = wrap_turns(x);
        prop_assert!((0.0..1.0).contains(&w));
        let diff = (x - w) - libm::roundf(x - w);
        prop_assert!(diff.abs() < 1e-3);
    }

    /// Normalised vectors have unit norm, or are all zero.
    #[test]
    fn normalize_yields_unit_or_zero(v in prop::collection::vec(-10.0f32..10.0f32, 1..32)) {
        let mut out = vec![0.0; v.len()];
        let norm = normalize(&v, &mut out);
        if norm > 1e-6 {
            prop_assert!((l2_norm(&out) - 1.0).abs() < 1e-4);
        } else if norm == 0.0 {
            prop_assert!(out.iter().all(|&x| x == 0.0));
        }
    }

    /// Crossfade endpoints return the inputs.
    #[test]
    fn crossfade_endpoints(a in -10.0f32..10.0f32, b in -10.0f32..10.0f32) {
        prop_assert_eq!(crossfade(a, b, 0.0), a);
        prop_assert!((crossfade(a, b, 1.0) - b).abs() < 1e-5);
    }
}
