//! Integration tests for abc-core DSP primitives.
//!
//! Tests cross-module interactions at the signal level: sample-accurate
//! delay verification, click-free delay-time changes in the overlapped
//! delay, oscillator phase continuity, smoother convergence timing and
//! frame-processor chaining.

use abc_core::{
    CosineOscillator, FrameProcessor, FrameProcessorExt, InterpolatedDelay, OverlappedDelay,
    Phasor, SmoothedGate, SmoothedParam, ms_to_samples,
};

const SAMPLE_RATE: f32 = 48000.0;

/// Largest absolute sample-to-sample difference of a signal.
fn max_step(signal: &[f32]) -> f32 {
    signal
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0, f32::max)
}

// ============================================================================
// 1. Delay line accuracy
// ============================================================================

#[test]
fn interpolated_delay_integer_accuracy() {
    let max_delay = 512;
    for &d in &[1.0, 5.0, 10.0, 50.0, 100.0, 256.0, 500.0] {
        let mut dl = InterpolatedDelay::new(max_delay);
        dl.write(1.0);
        for _ in 0..d as usize {
            dl.write(0.0);
        }
        let output = dl.read(d);
        assert!(
            (output - 1.0).abs() < 1e-6,
            "Integer delay {d}: expected 1.0, got {output}"
        );
    }
}

#[test]
fn interpolated_delay_fractional_interpolation() {
    let mut delay = InterpolatedDelay::new(64);
    for i in 0..10 {
        delay.write(i as f32);
    }
    // delay 1 holds 8, delay 2 holds 7
    let output = delay.read(1.5);
    assert!(
        (output - 7.5).abs() < 1e-6,
        "Fractional delay 1.5: expected 7.5, got {output}"
    );
}

#[test]
fn overlapped_delay_direct_mode_is_sample_accurate() {
    let mut delay = OverlappedDelay::new(128, SAMPLE_RATE, 0.0);
    let mut arrival = None;
    for t in 0..64 {
        let x = if t == 0 { 1.0 } else { 0.0 };
        let y = delay.process(x, 20.0, 0.0);
        if y > 0.5 && arrival.is_none() {
            arrival = Some(t);
        }
    }
    assert_eq!(arrival, Some(20));
}

#[test]
fn overlapped_delay_feedback_repeats_and_decays() {
    let mut delay = OverlappedDelay::new(64, SAMPLE_RATE, 0.0);
    let mut peaks = Vec::new();
    for t in 0..60 {
        let x = if t == 0 { 1.0 } else { 0.0 };
        let y = delay.process(x, 9.0, 0.5);
        if y.abs() > 1e-6 {
            peaks.push((t, y));
        }
    }
    // First arrival after 9 samples, repeats every 10: the loop adds one
    // sample on top of the delay.
    assert_eq!(peaks.len(), 6, "{peaks:?}");
    for (k, &(t, y)) in peaks.iter().enumerate() {
        assert_eq!(t, 9 + 10 * k);
        assert!((y - 0.5f32.powi(k as i32)).abs() < 1e-6);
    }
}

#[test]
fn overlapped_delay_time_jump_is_click_free() {
    // A steady sine through a delay whose time jumps every 10 ms. A single
    // read head would step at every jump; the windowed heads do not.
    let freq = 200.0;
    let mut delay = OverlappedDelay::new(4800, SAMPLE_RATE, 25.0);
    let mut out = Vec::with_capacity(48000);
    for n in 0..48000 {
        let x = libm::sinf(core::f32::consts::TAU * freq * n as f32 / SAMPLE_RATE);
        let d = if (n / 480) % 2 == 0 { 100.0 } else { 2100.0 };
        out.push(delay.process(x, d, 0.0));
    }
    let settled = &out[4800..];
    let sine_step = core::f32::consts::TAU * freq / SAMPLE_RATE;
    assert!(
        max_step(settled) < 2.0 * sine_step,
        "step {} vs sine slope {}",
        max_step(settled),
        sine_step
    );
}

// ============================================================================
// 2. Oscillators
// ============================================================================

#[test]
fn phasor_completes_one_cycle_per_period() {
    let mut phasor = Phasor::new(SAMPLE_RATE, 100.0);
    let mut wraps = 0;
    let mut prev = phasor.advance();
    for _ in 0..48000 {
        let p = phasor.advance();
        if p < prev {
            wraps += 1;
        }
        prev = p;
    }
    assert!((99..=101).contains(&wraps), "wraps = {wraps}");
}

#[test]
fn negative_frequency_runs_backwards() {
    let mut phasor = Phasor::new(1000.0, -250.0);
    let phases: Vec<f32> = (0..5).map(|_| phasor.advance()).collect();
    assert_eq!(phases, vec![0.0, 0.75, 0.5, 0.25, 0.0]);
}

#[test]
fn cosine_frequency_change_is_phase_continuous() {
    let mut osc = CosineOscillator::new(SAMPLE_RATE, 50.0);
    let mut out = Vec::new();
    for n in 0..9600 {
        if n == 4800 {
            osc.set_frequency(80.0);
        }
        out.push(osc.next());
    }
    let slope = core::f32::consts::TAU * 80.0 / SAMPLE_RATE;
    assert!(max_step(&out) <= slope * 1.01);
}

// ============================================================================
// 3. Smoother convergence timing
// ============================================================================

/// Count samples until the param reaches within `threshold` of its target.
fn count_convergence_samples(param: &mut SmoothedParam, target: f32, threshold: f32) -> usize {
    param.set_target(target);
    let mut count = 0;
    for _ in 0..100_000 {
        param.advance();
        count += 1;
        if (param.get() - target).abs() < threshold {
            return count;
        }
    }
    count
}

#[test]
fn smoothed_param_reaches_one_percent_in_five_time_constants() {
    for &tau_ms in &[10.0, 20.0, 50.0] {
        let mut param = SmoothedParam::with_config(0.0, SAMPLE_RATE, tau_ms);
        let samples = count_convergence_samples(&mut param, 1.0, 0.01);
        // ln(100) ≈ 4.6 time constants
        let expected = ms_to_samples(4.6 * tau_ms, SAMPLE_RATE) as usize;
        let tolerance = expected / 10;
        assert!(
            samples.abs_diff(expected) <= tolerance,
            "tau {tau_ms} ms: converged in {samples} samples, expected ~{expected}"
        );
    }
}

#[test]
fn smoothed_param_one_time_constant_reaches_63_percent() {
    let tau_ms = 10.0;
    let mut param = SmoothedParam::with_config(0.0, SAMPLE_RATE, tau_ms);
    param.set_target(1.0);

    let tau_samples = (SAMPLE_RATE * tau_ms / 1000.0) as usize;
    for _ in 0..tau_samples {
        param.advance();
    }

    let expected = 1.0 - libm::expf(-1.0);
    assert!(
        (param.get() - expected).abs() < 0.01,
        "After one time constant, expected ~{expected:.3}, got {:.3}",
        param.get()
    );
}

#[test]
fn gate_toggle_is_bounded_by_coefficient() {
    let mut gate = SmoothedGate::new(false, SAMPLE_RATE, 20.0);
    let coeff = gate.coefficient();
    let mut prev = gate.weight();
    for n in 0..9600 {
        let w = gate.advance(n < 4800);
        assert!((w - prev).abs() <= coeff + 1e-7);
        prev = w;
    }
    assert!(gate.weight() < 0.01);
}

// ============================================================================
// 4. Frame processing
// ============================================================================

/// Spreads a mono input over `n` channels with per-channel gains.
struct Spread(Vec<f32>);

impl FrameProcessor for Spread {
    fn input_channels(&self) -> usize {
        1
    }
    fn output_channels(&self) -> usize {
        self.0.len()
    }
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        for (o, g) in output.iter_mut().zip(&self.0) {
            *o = input[0] * g;
        }
    }
    fn set_sample_rate(&mut self, _: f32) {}
    fn reset(&mut self) {}
}

/// Delays every channel of a frame by `d` samples.
struct MultiDelay {
    lines: Vec<InterpolatedDelay>,
    d: f32,
}

impl FrameProcessor for MultiDelay {
    fn input_channels(&self) -> usize {
        self.lines.len()
    }
    fn output_channels(&self) -> usize {
        self.lines.len()
    }
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        for ((line, x), o) in self.lines.iter_mut().zip(input).zip(output.iter_mut()) {
            *o = line.read(self.d);
            line.write(*x);
        }
    }
    fn set_sample_rate(&mut self, _: f32) {}
    fn reset(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }
}

#[test]
fn chained_block_processing() {
    let spread = Spread(vec![1.0, 0.5, -1.0]);
    let delay = MultiDelay {
        lines: (0..3).map(|_| InterpolatedDelay::new(8)).collect(),
        d: 1.0,
    };
    let mut chain = spread.chain(delay);

    let input = [1.0, 0.0, 0.0, 0.0];
    let mut output = [0.0; 12];
    chain.process_block(&input, &mut output);
    assert_eq!(&output[..6], &[0.0; 6]);
    assert_eq!(&output[6..9], &[1.0, 0.5, -1.0]);
    assert_eq!(&output[9..], &[0.0; 3]);

    chain.reset();
    let mut again = [0.0; 12];
    chain.process_block(&input, &mut again);
    assert_eq!(output, again);
}
