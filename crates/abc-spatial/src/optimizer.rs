//! Per-degree field weighting: basic, maxRe and inPhase.
//!
//! All three weightings run in parallel and are mixed by smoothed gates, so
//! switching the mode fades between them instead of jumping.
//!
//! | Mode | 2D (degree k) | 3D (degree l) |
//! |------|---------------|---------------|
//! | basic | 1 | 1 |
//! | maxRe | `cos(kπ / (2n + 2))` | `P_l(r_E)`, `r_E` the largest root of `P_{n+1}` |
//! | inPhase | `(n!)² / ((n + k)! (n - k)!)` | `n! (n + 1)! / ((n + l + 1)! (n - l)!)` |

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use abc_core::{FrameProcessor, SmoothedGate};
use core::f64::consts::PI;
use libm::{cos, fabs};

use crate::error::{SpatialError, SpatialResult, check_sample_rate};
use crate::order::{AmbisonicOrder, Dimension};

/// Default cross-fade time between modes, in milliseconds.
pub const DEFAULT_OPTIM_SMOOTHING_MS: f32 = 10.0;

/// Field weighting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptimMode {
    /// Unweighted.
    #[default]
    Basic,
    /// Maximum energy vector.
    MaxRe,
    /// No out-of-phase loudspeaker feeds.
    InPhase,
}

impl OptimMode {
    /// Every mode, in selector order.
    pub const ALL: [OptimMode; 3] = [OptimMode::Basic, OptimMode::MaxRe, OptimMode::InPhase];

    /// Look up a mode by selector (0, 1 or 2).
    pub fn from_index(selector: i64) -> SpatialResult<Self> {
        usize::try_from(selector)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(SpatialError::InvalidOptimMode(selector))
    }

    /// Selector of this mode.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short name, as used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            OptimMode::Basic => "basic",
            OptimMode::MaxRe => "max_re",
            OptimMode::InPhase => "in_phase",
        }
    }

    /// Inverse of [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.name() == name)
    }
}

/// Legendre polynomial `P_n(x)` and its derivative.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    if n == 0 {
        return (p0, 0.0);
    }
    let mut p1 = x;
    for k in 1..n {
        let k = k as f64;
        let p2 = ((2.0 * k + 1.0) * x * p1 - k * p0) / (k + 1.0);
        p0 = p1;
        p1 = p2;
    }
    let dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, dp)
}

/// Largest root of `P_n`, by Newton iteration from the usual asymptotic guess.
fn largest_legendre_root(n: usize) -> f64 {
    let mut x = cos(PI * 0.75 / (n as f64 + 0.5));
    for _ in 0..100 {
        let (p, dp) = legendre(n, x);
        let step = p / dp;
        x -= step;
        if fabs(step) < 1e-15 {
            break;
        }
    }
    x
}

fn factorial(n: usize) -> f64 {
    (1..=n).map(|j| j as f64).product()
}

/// maxRe gains, one per degree `0..=n`, written into `out`.
pub fn max_re_gains(order: AmbisonicOrder, dimension: Dimension, out: &mut [f32]) {
    let n = order.get();
    debug_assert_eq!(out.len(), n + 1);
    match dimension {
        Dimension::Planar => {
            for (k, g) in out.iter_mut().enumerate() {
                *g = cos(k as f64 * PI / (2 * n + 2) as f64) as f32;
            }
        }
        Dimension::Spherical => {
            let r_e = largest_legendre_root(n + 1);
            for (l, g) in out.iter_mut().enumerate() {
                *g = legendre(l, r_e).0 as f32;
            }
        }
    }
}

/// inPhase gains, one per degree `0..=n`, written into `out`.
pub fn in_phase_gains(order: AmbisonicOrder, dimension: Dimension, out: &mut [f32]) {
    let n = order.get();
    debug_assert_eq!(out.len(), n + 1);
    for (l, g) in out.iter_mut().enumerate() {
        let value = match dimension {
            Dimension::Planar => {
                factorial(n) * factorial(n) / (factorial(n + l) * factorial(n - l))
            }
            Dimension::Spherical => {
                factorial(n) * factorial(n + 1) / (factorial(n + l + 1) * factorial(n - l))
            }
        };
        *g = value as f32;
    }
}

/// Field optimizer: per-channel weighting with smoothed mode switching.
///
/// ```rust
/// use abc_core::FrameProcessor;
/// use abc_spatial::{AmbisonicOrder, Dimension, FieldOptimizer, OptimMode};
///
/// let order = AmbisonicOrder::new(1).unwrap();
/// let mut opt = FieldOptimizer::new(order, Dimension::Planar, OptimMode::InPhase, 48000.0).unwrap();
/// let mut out = [0.0; 3];
/// opt.process_frame(&[1.0, 1.0, 1.0], &mut out);
/// assert!((out[1] - 0.5).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct FieldOptimizer {
    order: AmbisonicOrder,
    dimension: Dimension,
    mode: OptimMode,
    gates: [SmoothedGate; 3],
    /// Per-channel gains, indexed by `OptimMode::index()`.
    gains: [Vec<f32>; 3],
}

impl FieldOptimizer {
    /// Build an optimizer for a field of `order` and `dimension`.
    pub fn new(
        order: AmbisonicOrder,
        dimension: Dimension,
        mode: OptimMode,
        sample_rate: f32,
    ) -> SpatialResult<Self> {
        let sample_rate = check_sample_rate(sample_rate)?;
        let n = order.get();
        let channels = order.channels(dimension);

        let mut max_re = vec![0.0; n + 1];
        let mut in_phase = vec![0.0; n + 1];
        max_re_gains(order, dimension, &mut max_re);
        in_phase_gains(order, dimension, &mut in_phase);
        let per_channel = |degree_gains: &[f32]| -> Vec<f32> {
            (0..channels)
                .map(|c| degree_gains[order.degree_of(dimension, c)])
                .collect()
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(order = n, ?dimension, ?mode, "field optimizer");

        Ok(Self {
            order,
            dimension,
            mode,
            gates: OptimMode::ALL.map(|m| {
                SmoothedGate::new(m == mode, sample_rate, DEFAULT_OPTIM_SMOOTHING_MS)
            }),
            gains: [vec![1.0; channels], per_channel(&max_re), per_channel(&in_phase)],
        })
    }

    /// Select the weighting; the change fades in over the smoothing time.
    pub fn set_mode(&mut self, mode: OptimMode) {
        self.mode = mode;
    }

    /// Current target mode.
    pub fn mode(&self) -> OptimMode {
        self.mode
    }

    /// Order of the field.
    pub fn order(&self) -> AmbisonicOrder {
        self.order
    }

    /// Dimension of the field.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Time constant of the mode cross-fade.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        for gate in &mut self.gates {
            gate.set_smoothing_time_ms(time_ms);
        }
    }

    /// Per-sample smoothing coefficient of the mode gates.
    pub fn coefficient(&self) -> f32 {
        self.gates[0].coefficient()
    }

    /// Per-channel gains of `mode`.
    pub fn channel_gains(&self, mode: OptimMode) -> &[f32] {
        &self.gains[mode.index()]
    }
}

impl FrameProcessor for FieldOptimizer {
    fn input_channels(&self) -> usize {
        self.order.channels(self.dimension)
    }

    fn output_channels(&self) -> usize {
        self.order.channels(self.dimension)
    }

    #[inline]
    fn process_frame(&mut self, input: &[f32], output: &mut [f32]) {
        let mode = self.mode;
        let w = [
            self.gates[0].advance(mode == OptimMode::Basic),
            self.gates[1].advance(mode == OptimMode::MaxRe),
            self.gates[2].advance(mode == OptimMode::InPhase),
        ];
        let [basic, max_re, in_phase] = &self.gains;
        for (c, (o, x)) in output.iter_mut().zip(input).enumerate() {
            *o = x * (w[0] * basic[c] + w[1] * max_re[c] + w[2] * in_phase[c]);
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        for gate in &mut self.gates {
            gate.set_sample_rate(sample_rate);
        }
    }

    fn reset(&mut self) {
        for (gate, m) in self.gates.iter_mut().zip(OptimMode::ALL) {
            gate.snap(m == self.mode);
        }
    }
}
