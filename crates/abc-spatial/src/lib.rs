//! abc Spatial - Ambisonics encoding, decoding and diffusion
//!
//! Every processor implements [`abc_core::FrameProcessor`]: one frame of
//! input channels in, one frame of output channels out. Channel counts follow
//! from the [`AmbisonicOrder`] chosen at construction:
//!
//! | Field | Channels |
//! |-------|----------|
//! | circular (2D) | `2n + 1` |
//! | spherical (3D, ACN) | `(n + 1)²` |
//!
//! ## Encoding
//!
//! - [`SphericalHarmonics`] / [`HarmonicEncoder`] - 3D encoding
//! - [`CircularEncoder`] / [`RotatingEncoder`] - 2D encoding
//! - [`StereoEncoder`] / [`MultiEncoder`] - several inputs on one field
//! - [`encode_harmonics`] - dimension chosen at runtime
//!
//! ## Decoding
//!
//! - [`CircularDecoder`] - evenly spaced loudspeakers
//! - [`VbapCompensator`] / [`IrregularDecoder`] - arbitrary rings
//! - [`FieldOptimizer`] - basic / maxRe / inPhase weighting
//! - [`IDecoder`] / [`GeneralDecoder`] - optimizer plus decoder, with a
//!   stereo fold-down
//!
//! ## Field processing
//!
//! - [`DiffusionEngine`] - per-channel delay or ring-modulation diffusion
//! - [`FieldRotator`] / [`Mirror`] - yaw rotation and reflections
//! - [`ScopeProjector`] - field to `(x, y)` display trace
//!
//! ## Example
//!
//! ```rust
//! use abc_core::{FrameProcessor, FrameProcessorExt};
//! use abc_spatial::{AmbisonicOrder, CircularEncoder, Direction, IDecoder, OptimMode};
//!
//! let order = AmbisonicOrder::new(1).unwrap();
//! let encoder = CircularEncoder::new(order, 0.0);
//! let decoder = IDecoder::new(
//!     order,
//!     &[0.0, 90.0, 180.0, 270.0],
//!     Direction::CounterClockwise,
//!     0.0,
//!     OptimMode::Basic,
//!     48000.0,
//! )
//! .unwrap();
//!
//! let mut chain = encoder.chain(decoder);
//! let mut feeds = [0.0; 4];
//! chain.process_frame(&[1.0], &mut feeds);
//! assert!((feeds[0] - 0.75).abs() < 1e-6);
//! ```
//!
//! # Errors
//!
//! Constructors validate their arguments and return [`SpatialError`]. Once
//! built, no processor can fail.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod assembly;
pub mod circular;
pub mod diffusion;
pub mod easing;
pub mod error;
pub mod harmonics;
pub mod optimizer;
pub mod order;
pub mod scope;
pub mod transform;
pub mod vbap;

// Re-export main types at crate root
pub use assembly::{
    Encoder, GeneralDecoder, IDecoder, MultiEncoder, StereoEncoder, StereoFold, encode_harmonics,
};
pub use circular::{CircularDecoder, CircularEncoder, RotatingEncoder, encode_circular};
pub use diffusion::{
    DiffusionConfig, DiffusionEngine, DiffusionKind, DiffusionSource, channel_threshold,
    ring_depth, syn_compensation,
};
pub use easing::{Distribution, curve};
pub use error::{SpatialError, SpatialResult};
pub use harmonics::{HarmonicEncoder, SphericalHarmonics, associated_legendre, normalization};
pub use optimizer::{FieldOptimizer, OptimMode, in_phase_gains, max_re_gains};
pub use order::{AmbisonicOrder, Dimension, acn_index, acn_to_degree_order};
pub use scope::ScopeProjector;
pub use transform::{FieldRotator, Mirror, MirrorAxis};
pub use vbap::{Direction, IrregularDecoder, PairGains, VbapCompensator, diff_sin, pair_gains};
