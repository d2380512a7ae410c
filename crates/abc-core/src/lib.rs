//! abc Core - DSP primitives for ambisonic processing
//!
//! The foundational building blocks consumed by `abc-spatial`, designed for
//! real-time audio with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Frame Processing
//!
//! - [`FrameProcessor`] - Object-safe trait for multichannel processors
//! - [`FrameProcessorExt`] - Extension trait for chaining
//! - [`Chain`] - Two processors in series
//! - [`ChannelMismatch`] - Error from [`Chain::try_new`]
//!
//! ## Parameter Smoothing
//!
//! - [`SmoothedParam`] - Exponential smoothing (RC-like response)
//! - [`SmoothedGate`] - Boolean condition smoothed into a 0..1 weight
//!
//! ## Delay Lines
//!
//! - [`InterpolatedDelay`] - Variable-length delay with linear interpolation
//! - [`OverlappedDelay`] - Feedback delay with two windowed read heads
//!
//! ## Oscillators
//!
//! - [`Phasor`] - Bidirectional phase accumulator
//! - [`CosineOscillator`] - Phase-continuous cosine carrier
//!
//! ## Utilities
//!
//! - Vector math: [`dot`], [`l2_norm`], [`normalize`]
//! - Scalars: [`crossfade`], [`sign`], [`flush_denormal`], [`ms_to_samples`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! abc-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations in audio processing paths
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Single owner**: every stateful primitive belongs to exactly one channel

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod delay;
pub mod math;
pub mod param;
pub mod phasor;
pub mod processor;

// Re-export main types at crate root
pub use delay::{InterpolatedDelay, OverlappedDelay};
pub use math::{crossfade, dot, flush_denormal, l2_norm, ms_to_samples, normalize, sign};
pub use param::{SmoothedGate, SmoothedParam};
pub use phasor::{CosineOscillator, Phasor, wrap_turns};
pub use processor::{Chain, ChannelMismatch, FrameProcessor, FrameProcessorExt};
