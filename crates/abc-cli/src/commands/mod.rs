//! CLI command implementations.

pub mod common;
pub mod curves;
pub mod gains;
pub mod harmonics;
pub mod impulse;
pub mod rigs;
