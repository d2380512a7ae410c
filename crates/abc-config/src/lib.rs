//! Rig configuration for abc spatial processors.
//!
//! A rig describes one installation: ambisonic order, loudspeaker layout,
//! optimizer mode and an optional diffusion stage. Rigs are written in TOML,
//! validated as a whole and turned into ready-to-run processors.
//!
//! # Features
//!
//! - **Rig format**: serde/TOML description with defaults for every field
//! - **Validation**: every problem reported at once
//! - **Builders**: decoder, optimizer, rotator and diffusion engine
//! - **Factory rigs**: common layouts, always available
//!
//! # Example
//!
//! ```rust
//! use abc_config::RigConfig;
//! use abc_core::FrameProcessor;
//!
//! let rig = RigConfig::from_toml(
//!     r#"
//!     name = "Quad"
//!     order = 1
//!
//!     [layout]
//!     angles = [0.0, 90.0, 180.0, 270.0]
//!     "#,
//! )
//! .unwrap();
//!
//! let mut decoder = rig.build_decoder().unwrap();
//! let mut feeds = [0.0; 4];
//! decoder.process_frame(&[1.0, 1.0, 0.0], &mut feeds);
//! assert!((feeds[0] - 0.75).abs() < 1e-6);
//! ```

mod error;
mod rig;

/// Rig validation.
pub mod validation;

/// Factory rigs bundled with the library.
pub mod factory_rigs;

pub use error::ConfigError;
pub use factory_rigs::{factory_rig_names, factory_rigs, get_factory_rig};
pub use rig::{
    DiffusionSettings, LayoutConfig, RigConfig, parse_dimension, parse_kind, parse_source,
};
pub use validation::{ValidationError, ValidationResult};
