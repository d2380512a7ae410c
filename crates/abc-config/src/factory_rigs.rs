//! Factory rigs bundled with the library.
//!
//! Common loudspeaker layouts, always available without external files.

use crate::RigConfig;
use crate::error::ConfigError;

/// TOML content for factory rigs, keyed by identifier.
static FACTORY_RIGS_TOML: &[(&str, &str)] = &[
    ("stereo", STEREO_RIG),
    ("quad", QUAD_RIG),
    ("itu_5_0", ITU_5_0_RIG),
    ("hexagon", HEXAGON_RIG),
    ("octagon", OCTAGON_RIG),
    ("diffuse_quad", DIFFUSE_QUAD_RIG),
];

/// Two speakers at ±30°, folded down from the field.
const STEREO_RIG: &str = r#"
name = "Stereo"
description = "Two loudspeakers at +/-30 degrees, constant-power fold-down"
order = 3
optimization = "max_re"

[layout]
angles = [30.0, -30.0]
"#;

/// First-order square.
const QUAD_RIG: &str = r#"
name = "Quad"
description = "Four loudspeakers on a square, front speaker at 0 degrees"
order = 1

[layout]
angles = [0.0, 90.0, 180.0, 270.0]
"#;

/// ITU-R BS.775 five-speaker ring.
const ITU_5_0_RIG: &str = r#"
name = "ITU 5.0"
description = "ITU-R BS.775 ring without LFE"
order = 3
optimization = "max_re"

[layout]
angles = [-30.0, 0.0, 30.0, 110.0, 250.0]
"#;

const HEXAGON_RIG: &str = r#"
name = "Hexagon"
description = "Six loudspeakers, front pair at +/-30 degrees"
order = 2
optimization = "max_re"

[layout]
angles = [30.0, 90.0, 150.0, 210.0, 270.0, 330.0]
"#;

const OCTAGON_RIG: &str = r#"
name = "Octagon"
description = "Eight loudspeakers, third order, in-phase for large audiences"
order = 3
optimization = "in_phase"

[layout]
angles = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0]
"#;

/// Quad with a diffusion stage in front of the decoder.
const DIFFUSE_QUAD_RIG: &str = r#"
name = "Diffuse Quad"
description = "Second-order quad with cubic-out delay diffusion"
order = 2

[layout]
angles = [45.0, 135.0, 225.0, 315.0]

[diffusion]
kind = "delay"
distribution = "cubic_out"
factor = 0.6
max_delay_samples = 2400
feedback = 0.3
"#;

/// All factory rigs.
///
/// # Example
///
/// ```rust
/// use abc_config::factory_rigs;
///
/// for rig in factory_rigs() {
///     println!("{}: {}", rig.name, rig.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_rigs() -> Vec<RigConfig> {
    FACTORY_RIGS_TOML
        .iter()
        .filter_map(|(_, toml)| RigConfig::from_toml(toml).ok())
        .collect()
}

/// Get a factory rig by identifier or display name, case-insensitively.
///
/// ```rust
/// use abc_config::get_factory_rig;
///
/// let rig = get_factory_rig("ITU 5.0").unwrap();
/// assert_eq!(rig.layout.unwrap().angles.len(), 5);
/// ```
pub fn get_factory_rig(name: &str) -> Result<RigConfig, ConfigError> {
    let name_lower = name.to_lowercase();

    for (id, toml) in FACTORY_RIGS_TOML {
        if id.to_lowercase() == name_lower {
            return RigConfig::from_toml(toml);
        }
    }

    for (_, toml) in FACTORY_RIGS_TOML {
        if let Ok(rig) = RigConfig::from_toml(toml)
            && rig.name.to_lowercase() == name_lower
        {
            return Ok(rig);
        }
    }

    Err(ConfigError::RigNotFound(name.to_string()))
}

/// Identifiers of all factory rigs.
pub fn factory_rig_names() -> Vec<&'static str> {
    FACTORY_RIGS_TOML.iter().map(|(name, _)| *name).collect()
}
