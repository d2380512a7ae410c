//! Shared CLI helpers used across multiple commands.

use abc_config::{LayoutConfig, RigConfig, get_factory_rig};
use abc_spatial::AmbisonicOrder;
use clap::Args;

/// Rig selection shared by commands that need a loudspeaker layout.
#[derive(Args, Debug, Clone, Default)]
pub struct RigArgs {
    /// Factory rig to start from (see `abc rigs`)
    #[arg(long, conflicts_with = "angles")]
    pub rig: Option<String>,

    /// Loudspeaker azimuths in degrees, comma separated
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub angles: Option<Vec<f32>>,

    /// Ambisonic order (overrides the rig)
    #[arg(short, long)]
    pub order: Option<usize>,

    /// Optimizer mode: basic, max_re or in_phase (overrides the rig)
    #[arg(long)]
    pub optimization: Option<String>,
}

impl RigArgs {
    /// Resolve the arguments into a rig, defaulting to the quad layout.
    pub fn resolve(&self) -> anyhow::Result<RigConfig> {
        let mut rig = match (&self.rig, &self.angles) {
            (Some(name), _) => get_factory_rig(name)
                .map_err(|e| anyhow::anyhow!("{e}. Use 'abc rigs' to see available rigs."))?,
            (None, Some(angles)) => RigConfig::new("Command line").with_layout(LayoutConfig {
                angles: angles.clone(),
                ..LayoutConfig::default()
            }),
            (None, None) => get_factory_rig("quad")?,
        };
        if let Some(order) = self.order {
            rig.order = order;
        }
        if let Some(mode) = &self.optimization {
            rig.optimization.clone_from(mode);
        }
        tracing::debug!(rig = %rig.name, order = rig.order, "rig resolved");
        Ok(rig)
    }
}

/// Parse an order argument.
pub fn parse_order(order: usize) -> anyhow::Result<AmbisonicOrder> {
    Ok(AmbisonicOrder::new(order)?)
}
