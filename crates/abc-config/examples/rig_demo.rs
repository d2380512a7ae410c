//! Rig demo: factory rigs, TOML round trips, validation and processor building.
//!
//! Run with: cargo run -p abc-config --example rig_demo

use abc_config::{RigConfig, ValidationError, factory_rig_names, get_factory_rig};
use abc_core::{FrameProcessor, FrameProcessorExt};
use abc_spatial::CircularEncoder;

fn main() -> Result<(), abc_config::ConfigError> {
    // --- Factory rigs ---
    println!("=== Factory Rigs ===\n");

    for id in factory_rig_names() {
        let rig = get_factory_rig(id)?;
        let speakers = rig.layout.as_ref().map_or(0, |l| l.angles.len());
        println!(
            "  {:14} order {}  {} speakers  {}",
            id, rig.order, speakers, rig.optimization
        );
    }

    // --- TOML round trip ---
    println!("\n=== Hexagon as TOML ===\n");

    let hexagon = get_factory_rig("hexagon")?;
    let text = hexagon.to_toml()?;
    println!("{text}");
    assert_eq!(RigConfig::from_toml(&text)?, hexagon);

    // --- Validation ---
    println!("=== Validation ===\n");

    let broken = RigConfig::from_toml(
        r#"
        order = 20
        optimization = "louder"

        [layout]
        angles = [0.0]
        "#,
    )?;
    match broken.validate() {
        Ok(()) => println!("  unexpectedly valid"),
        Err(ValidationError::Multiple(errors)) => {
            for e in errors {
                println!("  - {e}");
            }
        }
        Err(e) => println!("  - {e}"),
    }

    // --- Building processors ---
    println!("\n=== Diffuse Quad ===\n");

    let rig = get_factory_rig("diffuse_quad")?;
    let order = rig.ambisonic_order()?;
    let mut chain = CircularEncoder::new(order, 0.0)
        .chain(rig.build_diffusion()?)
        .chain(rig.build_decoder()?);

    let mut feeds = vec![0.0; chain.output_channels()];
    let mut energy = vec![0.0f32; feeds.len()];
    for n in 0..rig.sample_rate as usize {
        let x = if n == 0 { 1.0 } else { 0.0 };
        chain.process_frame(&[x], &mut feeds);
        for (e, f) in energy.iter_mut().zip(&feeds) {
            *e += f * f;
        }
    }
    let angles = rig.layout.map(|l| l.angles).unwrap_or_default();
    for (a, e) in angles.iter().zip(&energy) {
        println!("  speaker {a:>6.1}°  impulse energy {e:.4}");
    }

    Ok(())
}
