//! Decoder gains for a source direction.

use super::common::RigArgs;
use abc_core::FrameProcessor;
use abc_spatial::{GeneralDecoder, encode_circular};
use clap::Args;

#[derive(Args, Debug)]
pub struct GainsArgs {
    #[command(flatten)]
    pub rig: RigArgs,

    /// Source azimuth in degrees
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub azimuth: f32,

    /// Sweep the full circle in steps of this many degrees
    #[arg(long, conflicts_with = "azimuth")]
    pub sweep: Option<f32>,
}

pub fn run(args: GainsArgs) -> anyhow::Result<()> {
    let rig = args.rig.resolve()?;
    let mut decoder = rig.build_decoder()?;
    let angles = rig.layout.map(|l| l.angles).unwrap_or_default();

    println!(
        "Rig: {}  order {}  optimization {}{}",
        rig.name,
        rig.order,
        rig.optimization,
        if decoder.is_stereo() { "  (stereo fold-down)" } else { "" }
    );
    println!();

    match args.sweep {
        Some(step) => {
            if !(step.is_finite() && step > 0.0) {
                anyhow::bail!("--sweep must be a positive number of degrees");
            }
            print!("{:>8}", "azimuth");
            for a in &angles {
                print!(" {:>8}", format!("{a}°"));
            }
            println!();

            let mut az = 0.0f32;
            while az < 360.0 {
                let feeds = feeds_for(&mut decoder, rig.order, az);
                print!("{az:>8.1}");
                for f in &feeds {
                    print!(" {f:>8.4}");
                }
                println!();
                az += step;
            }
        }
        None => {
            if !args.azimuth.is_finite() {
                anyhow::bail!("azimuth must be finite");
            }
            let feeds = feeds_for(&mut decoder, rig.order, args.azimuth);
            println!("Source at {}°", args.azimuth);
            println!();
            println!("{:>4}  {:>8}  {:>10}", "spk", "angle", "gain");
            for (i, (a, f)) in angles.iter().zip(&feeds).enumerate() {
                println!("{i:>4}  {a:>8.1}  {f:>10.6}");
            }
            let power: f32 = feeds.iter().map(|f| f * f).sum();
            println!();
            println!("power {power:.6}");
        }
    }

    Ok(())
}

/// Feeds for a unit source at `azimuth` degrees.
fn feeds_for(decoder: &mut GeneralDecoder, order: usize, azimuth: f32) -> Vec<f32> {
    let mut field = vec![0.0; decoder.input_channels()];
    encode_circular(order, 1.0, azimuth.to_radians(), &mut field);
    let mut feeds = vec![0.0; decoder.output_channels()];
    decoder.process_frame(&field, &mut feeds);
    feeds
}
