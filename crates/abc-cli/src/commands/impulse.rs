//! Impulse response of a diffusion engine.

use super::common::parse_order;
use abc_config::{DiffusionSettings, RigConfig};
use abc_core::FrameProcessor;
use abc_spatial::{DiffusionSource, encode_circular};
use clap::Args;

#[derive(Args, Debug)]
pub struct ImpulseArgs {
    /// Ambisonic order of the field
    #[arg(short, long, default_value = "1")]
    pub order: usize,

    /// Diffusion kind: delay or ring_mod
    #[arg(short, long, default_value = "delay")]
    pub kind: String,

    /// Distribution curve name
    #[arg(short, long, default_value = "linear")]
    pub distribution: String,

    /// Diffusion amount in [0, 1]
    #[arg(short, long, default_value = "1.0")]
    pub factor: f32,

    /// Delay feedback
    #[arg(long, default_value = "0.0")]
    pub feedback: f32,

    /// Longest delay in samples
    #[arg(long, default_value = "8")]
    pub max_delay: usize,

    /// Carrier frequency of the last channel in Hz
    #[arg(long, default_value = "100")]
    pub mod_frequency: f32,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    pub sample_rate: u32,

    /// Number of samples to print
    #[arg(short = 'n', long, default_value = "16")]
    pub samples: usize,

    /// Feed a mono impulse (syn source) instead of an encoded one
    #[arg(long)]
    pub syn: bool,

    /// Azimuth in degrees of the encoded impulse
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub azimuth: f32,

    /// Skip rows where every channel is zero
    #[arg(long)]
    pub nonzero: bool,
}

pub fn run(args: ImpulseArgs) -> anyhow::Result<()> {
    let order = parse_order(args.order)?;
    if !args.azimuth.is_finite() {
        anyhow::bail!("azimuth must be finite");
    }

    let settings = DiffusionSettings {
        source: if args.syn { "syn" } else { "fx" }.to_string(),
        kind: args.kind.clone(),
        distribution: args.distribution.clone(),
        factor: args.factor,
        max_delay_samples: args.max_delay,
        feedback: args.feedback,
        // Direct reads so the printed delays are exact.
        window_hz: 0.0,
        mod_frequency_hz: args.mod_frequency,
        ..DiffusionSettings::default()
    };
    let mut rig = RigConfig::new("impulse")
        .with_order(order.get())
        .with_diffusion(settings);
    rig.sample_rate = args.sample_rate;
    let mut engine = rig.build_diffusion()?;

    let mut input = vec![0.0; engine.input_channels()];
    let mut output = vec![0.0; engine.output_channels()];

    println!(
        "{} diffusion, {} source, order {}, factor {}, {}",
        args.kind,
        if args.syn { "syn" } else { "fx" },
        order.get(),
        args.factor,
        args.distribution
    );
    println!();
    print!("{:>6}", "n");
    for ch in 0..output.len() {
        print!(" {:>9}", format!("ch{ch}"));
    }
    println!();

    for n in 0..args.samples {
        if n == 0 {
            match engine.source() {
                DiffusionSource::Syn => input[0] = 1.0,
                DiffusionSource::Fx => {
                    encode_circular(order.get(), 1.0, args.azimuth.to_radians(), &mut input);
                }
            }
        } else {
            input.fill(0.0);
        }
        engine.process_frame(&input, &mut output);

        if args.nonzero && output.iter().all(|y| *y == 0.0) {
            continue;
        }
        print!("{n:>6}");
        for y in &output {
            print!(" {y:>9.5}");
        }
        println!();
    }

    Ok(())
}
