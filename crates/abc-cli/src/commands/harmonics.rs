//! Harmonic coefficients for a direction.

use super::common::parse_order;
use abc_spatial::{SphericalHarmonics, acn_to_degree_order, encode_circular};
use clap::Args;

#[derive(Args, Debug)]
pub struct HarmonicsArgs {
    /// Ambisonic order
    #[arg(short, long, default_value = "1")]
    pub order: usize,

    /// Azimuth in degrees
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub azimuth: f32,

    /// Elevation in degrees
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    pub elevation: f32,

    /// Print circular (2D) harmonics instead of spherical ones
    #[arg(long)]
    pub planar: bool,
}

pub fn run(args: HarmonicsArgs) -> anyhow::Result<()> {
    let order = parse_order(args.order)?;
    if !args.azimuth.is_finite() || !args.elevation.is_finite() {
        anyhow::bail!("direction must be finite");
    }
    let azimuth = args.azimuth.to_radians();

    if args.planar {
        let mut coeffs = vec![0.0; order.circular_channels()];
        encode_circular(order.get(), 1.0, azimuth, &mut coeffs);

        println!("Circular harmonics, order {}, azimuth {}°", order.get(), args.azimuth);
        println!();
        println!("{:>4}  {:>3}  {:>4}  {:>10}", "ch", "k", "part", "value");
        for (ch, c) in coeffs.iter().enumerate() {
            let k = ch.div_ceil(2);
            let part = match ch {
                0 => "",
                ch if ch % 2 == 1 => "cos",
                _ => "sin",
            };
            println!("{ch:>4}  {k:>3}  {part:>4}  {c:>10.6}");
        }
    } else {
        let mut sh = SphericalHarmonics::new(order);
        let coeffs = sh.compute(azimuth, args.elevation.to_radians());

        println!(
            "Spherical harmonics (ACN/SN3D), order {}, azimuth {}°, elevation {}°",
            order.get(),
            args.azimuth,
            args.elevation
        );
        println!();
        println!("{:>4}  {:>3}  {:>4}  {:>10}", "acn", "l", "m", "value");
        for (acn, c) in coeffs.iter().enumerate() {
            let (l, m) = acn_to_degree_order(acn);
            println!("{acn:>4}  {l:>3}  {m:>4}  {c:>10.6}");
        }
    }

    Ok(())
}
