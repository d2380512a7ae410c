//! abc CLI - inspect the abc ambisonics processors from the command line.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "abc")]
#[command(author, version, about = "abc ambisonics toolkit CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the distribution curve table
    Curves(commands::curves::CurvesArgs),

    /// Print spherical or circular harmonic coefficients for a direction
    Harmonics(commands::harmonics::HarmonicsArgs),

    /// Print loudspeaker gains of a decoder for a source direction
    Gains(commands::gains::GainsArgs),

    /// Print the impulse response of a diffusion engine
    Impulse(commands::impulse::ImpulseArgs),

    /// List factory rigs or show one as TOML
    Rigs(commands::rigs::RigsArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so tables on stdout stay clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Curves(args) => commands::curves::run(args),
        Commands::Harmonics(args) => commands::harmonics::run(args),
        Commands::Gains(args) => commands::gains::run(args),
        Commands::Impulse(args) => commands::impulse::run(args),
        Commands::Rigs(args) => commands::rigs::run(args),
    }
}
