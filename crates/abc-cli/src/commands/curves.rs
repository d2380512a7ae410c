//! Distribution curve table.

use abc_spatial::Distribution;
use clap::Args;

#[derive(Args, Debug)]
pub struct CurvesArgs {
    /// Number of channel positions to evaluate
    #[arg(short, long, default_value = "9")]
    pub points: usize,

    /// Only print this curve (name or selector index)
    #[arg(short, long)]
    pub curve: Option<String>,
}

pub fn run(args: CurvesArgs) -> anyhow::Result<()> {
    if args.points == 0 {
        anyhow::bail!("--points must be at least 1");
    }

    let curves: Vec<Distribution> = match &args.curve {
        Some(name) => vec![lookup(name)?],
        None => Distribution::ALL.to_vec(),
    };

    print!("{:>2}  {:18}", "#", "curve");
    for i in 0..args.points {
        print!(" {:>7}", format!("c{i}"));
    }
    println!();

    for d in curves {
        print!("{:>2}  {:18}", d.index(), d.name());
        for i in 0..args.points {
            print!(" {:>7.4}", d.at(i, args.points));
        }
        println!();
    }

    Ok(())
}

fn lookup(name: &str) -> anyhow::Result<Distribution> {
    if let Some(d) = Distribution::from_name(name) {
        return Ok(d);
    }
    let index: i64 = name
        .parse()
        .map_err(|_| anyhow::anyhow!("Unknown curve '{name}'"))?;
    Ok(Distribution::from_index(index)?)
}
