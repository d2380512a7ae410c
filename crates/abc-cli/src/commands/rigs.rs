//! Factory rig listing.

use abc_config::{factory_rig_names, get_factory_rig};
use clap::Args;

#[derive(Args, Debug)]
pub struct RigsArgs {
    /// Rig to print as TOML; lists every rig when omitted
    pub name: Option<String>,
}

pub fn run(args: RigsArgs) -> anyhow::Result<()> {
    if let Some(name) = args.name {
        let rig = get_factory_rig(&name)?;
        print!("{}", rig.to_toml()?);
        return Ok(());
    }

    println!("Factory rigs:");
    println!();
    println!("  {:14}  {:14}  {:>5}  {:>8}  DESCRIPTION", "ID", "NAME", "ORDER", "SPEAKERS");
    for id in factory_rig_names() {
        let rig = get_factory_rig(id)?;
        let speakers = rig.layout.as_ref().map_or(0, |l| l.angles.len());
        println!(
            "  {:14}  {:14}  {:>5}  {:>8}  {}",
            id,
            rig.name,
            rig.order,
            speakers,
            rig.description.as_deref().unwrap_or("")
        );
    }
    println!();
    println!("Use 'abc rigs <ID>' to print a rig as TOML.");

    Ok(())
}
