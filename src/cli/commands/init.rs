//! Init command implementation

use crate::{Config, StorageKind};
use anyhow::{anyhow, Result};
use clap::{ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

pub fn command() -> Command {
    Command::new("init")
        .about("Initialize a new configuration file")
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file path")
                .value_name("FILE")
                .default_value(".apiscope.yaml"),
        )
        .arg(
            clap::Arg::new("memory")
                .long("memory")
                .help("Keep sessions and history in memory only")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("force")
                .short('f')
                .long("force")
                .help("Overwrite an existing file")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let output_path = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("No output path given"))?;

    if output_path.exists() && !matches.get_flag("force") {
        return Err(anyhow!(
            "{:?} already exists; use --force to overwrite it",
            output_path
        ));
    }

    info!("Initializing configuration file: {:?}", output_path);

    let mut config = Config::default();
    if matches.get_flag("memory") {
        config.storage.backend = StorageKind::Memory;
    }

    config.save_to_file(&output_path)?;

    info!("Configuration file created: {:?}", output_path);
    println!("Configuration file created: {}", output_path.display());
    match config.storage.backend {
        StorageKind::Memory => println!("Sessions and history are kept in memory only."),
        StorageKind::File => println!(
            "Sessions and history are stored in {}",
            config.storage.resolved_data_dir()?.display()
        ),
    }

    Ok(())
}
