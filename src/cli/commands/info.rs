//! Info command implementation

use anyhow::Result;
use clap::{ArgMatches, Command};

use crate::cli::utils;

pub fn command() -> Command {
    Command::new("info")
        .about("Show tool information")
        .arg(utils::config_arg())
        .arg(
            clap::Arg::new("detailed")
                .short('d')
                .long("detailed")
                .help("Show detailed information")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let detailed = matches.get_flag("detailed");

    println!("ApiScope - OpenAPI Browser and Endpoint Tester");
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!("Repository: {}", env!("CARGO_PKG_REPOSITORY"));
    println!(
        "HTTP support: {}",
        if cfg!(feature = "http") {
            "enabled"
        } else {
            "disabled (build with --features http)"
        }
    );

    if detailed {
        let config = utils::load_config(matches)?;
        match utils::get_config_path(matches) {
            Some(path) => println!("\nConfiguration: {}", path.display()),
            None => println!("\nConfiguration: defaults"),
        }
        println!("  Storage backend: {:?}", config.storage.backend);
        if config.storage.backend == crate::StorageKind::File {
            println!(
                "  Data directory: {}",
                config.storage.resolved_data_dir()?.display()
            );
        }
        println!("  History capacity: {}", config.history.capacity);
        println!(
            "  Persisted body limit: {} characters",
            config.history.max_persisted_body_chars
        );

        println!("\nDetailed Information:");
        println!("  - OpenAPI 3.0 and 3.1 documents in JSON or YAML");
        println!("  - Local $ref resolution with cycle-safe example synthesis");
        println!("  - Path and operation parameter merging");
        println!("  - Endpoint filtering by text, tag and method");
        println!("  - Saved test inputs per document and endpoint");
        println!("  - Bounded request history with JSON and CSV export");
    }

    Ok(())
}
