//! CLI command implementations

use anyhow::Result;
use clap::{ArgMatches, Command};

pub mod commands;

/// Main CLI application
pub struct CliApp;

impl CliApp {
    /// Create the CLI application
    pub fn app() -> Command {
        let app = Command::new("apiscope")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Browse OpenAPI documents and test their endpoints")
            .subcommand_negates_reqs(true)
            .subcommand(commands::init::command())
            .subcommand(commands::validate::command())
            .subcommand(commands::endpoints::command())
            .subcommand(commands::inspect::command())
            .subcommand(commands::session::command())
            .subcommand(commands::history::command())
            .subcommand(commands::info::command());

        #[cfg(feature = "http")]
        let app = app.subcommand(commands::send::command());

        app
    }

    /// Run the CLI application
    pub async fn run(matches: &ArgMatches) -> Result<()> {
        match matches.subcommand() {
            Some(("init", sub_matches)) => commands::init::run(sub_matches).await,
            Some(("validate", sub_matches)) => commands::validate::run(sub_matches).await,
            Some(("endpoints", sub_matches)) => commands::endpoints::run(sub_matches).await,
            Some(("inspect", sub_matches)) => commands::inspect::run(sub_matches).await,
            Some(("session", sub_matches)) => commands::session::run(sub_matches).await,
            Some(("history", sub_matches)) => commands::history::run(sub_matches).await,
            Some(("info", sub_matches)) => commands::info::run(sub_matches).await,
            #[cfg(feature = "http")]
            Some(("send", sub_matches)) => commands::send::run(sub_matches).await,
            _ => {
                // No subcommand provided, show help
                let _ = Self::app().print_help();
                Ok(())
            }
        }
    }
}

/// Common CLI utilities
pub mod utils {
    use anyhow::{anyhow, Context, Result};
    use apiscope_document::{Document, EndpointKey};
    use clap::{Arg, ArgMatches};
    use std::path::PathBuf;
    use tracing::debug;

    use crate::{loader, Config, SpecSource, Workbench};

    /// `--config FILE` argument
    pub fn config_arg() -> Arg {
        Arg::new("config")
            .short('c')
            .long("config")
            .help("Configuration file path")
            .value_name("FILE")
    }

    /// Positional spec location argument
    pub fn spec_arg() -> Arg {
        Arg::new("spec")
            .help("OpenAPI document path (or URL with the `http` feature)")
            .value_name("SPEC")
            .required(true)
    }

    /// Positional `METHOD:path` argument
    pub fn endpoint_arg(required: bool) -> Arg {
        Arg::new("endpoint")
            .help("Endpoint key, e.g. GET:/users/{id}")
            .value_name("ENDPOINT")
            .required(required)
    }

    /// Get configuration file path from arguments or the default locations
    pub fn get_config_path(matches: &ArgMatches) -> Option<PathBuf> {
        matches
            .get_one::<String>("config")
            .map(PathBuf::from)
            .or_else(Config::find_default_path)
    }

    /// Load configuration, falling back to the defaults when no file exists
    pub fn load_config(matches: &ArgMatches) -> Result<Config> {
        match get_config_path(matches) {
            Some(path) => {
                debug!("Using configuration file {:?}", path);
                Config::from_file(&path)
            }
            None => Ok(Config::default()),
        }
    }

    /// Create a workbench over the configured storage
    pub async fn create_workbench(matches: &ArgMatches) -> Result<Workbench> {
        let config = load_config(matches)?;
        Ok(Workbench::from_config(&config).await?)
    }

    /// Read the document named by the `spec` argument
    pub async fn read_spec(matches: &ArgMatches) -> Result<(SpecSource, serde_json::Value)> {
        let location = matches
            .get_one::<String>("spec")
            .ok_or_else(|| anyhow!("No spec given"))?;
        loader::load_spec(location).await
    }

    /// Read and accept the document without touching storage
    pub async fn load_document(matches: &ArgMatches) -> Result<(SpecSource, Document)> {
        let (source, raw) = read_spec(matches).await?;
        let document = Document::from_value(raw)
            .with_context(|| format!("Rejected spec {}", source.name))?;
        Ok((source, document))
    }

    /// Create a workbench with the named document loaded
    pub async fn open_spec(matches: &ArgMatches) -> Result<Workbench> {
        let mut workbench = create_workbench(matches).await?;
        let (source, raw) = read_spec(matches).await?;
        workbench.load_document(source, raw).await?;
        Ok(workbench)
    }

    /// Parse the `endpoint` argument, if present
    pub fn endpoint_key(matches: &ArgMatches) -> Result<Option<EndpointKey>> {
        matches
            .get_one::<String>("endpoint")
            .map(|key| {
                key.parse::<EndpointKey>()
                    .map_err(|e| anyhow!("Invalid endpoint key {}: {}", key, e))
            })
            .transpose()
    }

    /// Spec ID for history filtering; existing paths are canonicalized the
    /// same way the loader names file sources
    pub fn spec_id(location: &str) -> String {
        if loader::is_url(location) {
            return location.to_string();
        }
        std::fs::canonicalize(location)
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_else(|_| location.to_string())
    }
}
