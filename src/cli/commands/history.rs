//! History command implementation

use crate::cli::utils;
use crate::utils::{format_duration_ms, truncate_for_display};
use anyhow::{anyhow, Result};
use apiscope_session::{ExportFormat, HistoryEntry};
use clap::{ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

pub fn command() -> Command {
    Command::new("history")
        .about("Browse, export or clear the request history")
        .subcommand_required(true)
        .subcommand(
            Command::new("list")
                .about("List recent requests, newest first")
                .arg(utils::config_arg())
                .arg(spec_filter_arg())
                .arg(
                    clap::Arg::new("limit")
                        .short('n')
                        .long("limit")
                        .help("Maximum number of entries to show")
                        .value_name("N")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("20"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Show one request in full")
                .arg(utils::config_arg())
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("remove")
                .about("Remove one request")
                .arg(utils::config_arg())
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("clear")
                .about("Remove every request, or only those of one document")
                .arg(utils::config_arg())
                .arg(spec_filter_arg()),
        )
        .subcommand(
            Command::new("export")
                .about("Export the history as JSON or CSV")
                .arg(utils::config_arg())
                .arg(spec_filter_arg())
                .arg(
                    clap::Arg::new("format")
                        .short('f')
                        .long("format")
                        .help("Export format")
                        .value_parser(["json", "csv"])
                        .default_value("json"),
                )
                .arg(
                    clap::Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Write to this file instead of standard output")
                        .value_name("FILE"),
                ),
        )
}

fn spec_filter_arg() -> clap::Arg {
    clap::Arg::new("spec")
        .short('s')
        .long("spec")
        .help("Only requests made against this document")
        .value_name("SPEC")
}

fn id_arg() -> clap::Arg {
    clap::Arg::new("id")
        .help("History entry ID")
        .value_name("ID")
        .required(true)
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("list", sub_matches)) => list(sub_matches).await,
        Some(("show", sub_matches)) => show(sub_matches).await,
        Some(("remove", sub_matches)) => remove(sub_matches).await,
        Some(("clear", sub_matches)) => clear(sub_matches).await,
        Some(("export", sub_matches)) => export(sub_matches).await,
        _ => Err(anyhow!("Unknown history subcommand")),
    }
}

fn spec_id(matches: &ArgMatches) -> Option<String> {
    matches
        .get_one::<String>("spec")
        .map(|location| utils::spec_id(location))
}

fn required_id(matches: &ArgMatches) -> Result<&String> {
    matches
        .get_one::<String>("id")
        .ok_or_else(|| anyhow!("No history entry ID given"))
}

async fn list(matches: &ArgMatches) -> Result<()> {
    let workbench = utils::create_workbench(matches).await?;
    let spec_id = spec_id(matches);
    let limit = matches.get_one::<usize>("limit").copied().unwrap_or(20);

    let entries: Vec<&HistoryEntry> = workbench
        .history()
        .newest_first()
        .filter(|entry| spec_id.as_ref().map_or(true, |id| &entry.spec_id == id))
        .take(limit)
        .collect();

    if entries.is_empty() {
        println!("No requests recorded.");
    }
    for entry in entries {
        println!("{}", entry_line(entry));
    }

    Ok(())
}

async fn show(matches: &ArgMatches) -> Result<()> {
    let workbench = utils::create_workbench(matches).await?;
    let id = required_id(matches)?;
    let entry = workbench
        .history()
        .get(id)
        .ok_or_else(|| anyhow!("No history entry {}", id))?;

    println!("{}", serde_json::to_string_pretty(entry)?);
    Ok(())
}

async fn remove(matches: &ArgMatches) -> Result<()> {
    let mut workbench = utils::create_workbench(matches).await?;
    let id = required_id(matches)?;

    if workbench.history_mut().remove(id).await? {
        println!("Removed {id}");
        Ok(())
    } else {
        Err(anyhow!("No history entry {}", id))
    }
}

async fn clear(matches: &ArgMatches) -> Result<()> {
    let mut workbench = utils::create_workbench(matches).await?;

    match spec_id(matches) {
        Some(spec_id) => {
            let removed = workbench.history_mut().clear_for_spec(&spec_id).await?;
            println!("Removed {removed} request(s) for {spec_id}");
        }
        None => {
            workbench.history_mut().clear().await?;
            println!("Request history cleared");
        }
    }

    Ok(())
}

async fn export(matches: &ArgMatches) -> Result<()> {
    let workbench = utils::create_workbench(matches).await?;
    let format: ExportFormat = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("json")
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let spec_id = spec_id(matches);

    let content = workbench.history().export(format, spec_id.as_deref())?;

    match matches.get_one::<String>("output").map(PathBuf::from) {
        Some(path) => {
            tokio::fs::write(&path, content).await?;
            info!("Exported request history to {:?}", path);
            println!("Exported request history to {}", path.display());
        }
        None => println!("{content}"),
    }

    Ok(())
}

fn entry_line(entry: &HistoryEntry) -> String {
    let outcome = match (entry.outcome.status(), entry.outcome.error()) {
        (Some(status), _) => status.to_string(),
        (None, Some(error)) => format!("error: {}", truncate_for_display(error, 40)),
        (None, None) => "-".to_string(),
    };

    format!(
        "{}  {}  {:<7} {}  {}  {}",
        entry.id,
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.method,
        truncate_for_display(&entry.url, 80),
        outcome,
        format_duration_ms(entry.duration_ms)
    )
}
