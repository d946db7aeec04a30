//! Session command implementation

use crate::cli::utils;
use anyhow::{anyhow, Context, Result};
use clap::{ArgMatches, Command};
use indexmap::IndexMap;
use tracing::info;

pub fn command() -> Command {
    Command::new("session")
        .about("Inspect, edit or clear saved test inputs")
        .subcommand_required(true)
        .subcommand(
            Command::new("show")
                .about("Show the inputs for an endpoint, or list endpoints with saved inputs")
                .arg(utils::config_arg())
                .arg(utils::spec_arg())
                .arg(utils::endpoint_arg(false)),
        )
        .subcommand(
            Command::new("set")
                .about("Change and save the inputs for an endpoint")
                .arg(utils::config_arg())
                .arg(utils::spec_arg())
                .arg(utils::endpoint_arg(true))
                .arg(pair_arg("path", "Path parameter value"))
                .arg(pair_arg("query", "Query parameter value"))
                .arg(pair_arg("header", "Header value"))
                .arg(
                    clap::Arg::new("body")
                        .short('b')
                        .long("body")
                        .help("Request body text, or @FILE to read it from a file")
                        .value_name("BODY"),
                )
                .arg(
                    clap::Arg::new("server")
                        .short('s')
                        .long("server")
                        .help("Server base URL")
                        .value_name("URL"),
                ),
        )
        .subcommand(
            Command::new("clear")
                .about("Clear saved inputs for one endpoint, or for the whole document")
                .arg(utils::config_arg())
                .arg(utils::spec_arg())
                .arg(utils::endpoint_arg(false)),
        )
}

fn pair_arg(name: &'static str, help: &'static str) -> clap::Arg {
    clap::Arg::new(name)
        .long(name)
        .help(help)
        .value_name("NAME=VALUE")
        .action(clap::ArgAction::Append)
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", sub_matches)) => show(sub_matches).await,
        Some(("set", sub_matches)) => set(sub_matches).await,
        Some(("clear", sub_matches)) => clear(sub_matches).await,
        _ => Err(anyhow!("Unknown session subcommand")),
    }
}

async fn show(matches: &ArgMatches) -> Result<()> {
    let workbench = utils::open_spec(matches).await?;

    let Some(key) = utils::endpoint_key(matches)? else {
        let saved = workbench.saved_sessions().await?;
        if saved.is_empty() {
            println!("No saved sessions.");
        }
        for key in saved {
            println!("{key}");
        }
        return Ok(());
    };

    let session = workbench.open_endpoint(&key).await?;
    println!(
        "{} ({})",
        key,
        if session.restored { "saved" } else { "prefilled" }
    );
    println!("{}", serde_json::to_string_pretty(&session.record)?);
    println!("URL: {}", workbench.request_url(&key, &session.record)?);

    Ok(())
}

async fn set(matches: &ArgMatches) -> Result<()> {
    let workbench = utils::open_spec(matches).await?;
    let key = utils::endpoint_key(matches)?.ok_or_else(|| anyhow!("No endpoint given"))?;

    let mut record = workbench.open_endpoint(&key).await?.record;
    apply_pairs(matches, "path", &mut record.path_params)?;
    apply_pairs(matches, "query", &mut record.query_params)?;
    apply_pairs(matches, "header", &mut record.headers)?;

    if let Some(body) = matches.get_one::<String>("body") {
        record.body = read_body(body)?;
    }
    if let Some(server) = matches.get_one::<String>("server") {
        record.selected_server = Some(server.clone());
    }

    workbench.save_session(&key, &record).await?;
    info!("Saved session for {}", key);
    println!("Saved inputs for {key}");
    println!("URL: {}", workbench.request_url(&key, &record)?);

    Ok(())
}

async fn clear(matches: &ArgMatches) -> Result<()> {
    let workbench = utils::open_spec(matches).await?;

    match utils::endpoint_key(matches)? {
        Some(key) => {
            workbench.reset_endpoint(&key).await?;
            println!("Cleared saved inputs for {key}");
        }
        None => {
            let cleared = workbench.clear_sessions().await?;
            println!("Cleared {cleared} saved session(s)");
        }
    }

    Ok(())
}

fn apply_pairs(
    matches: &ArgMatches,
    name: &str,
    target: &mut IndexMap<String, String>,
) -> Result<()> {
    let Some(pairs) = matches.get_many::<String>(name) else {
        return Ok(());
    };

    for pair in pairs {
        let (key, value) = parse_pair(pair)?;
        target.insert(key, value);
    }
    Ok(())
}

fn parse_pair(pair: &str) -> Result<(String, String)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected NAME=VALUE, got {}", pair))?;
    if key.is_empty() {
        return Err(anyhow!("Empty name in {}", pair));
    }
    Ok((key.to_string(), value.to_string()))
}

fn read_body(body: &str) -> Result<String> {
    match body.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read body file {}", path)),
        None => Ok(body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiscope_session::TestSessionRecord;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_pair("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn test_apply_pairs_overrides() {
        let matches = command()
            .try_get_matches_from([
                "session", "set", "spec.json", "GET:/x", "--query", "q=new", "--query", "page=2",
            ])
            .unwrap();
        let (_, set_matches) = matches.subcommand().unwrap();

        let mut record = TestSessionRecord::default();
        record.query_params.insert("q".to_string(), "old".to_string());
        apply_pairs(set_matches, "query", &mut record.query_params).unwrap();

        assert_eq!(record.query_params["q"], "new");
        assert_eq!(record.query_params["page"], "2");
    }
}
