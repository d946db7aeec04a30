//! Endpoints command implementation

use crate::cli::utils;
use anyhow::{anyhow, Result};
use apiscope_document::{group_by_tag, list_endpoints, EndpointFilter, HttpMethod, ParsedEndpoint};
use clap::{ArgMatches, Command};
use tracing::info;

pub fn command() -> Command {
    Command::new("endpoints")
        .about("List and filter the endpoints of a document")
        .arg(utils::spec_arg())
        .arg(
            clap::Arg::new("query")
                .short('q')
                .long("query")
                .help("Only endpoints whose path, summary, description, operation ID or tags contain every word")
                .value_name("TEXT"),
        )
        .arg(
            clap::Arg::new("tag")
                .short('t')
                .long("tag")
                .help("Only endpoints with this tag (repeatable)")
                .value_name("TAG")
                .action(clap::ArgAction::Append),
        )
        .arg(
            clap::Arg::new("method")
                .short('m')
                .long("method")
                .help("Only endpoints with this HTTP method (repeatable)")
                .value_name("METHOD")
                .action(clap::ArgAction::Append),
        )
        .arg(
            clap::Arg::new("group")
                .short('g')
                .long("group")
                .help("Group endpoints by their first tag")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    let (source, document) = utils::load_document(matches).await?;
    let endpoints = list_endpoints(&document);

    let filter = build_filter(matches)?;
    let selected: Vec<ParsedEndpoint> = filter.apply(&endpoints).into_iter().cloned().collect();

    info!(
        "{} of {} endpoints in {} match",
        selected.len(),
        endpoints.len(),
        source.name
    );

    if matches.get_flag("group") {
        for (tag, group) in group_by_tag(&selected) {
            println!("{tag}:");
            for endpoint in group {
                println!("  {}", endpoint_line(endpoint));
            }
        }
    } else {
        for endpoint in &selected {
            println!("{}", endpoint_line(endpoint));
        }
    }

    if selected.is_empty() {
        println!("No endpoints match.");
    }

    Ok(())
}

fn build_filter(matches: &ArgMatches) -> Result<EndpointFilter> {
    let query = matches
        .get_one::<String>("query")
        .cloned()
        .unwrap_or_default();

    let tags: Vec<String> = matches
        .get_many::<String>("tag")
        .map(|tags| tags.cloned().collect())
        .unwrap_or_default();

    let methods = matches
        .get_many::<String>("method")
        .map(|methods| {
            methods
                .map(|method| method.parse::<HttpMethod>().map_err(|e| anyhow!(e)))
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();

    Ok(EndpointFilter::query(query)
        .with_tags(tags)
        .with_methods(methods))
}

fn endpoint_line(endpoint: &ParsedEndpoint) -> String {
    let mut line = format!("{:<7} {}", endpoint.method, endpoint.path);
    if let Some(summary) = &endpoint.operation.summary {
        line.push_str("  ");
        line.push_str(summary);
    }
    if endpoint.operation.deprecated {
        line.push_str(" (deprecated)");
    }
    line
}
